pub mod models;
pub mod title;
