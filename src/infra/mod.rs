pub mod activity_log;
pub mod feed;
pub mod ledger;
pub mod magnet_output;
