pub mod orchestrator;
pub mod poller;

#[cfg(test)]
pub(crate) mod fakes;
