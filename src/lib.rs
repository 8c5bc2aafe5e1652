pub mod bus;
pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod message;
pub mod publisher;
pub mod server;
pub mod store;
pub mod timer;
pub mod topics;

#[cfg(test)]
pub mod test_utils;
