// Public API for embedding hosts and integration tests

pub mod bank;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod sweep;
pub mod types;
