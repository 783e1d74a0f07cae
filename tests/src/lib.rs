//! Shared setup for the integration tests

pub mod utils;
