//! Common helpers used in unit and integration tests across the project crates

pub mod fixtures;
pub mod ledger;
pub mod misc;
pub mod steps;
