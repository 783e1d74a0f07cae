//! The `deploy` CLI: runs the deployment steps of the contract suite against
//! a configured network

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod rpc;
pub mod steps;
