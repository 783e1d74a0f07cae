//! Definitions of errors that can occur during the execution of the deploy CLI

use deploy_common::errors::{DeployError, SchedulerError};
use deploy_core::scheduler::RunError;
use deploy_utils::errors::UtilsError;
use thiserror::Error;

/// Errors that can occur during the execution of the deploy CLI
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Error reading or parsing the configuration file
    #[error("error reading config: {0}")]
    ReadConfig(String),
    /// The requested network is not configured
    #[error("network `{0}` is not configured")]
    UnknownNetwork(String),
    /// A private key could not be parsed
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    /// Error initializing the RPC client
    #[error("error initializing client: {0}")]
    ClientInitialization(String),
    /// Error setting up or running a deployment
    #[error(transparent)]
    Deploy(#[from] DeployError),
    /// Error planning steps
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// A deployment run halted on an error
    #[error(transparent)]
    Run(#[from] RunError),
    /// Error computing an id or a signature
    #[error(transparent)]
    Utils(#[from] UtilsError),
}
