//! Definitions of errors that can occur while scheduling & executing deployment steps

use alloy_primitives::{Address, B256};
use thiserror::Error;

/// Errors that can occur while executing a single deployment step, or while
/// setting up the environment the steps run in
#[derive(Debug, Error)]
pub enum DeployError {
    /// A named account was requested that is not bound on the active network
    #[error("role `{role}` is not configured for network `{network}`")]
    UnknownRole {
        /// The requested role
        role: String,
        /// The active network
        network: String,
    },
    /// A deployment was requested that was never recorded
    #[error("no deployment found for `{0}`")]
    NotFound(String),
    /// A deployment record would be replaced without a strictly greater upgrade index
    #[error(
        "deployment `{name}` already recorded at upgrade index {existing}, refusing to overwrite with index {attempted}"
    )]
    ArtifactOverwrite {
        /// The logical name of the deployment
        name: String,
        /// The upgrade index of the stored record
        existing: u64,
        /// The upgrade index of the rejected record
        attempted: u64,
    },
    /// An upgrade of a proxied deployment would change the proxy's address
    #[error("upgrade of proxy `{name}` would move it from {expected} to {actual}")]
    UpgradeAddressChanged {
        /// The logical name of the deployment
        name: String,
        /// The address of the stored proxy
        expected: Address,
        /// The address carried by the rejected record
        actual: Address,
    },
    /// The deployments file was written for a different chain
    #[error("deployments were recorded for chain {recorded}, but the network is chain {actual}")]
    ChainIdMismatch {
        /// The chain ID recorded in the deployments file
        recorded: u64,
        /// The chain ID of the active network
        actual: u64,
    },
    /// A transaction that cannot be deferred requires a key that is not held locally
    #[error("account {0} is not a local signer")]
    SignerUnavailable(Address),
    /// The contract ABI has no method with the given name & arity
    #[error("contract `{contract}` has no method `{method}` taking {arity} argument(s)")]
    UnknownMethod {
        /// The logical name of the contract
        contract: String,
        /// The method name
        method: String,
        /// The number of arguments supplied
        arity: usize,
    },
    /// Error ABI-encoding or decoding a value
    #[error("abi error: {0}")]
    Abi(String),
    /// Error returned by the ledger client
    #[error("ledger error: {0}")]
    Ledger(String),
    /// A submitted transaction was mined but reverted
    #[error("transaction {0} reverted")]
    TransactionReverted(B256),
    /// Error loading a compiled contract
    #[error("error loading compiled contract: {0}")]
    ContractSource(String),
    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
    /// Error reading or writing a file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Error de/serializing JSON
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised by the step scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A requested tag is advertised by no registered step
    #[error("no step advertises the tag `{0}`")]
    UnknownTag(String),
    /// Two registered steps share a name
    #[error("step `{0}` is registered more than once")]
    DuplicateStep(String),
    /// A step depends on a tag advertised by no other step
    #[error("step `{step}` depends on `{tag}`, which no other step provides")]
    UnresolvedDependency {
        /// The dependent step
        step: String,
        /// The unresolved tag
        tag: String,
    },
    /// A step in the main pass depends on a step deferred to the end pass
    #[error("step `{step}` depends on `{dependency}`, which only runs at the end")]
    DeferredDependency {
        /// The dependent step
        step: String,
        /// The deferred step it depends on
        dependency: String,
    },
    /// The dependency graph contains a cycle
    #[error("cyclic dependency between steps: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// The names of the steps forming the cycle, closing on the first one
        cycle: Vec<String>,
    },
    /// A step's skip predicate or run function failed
    #[error("step `{step}` failed: {source}")]
    StepExecution {
        /// The name of the failed step
        step: String,
        /// The underlying cause
        #[source]
        source: DeployError,
    },
}

impl SchedulerError {
    /// Wrap an error raised while executing the given step
    pub fn step_execution(step: &str, source: DeployError) -> Self {
        SchedulerError::StepExecution {
            step: step.to_string(),
            source,
        }
    }
}
