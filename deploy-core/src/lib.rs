//! The deployment runner: named-account resolution, the artifact store,
//! idempotent deploy & reconcile helpers, the unknown-signer shim and the
//! tag-based step scheduler

#![deny(missing_docs)]

pub mod abi;
pub mod accounts;
pub mod contracts;
pub mod env;
pub mod ledger;
pub mod scheduler;
pub mod signer;
pub mod step;
pub mod store;
