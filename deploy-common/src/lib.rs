//! Common modules used throughout the deployment tooling, including the
//! scheduler, the step catalog & testing code

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod errors;
pub mod types;
