//! Pure helpers used by the deployment steps & the CLI: asset id packing,
//! land quad ids, sale price computation and purchase authorization signing

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod asset_id;
pub mod errors;
pub mod land;
pub mod pricing;
pub mod purchase;
