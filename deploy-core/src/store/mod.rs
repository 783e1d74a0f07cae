//! The artifact store, which records the contracts deployed to a network

mod file;
mod memory;

pub use file::FileArtifactStore;
pub use memory::MemoryArtifactStore;

use deploy_common::{errors::DeployError, types::DeploymentRecord};

/// A keyed store of deployment records for a single network
pub trait ArtifactStore: Send + Sync {
    /// Get the record for the given logical name, if one exists
    fn get_or_none(&self, name: &str) -> Option<DeploymentRecord>;

    /// Get the record for the given logical name
    fn get(&self, name: &str) -> Result<DeploymentRecord, DeployError> {
        self.get_or_none(name).ok_or_else(|| DeployError::NotFound(name.to_string()))
    }

    /// Save a record under the given logical name.
    ///
    /// An existing record may only be replaced by one with a strictly greater
    /// upgrade index, and a proxied deployment must keep its address.
    fn save(&mut self, name: &str, record: DeploymentRecord) -> Result<(), DeployError>;

    /// The logical names of all recorded deployments
    fn names(&self) -> Vec<String>;
}

/// Check that `replacement` may replace `existing` under the given name
pub(crate) fn check_replacement(
    name: &str,
    existing: &DeploymentRecord,
    replacement: &DeploymentRecord,
) -> Result<(), DeployError> {
    if replacement.upgrade_index <= existing.upgrade_index {
        return Err(DeployError::ArtifactOverwrite {
            name: name.to_string(),
            existing: existing.upgrade_index,
            attempted: replacement.upgrade_index,
        });
    }

    if existing.is_proxy() && replacement.address != existing.address {
        return Err(DeployError::UpgradeAddressChanged {
            name: name.to_string(),
            expected: existing.address,
            actual: replacement.address,
        });
    }

    Ok(())
}
