//! An in-memory artifact store

use std::collections::BTreeMap;

use deploy_common::{errors::DeployError, types::DeploymentRecord};

use super::{check_replacement, ArtifactStore};

/// An artifact store holding its records in memory only
#[derive(Clone, Debug, Default)]
pub struct MemoryArtifactStore {
    /// The records, by logical name
    records: BTreeMap<String, DeploymentRecord>,
}

impl MemoryArtifactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All records held by the store
    pub fn records(&self) -> &BTreeMap<String, DeploymentRecord> {
        &self.records
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn get_or_none(&self, name: &str) -> Option<DeploymentRecord> {
        self.records.get(name).cloned()
    }

    fn save(&mut self, name: &str, record: DeploymentRecord) -> Result<(), DeployError> {
        if let Some(existing) = self.records.get(name) {
            check_replacement(name, existing, &record)?;
        }

        self.records.insert(name.to_string(), record);
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}
