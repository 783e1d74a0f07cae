//! An artifact store persisted as a JSON deployments file per network

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use deploy_common::{
    constants::DEPLOYMENTS_FILE_EXTENSION, errors::DeployError, types::DeploymentRecord,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_replacement, ArtifactStore};

/// The on-disk layout of a deployments file
#[derive(Debug, Default, Serialize, Deserialize)]
struct DeploymentsFile {
    /// The chain the deployments were made to
    chain_id: u64,
    /// The deployment records, by logical name
    deployments: BTreeMap<String, DeploymentRecord>,
}

/// An artifact store backed by `<dir>/<network>.json`, rewritten after every save
#[derive(Debug)]
pub struct FileArtifactStore {
    /// The path of the deployments file
    path: PathBuf,
    /// The current contents of the file
    contents: DeploymentsFile,
}

impl FileArtifactStore {
    /// Open the deployments file for the given network, creating it on the
    /// first save if it does not yet exist
    pub fn open(dir: impl AsRef<Path>, network: &str, chain_id: u64) -> Result<Self, DeployError> {
        let path = dir.as_ref().join(format!("{network}.{DEPLOYMENTS_FILE_EXTENSION}"));

        let contents = if path.exists() {
            let contents: DeploymentsFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
            if contents.chain_id != chain_id {
                return Err(DeployError::ChainIdMismatch {
                    recorded: contents.chain_id,
                    actual: chain_id,
                });
            }

            debug!(path = %path.display(), records = contents.deployments.len(), "loaded deployments");
            contents
        } else {
            DeploymentsFile { chain_id, deployments: BTreeMap::new() }
        };

        Ok(Self { path, contents })
    }

    /// The path of the deployments file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the deployments file, replacing it atomically
    fn flush(&self) -> Result<(), DeployError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.contents)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl ArtifactStore for FileArtifactStore {
    fn get_or_none(&self, name: &str) -> Option<DeploymentRecord> {
        self.contents.deployments.get(name).cloned()
    }

    fn save(&mut self, name: &str, record: DeploymentRecord) -> Result<(), DeployError> {
        let previous = self.contents.deployments.get(name).cloned();
        if let Some(existing) = &previous {
            check_replacement(name, existing, &record)?;
        }

        self.contents.deployments.insert(name.to_string(), record);
        if let Err(e) = self.flush() {
            // Keep memory consistent with what is on disk
            match previous {
                Some(existing) => self.contents.deployments.insert(name.to_string(), existing),
                None => self.contents.deployments.remove(name),
            };
            return Err(e);
        }

        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.contents.deployments.keys().cloned().collect()
    }
}
