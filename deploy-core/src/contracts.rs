//! Loading of compiled contract artifacts

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{keccak256, Bytes, B256},
};
use deploy_common::{constants::ARTIFACT_FILE_EXTENSION, errors::DeployError};
use serde::Deserialize;

/// A compiled contract, ready to be deployed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledContract {
    /// The name of the contract
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

impl CompiledContract {
    /// The keccak hash of the creation bytecode
    pub fn bytecode_hash(&self) -> B256 {
        keccak256(&self.bytecode)
    }
}

/// A source of compiled contracts, looked up by contract name
pub trait ContractSource: Send + Sync {
    /// Load the named contract
    fn load(&self, name: &str) -> Result<CompiledContract, DeployError>;
}

// ---------------------
// | Directory Source |
// ---------------------

/// The bytecode field of a compiled artifact, which hardhat writes as a hex
/// string and forge as an object
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// Hardhat layout
    Hex(Bytes),
    /// Forge layout
    Object {
        /// The hex-encoded bytecode
        object: Bytes,
    },
}

/// The fields of a compiled artifact file that deployment needs
#[derive(Deserialize)]
struct ArtifactFile {
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: ArtifactBytecode,
}

/// Reads compiled artifacts from `<dir>/<Name>.json`
#[derive(Clone, Debug)]
pub struct DirContractSource {
    /// The artifacts directory
    dir: PathBuf,
}

impl DirContractSource {
    /// Create a source reading from the given directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }
}

impl ContractSource for DirContractSource {
    fn load(&self, name: &str) -> Result<CompiledContract, DeployError> {
        let path = self.dir.join(format!("{name}.{ARTIFACT_FILE_EXTENSION}"));
        let contents = fs::read_to_string(&path).map_err(|e| {
            DeployError::ContractSource(format!("reading {}: {e}", path.display()))
        })?;
        let artifact: ArtifactFile = serde_json::from_str(&contents).map_err(|e| {
            DeployError::ContractSource(format!("parsing {}: {e}", path.display()))
        })?;

        let bytecode = match artifact.bytecode {
            ArtifactBytecode::Hex(bytes) | ArtifactBytecode::Object { object: bytes } => bytes,
        };

        Ok(CompiledContract { name: name.to_string(), abi: artifact.abi, bytecode })
    }
}

// ------------------
// | Memory Source |
// ------------------

/// An in-memory contract source
#[derive(Clone, Debug, Default)]
pub struct MemoryContractSource {
    /// The contracts, by name
    contracts: HashMap<String, CompiledContract>,
}

impl MemoryContractSource {
    /// Add a contract to the source
    pub fn insert(&mut self, contract: CompiledContract) {
        self.contracts.insert(contract.name.clone(), contract);
    }

    /// Builder-style [`MemoryContractSource::insert`]
    pub fn with(mut self, contract: CompiledContract) -> Self {
        self.insert(contract);
        self
    }
}

impl ContractSource for MemoryContractSource {
    fn load(&self, name: &str) -> Result<CompiledContract, DeployError> {
        self.contracts
            .get(name)
            .cloned()
            .ok_or_else(|| DeployError::ContractSource(format!("unknown contract `{name}`")))
    }
}
