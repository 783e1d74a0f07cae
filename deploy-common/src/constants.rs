//! Constants shared across the deployment tooling

use alloy_primitives::{b256, B256};

/// The extension of a deployments file
pub const DEPLOYMENTS_FILE_EXTENSION: &str = "json";

/// The extension of a compiled contract artifact
pub const ARTIFACT_FILE_EXTENSION: &str = "json";

/// The network key used as a fallback when resolving named accounts
pub const DEFAULT_NETWORK_KEY: &str = "default";

/// Chain IDs of local development nodes (Hardhat, Anvil & Ganache)
pub const DEV_CHAIN_IDS: [u64; 2] = [31337, 1337];

/// The suffix appended to a proxied contract's logical name to key its
/// implementation deployment
pub const IMPLEMENTATION_SUFFIX: &str = "_Implementation";

/// The storage slot containing the implementation address of an upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The storage slot containing the proxy admin address in an upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The name of the method used to point a transparent proxy at a new implementation
pub const UPGRADE_TO_METHOD: &str = "upgradeTo";
