//! The deploy configuration file

use std::{collections::BTreeMap, fs, path::Path};

use alloy::primitives::{Address, U256};
use deploy_core::accounts::NamedAccounts;
use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

/// The contents of `deploy.json`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    /// The networks steps may run against, by name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    /// The named-account configuration
    #[serde(default)]
    pub named_accounts: NamedAccounts,
    /// Parameters of the step catalog
    #[serde(default)]
    pub settings: StepSettings,
}

impl DeployConfig {
    /// Load the configuration file at the given path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {e}", path.display())))?;

        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {e}", path.display())))
    }

    /// The configuration of the named network
    pub fn network(&self, name: &str) -> Result<&NetworkConfig, ScriptError> {
        self.networks.get(name).ok_or_else(|| ScriptError::UnknownNetwork(name.to_string()))
    }
}

/// The configuration of a single network
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The RPC endpoint of the network
    pub rpc_url: String,
    /// The chain ID the endpoint is expected to report
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Accounts available on the network whose keys are not held locally,
    /// listed after the local signers
    #[serde(default)]
    pub remote_accounts: Vec<Address>,
}

/// Parameters of the step catalog
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StepSettings {
    /// The initial SAND supply
    #[serde(default)]
    pub sand_initial_supply: U256,
    /// The LAND presale
    #[serde(default)]
    pub land_sale: LandSaleSettings,
    /// The quads minted to the reserve
    #[serde(default)]
    pub reserved_quads: Vec<QuadSettings>,
}

/// Pricing of the LAND presale
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LandSaleSettings {
    /// The USD price of a single land, with 18 decimals
    pub price_per_land_usd: U256,
    /// The USD price of one SAND, with 18 decimals
    pub sand_usd_rate: U256,
    /// The premium charged on 24x24 quads, in basis points
    pub premium_bps: u64,
}

impl Default for LandSaleSettings {
    fn default() -> Self {
        // $1 per land at $0.05 per SAND, with a 5% premium on the largest quads
        let one = U256::from(10).pow(U256::from(18));
        Self { price_per_land_usd: one, sand_usd_rate: one / U256::from(20), premium_bps: 500 }
    }
}

/// A quad, by size & top-left coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadSettings {
    /// The width & height of the quad
    pub size: u64,
    /// The x coordinate of the top-left land
    pub x: u64,
    /// The y coordinate of the top-left land
    pub y: u64,
}
