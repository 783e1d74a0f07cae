//! Setup for running the contract suite against a mock ledger

use alloy::primitives::{Address, U256};
use deploy_common::types::NetworkContext;
use deploy_core::{
    accounts::{AccountRef, NamedAccounts},
    contracts::MemoryContractSource,
    env::{DeployEnv, DeployOptions, ProxyOptions},
    scheduler::{RunReport, Scheduler},
    store::{ArtifactStore, MemoryArtifactStore},
};
use eyre::Result;
use scripts::{
    config::{QuadSettings, StepSettings},
    constants::{
        ASSET_ADMIN_ROLE, ASSET_BOUNCER_ADMIN_ROLE, ASSET_CONTRACT_KEY, BACKEND_SIGNER_ROLE,
        DEPLOYER_ROLE, GENESIS_MINTER_ROLE, LAND_ADMIN_ROLE, LAND_RESERVE_ROLE,
        LAND_SALE_BENEFICIARY_ROLE, MARKETPLACE_ADMIN_ROLE, PROXY_ADMIN_ROLE, PROXY_CONTRACT,
        SAND_ADMIN_ROLE, SAND_BENEFICIARY_ROLE, SAND_CONTRACT_KEY,
    },
    steps::register_all,
};
use test_helpers::{
    fixtures::{catalog_contracts, catalog_ledger},
    ledger::MockLedger,
    misc::{account, init_test_logging},
};

/// The roles the contract suite uses
pub const CATALOG_ROLES: [&str; 12] = [
    DEPLOYER_ROLE,
    SAND_ADMIN_ROLE,
    SAND_BENEFICIARY_ROLE,
    LAND_ADMIN_ROLE,
    LAND_RESERVE_ROLE,
    LAND_SALE_BENEFICIARY_ROLE,
    ASSET_ADMIN_ROLE,
    ASSET_BOUNCER_ADMIN_ROLE,
    GENESIS_MINTER_ROLE,
    PROXY_ADMIN_ROLE,
    MARKETPLACE_ADMIN_ROLE,
    BACKEND_SIGNER_ROLE,
];

/// The number of asset registry versions the mock ledger knows
const ASSET_VERSIONS: u8 = 2;

/// The step settings the suite runs with: two reserved quads
pub fn catalog_settings() -> StepSettings {
    StepSettings {
        sand_initial_supply: U256::from(3_000_000_000_u64),
        reserved_quads: vec![
            QuadSettings { size: 24, x: 0, y: 0 },
            QuadSettings { size: 12, x: 24, y: 0 },
        ],
        ..Default::default()
    }
}

/// The contract suite deployed against a mock ledger, keeping its
/// deployments in memory
pub struct Catalog {
    /// The mock ledger
    pub ledger: MockLedger,
    /// The network, with every role resolved
    pub network: NetworkContext,
    /// The compiled contracts
    pub contracts: MemoryContractSource,
    /// The recorded deployments
    pub store: MemoryArtifactStore,
}

impl Catalog {
    /// Set up the suite on the given chain. The accounts of the `remote`
    /// roles are not held locally.
    pub fn new(chain_id: u64, remote: &[&str]) -> Result<Self> {
        init_test_logging();

        let named_accounts = CATALOG_ROLES.iter().fold(NamedAccounts::default(), |named, role| {
            named.with_role(role, "default", AccountRef::Address(account(role)))
        });
        let accounts: Vec<Address> = CATALOG_ROLES.iter().map(|role| account(role)).collect();
        let network = named_accounts.resolve("testnet", chain_id, &accounts)?;

        let signers = CATALOG_ROLES
            .iter()
            .filter(|role| !remote.contains(*role))
            .map(|role| account(role))
            .collect();

        Ok(Self {
            ledger: catalog_ledger(chain_id, signers, ASSET_VERSIONS)?,
            network,
            contracts: catalog_contracts(1)?,
            store: MemoryArtifactStore::new(),
        })
    }

    /// Run the suite's steps selected by `tags`
    pub async fn run(&mut self, tags: &[&str]) -> Result<RunReport> {
        run_catalog(&self.network, &mut self.store, &self.ledger, &self.contracts, tags).await
    }

    /// Run the suite's steps selected by `tags`, recording deployments in
    /// the given store rather than the suite's own
    pub async fn run_with_store(
        &self,
        store: &mut dyn ArtifactStore,
        tags: &[&str],
    ) -> Result<RunReport> {
        run_catalog(&self.network, store, &self.ledger, &self.contracts, tags).await
    }

    /// Replace the asset registry with the given version
    pub fn set_asset_version(&mut self, version: u8) -> Result<()> {
        self.contracts = catalog_contracts(version)?;
        Ok(())
    }

    /// The recorded address of a deployment
    pub fn address(&self, name: &str) -> Result<Address> {
        Ok(self.store.get(name)?.address)
    }

    /// The account bound to a role
    pub fn account(&self, role: &str) -> Result<Address> {
        Ok(self.network.account(role)?)
    }

    /// An environment over the suite's network, ledger & deployments
    pub fn env(&mut self) -> DeployEnv<'_> {
        DeployEnv::new(&self.network, &mut self.store, &self.ledger, &self.contracts)
    }

    /// Options deploying SAND from the deployer
    pub fn sand_options(&self) -> Result<DeployOptions> {
        Ok(DeployOptions {
            contract: SAND_CONTRACT_KEY.to_string(),
            from: self.account(DEPLOYER_ROLE)?,
            args: vec![
                self.account(SAND_ADMIN_ROLE)?.into(),
                self.account(SAND_BENEFICIARY_ROLE)?.into(),
                U256::from(1_000_000_u64).into(),
            ],
        })
    }

    /// Deploy SAND if missing, returning its address
    pub async fn deploy_sand(&mut self) -> Result<Address> {
        let options = self.sand_options()?;
        Ok(self.env().deploy(SAND_CONTRACT_KEY, options).await?.record.address)
    }

    /// Options deploying the asset registry behind a proxy, initialized with SAND
    pub fn asset_options(&self, sand: Address) -> Result<ProxyOptions> {
        Ok(ProxyOptions {
            contract: ASSET_CONTRACT_KEY.to_string(),
            proxy_contract: PROXY_CONTRACT.to_string(),
            from: self.account(DEPLOYER_ROLE)?,
            admin: self.account(PROXY_ADMIN_ROLE)?,
            init: Some((
                "init".to_string(),
                vec![
                    sand.into(),
                    self.account(ASSET_ADMIN_ROLE)?.into(),
                    self.account(ASSET_BOUNCER_ADMIN_ROLE)?.into(),
                ],
            )),
        })
    }
}

/// Run the suite's steps selected by `tags` in a fresh scheduler
async fn run_catalog(
    network: &NetworkContext,
    store: &mut dyn ArtifactStore,
    ledger: &MockLedger,
    contracts: &MemoryContractSource,
    tags: &[&str],
) -> Result<RunReport> {
    let mut scheduler = Scheduler::new();
    register_all(&mut scheduler, &catalog_settings());

    let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
    let mut env = DeployEnv::new(network, store, ledger, contracts);
    Ok(scheduler.run(&tags, &mut env).await?)
}
