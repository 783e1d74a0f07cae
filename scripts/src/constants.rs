//! Constants used in the deploy CLI & the step catalog

// ------------
// | Defaults |
// ------------

/// The default path of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "deploy.json";

/// The default directory deployments files are written to
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The default directory compiled artifacts are read from
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default number of confirmations to wait for on each transaction
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

// -----------------
// | Logical Names |
// -----------------

/// The SAND ERC20 token
pub const SAND_CONTRACT_KEY: &str = "Sand";

/// The LAND ERC721 registry
pub const LAND_CONTRACT_KEY: &str = "Land";

/// The upgradeable ERC1155 asset registry
pub const ASSET_CONTRACT_KEY: &str = "Asset";

/// The asset marketplace
pub const MARKETPLACE_CONTRACT_KEY: &str = "Marketplace";

/// The LAND presale
pub const LAND_PRESALE_CONTRACT_KEY: &str = "LandPreSale";

/// The development SAND faucet
pub const FAUCET_CONTRACT_KEY: &str = "Faucet";

/// The compiled proxy placed in front of upgradeable contracts
pub const PROXY_CONTRACT: &str = "TransparentUpgradeableProxy";

// ---------
// | Roles |
// ---------

/// The account that deploys contracts & pays for setup transactions
pub const DEPLOYER_ROLE: &str = "deployer";

/// The admin of the SAND token
pub const SAND_ADMIN_ROLE: &str = "sandAdmin";

/// The account receiving the initial SAND supply
pub const SAND_BENEFICIARY_ROLE: &str = "sandBeneficiary";

/// The admin LAND is handed over to once setup is complete
pub const LAND_ADMIN_ROLE: &str = "landAdmin";

/// The owner of reserved LAND
pub const LAND_RESERVE_ROLE: &str = "landReserve";

/// The account receiving LAND presale proceeds
pub const LAND_SALE_BENEFICIARY_ROLE: &str = "landSaleBeneficiary";

/// The admin of the asset registry
pub const ASSET_ADMIN_ROLE: &str = "assetAdmin";

/// The account allowed to appoint asset bouncers
pub const ASSET_BOUNCER_ADMIN_ROLE: &str = "assetBouncerAdmin";

/// The bouncer minting genesis assets
pub const GENESIS_MINTER_ROLE: &str = "genesisMinter";

/// The admin of upgradeable proxies
pub const PROXY_ADMIN_ROLE: &str = "proxyAdmin";

/// The admin of the marketplace
pub const MARKETPLACE_ADMIN_ROLE: &str = "marketplaceAdmin";

/// The backend account signing purchase authorizations
pub const BACKEND_SIGNER_ROLE: &str = "backendSigner";
