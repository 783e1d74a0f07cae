//! Definitions of CLI arguments and commands for the deploy CLI

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{asset_id, plan_steps, print_accounts, run_steps, sign_purchase},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_PATH, DEFAULT_CONFIRMATIONS, DEFAULT_DEPLOYMENTS_DIR,
    },
    errors::ScriptError,
};

/// Deploy & configure the contract suite
#[derive(Parser)]
#[command(name = "deploy")]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The commands of the deploy CLI
#[derive(Subcommand)]
pub enum Command {
    /// Run the deployment steps selected by tag
    Run(RunArgs),
    /// Print the order the selected steps would run in
    Plan(PlanArgs),
    /// Print the named & unnamed accounts of a network
    Accounts(AccountsArgs),
    /// Print a packed asset id
    AssetId(AssetIdArgs),
    /// Sign a purchase authorization
    SignPurchase(SignPurchaseArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self) -> Result<(), ScriptError> {
        match self {
            Command::Run(args) => run_steps(args).await,
            Command::Plan(args) => plan_steps(args),
            Command::Accounts(args) => print_accounts(args).await,
            Command::AssetId(args) => asset_id(args),
            Command::SignPurchase(args) => sign_purchase(args),
        }
    }
}

/// Selection of the network to run against, and of the keys to sign with
#[derive(Args)]
pub struct NetworkArgs {
    /// The name of the network, as configured
    #[arg(short, long)]
    pub network: String,

    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override of the network's configured RPC URL
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Private keys held locally; repeat the flag or comma-separate
    #[arg(long = "pkey", env = "PKEYS", value_delimiter = ',', hide_env_values = true)]
    pub pkeys: Vec<String>,

    /// Blocks to wait on top of each transaction before accepting its receipt
    #[arg(long, env = "CONFIRMATIONS", default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Directory deployments files are written to
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments_dir: PathBuf,

    /// Directory compiled artifacts are read from
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,
}

/// Run the deployment steps selected by tag
#[derive(Args)]
pub struct RunArgs {
    /// The network to run against
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Tags selecting the steps to run, along with their dependencies.
    /// Every step runs if none are given.
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Print the order the selected steps would run in
#[derive(Args)]
pub struct PlanArgs {
    /// Tags selecting the steps to plan
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Print the accounts of a network
#[derive(Args)]
pub struct AccountsArgs {
    /// The network whose accounts to print
    #[command(flatten)]
    pub network: NetworkArgs,
}

/// Print a packed asset id
#[derive(Args)]
pub struct AssetIdArgs {
    /// The creator of the asset
    #[arg(long)]
    pub creator: Address,

    /// Whether the asset is non-fungible
    #[arg(long)]
    pub nft: bool,

    /// The pack the asset was minted in
    #[arg(long)]
    pub pack_id: u32,

    /// The number of fungible types in the pack
    #[arg(long, default_value_t = 0)]
    pub num_fts: u16,

    /// The asset's index within the pack
    #[arg(long, default_value_t = 0)]
    pub pack_index: u16,
}

/// Sign a purchase authorization
#[derive(Args)]
pub struct SignPurchaseArgs {
    /// The private key of the backend signer
    #[arg(long, env = "BACKEND_PKEY", hide_env_values = true)]
    pub pkey: String,

    /// The buyer
    #[arg(long)]
    pub buyer: Address,

    /// The ids of the purchased catalysts
    #[arg(long, value_delimiter = ',')]
    pub catalyst_ids: Vec<U256>,

    /// The quantity of each purchased catalyst
    #[arg(long, value_delimiter = ',')]
    pub catalyst_quantities: Vec<U256>,

    /// The ids of the purchased gems
    #[arg(long, value_delimiter = ',')]
    pub gem_ids: Vec<U256>,

    /// The quantity of each purchased gem
    #[arg(long, value_delimiter = ',')]
    pub gem_quantities: Vec<U256>,

    /// The buyer's purchase nonce
    #[arg(long)]
    pub nonce: U256,
}
