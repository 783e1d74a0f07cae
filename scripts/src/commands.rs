//! Implementations of the deploy CLI commands

use std::str::FromStr;

use alloy::{hex, primitives::Address, signers::local::PrivateKeySigner};
use deploy_common::{errors::DeployError, types::NetworkContext};
use deploy_core::{
    contracts::DirContractSource,
    env::DeployEnv,
    ledger::Ledger,
    scheduler::{RunReport, Scheduler, StepStatus},
    store::FileArtifactStore,
};
use deploy_utils::{
    asset_id::{pack_asset_id, AssetId},
    purchase::{sign_purchase as sign, PurchaseAuthorization},
};
use itertools::Itertools;
use tracing::info;

use crate::{
    cli::{AccountsArgs, AssetIdArgs, NetworkArgs, PlanArgs, RunArgs, SignPurchaseArgs},
    config::{DeployConfig, StepSettings},
    errors::ScriptError,
    rpc::RpcLedger,
    steps::register_all,
};

/// Run the selected steps against a network, printing a summary of their
/// outcomes & of the transactions left for other signers
pub async fn run_steps(args: RunArgs) -> Result<(), ScriptError> {
    let config = DeployConfig::load(&args.network.config)?;
    let (ledger, network) = connect(&args.network, &config).await?;

    let mut store = FileArtifactStore::open(
        &args.network.deployments_dir,
        &network.network_name,
        network.chain_id,
    )?;
    let deployments_path = store.path().to_path_buf();
    let contracts = DirContractSource::new(&args.network.artifacts_dir);

    let mut scheduler = Scheduler::new();
    register_all(&mut scheduler, &config.settings);

    let mut env = DeployEnv::new(&network, &mut store, &ledger, &contracts);
    let result = scheduler.run(&args.tags, &mut env).await;
    info!(path = %deployments_path.display(), "deployments written");

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            print_report(&e.report);
            Err(e.into())
        }
    }
}

/// Print the order the selected steps would run in
pub fn plan_steps(args: PlanArgs) -> Result<(), ScriptError> {
    let mut scheduler = Scheduler::new();
    register_all(&mut scheduler, &StepSettings::default());

    for (i, step) in scheduler.plan(&args.tags)?.iter().enumerate() {
        let at_end = if step.run_at_end { " (at end)" } else { "" };
        println!("{:>3}. {}{at_end} [tags: {}]", i + 1, step.name, step.tags.iter().join(", "));
    }

    Ok(())
}

/// Print the named & unnamed accounts of a network
pub async fn print_accounts(args: AccountsArgs) -> Result<(), ScriptError> {
    let config = DeployConfig::load(&args.network.config)?;
    let (_, network) = connect(&args.network, &config).await?;

    println!("{} (chain {})", network.network_name, network.chain_id);
    for (role, address) in &network.named_accounts {
        println!("  {role}: {address:#x}");
    }
    for address in &network.unnamed_accounts {
        println!("  (unnamed): {address:#x}");
    }

    Ok(())
}

/// Print a packed asset id
pub fn asset_id(args: AssetIdArgs) -> Result<(), ScriptError> {
    let id = pack_asset_id(&AssetId {
        creator: args.creator,
        is_nft: args.nft,
        pack_id: args.pack_id,
        num_fts: args.num_fts,
        pack_index: args.pack_index,
    })?;

    println!("{id} ({id:#x})");
    Ok(())
}

/// Sign a purchase authorization, printing the signature
pub fn sign_purchase(args: SignPurchaseArgs) -> Result<(), ScriptError> {
    let signer = parse_key(&args.pkey)?;
    let purchase = PurchaseAuthorization {
        buyer: args.buyer,
        catalyst_ids: args.catalyst_ids,
        catalyst_quantities: args.catalyst_quantities,
        gem_ids: args.gem_ids,
        gem_quantities: args.gem_quantities,
        nonce: args.nonce,
    };

    let signature = sign(&purchase, &signer)?;
    println!("signer:    {:#x}", signer.address());
    println!("digest:    {:#x}", purchase.digest());
    println!("signature: {}", hex::encode_prefixed(&signature));
    Ok(())
}

// -----------
// | Helpers |
// -----------

/// Connect to the selected network, resolving its named accounts
async fn connect(
    args: &NetworkArgs,
    config: &DeployConfig,
) -> Result<(RpcLedger, NetworkContext), ScriptError> {
    let network_config = config.network(&args.network)?;
    let rpc_url = args.rpc_url.as_deref().unwrap_or(&network_config.rpc_url);
    let keys = args.pkeys.iter().map(|k| parse_key(k)).collect::<Result<Vec<_>, _>>()?;

    let ledger = RpcLedger::new(rpc_url, keys, args.confirmations)?;
    let chain_id = ledger.chain_id().await?;
    if let Some(expected) = network_config.chain_id {
        if expected != chain_id {
            let mismatch = DeployError::ChainIdMismatch { recorded: expected, actual: chain_id };
            return Err(mismatch.into());
        }
    }

    let accounts: Vec<Address> = ledger
        .local_signers()
        .into_iter()
        .chain(network_config.remote_accounts.iter().copied())
        .unique()
        .collect();
    let network = config.named_accounts.resolve(&args.network, chain_id, &accounts)?;
    info!(network = %network.network_name, chain_id, accounts = accounts.len(), "connected");

    Ok((ledger, network))
}

/// Parse a hex-encoded private key
fn parse_key(key: &str) -> Result<PrivateKeySigner, ScriptError> {
    PrivateKeySigner::from_str(key.trim()).map_err(|e| ScriptError::InvalidKey(e.to_string()))
}

/// Print the outcome of every step, then the transactions awaiting other signers
fn print_report(report: &RunReport) {
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Executed => "executed".to_string(),
            StepStatus::Skipped => "skipped".to_string(),
            StepStatus::Deferred(n) => format!("deferred ({n} pending)"),
        };
        println!("{:<24} {status}", step.name);
    }

    if report.pending.is_empty() {
        return;
    }

    println!();
    println!("{} transaction(s) require signatures from other accounts:", report.pending.len());
    for pending in &report.pending {
        println!("  [{}] {pending}", pending.step);
    }
}
