use alloy::primitives::U256;
use deploy_common::types::ArgValue;
use deploy_core::{scheduler::StepStatus, store::ArtifactStore};
use eyre::Result;
use scripts::constants::{
    ASSET_CONTRACT_KEY, FAUCET_CONTRACT_KEY, GENESIS_MINTER_ROLE, LAND_ADMIN_ROLE,
    LAND_CONTRACT_KEY, LAND_PRESALE_CONTRACT_KEY, MARKETPLACE_CONTRACT_KEY, SAND_ADMIN_ROLE,
    SAND_CONTRACT_KEY,
};
use test_helpers::misc::DEV_CHAIN_ID;
use tests::utils::Catalog;

/// The chain ID of a public testnet
const TESTNET_CHAIN_ID: u64 = 4;

/// The steps of the suite, in the order a full run executes them
const FULL_ORDER: [&str; 11] = [
    "Sand",
    "Land",
    "Land_setup",
    "Land_reserved",
    "Asset",
    "Asset_setup",
    "Marketplace",
    "Sand_setup",
    "LandPreSale",
    "Faucet",
    "Land_change_admin",
];

#[tokio::test]
async fn test_full_run() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let report = catalog.run(&[]).await?;

    assert_eq!(report.order(), FULL_ORDER);
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Executed));
    assert!(report.pending.is_empty());

    // Seven deployments counting the proxy & its implementation, then eight
    // configuration transactions
    assert_eq!(catalog.ledger.tx_count(), 15);

    let land = catalog.address(LAND_CONTRACT_KEY)?;
    let sand = catalog.address(SAND_CONTRACT_KEY)?;
    let asset = catalog.address(ASSET_CONTRACT_KEY)?;
    let sale = catalog.address(LAND_PRESALE_CONTRACT_KEY)?;
    let marketplace = catalog.address(MARKETPLACE_CONTRACT_KEY)?;
    let faucet = catalog.address(FAUCET_CONTRACT_KEY)?;
    let yes = Some(ArgValue::Bool(true));

    let land_admin = catalog.account(LAND_ADMIN_ROLE)?;
    assert_eq!(catalog.ledger.value(land, "getAdmin", &[]), Some(land_admin.into()));
    assert_eq!(catalog.ledger.value(land, "isMinter", &[sale.into()]), yes);
    assert_eq!(catalog.ledger.value(sand, "isSuperOperator", &[marketplace.into()]), yes);
    assert_eq!(catalog.ledger.value(sand, "isSuperOperator", &[faucet.into()]), yes);

    let minter = catalog.account(GENESIS_MINTER_ROLE)?;
    assert_eq!(catalog.ledger.value(asset, "isBouncer", &[minter.into()]), yes);

    let quad: Vec<ArgValue> = [24_u64, 0, 0].into_iter().map(|v| U256::from(v).into()).collect();
    assert_eq!(catalog.ledger.value(land, "exists", &quad), yes);
    Ok(())
}

#[tokio::test]
async fn test_second_run_sends_nothing() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    catalog.run(&[]).await?;
    let records = catalog.store.records().clone();
    let txs = catalog.ledger.tx_count();

    let report = catalog.run(&[]).await?;

    assert_eq!(catalog.ledger.tx_count(), txs);
    assert_eq!(catalog.store.records(), &records);
    assert_eq!(report.order(), FULL_ORDER);
    assert!(report.pending.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_faucet_only_on_development_chains() -> Result<()> {
    let mut catalog = Catalog::new(TESTNET_CHAIN_ID, &[])?;

    let report = catalog.run(&[]).await?;

    assert_eq!(report.status(FAUCET_CONTRACT_KEY), Some(StepStatus::Skipped));
    assert!(catalog.store.get_or_none(FAUCET_CONTRACT_KEY).is_none());
    assert_eq!(catalog.ledger.tx_count(), 13);
    Ok(())
}

#[tokio::test]
async fn test_remote_sand_admin_defers() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[SAND_ADMIN_ROLE])?;
    let sand_admin = catalog.account(SAND_ADMIN_ROLE)?;

    let report = catalog.run(&[]).await?;

    // Every step still runs; the super operator grants await the SAND admin
    assert_eq!(report.order(), FULL_ORDER);
    assert_eq!(report.status("Sand_setup"), Some(StepStatus::Deferred(1)));
    assert_eq!(report.status(FAUCET_CONTRACT_KEY), Some(StepStatus::Deferred(1)));
    assert_eq!(report.status("Land_change_admin"), Some(StepStatus::Executed));
    assert_eq!(report.pending.len(), 2);
    assert!(report.pending.iter().all(|p| p.required_signer == sand_admin));
    assert!(report.pending.iter().all(|p| p.method == "setSuperOperator"));
    assert_eq!(catalog.ledger.tx_count(), 13);

    // Until the SAND admin signs, reruns report the same transactions
    let rerun = catalog.run(&[]).await?;
    assert_eq!(rerun.pending, report.pending);
    assert_eq!(catalog.ledger.tx_count(), 13);
    Ok(())
}

#[tokio::test]
async fn test_tag_selection() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let report = catalog.run(&[LAND_PRESALE_CONTRACT_KEY]).await?;

    assert_eq!(
        report.order(),
        vec!["Sand", "Land", "Land_setup", "LandPreSale", "Land_change_admin"]
    );
    assert!(catalog.store.get_or_none(ASSET_CONTRACT_KEY).is_none());
    assert!(catalog.store.get_or_none(MARKETPLACE_CONTRACT_KEY).is_none());
    Ok(())
}

#[tokio::test]
async fn test_asset_upgrade() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    catalog.run(&[]).await?;
    let asset = catalog.store.get(ASSET_CONTRACT_KEY)?;
    let txs = catalog.ledger.tx_count();

    catalog.set_asset_version(2)?;
    let report = catalog.run(&[ASSET_CONTRACT_KEY]).await?;

    assert_eq!(report.order(), vec![SAND_CONTRACT_KEY, ASSET_CONTRACT_KEY]);
    assert_eq!(catalog.ledger.tx_count(), txs + 2);

    let upgraded = catalog.store.get(ASSET_CONTRACT_KEY)?;
    assert_eq!(upgraded.address, asset.address);
    assert_eq!(upgraded.upgrade_index, asset.upgrade_index + 1);
    assert_ne!(upgraded.implementation, asset.implementation);
    assert_eq!(catalog.ledger.implementation(asset.address), upgraded.implementation);

    // State held by the proxy survives the upgrade
    let minter = catalog.account(GENESIS_MINTER_ROLE)?;
    let bouncer = catalog.ledger.value(asset.address, "isBouncer", &[minter.into()]);
    assert_eq!(bouncer, Some(ArgValue::Bool(true)));
    Ok(())
}
