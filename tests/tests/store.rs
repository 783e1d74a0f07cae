use std::fs;

use deploy_common::errors::DeployError;
use deploy_core::store::{ArtifactStore, FileArtifactStore};
use eyre::Result;
use scripts::constants::{LAND_CONTRACT_KEY, SAND_CONTRACT_KEY};
use serde_json::Value;
use test_helpers::{ledger::CONSTRUCTOR, misc::DEV_CHAIN_ID};
use tests::utils::Catalog;

#[tokio::test]
async fn test_deployments_survive_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let mut store = FileArtifactStore::open(dir.path(), "localhost", DEV_CHAIN_ID)?;
    catalog.run_with_store(&mut store, &[]).await?;
    let names = store.names();
    let sand = store.get(SAND_CONTRACT_KEY)?;
    drop(store);

    // A fresh process picks up where the last left off, sending nothing
    let txs = catalog.ledger.tx_count();
    let mut reopened = FileArtifactStore::open(dir.path(), "localhost", DEV_CHAIN_ID)?;
    assert_eq!(reopened.names(), names);
    assert_eq!(reopened.get(SAND_CONTRACT_KEY)?, sand);

    catalog.run_with_store(&mut reopened, &[]).await?;
    assert_eq!(catalog.ledger.tx_count(), txs);
    Ok(())
}

#[tokio::test]
async fn test_resume_after_partial_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let mut store = FileArtifactStore::open(dir.path(), "localhost", DEV_CHAIN_ID)?;
    catalog.run_with_store(&mut store, &[SAND_CONTRACT_KEY]).await?;
    let sand = store.get(SAND_CONTRACT_KEY)?;
    assert!(store.get_or_none(LAND_CONTRACT_KEY).is_none());
    drop(store);

    let mut reopened = FileArtifactStore::open(dir.path(), "localhost", DEV_CHAIN_ID)?;
    let report = catalog.run_with_store(&mut reopened, &[]).await?;

    assert_eq!(reopened.get(SAND_CONTRACT_KEY)?, sand);
    assert!(reopened.get_or_none(LAND_CONTRACT_KEY).is_some());
    assert_eq!(report.order().first(), Some(&SAND_CONTRACT_KEY));

    // SAND was deployed exactly once
    let sand_deploys = catalog
        .ledger
        .transactions()
        .into_iter()
        .filter(|tx| tx.to == sand.address && tx.method == CONSTRUCTOR)
        .count();
    assert_eq!(sand_deploys, 1);
    Ok(())
}

#[tokio::test]
async fn test_deployments_file_layout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let mut store = FileArtifactStore::open(dir.path(), "localhost", DEV_CHAIN_ID)?;
    catalog.run_with_store(&mut store, &[SAND_CONTRACT_KEY]).await?;

    let contents: Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
    assert_eq!(store.path(), dir.path().join("localhost.json"));
    assert_eq!(contents["chain_id"], DEV_CHAIN_ID);

    let sand = &contents["deployments"][SAND_CONTRACT_KEY];
    assert_eq!(sand["name"], SAND_CONTRACT_KEY);
    assert_eq!(sand["upgrade_index"], 0);
    assert!(sand["address"].is_string());
    assert!(sand["abi"].is_array());
    assert_eq!(sand["constructor_args"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn test_deployments_from_another_chain_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let mut store = FileArtifactStore::open(dir.path(), "localhost", DEV_CHAIN_ID)?;
    catalog.run_with_store(&mut store, &[SAND_CONTRACT_KEY]).await?;

    let err = FileArtifactStore::open(dir.path(), "localhost", 1).unwrap_err();
    assert!(matches!(
        err,
        DeployError::ChainIdMismatch { recorded, actual: 1 } if recorded == DEV_CHAIN_ID
    ));
    Ok(())
}
