use alloy::primitives::U256;
use deploy_common::{
    constants::IMPLEMENTATION_SUFFIX,
    errors::DeployError,
    types::{ArgValue, TxOutcome},
};
use deploy_core::{
    env::{Converged, Reconcile},
    store::ArtifactStore,
};
use eyre::Result;
use scripts::constants::{
    ASSET_CONTRACT_KEY, GENESIS_MINTER_ROLE, PROXY_ADMIN_ROLE, SAND_ADMIN_ROLE, SAND_CONTRACT_KEY,
};
use test_helpers::misc::{account, DEV_CHAIN_ID};
use tests::utils::Catalog;

/// A reconcile granting `operator` super operator rights on SAND
fn grant(catalog: &Catalog, operator: &str) -> Result<Reconcile> {
    let operator = account(operator);
    Ok(Reconcile {
        contract: SAND_CONTRACT_KEY.to_string(),
        getter: "isSuperOperator".to_string(),
        getter_args: vec![operator.into()],
        desired: true.into(),
        setter: "setSuperOperator".to_string(),
        setter_args: vec![operator.into(), true.into()],
        from: catalog.account(SAND_ADMIN_ROLE)?,
    })
}

// ---------------------
// | DEPLOY IF MISSING |
// ---------------------

#[tokio::test]
async fn test_deploy_if_missing() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;

    let options = catalog.sand_options()?;
    let first = catalog.env().deploy(SAND_CONTRACT_KEY, options.clone()).await?;
    let second = catalog.env().deploy(SAND_CONTRACT_KEY, options).await?;

    assert!(first.newly_deployed);
    assert!(!second.newly_deployed);
    assert_eq!(first.record, second.record);
    assert_eq!(catalog.ledger.tx_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_recorded_deployment_wins() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    let address = catalog.deploy_sand().await?;

    // Changed constructor arguments do not trigger a redeployment
    let mut options = catalog.sand_options()?;
    options.args[2] = U256::from(42).into();
    let deployment = catalog.env().deploy(SAND_CONTRACT_KEY, options).await?;

    assert!(!deployment.newly_deployed);
    assert_eq!(deployment.record.address, address);
    assert_eq!(deployment.record.constructor_args[2], ArgValue::Uint(U256::from(1_000_000)));
    assert_eq!(catalog.ledger.tx_count(), 1);
    Ok(())
}

// -------------
// | RECONCILE |
// -------------

#[tokio::test]
async fn test_reconcile_converges() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    let sand = catalog.deploy_sand().await?;

    let reconcile = grant(&catalog, "operator")?;
    let first = catalog.env().reconcile(reconcile.clone()).await?;
    let second = catalog.env().reconcile(reconcile).await?;

    assert!(matches!(first, Converged::Submitted(TxOutcome::Executed(_))));
    assert!(matches!(second, Converged::AlreadySet));
    assert_eq!(catalog.ledger.tx_count(), 2);
    assert_eq!(
        catalog.ledger.value(sand, "isSuperOperator", &[account("operator").into()]),
        Some(ArgValue::Bool(true))
    );
    Ok(())
}

#[tokio::test]
async fn test_reconcile_after_out_of_band_change() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    let sand = catalog.deploy_sand().await?;
    let reconcile = grant(&catalog, "operator")?;
    catalog.env().reconcile(reconcile.clone()).await?;

    let args: [ArgValue; 1] = [account("operator").into()];
    catalog.ledger.set_value(sand, "isSuperOperator", &args, false.into());
    let converged = catalog.env().reconcile(reconcile).await?;

    assert!(matches!(converged, Converged::Submitted(TxOutcome::Executed(_))));
    assert_eq!(catalog.ledger.tx_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_reconcile_failed_setter_errors() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    catalog.deploy_sand().await?;
    catalog.ledger.revert_on("setSuperOperator");

    let reconcile = grant(&catalog, "operator")?;
    let err = catalog.env().reconcile(reconcile).await.unwrap_err();

    assert!(matches!(err, DeployError::TransactionReverted(_)));
    Ok(())
}

#[tokio::test]
async fn test_reconcile_deferred_setter() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[SAND_ADMIN_ROLE])?;
    catalog.deploy_sand().await?;

    let reconcile = grant(&catalog, "operator")?;
    let converged = catalog.env().reconcile(reconcile).await?;

    assert!(matches!(converged, Converged::Submitted(TxOutcome::Deferred(_))));
    assert_eq!(catalog.ledger.tx_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_reconcile_unknown_getter() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    catalog.deploy_sand().await?;

    let mut reconcile = grant(&catalog, "operator")?;
    reconcile.getter = "isOperator".to_string();
    let err = catalog.env().reconcile(reconcile).await.unwrap_err();

    assert!(matches!(err, DeployError::UnknownMethod { ref method, .. } if method == "isOperator"));
    assert_eq!(catalog.ledger.tx_count(), 1);
    Ok(())
}

// -----------
// | PROXIES |
// -----------

#[tokio::test]
async fn test_proxy_deploy_is_idempotent() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    let sand = catalog.deploy_sand().await?;

    let options = catalog.asset_options(sand)?;
    let first = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options.clone()).await?;
    let txs = catalog.ledger.tx_count();
    let second = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options).await?;

    assert!(first.newly_deployed && first.upgrade.is_none());
    assert!(!second.newly_deployed && second.upgrade.is_none());
    assert_eq!(first.record, second.record);
    assert_eq!(catalog.ledger.tx_count(), txs);

    let proxy = first.record.address;
    assert_eq!(first.record.implementation, Some(first.implementation.address));
    assert_eq!(catalog.ledger.implementation(proxy), Some(first.implementation.address));

    // The initializer ran against the proxy's state
    let bouncer_admin = catalog.ledger.value(proxy, "getBouncerAdmin", &[]);
    assert!(bouncer_admin.is_some());

    // The proxy record speaks the implementation's ABI
    let minter = catalog.account(GENESIS_MINTER_ROLE)?;
    let values = catalog.env().read(ASSET_CONTRACT_KEY, "isBouncer", vec![minter.into()]).await?;
    assert_eq!(values, vec![ArgValue::Bool(false)]);
    Ok(())
}

#[tokio::test]
async fn test_proxy_upgrade() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    let sand = catalog.deploy_sand().await?;
    let options = catalog.asset_options(sand)?;
    let v1 = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options.clone()).await?;

    catalog.set_asset_version(2)?;
    let txs = catalog.ledger.tx_count();
    let v2 = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options.clone()).await?;

    // A new implementation & an upgrade, nothing else
    assert_eq!(catalog.ledger.tx_count(), txs + 2);
    assert!(!v2.newly_deployed);
    assert!(matches!(v2.upgrade, Some(TxOutcome::Executed(_))));
    assert_ne!(v2.implementation.address, v1.implementation.address);
    assert_eq!(v2.implementation.upgrade_index, 1);

    assert_eq!(v2.record.address, v1.record.address);
    assert_eq!(v2.record.upgrade_index, 1);
    assert_eq!(v2.record.implementation, Some(v2.implementation.address));
    assert_eq!(catalog.ledger.implementation(v2.record.address), Some(v2.implementation.address));

    let implementation_name = format!("{ASSET_CONTRACT_KEY}{IMPLEMENTATION_SUFFIX}");
    assert_eq!(catalog.store.get(&implementation_name)?.address, v2.implementation.address);

    // Converged
    let again = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options).await?;
    assert!(again.upgrade.is_none());
    assert_eq!(catalog.ledger.tx_count(), txs + 2);
    Ok(())
}

#[tokio::test]
async fn test_proxy_upgrade_deferred_to_remote_admin() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[PROXY_ADMIN_ROLE])?;
    let sand = catalog.deploy_sand().await?;
    let options = catalog.asset_options(sand)?;
    let v1 = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options.clone()).await?;

    catalog.set_asset_version(2)?;
    let mut env = catalog.env();
    let v2 = env.deploy_proxy(ASSET_CONTRACT_KEY, options.clone()).await?;
    assert_eq!(env.pending().len(), 1);
    drop(env);

    let pending = match v2.upgrade {
        Some(TxOutcome::Deferred(pending)) => pending,
        other => panic!("expected a deferred upgrade, got {other:?}"),
    };
    assert_eq!(pending.required_signer, catalog.account(PROXY_ADMIN_ROLE)?);
    assert_eq!(pending.to, v1.record.address);

    // The proxy still points at the old implementation, and its record says so
    assert_eq!(catalog.ledger.implementation(v1.record.address), Some(v1.implementation.address));
    assert_eq!(v2.record, v1.record);

    // A rerun sends nothing new & defers the same upgrade
    let txs = catalog.ledger.tx_count();
    let rerun = catalog.env().deploy_proxy(ASSET_CONTRACT_KEY, options).await?;
    assert!(matches!(rerun.upgrade, Some(TxOutcome::Deferred(_))));
    assert_eq!(catalog.ledger.tx_count(), txs);
    Ok(())
}
