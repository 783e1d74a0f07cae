use async_trait::async_trait;
use deploy_common::{
    errors::{DeployError, SchedulerError},
    types::{ArgValue, TxOutcome},
};
use deploy_core::{
    env::DeployEnv,
    scheduler::{Scheduler, StepStatus},
    step::{DeploymentStep, StepDescriptor},
    store::ArtifactStore,
};
use eyre::Result;
use scripts::constants::{DEPLOYER_ROLE, SAND_ADMIN_ROLE, SAND_CONTRACT_KEY};
use test_helpers::{
    misc::{account, DEV_CHAIN_ID},
    steps::{StepLog, TestStep},
};
use tests::utils::Catalog;

/// Grants a super operator on SAND from the SAND admin
struct GrantStep;

#[async_trait]
impl DeploymentStep for GrantStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new("Grant").tags(&["Grant"])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let admin = env.account(SAND_ADMIN_ROLE)?;
        let args = vec![account("operator").into(), true.into()];
        env.execute(SAND_CONTRACT_KEY, admin, "setSuperOperator", args).await?.into_result()?;
        Ok(())
    }
}

#[tokio::test]
async fn test_local_signer_executes() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    let sand = catalog.deploy_sand().await?;
    let admin = catalog.account(SAND_ADMIN_ROLE)?;
    let operator = account("operator");

    let mut env = catalog.env();
    let args = vec![operator.into(), true.into()];
    let outcome = env.execute(SAND_CONTRACT_KEY, admin, "setSuperOperator", args).await?;
    assert!(outcome.receipt().is_some());
    assert!(env.pending().is_empty());
    drop(env);

    let granted = catalog.ledger.value(sand, "isSuperOperator", &[operator.into()]);
    assert_eq!(granted, Some(ArgValue::Bool(true)));
    assert_eq!(catalog.ledger.tx_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_remote_signer_defers() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[SAND_ADMIN_ROLE])?;
    let sand = catalog.deploy_sand().await?;
    let admin = catalog.account(SAND_ADMIN_ROLE)?;
    let operator = account("operator");

    let mut env = catalog.env();
    let args = vec![operator.into(), true.into()];
    let outcome = env.execute(SAND_CONTRACT_KEY, admin, "setSuperOperator", args).await?;
    assert_eq!(env.pending().len(), 1);
    drop(env);

    let pending = match outcome {
        TxOutcome::Deferred(pending) => pending,
        other => panic!("expected a deferred outcome, got {other:?}"),
    };
    assert_eq!(pending.required_signer, admin);
    assert_eq!(pending.to, sand);
    assert_eq!(pending.target_contract, SAND_CONTRACT_KEY);
    assert_eq!(pending.method, "setSuperOperator");
    assert!(pending.to_string().starts_with("Sand.setSuperOperator("));

    // Only the deployment reached the ledger
    assert_eq!(catalog.ledger.tx_count(), 1);
    assert_eq!(catalog.ledger.value(sand, "isSuperOperator", &[operator.into()]), None);
    Ok(())
}

#[tokio::test]
async fn test_reverted_transaction_fails() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[])?;
    catalog.deploy_sand().await?;
    catalog.ledger.revert_on("setSuperOperator");
    let admin = catalog.account(SAND_ADMIN_ROLE)?;

    let mut env = catalog.env();
    let args = vec![account("operator").into(), true.into()];
    let outcome = env.execute(SAND_CONTRACT_KEY, admin, "setSuperOperator", args).await?;
    assert!(env.pending().is_empty());
    drop(env);

    assert!(matches!(outcome, TxOutcome::Failed(DeployError::TransactionReverted(_))));
    let txs = catalog.ledger.transactions();
    assert!(txs.last().is_some_and(|tx| tx.reverted));
    Ok(())
}

#[tokio::test]
async fn test_deploy_requires_local_signer() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[DEPLOYER_ROLE])?;
    let deployer = catalog.account(DEPLOYER_ROLE)?;
    let options = catalog.sand_options()?;

    let err = catalog.env().deploy(SAND_CONTRACT_KEY, options).await.unwrap_err();

    assert!(matches!(err, DeployError::SignerUnavailable(signer) if signer == deployer));
    assert!(catalog.store.get_or_none(SAND_CONTRACT_KEY).is_none());
    assert_eq!(catalog.ledger.tx_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_deferred_step_reported() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[SAND_ADMIN_ROLE])?;
    catalog.deploy_sand().await?;

    let log = StepLog::default();
    let mut scheduler = Scheduler::new();
    scheduler.register(GrantStep).register(TestStep::new(
        StepDescriptor::new("After").tags(&["After"]).dependencies(&["Grant"]),
        &log,
    ));

    let report = scheduler.run(&[], &mut catalog.env()).await?;

    assert_eq!(report.status("Grant"), Some(StepStatus::Deferred(1)));
    assert_eq!(report.status("After"), Some(StepStatus::Executed));
    assert_eq!(report.pending.len(), 1);
    assert_eq!(report.pending[0].step, "Grant");
    assert_eq!(report.pending[0].required_signer, catalog.account(SAND_ADMIN_ROLE)?);
    Ok(())
}

#[tokio::test]
async fn test_deferred_signatures_survive_failed_run() -> Result<()> {
    let mut catalog = Catalog::new(DEV_CHAIN_ID, &[SAND_ADMIN_ROLE])?;
    catalog.deploy_sand().await?;

    let log = StepLog::default();
    let mut scheduler = Scheduler::new();
    scheduler.register(GrantStep).register(
        TestStep::new(StepDescriptor::new("After").tags(&["After"]).dependencies(&["Grant"]), &log)
            .failing(),
    );

    let err = scheduler.run(&[], &mut catalog.env()).await.unwrap_err();

    assert!(matches!(err.source, SchedulerError::StepExecution { ref step, .. } if step == "After"));
    assert_eq!(err.report.status("Grant"), Some(StepStatus::Deferred(1)));
    assert_eq!(err.report.pending.len(), 1);
    assert_eq!(err.report.pending[0].step, "Grant");
    assert_eq!(err.report.pending[0].method, "setSuperOperator");
    Ok(())
}
