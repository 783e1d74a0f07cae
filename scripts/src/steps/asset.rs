//! The upgradeable asset registry & its genesis bouncer

use async_trait::async_trait;
use deploy_common::errors::DeployError;
use deploy_core::{
    env::{DeployEnv, ProxyOptions, Reconcile},
    step::{DeploymentStep, StepDescriptor},
};
use tracing::info;

use super::read_address;
use crate::constants::{
    ASSET_ADMIN_ROLE, ASSET_BOUNCER_ADMIN_ROLE, ASSET_CONTRACT_KEY, DEPLOYER_ROLE,
    GENESIS_MINTER_ROLE, PROXY_ADMIN_ROLE, PROXY_CONTRACT, SAND_CONTRACT_KEY,
};

/// Deploys the asset registry behind a transparent proxy, upgrading the proxy
/// whenever the implementation changes
pub struct AssetStep;

#[async_trait]
impl DeploymentStep for AssetStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(ASSET_CONTRACT_KEY)
            .tags(&[ASSET_CONTRACT_KEY])
            .dependencies(&[SAND_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let proxy_admin = env.account(PROXY_ADMIN_ROLE)?;
        let asset_admin = env.account(ASSET_ADMIN_ROLE)?;
        let bouncer_admin = env.account(ASSET_BOUNCER_ADMIN_ROLE)?;
        let sand = env.get(SAND_CONTRACT_KEY)?.address;

        let options = ProxyOptions {
            contract: ASSET_CONTRACT_KEY.to_string(),
            proxy_contract: PROXY_CONTRACT.to_string(),
            from: deployer,
            admin: proxy_admin,
            init: Some((
                "init".to_string(),
                vec![sand.into(), asset_admin.into(), bouncer_admin.into()],
            )),
        };
        let deployment = env.deploy_proxy(ASSET_CONTRACT_KEY, options).await?;
        if let Some(upgrade) = &deployment.upgrade {
            info!(
                implementation = %deployment.implementation.address,
                deferred = upgrade.is_deferred(),
                "asset proxy upgrade submitted"
            );
        }

        Ok(())
    }
}

/// Appoints the genesis minter as an asset bouncer
pub struct AssetSetupStep;

#[async_trait]
impl DeploymentStep for AssetSetupStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new("Asset_setup")
            .tags(&["Asset_setup"])
            .dependencies(&[ASSET_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let minter = env.account(GENESIS_MINTER_ROLE)?;
        let bouncer_admin = read_address(env, ASSET_CONTRACT_KEY, "getBouncerAdmin").await?;

        env.reconcile(Reconcile {
            contract: ASSET_CONTRACT_KEY.to_string(),
            getter: "isBouncer".to_string(),
            getter_args: vec![minter.into()],
            desired: true.into(),
            setter: "setBouncer".to_string(),
            setter_args: vec![minter.into(), true.into()],
            from: bouncer_admin,
        })
        .await?;

        Ok(())
    }
}
