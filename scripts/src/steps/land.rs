//! The LAND registry: deployment, minters, reserved quads and the final
//! hand-over to the LAND admin

use alloy::primitives::{Bytes, U256};
use async_trait::async_trait;
use deploy_common::{errors::DeployError, types::ArgValue};
use deploy_core::{
    env::{DeployEnv, DeployOptions, Reconcile},
    step::{DeploymentStep, StepDescriptor},
};
use deploy_utils::land::quad_id;
use tracing::info;

use super::{config_error, read_address};
use crate::{
    config::QuadSettings,
    constants::{
        DEPLOYER_ROLE, LAND_ADMIN_ROLE, LAND_CONTRACT_KEY, LAND_RESERVE_ROLE, SAND_CONTRACT_KEY,
    },
};

/// The tag advertised by the steps configuring LAND
const LAND_SETUP_TAG: &str = "Land_setup";

/// Deploys LAND, administered by the deployer until setup completes
pub struct LandStep;

#[async_trait]
impl DeploymentStep for LandStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(LAND_CONTRACT_KEY)
            .tags(&[LAND_CONTRACT_KEY])
            .dependencies(&[SAND_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let sand = env.get(SAND_CONTRACT_KEY)?.address;

        let options = DeployOptions {
            contract: LAND_CONTRACT_KEY.to_string(),
            from: deployer,
            args: vec![sand.into(), deployer.into()],
        };
        env.deploy(LAND_CONTRACT_KEY, options).await?;

        Ok(())
    }
}

/// Makes the deployer a LAND minter
pub struct LandSetupStep;

#[async_trait]
impl DeploymentStep for LandSetupStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(LAND_SETUP_TAG)
            .tags(&[LAND_SETUP_TAG])
            .dependencies(&[LAND_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let admin = read_address(env, LAND_CONTRACT_KEY, "getAdmin").await?;

        env.reconcile(Reconcile {
            contract: LAND_CONTRACT_KEY.to_string(),
            getter: "isMinter".to_string(),
            getter_args: vec![deployer.into()],
            desired: true.into(),
            setter: "setMinter".to_string(),
            setter_args: vec![deployer.into(), true.into()],
            from: admin,
        })
        .await?;

        Ok(())
    }
}

/// Hands LAND over to the LAND admin, once every other step is done with it
pub struct LandAdminStep;

#[async_trait]
impl DeploymentStep for LandAdminStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new("Land_change_admin")
            .tags(&[LAND_SETUP_TAG])
            .dependencies(&[LAND_CONTRACT_KEY])
            .run_at_end()
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let land_admin = env.account(LAND_ADMIN_ROLE)?;
        let current = read_address(env, LAND_CONTRACT_KEY, "getAdmin").await?;

        env.reconcile(Reconcile {
            contract: LAND_CONTRACT_KEY.to_string(),
            getter: "getAdmin".to_string(),
            getter_args: vec![],
            desired: land_admin.into(),
            setter: "changeAdmin".to_string(),
            setter_args: vec![land_admin.into()],
            from: current,
        })
        .await?;

        Ok(())
    }
}

/// Mints the reserved quads to the LAND reserve
pub struct LandReservedStep {
    /// The reserved quads
    pub quads: Vec<QuadSettings>,
}

#[async_trait]
impl DeploymentStep for LandReservedStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new("Land_reserved")
            .tags(&["Land_reserved"])
            .dependencies(&[LAND_SETUP_TAG])
    }

    async fn skip(&self, _env: &DeployEnv<'_>) -> Result<bool, DeployError> {
        Ok(self.quads.is_empty())
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let reserve = env.account(LAND_RESERVE_ROLE)?;

        for &QuadSettings { size, x, y } in &self.quads {
            let id = quad_id(size, x, y).map_err(config_error)?;
            info!(size, x, y, %id, "reserving quad");

            let coordinates: Vec<ArgValue> =
                [size, x, y].into_iter().map(|v| U256::from(v).into()).collect();
            let mut mint_args = vec![ArgValue::Address(reserve)];
            mint_args.extend(coordinates.iter().cloned());
            mint_args.push(Bytes::new().into());

            env.reconcile(Reconcile {
                contract: LAND_CONTRACT_KEY.to_string(),
                getter: "exists".to_string(),
                getter_args: coordinates,
                desired: true.into(),
                setter: "mintQuad".to_string(),
                setter_args: mint_args,
                from: deployer,
            })
            .await?;
        }

        Ok(())
    }
}
