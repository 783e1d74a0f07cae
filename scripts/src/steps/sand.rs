//! The SAND token & its super operators

use alloy::primitives::U256;
use async_trait::async_trait;
use deploy_common::errors::DeployError;
use deploy_core::{
    env::{DeployEnv, DeployOptions, Reconcile},
    step::{DeploymentStep, StepDescriptor},
};

use super::read_address;
use crate::constants::{
    DEPLOYER_ROLE, MARKETPLACE_CONTRACT_KEY, SAND_ADMIN_ROLE, SAND_BENEFICIARY_ROLE,
    SAND_CONTRACT_KEY,
};

/// Deploys SAND, minting the initial supply to the beneficiary
pub struct SandStep {
    /// The initial supply
    pub initial_supply: U256,
}

#[async_trait]
impl DeploymentStep for SandStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(SAND_CONTRACT_KEY).tags(&[SAND_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let admin = env.account(SAND_ADMIN_ROLE)?;
        let beneficiary = env.account(SAND_BENEFICIARY_ROLE)?;

        let options = DeployOptions {
            contract: SAND_CONTRACT_KEY.to_string(),
            from: deployer,
            args: vec![admin.into(), beneficiary.into(), self.initial_supply.into()],
        };
        env.deploy(SAND_CONTRACT_KEY, options).await?;

        Ok(())
    }
}

/// Makes the marketplace a SAND super operator, so it can move SAND on
/// behalf of buyers
pub struct SandSetupStep;

#[async_trait]
impl DeploymentStep for SandSetupStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new("Sand_setup")
            .tags(&["Sand_setup"])
            .dependencies(&[SAND_CONTRACT_KEY, MARKETPLACE_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let marketplace = env.get(MARKETPLACE_CONTRACT_KEY)?.address;
        let admin = read_address(env, SAND_CONTRACT_KEY, "getAdmin").await?;

        env.reconcile(Reconcile {
            contract: SAND_CONTRACT_KEY.to_string(),
            getter: "isSuperOperator".to_string(),
            getter_args: vec![marketplace.into()],
            desired: true.into(),
            setter: "setSuperOperator".to_string(),
            setter_args: vec![marketplace.into(), true.into()],
            from: admin,
        })
        .await?;

        Ok(())
    }
}
