//! A SAND faucet, deployed to development chains only

use async_trait::async_trait;
use deploy_common::errors::DeployError;
use deploy_core::{
    env::{DeployEnv, DeployOptions, Reconcile},
    step::{DeploymentStep, StepDescriptor},
};

use super::read_address;
use crate::constants::{DEPLOYER_ROLE, FAUCET_CONTRACT_KEY, SAND_CONTRACT_KEY};

/// Deploys the faucet & lets it move SAND
pub struct FaucetStep;

#[async_trait]
impl DeploymentStep for FaucetStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(FAUCET_CONTRACT_KEY)
            .tags(&[FAUCET_CONTRACT_KEY])
            .dependencies(&[SAND_CONTRACT_KEY])
    }

    async fn skip(&self, env: &DeployEnv<'_>) -> Result<bool, DeployError> {
        Ok(!env.network().is_development())
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let sand = env.get(SAND_CONTRACT_KEY)?.address;

        let options = DeployOptions {
            contract: FAUCET_CONTRACT_KEY.to_string(),
            from: deployer,
            args: vec![sand.into()],
        };
        let faucet = env.deploy(FAUCET_CONTRACT_KEY, options).await?.record.address;

        let admin = read_address(env, SAND_CONTRACT_KEY, "getAdmin").await?;
        env.reconcile(Reconcile {
            contract: SAND_CONTRACT_KEY.to_string(),
            getter: "isSuperOperator".to_string(),
            getter_args: vec![faucet.into()],
            desired: true.into(),
            setter: "setSuperOperator".to_string(),
            setter_args: vec![faucet.into(), true.into()],
            from: admin,
        })
        .await?;

        Ok(())
    }
}
