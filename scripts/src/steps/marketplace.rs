//! The asset marketplace

use async_trait::async_trait;
use deploy_common::errors::DeployError;
use deploy_core::{
    env::{DeployEnv, DeployOptions},
    step::{DeploymentStep, StepDescriptor},
};

use crate::constants::{
    BACKEND_SIGNER_ROLE, DEPLOYER_ROLE, MARKETPLACE_ADMIN_ROLE, MARKETPLACE_CONTRACT_KEY,
    SAND_CONTRACT_KEY,
};

/// Deploys the marketplace, settling in SAND against offers signed by the backend
pub struct MarketplaceStep;

#[async_trait]
impl DeploymentStep for MarketplaceStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(MARKETPLACE_CONTRACT_KEY)
            .tags(&[MARKETPLACE_CONTRACT_KEY])
            .dependencies(&[SAND_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let admin = env.account(MARKETPLACE_ADMIN_ROLE)?;
        let signer = env.account(BACKEND_SIGNER_ROLE)?;
        let sand = env.get(SAND_CONTRACT_KEY)?.address;

        let options = DeployOptions {
            contract: MARKETPLACE_CONTRACT_KEY.to_string(),
            from: deployer,
            args: vec![sand.into(), admin.into(), signer.into()],
        };
        env.deploy(MARKETPLACE_CONTRACT_KEY, options).await?;

        Ok(())
    }
}
