//! The LAND presale

use async_trait::async_trait;
use deploy_common::errors::DeployError;
use deploy_core::{
    env::{DeployEnv, DeployOptions, Reconcile},
    step::{DeploymentStep, StepDescriptor},
};
use deploy_utils::pricing::{quad_price, usd_to_token};
use tracing::info;

use super::{config_error, read_address};
use crate::{
    config::LandSaleSettings,
    constants::{
        DEPLOYER_ROLE, LAND_ADMIN_ROLE, LAND_CONTRACT_KEY, LAND_PRESALE_CONTRACT_KEY,
        LAND_SALE_BENEFICIARY_ROLE, SAND_CONTRACT_KEY,
    },
};

/// The size of the largest quad, which carries the premium
const LARGEST_QUAD_SIZE: u64 = 24;

/// Deploys the LAND presale priced in SAND, and makes it a LAND minter
pub struct LandPreSaleStep {
    /// The pricing of the sale
    pub settings: LandSaleSettings,
}

#[async_trait]
impl DeploymentStep for LandPreSaleStep {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(LAND_PRESALE_CONTRACT_KEY)
            .tags(&[LAND_PRESALE_CONTRACT_KEY])
            .dependencies(&["Land_setup", SAND_CONTRACT_KEY])
    }

    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        let deployer = env.account(DEPLOYER_ROLE)?;
        let admin = env.account(LAND_ADMIN_ROLE)?;
        let beneficiary = env.account(LAND_SALE_BENEFICIARY_ROLE)?;
        let land = env.get(LAND_CONTRACT_KEY)?.address;
        let sand = env.get(SAND_CONTRACT_KEY)?.address;

        let price_per_land =
            usd_to_token(self.settings.price_per_land_usd, self.settings.sand_usd_rate)
                .map_err(config_error)?;
        let price_per_largest_quad =
            quad_price(LARGEST_QUAD_SIZE, price_per_land, self.settings.premium_bps)
                .map_err(config_error)?;
        info!(%price_per_land, %price_per_largest_quad, "land sale prices in SAND");

        let options = DeployOptions {
            contract: LAND_PRESALE_CONTRACT_KEY.to_string(),
            from: deployer,
            args: vec![
                land.into(),
                sand.into(),
                admin.into(),
                beneficiary.into(),
                price_per_land.into(),
                price_per_largest_quad.into(),
            ],
        };
        let sale = env.deploy(LAND_PRESALE_CONTRACT_KEY, options).await?.record.address;

        let land_admin = read_address(env, LAND_CONTRACT_KEY, "getAdmin").await?;
        env.reconcile(Reconcile {
            contract: LAND_CONTRACT_KEY.to_string(),
            getter: "isMinter".to_string(),
            getter_args: vec![sale.into()],
            desired: true.into(),
            setter: "setMinter".to_string(),
            setter_args: vec![sale.into(), true.into()],
            from: land_admin,
        })
        .await?;

        Ok(())
    }
}
