//! The deployment steps of the contract suite

mod asset;
mod faucet;
mod land;
mod land_sale;
mod marketplace;
mod sand;

pub use asset::{AssetSetupStep, AssetStep};
pub use faucet::FaucetStep;
pub use land::{LandAdminStep, LandReservedStep, LandSetupStep, LandStep};
pub use land_sale::LandPreSaleStep;
pub use marketplace::MarketplaceStep;
pub use sand::{SandSetupStep, SandStep};

use alloy::primitives::Address;
use deploy_common::{errors::DeployError, types::ArgValue};
use deploy_core::{env::DeployEnv, scheduler::Scheduler};
use deploy_utils::errors::UtilsError;

use crate::config::StepSettings;

/// Register every step of the catalog, in the order they are listed in
pub fn register_all(scheduler: &mut Scheduler, settings: &StepSettings) {
    scheduler
        .register(SandStep { initial_supply: settings.sand_initial_supply })
        .register(LandStep)
        .register(LandSetupStep)
        .register(LandAdminStep)
        .register(LandReservedStep { quads: settings.reserved_quads.clone() })
        .register(AssetStep)
        .register(AssetSetupStep)
        .register(MarketplaceStep)
        .register(SandSetupStep)
        .register(LandPreSaleStep { settings: settings.land_sale.clone() })
        .register(FaucetStep);
}

/// Read an address returned by a no-argument getter
async fn read_address(
    env: &DeployEnv<'_>,
    contract: &str,
    getter: &str,
) -> Result<Address, DeployError> {
    match env.read(contract, getter, vec![]).await?.as_slice() {
        [ArgValue::Address(address)] => Ok(*address),
        other => Err(DeployError::Abi(format!(
            "expected `{contract}.{getter}` to return an address, got {other:?}"
        ))),
    }
}

/// Report invalid step settings
fn config_error(e: UtilsError) -> DeployError {
    DeployError::Config(e.to_string())
}
