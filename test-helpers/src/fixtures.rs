//! Compiled contract fixtures for the contract suite, along with a mock ledger
//! that models their state

use alloy::{
    json_abi::JsonAbi,
    primitives::{keccak256, Address, Bytes},
};
use deploy_common::types::ArgValue;
use deploy_core::contracts::{CompiledContract, MemoryContractSource};
use eyre::{eyre, Result};

use crate::ledger::{Effect, MockLedger};

/// The name of the transparent proxy contract
pub const PROXY: &str = "TransparentUpgradeableProxy";

/// Build a compiled contract from human-readable ABI signatures. The bytecode
/// is derived from `version` so that distinct versions hash differently.
pub fn contract(name: &str, version: u8, signatures: &[&str]) -> Result<CompiledContract> {
    let abi = JsonAbi::parse(signatures.iter().copied()).map_err(|e| eyre!("{name}: {e}"))?;
    let bytecode: Bytes = [&[0x60, 0x80, version][..], keccak256(name).as_slice()].concat().into();

    Ok(CompiledContract { name: name.to_string(), abi, bytecode })
}

/// The SAND token
pub fn sand() -> Result<CompiledContract> {
    contract(
        "Sand",
        1,
        &[
            "constructor(address admin, address beneficiary, uint256 initialSupply)",
            "function getAdmin() view returns (address)",
            "function isSuperOperator(address who) view returns (bool)",
            "function setSuperOperator(address superOperator, bool enabled)",
            "function balanceOf(address owner) view returns (uint256)",
        ],
    )
}

/// The LAND registry
pub fn land() -> Result<CompiledContract> {
    contract(
        "Land",
        1,
        &[
            "constructor(address metaTransactionContract, address admin)",
            "function getAdmin() view returns (address)",
            "function changeAdmin(address newAdmin)",
            "function isMinter(address who) view returns (bool)",
            "function setMinter(address minter, bool enabled)",
            "function exists(uint256 size, uint256 x, uint256 y) view returns (bool)",
            "function mintQuad(address to, uint256 size, uint256 x, uint256 y, bytes data)",
        ],
    )
}

/// The asset registry implementation; bumping `version` changes its bytecode
pub fn asset(version: u8) -> Result<CompiledContract> {
    contract(
        "Asset",
        version,
        &[
            "function init(address metaTransactionContract, address admin, address bouncerAdmin)",
            "function getAdmin() view returns (address)",
            "function getBouncerAdmin() view returns (address)",
            "function isBouncer(address who) view returns (bool)",
            "function setBouncer(address bouncer, bool enabled)",
        ],
    )
}

/// The transparent upgradeable proxy
pub fn proxy() -> Result<CompiledContract> {
    contract(
        PROXY,
        1,
        &[
            "constructor(address implementation, address admin, bytes data)",
            "function upgradeTo(address newImplementation)",
        ],
    )
}

/// The asset marketplace
pub fn marketplace() -> Result<CompiledContract> {
    contract(
        "Marketplace",
        1,
        &["constructor(address sand, address admin, address signer)"],
    )
}

/// The LAND presale
pub fn land_presale() -> Result<CompiledContract> {
    contract(
        "LandPreSale",
        1,
        &[
            "constructor(address land, address sand, address admin, address beneficiary, uint256 pricePerLand, uint256 priceLargestQuad)",
        ],
    )
}

/// The SAND faucet
pub fn faucet() -> Result<CompiledContract> {
    contract("Faucet", 1, &["constructor(address sand)"])
}

/// Every contract of the suite, with the asset registry at the given version
pub fn catalog_contracts(asset_version: u8) -> Result<MemoryContractSource> {
    Ok(MemoryContractSource::default()
        .with(sand()?)
        .with(land()?)
        .with(asset(asset_version)?)
        .with(proxy()?)
        .with(marketplace()?)
        .with(land_presale()?)
        .with(faucet()?))
}

/// A mock ledger that knows every contract of the suite, up to the given
/// asset registry version, and how their admin, minter, bouncer & super
/// operator tables change
pub fn catalog_ledger(chain_id: u64, signers: Vec<Address>, asset_versions: u8) -> Result<MockLedger> {
    let mut ledger = MockLedger::new(chain_id, signers)
        .with_contract(&sand()?)
        .with_contract(&land()?)
        .with_proxy(&proxy()?)
        .with_contract(&marketplace()?)
        .with_contract(&land_presale()?)
        .with_contract(&faucet()?);
    for version in 1..=asset_versions {
        ledger = ledger.with_contract(&asset(version)?);
    }

    Ok(ledger
        .on_deploy("Sand", |_, args| vec![set("getAdmin", vec![], &args[0])])
        .on("Sand", "setSuperOperator", |_, args| {
            vec![set("isSuperOperator", vec![args[0].clone()], &args[1])]
        })
        .on_deploy("Land", |_, args| vec![set("getAdmin", vec![], &args[1])])
        .on("Land", "changeAdmin", |_, args| vec![set("getAdmin", vec![], &args[0])])
        .on("Land", "setMinter", |_, args| vec![set("isMinter", vec![args[0].clone()], &args[1])])
        .on("Land", "mintQuad", |_, args| {
            vec![set("exists", args[1..4].to_vec(), &ArgValue::Bool(true))]
        })
        .on("Asset", "init", |_, args| {
            vec![set("getAdmin", vec![], &args[1]), set("getBouncerAdmin", vec![], &args[2])]
        })
        .on("Asset", "setBouncer", |_, args| {
            vec![set("isBouncer", vec![args[0].clone()], &args[1])]
        }))
}

/// An effect writing `value` to a getter
fn set(getter: &str, args: Vec<ArgValue>, value: &ArgValue) -> Effect {
    (getter.to_string(), args, value.clone())
}
