//! The interface to the chain that deployment steps run against

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use deploy_common::{errors::DeployError, types::TxReceipt};

/// A request to deploy a contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployRequest {
    /// The deploying account
    pub from: Address,
    /// The creation bytecode
    pub bytecode: Bytes,
    /// The ABI-encoded constructor arguments
    pub constructor_args: Bytes,
}

impl DeployRequest {
    /// The full creation code: bytecode followed by constructor arguments
    pub fn creation_code(&self) -> Bytes {
        [self.bytecode.as_ref(), self.constructor_args.as_ref()].concat().into()
    }
}

/// A client for the chain deployments are made to
#[async_trait]
pub trait Ledger: Send + Sync {
    /// The chain ID of the connected network
    async fn chain_id(&self) -> Result<u64, DeployError>;

    /// The accounts whose keys are held locally
    fn local_signers(&self) -> Vec<Address>;

    /// Whether the given account's key is held locally
    fn is_local_signer(&self, account: Address) -> bool {
        self.local_signers().contains(&account)
    }

    /// Deploy a contract, awaiting its receipt
    async fn deploy(&self, request: DeployRequest) -> Result<TxReceipt, DeployError>;

    /// Send a transaction, awaiting its receipt
    async fn send(&self, from: Address, to: Address, data: Bytes)
        -> Result<TxReceipt, DeployError>;

    /// Execute a read-only call
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeployError>;

    /// Read a storage slot of a contract
    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, DeployError>;
}
