//! A ledger backed by a JSON-RPC endpoint

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use deploy_common::{errors::DeployError, types::TxReceipt};
use deploy_core::ledger::{DeployRequest, Ledger};
use tracing::debug;

use crate::errors::ScriptError;

/// A ledger that signs with a set of local keys and submits over JSON-RPC
#[derive(Clone)]
pub struct RpcLedger {
    /// The provider, holding a wallet with every local key
    provider: DynProvider,
    /// The addresses of the local keys
    signers: Vec<Address>,
    /// The number of blocks a transaction must be buried under before its
    /// receipt is accepted
    confirmations: u64,
}

impl RpcLedger {
    /// Connect to the given endpoint, signing with the given keys
    pub fn new(
        rpc_url: &str,
        keys: Vec<PrivateKeySigner>,
        confirmations: u64,
    ) -> Result<Self, ScriptError> {
        let url =
            Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let signers = keys.iter().map(|k| k.address()).collect();

        let mut keys = keys.into_iter();
        let provider = match keys.next() {
            Some(first) => {
                let mut wallet = EthereumWallet::new(first);
                for key in keys {
                    wallet.register_signer(key);
                }

                DynProvider::new(ProviderBuilder::new().wallet(wallet).connect_http(url))
            }
            None => DynProvider::new(ProviderBuilder::new().connect_http(url)),
        };

        Ok(Self { provider, signers, confirmations })
    }

    /// Submit a transaction & wait, without a deadline, for it to be mined
    /// successfully under the configured number of confirmations
    async fn submit(&self, tx: TransactionRequest) -> Result<TxReceipt, DeployError> {
        let pending = self.provider.send_transaction(tx).await.map_err(ledger_error)?;
        debug!(tx_hash = %pending.tx_hash(), "submitted transaction");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(ledger_error)?;
        into_receipt(receipt)
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        self.provider.get_chain_id().await.map_err(ledger_error)
    }

    fn local_signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    async fn deploy(&self, request: DeployRequest) -> Result<TxReceipt, DeployError> {
        let tx = TransactionRequest::default()
            .with_from(request.from)
            .with_deploy_code(request.creation_code());
        self.submit(tx).await
    }

    async fn send(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxReceipt, DeployError> {
        let tx = TransactionRequest::default().with_from(from).with_to(to).with_input(data);
        self.submit(tx).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeployError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(tx).await.map_err(ledger_error)
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, DeployError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await
            .map_err(ledger_error)?;

        Ok(B256::from(value))
    }
}

/// Convert a mined transaction's receipt, rejecting reverted transactions
fn into_receipt(receipt: TransactionReceipt) -> Result<TxReceipt, DeployError> {
    if !receipt.status() {
        return Err(DeployError::TransactionReverted(receipt.transaction_hash));
    }

    Ok(TxReceipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number.unwrap_or_default(),
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
    })
}

/// Convert a provider error into a ledger error
fn ledger_error(e: impl ToString) -> DeployError {
    DeployError::Ledger(e.to_string())
}
