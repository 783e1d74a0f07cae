//! The unknown-signer shim: transactions whose signer is not held locally
//! are recorded for out-of-band execution rather than failing the step

use alloy::primitives::{Address, Bytes};
use deploy_common::types::{ArgValue, PendingSignature, TxOutcome};
use tracing::{debug, warn};

use crate::ledger::Ledger;

/// An encoded contract call, as submitted through the shim
#[derive(Clone, Debug)]
pub struct ContractCall {
    /// The logical name of the target contract
    pub contract: String,
    /// The method being called
    pub method: String,
    /// The arguments of the call
    pub args: Vec<ArgValue>,
    /// The account the call must be sent from
    pub from: Address,
    /// The address of the target contract
    pub to: Address,
    /// The encoded calldata
    pub data: Bytes,
}

/// Submit a call, deferring it if its signer is not held locally
pub async fn submit(ledger: &dyn Ledger, step: &str, call: ContractCall) -> TxOutcome {
    if !ledger.is_local_signer(call.from) {
        let pending = PendingSignature {
            step: step.to_string(),
            target_contract: call.contract,
            method: call.method,
            args: call.args,
            required_signer: call.from,
            to: call.to,
            data: call.data,
        };

        warn!(step, "signature required from non-local account: {pending}");
        return TxOutcome::Deferred(pending);
    }

    debug!(step, contract = %call.contract, method = %call.method, from = %call.from, "sending transaction");
    match ledger.send(call.from, call.to, call.data).await {
        Ok(receipt) => TxOutcome::Executed(receipt),
        Err(e) => TxOutcome::Failed(e),
    }
}
