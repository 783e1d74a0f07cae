//! Common types used throughout the deployment tooling

use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};

use crate::{constants::DEV_CHAIN_IDS, errors::DeployError};

/// A primitive value passed to a constructor or a contract method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    /// An account or contract address
    Address(Address),
    /// An unsigned integer of any width up to 256 bits
    Uint(U256),
    /// A signed integer of any width up to 256 bits
    Int(I256),
    /// A boolean
    Bool(bool),
    /// A UTF-8 string
    String(String),
    /// A byte string, fixed or dynamic
    Bytes(Bytes),
    /// An array, fixed or dynamic, or a tuple
    Array(Vec<ArgValue>),
}

impl Display for ArgValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Address(a) => write!(f, "{a:#x}"),
            ArgValue::Uint(u) => write!(f, "{u}"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::String(s) => write!(f, "{s:?}"),
            ArgValue::Bytes(b) => write!(f, "{}", hex::encode_prefixed(b)),
            ArgValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<Address> for ArgValue {
    fn from(value: Address) -> Self {
        ArgValue::Address(value)
    }
}

impl From<U256> for ArgValue {
    fn from(value: U256) -> Self {
        ArgValue::Uint(value)
    }
}

impl From<I256> for ArgValue {
    fn from(value: I256) -> Self {
        ArgValue::Int(value)
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::Uint(U256::from(value))
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::String(value)
    }
}

impl From<Bytes> for ArgValue {
    fn from(value: Bytes) -> Self {
        ArgValue::Bytes(value)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(values: Vec<T>) -> Self {
        ArgValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// The persisted record of a deployed contract
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// The logical name of the deployment, stable across upgrades
    pub name: String,
    /// The address at which the contract lives
    pub address: Address,
    /// The arguments the contract was constructed with
    #[serde(default)]
    pub constructor_args: Vec<ArgValue>,
    /// The contract ABI used to encode calls against the deployment
    pub abi: JsonAbi,
    /// The hash of the deployment transaction
    pub transaction_hash: B256,
    /// The block in which the deployment transaction was included
    pub block_number: u64,
    /// Incremented every time an explicit upgrade replaces the record
    #[serde(default)]
    pub upgrade_index: u64,
    /// The implementation behind the address, if the deployment is a proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Address>,
    /// The keccak hash of the deployed creation bytecode, where tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode_hash: Option<B256>,
}

impl DeploymentRecord {
    /// Whether the record describes an upgradeable proxy
    pub fn is_proxy(&self) -> bool {
        self.implementation.is_some()
    }
}

/// The network a scheduler invocation runs against, along with its resolved accounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    /// The name of the network, as configured
    pub network_name: String,
    /// The chain ID reported by the network
    pub chain_id: u64,
    /// The accounts bound to a role on this network
    pub named_accounts: BTreeMap<String, Address>,
    /// The network's accounts that are bound to no role, in order
    pub unnamed_accounts: Vec<Address>,
}

impl NetworkContext {
    /// Look up the address bound to the given role
    pub fn account(&self, role: &str) -> Result<Address, DeployError> {
        self.named_accounts
            .get(role)
            .copied()
            .ok_or_else(|| DeployError::UnknownRole {
                role: role.to_string(),
                network: self.network_name.clone(),
            })
    }

    /// Whether the network is a local development node
    pub fn is_development(&self) -> bool {
        DEV_CHAIN_IDS.contains(&self.chain_id)
    }
}

/// A transaction whose required signer is not held locally, awaiting
/// out-of-band execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignature {
    /// The step that produced the transaction
    pub step: String,
    /// The logical name of the contract being called
    pub target_contract: String,
    /// The method being called
    pub method: String,
    /// The arguments of the call
    pub args: Vec<ArgValue>,
    /// The account that must sign the transaction
    pub required_signer: Address,
    /// The address the transaction must be sent to
    pub to: Address,
    /// The encoded calldata of the transaction
    pub data: Bytes,
}

impl Display for PendingSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.target_contract, self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(
            f,
            ") from {:#x} [to: {:#x}, data: {}]",
            self.required_signer,
            self.to,
            hex::encode_prefixed(&self.data)
        )
    }
}

/// The receipt of a mined transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// The hash of the transaction
    pub transaction_hash: B256,
    /// The block in which the transaction was included
    pub block_number: u64,
    /// The address of the created contract, for deployment transactions
    pub contract_address: Option<Address>,
    /// The gas used by the transaction
    pub gas_used: u64,
}

/// The result of submitting a transaction through the unknown-signer shim
#[derive(Debug)]
pub enum TxOutcome {
    /// The transaction was signed locally & mined successfully
    Executed(TxReceipt),
    /// The required signer is not held locally; the transaction awaits
    /// out-of-band execution
    Deferred(PendingSignature),
    /// The transaction was submitted but failed
    Failed(DeployError),
}

impl TxOutcome {
    /// Lift a failure into an error, passing executed & deferred outcomes through
    pub fn into_result(self) -> Result<Self, DeployError> {
        match self {
            TxOutcome::Failed(e) => Err(e),
            outcome => Ok(outcome),
        }
    }

    /// Whether the transaction was deferred
    pub fn is_deferred(&self) -> bool {
        matches!(self, TxOutcome::Deferred(_))
    }

    /// The receipt of the transaction, if it was executed
    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            TxOutcome::Executed(receipt) => Some(receipt),
            _ => None,
        }
    }
}
