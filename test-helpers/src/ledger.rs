//! An in-memory ledger that models just enough contract state for deployment
//! steps to converge against it.
//!
//! Contracts are recognized by their creation bytecode. Every contract keeps a
//! table of getter values; rules registered per contract method describe which
//! getter values a transaction writes. Proxies are modelled after the
//! transparent proxy: constructed with `(implementation, admin, data)`, keeping
//! both addresses in their EIP-1967 slots & accepting `upgradeTo` from the
//! admin only.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::{Function, JsonAbi, Param},
    primitives::{hex, keccak256, Address, Bytes, B256},
};
use async_trait::async_trait;
use deploy_common::{
    constants::{PROXY_ADMIN_SLOT, PROXY_IMPLEMENTATION_SLOT, UPGRADE_TO_METHOD},
    errors::DeployError,
    types::{ArgValue, TxReceipt},
};
use deploy_core::{
    abi::{from_sol_value, to_sol_value},
    contracts::CompiledContract,
    ledger::{DeployRequest, Ledger},
};

/// The method name recorded for deployment transactions, and under which
/// constructor rules are registered
pub const CONSTRUCTOR: &str = "constructor";

/// The gas reported for every transaction
const GAS_USED: u64 = 21_000;

/// A getter value written by a transaction: the getter, its arguments & the
/// value it now returns
pub type Effect = (String, Vec<ArgValue>, ArgValue);

/// Maps the sender & arguments of a call to the getter values it writes
type Rule = Box<dyn Fn(Address, &[ArgValue]) -> Vec<Effect> + Send + Sync>;

/// A transaction sent to the mock ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentTx {
    /// The sender
    pub from: Address,
    /// The recipient, or the created contract for deployments
    pub to: Address,
    /// The name of the contract whose code handled the transaction
    pub contract: String,
    /// The method called, or [`CONSTRUCTOR`] for deployments
    pub method: String,
    /// The decoded arguments
    pub args: Vec<ArgValue>,
    /// Whether the transaction reverted
    pub reverted: bool,
}

/// Contract code known to the ledger
struct Code {
    /// The contract name
    name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// Whether the contract is a transparent proxy
    proxy: bool,
}

/// A deployed contract
struct Account {
    /// Index of the contract's code
    code: usize,
    /// Getter values, keyed by the getter & its arguments
    values: HashMap<String, ArgValue>,
    /// Raw storage slots
    storage: HashMap<B256, B256>,
}

impl Account {
    /// Apply the effects of a transaction
    fn apply(&mut self, effects: Vec<Effect>) {
        for (getter, args, value) in effects {
            self.values.insert(value_key(&getter, &args), value);
        }
    }

    /// Read an address held in a storage slot
    fn slot_address(&self, slot: B256) -> Address {
        let word = self.storage.get(&slot).copied().unwrap_or_default();
        Address::from_word(word)
    }
}

/// The mutable state of the ledger
#[derive(Default)]
struct State {
    /// The known contract code
    codes: Vec<Code>,
    /// Index of the known code by creation bytecode
    by_bytecode: HashMap<Bytes, usize>,
    /// The deployed contracts
    accounts: HashMap<Address, Account>,
    /// The next nonce of each sender
    nonces: HashMap<Address, u64>,
    /// The current block number
    block: u64,
    /// Every transaction sent, in order
    txs: Vec<SentTx>,
    /// Methods whose transactions revert
    reverts: HashSet<String>,
}

impl State {
    /// Include a transaction in a new block, producing its receipt
    fn mine(&mut self, tx: SentTx, contract_address: Option<Address>) -> TxReceipt {
        let nonce = self.nonces.entry(tx.from).or_default();
        let transaction_hash = keccak256([tx.from.as_slice(), &nonce.to_be_bytes()].concat());
        *nonce += 1;
        self.block += 1;
        self.txs.push(tx);

        TxReceipt { transaction_hash, block_number: self.block, contract_address, gas_used: GAS_USED }
    }

    /// The name & ABI calls to the given address dispatch against, following
    /// proxies to their implementation
    fn dispatch_code(&self, to: Address) -> Result<(String, JsonAbi), DeployError> {
        let account = self.account(to)?;
        let code = &self.codes[account.code];
        if !code.proxy {
            return Ok((code.name.clone(), code.abi.clone()));
        }

        let implementation = account.slot_address(PROXY_IMPLEMENTATION_SLOT);
        let code = &self.codes[self.account(implementation)?.code];
        Ok((code.name.clone(), code.abi.clone()))
    }

    /// The contract deployed at an address
    fn account(&self, address: Address) -> Result<&Account, DeployError> {
        self.accounts
            .get(&address)
            .ok_or_else(|| DeployError::Ledger(format!("no contract at {address}")))
    }

    /// The contract deployed at an address, mutably
    fn account_mut(&mut self, address: Address) -> Result<&mut Account, DeployError> {
        self.accounts
            .get_mut(&address)
            .ok_or_else(|| DeployError::Ledger(format!("no contract at {address}")))
    }
}

// ---------------
// | Mock Ledger |
// ---------------

/// An in-memory ledger
pub struct MockLedger {
    /// The chain ID
    chain_id: u64,
    /// The accounts whose keys are held locally
    signers: Vec<Address>,
    /// Rules by contract name & method
    rules: HashMap<(String, String), Rule>,
    /// The mutable state
    state: Mutex<State>,
}

impl MockLedger {
    /// A ledger with no known contracts
    pub fn new(chain_id: u64, signers: Vec<Address>) -> Self {
        Self { chain_id, signers, rules: HashMap::new(), state: Mutex::default() }
    }

    /// Make a contract deployable
    pub fn with_contract(self, contract: &CompiledContract) -> Self {
        self.add_code(contract, false);
        self
    }

    /// Make a transparent proxy contract deployable
    pub fn with_proxy(self, contract: &CompiledContract) -> Self {
        self.add_code(contract, true);
        self
    }

    /// Register the effects of calling `method` on the named contract
    pub fn on<F>(mut self, contract: &str, method: &str, rule: F) -> Self
    where
        F: Fn(Address, &[ArgValue]) -> Vec<Effect> + Send + Sync + 'static,
    {
        self.rules.insert((contract.to_string(), method.to_string()), Box::new(rule));
        self
    }

    /// Register the effects of constructing the named contract
    pub fn on_deploy<F>(self, contract: &str, rule: F) -> Self
    where
        F: Fn(Address, &[ArgValue]) -> Vec<Effect> + Send + Sync + 'static,
    {
        self.on(contract, CONSTRUCTOR, rule)
    }

    /// Make every transaction calling `method` revert
    pub fn revert_on(&self, method: &str) {
        self.state().reverts.insert(method.to_string());
    }

    /// Stop reverting transactions calling `method`
    pub fn clear_revert(&self, method: &str) {
        self.state().reverts.remove(method);
    }

    /// Every transaction sent so far
    pub fn transactions(&self) -> Vec<SentTx> {
        self.state().txs.clone()
    }

    /// The number of transactions sent so far
    pub fn tx_count(&self) -> usize {
        self.state().txs.len()
    }

    /// The value a getter of the contract at `address` returns, if one was written
    pub fn value(&self, address: Address, getter: &str, args: &[ArgValue]) -> Option<ArgValue> {
        let state = self.state();
        state.accounts.get(&address)?.values.get(&value_key(getter, args)).cloned()
    }

    /// Overwrite a getter value, as if changed out of band
    pub fn set_value(&self, address: Address, getter: &str, args: &[ArgValue], value: ArgValue) {
        if let Some(account) = self.state().accounts.get_mut(&address) {
            account.values.insert(value_key(getter, args), value);
        }
    }

    /// The implementation a proxy points at
    pub fn implementation(&self, proxy: Address) -> Option<Address> {
        let state = self.state();
        state.accounts.get(&proxy).map(|a| a.slot_address(PROXY_IMPLEMENTATION_SLOT))
    }

    // -----------
    // | Helpers |
    // -----------

    /// Lock the ledger state
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("mock ledger state poisoned")
    }

    /// Register contract code
    fn add_code(&self, contract: &CompiledContract, proxy: bool) {
        let mut state = self.state();
        let index = state.codes.len();
        state.codes.push(Code { name: contract.name.clone(), abi: contract.abi.clone(), proxy });
        state.by_bytecode.insert(contract.bytecode.clone(), index);
    }

    /// Fail unless the sender's key is held locally
    fn check_sender(&self, from: Address) -> Result<(), DeployError> {
        if self.signers.contains(&from) {
            Ok(())
        } else {
            Err(DeployError::Ledger(format!("unknown account {from}")))
        }
    }

    /// The effects of calling `method` on the named contract
    fn effects(&self, contract: &str, method: &str, from: Address, args: &[ArgValue]) -> Vec<Effect> {
        self.rules
            .get(&(contract.to_string(), method.to_string()))
            .map(|rule| rule(from, args))
            .unwrap_or_default()
    }

    /// Dispatch a call to the contract at `to`, writing its effects to that
    /// contract's state unless it reverts
    fn dispatch(
        &self,
        state: &mut State,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<SentTx, DeployError> {
        let (contract, abi) = state.dispatch_code(to)?;
        let function = function_by_selector(&abi, data)?;
        let args = decode_params(&function.inputs, &data[4..])?;

        let reverted = state.reverts.contains(&function.name);
        if !reverted {
            let effects = self.effects(&contract, &function.name, from, &args);
            state.account_mut(to)?.apply(effects);
        }

        Ok(SentTx { from, to, contract, method: function.name.clone(), args, reverted })
    }

    /// Handle `upgradeTo` sent to a proxy, which only its admin may call
    fn upgrade(
        &self,
        state: &mut State,
        from: Address,
        proxy: Address,
        data: &[u8],
    ) -> Result<SentTx, DeployError> {
        let account = state.account(proxy)?;
        let admin = account.slot_address(PROXY_ADMIN_SLOT);
        let contract = state.codes[account.code].name.clone();
        let implementation = Address::from_word(word_at(data, 4)?);

        let reverted = from != admin
            || !state.accounts.contains_key(&implementation)
            || state.reverts.contains(UPGRADE_TO_METHOD);
        if !reverted {
            let slot = implementation.into_word();
            state.account_mut(proxy)?.storage.insert(PROXY_IMPLEMENTATION_SLOT, slot);
        }

        Ok(SentTx {
            from,
            to: proxy,
            contract,
            method: UPGRADE_TO_METHOD.to_string(),
            args: vec![implementation.into()],
            reverted,
        })
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        Ok(self.chain_id)
    }

    fn local_signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    async fn deploy(&self, request: DeployRequest) -> Result<TxReceipt, DeployError> {
        self.check_sender(request.from)?;
        let mut state = self.state();

        let index = *state
            .by_bytecode
            .get(&request.bytecode)
            .ok_or_else(|| DeployError::Ledger("unknown creation bytecode".to_string()))?;
        let code = &state.codes[index];
        let (name, proxy) = (code.name.clone(), code.proxy);
        let inputs = code.abi.constructor.as_ref().map(|c| c.inputs.clone()).unwrap_or_default();
        let args = decode_params(&inputs, &request.constructor_args)?;

        let nonce = state.nonces.get(&request.from).copied().unwrap_or_default();
        let address = request.from.create(nonce);
        let mut account = Account { code: index, values: HashMap::new(), storage: HashMap::new() };
        account.apply(self.effects(&name, CONSTRUCTOR, request.from, &args));

        let init_data = match (proxy, args.as_slice()) {
            (
                true,
                [ArgValue::Address(implementation), ArgValue::Address(admin), ArgValue::Bytes(data)],
            ) => {
                account.storage.insert(PROXY_IMPLEMENTATION_SLOT, implementation.into_word());
                account.storage.insert(PROXY_ADMIN_SLOT, admin.into_word());
                data.clone()
            }
            (true, _) => return Err(DeployError::Ledger("malformed proxy constructor".to_string())),
            (false, _) => Bytes::new(),
        };
        state.accounts.insert(address, account);

        // The proxy's initializer runs within its constructor
        let mut reverted = false;
        if !init_data.is_empty() {
            reverted = self.dispatch(&mut state, request.from, address, &init_data)?.reverted;
        }
        if reverted {
            state.accounts.remove(&address);
        }

        let tx = SentTx {
            from: request.from,
            to: address,
            contract: name,
            method: CONSTRUCTOR.to_string(),
            args,
            reverted,
        };
        let receipt = state.mine(tx, (!reverted).then_some(address));
        if reverted {
            return Err(DeployError::TransactionReverted(receipt.transaction_hash));
        }

        Ok(receipt)
    }

    async fn send(&self, from: Address, to: Address, data: Bytes) -> Result<TxReceipt, DeployError> {
        self.check_sender(from)?;
        let mut state = self.state();

        let account = state.account(to)?;
        let is_proxy = state.codes[account.code].proxy;
        let tx = if is_proxy && data.get(..4) == Some(upgrade_selector()?.as_slice()) {
            self.upgrade(&mut state, from, to, &data)?
        } else {
            self.dispatch(&mut state, from, to, &data)?
        };

        let reverted = tx.reverted;
        let receipt = state.mine(tx, None);
        if reverted {
            return Err(DeployError::TransactionReverted(receipt.transaction_hash));
        }

        Ok(receipt)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeployError> {
        let state = self.state();
        let (_, abi) = state.dispatch_code(to)?;
        let function = function_by_selector(&abi, &data)?;
        let args = decode_params(&function.inputs, &data[4..])?;

        let value = state.account(to)?.values.get(&value_key(&function.name, &args));
        encode_output(function, value)
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, DeployError> {
        let state = self.state();
        Ok(state.account(address)?.storage.get(&slot).copied().unwrap_or_default())
    }
}

// -----------
// | Helpers |
// -----------

/// The key a getter value is stored under
fn value_key(getter: &str, args: &[ArgValue]) -> String {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("{getter}({})", args.join(","))
}

/// The selector of `upgradeTo(address)`
fn upgrade_selector() -> Result<[u8; 4], DeployError> {
    let function = Function::parse(&format!("function {UPGRADE_TO_METHOD}(address)"))
        .map_err(|e| DeployError::Abi(e.to_string()))?;
    Ok(function.selector().0)
}

/// Find the function a calldata selector addresses
fn function_by_selector<'a>(abi: &'a JsonAbi, data: &[u8]) -> Result<&'a Function, DeployError> {
    let selector = data
        .get(..4)
        .ok_or_else(|| DeployError::Abi("calldata shorter than a selector".to_string()))?;
    abi.functions()
        .find(|f| f.selector().as_slice() == selector)
        .ok_or_else(|| DeployError::Abi(format!("unknown selector 0x{}", hex::encode(selector))))
}

/// Decode ABI-encoded parameters
fn decode_params(params: &[Param], data: &[u8]) -> Result<Vec<ArgValue>, DeployError> {
    let types = params
        .iter()
        .map(|p| p.resolve().map_err(|e| DeployError::Abi(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .map_err(|e| DeployError::Abi(e.to_string()))?;

    match from_sol_value(decoded)? {
        ArgValue::Array(values) => Ok(values),
        value => Ok(vec![value]),
    }
}

/// Encode a getter's return value, zeroed if it was never written
fn encode_output(function: &Function, value: Option<&ArgValue>) -> Result<Bytes, DeployError> {
    let (Some(value), Some(output)) = (value, function.outputs.first()) else {
        return Ok(vec![0u8; 32 * function.outputs.len()].into());
    };

    let ty = output.resolve().map_err(|e| DeployError::Abi(e.to_string()))?;
    Ok(DynSolValue::Tuple(vec![to_sol_value(value, &ty)?]).abi_encode_params().into())
}

/// Read the 32-byte word at the given calldata offset
fn word_at(data: &[u8], offset: usize) -> Result<B256, DeployError> {
    data.get(offset..offset + 32)
        .map(B256::from_slice)
        .ok_or_else(|| DeployError::Abi("calldata too short".to_string()))
}
