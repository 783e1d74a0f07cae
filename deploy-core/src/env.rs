//! The environment a deployment step runs in, along with the idempotent
//! deploy & reconcile helpers steps are written against

use alloy::{
    json_abi::Function,
    primitives::{Address, Bytes, B256},
};
use deploy_common::{
    constants::{
        IMPLEMENTATION_SUFFIX, NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT, PROXY_ADMIN_SLOT,
        PROXY_IMPLEMENTATION_SLOT, UPGRADE_TO_METHOD,
    },
    errors::DeployError,
    types::{ArgValue, DeploymentRecord, NetworkContext, PendingSignature, TxOutcome},
};
use tracing::{debug, info};

use crate::{
    abi::{decode_output, encode_call, encode_constructor, find_function},
    contracts::{CompiledContract, ContractSource},
    ledger::{DeployRequest, Ledger},
    signer::{self, ContractCall},
    store::ArtifactStore,
};

// ---------
// | Types |
// ---------

/// Options for a deploy-if-missing
#[derive(Clone, Debug)]
pub struct DeployOptions {
    /// The name of the compiled contract to deploy
    pub contract: String,
    /// The deploying account
    pub from: Address,
    /// The constructor arguments
    pub args: Vec<ArgValue>,
}

/// The result of a deploy-if-missing
#[derive(Clone, Debug)]
pub struct Deployment {
    /// The stored record
    pub record: DeploymentRecord,
    /// Whether the contract was deployed by this call
    pub newly_deployed: bool,
}

/// Options for an upgradeable deployment behind a transparent proxy
#[derive(Clone, Debug)]
pub struct ProxyOptions {
    /// The name of the compiled implementation contract
    pub contract: String,
    /// The name of the compiled proxy contract, constructed with
    /// `(implementation, admin, data)`
    pub proxy_contract: String,
    /// The deploying account
    pub from: Address,
    /// The proxy admin
    pub admin: Address,
    /// The implementation method & arguments called when the proxy is created
    pub init: Option<(String, Vec<ArgValue>)>,
}

/// The result of an upgradeable deployment
#[derive(Debug)]
pub struct ProxyDeployment {
    /// The proxy's stored record
    pub record: DeploymentRecord,
    /// The implementation's stored record
    pub implementation: DeploymentRecord,
    /// Whether the proxy was deployed by this call
    pub newly_deployed: bool,
    /// The outcome of the upgrade transaction, if one was needed
    pub upgrade: Option<TxOutcome>,
}

/// A desired on-chain value, along with the getter that reads it and the
/// setter that writes it
#[derive(Clone, Debug)]
pub struct Reconcile {
    /// The logical name of the contract
    pub contract: String,
    /// The getter method
    pub getter: String,
    /// The getter arguments
    pub getter_args: Vec<ArgValue>,
    /// The value the getter should return
    pub desired: ArgValue,
    /// The setter method
    pub setter: String,
    /// The setter arguments
    pub setter_args: Vec<ArgValue>,
    /// The account the setter must be sent from
    pub from: Address,
}

/// The result of a reconcile
#[derive(Debug)]
pub enum Converged {
    /// The on-chain value already matched, no transaction was sent
    AlreadySet,
    /// The setter was submitted
    Submitted(TxOutcome),
}

// ---------------
// | Environment |
// ---------------

/// The environment handed to each step: the active network, the artifact
/// store, the ledger and the source of compiled contracts
pub struct DeployEnv<'a> {
    /// The active network & its resolved accounts
    network: &'a NetworkContext,
    /// The artifact store
    store: &'a mut dyn ArtifactStore,
    /// The ledger client
    ledger: &'a dyn Ledger,
    /// The source of compiled contracts
    contracts: &'a dyn ContractSource,
    /// The name of the step currently running
    current_step: String,
    /// Signatures deferred since the last call to `take_pending`
    pending: Vec<PendingSignature>,
}

impl<'a> DeployEnv<'a> {
    /// Constructor
    pub fn new(
        network: &'a NetworkContext,
        store: &'a mut dyn ArtifactStore,
        ledger: &'a dyn Ledger,
        contracts: &'a dyn ContractSource,
    ) -> Self {
        Self {
            network,
            store,
            ledger,
            contracts,
            current_step: String::new(),
            pending: Vec::new(),
        }
    }

    /// The active network
    pub fn network(&self) -> &NetworkContext {
        self.network
    }

    /// The address bound to the given role on the active network
    pub fn account(&self, role: &str) -> Result<Address, DeployError> {
        self.network.account(role)
    }

    /// The ledger client
    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger
    }

    /// The record for the given logical name
    pub fn get(&self, name: &str) -> Result<DeploymentRecord, DeployError> {
        self.store.get(name)
    }

    /// The record for the given logical name, if one exists
    pub fn get_or_none(&self, name: &str) -> Option<DeploymentRecord> {
        self.store.get_or_none(name)
    }

    /// Mark the start of a step, attributing subsequent deferred signatures to it
    pub fn begin_step(&mut self, step: &str) {
        self.current_step = step.to_string();
    }

    /// The signatures deferred so far
    pub fn pending(&self) -> &[PendingSignature] {
        &self.pending
    }

    /// Drain the signatures deferred so far
    pub fn take_pending(&mut self) -> Vec<PendingSignature> {
        std::mem::take(&mut self.pending)
    }

    // --------------
    // | Primitives |
    // --------------

    /// Call a method on a recorded contract, deferring the call if `from`
    /// is not a local signer
    pub async fn execute(
        &mut self,
        contract: &str,
        from: Address,
        method: &str,
        args: Vec<ArgValue>,
    ) -> Result<TxOutcome, DeployError> {
        let record = self.store.get(contract)?;
        let function = find_function(&record.abi, contract, method, args.len())?;
        let data = encode_call(function, &args)?;

        let call = ContractCall {
            contract: contract.to_string(),
            method: method.to_string(),
            args,
            from,
            to: record.address,
            data,
        };
        Ok(self.submit(call).await)
    }

    /// Read from a recorded contract
    pub async fn read(
        &self,
        contract: &str,
        method: &str,
        args: Vec<ArgValue>,
    ) -> Result<Vec<ArgValue>, DeployError> {
        let record = self.store.get(contract)?;
        let function = find_function(&record.abi, contract, method, args.len())?;
        let data = encode_call(function, &args)?;

        let output = self.ledger.call(record.address, data).await?;
        decode_output(function, &output)
    }

    // ---------------
    // | Idempotency |
    // ---------------

    /// Deploy a contract under the given logical name, unless a deployment
    /// is already recorded under it.
    ///
    /// The recorded constructor arguments are never compared: the first
    /// deployment wins.
    pub async fn deploy(
        &mut self,
        name: &str,
        options: DeployOptions,
    ) -> Result<Deployment, DeployError> {
        if let Some(record) = self.store.get_or_none(name) {
            debug!(name, address = %record.address, "reusing deployment");
            return Ok(Deployment { record, newly_deployed: false });
        }

        let contract = self.contracts.load(&options.contract)?;
        let record = self.deploy_contract(name, &contract, options.from, options.args).await?;
        self.store.save(name, record.clone())?;

        Ok(Deployment { record, newly_deployed: true })
    }

    /// Bring an on-chain value to the desired state, sending the setter only
    /// if the getter disagrees. A failed setter is returned as an error.
    pub async fn reconcile(&mut self, reconcile: Reconcile) -> Result<Converged, DeployError> {
        let mut values =
            self.read(&reconcile.contract, &reconcile.getter, reconcile.getter_args).await?;
        let current = match values.len() {
            1 => values.remove(0),
            _ => ArgValue::Array(values),
        };

        if current == reconcile.desired {
            debug!(contract = %reconcile.contract, getter = %reconcile.getter, "already set");
            return Ok(Converged::AlreadySet);
        }

        info!(
            contract = %reconcile.contract,
            current = %current,
            desired = %reconcile.desired,
            "calling {}",
            reconcile.setter
        );
        let outcome = self
            .execute(&reconcile.contract, reconcile.from, &reconcile.setter, reconcile.setter_args)
            .await?
            .into_result()?;

        Ok(Converged::Submitted(outcome))
    }

    /// Deploy a contract behind a transparent proxy, or bring an existing
    /// proxy up to date with the current implementation bytecode.
    ///
    /// The implementation is recorded as `<name>_Implementation` and
    /// redeployed whenever its bytecode changes; the proxy is then pointed at
    /// it from the proxy admin.
    pub async fn deploy_proxy(
        &mut self,
        name: &str,
        options: ProxyOptions,
    ) -> Result<ProxyDeployment, DeployError> {
        let contract = self.contracts.load(&options.contract)?;
        let implementation = self.deploy_implementation(name, &contract, options.from).await?;

        let (proxy, newly_deployed) = match self.store.get_or_none(name) {
            Some(record) => (record, false),
            None => {
                let record = self.deploy_proxy_contract(name, &options, &implementation).await?;
                self.store.save(name, record.clone())?;
                (record, true)
            }
        };

        // Point the proxy at the implementation
        let mut onchain = self.proxy_slot(proxy.address, PROXY_IMPLEMENTATION_SLOT).await?;
        let mut upgrade = None;
        if onchain != implementation.address {
            let mut admin = self.proxy_slot(proxy.address, PROXY_ADMIN_SLOT).await?;
            if admin == Address::ZERO {
                admin = options.admin;
            }

            info!(name, from = %onchain, to = %implementation.address, "upgrading proxy");
            let outcome = self.upgrade_to(name, proxy.address, admin, implementation.address).await?;
            if outcome.receipt().is_some() {
                onchain = implementation.address;
            }
            upgrade = Some(outcome);
        }

        // Keep the proxy record in line with the chain
        let record = if proxy.implementation != Some(onchain) {
            let mut updated = proxy.clone();
            updated.implementation = Some(onchain);
            updated.upgrade_index = proxy.upgrade_index + 1;
            if onchain == implementation.address {
                updated.abi = implementation.abi.clone();
                updated.bytecode_hash = implementation.bytecode_hash;
            }

            self.store.save(name, updated.clone())?;
            updated
        } else {
            proxy
        };

        Ok(ProxyDeployment { record, implementation, newly_deployed, upgrade })
    }

    // -----------
    // | Helpers |
    // -----------

    /// Submit a call through the unknown-signer shim, keeping any deferral
    async fn submit(&mut self, call: ContractCall) -> TxOutcome {
        let outcome = signer::submit(self.ledger, &self.current_step, call).await;
        if let TxOutcome::Deferred(pending) = &outcome {
            self.pending.push(pending.clone());
        }

        outcome
    }

    /// Deploy a compiled contract, producing its record without saving it
    async fn deploy_contract(
        &self,
        name: &str,
        contract: &CompiledContract,
        from: Address,
        args: Vec<ArgValue>,
    ) -> Result<DeploymentRecord, DeployError> {
        if !self.ledger.is_local_signer(from) {
            return Err(DeployError::SignerUnavailable(from));
        }

        let request = DeployRequest {
            from,
            bytecode: contract.bytecode.clone(),
            constructor_args: encode_constructor(&contract.abi, &args)?,
        };
        let receipt = self.ledger.deploy(request).await?;
        let address = receipt.contract_address.ok_or_else(|| {
            DeployError::Ledger(format!(
                "no contract address in receipt {:#x}",
                receipt.transaction_hash
            ))
        })?;

        info!(name, contract = %contract.name, %address, gas_used = receipt.gas_used, "deployed");
        Ok(DeploymentRecord {
            name: name.to_string(),
            address,
            constructor_args: args,
            abi: contract.abi.clone(),
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            upgrade_index: 0,
            implementation: None,
            bytecode_hash: Some(contract.bytecode_hash()),
        })
    }

    /// Deploy the implementation behind a proxy, unless one with the same
    /// bytecode is already recorded
    async fn deploy_implementation(
        &mut self,
        name: &str,
        contract: &CompiledContract,
        from: Address,
    ) -> Result<DeploymentRecord, DeployError> {
        let implementation_name = format!("{name}{IMPLEMENTATION_SUFFIX}");
        let existing = self.store.get_or_none(&implementation_name);
        if let Some(record) = &existing {
            if record.bytecode_hash == Some(contract.bytecode_hash()) {
                debug!(name = %implementation_name, address = %record.address, "reusing implementation");
                return Ok(record.clone());
            }
        }

        let mut record = self.deploy_contract(&implementation_name, contract, from, vec![]).await?;
        record.upgrade_index = existing.map(|r| r.upgrade_index + 1).unwrap_or_default();
        self.store.save(&implementation_name, record.clone())?;

        Ok(record)
    }

    /// Deploy a proxy in front of the given implementation
    async fn deploy_proxy_contract(
        &self,
        name: &str,
        options: &ProxyOptions,
        implementation: &DeploymentRecord,
    ) -> Result<DeploymentRecord, DeployError> {
        let init_data = match &options.init {
            Some((method, args)) => {
                let function = find_function(&implementation.abi, name, method, args.len())?;
                encode_call(function, args)?
            }
            None => Bytes::new(),
        };

        let proxy_contract = self.contracts.load(&options.proxy_contract)?;
        let args = vec![implementation.address.into(), options.admin.into(), init_data.into()];
        let mut record = self.deploy_contract(name, &proxy_contract, options.from, args).await?;

        record.abi = implementation.abi.clone();
        record.implementation = Some(implementation.address);
        record.bytecode_hash = implementation.bytecode_hash;
        Ok(record)
    }

    /// Send `upgradeTo(implementation)` to a proxy from its admin
    async fn upgrade_to(
        &mut self,
        name: &str,
        proxy: Address,
        admin: Address,
        implementation: Address,
    ) -> Result<TxOutcome, DeployError> {
        let function = Function::parse(&format!("function {UPGRADE_TO_METHOD}(address)"))
            .map_err(|e| DeployError::Abi(e.to_string()))?;
        let args = vec![ArgValue::Address(implementation)];
        let data = encode_call(&function, &args)?;

        let call = ContractCall {
            contract: name.to_string(),
            method: UPGRADE_TO_METHOD.to_string(),
            args,
            from: admin,
            to: proxy,
            data,
        };
        self.submit(call).await.into_result()
    }

    /// Read an address held in one of a proxy's storage slots
    async fn proxy_slot(&self, proxy: Address, slot: B256) -> Result<Address, DeployError> {
        let word = self.ledger.storage_at(proxy, slot).await?;
        Ok(Address::from_slice(
            &word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..NUM_BYTES_STORAGE_SLOT],
        ))
    }
}
