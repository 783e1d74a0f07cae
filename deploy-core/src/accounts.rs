//! Resolution of named account roles against the active network's accounts

use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::Address;
use deploy_common::{
    constants::DEFAULT_NETWORK_KEY, errors::DeployError, types::NetworkContext,
};
use serde::{Deserialize, Serialize};

/// A reference to an account, as written in configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    /// An index into the network's account list
    Index(usize),
    /// A literal address
    Address(Address),
    /// The name of another role
    Role(String),
}

/// The named-account configuration: `role -> { network key -> account }`,
/// where the network key is a network name, a chain ID or `"default"`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedAccounts(pub BTreeMap<String, BTreeMap<String, AccountRef>>);

impl NamedAccounts {
    /// Bind a role to an account under the given network key
    pub fn with_role(mut self, role: &str, network_key: &str, account: AccountRef) -> Self {
        self.0
            .entry(role.to_string())
            .or_default()
            .insert(network_key.to_string(), account);
        self
    }

    /// Resolve every role bound on the given network, producing the network
    /// context a scheduler invocation runs against
    pub fn resolve(
        &self,
        network_name: &str,
        chain_id: u64,
        accounts: &[Address],
    ) -> Result<NetworkContext, DeployError> {
        let resolver = Resolver { config: self, network_name, chain_id, accounts };

        let mut named_accounts = BTreeMap::new();
        for role in self.0.keys() {
            if let Some(address) = resolver.resolve_role(role, &mut Vec::new())? {
                named_accounts.insert(role.clone(), address);
            }
        }

        let bound: BTreeSet<Address> = named_accounts.values().copied().collect();
        let unnamed_accounts = accounts.iter().filter(|a| !bound.contains(*a)).copied().collect();

        Ok(NetworkContext {
            network_name: network_name.to_string(),
            chain_id,
            named_accounts,
            unnamed_accounts,
        })
    }
}

/// Resolves roles for a single network
struct Resolver<'a> {
    /// The named-account configuration
    config: &'a NamedAccounts,
    /// The name of the network
    network_name: &'a str,
    /// The chain ID of the network
    chain_id: u64,
    /// The network's accounts, in order
    accounts: &'a [Address],
}

impl Resolver<'_> {
    /// Resolve a role, returning `None` if it is not bound on this network.
    /// `visiting` holds the chain of roles currently being resolved.
    fn resolve_role(
        &self,
        role: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Option<Address>, DeployError> {
        if visiting.iter().any(|r| r == role) {
            visiting.push(role.to_string());
            return Err(DeployError::Config(format!(
                "named account reference cycle: {}",
                visiting.join(" -> ")
            )));
        }

        let Some(bindings) = self.config.0.get(role) else {
            return Err(DeployError::Config(format!("reference to undefined role `{role}`")));
        };

        let chain_key = self.chain_id.to_string();
        let account = bindings
            .get(self.network_name)
            .or_else(|| bindings.get(&chain_key))
            .or_else(|| bindings.get(DEFAULT_NETWORK_KEY));

        let address = match account {
            None => return Ok(None),
            Some(AccountRef::Address(address)) => *address,
            Some(AccountRef::Index(i)) => *self.accounts.get(*i).ok_or_else(|| {
                DeployError::Config(format!(
                    "role `{role}` refers to account {i}, but network `{}` only has {}",
                    self.network_name,
                    self.accounts.len()
                ))
            })?,
            Some(AccountRef::Role(other)) => {
                visiting.push(role.to_string());
                let resolved = self.resolve_role(other, visiting)?;
                visiting.pop();

                match resolved {
                    Some(address) => address,
                    None => return Ok(None),
                }
            }
        };

        Ok(Some(address))
    }
}
