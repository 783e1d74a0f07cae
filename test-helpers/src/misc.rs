//! Miscellaneous test helpers

use std::{collections::BTreeMap, sync::Once};

use alloy::primitives::{keccak256, Address};
use deploy_common::types::NetworkContext;
use tracing_subscriber::EnvFilter;

/// The chain ID of a local development node
pub const DEV_CHAIN_ID: u64 = 31337;

/// Guards the one-time installation of the test subscriber
static INIT_LOGGING: Once = Once::new();

/// Install a tracing subscriber writing through the test harness, filtered
/// by `RUST_LOG`
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    });
}

/// A deterministic account for the given label
pub fn account(label: &str) -> Address {
    Address::from_word(keccak256(label))
}

/// A network context binding each role to the account of the same label
pub fn network(name: &str, chain_id: u64, roles: &[&str]) -> NetworkContext {
    let named_accounts: BTreeMap<String, Address> =
        roles.iter().map(|role| (role.to_string(), account(role))).collect();

    NetworkContext {
        network_name: name.to_string(),
        chain_id,
        named_accounts,
        unnamed_accounts: vec![],
    }
}
