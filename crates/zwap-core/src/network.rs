use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{MAINNET_CHAIN_ID, TESTNET_CHAIN_ID};
use crate::error::ZwapError;
use crate::types::Address;

/// Chains the distributor can be deployed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    MainNet,
    TestNet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::MainNet => write!(f, "mainnet"),
            Network::TestNet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ZwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::MainNet),
            "testnet" => Ok(Network::TestNet),
            other => Err(ZwapError::UnsupportedNetwork(other.to_string())),
        }
    }
}

/// Per-network deployment details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub chain_id: u32,
    /// Distribution contract. There is no built-in default; deployments
    /// must supply it.
    #[serde(default)]
    pub distributor_contract: Option<Address>,
    /// JSON-RPC endpoint used by tooling (never by the engine itself).
    pub rpc_url: String,
}

/// Explicit replacement for ambient "current network" state: every claim
/// build receives the registry it resolves against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkRegistry {
    entries: BTreeMap<Network, NetworkEntry>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            Network::MainNet,
            NetworkEntry {
                chain_id: MAINNET_CHAIN_ID,
                distributor_contract: None,
                rpc_url: "https://api.zilliqa.com".into(),
            },
        );
        entries.insert(
            Network::TestNet,
            NetworkEntry {
                chain_id: TESTNET_CHAIN_ID,
                distributor_contract: None,
                rpc_url: "https://dev-api.zilliqa.com".into(),
            },
        );
        Self { entries }
    }
}

impl NetworkRegistry {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, network: Network, entry: NetworkEntry) {
        self.entries.insert(network, entry);
    }

    pub fn get(&self, network: Network) -> Option<&NetworkEntry> {
        self.entries.get(&network)
    }

    /// Set the distributor contract on an existing entry.
    pub fn set_distributor(&mut self, network: Network, contract: Address) -> Result<(), ZwapError> {
        let entry = self
            .entries
            .get_mut(&network)
            .ok_or_else(|| ZwapError::UnsupportedNetwork(network.to_string()))?;
        entry.distributor_contract = Some(contract);
        Ok(())
    }

    /// Distributor contract address and chain id for `network`.
    pub fn resolve(&self, network: Network) -> Result<(Address, u32), ZwapError> {
        let entry = self
            .entries
            .get(&network)
            .ok_or_else(|| ZwapError::UnsupportedNetwork(network.to_string()))?;
        let contract = entry.distributor_contract.ok_or_else(|| {
            ZwapError::UnsupportedNetwork(format!("{network}: no distributor contract configured"))
        })?;
        Ok((contract, entry.chain_id))
    }
}
