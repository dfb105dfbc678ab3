use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zwap_core::constants::{CLAIM_ENTRY_POINT, CLAIM_GAS_LIMIT, MSG_VERSION};
use zwap_core::error::ZwapError;
use zwap_core::leaf::balance_string;
use zwap_core::network::{Network, NetworkRegistry};
use zwap_core::types::{Address, Balance};
use zwap_crypto::VerifiedClaim;

use crate::args::{claim_args, ContractParam};

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Wallet connection state supplied by the caller for one request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimContext {
    pub network: Option<Network>,
    pub signer: Option<Address>,
}

impl ClaimContext {
    pub fn connected(network: Network, signer: Address) -> Self {
        Self {
            network: Some(network),
            signer: Some(signer),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPolicy {
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Price to offer when it beats the network minimum (Qa).
    #[serde(default)]
    pub preferred_gas_price: Option<Balance>,
}

fn default_gas_limit() -> u64 {
    CLAIM_GAS_LIMIT
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            gas_limit: CLAIM_GAS_LIMIT,
            preferred_gas_price: None,
        }
    }
}

impl GasPolicy {
    /// `max(min_gas_price, preferred)`.
    pub fn gas_price(&self, min_gas_price: Balance) -> Balance {
        match self.preferred_gas_price {
            Some(preferred) if preferred >= min_gas_price => preferred,
            Some(preferred) => {
                warn!(
                    preferred = %preferred,
                    minimum = %min_gas_price,
                    "preferred gas price below network minimum, using minimum"
                );
                min_gas_price
            }
            None => min_gas_price,
        }
    }
}

/// `(chain_id << 16) | msg_version`.
pub fn pack_version(chain_id: u16, msg_version: u16) -> u32 {
    (u32::from(chain_id) << 16) | u32::from(msg_version)
}

// ── Output ───────────────────────────────────────────────────────────────────

/// Everything needed to submit one `Claim` call.
///
/// Only [`ClaimRequestBuilder::build`] can produce one, so every instance
/// carries arguments taken from a [`VerifiedClaim`]:
///
/// ```compile_fail
/// use zwap_claim::ClaimTransactionParams;
/// use zwap_core::types::Address;
///
/// let forged = ClaimTransactionParams {
///     contract_address: Address::from_bytes([0; 20]),
///     chain_id: 1,
///     version: 65_537,
///     claim_amount: 1_000_000,
///     amount: 0,
///     gas_price: 0,
///     gas_limit: 30_000,
///     entry_point: "Claim".to_string(),
///     args: Vec::new(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimTransactionParams {
    contract_address: Address,
    chain_id: u32,
    version: u32,
    /// Copied from the verified leaf, never computed.
    #[serde(with = "balance_string")]
    claim_amount: Balance,
    /// Native value attached to the call; always zero.
    #[serde(with = "balance_string")]
    amount: Balance,
    #[serde(with = "balance_string")]
    gas_price: Balance,
    gas_limit: u64,
    entry_point: String,
    args: Vec<ContractParam>,
}

/// Transaction parameters in the shape the chain's RPC expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParams {
    pub amount: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub version: u32,
}

impl ClaimTransactionParams {
    pub fn contract_address(&self) -> &Address {
        &self.contract_address
    }

    pub fn chain_id(&self) -> u32 {
        self.chain_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn claim_amount(&self) -> Balance {
        self.claim_amount
    }

    pub fn amount(&self) -> Balance {
        self.amount
    }

    pub fn gas_price(&self) -> Balance {
        self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn args(&self) -> &[ContractParam] {
        &self.args
    }

    pub fn call_params(&self) -> CallParams {
        CallParams {
            amount: self.amount.to_string(),
            gas_price: self.gas_price.to_string(),
            gas_limit: self.gas_limit.to_string(),
            version: self.version,
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

pub struct ClaimRequestBuilder<'a> {
    registry: &'a NetworkRegistry,
    gas: GasPolicy,
}

impl<'a> ClaimRequestBuilder<'a> {
    pub fn new(registry: &'a NetworkRegistry, gas: GasPolicy) -> Self {
        Self { registry, gas }
    }

    /// Assemble the call for `claim`. `min_gas_price` comes from the caller's
    /// gas oracle; zero is accepted.
    pub fn build(
        &self,
        claim: &VerifiedClaim,
        ctx: &ClaimContext,
        min_gas_price: Balance,
    ) -> Result<ClaimTransactionParams, ZwapError> {
        let network = ctx.network.ok_or(ZwapError::NetworkNotInitialized)?;
        let signer = ctx.signer.ok_or(ZwapError::WalletNotConnected)?;
        let leaf = claim.leaf();
        if signer != leaf.address {
            return Err(ZwapError::ClaimerMismatch {
                signer: signer.to_string(),
                leaf: leaf.address.to_string(),
            });
        }

        let (contract_address, chain_id) = self.registry.resolve(network)?;
        let chain = u16::try_from(chain_id).map_err(|_| {
            ZwapError::InvalidConfig(format!("chain id {chain_id} does not fit the version field"))
        })?;
        let msg_version = u16::try_from(MSG_VERSION)
            .map_err(|_| ZwapError::InvalidConfig(format!("message version {MSG_VERSION}")))?;

        let params = ClaimTransactionParams {
            contract_address,
            chain_id,
            version: pack_version(chain, msg_version),
            claim_amount: leaf.amount,
            amount: 0,
            gas_price: self.gas.gas_price(min_gas_price),
            gas_limit: self.gas.gas_limit,
            entry_point: CLAIM_ENTRY_POINT.to_string(),
            args: claim_args(claim),
        };

        info!(
            network = %network,
            contract = %params.contract_address,
            epoch = leaf.epoch,
            address = %leaf.address,
            claim_amount = %params.claim_amount,
            gas_price = %params.gas_price,
            "claim request built"
        );
        Ok(params)
    }
}
