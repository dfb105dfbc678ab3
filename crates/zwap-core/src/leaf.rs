//! zwap-core::leaf
//!
//! Published distribution records: one `DistributionLeaf` per (epoch,
//! address), and the sibling path (`MerkleProof`) that ties it to the epoch's
//! root. Both are produced off-chain by the distributor at epoch close.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::Amount;
use crate::constants::TOKEN_DECIMALS;
use crate::error::ZwapError;
use crate::types::{decode_hash32, Address, Balance, EpochIndex};

/// Length of [`DistributionLeaf::to_bytes`].
pub const LEAF_ENCODED_LEN: usize = 4 + 20 + 16;

/// A single claimable allocation. Immutable once published.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistributionLeaf {
    pub epoch: EpochIndex,
    pub address: Address,
    /// Base units (12 decimals), carried as a decimal string in JSON.
    #[serde(with = "balance_string")]
    pub amount: Balance,
}

impl DistributionLeaf {
    pub fn new(epoch: EpochIndex, address: Address, amount: Balance) -> Self {
        Self {
            epoch,
            address,
            amount,
        }
    }

    /// Canonical encoding hashed into the tree:
    /// `epoch_be_u32 || address[20] || amount_be_u128`.
    pub fn to_bytes(&self) -> [u8; LEAF_ENCODED_LEN] {
        let mut out = [0u8; LEAF_ENCODED_LEN];
        out[..4].copy_from_slice(&self.epoch.to_be_bytes());
        out[4..24].copy_from_slice(self.address.as_bytes());
        out[24..].copy_from_slice(&self.amount.to_be_bytes());
        out
    }

    /// Amount in whole-token display units.
    pub fn amount_tokens(&self) -> Result<Amount, ZwapError> {
        Amount::from_base_units(self.amount, TOKEN_DECIMALS)
    }
}

/// Ordered sibling hashes from leaf to root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MerkleProof(pub Vec<[u8; 32]>);

impl MerkleProof {
    pub fn new(siblings: Vec<[u8; 32]>) -> Self {
        Self(siblings)
    }

    pub fn siblings(&self) -> &[[u8; 32]] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse distributor output; each element may or may not carry `0x`.
    pub fn from_hex_strings<S: AsRef<str>>(items: &[S]) -> Result<Self, ZwapError> {
        items
            .iter()
            .map(|s| decode_hash32(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// `0x`-prefixed lower-case hex, the form the contract call expects.
    pub fn to_prefixed_hex(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|h| format!("0x{}", hex::encode(h)))
            .collect()
    }
}

impl Serialize for MerkleProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_prefixed_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MerkleProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<String>::deserialize(deserializer)?;
        Self::from_hex_strings(&items).map_err(serde::de::Error::custom)
    }
}

/// Serde helper: a `Balance` as a decimal string.
pub mod balance_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Balance;

    pub fn serialize<S: Serializer>(value: &Balance, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Balance, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
