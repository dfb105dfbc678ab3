use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ZwapError;

/// Token quantity in base units (1 ZWAP = 10^12 base units). u128 covers the
/// full supply with room to spare.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Distribution epoch index. Epoch 0 is the retroactive airdrop period.
pub type EpochIndex = u32;

// ── Address ──────────────────────────────────────────────────────────────────

/// 20-byte account identifier (the "byte20" form of a wallet address).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn from_bytes(b: [u8; 20]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lower-case hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Accepts 40 hex characters, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ZwapError> {
        let bytes = decode_hex_prefixed(s)?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ZwapError::InvalidAddress(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}…)", &self.to_hex()[..10])
    }
}

impl FromStr for Address {
    type Err = ZwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Decode a hex string, tolerating an optional `0x` / `0X` prefix.
pub fn decode_hex_prefixed(s: &str) -> Result<Vec<u8>, ZwapError> {
    let trimmed = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(trimmed).map_err(|e| ZwapError::InvalidHex(format!("{s}: {e}")))
}

/// Decode a 32-byte hash from hex (optional `0x` prefix).
pub fn decode_hash32(s: &str) -> Result<[u8; 32], ZwapError> {
    decode_hex_prefixed(s)?
        .try_into()
        .map_err(|_| ZwapError::InvalidHex(format!("{s}: expected 32 bytes")))
}
