use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZwapError {
    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    // ── Schedule / configuration ─────────────────────────────────────────────
    /// No epoch information is available (e.g. before genesis). Expected and
    /// non-fatal; see [`ZwapError::is_expected`].
    #[error("reward schedule unavailable: no epoch information")]
    ScheduleUnavailable,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Merkle proofs ────────────────────────────────────────────────────────
    #[error("invalid merkle proof")]
    InvalidProof,

    #[error("duplicate distribution leaf for epoch {epoch}, address {address}")]
    DuplicateLeaf { epoch: u32, address: String },

    // ── Claim construction ───────────────────────────────────────────────────
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("wallet not connected")]
    WalletNotConnected,

    #[error("network not initialized")]
    NetworkNotInitialized,

    #[error("connected wallet {signer} does not own the leaf for {leaf}")]
    ClaimerMismatch { signer: String, leaf: String },

    #[error("claim submission failed: {0}")]
    Submission(String),

    // ── Encoding ─────────────────────────────────────────────────────────────
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ZwapError {
    /// True for states a caller should render rather than report as failures.
    pub fn is_expected(&self) -> bool {
        matches!(self, ZwapError::ScheduleUnavailable)
    }
}

impl From<serde_json::Error> for ZwapError {
    fn from(e: serde_json::Error) -> Self {
        ZwapError::Serialization(e.to_string())
    }
}
