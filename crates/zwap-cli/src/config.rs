use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use zwap_claim::GasPolicy;
use zwap_core::amount::Amount;
use zwap_core::constants::EPOCH_DURATION_SECS;
use zwap_core::network::NetworkRegistry;
use zwap_core::types::{EpochIndex, Timestamp};
use zwap_rewards::{EpochClock, RewardScheduleParams};

/// Start of epoch 0 on mainnet (2021-01-18 10:00 UTC).
pub const DEFAULT_GENESIS_TIMESTAMP: Timestamp = 1_610_964_000;

/// Mining emission per epoch once the programme is live (whole ZWAP).
pub const DEFAULT_TOKENS_PER_EPOCH: u64 = 6_250;

/// Last epoch of the programme.
pub const DEFAULT_MAX_EPOCH: EpochIndex = 152;

fn default_genesis() -> Timestamp {
    DEFAULT_GENESIS_TIMESTAMP
}

fn default_epoch_duration() -> i64 {
    EPOCH_DURATION_SECS
}

fn default_schedule() -> RewardScheduleParams {
    RewardScheduleParams::zwap(Amount::from_integer(DEFAULT_TOKENS_PER_EPOCH), DEFAULT_MAX_EPOCH)
}

/// Operator configuration, read from `~/.zwap/config.json` by default.
/// Every section is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZwapConfig {
    #[serde(default = "default_genesis")]
    pub genesis_timestamp: Timestamp,
    #[serde(default = "default_epoch_duration")]
    pub epoch_duration_secs: i64,
    #[serde(default = "default_schedule")]
    pub schedule: RewardScheduleParams,
    /// Distributor contracts have no defaults and must be set here.
    #[serde(default)]
    pub networks: NetworkRegistry,
    #[serde(default)]
    pub gas: GasPolicy,
}

impl Default for ZwapConfig {
    fn default() -> Self {
        Self {
            genesis_timestamp: DEFAULT_GENESIS_TIMESTAMP,
            epoch_duration_secs: EPOCH_DURATION_SECS,
            schedule: default_schedule(),
            networks: NetworkRegistry::default(),
            gas: GasPolicy::default(),
        }
    }
}

impl ZwapConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.schedule.validate()?;
        Ok(cfg)
    }

    pub fn clock(&self) -> anyhow::Result<EpochClock> {
        Ok(EpochClock::new(self.genesis_timestamp, self.epoch_duration_secs)?)
    }
}
