use serde::{Deserialize, Serialize};
use zwap_core::amount::Amount;
use zwap_core::error::ZwapError;
use zwap_core::types::{EpochIndex, Timestamp};

use crate::clock::{Countdown, EpochClock};
use crate::schedule::{MiningCap, RewardSchedule, RewardScheduleParams, ScheduleStatus};

/// Epoch record published by the distributor (the "epoch info provider").
/// `None` wherever one of these is expected means no schedule is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochInfo {
    pub current: EpochIndex,
    pub max_epoch: EpochIndex,
    /// Start of epoch `current + 1` (Unix seconds).
    pub next_epoch_at: Timestamp,
    /// `tokens_per_epoch` from the distributor config, in whole tokens.
    pub raw_tokens_per_epoch: Amount,
}

impl EpochInfo {
    /// Derive the record locally from a clock instead of fetching it.
    pub fn from_clock(
        clock: &EpochClock,
        now: Timestamp,
        max_epoch: EpochIndex,
        tokens_per_epoch: Amount,
    ) -> Self {
        Self {
            current: clock.epoch_index_at(now),
            max_epoch,
            next_epoch_at: clock.next_boundary(now),
            raw_tokens_per_epoch: tokens_per_epoch,
        }
    }

    pub fn countdown(&self, now: Timestamp) -> Countdown {
        Countdown::until(self.next_epoch_at, now)
    }

    pub fn status(&self) -> ScheduleStatus {
        ScheduleStatus::at(self.current, self.max_epoch)
    }

    pub fn schedule_params(&self, cap: MiningCap) -> RewardScheduleParams {
        RewardScheduleParams::zwap(self.raw_tokens_per_epoch, self.max_epoch).with_mining_cap(cap)
    }
}

/// Unwrap an optional record, mapping absence to `ScheduleUnavailable`.
pub fn require(info: Option<&EpochInfo>) -> Result<&EpochInfo, ZwapError> {
    info.ok_or(ZwapError::ScheduleUnavailable)
}

/// Cumulative ZWAP emitted as of `info.current`; zero when no info exists.
pub fn total_distributed_for(info: Option<&EpochInfo>, cap: MiningCap) -> Result<Amount, ZwapError> {
    match info {
        None => Ok(Amount::ZERO),
        Some(info) => RewardSchedule::new(info.schedule_params(cap))?.total_distributed(info.current),
    }
}

/// Figures for the rewards overview panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RewardsOverview {
    pub epoch: EpochIndex,
    pub total_rewards: Amount,
    pub status: ScheduleStatus,
    /// `None` once the schedule is fully distributed.
    pub countdown: Option<Countdown>,
}

/// Returns `ScheduleUnavailable` when no epoch info is available.
pub fn overview(
    info: Option<&EpochInfo>,
    now: Timestamp,
    cap: MiningCap,
) -> Result<RewardsOverview, ZwapError> {
    let info = require(info)?;
    let status = info.status();
    Ok(RewardsOverview {
        epoch: info.current,
        total_rewards: total_distributed_for(Some(info), cap)?,
        status,
        countdown: status.is_active().then(|| info.countdown(now)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zwap_core::constants::{EPOCH_DURATION_SECS, SECS_PER_DAY};

    const GENESIS: Timestamp = 1_610_964_000;

    fn info(current: EpochIndex) -> EpochInfo {
        EpochInfo {
            current,
            max_epoch: 46,
            next_epoch_at: GENESIS + (i64::from(current) + 1) * EPOCH_DURATION_SECS,
            raw_tokens_per_epoch: "20000".parse().unwrap(),
        }
    }

    #[test]
    fn missing_info_totals_zero() {
        assert_eq!(
            total_distributed_for(None, MiningCap::Extrapolate).unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn missing_info_overview_is_expected_error() {
        let err = overview(None, GENESIS, MiningCap::Extrapolate).unwrap_err();
        assert!(matches!(err, ZwapError::ScheduleUnavailable));
        assert!(err.is_expected());
    }

    #[test]
    fn overview_while_active() {
        let now = GENESIS + 3 * EPOCH_DURATION_SECS + SECS_PER_DAY;
        let o = overview(Some(&info(3)), now, MiningCap::Extrapolate).unwrap();
        assert_eq!(o.total_rewards, "98500".parse::<Amount>().unwrap());
        assert!(o.status.is_active());
        assert_eq!(o.countdown.unwrap().days, 6);
    }

    #[test]
    fn overview_when_exhausted_has_no_countdown() {
        let o = overview(Some(&info(46)), GENESIS, MiningCap::Extrapolate).unwrap();
        assert_eq!(o.status, ScheduleStatus::FullyDistributed);
        assert!(o.countdown.is_none());
    }

    #[test]
    fn from_clock_matches_provider_shape() {
        let clock = EpochClock::new(GENESIS, EPOCH_DURATION_SECS).unwrap();
        let now = GENESIS + 10 * SECS_PER_DAY;
        let derived = EpochInfo::from_clock(&clock, now, 46, "20000".parse().unwrap());
        assert_eq!(derived, info(1));
        assert_eq!(derived.countdown(now).days, 4);
    }

    #[test]
    fn epoch_info_json() {
        let json = r#"{"current":3,"max_epoch":46,"next_epoch_at":1613383200,"raw_tokens_per_epoch":"20000"}"#;
        let parsed: EpochInfo = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, info(3));
    }
}
