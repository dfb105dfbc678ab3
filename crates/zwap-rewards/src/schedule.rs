//! ZWAP emission schedule.
//!
//! Stage 1, retroactive airdrop (counted from epoch 0):
//!
//!   airdrop = total_supply × retroactive_airdrop_factor + fixed_airdrop_bonus
//!
//! Stage 2, linear mining (epoch 1 is the first with a full epoch mined):
//!
//!   mining(e) = tokens_per_epoch × max(0, e − 1)
//!
//! Totals are computed in base units (10^decimals) and reported in whole
//! tokens. Past `max_epoch` the formula keeps extrapolating unless
//! [`MiningCap::FreezeAtMaxEpoch`] is configured; the engine does not check
//! that the schedule adds up to the supply (see [`RewardSchedule::supply_overrun`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zwap_core::amount::Amount;
use zwap_core::constants::{
    FIXED_AIRDROP_BONUS_ZWAP, RETROACTIVE_AIRDROP_FACTOR_BPS, TOKEN_DECIMALS, TOTAL_SUPPLY_ZWAP,
};
use zwap_core::error::ZwapError;
use zwap_core::types::EpochIndex;

/// What the mining term does once `max_epoch` is reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningCap {
    /// Keep multiplying by the raw epoch index (the published dashboard
    /// figure).
    #[default]
    Extrapolate,
    /// Clamp the epoch index at `max_epoch` before applying the formula.
    FreezeAtMaxEpoch,
}

fn default_total_supply() -> Amount {
    Amount::from_integer(TOTAL_SUPPLY_ZWAP)
}

fn default_airdrop_factor() -> Amount {
    Amount::from_bps(RETROACTIVE_AIRDROP_FACTOR_BPS)
}

fn default_airdrop_bonus() -> Amount {
    Amount::from_integer(FIXED_AIRDROP_BONUS_ZWAP)
}

fn default_decimals() -> u32 {
    TOKEN_DECIMALS
}

/// Schedule parameters. Amounts are in whole tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardScheduleParams {
    #[serde(default = "default_total_supply")]
    pub total_supply: Amount,
    /// Fraction in (0, 1].
    #[serde(default = "default_airdrop_factor")]
    pub retroactive_airdrop_factor: Amount,
    #[serde(default = "default_airdrop_bonus")]
    pub fixed_airdrop_bonus: Amount,
    /// From the distributor's on-chain config.
    pub tokens_per_epoch: Amount,
    /// Last epoch of the programme (inclusive).
    pub max_epoch: EpochIndex,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default)]
    pub mining_cap: MiningCap,
}

impl RewardScheduleParams {
    /// ZWAP constants with the two on-chain values filled in.
    pub fn zwap(tokens_per_epoch: Amount, max_epoch: EpochIndex) -> Self {
        Self {
            total_supply: default_total_supply(),
            retroactive_airdrop_factor: default_airdrop_factor(),
            fixed_airdrop_bonus: default_airdrop_bonus(),
            tokens_per_epoch,
            max_epoch,
            decimals: default_decimals(),
            mining_cap: MiningCap::default(),
        }
    }

    pub fn with_mining_cap(mut self, cap: MiningCap) -> Self {
        self.mining_cap = cap;
        self
    }

    pub fn validate(&self) -> Result<(), ZwapError> {
        let factor = self.retroactive_airdrop_factor;
        if factor <= Amount::ZERO || factor > Amount::from_integer(1) {
            return Err(ZwapError::InvalidConfig(format!(
                "retroactive airdrop factor must be in (0, 1], got {factor}"
            )));
        }
        for (name, value) in [
            ("total_supply", self.total_supply),
            ("fixed_airdrop_bonus", self.fixed_airdrop_bonus),
            ("tokens_per_epoch", self.tokens_per_epoch),
        ] {
            if value.is_negative() {
                return Err(ZwapError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Where the programme stands at a given epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduleStatus {
    Active {
        next_epoch: EpochIndex,
        last_epoch: EpochIndex,
    },
    FullyDistributed,
}

impl ScheduleStatus {
    pub fn at(epoch: EpochIndex, max_epoch: EpochIndex) -> Self {
        if epoch >= max_epoch {
            ScheduleStatus::FullyDistributed
        } else {
            ScheduleStatus::Active {
                next_epoch: epoch + 1,
                last_epoch: max_epoch,
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ScheduleStatus::Active { .. })
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Active {
                next_epoch,
                last_epoch,
            } => write!(
                f,
                "until next epoch (#{next_epoch}), last epoch at #{last_epoch}"
            ),
            ScheduleStatus::FullyDistributed => write!(f, "All ZWAP rewards distributed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardSchedule {
    params: RewardScheduleParams,
}

impl RewardSchedule {
    pub fn new(params: RewardScheduleParams) -> Result<Self, ZwapError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RewardScheduleParams {
        &self.params
    }

    pub fn max_epoch(&self) -> EpochIndex {
        self.params.max_epoch
    }

    fn to_base(&self, amount: Amount) -> Result<Amount, ZwapError> {
        amount.scale_by(self.params.decimals as i32)
    }

    fn to_display(&self, base: Amount) -> Result<Amount, ZwapError> {
        base.scale_by(-(self.params.decimals as i32))
    }

    /// Stage 1 total in base units. The retroactive share is truncated to
    /// whole base units.
    fn airdrop_base(&self) -> Result<Amount, ZwapError> {
        let share = self
            .to_base(self.params.total_supply)?
            .checked_mul(self.params.retroactive_airdrop_factor)?
            .truncate(0);
        share.checked_add(self.to_base(self.params.fixed_airdrop_bonus)?)
    }

    /// Number of epochs whose mining emission counts toward `epoch`'s total.
    pub fn mining_epochs(&self, epoch: EpochIndex) -> EpochIndex {
        let effective = match self.params.mining_cap {
            MiningCap::Extrapolate => epoch,
            MiningCap::FreezeAtMaxEpoch => epoch.min(self.params.max_epoch),
        };
        effective.saturating_sub(1)
    }

    /// Stage 1 airdrop, in whole tokens.
    pub fn airdrop_total(&self) -> Result<Amount, ZwapError> {
        self.to_display(self.airdrop_base()?)
    }

    /// Cumulative emission up to and including `epoch`, in whole tokens.
    pub fn total_distributed(&self, epoch: EpochIndex) -> Result<Amount, ZwapError> {
        let epochs = Amount::from_integer(u64::from(self.mining_epochs(epoch)));
        let mining = self
            .to_base(self.params.tokens_per_epoch)?
            .checked_mul(epochs)?;
        let total = self.to_display(self.airdrop_base()?.checked_add(mining)?)?;
        debug!(epoch, total = %total, "total distributed");
        Ok(total)
    }

    /// Newly emitted in `epoch` alone: the airdrop for epoch 0, the
    /// difference of consecutive totals afterwards.
    pub fn epoch_emission(&self, epoch: EpochIndex) -> Result<Amount, ZwapError> {
        if epoch == 0 {
            return self.total_distributed(0);
        }
        self.total_distributed(epoch)?
            .checked_sub(self.total_distributed(epoch - 1)?)
    }

    /// Supply not yet emitted at `epoch`, floored at zero.
    pub fn remaining_supply(&self, epoch: EpochIndex) -> Result<Amount, ZwapError> {
        let remaining = self
            .params
            .total_supply
            .checked_sub(self.total_distributed(epoch)?)?;
        Ok(if remaining.is_negative() {
            Amount::ZERO
        } else {
            remaining
        })
    }

    /// By how much the formula exceeds `total_supply` at `epoch`, if at all.
    pub fn supply_overrun(&self, epoch: EpochIndex) -> Result<Option<Amount>, ZwapError> {
        let excess = self
            .total_distributed(epoch)?
            .checked_sub(self.params.total_supply)?;
        Ok((!excess.is_negative() && !excess.is_zero()).then_some(excess))
    }

    pub fn status(&self, epoch: EpochIndex) -> ScheduleStatus {
        ScheduleStatus::at(epoch, self.params.max_epoch)
    }

    pub fn is_fully_distributed(&self, epoch: EpochIndex) -> bool {
        !self.status(epoch).is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn schedule() -> RewardSchedule {
        RewardSchedule::new(RewardScheduleParams::zwap(amt("20000"), 46)).unwrap()
    }

    #[test]
    fn epoch_three_total() {
        // 1_000_000 × 0.05 + 8500 + 20000 × 2
        assert_eq!(schedule().total_distributed(3).unwrap(), amt("98500"));
    }

    #[test]
    fn epochs_zero_and_one_are_airdrop_only() {
        let s = schedule();
        assert_eq!(s.airdrop_total().unwrap(), amt("58500"));
        assert_eq!(s.total_distributed(0).unwrap(), amt("58500"));
        assert_eq!(s.total_distributed(1).unwrap(), amt("58500"));
        assert_eq!(s.total_distributed(2).unwrap(), amt("78500"));
    }

    #[test]
    fn per_epoch_emission() {
        let s = schedule();
        assert_eq!(s.epoch_emission(0).unwrap(), amt("58500"));
        assert_eq!(s.epoch_emission(1).unwrap(), Amount::ZERO);
        assert_eq!(s.epoch_emission(2).unwrap(), amt("20000"));
        assert_eq!(s.epoch_emission(30).unwrap(), amt("20000"));
    }

    #[test]
    fn fractional_parameters_stay_exact() {
        let params = RewardScheduleParams {
            retroactive_airdrop_factor: amt("0.123456789"),
            tokens_per_epoch: amt("6250.000000000001"),
            ..RewardScheduleParams::zwap(Amount::ZERO, 100)
        };
        let s = RewardSchedule::new(params).unwrap();
        // 123456.789 + 8500 + 6250.000000000001 × 9
        assert_eq!(s.total_distributed(10).unwrap(), amt("188206.789000000009"));
    }

    #[test]
    fn terminal_status() {
        let s = schedule();
        assert_eq!(
            s.status(45),
            ScheduleStatus::Active {
                next_epoch: 46,
                last_epoch: 46
            }
        );
        assert_eq!(s.status(46), ScheduleStatus::FullyDistributed);
        assert!(s.is_fully_distributed(60));
        assert_eq!(s.status(46).to_string(), "All ZWAP rewards distributed");
    }

    #[test]
    fn extrapolates_past_max_epoch_by_default() {
        let s = schedule();
        let at_max = s.total_distributed(46).unwrap();
        assert!(s.total_distributed(50).unwrap() > at_max);
    }

    #[test]
    fn freeze_cap_clamps_at_max_epoch() {
        let s = RewardSchedule::new(
            RewardScheduleParams::zwap(amt("20000"), 46).with_mining_cap(MiningCap::FreezeAtMaxEpoch),
        )
        .unwrap();
        let at_max = s.total_distributed(46).unwrap();
        assert_eq!(at_max, amt("958500"));
        assert_eq!(s.total_distributed(100).unwrap(), at_max);
        assert_eq!(s.epoch_emission(47).unwrap(), Amount::ZERO);
    }

    #[test]
    fn overrun_and_remaining() {
        let s = schedule();
        assert_eq!(s.remaining_supply(3).unwrap(), amt("901500"));
        assert_eq!(s.supply_overrun(3).unwrap(), None);
        // 58500 + 20000 × 49 = 1_038_500
        assert_eq!(s.supply_overrun(50).unwrap(), Some(amt("38500")));
        assert_eq!(s.remaining_supply(50).unwrap(), Amount::ZERO);
    }

    #[test]
    fn invalid_factor_rejected() {
        for factor in ["0", "1.01", "-0.5"] {
            let params = RewardScheduleParams {
                retroactive_airdrop_factor: amt(factor),
                ..RewardScheduleParams::zwap(amt("1"), 1)
            };
            assert!(matches!(
                RewardSchedule::new(params),
                Err(ZwapError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn params_json_defaults() {
        let params: RewardScheduleParams =
            serde_json::from_str(r#"{"tokens_per_epoch":"20000","max_epoch":46}"#).unwrap();
        assert_eq!(params, RewardScheduleParams::zwap(amt("20000"), 46));
    }

    proptest! {
        #[test]
        fn totals_never_decrease(tpe in 0u64..1_000_000, max_epoch in 1u32..500, e in 0u32..499) {
            let s = RewardSchedule::new(
                RewardScheduleParams::zwap(Amount::from_integer(tpe), max_epoch),
            ).unwrap();
            prop_assume!(e + 1 < max_epoch);
            prop_assert!(s.total_distributed(e + 1).unwrap() >= s.total_distributed(e).unwrap());
        }
    }
}
