//! zwap-rewards
//!
//! Time and emission side of the reward programme: the epoch clock that
//! drives the countdown, the two-stage emission schedule (retroactive
//! airdrop, then linear mining), and the epoch-info record published by the
//! distributor. Everything here is a pure function of its inputs; callers
//! own `now` and decide how often to recompute.

pub mod clock;
pub mod epoch_info;
pub mod schedule;

pub use clock::{tick, ClockReading, Countdown, Epoch, EpochClock};
pub use epoch_info::{overview, require, total_distributed_for, EpochInfo, RewardsOverview};
pub use schedule::{MiningCap, RewardSchedule, RewardScheduleParams, ScheduleStatus};
