//! Epoch clock.
//!
//! Epoch `k` covers `[genesis + k·duration, genesis + (k+1)·duration)`.
//! Before genesis the clock reports epoch 0 and counts down to the end of
//! epoch 0. The clock owns no timer: a caller polls [`tick`] on its own
//! schedule (the dashboard does so once per second) and simply stops calling
//! it to cancel.

use std::fmt;

use serde::{Deserialize, Serialize};
use zwap_core::constants::{SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_MINUTE};
use zwap_core::error::ZwapError;
use zwap_core::types::{EpochIndex, Timestamp};

/// One distribution window. `end_time == start_time + duration`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub index: EpochIndex,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl Epoch {
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start_time <= t && t < self.end_time
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    genesis: Timestamp,
    duration_secs: i64,
}

impl EpochClock {
    pub fn new(genesis: Timestamp, duration_secs: i64) -> Result<Self, ZwapError> {
        if duration_secs <= 0 {
            return Err(ZwapError::InvalidConfig(format!(
                "epoch duration must be positive, got {duration_secs}"
            )));
        }
        Ok(Self {
            genesis,
            duration_secs,
        })
    }

    pub fn genesis(&self) -> Timestamp {
        self.genesis
    }

    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    /// `floor((now - genesis) / duration)`, floored at 0 before genesis.
    pub fn epoch_index_at(&self, now: Timestamp) -> EpochIndex {
        if now < self.genesis {
            return 0;
        }
        let elapsed = (now - self.genesis) / self.duration_secs;
        EpochIndex::try_from(elapsed).unwrap_or(EpochIndex::MAX)
    }

    pub fn epoch(&self, index: EpochIndex) -> Epoch {
        let start_time = self.genesis + i64::from(index) * self.duration_secs;
        Epoch {
            index,
            start_time,
            end_time: start_time + self.duration_secs,
        }
    }

    pub fn current_epoch(&self, now: Timestamp) -> Epoch {
        self.epoch(self.epoch_index_at(now))
    }

    /// `genesis + (index + 1) * duration`.
    pub fn next_boundary(&self, now: Timestamp) -> Timestamp {
        self.current_epoch(now).end_time
    }

    /// Seconds until the next boundary, never negative.
    pub fn time_remaining(&self, now: Timestamp) -> i64 {
        (self.next_boundary(now) - now).max(0)
    }

    pub fn countdown(&self, now: Timestamp) -> Countdown {
        Countdown::from_secs(self.time_remaining(now))
    }
}

// ── Countdown ────────────────────────────────────────────────────────────────

/// Remaining time split by floor-division cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Negative inputs clamp to zero.
    pub fn from_secs(secs: i64) -> Self {
        let secs = secs.max(0);
        Self {
            days: secs / SECS_PER_DAY,
            hours: (secs % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (secs % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: secs % SECS_PER_MINUTE,
        }
    }

    /// Countdown to a boundary supplied by an external epoch-info provider.
    pub fn until(boundary: Timestamp, now: Timestamp) -> Self {
        Self::from_secs(boundary - now)
    }

    pub fn total_secs(&self) -> i64 {
        self.days * SECS_PER_DAY
            + self.hours * SECS_PER_HOUR
            + self.minutes * SECS_PER_MINUTE
            + self.seconds
    }

    pub fn is_elapsed(&self) -> bool {
        self.total_secs() == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Result of one countdown recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockReading {
    /// No epoch configuration is known. Distinct from a zero countdown.
    Unavailable,
    Running {
        epoch: Epoch,
        next_boundary: Timestamp,
        countdown: Countdown,
    },
}

impl ClockReading {
    pub fn is_available(&self) -> bool {
        matches!(self, ClockReading::Running { .. })
    }

    pub fn countdown(&self) -> Option<Countdown> {
        match self {
            ClockReading::Running { countdown, .. } => Some(*countdown),
            ClockReading::Unavailable => None,
        }
    }

    pub fn epoch_index(&self) -> Option<EpochIndex> {
        match self {
            ClockReading::Running { epoch, .. } => Some(epoch.index),
            ClockReading::Unavailable => None,
        }
    }
}

/// Recompute the countdown for `now`.
pub fn tick(clock: Option<&EpochClock>, now: Timestamp) -> ClockReading {
    match clock {
        None => ClockReading::Unavailable,
        Some(c) => {
            let epoch = c.current_epoch(now);
            ClockReading::Running {
                epoch,
                next_boundary: epoch.end_time,
                countdown: c.countdown(now),
            }
        }
    }
}
