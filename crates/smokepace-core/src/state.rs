//! Persisted countdown state.

use serde::{Deserialize, Serialize};

/// Snapshot of the current countdown between cigarettes.
///
/// `interval_ms` is the countdown anchor: the remaining wait as of
/// `last_update_epoch_ms`. Right after a smoke or daily reset it equals
/// the full computed interval; every tick re-anchors it. The live
/// remaining time is always derived, never stored:
///
/// `remaining_ms(now) = interval_ms - (now - last_update_epoch_ms)`
///
/// Negative remaining time means overrun. Overrun is a value condition,
/// not a separate state -- the countdown keeps running past zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub interval_ms: i64,
    /// Cigarettes smoked since the last daily reset.
    pub cigarette_count: u32,
    /// Overrun events recorded today; denominator for the daily
    /// report's rolling overrun average.
    pub overrun_count: u32,
    pub last_update_epoch_ms: i64,
}

impl TimerState {
    /// Remaining wait at `now_ms`. A clock that moved backwards yields
    /// a negative elapsed delta, which clamps to zero.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.interval_ms - (now_ms - self.last_update_epoch_ms).max(0)
    }
}
