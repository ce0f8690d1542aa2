use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the engine produces an Event.
/// One-shot commands print them; the watch loop streams them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CigaretteRecorded {
        count: u32,
        /// Time actually waited since the previous cigarette.
        waited_ms: i64,
        interval_ms: i64,
        next_allowed_at_ms: i64,
        at: DateTime<Utc>,
    },
    CigaretteCancelled {
        count: u32,
        at: DateTime<Utc>,
    },
    /// The waiting interval ran out; the next cigarette is allowed.
    IntervalElapsed {
        at: DateTime<Utc>,
    },
    /// Overrun passed the configured threshold for the current interval.
    OverrunThresholdCrossed {
        overrun_ms: i64,
        at: DateTime<Utc>,
    },
    /// A run of comfortably-held intervals; the goal could be adjusted.
    GoalAdjustSuggested {
        streak: u32,
        at: DateTime<Utc>,
    },
    /// The calendar day rolled over: yesterday archived, counters zeroed.
    DailyReset {
        archived_date: NaiveDate,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        remaining_ms: i64,
        interval_ms: i64,
        cigarette_count: u32,
        overrun: bool,
        /// In quota mode, whether the active window is currently open
        /// (the countdown is suspended while it is closed).
        window_open: bool,
        next_allowed_at_ms: i64,
        money_saved_cents: i64,
        at: DateTime<Utc>,
    },
}
