//! Wall-clock abstraction.
//!
//! The engine works in epoch milliseconds. Local-timezone projections
//! (calendar date, position within the day) live behind this trait so
//! tick and daily-reset logic can be driven by a settable clock in
//! tests.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

pub trait Clock {
    /// Current wall-clock time in epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Local calendar date of an epoch-ms timestamp.
    fn date_of(&self, epoch_ms: i64) -> NaiveDate;

    /// Milliseconds since local midnight of an epoch-ms timestamp.
    fn ms_of_day(&self, epoch_ms: i64) -> i64;

    /// Minutes since local midnight of an epoch-ms timestamp (0..1440).
    fn minute_of_day(&self, epoch_ms: i64) -> u32 {
        (self.ms_of_day(epoch_ms) / 60_000) as u32
    }

    fn today(&self) -> NaiveDate {
        self.date_of(self.now_ms())
    }
}

/// System clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn date_of(&self, epoch_ms: i64) -> NaiveDate {
        local_datetime(epoch_ms).date()
    }

    fn ms_of_day(&self, epoch_ms: i64) -> i64 {
        ms_since_midnight(&local_datetime(epoch_ms))
    }
}

fn local_datetime(epoch_ms: i64) -> NaiveDateTime {
    match Local.timestamp_millis_opt(epoch_ms) {
        chrono::LocalResult::Single(dt) => dt.naive_local(),
        _ => DateTime::from_timestamp_millis(epoch_ms)
            .unwrap_or_default()
            .naive_utc(),
    }
}

fn ms_since_midnight(dt: &NaiveDateTime) -> i64 {
    i64::from(dt.time().num_seconds_from_midnight()) * 1000
        + i64::from(dt.time().nanosecond() / 1_000_000)
}

/// Settable clock for deterministic tests. Clones share the same
/// underlying instant; projections use UTC so tests are independent of
/// the host timezone.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<i64>>);

impl ManualClock {
    pub fn new(epoch_ms: i64) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(epoch_ms)))
    }

    pub fn set(&self, epoch_ms: i64) {
        self.0.set(epoch_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.0.set(self.0.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }

    fn date_of(&self, epoch_ms: i64) -> NaiveDate {
        DateTime::from_timestamp_millis(epoch_ms)
            .unwrap_or_default()
            .naive_utc()
            .date()
    }

    fn ms_of_day(&self, epoch_ms: i64) -> i64 {
        ms_since_midnight(
            &DateTime::from_timestamp_millis(epoch_ms)
                .unwrap_or_default()
                .naive_utc(),
        )
    }
}
