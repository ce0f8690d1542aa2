//! Interval calculation.
//!
//! Pure functions over settings and wall-clock projections. The
//! determinism here is what lets the engine rebuild the countdown after
//! a cancel or a daily reset without re-reading any mutable state.

use crate::settings::{Mode, Settings};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const MINUTE_MS: i64 = 60 * 1000;

/// Full waiting interval for the current settings, in milliseconds.
///
/// - Spacing mode: the configured delay, floored at one minute.
/// - Quota mode: the active window divided evenly across the daily
///   quota (quota clamped to 1).
pub fn compute_interval(settings: &Settings) -> i64 {
    match settings.mode {
        Mode::Spacing => {
            let total_min =
                i64::from(settings.spacing.hours) * 60 + i64::from(settings.spacing.minutes);
            total_min.max(1) * MINUTE_MS
        }
        Mode::Quota => {
            let window =
                active_window_ms(settings.quota.window_start_min, settings.quota.window_end_min);
            window / i64::from(settings.quota.daily_quota.max(1))
        }
    }
}

/// Duration of the daily active window in milliseconds.
///
/// Wraps past midnight: when the naive `end - start` is not strictly
/// positive, a full day is added (so start == end means a 24 h window).
pub fn active_window_ms(start_min: u32, end_min: u32) -> i64 {
    let naive = (i64::from(end_min) - i64::from(start_min)) * MINUTE_MS;
    if naive > 0 {
        naive
    } else {
        naive + DAY_MS
    }
}

/// Whether a minute-of-day falls inside `[start, end)` with midnight
/// wraparound.
pub fn in_active_window(start_min: u32, end_min: u32, minute_of_day: u32) -> bool {
    if start_min == end_min {
        return true;
    }
    if start_min < end_min {
        minute_of_day >= start_min && minute_of_day < end_min
    } else {
        minute_of_day >= start_min || minute_of_day < end_min
    }
}

/// Portion of an elapsed wall-clock span that fell inside the daily
/// active window.
///
/// `from_ms_of_day` is the span start's position within its local day.
/// The quota-mode tick gate uses this so the budget drains only during
/// waking hours, no matter how long the process was suspended.
pub fn in_window_elapsed_ms(
    start_min: u32,
    end_min: u32,
    from_ms_of_day: i64,
    elapsed_ms: i64,
) -> i64 {
    if elapsed_ms <= 0 {
        return 0;
    }
    let window_len = active_window_ms(start_min, end_min);
    if window_len >= DAY_MS {
        return elapsed_ms;
    }
    let full_days = elapsed_ms / DAY_MS;
    let rem = elapsed_ms % DAY_MS;
    full_days * window_len
        + partial_overlap(start_min, end_min, from_ms_of_day.rem_euclid(DAY_MS), rem)
}

/// Overlap of a sub-day span starting at `p0` (ms of day) of length
/// `len` with the active window. Both the span and the window may wrap
/// once past midnight; each is split into linear pieces and the pieces
/// are overlapped pairwise.
fn partial_overlap(start_min: u32, end_min: u32, p0: i64, len: i64) -> i64 {
    let mut spans = [(0i64, 0i64); 2];
    let spans = if p0 + len <= DAY_MS {
        spans[0] = (p0, p0 + len);
        &spans[..1]
    } else {
        spans[0] = (p0, DAY_MS);
        spans[1] = (0, p0 + len - DAY_MS);
        &spans[..2]
    };

    let s = i64::from(start_min) * MINUTE_MS;
    let e = i64::from(end_min) * MINUTE_MS;
    let mut windows = [(0i64, 0i64); 2];
    let windows = if s < e {
        windows[0] = (s, e);
        &windows[..1]
    } else {
        windows[0] = (s, DAY_MS);
        windows[1] = (0, e);
        &windows[..2]
    };

    let mut total = 0;
    for &(a0, a1) in spans {
        for &(b0, b1) in windows {
            total += (a1.min(b1) - a0.max(b0)).max(0);
        }
    }
    total
}
