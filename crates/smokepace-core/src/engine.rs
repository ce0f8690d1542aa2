//! Countdown engine.
//!
//! A wall-clock-based state machine in the same mold as a caller-driven
//! timer: no internal threads, the host invokes [`CountdownEngine::tick`]
//! about once per second, and every mutation persists through the store
//! before the call returns. That single-writer discipline is what keeps
//! a background tick and a foreground command from interleaving
//! half-applied updates.
//!
//! Overrun is a value condition (`remaining_ms < 0`), not a separate
//! stored state: the countdown keeps running past zero and the snapshot
//! reports how far over the smoker is.
//!
//! ## Daily rollover
//!
//! Three triggers can observe a calendar-day change -- the periodic
//! tick, a foreground command, or a process restart (`bootstrap`). All
//! of them funnel into the same rollover, whose writes are upserts or
//! guarded seeds, so firing more than once for the same date leaves the
//! history unchanged.

use chrono::{DateTime, NaiveDate, Utc};

use crate::clock::Clock;
use crate::error::CoreError;
use crate::events::Event;
use crate::interval;
use crate::notify::Notifier;
use crate::report::{DailyReport, ReportKind};
use crate::settings::{Mode, Settings};
use crate::state::TimerState;
use crate::storage::Store;

pub struct CountdownEngine<S, C, N> {
    store: S,
    clock: C,
    notifier: N,
    settings: Settings,
    state: TimerState,
    /// Consecutive qualifying waits toward the goal-adjust suggestion.
    /// Per-process, like the rest of the suggestion policy.
    suggestion_streak: u32,
    /// Set once the interval-elapsed notification fired for the
    /// current interval.
    elapsed_notified: bool,
    overrun_notified: bool,
}

impl<S: Store, C: Clock, N: Notifier> CountdownEngine<S, C, N> {
    /// Load settings and state, seeding zeroed state on first launch,
    /// and apply the daily rollover if the process slept across
    /// midnight.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn bootstrap(store: S, clock: C, notifier: N) -> Result<Self, CoreError> {
        let settings = store.load_settings()?;
        let now = clock.now_ms();
        let state = match store.load_state()? {
            Some(state) => state,
            None => {
                let fresh = TimerState {
                    interval_ms: interval::compute_interval(&settings),
                    cigarette_count: 0,
                    overrun_count: 0,
                    last_update_epoch_ms: now,
                };
                store.save_state(&fresh)?;
                fresh
            }
        };

        let mut engine = Self {
            store,
            clock,
            notifier,
            settings,
            state,
            suggestion_streak: 0,
            elapsed_notified: false,
            overrun_notified: false,
        };
        engine.rollover_if_due()?;

        // Already in overrun at load time: those notifications belong
        // to a previous process lifetime, don't refire them.
        if engine.remaining_ms() <= 0 {
            engine.elapsed_notified = true;
            engine.overrun_notified = true;
        }
        Ok(engine)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn cigarette_count(&self) -> u32 {
        self.state.cigarette_count
    }

    /// Remaining wait right now. In quota mode only the in-window part
    /// of the elapsed time counts, so a closed active window never
    /// drains the budget.
    pub fn remaining_ms(&self) -> i64 {
        let now = self.clock.now_ms();
        let delta = (now - self.state.last_update_epoch_ms).max(0);
        self.state.interval_ms - self.effective_elapsed(delta)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let now = self.clock.now_ms();
        let remaining = self.remaining_ms();
        let window_open = match self.settings.mode {
            Mode::Spacing => true,
            Mode::Quota => interval::in_active_window(
                self.settings.quota.window_start_min,
                self.settings.quota.window_end_min,
                self.clock.minute_of_day(now),
            ),
        };
        Event::StateSnapshot {
            remaining_ms: remaining,
            interval_ms: interval::compute_interval(&self.settings),
            cigarette_count: self.state.cigarette_count,
            overrun: remaining < 0,
            window_open,
            next_allowed_at_ms: now + remaining.max(0),
            money_saved_cents: money_saved_cents(&self.settings, self.state.cigarette_count),
            at: self.at(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Periodic entry point; call about once per second.
    ///
    /// The countdown is recomputed from the real wall-clock delta since
    /// the last persisted update, never a fixed decrement, so a
    /// suspended process catches up correctly on resume.
    pub fn tick(&mut self) -> Result<Vec<Event>, CoreError> {
        // Day boundary first; the reset replaces the decrement this tick.
        if let Some(event) = self.rollover_if_due()? {
            return Ok(vec![event]);
        }

        let now = self.clock.now_ms();
        let delta = (now - self.state.last_update_epoch_ms).max(0);
        let effective = self.effective_elapsed(delta);
        if effective == 0 {
            // Nothing elapsed inside the active window (or at all):
            // suspended, nothing to persist.
            return Ok(Vec::new());
        }

        let before = self.state.interval_ms;
        self.state.interval_ms = before - effective;
        self.state.last_update_epoch_ms = now;
        self.store.save_state(&self.state)?;

        let after = self.state.interval_ms;
        let mut events = Vec::new();

        if before > 0 && after <= 0 && !self.elapsed_notified {
            self.elapsed_notified = true;
            if self.settings.notifications.enabled {
                self.notifier.notify_timer_finished(now);
                self.notifier.notify_cigarette_allowed();
            }
            events.push(Event::IntervalElapsed { at: self.at() });
        }

        let threshold = i64::from(self.settings.suggestion.threshold_min) * interval::MINUTE_MS;
        if after <= -threshold && before > -threshold && !self.overrun_notified {
            self.overrun_notified = true;
            if self.settings.notifications.enabled {
                self.notifier.notify_overrun_threshold_crossed();
            }
            events.push(Event::OverrunThresholdCrossed {
                overrun_ms: -after,
                at: self.at(),
            });
        }

        Ok(events)
    }

    /// A cigarette was just smoked: fold it into today's report,
    /// recompute the interval, and restart the countdown.
    pub fn record_cigarette_smoked(&mut self) -> Result<Vec<Event>, CoreError> {
        let mut events = Vec::new();
        if let Some(event) = self.rollover_if_due()? {
            events.push(event);
        }

        let now = self.clock.now_ms();
        let remaining = self.remaining_ms();
        let full = interval::compute_interval(&self.settings);
        // Time actually waited this interval; exceeds `full` on overrun.
        let waited = (full - remaining).max(0);
        let overrun = (-remaining).max(0);

        let suggested = self.settings.suggestion.enabled && self.bump_suggestion_streak(waited);

        self.state = TimerState {
            interval_ms: full,
            cigarette_count: self.state.cigarette_count + 1,
            overrun_count: self.state.overrun_count + u32::from(overrun > 0),
            last_update_epoch_ms: now,
        };
        self.store.save_state(&self.state)?;
        self.store.save_last_cigarette_time(now)?;
        self.update_today_report(now, waited, overrun)?;

        self.elapsed_notified = false;
        self.overrun_notified = false;

        events.push(Event::CigaretteRecorded {
            count: self.state.cigarette_count,
            waited_ms: waited,
            interval_ms: full,
            next_allowed_at_ms: now + full,
            at: self.at(),
        });
        if suggested {
            events.push(Event::GoalAdjustSuggested {
                streak: self.settings.suggestion.streak,
                at: self.at(),
            });
        }
        Ok(events)
    }

    /// Undo the last "smoked" event. There is no undo history: the
    /// countdown recomputes from the decremented count and re-anchors
    /// at now. A count of zero is a no-op.
    pub fn record_cancel_last_cigarette(&mut self) -> Result<Option<Event>, CoreError> {
        if self.state.cigarette_count == 0 {
            return Ok(None);
        }
        let now = self.clock.now_ms();
        let count = self.state.cigarette_count - 1;
        self.state = TimerState {
            interval_ms: interval::compute_interval(&self.settings),
            cigarette_count: count,
            overrun_count: self.state.overrun_count,
            last_update_epoch_ms: now,
        };
        self.store.save_state(&self.state)?;

        // Today's report follows the count; recorded averages stand.
        let today = self.clock.date_of(now);
        let reports = self.store.load_reports()?;
        if let Some(prev) = reports
            .iter()
            .find(|r| r.date == today && r.kind == ReportKind::Daily)
        {
            let mut updated = prev.clone();
            updated.cigarettes_smoked = count;
            updated.money_saved_cents = money_saved_cents(&self.settings, count);
            self.store.save_report(&updated)?;
        }

        self.elapsed_notified = false;
        self.overrun_notified = false;
        Ok(Some(Event::CigaretteCancelled {
            count,
            at: self.at(),
        }))
    }

    /// Persist new settings and re-anchor the countdown to the freshly
    /// computed interval.
    pub fn save_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        self.store.save_settings(&settings)?;
        self.settings = settings;
        self.state.interval_ms = interval::compute_interval(&self.settings);
        self.state.last_update_epoch_ms = self.clock.now_ms();
        self.store.save_state(&self.state)?;
        self.suggestion_streak = 0;
        self.elapsed_notified = false;
        self.overrun_notified = false;
        Ok(())
    }

    /// Re-read settings and state from the store (another process may
    /// have written since this engine loaded them).
    pub fn refresh(&mut self) -> Result<(), CoreError> {
        self.settings = self.store.load_settings()?;
        if let Some(state) = self.store.load_state()? {
            self.state = state;
        }
        self.rollover_if_due()?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rollover_if_due(&mut self) -> Result<Option<Event>, CoreError> {
        let today = self.clock.today();
        let last_seen = self.clock.date_of(self.state.last_update_epoch_ms);
        if last_seen < today {
            return self.roll_day(last_seen).map(Some);
        }
        Ok(None)
    }

    /// Archive the outgoing date and start a fresh day. Safe to apply
    /// more than once for the same date: the archive is an upsert that
    /// keeps an existing record, and the seed is guarded.
    fn roll_day(&mut self, outgoing: NaiveDate) -> Result<Event, CoreError> {
        let now = self.clock.now_ms();
        let reports = self.store.load_reports()?;

        let already_archived = reports
            .iter()
            .any(|r| r.date == outgoing && r.kind == ReportKind::Daily);
        if !already_archived {
            // No report was written during the outgoing day; synthesize
            // one from the countdown state.
            self.store.save_report(&DailyReport {
                date: outgoing,
                cigarettes_smoked: self.state.cigarette_count,
                avg_interval_ms: interval::compute_interval(&self.settings),
                avg_time_exceeded_ms: 0,
                money_saved_cents: money_saved_cents(&self.settings, self.state.cigarette_count),
                kind: ReportKind::Daily,
            })?;
        }

        self.state = TimerState {
            interval_ms: interval::compute_interval(&self.settings),
            cigarette_count: 0,
            overrun_count: 0,
            last_update_epoch_ms: now,
        };
        self.store.save_state(&self.state)?;
        self.store.save_last_cigarette_time(now)?;

        // Seed an empty report for the new day unless real data exists
        // (guards the race between the independent reset triggers).
        let today = self.clock.date_of(now);
        let has_data = reports
            .iter()
            .any(|r| r.date == today && r.kind == ReportKind::Daily && !r.is_empty());
        if !has_data {
            self.store
                .save_report(&DailyReport::empty(today, ReportKind::Daily))?;
        }

        self.suggestion_streak = 0;
        self.elapsed_notified = false;
        self.overrun_notified = false;
        if self.settings.notifications.enabled {
            self.notifier.notify_daily_reset();
        }
        Ok(Event::DailyReset {
            archived_date: outgoing,
            at: self.at(),
        })
    }

    /// In quota mode only the in-window portion of a delta counts.
    fn effective_elapsed(&self, delta_ms: i64) -> i64 {
        match self.settings.mode {
            Mode::Spacing => delta_ms,
            Mode::Quota => interval::in_window_elapsed_ms(
                self.settings.quota.window_start_min,
                self.settings.quota.window_end_min,
                self.clock.ms_of_day(self.state.last_update_epoch_ms),
                delta_ms,
            ),
        }
    }

    /// Returns true when the streak just completed (one-shot, then the
    /// run restarts from zero).
    fn bump_suggestion_streak(&mut self, waited_ms: i64) -> bool {
        let threshold = i64::from(self.settings.suggestion.threshold_min) * interval::MINUTE_MS;
        if waited_ms < threshold {
            self.suggestion_streak = 0;
            return false;
        }
        self.suggestion_streak += 1;
        if self.suggestion_streak >= self.settings.suggestion.streak.max(1) {
            self.suggestion_streak = 0;
            return true;
        }
        false
    }

    /// Upsert today's daily report with the latest rolling figures.
    /// Called after the state was updated for the new cigarette.
    fn update_today_report(&self, now: i64, waited: i64, overrun: i64) -> Result<(), CoreError> {
        let today = self.clock.date_of(now);
        let reports = self.store.load_reports()?;
        let prev = reports
            .iter()
            .find(|r| r.date == today && r.kind == ReportKind::Daily);

        let count = self.state.cigarette_count;
        let prev_avg_interval = prev.map(|r| r.avg_interval_ms).unwrap_or(0);
        let avg_interval = if count <= 1 {
            waited
        } else {
            (prev_avg_interval * i64::from(count - 1) + waited) / i64::from(count)
        };

        // The overrun average only moves when this smoke overran.
        let prev_avg_exceeded = prev.map(|r| r.avg_time_exceeded_ms).unwrap_or(0);
        let avg_exceeded = if overrun > 0 {
            let n = i64::from(self.state.overrun_count.max(1));
            (prev_avg_exceeded * (n - 1) + overrun) / n
        } else {
            prev_avg_exceeded
        };

        self.store.save_report(&DailyReport {
            date: today,
            cigarettes_smoked: count,
            avg_interval_ms: avg_interval,
            avg_time_exceeded_ms: avg_exceeded,
            money_saved_cents: money_saved_cents(&self.settings, count),
            kind: ReportKind::Daily,
        })
    }

    fn at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_default()
    }
}

/// Savings against the usual daily consumption, in cents. Never
/// negative: smoking more than usual saves nothing, it doesn't owe.
fn money_saved_cents(settings: &Settings, smoked: u32) -> i64 {
    let avoided = i64::from(settings.pack.usual_daily_cigarettes) - i64::from(smoked);
    avoided.max(0) * settings.per_cigarette_cents()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::NoopNotifier;
    use crate::settings::Mode;
    use crate::storage::Database;

    // 2024-01-02 08:00:00 UTC -- mid-morning, inside the default window.
    const T0: i64 = 1_704_182_400_000;
    const HOUR: i64 = 3_600_000;

    #[derive(Default, Clone)]
    struct RecordingNotifier(Rc<RefCell<Vec<&'static str>>>);

    impl Notifier for RecordingNotifier {
        fn notify_cigarette_allowed(&self) {
            self.0.borrow_mut().push("allowed");
        }
        fn notify_timer_finished(&self, _at: i64) {
            self.0.borrow_mut().push("finished");
        }
        fn notify_daily_reset(&self) {
            self.0.borrow_mut().push("reset");
        }
        fn notify_overrun_threshold_crossed(&self) {
            self.0.borrow_mut().push("overrun");
        }
    }

    fn spacing_settings(hours: u32) -> Settings {
        let mut settings = Settings::default();
        settings.mode = Mode::Spacing;
        settings.spacing.hours = hours;
        settings.spacing.minutes = 0;
        settings
    }

    fn engine_with(
        settings: Settings,
        clock: ManualClock,
    ) -> CountdownEngine<Database, ManualClock, NoopNotifier> {
        let db = Database::open_memory().unwrap();
        db.save_settings(&settings).unwrap();
        CountdownEngine::bootstrap(db, clock, NoopNotifier).unwrap()
    }

    #[test]
    fn spacing_countdown_runs_to_overrun() {
        let clock = ManualClock::new(T0);
        let mut engine = engine_with(spacing_settings(1), clock.clone());

        let events = engine.record_cigarette_smoked().unwrap();
        assert!(matches!(events[0], Event::CigaretteRecorded { .. }));
        assert_eq!(engine.remaining_ms(), HOUR);

        clock.advance(HOUR);
        let events = engine.tick().unwrap();
        assert_eq!(engine.remaining_ms(), 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::IntervalElapsed { .. })));

        clock.advance(1);
        engine.tick().unwrap();
        assert_eq!(engine.remaining_ms(), -1);
    }

    #[test]
    fn interval_elapsed_fires_once() {
        let clock = ManualClock::new(T0);
        let notifier = RecordingNotifier::default();
        let db = Database::open_memory().unwrap();
        db.save_settings(&spacing_settings(1)).unwrap();
        let mut engine = CountdownEngine::bootstrap(db, clock.clone(), notifier.clone()).unwrap();

        engine.record_cigarette_smoked().unwrap();
        clock.advance(HOUR + 1);
        engine.tick().unwrap();
        clock.advance(1_000);
        let events = engine.tick().unwrap();
        assert!(events.is_empty());
        assert_eq!(
            notifier
                .0
                .borrow()
                .iter()
                .filter(|n| **n == "finished")
                .count(),
            1
        );
    }

    #[test]
    fn remaining_survives_reload() {
        let clock = ManualClock::new(T0);
        let db = Database::open_memory().unwrap();
        db.save_settings(&spacing_settings(1)).unwrap();
        let mut engine = CountdownEngine::bootstrap(db, clock.clone(), NoopNotifier).unwrap();

        engine.record_cigarette_smoked().unwrap();
        clock.advance(10 * 60_000);
        engine.tick().unwrap();
        let before = engine.remaining_ms();

        // Same backing state, new engine: the anchor reconstructs the
        // same remaining time.
        let state = engine.state();
        assert_eq!(state.remaining_ms(clock.now_ms()), before);
        assert_eq!(before, 50 * 60_000);
    }

    #[test]
    fn cancel_floors_at_zero_and_decrements() {
        let clock = ManualClock::new(T0);
        let mut engine = engine_with(spacing_settings(1), clock.clone());

        assert!(engine.record_cancel_last_cigarette().unwrap().is_none());

        engine.record_cigarette_smoked().unwrap();
        engine.record_cigarette_smoked().unwrap();
        assert_eq!(engine.cigarette_count(), 2);

        let event = engine.record_cancel_last_cigarette().unwrap().unwrap();
        assert!(matches!(event, Event::CigaretteCancelled { count: 1, .. }));
        assert_eq!(engine.cigarette_count(), 1);
        assert_eq!(engine.remaining_ms(), HOUR);
    }

    #[test]
    fn day_rollover_archives_and_reseeds() {
        let clock = ManualClock::new(T0);
        let mut engine = engine_with(spacing_settings(1), clock.clone());

        engine.record_cigarette_smoked().unwrap();
        engine.record_cigarette_smoked().unwrap();

        // Cross local midnight (T0 is 08:00, so 16h+ rolls the date).
        clock.advance(17 * HOUR);
        let events = engine.tick().unwrap();
        assert!(matches!(events[0], Event::DailyReset { .. }));
        assert_eq!(engine.cigarette_count(), 0);

        let reports = engine.store.load_reports().unwrap();
        let yesterday: NaiveDate = "2024-01-02".parse().unwrap();
        let today: NaiveDate = "2024-01-03".parse().unwrap();
        let archived = reports.iter().find(|r| r.date == yesterday).unwrap();
        assert_eq!(archived.cigarettes_smoked, 2);
        let seeded = reports.iter().find(|r| r.date == today).unwrap();
        assert!(seeded.is_empty());
    }

    #[test]
    fn rollover_applies_once_across_restarts() {
        let clock = ManualClock::new(T0);
        let db = Database::open_memory().unwrap();
        db.save_settings(&spacing_settings(1)).unwrap();
        let mut engine = CountdownEngine::bootstrap(db, clock.clone(), NoopNotifier).unwrap();

        engine.record_cigarette_smoked().unwrap();
        clock.advance(20 * HOUR);
        engine.tick().unwrap();
        let history_after_first = {
            let mut reports = engine.store.load_reports().unwrap();
            reports.sort_by_key(|r| r.date);
            reports
        };

        // Restart on the same backing store: trigger (c) must not
        // archive a second record or disturb the seeded day.
        let CountdownEngine { store, .. } = engine;
        let engine2 = CountdownEngine::bootstrap(store, clock.clone(), NoopNotifier).unwrap();
        let mut history_after_second = engine2.store.load_reports().unwrap();
        history_after_second.sort_by_key(|r| r.date);
        assert_eq!(history_after_first, history_after_second);
        assert_eq!(engine2.cigarette_count(), 0);
    }

    #[test]
    fn restart_after_midnight_triggers_rollover() {
        let clock = ManualClock::new(T0);
        let db = Database::open_memory().unwrap();
        db.save_settings(&spacing_settings(1)).unwrap();
        let mut engine = CountdownEngine::bootstrap(db, clock.clone(), NoopNotifier).unwrap();
        engine.record_cigarette_smoked().unwrap();

        // Kill the process, come back tomorrow.
        let CountdownEngine { store, .. } = engine;
        clock.advance(24 * HOUR);
        let engine2 = CountdownEngine::bootstrap(store, clock.clone(), NoopNotifier).unwrap();

        assert_eq!(engine2.cigarette_count(), 0);
        let reports = engine2.store.load_reports().unwrap();
        let yesterday: NaiveDate = "2024-01-02".parse().unwrap();
        assert!(reports
            .iter()
            .any(|r| r.date == yesterday && r.cigarettes_smoked == 1));
    }

    #[test]
    fn overrun_average_accumulates_only_on_overrun() {
        let clock = ManualClock::new(T0);
        let mut engine = engine_with(spacing_settings(1), clock.clone());

        engine.record_cigarette_smoked().unwrap();
        // 12 min over the hour.
        clock.advance(HOUR + 12 * 60_000);
        engine.record_cigarette_smoked().unwrap();
        // 6 min over.
        clock.advance(HOUR + 6 * 60_000);
        engine.record_cigarette_smoked().unwrap();
        // Under the interval: average must not move.
        clock.advance(30 * 60_000);
        engine.record_cigarette_smoked().unwrap();

        let reports = engine.store.load_reports().unwrap();
        let today = reports
            .iter()
            .find(|r| r.kind == ReportKind::Daily && r.cigarettes_smoked == 4)
            .unwrap();
        assert_eq!(today.avg_time_exceeded_ms, 9 * 60_000);
        assert_eq!(engine.state().overrun_count, 2);
    }

    #[test]
    fn suggestion_fires_after_consecutive_long_waits() {
        let clock = ManualClock::new(T0);
        let mut settings = spacing_settings(1);
        settings.suggestion.threshold_min = 15;
        settings.suggestion.streak = 3;
        let mut engine = engine_with(settings, clock.clone());

        let mut suggestions = 0;
        for _ in 0..3 {
            clock.advance(20 * 60_000);
            let events = engine.record_cigarette_smoked().unwrap();
            suggestions += events
                .iter()
                .filter(|e| matches!(e, Event::GoalAdjustSuggested { .. }))
                .count();
        }
        assert_eq!(suggestions, 1);

        // A short wait breaks the run.
        clock.advance(60_000);
        engine.record_cigarette_smoked().unwrap();
        clock.advance(20 * 60_000);
        let events = engine.record_cigarette_smoked().unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::GoalAdjustSuggested { .. })));
    }

    #[test]
    fn quota_gate_suspends_outside_window() {
        let clock = ManualClock::new(T0); // 08:00
        let mut settings = Settings::default();
        settings.mode = Mode::Quota;
        settings.quota.daily_quota = 16;
        settings.quota.window_start_min = 7 * 60;
        settings.quota.window_end_min = 9 * 60;
        // Window 07:00-09:00, quota 16 -> 7.5 min interval.
        let mut engine = engine_with(settings, clock.clone());

        engine.record_cigarette_smoked().unwrap();
        let full = engine.remaining_ms();
        assert_eq!(full, 450_000);

        // 30 min elapse, but only until 09:00 counts.
        clock.advance(90 * 60_000);
        engine.tick().unwrap();
        assert_eq!(engine.remaining_ms(), full - HOUR);

        // Deep outside the window nothing drains.
        clock.advance(HOUR);
        let events = engine.tick().unwrap();
        assert!(events.is_empty());
        assert_eq!(engine.remaining_ms(), full - HOUR);
        match engine.snapshot() {
            Event::StateSnapshot { window_open, .. } => assert!(!window_open),
            _ => panic!("expected StateSnapshot"),
        }
    }

    #[test]
    fn backwards_clock_does_not_drain() {
        let clock = ManualClock::new(T0);
        let mut engine = engine_with(spacing_settings(1), clock.clone());
        engine.record_cigarette_smoked().unwrap();

        clock.set(T0 - 10_000);
        engine.tick().unwrap();
        assert_eq!(engine.remaining_ms(), HOUR);
    }

    #[test]
    fn money_saved_tracks_count() {
        let clock = ManualClock::new(T0);
        // Defaults: 10 EUR / 20 per pack -> 50 cents each, usual 30/day.
        let mut engine = engine_with(spacing_settings(1), clock.clone());
        engine.record_cigarette_smoked().unwrap();

        let reports = engine.store.load_reports().unwrap();
        let today = reports.iter().find(|r| r.cigarettes_smoked == 1).unwrap();
        assert_eq!(today.money_saved_cents, 29 * 50);

        match engine.snapshot() {
            Event::StateSnapshot {
                money_saved_cents, ..
            } => assert_eq!(money_saved_cents, 29 * 50),
            _ => panic!("expected StateSnapshot"),
        }
    }

    #[test]
    fn save_settings_reanchors_countdown() {
        let clock = ManualClock::new(T0);
        let mut engine = engine_with(spacing_settings(1), clock.clone());
        engine.record_cigarette_smoked().unwrap();
        clock.advance(30 * 60_000);
        engine.tick().unwrap();

        engine.save_settings(spacing_settings(2)).unwrap();
        assert_eq!(engine.remaining_ms(), 2 * HOUR);
        assert_eq!(engine.settings().spacing.hours, 2);
    }

    #[test]
    fn overrun_tick_crosses_threshold_once() {
        let clock = ManualClock::new(T0);
        let notifier = RecordingNotifier::default();
        let db = Database::open_memory().unwrap();
        let mut settings = spacing_settings(1);
        settings.suggestion.threshold_min = 15;
        db.save_settings(&settings).unwrap();
        let mut engine = CountdownEngine::bootstrap(db, clock.clone(), notifier.clone()).unwrap();

        engine.record_cigarette_smoked().unwrap();
        clock.advance(HOUR + 16 * 60_000);
        let events = engine.tick().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::OverrunThresholdCrossed { .. })));

        clock.advance(60_000);
        let events = engine.tick().unwrap();
        assert!(events.is_empty());
        assert_eq!(
            notifier
                .0
                .borrow()
                .iter()
                .filter(|n| **n == "overrun")
                .count(),
            1
        );
    }
}
