//! The consolidated persistence seam.

use crate::error::CoreError;
use crate::report::DailyReport;
use crate::settings::Settings;
use crate::state::TimerState;

/// Durable storage for settings, countdown state, and history.
///
/// The engine is the single writer; every mutation goes through one
/// store instance and completes before the next tick or command runs,
/// so concurrent read-modify-write interleavings cannot occur. A failed
/// write surfaces as an error and the caller's in-memory state stays
/// authoritative until the next successful write.
pub trait Store {
    /// Load settings, or defaults when nothing was saved yet.
    fn load_settings(&self) -> Result<Settings, CoreError>;
    fn save_settings(&self, settings: &Settings) -> Result<(), CoreError>;

    /// Load the countdown state; `None` on first launch.
    fn load_state(&self) -> Result<Option<TimerState>, CoreError>;
    fn save_state(&self, state: &TimerState) -> Result<(), CoreError>;

    fn load_reports(&self) -> Result<Vec<DailyReport>, CoreError>;
    /// Upsert keyed by (date, kind): at most one record per key.
    fn save_report(&self, report: &DailyReport) -> Result<(), CoreError>;

    fn load_last_cigarette_time(&self) -> Result<Option<i64>, CoreError>;
    fn save_last_cigarette_time(&self, epoch_ms: i64) -> Result<(), CoreError>;
}
