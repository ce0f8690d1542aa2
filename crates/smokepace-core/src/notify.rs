//! Outbound notification port.
//!
//! Delivery (system tray, mobile push, whatever shell hosts the core)
//! is not this crate's concern; the engine only fires these hooks.
//! Fire-and-forget: no return values and no retry contract.

pub trait Notifier {
    fn notify_cigarette_allowed(&self) {}
    fn notify_timer_finished(&self, _at_epoch_ms: i64) {}
    fn notify_daily_reset(&self) {}
    fn notify_overrun_threshold_crossed(&self) {}
}

/// Discards every notification. One-shot commands and tests use this.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}
