//! Foreground countdown loop.
//!
//! Hosts the engine's once-per-second tick and streams events as JSON
//! lines. Midnight rollover is detected by the tick itself, so this
//! loop doubles as the daily-reset alarm.

use std::time::Duration;

use smokepace_core::storage::Database;
use smokepace_core::{CountdownEngine, NoopNotifier, SystemClock};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop())
}

async fn watch_loop() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = CountdownEngine::bootstrap(db, SystemClock, NoopNotifier)?;
    println!("{}", serde_json::to_string(&engine.snapshot())?);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for event in engine.tick()? {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", serde_json::to_string(&engine.snapshot())?);
                return Ok(());
            }
        }
    }
}
