use clap::Subcommand;
use smokepace_core::storage::Database;
use smokepace_core::{CountdownEngine, NoopNotifier, SystemClock};

#[derive(Subcommand)]
pub enum TrackerAction {
    /// Record a cigarette as smoked
    Smoke,
    /// Cancel the last recorded cigarette
    Cancel,
    /// Print the current countdown state as JSON
    Status,
}

pub fn run(action: TrackerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = CountdownEngine::bootstrap(db, SystemClock, NoopNotifier)?;

    match action {
        TrackerAction::Smoke => {
            for event in engine.record_cigarette_smoked()? {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TrackerAction::Cancel => match engine.record_cancel_last_cigarette()? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{{\"type\": \"nothing_to_cancel\"}}"),
        },
        TrackerAction::Status => {
            // Tick first so the persisted anchor is current.
            let events = engine.tick()?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            for event in events {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
    }
    Ok(())
}
