use clap::Subcommand;
use serde::Serialize;
use smokepace_core::storage::{Database, Store};
use smokepace_core::{recent_overrun_average, CountdownEngine, NoopNotifier, SystemClock};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's progress snapshot
    Today,
    /// Rolling weekly / monthly overrun averages
    Averages,
}

#[derive(Debug, Serialize)]
struct Averages {
    weekly_overrun_ms: i64,
    monthly_overrun_ms: i64,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let engine = CountdownEngine::bootstrap(db, SystemClock, NoopNotifier)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        StatsAction::Averages => {
            let reports = db.load_reports()?;
            let averages = Averages {
                weekly_overrun_ms: recent_overrun_average(&reports, 7),
                monthly_overrun_ms: recent_overrun_average(&reports, 30),
            };
            println!("{}", serde_json::to_string_pretty(&averages)?);
        }
    }
    Ok(())
}
