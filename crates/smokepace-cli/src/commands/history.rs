use clap::Subcommand;
use smokepace_core::stats::{aggregate, Period};
use smokepace_core::storage::{Database, Store};
use smokepace_core::ReportKind;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Archived daily reports, most recent first
    Daily,
    /// Weekly aggregates derived from the daily history
    Weekly,
    /// Monthly aggregates derived from the daily history
    Monthly,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let reports = db.load_reports()?;

    let out = match action {
        HistoryAction::Daily => {
            let mut daily: Vec<_> = reports
                .into_iter()
                .filter(|r| r.kind == ReportKind::Daily)
                .collect();
            daily.sort_by(|a, b| b.date.cmp(&a.date));
            daily
        }
        HistoryAction::Weekly => aggregate(&reports, Period::Weekly),
        HistoryAction::Monthly => aggregate(&reports, Period::Monthly),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
