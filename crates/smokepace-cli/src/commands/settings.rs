use clap::Subcommand;
use smokepace_core::storage::{Database, Store};
use smokepace_core::{CountdownEngine, NoopNotifier, Settings, SystemClock};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "mode", "spacing.hours", "quota.daily_quota")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings as JSON
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SettingsAction::Get { key } => {
            let settings = db.load_settings()?;
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        SettingsAction::Set { key, value } => {
            let mut settings = db.load_settings()?;
            settings.set(&key, &value)?;
            // Through the engine, so the countdown re-anchors to the
            // freshly computed interval.
            let mut engine = CountdownEngine::bootstrap(db, SystemClock, NoopNotifier)?;
            engine.save_settings(settings)?;
            println!("ok");
        }
        SettingsAction::List => {
            let settings = db.load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Reset => {
            let mut engine = CountdownEngine::bootstrap(db, SystemClock, NoopNotifier)?;
            engine.save_settings(Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
