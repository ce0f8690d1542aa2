//! Persistence layer.
//!
//! One [`Store`] trait fronts every durable concern -- settings, timer
//! state, history, last-cigarette stamp -- with a distinct key
//! namespace per concern, so callers never depend on which physical
//! backend holds a field.

pub mod database;
mod store;

pub use database::Database;
pub use store::Store;

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/smokepace[-dev]/` based on SMOKEPACE_ENV, or the
/// directory named by SMOKEPACE_DATA_DIR when set (tests point this at
/// a temp directory).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    if let Ok(dir) = std::env::var("SMOKEPACE_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SMOKEPACE_ENV").unwrap_or_else(|_| "production".to_string());
    let dir = if env == "dev" {
        base_dir.join("smokepace-dev")
    } else {
        base_dir.join("smokepace")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
