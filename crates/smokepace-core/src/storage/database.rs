//! SQLite + TOML-backed implementation of the [`Store`] trait.
//!
//! Countdown state, history, and timestamps live in a single `kv`
//! table in `<data_dir>/smokepace.db`; settings live in
//! `<data_dir>/settings.toml` next to it. Malformed persisted values
//! load as documented defaults -- the read path never fails on corrupt
//! data, only on an unreachable database.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use super::{data_dir, Store};
use crate::error::{ConfigError, CoreError, StorageError};
use crate::report::{self, DailyReport};
use crate::settings::Settings;
use crate::state::TimerState;

mod keys {
    pub const STATE_INTERVAL: &str = "state_interval";
    pub const STATE_COUNT: &str = "state_count";
    pub const STATE_OVERRUNS: &str = "state_overruns";
    pub const STATE_TIMESTAMP: &str = "state_timestamp";
    pub const LAST_CIG_TIME: &str = "last_cigarette_time";
    pub const DAILY_REPORTS: &str = "daily_reports";
}

/// SQLite database plus the TOML settings file.
pub struct Database {
    conn: Connection,
    settings_path: PathBuf,
    #[cfg(test)]
    _tmp: Option<tempfile::TempDir>,
}

impl Database {
    /// Open the database at `<data_dir>/smokepace.db`, creating the
    /// file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let dir = data_dir()?;
        let path = dir.join("smokepace.db");
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self {
            conn,
            settings_path: dir.join("settings.toml"),
            #[cfg(test)]
            _tmp: None,
        };
        db.migrate()?;
        Ok(db)
    }

    /// In-memory database with a temp settings path (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let tmp = tempfile::tempdir()?;
        let db = Self {
            conn,
            settings_path: tmp.path().join("settings.toml"),
            _tmp: Some(tmp),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Numeric kv read; a malformed stored value reads as absent.
    fn kv_i64(&self, key: &str) -> Result<Option<i64>, StorageError> {
        Ok(self.kv_get(key)?.and_then(|v| v.parse().ok()))
    }
}

impl Store for Database {
    fn load_settings(&self) -> Result<Settings, CoreError> {
        match std::fs::read_to_string(&self.settings_path) {
            // A file that no longer parses yields defaults; serde fills
            // any missing field from its default already.
            Ok(content) => Ok(toml::from_str(&content).unwrap_or_default()),
            Err(_) => Ok(Settings::default()),
        }
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(settings).map_err(|e| ConfigError::SaveFailed {
            path: self.settings_path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.settings_path, content).map_err(|e| ConfigError::SaveFailed {
            path: self.settings_path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn load_state(&self) -> Result<Option<TimerState>, CoreError> {
        let interval = self.kv_i64(keys::STATE_INTERVAL)?;
        let count = self.kv_i64(keys::STATE_COUNT)?;
        let overruns = self.kv_i64(keys::STATE_OVERRUNS)?;
        let timestamp = self.kv_i64(keys::STATE_TIMESTAMP)?;

        if interval.is_none() && count.is_none() && timestamp.is_none() {
            return Ok(None);
        }
        let clamp_u32 = |v: i64| v.clamp(0, i64::from(u32::MAX)) as u32;
        Ok(Some(TimerState {
            interval_ms: interval.unwrap_or(0),
            cigarette_count: clamp_u32(count.unwrap_or(0)),
            overrun_count: clamp_u32(overruns.unwrap_or(0)),
            last_update_epoch_ms: timestamp.unwrap_or(0),
        }))
    }

    fn save_state(&self, state: &TimerState) -> Result<(), CoreError> {
        self.kv_set(keys::STATE_INTERVAL, &state.interval_ms.to_string())?;
        self.kv_set(keys::STATE_COUNT, &state.cigarette_count.to_string())?;
        self.kv_set(keys::STATE_OVERRUNS, &state.overrun_count.to_string())?;
        self.kv_set(
            keys::STATE_TIMESTAMP,
            &state.last_update_epoch_ms.to_string(),
        )?;
        Ok(())
    }

    fn load_reports(&self) -> Result<Vec<DailyReport>, CoreError> {
        match self.kv_get(keys::DAILY_REPORTS)? {
            Some(raw) => Ok(report::deserialize_reports(&raw)),
            None => Ok(Vec::new()),
        }
    }

    fn save_report(&self, new: &DailyReport) -> Result<(), CoreError> {
        let mut reports = self.load_reports()?;
        reports.retain(|r| !(r.date == new.date && r.kind == new.kind));
        reports.push(new.clone());
        self.kv_set(keys::DAILY_REPORTS, &report::serialize_reports(&reports))?;
        Ok(())
    }

    fn load_last_cigarette_time(&self) -> Result<Option<i64>, CoreError> {
        Ok(self.kv_i64(keys::LAST_CIG_TIME)?)
    }

    fn save_last_cigarette_time(&self, epoch_ms: i64) -> Result<(), CoreError> {
        self.kv_set(keys::LAST_CIG_TIME, &epoch_ms.to_string())?;
        Ok(())
    }
}
