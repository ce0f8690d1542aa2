//! User settings.
//!
//! Stores the reduction goal and bookkeeping baselines:
//! - Pack price and size, usual daily consumption (savings estimate)
//! - Reduction mode (daily quota vs. fixed spacing) and its parameters
//! - Goal-adjustment suggestion policy
//! - Notification toggle
//!
//! Persisted as TOML at `<data_dir>/settings.toml` behind the `Store`
//! trait. Every field carries a serde default, so a file written by an
//! older build (or missing entirely) loads without manual migration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reduction mode: a fixed number of cigarettes spread over a daily
/// active window, or a fixed minimum delay between two cigarettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Quota,
    Spacing,
}

/// Pack economics used for the savings estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    #[serde(default = "default_pack_price")]
    pub price_euros: f64,
    #[serde(default = "default_per_pack")]
    pub cigarettes_per_pack: u32,
    /// Baseline daily consumption before the reduction effort.
    #[serde(default = "default_usual_daily")]
    pub usual_daily_cigarettes: u32,
}

/// Quota-mode parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_daily_quota")]
    pub daily_quota: u32,
    /// Active window bounds in minutes since local midnight.
    /// The window wraps past midnight when end <= start.
    #[serde(default = "default_window_start")]
    pub window_start_min: u32,
    #[serde(default = "default_window_end")]
    pub window_end_min: u32,
}

/// Spacing-mode parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingConfig {
    #[serde(default = "default_spacing_hours")]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
}

/// Policy for the "adjust your goal" suggestion: a run of `streak`
/// consecutive waits of at least `threshold_min` minutes raises a
/// one-shot suggestion event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_suggestion_threshold")]
    pub threshold_min: u32,
    #[serde(default = "default_suggestion_streak")]
    pub streak: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// User settings.
///
/// Serialized to/from TOML at `<data_dir>/settings.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub pack: PackConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub spacing: SpacingConfig,
    #[serde(default)]
    pub suggestion: SuggestionConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_mode() -> Mode {
    Mode::Quota
}
fn default_pack_price() -> f64 {
    10.0
}
fn default_per_pack() -> u32 {
    20
}
fn default_usual_daily() -> u32 {
    30
}
fn default_daily_quota() -> u32 {
    20
}
fn default_window_start() -> u32 {
    7 * 60
}
fn default_window_end() -> u32 {
    23 * 60
}
fn default_spacing_hours() -> u32 {
    1
}
fn default_suggestion_threshold() -> u32 {
    15
}
fn default_suggestion_streak() -> u32 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            price_euros: default_pack_price(),
            cigarettes_per_pack: default_per_pack(),
            usual_daily_cigarettes: default_usual_daily(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_quota: default_daily_quota(),
            window_start_min: default_window_start(),
            window_end_min: default_window_end(),
        }
    }
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            hours: default_spacing_hours(),
            minutes: 0,
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_min: default_suggestion_threshold(),
            streak: default_suggestion_streak(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            pack: PackConfig::default(),
            quota: QuotaConfig::default(),
            spacing: SpacingConfig::default(),
            suggestion: SuggestionConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Settings {
    /// Price of one cigarette in cents. Pack size is clamped to 1, so a
    /// zero-size pack never divides by zero.
    pub fn per_cigarette_cents(&self) -> i64 {
        let pack_cents = (self.pack.price_euros.max(0.0) * 100.0).round() as i64;
        pack_cents / i64::from(self.pack.cigarettes_per_pack.max(1))
    }

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be
    /// parsed as the existing field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }

    Err(ConfigError::UnknownKey(key.to_string()))
}
