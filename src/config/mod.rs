use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::{
    core::{
        budget_monitor::{BudgetMonitor, DEFAULT_ALERT_THRESHOLD, DEFAULT_CURRENCY_SYMBOL},
        utils::{ensure_dir, write_atomic, PathResolver},
    },
    errors::LedgerError,
};

const DEFAULT_RECENT_WINDOW_DAYS: i64 = 30;
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

/// User preferences. Missing fields in a stored file fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub currency_symbol: String,
    pub default_alert_threshold: f64,
    pub recent_window_days: i64,
    /// Destination for budget alert delivery; delivery is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-IN".into(),
            currency: "INR".into(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.into(),
            default_alert_threshold: DEFAULT_ALERT_THRESHOLD,
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
            alert_email: None,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn budget_monitor(&self) -> BudgetMonitor {
        BudgetMonitor::new(self.default_alert_threshold, self.currency_symbol.clone())
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let mut config: Config = serde_json::from_str(&data)?;
            if !(0..=MAX_RECENT_WINDOW_DAYS).contains(&config.recent_window_days) {
                warn!(
                    value = config.recent_window_days,
                    "recent_window_days out of range, using the default"
                );
                config.recent_window_days = DEFAULT_RECENT_WINDOW_DAYS;
            }
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.default_alert_threshold, 80.0);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"alert_email":"me@example.com","recent_window_days":7}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.alert_email.as_deref(), Some("me@example.com"));
        assert_eq!(config.recent_window_days, 7);
        assert_eq!(config.currency, "INR");
    }

    #[test]
    fn out_of_range_recent_window_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        for value in [i64::MAX, 9_223_372_036_854_775, -3, MAX_RECENT_WINDOW_DAYS + 1] {
            fs::write(manager.path(), format!(r#"{{"recent_window_days":{value}}}"#)).unwrap();
            assert_eq!(manager.load().unwrap().recent_window_days, 30, "{value}");
        }
        fs::write(manager.path(), r#"{"recent_window_days":36500}"#).unwrap();
        assert_eq!(manager.load().unwrap().recent_window_days, MAX_RECENT_WINDOW_DAYS);
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            currency_symbol: "$".into(),
            default_alert_threshold: 75.0,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(config.format_amount(12.5), "$12.50");
    }
}
