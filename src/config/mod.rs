use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::{
    currency::{CurrencyCode, LocaleConfig},
    errors::{PlanError, Result},
    storage::{
        json_backend::{tmp_path, write_atomic},
        paths::{ensure_dir, PathResolver},
        DEFAULT_PERIODS,
    },
};

/// User preferences that live outside any single profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub default_periods: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-CO".into(),
            currency: "COP".into(),
            default_periods: DEFAULT_PERIODS,
        }
    }
}

impl Config {
    /// Formatting settings derived from the locale and currency fields.
    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::for_tag(&self.locale, CurrencyCode::new(self.currency.clone()))
    }

    /// Updates one field from its textual form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "locale" => self.locale = value.trim().to_string(),
            "currency" => self.currency = value.trim().to_uppercase(),
            "default_periods" => {
                self.default_periods = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|periods| *periods > 0)
                    .ok_or_else(|| {
                        PlanError::InvalidInput(format!(
                            "default_periods must be a positive number, got `{value}`"
                        ))
                    })?;
            }
            other => {
                return Err(PlanError::InvalidInput(format!(
                    "unknown setting `{other}` (expected locale, currency or default_periods)"
                )))
            }
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Like [`ConfigManager::load`], but an unreadable file yields the defaults.
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable configuration, using defaults"
                );
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
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

    fn manager() -> (ConfigManager, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        (manager, temp)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let (manager, _guard) = manager();
        let config = manager.load().expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.locale_config().grouping_separator, '.');
    }

    #[test]
    fn save_and_load() {
        let (manager, _guard) = manager();
        let mut config = Config::default();
        config.set("default_periods", "24").expect("set periods");
        config.set("currency", "usd").expect("set currency");
        manager.save(&config).expect("save");
        let loaded = manager.load().expect("load");
        assert_eq!(loaded.default_periods, 24);
        assert_eq!(loaded.currency, "USD");
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_numbers() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("theme", "dark"),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(config.set("default_periods", "0").is_err());
        assert!(config.set("default_periods", "many").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn corrupt_file_is_a_storage_error_unless_defaults_are_requested() {
        let (manager, _guard) = manager();
        fs::write(manager.path(), "{not json").expect("write");
        assert!(matches!(manager.load(), Err(PlanError::Storage(_))));
        assert_eq!(manager.load_or_default(), Config::default());
    }
}
