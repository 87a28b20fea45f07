//! Application configuration loaded from JSON.
//!
//! # Invariants
//! - Every field has a default; an empty object is a valid config.
//! - A config returned by this module has non-empty keys and paths,
//!   positive intervals and a supported log level.

use crate::logging::normalize_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: &'static str },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid { field, reason } => write!(f, "config field `{field}` {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Key-value slot holding the serialized task list.
    pub storage_key: String,
    pub theme_key: String,
    pub welcomed_key: String,
    pub schedule_path: PathBuf,
    pub inventory_path: PathBuf,
    pub refresh_interval_secs: u64,
    pub reminder_interval_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: "proTaskManagerTasks".to_string(),
            theme_key: "proTaskManagerTheme".to_string(),
            welcomed_key: "proTaskManagerWelcomed".to_string(),
            schedule_path: PathBuf::from("data/schedule.json"),
            inventory_path: PathBuf::from("data/inventory.json"),
            refresh_interval_secs: 30,
            reminder_interval_secs: 60,
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("storage_key", &self.storage_key),
            ("theme_key", &self.theme_key),
            ("welcomed_key", &self.welcomed_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty",
                });
            }
        }
        for (field, path) in [
            ("schedule_path", &self.schedule_path),
            ("inventory_path", &self.inventory_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty",
                });
            }
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_secs",
                reason: "must be positive",
            });
        }
        if self.reminder_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "reminder_interval_secs",
                reason: "must be positive",
            });
        }
        if normalize_level(&self.log_level).is_err() {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: "must be one of trace|debug|info|warn|error",
            });
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::time::Duration;

    #[test]
    fn empty_object_yields_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage_key, "proTaskManagerTasks");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let raw = r#"{"schedule_path": "/srv/schedule.json", "log_level": "warn"}"#;
        let config = AppConfig::from_json_str(raw).unwrap();
        assert_eq!(config.schedule_path.to_str(), Some("/srv/schedule.json"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.theme_key, "proTaskManagerTheme");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_json_str(r#"{"storage_key": "  "}"#),
            Err(ConfigError::Invalid { field: "storage_key", .. })
        ));
        assert!(matches!(
            AppConfig::from_json_str(r#"{"reminder_interval_secs": 0}"#),
            Err(ConfigError::Invalid { field: "reminder_interval_secs", .. })
        ));
        assert!(matches!(
            AppConfig::from_json_str(r#"{"log_level": "chatty"}"#),
            Err(ConfigError::Invalid { field: "log_level", .. })
        ));
        assert!(matches!(
            AppConfig::from_json_str(r#"{"unknown": 1}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
