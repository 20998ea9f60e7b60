//! Configuration for the alert engine.
//!
//! Loaded from `~/.homewatch/config.yaml`. Every field has a default, so a
//! missing file or a partial file is valid:
//!
//! ```yaml
//! alerts:
//!   max_alarm_history: 50
//!   maintenance_interval_secs: 60
//!   run_maintenance_on_startup: true
//! console:
//!   auto_view_enabled: true
//!   auto_view_duration_secs: 30
//! notifications:
//!   enabled: true
//!   min_level: warning
//! security:
//!   level: low
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use homewatch_core::{AlarmLevel, HomewatchError, Result, SecurityLevel};

use crate::alert::DEFAULT_MAX_ALARM_LIST_SIZE;

/// Default maintenance interval in seconds.
pub const DEFAULT_MAINTENANCE_INTERVAL_SECS: u64 = 60;

/// Default time the console holds an auto-view suggestion, in seconds.
pub const DEFAULT_AUTO_VIEW_DURATION_SECS: u64 = 30;

/// Config file path (typically ~/.homewatch/config.yaml).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".homewatch/config.yaml"))
}

/// Console auto-view settings the arbitration rule reads.
pub trait ViewSettings: Send + Sync {
    /// Whether alerts may switch the console view automatically.
    fn auto_view_enabled(&self) -> bool;

    /// How long an automatic view is held, in seconds.
    fn auto_view_duration_secs(&self) -> u64;
}

/// Top-level Homewatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomewatchConfig {
    #[serde(default)]
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl HomewatchConfig {
    /// Load from the default path, falling back to defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HomewatchError::config_read(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse and validate YAML content; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| HomewatchError::config_invalid(path, e.to_string()))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded homewatch config");
        Ok(config)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.alerts.max_alarm_history == 0 {
            return Err(HomewatchError::config_validation(
                "alerts.max_alarm_history must be >= 1",
            ));
        }
        if self.alerts.maintenance_interval_secs == 0 {
            return Err(HomewatchError::config_validation(
                "alerts.maintenance_interval_secs must be >= 1",
            ));
        }
        if self.console.auto_view_duration_secs == 0 {
            return Err(HomewatchError::config_validation(
                "console.auto_view_duration_secs must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Alert store and maintenance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Alarms retained per alert
    #[serde(default = "default_max_alarm_history")]
    pub max_alarm_history: usize,

    /// Seconds between maintenance sweeps
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval_secs: u64,

    /// Run one sweep as soon as the scheduler starts
    #[serde(default = "default_true")]
    pub run_maintenance_on_startup: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            max_alarm_history: default_max_alarm_history(),
            maintenance_interval_secs: default_maintenance_interval(),
            run_maintenance_on_startup: true,
        }
    }
}

impl AlertsConfig {
    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }
}

/// Console auto-view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_true")]
    pub auto_view_enabled: bool,

    #[serde(default = "default_auto_view_duration")]
    pub auto_view_duration_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            auto_view_enabled: true,
            auto_view_duration_secs: default_auto_view_duration(),
        }
    }
}

impl ViewSettings for ConsoleConfig {
    fn auto_view_enabled(&self) -> bool {
        self.auto_view_enabled
    }

    fn auto_view_duration_secs(&self) -> u64 {
        self.auto_view_duration_secs
    }
}

/// Notification hand-off settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lowest alarm level that is handed to the notification sender
    #[serde(default = "default_min_level")]
    pub min_level: AlarmLevel,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_level: default_min_level(),
        }
    }
}

/// Static home security level, used when no live provider is wired in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub level: SecurityLevel,
}

fn default_max_alarm_history() -> usize {
    DEFAULT_MAX_ALARM_LIST_SIZE
}

fn default_maintenance_interval() -> u64 {
    DEFAULT_MAINTENANCE_INTERVAL_SECS
}

fn default_auto_view_duration() -> u64 {
    DEFAULT_AUTO_VIEW_DURATION_SECS
}

fn default_min_level() -> AlarmLevel {
    AlarmLevel::Warning
}

fn default_true() -> bool {
    true
}
