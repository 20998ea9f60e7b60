//! Shared type definitions used across Homewatch crates.
//!
//! The classification enums here travel as strings through config files and
//! the JSON alarm feed. Each one has a single encoding table (`as_str`) that
//! backs `Display`, `FromStr` and serde, and unknown strings are rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HomewatchError;

/// Unique identifier for an alert.
pub type AlertId = String;

/// Subsystem that produced an alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmSource {
    /// Sensor or device event (motion, door open, ...)
    Event,
    /// Weather feed (storm warnings, alerts, ...)
    Weather,
}

impl AlarmSource {
    /// All variants, in encoding-table order.
    pub const ALL: [AlarmSource; 2] = [AlarmSource::Event, AlarmSource::Weather];

    /// Wire/config string for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Weather => "weather",
        }
    }
}

impl fmt::Display for AlarmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmSource {
    type Err = HomewatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| HomewatchError::unknown_variant("alarm source", s))
    }
}

/// Alarm severity level.
///
/// Ordered by severity, so `Critical > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmLevel {
    /// Informational
    Info,
    /// Needs attention
    Warning,
    /// Needs attention now
    Critical,
}

impl AlarmLevel {
    /// All variants, in encoding-table order.
    pub const ALL: [AlarmLevel; 3] = [AlarmLevel::Info, AlarmLevel::Warning, AlarmLevel::Critical];

    /// Numeric priority used for ordering alerts and arbitrating views.
    pub fn priority(&self) -> u32 {
        match self {
            Self::Info => 10,
            Self::Warning => 100,
            Self::Critical => 1000,
        }
    }

    /// Human-readable label used in alert titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    /// Wire/config string for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlarmLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmLevel {
    type Err = HomewatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| HomewatchError::unknown_variant("alarm level", s))
    }
}

/// Home security posture an alarm is relevant to.
///
/// Ordered `Off < Low < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Security monitoring disabled
    Off,
    /// Occupants home
    #[default]
    Low,
    /// Home unoccupied or armed
    High,
}

impl SecurityLevel {
    /// All variants, in encoding-table order.
    pub const ALL: [SecurityLevel; 3] = [SecurityLevel::Off, SecurityLevel::Low, SecurityLevel::High];

    /// Wire/config string for this security level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::High => "high",
        }
    }

    /// Returns true if an alarm tagged `required` is relevant while the home is at `self`.
    pub fn permits(&self, required: SecurityLevel) -> bool {
        *self != Self::Off && *self >= required
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = HomewatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| HomewatchError::unknown_variant("security level", s))
    }
}
