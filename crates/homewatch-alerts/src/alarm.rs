//! Alarms: occurrence reports from producers.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use homewatch_core::{AlarmLevel, AlarmSource, HomewatchError, Result, SecurityLevel};

/// Detail attribute naming the sensor that raised an alarm.
pub const SENSOR_ID_ATTR: &str = "sensor_id";

/// Free-form key/value context attached to an alarm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSourceDetail {
    /// Context attributes (`sensor_id`, `entity_id`, `location`, ...)
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Optional snapshot or icon for the alarm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl AlarmSourceDetail {
    /// Create an empty detail block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set the image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// The fields that decide whether two alarms aggregate into one alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlarmSignature {
    pub source: AlarmSource,
    pub alarm_type: String,
    pub level: AlarmLevel,
}

/// A single occurrence report.
///
/// A plain value record, decoded from the producer feed. Once an alarm is
/// handed to the store it is only ever read; alerts keep their own copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub source: AlarmSource,
    /// Producer-defined classification, e.g. `motion_detection`
    #[serde(rename = "type")]
    pub alarm_type: String,
    pub level: AlarmLevel,
    pub title: String,
    #[serde(default)]
    pub details: Vec<AlarmSourceDetail>,
    #[serde(default)]
    pub security_level: SecurityLevel,
    /// How long the alarm keeps its alert alive
    pub lifetime_secs: u64,
    pub timestamp: DateTime<Utc>,
}

impl Alarm {
    /// Create an alarm with no details at the default security level.
    pub fn new(
        source: AlarmSource,
        alarm_type: impl Into<String>,
        level: AlarmLevel,
        title: impl Into<String>,
        lifetime_secs: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            alarm_type: alarm_type.into(),
            level,
            title: title.into(),
            details: Vec::new(),
            security_level: SecurityLevel::default(),
            lifetime_secs,
            timestamp,
        }
    }

    /// Attach a detail block.
    pub fn with_detail(mut self, detail: AlarmSourceDetail) -> Self {
        self.details.push(detail);
        self
    }

    /// Set the security level this alarm is relevant to.
    pub fn with_security_level(mut self, security_level: SecurityLevel) -> Self {
        self.security_level = security_level;
        self
    }

    /// Parse an alarm from one line of the JSON alarm feed.
    pub fn from_json_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| HomewatchError::json_parse("alarm feed", e))
    }

    /// Signature used for aggregation.
    pub fn signature(&self) -> AlarmSignature {
        AlarmSignature {
            source: self.source,
            alarm_type: self.alarm_type.clone(),
            level: self.level,
        }
    }

    /// Returns true if both alarms aggregate into the same alert.
    ///
    /// Same as comparing [`signature`](Self::signature)s, without the allocation.
    pub fn matches(&self, other: &Alarm) -> bool {
        self.source == other.source
            && self.level == other.level
            && self.alarm_type == other.alarm_type
    }

    /// When this alarm stops keeping its alert alive.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| self.timestamp.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// First value of a detail attribute across all detail blocks.
    pub fn detail_attr(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find_map(|d| d.attrs.get(key).map(String::as_str))
    }
}
