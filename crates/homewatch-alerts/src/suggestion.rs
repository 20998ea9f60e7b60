//! Console view arbitration.
//!
//! The [`SuggestionArbiter`] holds at most one [`Suggestion`]: the view the
//! live console should switch to next. A new suggestion replaces the current
//! one when its priority is at least as high, so a later event of the same
//! severity wins. Pollers take the suggestion with
//! [`consume`](SuggestionArbiter::consume), which clears the slot atomically;
//! each suggestion is delivered at most once.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use homewatch_core::AlarmSource;

use crate::alarm::SENSOR_ID_ATTR;
use crate::alert::Alert;
use crate::config::ViewSettings;

/// Reason recorded on suggestions raised by motion alarms.
pub const MOTION_REASON: &str = "motion_detection";

/// URL of the live video view for a sensor.
pub fn sensor_video_stream_url(sensor_id: &str) -> String {
    format!("/console/sensor/video-stream/{}", sensor_id)
}

/// A transient "show this view now" directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub url: String,
    pub duration_secs: u64,
    pub priority: u32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Suggestion {
    /// When the console should stop holding this view.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| self.created_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Single-slot, priority-ordered holder of the current suggestion.
#[derive(Debug, Default)]
pub struct SuggestionArbiter {
    slot: Mutex<Option<Suggestion>>,
}

impl SuggestionArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the slot cannot leave a half-written Option behind,
    // so a poisoned lock is safe to keep using.
    fn slot(&self) -> MutexGuard<'_, Option<Suggestion>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offer a suggestion. Returns true if it replaced the slot.
    ///
    /// Lower-priority offers are ignored.
    pub fn suggest(
        &self,
        url: impl Into<String>,
        duration_secs: u64,
        priority: u32,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut slot = self.slot();
        if let Some(current) = slot.as_ref()
            && priority < current.priority
        {
            debug!(
                priority,
                current_priority = current.priority,
                "ignoring lower-priority suggestion"
            );
            return false;
        }

        let suggestion = Suggestion {
            url: url.into(),
            duration_secs,
            priority,
            reason: reason.into(),
            created_at: now,
        };
        debug!(url = %suggestion.url, priority, "view suggested");
        *slot = Some(suggestion);
        true
    }

    /// Current suggestion, left in place.
    pub fn peek(&self) -> Option<Suggestion> {
        self.slot().clone()
    }

    /// Take the current suggestion, leaving the slot empty.
    pub fn consume(&self) -> Option<Suggestion> {
        self.slot().take()
    }

    /// Drop the current suggestion (e.g. the user dismissed it).
    pub fn clear(&self) {
        *self.slot() = None;
    }

    /// Suggest a view for the alert if it qualifies for auto-view.
    ///
    /// Qualifying alerts come from event alarms whose type mentions motion and
    /// whose latest alarm names a `sensor_id`. Weather alarms are not mapped to
    /// views. Returns true if a suggestion was placed.
    pub fn consider_alert(&self, alert: &Alert, settings: &dyn ViewSettings, now: DateTime<Utc>) -> bool {
        if !settings.auto_view_enabled() {
            debug!(alert_id = %alert.id(), "auto-view disabled");
            return false;
        }

        let latest = alert.latest_alarm();
        match latest.source {
            AlarmSource::Event => {}
            AlarmSource::Weather => {
                debug!(alert_id = %alert.id(), "weather alarms do not suggest views");
                return false;
            }
        }
        if !latest.alarm_type.contains("motion") {
            debug!(alert_id = %alert.id(), alarm_type = %latest.alarm_type, "not a motion alarm");
            return false;
        }
        let Some(sensor_id) = latest.detail_attr(SENSOR_ID_ATTR) else {
            debug!(alert_id = %alert.id(), "motion alarm without sensor_id");
            return false;
        };

        self.suggest(
            sensor_video_stream_url(sensor_id),
            settings.auto_view_duration_secs(),
            latest.level.priority(),
            MOTION_REASON,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{Alarm, AlarmSourceDetail};
    use crate::config::ConsoleConfig;
    use chrono::TimeZone;
    use homewatch_core::AlarmLevel;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn alert_for(source: AlarmSource, alarm_type: &str, sensor_id: Option<&str>) -> Alert {
        let mut alarm = Alarm::new(source, alarm_type, AlarmLevel::Warning, "Alarm", 60, t0());
        if let Some(id) = sensor_id {
            alarm = alarm.with_detail(AlarmSourceDetail::new().with_attr(SENSOR_ID_ATTR, id));
        }
        Alert::new("a1", alarm, 10)
    }

    fn enabled() -> ConsoleConfig {
        ConsoleConfig {
            auto_view_enabled: true,
            auto_view_duration_secs: 45,
        }
    }

    #[test]
    fn test_suggest_into_empty_slot() {
        let arbiter = SuggestionArbiter::new();
        assert!(arbiter.peek().is_none());
        assert!(arbiter.suggest("/a", 30, 100, "test", t0()));
        let s = arbiter.peek().unwrap();
        assert_eq!(s.url, "/a");
        assert_eq!(s.duration_secs, 30);
        assert_eq!(s.created_at, t0());
    }

    #[test]
    fn test_lower_priority_ignored() {
        let arbiter = SuggestionArbiter::new();
        arbiter.suggest("/high", 30, 1000, "test", t0());
        assert!(!arbiter.suggest("/low", 30, 100, "test", t0()));
        assert_eq!(arbiter.peek().unwrap().url, "/high");
    }

    #[test]
    fn test_equal_priority_replaces() {
        let arbiter = SuggestionArbiter::new();
        arbiter.suggest("/first", 30, 100, "test", t0());
        assert!(arbiter.suggest("/second", 30, 100, "test", t0()));
        assert_eq!(arbiter.peek().unwrap().url, "/second");
    }

    #[test]
    fn test_consume_is_at_most_once() {
        let arbiter = SuggestionArbiter::new();
        arbiter.suggest("/a", 30, 100, "test", t0());
        assert_eq!(arbiter.consume().unwrap().url, "/a");
        assert!(arbiter.consume().is_none());
        assert!(arbiter.peek().is_none());
    }

    #[test]
    fn test_consume_resets_priority_floor() {
        let arbiter = SuggestionArbiter::new();
        arbiter.suggest("/high", 30, 1000, "test", t0());
        arbiter.consume();
        assert!(arbiter.suggest("/low", 30, 10, "test", t0()));
    }

    #[test]
    fn test_clear() {
        let arbiter = SuggestionArbiter::new();
        arbiter.suggest("/a", 30, 100, "test", t0());
        arbiter.clear();
        assert!(arbiter.peek().is_none());
    }

    #[test]
    fn test_expires_at() {
        let arbiter = SuggestionArbiter::new();
        arbiter.suggest("/a", 30, 100, "test", t0());
        assert_eq!(arbiter.peek().unwrap().expires_at(), t0() + Duration::seconds(30));
    }

    #[test]
    fn test_consider_motion_alert() {
        let arbiter = SuggestionArbiter::new();
        let alert = alert_for(AlarmSource::Event, "motion_detection", Some("123"));
        assert!(arbiter.consider_alert(&alert, &enabled(), t0()));

        let s = arbiter.peek().unwrap();
        assert_eq!(s.url, "/console/sensor/video-stream/123");
        assert_eq!(s.priority, 100);
        assert_eq!(s.duration_secs, 45);
        assert_eq!(s.reason, MOTION_REASON);
    }

    #[test]
    fn test_consider_alert_no_ops() {
        let arbiter = SuggestionArbiter::new();
        let cases = [
            alert_for(AlarmSource::Weather, "tornado_motion", Some("1")),
            alert_for(AlarmSource::Event, "door_open", Some("1")),
            alert_for(AlarmSource::Event, "motion_detection", None),
        ];
        for alert in &cases {
            assert!(!arbiter.consider_alert(alert, &enabled(), t0()));
        }
        assert!(arbiter.peek().is_none());
    }

    #[test]
    fn test_consider_alert_disabled() {
        let arbiter = SuggestionArbiter::new();
        let alert = alert_for(AlarmSource::Event, "motion_detection", Some("123"));
        let disabled = ConsoleConfig {
            auto_view_enabled: false,
            ..enabled()
        };
        assert!(!arbiter.consider_alert(&alert, &disabled, t0()));
        assert!(arbiter.peek().is_none());
    }
}
