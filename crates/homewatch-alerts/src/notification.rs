//! Outbound collaborators for alert notifications.
//!
//! Delivery itself (email, push) lives outside the engine. The service hands
//! newly created alerts to a [`NotificationSender`] once the alert store lock
//! has been released, and asks a [`SecurityLevelProvider`] whether the alarm
//! is relevant at the home's current security posture.

use tracing::info;

use homewatch_core::{Result, SecurityLevel};

use crate::alert::Alert;
use crate::config::SecurityConfig;

/// Delivers acknowledgeable alerts to people.
pub trait NotificationSender: Send + Sync {
    /// Hand off one alert. Must not block for long; queue if delivery is slow.
    fn send_alert(&self, alert: &Alert) -> Result<()>;
}

/// Reports the home's current security level.
pub trait SecurityLevelProvider: Send + Sync {
    fn security_level(&self) -> SecurityLevel;
}

impl SecurityLevelProvider for SecurityConfig {
    fn security_level(&self) -> SecurityLevel {
        self.level
    }
}

/// Sender that only writes the alert to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSender for LogNotifier {
    fn send_alert(&self, alert: &Alert) -> Result<()> {
        info!(
            alert_id = %alert.id(),
            title = %alert.title(),
            priority = alert.priority(),
            "alert notification"
        );
        Ok(())
    }
}

/// Sender that keeps alerts in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<Alert>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Alerts handed off so far, oldest first.
    pub(crate) fn sent(&self) -> Vec<Alert> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl NotificationSender for RecordingNotifier {
    fn send_alert(&self, alert: &Alert) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| homewatch_core::HomewatchError::lock_poisoned("recording notifier"))?
            .push(alert.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Alarm;
    use chrono::Utc;
    use homewatch_core::{AlarmLevel, AlarmSource};

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        let alarm = Alarm::new(AlarmSource::Event, "door_open", AlarmLevel::Warning, "Door", 60, Utc::now());
        notifier.send_alert(&Alert::new("a1", alarm, 5)).unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id(), "a1");
    }

    #[test]
    fn test_log_notifier_succeeds() {
        let alarm = Alarm::new(AlarmSource::Weather, "tornado", AlarmLevel::Critical, "Tornado", 60, Utc::now());
        LogNotifier.send_alert(&Alert::new("a1", alarm, 5)).unwrap();
    }

    #[test]
    fn test_security_config_provider() {
        let config = SecurityConfig {
            level: SecurityLevel::High,
        };
        assert_eq!(config.security_level(), SecurityLevel::High);
    }
}
