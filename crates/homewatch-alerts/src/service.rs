//! The alert service: the engine's entry point for producers, the UI poll
//! layer and the maintenance scheduler.
//!
//! One [`AlertService`] is constructed at startup and shared as an
//! `Arc<AlertService>` with everything that needs it. It owns the
//! [`AlertStore`] and drives the [`SuggestionArbiter`]; its outbound
//! collaborators (view settings, notification sender, security level
//! provider) are injected when it is built.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use homewatch_alerts::{Alarm, AlertService, AlertStore, ConsoleConfig, SecurityConfig};
//! use homewatch_core::{AlarmLevel, AlarmSource};
//!
//! let service = AlertService::new(
//!     AlertStore::default(),
//!     Arc::new(ConsoleConfig::default()),
//!     Arc::new(SecurityConfig::default()),
//! );
//!
//! let alarm = Alarm::new(
//!     AlarmSource::Event,
//!     "door_open",
//!     AlarmLevel::Warning,
//!     "Back door opened",
//!     300,
//!     chrono::Utc::now(),
//! );
//! let alert = service.ingest(alarm)?;
//! println!("{}", alert.title());
//! # Ok::<(), homewatch_core::HomewatchError>(())
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use homewatch_core::{AlarmLevel, Result, SecurityLevel};

use crate::alarm::Alarm;
use crate::alert::Alert;
use crate::config::{ConsoleConfig, HomewatchConfig, ViewSettings};
use crate::maintenance::MaintenanceResult;
use crate::notification::{LogNotifier, NotificationSender, SecurityLevelProvider};
use crate::store::AlertStore;
use crate::suggestion::SuggestionArbiter;

/// Facade over the alert store, maintenance and view arbitration.
pub struct AlertService {
    store: AlertStore,
    arbiter: Arc<SuggestionArbiter>,
    view_settings: Arc<dyn ViewSettings>,
    security: Arc<dyn SecurityLevelProvider>,
    notifier: Option<Arc<dyn NotificationSender>>,
    notify_min_level: AlarmLevel,
}

impl std::fmt::Debug for AlertService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertService")
            .field("store", &self.store)
            .field("arbiter", &self.arbiter)
            .field("notifier", &self.notifier.is_some())
            .field("notify_min_level", &self.notify_min_level)
            .finish()
    }
}

impl AlertService {
    /// Create a service with no notification sender.
    pub fn new(
        store: AlertStore,
        view_settings: Arc<dyn ViewSettings>,
        security: Arc<dyn SecurityLevelProvider>,
    ) -> Self {
        Self {
            store,
            arbiter: Arc::new(SuggestionArbiter::new()),
            view_settings,
            security,
            notifier: None,
            notify_min_level: AlarmLevel::Warning,
        }
    }

    /// Build a service from configuration, logging notifications if enabled.
    pub fn from_config(config: &HomewatchConfig) -> Self {
        let service = Self::new(
            AlertStore::new(config.alerts.max_alarm_history),
            Arc::new(config.console.clone()),
            Arc::new(config.security.clone()),
        )
        .with_notify_min_level(config.notifications.min_level);

        if config.notifications.enabled {
            service.with_notifier(Arc::new(LogNotifier))
        } else {
            service
        }
    }

    /// Hand newly created alerts to this sender.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSender>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Lowest alarm level that is handed to the notifier.
    pub fn with_notify_min_level(mut self, level: AlarmLevel) -> Self {
        self.notify_min_level = level;
        self
    }

    /// Share an existing arbiter (e.g. one the console poll layer already holds).
    pub fn with_arbiter(mut self, arbiter: Arc<SuggestionArbiter>) -> Self {
        self.arbiter = arbiter;
        self
    }

    pub fn arbiter(&self) -> &Arc<SuggestionArbiter> {
        &self.arbiter
    }

    pub fn store(&self) -> &AlertStore {
        &self.store
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Record an alarm and react to the resulting alert.
    pub fn ingest(&self, alarm: Alarm) -> Result<Alert> {
        self.ingest_at(alarm, Utc::now())
    }

    /// [`ingest`](Self::ingest) with an explicit clock.
    ///
    /// `now` decides which alerts are still live for merging and stamps any
    /// suggestion. Settings and the security level are read before the store
    /// is locked; notification and arbitration run after it is released.
    ///
    /// Because arbitration happens outside the store lock, two concurrent
    /// ingests of equal priority may reach the arbiter in the opposite order
    /// to their merges. Ingests from one thread always arbitrate in call order.
    pub fn ingest_at(&self, alarm: Alarm, now: DateTime<Utc>) -> Result<Alert> {
        let view = ConsoleConfig {
            auto_view_enabled: self.view_settings.auto_view_enabled(),
            auto_view_duration_secs: self.view_settings.auto_view_duration_secs(),
        };
        let security_level = self.security.security_level();

        let (alert, created) = self.store.merge_or_create(alarm, now)?;

        if created {
            self.notify(&alert, security_level);
        }
        if self.arbiter.consider_alert(&alert, &view, now) {
            info!(alert_id = %alert.id(), "console view suggested");
        }
        Ok(alert)
    }

    fn notify(&self, alert: &Alert, security_level: SecurityLevel) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let alarm = alert.first_alarm();
        if alarm.level < self.notify_min_level {
            debug!(alert_id = %alert.id(), level = %alarm.level, "below notification level");
            return;
        }
        if !security_level.permits(alarm.security_level) {
            debug!(
                alert_id = %alert.id(),
                current = %security_level,
                required = %alarm.security_level,
                "not relevant at current security level"
            );
            return;
        }
        if let Err(e) = notifier.send_alert(alert) {
            warn!(alert_id = %alert.id(), error = %e, "notification hand-off failed");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_alert(&self, alert_id: &str) -> Result<Alert> {
        self.store.get(alert_id)
    }

    pub fn unacknowledged_alerts(&self) -> Result<Vec<Alert>> {
        self.store.unacknowledged_alerts()
    }

    pub fn most_recent_alarm(&self) -> Result<Option<Alarm>> {
        self.store.most_recent_alarm()
    }

    /// Acknowledge an alert on behalf of the user.
    pub fn acknowledge_alert(&self, alert_id: &str) -> Result<()> {
        self.store.acknowledge(alert_id)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Sweep acknowledged and expired alerts.
    ///
    /// Never fails: errors are reported in the returned result. All counts
    /// come from one hold of the store lock, so
    /// `before_count == after_count + total_removed()`.
    pub fn run_maintenance(&self, now: DateTime<Utc>) -> MaintenanceResult {
        match self.store.sweep(now) {
            Ok(counts) => MaintenanceResult::completed(counts),
            Err(e) => MaintenanceResult::failed(0, e.to_string()),
        }
    }

    /// Scheduler entry point: run maintenance now and log the outcome.
    pub async fn run_periodic_maintenance(&self) -> MaintenanceResult {
        let result = self.run_maintenance(Utc::now());
        let summary = Self::summary_message(&result);
        if result.is_error() {
            error!(before_count = result.before_count, "{}", summary);
        } else {
            info!(
                removed = result.total_removed(),
                active = result.after_count,
                "{}",
                summary
            );
        }
        result
    }

    /// Operator summary of a maintenance result.
    pub fn summary_message(result: &MaintenanceResult) -> String {
        result.summary_message()
    }
}
