//! Thread-safe store of live alerts.
//!
//! [`AlertStore`] owns every live [`Alert`] behind a single mutex. Request
//! handlers call [`add_alarm`](AlertStore::add_alarm) and the read accessors
//! from arbitrary threads while the maintenance task calls
//! [`sweep`](AlertStore::sweep); each call holds the lock only for the map
//! mutation and hands back cloned snapshots.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use homewatch_core::{AlertId, HomewatchError, Result, log_alert_event};

use crate::alarm::Alarm;
use crate::alert::{Alert, DEFAULT_MAX_ALARM_LIST_SIZE};

/// Counts from one sweep, all taken under the same lock.
///
/// `before == after + expired_removed + ack_removed` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepCounts {
    pub before: usize,
    pub after: usize,
    pub expired_removed: usize,
    pub ack_removed: usize,
}

/// The authoritative set of live alerts.
#[derive(Debug)]
pub struct AlertStore {
    alerts: Mutex<HashMap<AlertId, Alert>>,
    max_alarm_list_size: usize,
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALARM_LIST_SIZE)
    }
}

impl AlertStore {
    /// Create an empty store whose alerts keep at most `max_alarm_list_size` alarms.
    pub fn new(max_alarm_list_size: usize) -> Self {
        Self {
            alerts: Mutex::new(HashMap::new()),
            max_alarm_list_size: max_alarm_list_size.max(1),
        }
    }

    pub fn max_alarm_list_size(&self) -> usize {
        self.max_alarm_list_size
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AlertId, Alert>>> {
        self.alerts
            .lock()
            .map_err(|_| HomewatchError::lock_poisoned("alert store"))
    }

    /// Merge the alarm into the live alert with the same signature, or create one.
    ///
    /// Expiry is judged against the wall clock, the same way the maintenance
    /// sweep judges it.
    pub fn add_alarm(&self, alarm: Alarm) -> Result<Alert> {
        self.add_alarm_at(alarm, Utc::now())
    }

    /// [`add_alarm`](Self::add_alarm) with an explicit clock.
    ///
    /// Only unacknowledged alerts with `end >= now` are candidates. An alarm
    /// matching an expired alert that has not been swept yet starts a fresh
    /// alert, whatever the alarm's own timestamp says.
    pub fn add_alarm_at(&self, alarm: Alarm, now: DateTime<Utc>) -> Result<Alert> {
        self.merge_or_create(alarm, now).map(|(alert, _)| alert)
    }

    /// Same as [`add_alarm_at`](Self::add_alarm_at), also reporting whether the alert is new.
    pub(crate) fn merge_or_create(&self, alarm: Alarm, now: DateTime<Utc>) -> Result<(Alert, bool)> {
        let mut alerts = self.lock()?;

        let existing = alerts
            .values_mut()
            .filter(|a| !a.is_acknowledged() && !a.is_expired(now))
            .filter(|a| a.first_alarm().matches(&alarm))
            .max_by_key(|a| a.end());

        if let Some(alert) = existing {
            alert.merge(alarm);
            log_alert_event!(alert.id(), "merged", count = alert.count());
            return Ok((alert.clone(), false));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let alert = Alert::new(id.clone(), alarm, self.max_alarm_list_size);
        log_alert_event!(&id, "created", title = %alert.title(), priority = alert.priority());
        alerts.insert(id, alert.clone());
        Ok((alert, true))
    }

    /// Get a snapshot of one alert.
    pub fn get(&self, alert_id: &str) -> Result<Alert> {
        self.lock()?
            .get(alert_id)
            .cloned()
            .ok_or_else(|| HomewatchError::alert_not_found(alert_id))
    }

    /// Acknowledge an alert; it is removed on the next sweep.
    pub fn acknowledge(&self, alert_id: &str) -> Result<()> {
        let mut alerts = self.lock()?;
        let alert = alerts
            .get_mut(alert_id)
            .ok_or_else(|| HomewatchError::alert_not_found(alert_id))?;
        alert.acknowledge();
        log_alert_event!(alert_id, "acknowledged");
        Ok(())
    }

    /// Snapshot of unacknowledged alerts, most severe first, then most recent first.
    pub fn unacknowledged_alerts(&self) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .lock()?
            .values()
            .filter(|a| !a.is_acknowledged())
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then(b.start().cmp(&a.start()))
        });
        Ok(alerts)
    }

    /// The newest alarm held by any alert.
    pub fn most_recent_alarm(&self) -> Result<Option<Alarm>> {
        Ok(self
            .lock()?
            .values()
            .map(Alert::latest_alarm)
            .max_by_key(|a| a.timestamp)
            .cloned())
    }

    /// Number of alerts currently held, swept or not.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Remove acknowledged and expired alerts in a single pass.
    ///
    /// An alert that is both acknowledged and expired counts as acknowledged.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<SweepCounts> {
        let mut alerts = self.lock()?;
        let mut counts = SweepCounts {
            before: alerts.len(),
            ..SweepCounts::default()
        };
        alerts.retain(|id, alert| {
            if alert.is_acknowledged() {
                counts.ack_removed += 1;
                debug!(alert_id = %id, "removing acknowledged alert");
                false
            } else if alert.is_expired(now) {
                counts.expired_removed += 1;
                debug!(alert_id = %id, end = %alert.end(), "removing expired alert");
                false
            } else {
                true
            }
        });
        counts.after = alerts.len();
        Ok(counts)
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.alerts.lock();
                panic!("poisoning alert store");
            })
            .join()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use homewatch_core::{AlarmLevel, AlarmSource};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn alarm(alarm_type: &str, level: AlarmLevel, offset_secs: i64, lifetime_secs: u64) -> Alarm {
        Alarm::new(
            AlarmSource::Event,
            alarm_type,
            level,
            alarm_type,
            lifetime_secs,
            t0() + Duration::seconds(offset_secs),
        )
    }

    /// Add with the clock reading the alarm's own timestamp.
    fn add(store: &AlertStore, alarm: Alarm) -> Result<Alert> {
        let now = alarm.timestamp;
        store.add_alarm_at(alarm, now)
    }

    #[test]
    fn test_add_alarm_creates_then_merges() {
        let store = AlertStore::new(10);
        let first = add(&store, alarm("motion", AlarmLevel::Warning, 0, 60)).unwrap();
        let second = add(&store, alarm("motion", AlarmLevel::Warning, 30, 60)).unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(second.count(), 2);
        assert_eq!(second.end(), t0() + Duration::seconds(90));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_merge_or_create_reports_creation() {
        let store = AlertStore::new(1);
        let (_, created) = store.merge_or_create(alarm("motion", AlarmLevel::Info, 0, 60), t0()).unwrap();
        assert!(created);
        let (alert, created) = store.merge_or_create(alarm("motion", AlarmLevel::Info, 1, 60), t0()).unwrap();
        assert!(!created);
        assert_eq!(alert.count(), 1);
    }

    #[test]
    fn test_poisoned_store_reports_error() {
        let store = AlertStore::new(10);
        store.poison();
        let err = add(&store, alarm("motion", AlarmLevel::Info, 0, 60)).unwrap_err();
        assert!(matches!(err, HomewatchError::LockPoisoned { .. }));
    }

    #[test]
    fn test_different_signatures_create_distinct_alerts() {
        let store = AlertStore::new(10);
        let a = add(&store, alarm("motion", AlarmLevel::Warning, 0, 60)).unwrap();
        let b = add(&store, alarm("motion", AlarmLevel::Critical, 0, 60)).unwrap();
        let c = add(&store, alarm("door_open", AlarmLevel::Warning, 0, 60)).unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn test_acknowledged_alert_is_not_merged_into() {
        let store = AlertStore::new(10);
        let first = add(&store, alarm("motion", AlarmLevel::Warning, 0, 60)).unwrap();
        store.acknowledge(first.id()).unwrap();

        let second = add(&store, alarm("motion", AlarmLevel::Warning, 5, 60)).unwrap();
        assert_ne!(first.id(), second.id());
        assert!(second.has_single_alarm());
    }

    #[test]
    fn test_expired_unswept_alert_is_not_revived() {
        let store = AlertStore::new(10);
        let first = add(&store, alarm("motion", AlarmLevel::Warning, 0, 60)).unwrap();
        let late = add(&store, alarm("motion", AlarmLevel::Warning, 120, 60)).unwrap();

        assert_ne!(first.id(), late.id());
        assert_eq!(store.get(first.id()).unwrap().count(), 1);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_late_alarm_does_not_revive_expired_alert() {
        let store = AlertStore::new(10);
        let first = add(&store, alarm("door_open", AlarmLevel::Info, -120, 60)).unwrap();
        assert!(first.is_expired(t0()));

        // Timestamped before the alert's end, but delivered after it.
        let late = store
            .add_alarm_at(alarm("door_open", AlarmLevel::Info, -90, 600), t0())
            .unwrap();

        assert_ne!(first.id(), late.id());
        let stale = store.get(first.id()).unwrap();
        assert_eq!(stale.count(), 1);
        assert!(stale.is_expired(t0()));

        let counts = store.sweep(t0()).unwrap();
        assert_eq!(counts.expired_removed, 1);
        assert_eq!(store.get(late.id()).unwrap().count(), 1);
    }

    #[test]
    fn test_add_alarm_uses_wall_clock() {
        let store = AlertStore::new(10);
        // Years in the past: long over by any wall clock.
        let old = store.add_alarm(alarm("motion", AlarmLevel::Info, -400_000_000, 60)).unwrap();
        let again = store.add_alarm(alarm("motion", AlarmLevel::Info, -399_999_999, 60)).unwrap();
        assert_ne!(old.id(), again.id());
    }

    #[test]
    fn test_acknowledge_writes_through_to_stored_alert() {
        let store = AlertStore::new(10);
        let created = add(&store, alarm("motion", AlarmLevel::Warning, 0, 600)).unwrap();
        let snapshot = store.get(created.id()).unwrap();

        store.acknowledge(snapshot.id()).unwrap();
        assert!(!snapshot.is_acknowledged());
        assert!(store.get(created.id()).unwrap().is_acknowledged());

        let counts = store.sweep(t0()).unwrap();
        assert_eq!(counts.ack_removed, 1);
        assert_eq!(counts.after, 0);
        assert!(store.get(created.id()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let store = AlertStore::default();
        let err = store.get("missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(store.acknowledge("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unacknowledged_ordering() {
        let store = AlertStore::new(10);
        let old_warning = add(&store, alarm("motion", AlarmLevel::Warning, 0, 600)).unwrap();
        let new_warning = add(&store, alarm("door_open", AlarmLevel::Warning, 10, 600)).unwrap();
        let critical = add(&store, alarm("smoke", AlarmLevel::Critical, 0, 600)).unwrap();
        let info = add(&store, alarm("hvac", AlarmLevel::Info, 20, 600)).unwrap();
        let acked = add(&store, alarm("leak", AlarmLevel::Critical, 30, 600)).unwrap();
        store.acknowledge(acked.id()).unwrap();

        let ids: Vec<String> = store
            .unacknowledged_alerts()
            .unwrap()
            .iter()
            .map(|a| a.id().to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                critical.id().to_string(),
                new_warning.id().to_string(),
                old_warning.id().to_string(),
                info.id().to_string(),
            ]
        );
    }

    #[test]
    fn test_most_recent_alarm() {
        let store = AlertStore::new(10);
        assert!(store.most_recent_alarm().unwrap().is_none());

        add(&store, alarm("motion", AlarmLevel::Warning, 0, 600)).unwrap();
        add(&store, alarm("door_open", AlarmLevel::Info, 50, 600)).unwrap();
        add(&store, alarm("motion", AlarmLevel::Warning, 20, 600)).unwrap();

        let latest = store.most_recent_alarm().unwrap().unwrap();
        assert_eq!(latest.alarm_type, "door_open");
        assert_eq!(latest.timestamp, t0() + Duration::seconds(50));
    }

    #[test]
    fn test_sweep_counts() {
        let store = AlertStore::new(10);
        add(&store, alarm("a", AlarmLevel::Info, 0, 10)).unwrap();
        add(&store, alarm("b", AlarmLevel::Info, 0, 10)).unwrap();
        let acked = add(&store, alarm("c", AlarmLevel::Info, 0, 1000)).unwrap();
        add(&store, alarm("d", AlarmLevel::Info, 0, 1000)).unwrap();
        store.acknowledge(acked.id()).unwrap();

        let counts = store.sweep(t0() + Duration::seconds(11)).unwrap();
        assert_eq!(
            counts,
            SweepCounts {
                before: 4,
                after: 1,
                expired_removed: 2,
                ack_removed: 1
            }
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_sweep_acknowledged_and_expired_counts_as_acknowledged() {
        let store = AlertStore::new(10);
        let alert = add(&store, alarm("a", AlarmLevel::Info, 0, 10)).unwrap();
        store.acknowledge(alert.id()).unwrap();

        let counts = store.sweep(t0() + Duration::seconds(100)).unwrap();
        assert_eq!(counts.ack_removed, 1);
        assert_eq!(counts.expired_removed, 0);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_sweep_keeps_alert_at_exact_end() {
        let store = AlertStore::new(10);
        add(&store, alarm("a", AlarmLevel::Info, 0, 10)).unwrap();
        let counts = store.sweep(t0() + Duration::seconds(10)).unwrap();
        assert_eq!(counts.before, 1);
        assert_eq!(counts.after, 1);
        assert_eq!(counts.expired_removed + counts.ack_removed, 0);
        assert_eq!(store.len().unwrap(), 1);
    }
}
