//! Alerts: user-facing aggregates of matching alarms.
//!
//! An [`Alert`] is created from the first alarm of a given signature and then
//! absorbs every later alarm with the same signature until it is acknowledged
//! or expires. Its alarm history is bounded: once `capacity` alarms are held,
//! each merge drops the oldest one.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use homewatch_core::{AlarmLevel, AlertId};

use crate::alarm::Alarm;

/// Default bound on the alarm history kept per alert.
pub const DEFAULT_MAX_ALARM_LIST_SIZE: usize = 50;

/// A live alert.
///
/// Owned by the [`AlertStore`](crate::store::AlertStore); everything handed
/// out of the store is a cloned, read-only snapshot. State changes go through
/// the store (or [`AlertService`](crate::service::AlertService)).
#[derive(Debug, Clone)]
pub struct Alert {
    id: AlertId,
    first_alarm: Alarm,
    /// Newest first
    alarms: VecDeque<Alarm>,
    capacity: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    acknowledged: bool,
}

impl Alert {
    /// Create an alert from its first alarm.
    ///
    /// A `capacity` of zero is treated as one; an alert always holds at least
    /// the alarm that created it.
    pub fn new(id: impl Into<AlertId>, first_alarm: Alarm, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut alarms = VecDeque::with_capacity(capacity);
        alarms.push_front(first_alarm.clone());
        Self {
            id: id.into(),
            start: first_alarm.timestamp,
            end: first_alarm.expires_at(),
            first_alarm,
            alarms,
            capacity,
            acknowledged: false,
        }
    }

    /// Merge a matching alarm into this alert.
    ///
    /// # Panics
    ///
    /// Panics if `alarm` does not share the first alarm's signature. The alert
    /// is left untouched in that case.
    pub(crate) fn merge(&mut self, alarm: Alarm) {
        assert!(
            self.first_alarm.matches(&alarm),
            "alarm signature {:?} does not match alert {} signature {:?}",
            alarm.signature(),
            self.id,
            self.first_alarm.signature(),
        );

        self.end = self.end.max(alarm.expires_at());
        self.alarms.push_front(alarm);
        self.alarms.truncate(self.capacity);
    }

    /// Mark the stored alert acknowledged; the next sweep removes it.
    ///
    /// Callers outside the crate hold snapshots and acknowledge through
    /// [`AlertStore::acknowledge`](crate::store::AlertStore::acknowledge).
    pub(crate) fn acknowledge(&mut self) {
        self.acknowledged = true;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The alarm that created this alert.
    pub fn first_alarm(&self) -> &Alarm {
        &self.first_alarm
    }

    /// Most recently merged alarm.
    pub fn latest_alarm(&self) -> &Alarm {
        // Never empty: constructed with one alarm and truncated to capacity >= 1.
        self.alarms.front().unwrap_or(&self.first_alarm)
    }

    /// Retained alarm history, newest first.
    pub fn alarms(&self) -> impl ExactSizeIterator<Item = &Alarm> {
        self.alarms.iter()
    }

    /// Number of retained alarms (capped at the history bound).
    pub fn count(&self) -> usize {
        self.alarms.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// True once `now` is past the end of the alert's lifetime.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end
    }

    pub fn has_single_alarm(&self) -> bool {
        self.count() == 1
    }

    /// Highest level seen across the retained alarms.
    pub fn level(&self) -> AlarmLevel {
        self.alarms
            .iter()
            .map(|a| a.level)
            .max()
            .unwrap_or(self.first_alarm.level)
    }

    /// Priority of the highest level seen; never lower than the first alarm's.
    pub fn priority(&self) -> u32 {
        self.level().priority().max(self.first_alarm.level.priority())
    }

    /// Display title, e.g. `Warning: Motion in garage (3)`.
    pub fn title(&self) -> String {
        let base = format!("{}: {}", self.first_alarm.level.label(), self.first_alarm.title);
        if self.count() > 1 {
            format!("{} ({})", base, self.count())
        } else {
            base
        }
    }

    /// One-line summary for logs and the console.
    pub fn format_compact(&self) -> String {
        let ack_marker = if self.acknowledged { "✓" } else { " " };
        format!(
            "{} [{}] {} until {}",
            ack_marker,
            self.first_alarm.source,
            self.title(),
            self.end.format("%H:%M:%S")
        )
    }
}
