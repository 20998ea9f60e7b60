//! Outcome of one alert maintenance cycle.

use serde::Serialize;

use crate::store::SweepCounts;

/// What a maintenance cycle did, or why it failed.
///
/// Failures are carried in `error_message` rather than returned as errors so
/// the scheduler driving maintenance never has to handle them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceResult {
    pub before_count: usize,
    pub after_count: usize,
    pub expired_removed: usize,
    pub ack_removed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MaintenanceResult {
    /// Result of a completed sweep.
    pub fn completed(counts: SweepCounts) -> Self {
        Self {
            before_count: counts.before,
            after_count: counts.after,
            expired_removed: counts.expired_removed,
            ack_removed: counts.ack_removed,
            error_message: None,
        }
    }

    /// Result of a cycle that failed after counting `before_count` alerts.
    pub fn failed(before_count: usize, message: impl Into<String>) -> Self {
        Self {
            before_count,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn total_removed(&self) -> usize {
        self.expired_removed + self.ack_removed
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// One-line operator summary of this cycle.
    pub fn summary_message(&self) -> String {
        if let Some(error) = &self.error_message {
            return format!("Alert maintenance failed: {}", error);
        }
        if self.before_count == 0 {
            return "No alerts in queue".to_string();
        }
        if self.total_removed() == 0 {
            let plural = if self.before_count == 1 { "" } else { "s" };
            return format!("No cleanup needed ({} active alert{})", self.before_count, plural);
        }

        let mut parts = Vec::with_capacity(3);
        if self.expired_removed > 0 {
            parts.push(format!("{} expired", self.expired_removed));
        }
        if self.ack_removed > 0 {
            parts.push(format!("{} acknowledged", self.ack_removed));
        }
        if self.after_count == 0 {
            parts.push("none active".to_string());
        } else {
            parts.push(format!("{} active", self.after_count));
        }
        format!("Removed {}", parts.join(", "))
    }
}

impl std::fmt::Display for MaintenanceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(before: usize, expired: usize, acked: usize, after: usize) -> MaintenanceResult {
        MaintenanceResult::completed(SweepCounts {
            before,
            after,
            expired_removed: expired,
            ack_removed: acked,
        })
    }

    #[test]
    fn test_empty_queue() {
        assert_eq!(MaintenanceResult::default().summary_message(), "No alerts in queue");
    }

    #[test]
    fn test_no_cleanup_singular_and_plural() {
        assert_eq!(
            removed(1, 0, 0, 1).summary_message(),
            "No cleanup needed (1 active alert)"
        );
        assert_eq!(
            removed(3, 0, 0, 3).summary_message(),
            "No cleanup needed (3 active alerts)"
        );
    }

    #[test]
    fn test_removed_expired_only() {
        assert_eq!(removed(5, 2, 0, 3).summary_message(), "Removed 2 expired, 3 active");
    }

    #[test]
    fn test_removed_acknowledged_only() {
        assert_eq!(removed(4, 0, 1, 3).summary_message(), "Removed 1 acknowledged, 3 active");
    }

    #[test]
    fn test_removed_both() {
        assert_eq!(
            removed(7, 2, 2, 3).summary_message(),
            "Removed 2 expired, 2 acknowledged, 3 active"
        );
        assert_eq!(
            removed(3, 2, 1, 0).summary_message(),
            "Removed 2 expired, 1 acknowledged, none active"
        );
    }

    #[test]
    fn test_failed() {
        let result = MaintenanceResult::failed(4, "X");
        assert_eq!(result.summary_message(), "Alert maintenance failed: X");
        assert_eq!(result.before_count, 4);
        assert!(result.is_error());
        assert_eq!(result.to_string(), "Alert maintenance failed: X");
    }

    #[test]
    fn test_total_removed() {
        assert_eq!(removed(9, 3, 4, 2).total_removed(), 7);
    }
}
