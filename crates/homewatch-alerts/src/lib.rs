//! # homewatch-alerts
//!
//! Alarm aggregation and console view arbitration for Homewatch.
//!
//! This crate provides:
//! - [`Alarm`] - Immutable occurrence reports from producers
//! - [`Alert`] - Aggregates of matching alarms with a bounded history
//! - [`AlertStore`] - Thread-safe merge-or-create and maintenance sweep
//! - [`AlertService`] - Facade for producers, pollers and the scheduler
//! - [`SuggestionArbiter`] - Single-slot "show this view now" decision
//! - [`MaintenanceScheduler`] - Periodic maintenance on a tokio interval
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use homewatch_alerts::{Alarm, AlarmSourceDetail, AlertService, HomewatchConfig};
//! use homewatch_core::{AlarmLevel, AlarmSource};
//!
//! fn main() -> homewatch_core::Result<()> {
//!     let service = Arc::new(AlertService::from_config(&HomewatchConfig::load()?));
//!
//!     let alarm = Alarm::new(
//!         AlarmSource::Event,
//!         "motion_detection",
//!         AlarmLevel::Warning,
//!         "Motion in driveway",
//!         600,
//!         chrono::Utc::now(),
//!     )
//!     .with_detail(AlarmSourceDetail::new().with_attr("sensor_id", "12"));
//!     service.ingest(alarm)?;
//!
//!     if let Some(view) = service.arbiter().consume() {
//!         println!("switch console to {}", view.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod alarm;
pub mod alert;
pub mod config;
pub mod maintenance;
pub mod notification;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod suggestion;

pub use alarm::{Alarm, AlarmSignature, AlarmSourceDetail, SENSOR_ID_ATTR};
pub use alert::{Alert, DEFAULT_MAX_ALARM_LIST_SIZE};
pub use config::{
    AlertsConfig, ConsoleConfig, HomewatchConfig, NotificationsConfig, SecurityConfig,
    ViewSettings,
};
pub use maintenance::MaintenanceResult;
pub use notification::{LogNotifier, NotificationSender, SecurityLevelProvider};
pub use scheduler::MaintenanceScheduler;
pub use service::AlertService;
pub use store::{AlertStore, SweepCounts};
pub use suggestion::{Suggestion, SuggestionArbiter};
