//! Background scheduler for alert maintenance.
//!
//! Spawns a tokio task that calls
//! [`AlertService::run_periodic_maintenance`] on a fixed interval.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use homewatch_alerts::{AlertService, HomewatchConfig, MaintenanceScheduler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HomewatchConfig::default();
//!     let service = Arc::new(AlertService::from_config(&config));
//!
//!     let handle = MaintenanceScheduler::from_config(service.clone(), &config.alerts).start();
//!
//!     // ... ingest alarms ...
//!
//!     handle.abort();
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::{AlertsConfig, DEFAULT_MAINTENANCE_INTERVAL_SECS};
use crate::maintenance::MaintenanceResult;
use crate::service::AlertService;

/// Periodic driver for alert maintenance.
#[derive(Debug)]
pub struct MaintenanceScheduler {
    service: Arc<AlertService>,
    interval: Duration,
    run_on_startup: bool,
}

impl MaintenanceScheduler {
    /// Create a scheduler with the default interval (60 seconds).
    pub fn new(service: Arc<AlertService>) -> Self {
        Self::with_interval(service, Duration::from_secs(DEFAULT_MAINTENANCE_INTERVAL_SECS))
    }

    /// Create a scheduler with a custom interval.
    pub fn with_interval(service: Arc<AlertService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            run_on_startup: true,
        }
    }

    /// Create a scheduler from the `alerts` config section.
    pub fn from_config(service: Arc<AlertService>, config: &AlertsConfig) -> Self {
        Self::with_interval(service, config.maintenance_interval())
            .run_on_startup(config.run_maintenance_on_startup)
    }

    /// Whether to sweep as soon as the task starts.
    pub fn run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the background maintenance task.
    ///
    /// Returns a JoinHandle that can be used to abort the task.
    pub fn start(self) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            run_on_startup = self.run_on_startup,
            "Starting alert maintenance scheduler"
        );

        tokio::spawn(async move {
            self.run_loop().await;
        })
    }

    async fn run_loop(&self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately.
        if !self.run_on_startup {
            interval.tick().await;
        }

        loop {
            interval.tick().await;
            debug!("Running alert maintenance cycle");
            self.service.run_periodic_maintenance().await;
        }
    }

    /// Run one maintenance cycle now.
    pub async fn run_once(&self) -> MaintenanceResult {
        self.service.run_periodic_maintenance().await
    }
}
