//! # homewatch-core
//!
//! Core types, errors, and utilities shared by the Homewatch crates.
//!
//! This crate provides:
//! - [`HomewatchError`] - Error type for all Homewatch operations
//! - [`logging`] - Tracing setup and log directory helpers
//! - [`types`] - Alarm classification enums and their string encodings
//!
//! ## Example
//!
//! ```no_run
//! use homewatch_core::{logging, AlarmLevel};
//!
//! fn main() -> homewatch_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let level: AlarmLevel = "warning".parse()?;
//!     tracing::info!(priority = level.priority(), "parsed level");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{HomewatchError, Result};
pub use logging::{LogGuard, init_logging};
pub use types::{AlarmLevel, AlarmSource, AlertId, SecurityLevel};
