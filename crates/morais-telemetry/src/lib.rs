//! Morais Telemetry - log subscriber setup for the morais event dispatcher.
//!
//! The dispatcher itself only emits `tracing` events. This crate decides
//! where they go:
//! - Pretty, compact, full or JSON formatting
//! - stdout, stderr or rolling files
//! - `EnvFilter` level and per-target directives
//!
//! # Example
//!
//! ```rust,no_run
//! use morais_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), morais_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("morais_events=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("Logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
