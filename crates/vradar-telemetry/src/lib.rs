//! Structured logging setup for the vRadar server.
//!
//! The pipeline stages emit `tracing` events at their decision points
//! (debug on exemptions and redirects, warn on rejected credentials).
//! This crate owns the subscriber those events flow through.
//!
//! # Example
//!
//! ```rust,ignore
//! use vradar_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), vradar_telemetry::TelemetryError> {
//!     init_logging(&LogConfig::production())?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vradar-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
