//! Telemetry: Logging and Metrics.
//!
//! - **Logging**: `tracing-subscriber` set-up in JSON, pretty or compact form
//! - **Metrics**: counters for ingestion, emission and protocol anomalies
//!
//! # Example
//!
//! ```rust,no_run
//! use changetrace_core::telemetry::{init_telemetry, LoggingConfig};
//!
//! init_telemetry(&LoggingConfig::default()).expect("Failed to initialize telemetry");
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{register_metric_descriptions, AggregatorMetrics};

/// Initialize logging and register metric descriptions.
///
/// Call once at process start-up.
///
/// # Errors
///
/// Returns an error if the logging subscriber cannot be installed.
pub fn init_telemetry(config: &LoggingConfig) -> anyhow::Result<()> {
    init_logging(config)?;
    register_metric_descriptions();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Telemetry initialized");
    Ok(())
}
