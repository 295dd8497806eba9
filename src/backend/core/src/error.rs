//! Error types for changetrace.
//!
//! Ingestion itself never fails: malformed or unbalanced input is degraded
//! inside the aggregator. The errors here cover the set-up paths only, i.e.
//! compiling an [`AggregatorConfig`](crate::config::AggregatorConfig) and
//! loading configuration.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for changetrace set-up operations.
pub type Result<T> = std::result::Result<T, ChangeTraceError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors produced while building an aggregator or loading its configuration.
#[derive(Debug, Error)]
pub enum ChangeTraceError {
    /// A noise key pattern is not a valid regular expression.
    #[error("Invalid noise key pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Value truncation limits are inconsistent.
    #[error("Invalid value limits: truncated length {truncated_length} must be below max length {max_value_length}")]
    InvalidLimits {
        max_value_length: usize,
        truncated_length: usize,
    },

    /// Configuration could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ChangeTraceError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Get a stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::InvalidLimits { .. } => "INVALID_LIMITS",
            Self::Config(_) => "CONFIGURATION_ERROR",
        }
    }
}
