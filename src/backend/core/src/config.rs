//! Configuration management.

use serde::Deserialize;

use crate::error::{ChangeTraceError, Result};
use crate::telemetry::LoggingConfig;

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Aggregator configuration
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Top-level event keys matching any of these patterns are runtime noise
    #[serde(default = "default_noise_key_patterns")]
    pub noise_key_patterns: Vec<String>,

    /// Key under which a raw event carries its inherited (prototype) fields
    #[serde(default = "default_inherited_key")]
    pub inherited_key: String,

    /// Key of the runtime's administration record on observable objects
    #[serde(default = "default_admin_key")]
    pub admin_key: String,

    /// Key holding an object's constructor name
    #[serde(default = "default_constructor_key")]
    pub constructor_key: String,

    /// Strings longer than this many characters are truncated
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,

    /// Characters kept from a truncated string
    #[serde(default = "default_truncated_length")]
    pub truncated_length: usize,

    /// Marker appended to a truncated string
    #[serde(default = "default_ellipsis")]
    pub ellipsis: String,

    /// Log unmatched group ends at warn level instead of debug
    #[serde(default = "default_report_mismatched_ends")]
    pub report_mismatched_ends: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            noise_key_patterns: default_noise_key_patterns(),
            inherited_key: default_inherited_key(),
            admin_key: default_admin_key(),
            constructor_key: default_constructor_key(),
            max_value_length: default_max_value_length(),
            truncated_length: default_truncated_length(),
            ellipsis: default_ellipsis(),
            report_mismatched_ends: default_report_mismatched_ends(),
        }
    }
}

impl AggregatorConfig {
    /// Check the value truncation limits.
    pub fn validate(&self) -> Result<()> {
        if self.truncated_length >= self.max_value_length {
            return Err(ChangeTraceError::InvalidLimits {
                max_value_length: self.max_value_length,
                truncated_length: self.truncated_length,
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_noise_key_patterns() -> Vec<String> {
    vec![r"^\$mobx".to_string(), r"^__".to_string()]
}
fn default_inherited_key() -> String { "__proto__".to_string() }
fn default_admin_key() -> String { "$mobx".to_string() }
fn default_constructor_key() -> String { "constructor".to_string() }
fn default_max_value_length() -> usize { 100 }
fn default_truncated_length() -> usize { 97 }
fn default_ellipsis() -> String { "...".to_string() }
fn default_report_mismatched_ends() -> bool { true }

/// `CHANGETRACE__SECTION__KEY` variables. List settings are comma-separated.
fn environment() -> config::Environment {
    config::Environment::with_prefix("CHANGETRACE")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("aggregator.noise_key_patterns")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(environment())
            .build()
            .map_err(ChangeTraceError::from)?;

        let cfg: Config = config.try_deserialize().map_err(ChangeTraceError::from)?;
        cfg.aggregator.validate()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with the environment layered on top.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(environment())
            .build()
            .map_err(ChangeTraceError::from)?;

        let cfg: Config = config.try_deserialize().map_err(ChangeTraceError::from)?;
        cfg.aggregator.validate()?;
        Ok(cfg)
    }
}
