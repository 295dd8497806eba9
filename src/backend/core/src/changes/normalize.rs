//! Field normalization: own fields only, runtime noise removed.

use regex::Regex;
use serde_json::Map;

use super::event::{ChangeEvent, RawEvent};
use crate::config::AggregatorConfig;
use crate::error::{ChangeTraceError, Result};

/// Copies a raw event's own fields into a fresh [`ChangeEvent`].
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    inherited_key: String,
    noise: Vec<Regex>,
}

impl FieldNormalizer {
    /// Build a normalizer, rejecting invalid noise patterns.
    pub fn try_new(config: &AggregatorConfig) -> Result<Self> {
        let noise = config
            .noise_key_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ChangeTraceError::invalid_pattern(pattern, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            inherited_key: config.inherited_key.clone(),
            noise,
        })
    }

    /// Build a normalizer, skipping invalid noise patterns.
    pub fn lenient(config: &AggregatorConfig) -> Self {
        let noise = config
            .noise_key_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(error) => {
                    tracing::warn!(pattern = %pattern, error = %error, "Skipping invalid noise key pattern");
                    None
                }
            })
            .collect();

        Self {
            inherited_key: config.inherited_key.clone(),
            noise,
        }
    }

    /// Whether a top-level key is runtime-internal noise.
    pub fn is_noise(&self, key: &str) -> bool {
        key == self.inherited_key || self.noise.iter().any(|regex| regex.is_match(key))
    }

    /// Copy the event's own fields. The raw event is left untouched.
    pub fn normalize(&self, raw: &RawEvent) -> ChangeEvent {
        let Some(object) = raw.as_object() else {
            tracing::debug!(event = %raw.as_value(), "Spy event is not an object; treating it as empty");
            return ChangeEvent::default();
        };

        let own: Map<_, _> = object
            .iter()
            .filter(|(key, _)| !self.is_noise(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        ChangeEvent::from_fields(own)
    }
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::lenient(&AggregatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::kind::ChangeKind;
    use serde_json::json;

    #[test]
    fn test_drops_inherited_and_noise_fields() {
        let raw = RawEvent::new(json!({
            "type": "add",
            "name": "todo",
            "__proto__": {"type": "delete", "inheritedOnly": true},
            "$mobx": {"name": "Admin"},
            "__internal": 1,
        }));

        let event = FieldNormalizer::default().normalize(&raw);

        assert_eq!(event.kind, Some(ChangeKind::Add));
        assert_eq!(event.fields.len(), 1);
        assert_eq!(event.fields.get("name"), Some(&json!("todo")));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let raw = RawEvent::new(json!({"type": "update", "newValue": 1, "$mobx": {}}));
        let before = raw.clone();

        let _ = FieldNormalizer::default().normalize(&raw);

        assert_eq!(raw, before);
    }

    #[test]
    fn test_non_object_event_is_empty() {
        let event = FieldNormalizer::default().normalize(&RawEvent::new(json!("noise")));
        assert_eq!(event, ChangeEvent::default());
    }

    #[test]
    fn test_null_fields_pass_through() {
        let raw = RawEvent::new(json!({"type": "update", "newValue": null, "index": null}));
        let event = FieldNormalizer::default().normalize(&raw);

        assert_eq!(event.new_value, Some(json!(null)));
        assert_eq!(event.fields.get("index"), Some(&json!(null)));
    }

    #[test]
    fn test_try_new_rejects_invalid_pattern() {
        let config = AggregatorConfig {
            noise_key_patterns: vec!["(".to_string()],
            ..Default::default()
        };

        assert!(matches!(
            FieldNormalizer::try_new(&config),
            Err(ChangeTraceError::InvalidPattern { .. })
        ));
        assert!(!FieldNormalizer::lenient(&config).is_noise("anything"));
    }
}
