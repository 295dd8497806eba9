//! Name resolution and value formatting for change records.

use serde_json::Value;

use crate::config::AggregatorConfig;

// =============================================================================
// Name Resolver
// =============================================================================

/// Best-effort debug names for objects referenced by spy events.
///
/// Implementations must not panic; `None` means the object has no known name.
pub trait NameResolver {
    /// The runtime's debug name for an observable object.
    fn debug_name(&self, object: &Value) -> Option<String>;

    /// The name of the object's constructor, if it reports one.
    fn constructor_name(&self, _object: &Value) -> Option<String> {
        None
    }
}

impl<F> NameResolver for F
where
    F: Fn(&Value) -> Option<String>,
{
    fn debug_name(&self, object: &Value) -> Option<String> {
        self(object)
    }
}

/// Reads names the runtime attaches to serialized objects.
///
/// The debug name comes from `<admin_key>.name`; the constructor name from
/// `<constructor_key>`, either a string or an object with a `name`.
#[derive(Debug, Clone)]
pub struct DebugNameResolver {
    admin_key: String,
    constructor_key: String,
}

impl DebugNameResolver {
    pub fn new(admin_key: impl Into<String>, constructor_key: impl Into<String>) -> Self {
        Self {
            admin_key: admin_key.into(),
            constructor_key: constructor_key.into(),
        }
    }

    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self::new(config.admin_key.clone(), config.constructor_key.clone())
    }
}

impl Default for DebugNameResolver {
    fn default() -> Self {
        Self::from_config(&AggregatorConfig::default())
    }
}

impl NameResolver for DebugNameResolver {
    fn debug_name(&self, object: &Value) -> Option<String> {
        object
            .get(&self.admin_key)?
            .get("name")?
            .as_str()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    fn constructor_name(&self, object: &Value) -> Option<String> {
        let constructor = object.get(&self.constructor_key)?;
        constructor
            .as_str()
            .or_else(|| constructor.get("name")?.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Name of an observable subject: empty unless it is an object with a
/// known debug name.
pub fn observable_name(resolver: &dyn NameResolver, value: Option<&Value>) -> String {
    match value {
        Some(value) if is_object(value) => resolver.debug_name(value).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Name of the `this` an action or computation ran against.
///
/// Objects resolve to their debug name, then their constructor name, then
/// `"object"`. Primitives resolve to their type name. Null or absent is empty.
pub fn name_for_this(resolver: &dyn NameResolver, value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value @ (Value::Object(_) | Value::Array(_))) => resolver
            .debug_name(value)
            .or_else(|| resolver.constructor_name(value))
            .unwrap_or_else(|| "object".to_string()),
        Some(Value::String(_)) => "string".to_string(),
        Some(Value::Number(_)) => "number".to_string(),
        Some(Value::Bool(_)) => "boolean".to_string(),
    }
}

// =============================================================================
// Value Formatting
// =============================================================================

/// Shortens long string values for display in change records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFormatter {
    max_length: usize,
    keep_length: usize,
    ellipsis: String,
}

impl ValueFormatter {
    pub fn new(max_length: usize, keep_length: usize, ellipsis: impl Into<String>) -> Self {
        Self {
            max_length,
            keep_length,
            ellipsis: ellipsis.into(),
        }
    }

    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self::new(
            config.max_value_length,
            config.truncated_length,
            config.ellipsis.clone(),
        )
    }

    /// Truncate strings longer than the limit; every other value is returned
    /// unchanged. Length counts characters, not bytes.
    pub fn format(&self, value: Value) -> Value {
        match value {
            Value::String(text) if text.chars().count() > self.max_length => {
                let mut short: String = text.chars().take(self.keep_length).collect();
                short.push_str(&self.ellipsis);
                Value::String(short)
            }
            other => other,
        }
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::from_config(&AggregatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_debug_name_from_admin_record() {
        let resolver = DebugNameResolver::default();
        let store = json!({"$mobx": {"name": "TodoStore@12"}, "constructor": "TodoStore"});

        assert_eq!(resolver.debug_name(&store), Some("TodoStore@12".to_string()));
        assert_eq!(observable_name(&resolver, Some(&store)), "TodoStore@12");
        assert_eq!(name_for_this(&resolver, Some(&store)), "TodoStore@12");
    }

    #[test]
    fn test_observable_name_is_empty_for_non_objects() {
        let resolver = DebugNameResolver::default();

        assert_eq!(observable_name(&resolver, None), "");
        assert_eq!(observable_name(&resolver, Some(&json!(null))), "");
        assert_eq!(observable_name(&resolver, Some(&json!("text"))), "");
        assert_eq!(observable_name(&resolver, Some(&json!({"plain": true}))), "");
    }

    #[test]
    fn test_name_for_this_fallbacks() {
        let resolver = DebugNameResolver::default();

        assert_eq!(name_for_this(&resolver, None), "");
        assert_eq!(name_for_this(&resolver, Some(&json!(null))), "");
        assert_eq!(
            name_for_this(&resolver, Some(&json!({"constructor": {"name": "Counter"}}))),
            "Counter"
        );
        assert_eq!(name_for_this(&resolver, Some(&json!({"x": 1}))), "object");
        assert_eq!(name_for_this(&resolver, Some(&json!([1, 2]))), "object");
        assert_eq!(name_for_this(&resolver, Some(&json!("s"))), "string");
        assert_eq!(name_for_this(&resolver, Some(&json!(3))), "number");
        assert_eq!(name_for_this(&resolver, Some(&json!(false))), "boolean");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |value: &Value| value.get("id").map(|id| format!("obs#{}", id));

        assert_eq!(observable_name(&resolver, Some(&json!({"id": 4}))), "obs#4");
        assert_eq!(name_for_this(&resolver, Some(&json!({}))), "object");
    }

    #[test]
    fn test_format_truncates_long_strings() {
        let formatter = ValueFormatter::default();
        let long = "x".repeat(150);

        let formatted = formatter.format(json!(long));
        let text = formatted.as_str().unwrap();
        assert_eq!(text.chars().count(), 100);
        assert!(text.starts_with(&"x".repeat(97)));
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_format_keeps_boundary_and_non_strings() {
        let formatter = ValueFormatter::default();
        let exact = "y".repeat(100);

        assert_eq!(formatter.format(json!(exact.clone())), json!(exact));
        assert_eq!(formatter.format(json!(42)), json!(42));
        assert_eq!(formatter.format(json!({"k": "v"})), json!({"k": "v"}));
        assert_eq!(formatter.format(json!(null)), json!(null));
    }

    #[test]
    fn test_format_counts_characters() {
        let formatter = ValueFormatter::new(3, 2, "…");
        assert_eq!(formatter.format(json!("äöüß")), json!("äö…"));
        assert_eq!(formatter.format(json!("äöü")), json!("äöü"));
    }
}
