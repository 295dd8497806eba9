//! Raw spy events and their normalized form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kind::ChangeKind;

// =============================================================================
// Wire Field Names
// =============================================================================

/// Field names used by the runtime's spy feed.
pub mod fields {
    pub const TYPE: &str = "type";
    pub const KIND: &str = "kind";
    pub const SPY_REPORT_START: &str = "spyReportStart";
    pub const SPY_REPORT_END: &str = "spyReportEnd";
    pub const IS_GROUP_START: &str = "isGroupStart";
    pub const IS_GROUP_END: &str = "isGroupEnd";
    pub const TIME: &str = "time";
    pub const OBJECT: &str = "object";
    pub const TARGET: &str = "target";
    pub const NEW_VALUE: &str = "newValue";
    pub const OLD_VALUE: &str = "oldValue";
    pub const MESSAGE: &str = "message";

    // Written by the aggregator on every change record.
    pub const ID: &str = "id";
    pub const TIMESTAMP: &str = "timestamp";
    pub const CHILDREN: &str = "children";
    pub const OBJECT_NAME: &str = "objectName";
    pub const TARGET_NAME: &str = "targetName";
}

// =============================================================================
// Raw Event
// =============================================================================

/// One notification exactly as the instrumented runtime delivered it.
///
/// Normally a JSON object. Fields the runtime inherited rather than set on the
/// event itself travel under the inherited key (`__proto__` by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Value);

impl RawEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The event's own fields, if it is an object.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// =============================================================================
// Normalized Event
// =============================================================================

/// A raw event reduced to its own fields, with the fields the aggregator
/// interprets lifted into typed slots.
///
/// Lifting is lenient: a known field holding a value of the wrong type stays
/// in `fields` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeEvent {
    pub kind: Option<ChangeKind>,
    pub is_group_start: bool,
    pub is_group_end: bool,
    /// Opaque duration reported on group-end events.
    pub time: Option<f64>,
    pub object: Option<Value>,
    pub target: Option<Value>,
    pub new_value: Option<Value>,
    pub old_value: Option<Value>,
    pub message: Option<Value>,
    /// Every other own field, verbatim.
    pub fields: Map<String, Value>,
}

impl ChangeEvent {
    /// Build an event from already-normalized own fields.
    pub fn from_fields(mut fields: Map<String, Value>) -> Self {
        let kind = take_kind(&mut fields);
        let is_group_start = take_flag(&mut fields, fields::SPY_REPORT_START)
            | take_flag(&mut fields, fields::IS_GROUP_START);
        let is_group_end = take_flag(&mut fields, fields::SPY_REPORT_END)
            | take_flag(&mut fields, fields::IS_GROUP_END);
        let time = take_number(&mut fields, fields::TIME);

        Self {
            kind,
            is_group_start,
            is_group_end,
            time,
            object: fields.remove(fields::OBJECT),
            target: fields.remove(fields::TARGET),
            new_value: fields.remove(fields::NEW_VALUE),
            old_value: fields.remove(fields::OLD_VALUE),
            message: fields.remove(fields::MESSAGE),
            fields,
        }
    }

    /// Start building an event of the given kind.
    pub fn of_kind(kind: ChangeKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Render back to the runtime's wire shape.
    pub fn to_raw(&self) -> RawEvent {
        let mut map = self.fields.clone();
        if let Some(kind) = &self.kind {
            map.insert(fields::TYPE.to_string(), Value::String(kind.to_string()));
        }
        if self.is_group_start {
            map.insert(fields::SPY_REPORT_START.to_string(), Value::Bool(true));
        }
        if self.is_group_end {
            map.insert(fields::SPY_REPORT_END.to_string(), Value::Bool(true));
        }
        if let Some(time) = self.time.and_then(serde_json::Number::from_f64) {
            map.insert(fields::TIME.to_string(), Value::Number(time));
        }
        let slots = [
            (fields::OBJECT, &self.object),
            (fields::TARGET, &self.target),
            (fields::NEW_VALUE, &self.new_value),
            (fields::OLD_VALUE, &self.old_value),
            (fields::MESSAGE, &self.message),
        ];
        for (name, value) in slots {
            if let Some(value) = value {
                map.insert(name.to_string(), value.clone());
            }
        }
        RawEvent(Value::Object(map))
    }
}

fn take_kind(fields: &mut Map<String, Value>) -> Option<ChangeKind> {
    for key in [fields::TYPE, fields::KIND] {
        if let Some(Value::String(name)) = fields.get(key) {
            let kind = ChangeKind::parse(name);
            fields.remove(key);
            return Some(kind);
        }
    }
    None
}

/// Only a literal `true` sets a flag; anything else is left in place.
fn take_flag(fields: &mut Map<String, Value>, key: &str) -> bool {
    match fields.get(key) {
        Some(Value::Bool(true)) => {
            fields.remove(key);
            true
        }
        _ => false,
    }
}

fn take_number(fields: &mut Map<String, Value>, key: &str) -> Option<f64> {
    let number = fields.get(key).and_then(Value::as_f64)?;
    fields.remove(key);
    Some(number)
}
