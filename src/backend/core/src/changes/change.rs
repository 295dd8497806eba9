//! Change records and the trees they form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event::{fields, ChangeEvent, RawEvent};
use super::kind::ChangeKind;

// =============================================================================
// Change ID
// =============================================================================

/// Ingestion-order identity of a change, unique within one aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub u64);

impl ChangeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Change
// =============================================================================

/// One enriched spy event and, for groups, everything observed inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub id: ChangeId,
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChangeKind>,

    /// Set when this change opened a group.
    #[serde(rename = "spyReportStart", default)]
    pub is_group_start: bool,

    /// Duration handed over by the event that closed this group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    /// Remaining own fields of the event (name, index, added, removed, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    #[serde(default)]
    pub children: Vec<Change>,
}

/// Keys a change record always writes itself. An event's own copies are
/// dropped so they cannot shadow the aggregator's values when serialized.
const RESERVED: [&str; 6] = [
    fields::ID,
    fields::TIMESTAMP,
    fields::CHILDREN,
    fields::OBJECT_NAME,
    fields::TARGET_NAME,
    fields::SPY_REPORT_START,
];

impl Change {
    /// Stamp a normalized event with its identity. Children start empty.
    pub fn from_event(mut event: ChangeEvent, id: ChangeId, timestamp: DateTime<Utc>) -> Self {
        for key in RESERVED {
            event.fields.remove(key);
        }
        // A group's time comes from the event that closes it.
        if event.is_group_start {
            event.fields.remove(fields::TIME);
        }

        Self {
            id,
            timestamp,
            kind: event.kind,
            is_group_start: event.is_group_start,
            time: event.time,
            object: event.object,
            target: event.target,
            new_value: event.new_value,
            old_value: event.old_value,
            message: event.message,
            object_name: None,
            target_name: None,
            fields: event.fields,
            children: Vec::new(),
        }
    }

    /// Whether this change opened a group.
    pub fn is_group(&self) -> bool {
        self.is_group_start
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of changes in this tree, including the root.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Height of this tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Change::depth).max().unwrap_or(0)
    }

    /// Pre-order traversal of this tree.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Reconstruct the flat event sequence that builds this tree.
    ///
    /// Every group is followed by a synthesized group end carrying its
    /// `time`. Derived names are not part of the output; replaying the
    /// events re-derives them.
    pub fn to_events(&self) -> Vec<RawEvent> {
        let mut events = Vec::with_capacity(self.node_count() * 2);
        self.collect_events(&mut events);
        events
    }

    fn collect_events(&self, events: &mut Vec<RawEvent>) {
        let event = ChangeEvent {
            kind: self.kind.clone(),
            is_group_start: self.is_group_start,
            is_group_end: false,
            time: if self.is_group_start { None } else { self.time },
            object: self.object.clone(),
            target: self.target.clone(),
            new_value: self.new_value.clone(),
            old_value: self.old_value.clone(),
            message: self.message.clone(),
            fields: self.fields.clone(),
        };
        events.push(event.to_raw());

        for child in &self.children {
            child.collect_events(events);
        }

        if self.is_group_start {
            let end = ChangeEvent {
                is_group_end: true,
                time: self.time,
                ..Default::default()
            };
            events.push(end.to_raw());
        }
    }
}

/// Pre-order iterator over a change tree.
pub struct Iter<'a> {
    stack: Vec<&'a Change>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Change;

    fn next(&mut self) -> Option<Self::Item> {
        let change = self.stack.pop()?;
        self.stack.extend(change.children.iter().rev());
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(id: u64, kind: ChangeKind) -> Change {
        Change::from_event(ChangeEvent::of_kind(kind), ChangeId(id), Utc::now())
    }

    fn group(id: u64, kind: ChangeKind, children: Vec<Change>) -> Change {
        let mut change = leaf(id, kind);
        change.is_group_start = true;
        change.children = children;
        change
    }

    #[test]
    fn test_iter_is_pre_order() {
        let tree = group(
            1,
            ChangeKind::Action,
            vec![
                group(2, ChangeKind::Reaction, vec![leaf(3, ChangeKind::Update)]),
                leaf(4, ChangeKind::Add),
            ],
        );

        let ids: Vec<u64> = tree.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert!(tree.is_group());
        assert!(tree.has_children());
    }

    #[test]
    fn test_to_events_brackets_groups() {
        let mut tree = group(1, ChangeKind::Action, vec![leaf(2, ChangeKind::Update)]);
        tree.time = Some(12.0);

        let events: Vec<Value> = tree.to_events().into_iter().map(RawEvent::into_value).collect();
        assert_eq!(
            events,
            vec![
                json!({"type": "action", "spyReportStart": true}),
                json!({"type": "update"}),
                json!({"spyReportEnd": true, "time": 12.0}),
            ]
        );
    }

    #[test]
    fn test_event_fields_cannot_shadow_record_keys() {
        let raw = json!({
            "type": "action",
            "spyReportStart": true,
            "id": "foreign",
            "timestamp": 0,
            "children": [9],
            "objectName": "fake",
            "targetName": "fake",
            "time": "slow",
            "name": "increment",
        });
        let event = ChangeEvent::from_fields(raw.as_object().cloned().unwrap());
        let mut change = Change::from_event(event, ChangeId(3), Utc::now());
        change.target_name = Some("Counter@1".to_string());
        change.time = Some(2.0);

        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["id"], json!(3));
        assert_eq!(value["children"], json!([]));
        assert_eq!(value["targetName"], json!("Counter@1"));
        assert_eq!(value["time"], json!(2.0));
        assert_eq!(value["name"], json!("increment"));
        assert!(value.get("objectName").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let mut change = leaf(7, ChangeKind::Update);
        change.new_value = Some(json!(1));
        change.object_name = Some("Store@1".to_string());
        change.fields.insert("name".to_string(), json!("count"));

        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["type"], json!("update"));
        assert_eq!(value["newValue"], json!(1));
        assert_eq!(value["objectName"], json!("Store@1"));
        assert_eq!(value["name"], json!("count"));
        assert_eq!(value["children"], json!([]));
    }
}
