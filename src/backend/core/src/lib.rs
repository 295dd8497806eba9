//! # changetrace
//!
//! Rebuilds the nested structure of a reactive-state runtime's activity from
//! its flat spy event feed.
//!
//! The runtime reports every action, transaction, reaction, computation and
//! mutation as one event, marking scopes with group start/end flags. The
//! [`ChangeAggregator`](changes::ChangeAggregator) turns that feed back into
//! trees of [`Change`](changes::Change) records and hands each completed root
//! tree to a caller-supplied [`ChangeSink`](changes::ChangeSink).
//!
//! ```rust
//! use changetrace_core::prelude::*;
//! use serde_json::json;
//!
//! let trees = ChangeBuffer::new();
//! let mut aggregator = ChangeAggregator::new(trees.clone());
//!
//! aggregator.push(&RawEvent::new(json!({"type": "action", "spyReportStart": true})));
//! aggregator.push(&RawEvent::new(json!({"type": "update", "newValue": 1, "oldValue": 0})));
//! aggregator.push(&RawEvent::new(json!({"spyReportEnd": true, "time": 5})));
//!
//! let tree = &trees.take()[0];
//! assert_eq!(tree.children.len(), 1);
//! assert_eq!(tree.time, Some(5.0));
//! ```

pub mod changes;
pub mod config;
pub mod error;
pub mod telemetry;

pub use error::{ChangeTraceError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::changes::{
        AggregatorStats, Change, ChangeAggregator, ChangeBuffer, ChangeEvent, ChangeId,
        ChangeKind, ChangeSink, DebugNameResolver, NameResolver, RawEvent,
        SharedChangeAggregator,
    };
    pub use crate::config::{AggregatorConfig, Config};
    pub use crate::error::{ChangeTraceError, Result};
}
