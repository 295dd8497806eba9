//! Aggregator metrics.
//!
//! Counters are recorded through the `metrics` facade. This crate installs no
//! recorder; a host that wants them exported installs one (for example a
//! Prometheus exporter) before building aggregators.

use metrics::{counter, describe_counter};

use crate::changes::ChangeKind;

/// Raw events pushed into an aggregator.
pub const EVENTS_TOTAL: &str = "changetrace_events_total";
/// Completed root trees handed to a sink.
pub const TREES_EMITTED_TOTAL: &str = "changetrace_trees_emitted_total";
/// Nodes contained in emitted trees.
pub const TREE_NODES_TOTAL: &str = "changetrace_tree_nodes_total";
/// Group-end events that arrived with no open group.
pub const GROUP_MISMATCHES_TOTAL: &str = "changetrace_group_mismatches_total";
/// Error events that flushed a partial tree.
pub const ERROR_FLUSHES_TOTAL: &str = "changetrace_error_flushes_total";
/// Open groups thrown away by `reset`.
pub const GROUPS_DISCARDED_TOTAL: &str = "changetrace_groups_discarded_total";

/// Register all metric descriptions.
pub fn register_metric_descriptions() {
    describe_counter!(EVENTS_TOTAL, "Total number of raw spy events ingested");
    describe_counter!(TREES_EMITTED_TOTAL, "Total number of completed change trees emitted");
    describe_counter!(TREE_NODES_TOTAL, "Total number of change records in emitted trees");
    describe_counter!(
        GROUP_MISMATCHES_TOTAL,
        "Total number of group ends discarded for lack of a matching start"
    );
    describe_counter!(
        ERROR_FLUSHES_TOTAL,
        "Total number of partial trees flushed by an error event"
    );
    describe_counter!(GROUPS_DISCARDED_TOTAL, "Total number of open groups discarded by reset");
}

/// Counter helpers used by the aggregator.
pub struct AggregatorMetrics;

impl AggregatorMetrics {
    /// Record one ingested event, labelled by its kind.
    pub fn event(kind: Option<&ChangeKind>) {
        counter!(EVENTS_TOTAL, "kind" => kind_label(kind)).increment(1);
    }

    /// Record one emitted tree and its size.
    pub fn tree_emitted(nodes: usize) {
        counter!(TREES_EMITTED_TOTAL).increment(1);
        counter!(TREE_NODES_TOTAL).increment(nodes as u64);
    }

    /// Record one unmatched group end.
    pub fn group_mismatch() {
        counter!(GROUP_MISMATCHES_TOTAL).increment(1);
    }

    /// Record one error flush.
    pub fn error_flush() {
        counter!(ERROR_FLUSHES_TOTAL).increment(1);
    }

    /// Record groups discarded by a reset.
    pub fn groups_discarded(count: usize) {
        counter!(GROUPS_DISCARDED_TOTAL).increment(count as u64);
    }
}

/// Label value for an event's kind. Undocumented kinds share `"other"` and
/// kindless events use `"none"`.
pub fn kind_label(kind: Option<&ChangeKind>) -> &'static str {
    kind.map_or("none", ChangeKind::label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_label_is_bounded() {
        assert_eq!(kind_label(Some(&ChangeKind::Update)), "update");
        assert_eq!(kind_label(Some(&ChangeKind::ScheduledReaction)), "scheduled-reaction");
        assert_eq!(kind_label(Some(&ChangeKind::parse("observe"))), "other");
        assert_eq!(kind_label(Some(&ChangeKind::Other("x".repeat(64)))), "other");
        assert_eq!(kind_label(None), "none");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        register_metric_descriptions();
        AggregatorMetrics::event(Some(&ChangeKind::Update));
        AggregatorMetrics::event(None);
        AggregatorMetrics::tree_emitted(3);
        AggregatorMetrics::group_mismatch();
        AggregatorMetrics::error_flush();
        AggregatorMetrics::groups_discarded(2);
    }
}
