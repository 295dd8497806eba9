//! The group stack: rebuilds nested change trees from a flat spy feed.
//!
//! Events carry no parent pointers. Nesting is recovered from the order of
//! events and their group start/end flags alone:
//!
//! ```text
//! action (start)            ┐
//!   update                  │ one tree, emitted when the
//!   reaction (start)        │ outermost group closes
//!     compute               │
//!   (end)                   │
//! (end, time = 5)           ┘
//! ```
//!
//! Open groups live on the stack, owned by the aggregator. A group is moved
//! into its parent's children when it closes, or handed to the sink when it
//! was the outermost one. Every event arriving while a group is open lands in
//! that group or one of its descendants, so moving a group at close time
//! yields the same child order as linking it when it opened.

use serde::Serialize;
use std::sync::Arc;

use super::change::Change;
use super::clock::ChangeClock;
use super::enrich::TypeEnricher;
use super::event::RawEvent;
use super::kind::ChangeKind;
use super::names::{DebugNameResolver, NameResolver, ValueFormatter};
use super::normalize::FieldNormalizer;
use super::sink::ChangeSink;
use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::telemetry::AggregatorMetrics;

/// Counters describing what an aggregator has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStats {
    /// Raw events pushed, including discarded ones.
    pub events_ingested: u64,
    /// Change records created (group ends never become records).
    pub changes_created: u64,
    /// Root trees handed to the sink.
    pub trees_emitted: u64,
    /// Group ends discarded because no group was open.
    pub mismatched_ends: u64,
    /// Error events that flushed a partial tree.
    pub error_flushes: u64,
    /// Open groups thrown away by `reset`.
    pub groups_discarded: u64,
}

/// Turns a flat, ordered stream of spy events into completed change trees.
///
/// Single-threaded and synchronous: each `push` runs to completion and calls
/// the sink zero or one times before returning. Wrap it in a
/// [`SharedChangeAggregator`](super::SharedChangeAggregator) to feed it from
/// several threads.
pub struct ChangeAggregator<S> {
    sink: S,
    stack: Vec<Change>,
    clock: ChangeClock,
    normalizer: FieldNormalizer,
    enricher: TypeEnricher,
    resolver: Arc<dyn NameResolver + Send + Sync>,
    report_mismatched_ends: bool,
    stats: AggregatorStats,
}

impl<S: ChangeSink> ChangeAggregator<S> {
    /// Create an aggregator with the default configuration.
    pub fn new(sink: S) -> Self {
        let config = AggregatorConfig::default();
        Self {
            sink,
            stack: Vec::new(),
            clock: ChangeClock::new(),
            normalizer: FieldNormalizer::lenient(&config),
            enricher: TypeEnricher::new(ValueFormatter::from_config(&config)),
            resolver: Arc::new(DebugNameResolver::from_config(&config)),
            report_mismatched_ends: config.report_mismatched_ends,
            stats: AggregatorStats::default(),
        }
    }

    /// Create an aggregator from explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails if a noise key pattern does not compile or the truncation limits
    /// are inconsistent.
    pub fn with_config(sink: S, config: &AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sink,
            stack: Vec::new(),
            clock: ChangeClock::new(),
            normalizer: FieldNormalizer::try_new(config)?,
            enricher: TypeEnricher::new(ValueFormatter::from_config(config)),
            resolver: Arc::new(DebugNameResolver::from_config(config)),
            report_mismatched_ends: config.report_mismatched_ends,
            stats: AggregatorStats::default(),
        })
    }

    /// Replace the name resolver bound to this aggregator.
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: NameResolver + Send + Sync + 'static,
    {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Ingest one raw event using the bound name resolver.
    pub fn push(&mut self, raw: &RawEvent) {
        let resolver = Arc::clone(&self.resolver);
        self.push_with(raw, resolver.as_ref());
    }

    /// Ingest one raw event, resolving names with `resolver`.
    ///
    /// Never fails: unmatched group ends are discarded and error events flush
    /// whatever tree is in progress.
    pub fn push_with(&mut self, raw: &RawEvent, resolver: &dyn NameResolver) {
        let event = self.normalizer.normalize(raw);
        self.stats.events_ingested += 1;
        AggregatorMetrics::event(event.kind.as_ref());

        // End handling comes first, even if the event also claims to start a group.
        if event.is_group_end {
            self.close_group(event.time);
            return;
        }

        let (id, timestamp) = self.clock.tick();
        let mut change = Change::from_event(event, id, timestamp);
        self.stats.changes_created += 1;
        self.enricher.enrich(&mut change, resolver);

        if change.kind == Some(ChangeKind::Error) {
            self.escape(change);
        } else {
            self.place(change);
        }
    }

    /// Drop every open group without emitting anything.
    pub fn reset(&mut self) {
        if self.stack.is_empty() {
            return;
        }
        let discarded = self.stack.len();
        self.stack.clear();
        self.stats.groups_discarded += discarded as u64;
        AggregatorMetrics::groups_discarded(discarded);
        tracing::debug!(discarded, "Change aggregator reset; open groups discarded");
    }

    /// Number of currently open groups.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether no tree is in progress.
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn stats(&self) -> AggregatorStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the aggregator, discarding open groups, and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn close_group(&mut self, time: Option<f64>) {
        let Some(mut group) = self.stack.pop() else {
            self.stats.mismatched_ends += 1;
            AggregatorMetrics::group_mismatch();
            if self.report_mismatched_ends {
                tracing::warn!("Group end without a matching group start; event discarded");
            } else {
                tracing::debug!("Group end without a matching group start; event discarded");
            }
            return;
        };

        // Copied verbatim; an end without a time clears it.
        group.time = time;
        self.attach_or_emit(group);
    }

    fn place(&mut self, change: Change) {
        if change.is_group_start {
            self.stack.push(change);
        } else {
            self.attach_or_emit(change);
        }
    }

    /// Error events abandon every open group: the partial tree is emitted
    /// with the error as the last child of the innermost group.
    fn escape(&mut self, error: Change) {
        let Some(top) = self.stack.last_mut() else {
            self.emit(error);
            return;
        };
        top.children.push(error);

        let depth = self.stack.len();
        let mut open = std::mem::take(&mut self.stack);
        let mut root = None;
        while let Some(group) = open.pop() {
            match open.last_mut() {
                Some(parent) => parent.children.push(group),
                None => root = Some(group),
            }
        }

        self.stats.error_flushes += 1;
        AggregatorMetrics::error_flush();
        tracing::debug!(open_groups = depth, "Error event flushed partial change tree");

        if let Some(root) = root {
            self.emit(root);
        }
    }

    fn attach_or_emit(&mut self, change: Change) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(change),
            None => self.emit(change),
        }
    }

    fn emit(&mut self, root: Change) {
        let nodes = root.node_count();
        self.stats.trees_emitted += 1;
        AggregatorMetrics::tree_emitted(nodes);
        tracing::debug!(change_id = %root.id, kind = ?root.kind, nodes, "Change tree completed");
        self.sink.emit(root);
    }
}

impl<S> std::fmt::Debug for ChangeAggregator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeAggregator")
            .field("depth", &self.stack.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
