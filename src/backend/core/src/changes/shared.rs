//! A lock-serialized aggregator handle for multi-producer hosts.

use parking_lot::Mutex;
use std::sync::Arc;

use super::aggregator::{AggregatorStats, ChangeAggregator};
use super::event::RawEvent;
use super::sink::ChangeSink;

/// Cloneable handle that serializes pushes from several threads into one
/// [`ChangeAggregator`].
///
/// The lock only guarantees that pushes never interleave. Tree shape is still
/// only meaningful if the producers agree on a global event order.
pub struct SharedChangeAggregator<S> {
    inner: Arc<Mutex<ChangeAggregator<S>>>,
}

impl<S: ChangeSink> SharedChangeAggregator<S> {
    pub fn new(aggregator: ChangeAggregator<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(aggregator)),
        }
    }

    pub fn push(&self, raw: &RawEvent) {
        self.inner.lock().push(raw);
    }

    /// Push several events without releasing the lock in between.
    pub fn push_batch<'a>(&self, events: impl IntoIterator<Item = &'a RawEvent>) {
        let mut aggregator = self.inner.lock();
        for raw in events {
            aggregator.push(raw);
        }
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn depth(&self) -> usize {
        self.inner.lock().depth()
    }

    pub fn stats(&self) -> AggregatorStats {
        self.inner.lock().stats()
    }
}

impl<S> Clone for SharedChangeAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ChangeSink> From<ChangeAggregator<S>> for SharedChangeAggregator<S> {
    fn from(aggregator: ChangeAggregator<S>) -> Self {
        Self::new(aggregator)
    }
}
