//! Destinations for completed change trees.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::change::Change;

/// Receives each completed root-level change tree, in completion order.
///
/// Called synchronously from inside `push`; implementations should hand the
/// tree off quickly and must not call back into the aggregator.
pub trait ChangeSink {
    fn emit(&mut self, change: Change);
}

impl<F> ChangeSink for F
where
    F: FnMut(Change),
{
    fn emit(&mut self, change: Change) {
        self(change)
    }
}

/// Forwards trees to an async consumer.
impl ChangeSink for mpsc::UnboundedSender<Change> {
    fn emit(&mut self, change: Change) {
        if let Err(mpsc::error::SendError(change)) = self.send(change) {
            tracing::warn!(change_id = %change.id, "Change receiver dropped; discarding tree");
        }
    }
}

/// A cloneable in-memory collector of emitted trees.
#[derive(Debug, Clone, Default)]
pub struct ChangeBuffer {
    inner: Arc<Mutex<Vec<Change>>>,
}

impl ChangeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<Change> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Copy of everything collected so far.
    pub fn snapshot(&self) -> Vec<Change> {
        self.inner.lock().clone()
    }
}

impl ChangeSink for ChangeBuffer {
    fn emit(&mut self, change: Change) {
        self.inner.lock().push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::change::ChangeId;
    use crate::changes::event::ChangeEvent;
    use chrono::Utc;

    fn change(id: u64) -> Change {
        Change::from_event(ChangeEvent::default(), ChangeId(id), Utc::now())
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |c: Change| seen.push(c.id);
            sink.emit(change(1));
            sink.emit(change(2));
        }
        assert_eq!(seen, vec![ChangeId(1), ChangeId(2)]);
    }

    #[test]
    fn test_buffer_clones_share_storage() {
        let buffer = ChangeBuffer::new();
        let mut writer = buffer.clone();

        writer.emit(change(1));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.snapshot()[0].id, ChangeId(1));

        let taken = buffer.take();
        assert_eq!(taken.len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (mut tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tx.emit(change(1));
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(change(1));
        tx.emit(change(2));
        drop(tx);

        assert_eq!(rx.recv().await.map(|c| c.id), Some(ChangeId(1)));
        assert_eq!(rx.recv().await.map(|c| c.id), Some(ChangeId(2)));
        assert!(rx.recv().await.is_none());
    }
}
