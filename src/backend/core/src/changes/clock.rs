//! Identity and clock for ingested changes.

use chrono::{DateTime, Utc};

use super::change::ChangeId;

/// Hands out change ids and ingestion timestamps.
///
/// Each aggregator owns its own clock, so ids start at 1 per instance and are
/// never reused within it.
#[derive(Debug)]
pub struct ChangeClock {
    last: u64,
}

impl ChangeClock {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Next id and the current wall-clock time.
    pub fn tick(&mut self) -> (ChangeId, DateTime<Utc>) {
        self.last += 1;
        (ChangeId(self.last), Utc::now())
    }

    /// The most recently issued id, if any.
    pub fn last_issued(&self) -> Option<ChangeId> {
        (self.last > 0).then_some(ChangeId(self.last))
    }
}

impl Default for ChangeClock {
    fn default() -> Self {
        Self::new()
    }
}
