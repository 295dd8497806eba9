//! Change Tree Reconstruction
//!
//! Ingestion pipeline, one stage per module:
//!
//! - **`clock`**: ids and ingestion timestamps.
//! - **`normalize`**: own-field copies of raw spy events, runtime noise removed.
//! - **`enrich`**: per-kind display names and formatted values, using the
//!   resolvers and formatter in **`names`**.
//! - **`aggregator`**: the group stack that nests changes and emits completed
//!   trees to a **`sink`**.
//! - **`shared`**: a lock-serialized handle for multi-producer hosts.

pub mod aggregator;
pub mod change;
pub mod clock;
pub mod enrich;
pub mod event;
pub mod kind;
pub mod names;
pub mod normalize;
pub mod shared;
pub mod sink;

pub use aggregator::{AggregatorStats, ChangeAggregator};
pub use change::{Change, ChangeId};
pub use clock::ChangeClock;
pub use enrich::TypeEnricher;
pub use event::{ChangeEvent, RawEvent};
pub use kind::ChangeKind;
pub use names::{name_for_this, observable_name, DebugNameResolver, NameResolver, ValueFormatter};
pub use normalize::FieldNormalizer;
pub use shared::SharedChangeAggregator;
pub use sink::{ChangeBuffer, ChangeSink};
