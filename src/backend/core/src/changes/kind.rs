//! Change kinds reported by the runtime's spy feed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The discriminant of a spy event.
///
/// Kinds the runtime does not document map to [`ChangeKind::Other`] and pass
/// through the aggregator unenriched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeKind {
    Action,
    Transaction,
    Reaction,
    Add,
    Delete,
    Update,
    Splice,
    Compute,
    Error,
    ScheduledReaction,
    Create,
    Other(String),
}

impl ChangeKind {
    /// Every kind the runtime documents, in the order it lists them.
    pub const KNOWN: [ChangeKind; 11] = [
        ChangeKind::Action,
        ChangeKind::Transaction,
        ChangeKind::Reaction,
        ChangeKind::Add,
        ChangeKind::Delete,
        ChangeKind::Update,
        ChangeKind::Splice,
        ChangeKind::Compute,
        ChangeKind::Error,
        ChangeKind::ScheduledReaction,
        ChangeKind::Create,
    ];

    /// Parse a wire name. Unknown names become [`ChangeKind::Other`].
    pub fn parse(name: &str) -> Self {
        match name {
            "action" => Self::Action,
            "transaction" => Self::Transaction,
            "reaction" => Self::Reaction,
            "add" => Self::Add,
            "delete" => Self::Delete,
            "update" => Self::Update,
            "splice" => Self::Splice,
            "compute" => Self::Compute,
            "error" => Self::Error,
            "scheduled-reaction" => Self::ScheduledReaction,
            "create" => Self::Create,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => known.label(),
        }
    }

    /// A bounded name for this kind: the wire name of a documented kind, or
    /// `"other"` for everything else.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Transaction => "transaction",
            Self::Reaction => "reaction",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Splice => "splice",
            Self::Compute => "compute",
            Self::Error => "error",
            Self::ScheduledReaction => "scheduled-reaction",
            Self::Create => "create",
            Self::Other(_) => "other",
        }
    }

    /// Whether this is one of the documented kinds.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for ChangeKind {
    fn from(name: String) -> Self {
        match Self::parse(&name) {
            Self::Other(_) => Self::Other(name),
            known => known,
        }
    }
}

impl From<ChangeKind> for String {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
