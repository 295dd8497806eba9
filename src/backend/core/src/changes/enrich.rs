//! Per-kind derived fields.

use super::change::Change;
use super::kind::ChangeKind;
use super::names::{name_for_this, observable_name, NameResolver, ValueFormatter};

/// Fills in display names and formatted values according to a change's kind.
#[derive(Debug, Clone, Default)]
pub struct TypeEnricher {
    formatter: ValueFormatter,
}

impl TypeEnricher {
    pub fn new(formatter: ValueFormatter) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Derive the kind-specific fields of `change` in place.
    pub fn enrich(&self, change: &mut Change, resolver: &dyn NameResolver) {
        let Some(kind) = &change.kind else {
            return;
        };

        match kind {
            ChangeKind::Action | ChangeKind::Transaction => {
                change.target_name = Some(name_for_this(resolver, change.target.as_ref()));
            }
            ChangeKind::ScheduledReaction | ChangeKind::Reaction => {
                change.object_name = Some(observable_name(resolver, change.object.as_ref()));
            }
            ChangeKind::Compute => {
                change.object_name = Some(observable_name(resolver, change.object.as_ref()));
                change.target_name = Some(name_for_this(resolver, change.target.as_ref()));
            }
            ChangeKind::Update => {
                change.object_name = Some(observable_name(resolver, change.object.as_ref()));
                change.new_value = change.new_value.take().map(|v| self.formatter.format(v));
                change.old_value = change.old_value.take().map(|v| self.formatter.format(v));
            }
            ChangeKind::Splice => {
                change.object_name = Some(observable_name(resolver, change.object.as_ref()));
            }
            ChangeKind::Add | ChangeKind::Create => {
                change.object_name = Some(observable_name(resolver, change.object.as_ref()));
                change.new_value = change.new_value.take().map(|v| self.formatter.format(v));
            }
            ChangeKind::Delete => {
                change.object_name = Some(observable_name(resolver, change.object.as_ref()));
                change.old_value = change.old_value.take().map(|v| self.formatter.format(v));
            }
            // The message travels verbatim.
            ChangeKind::Error => {}
            ChangeKind::Other(_) => {}
        }
    }
}
