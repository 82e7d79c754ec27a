use crate::entity::{Entity, EntityKind};

/// Result of reducing a single event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// State changes of the event were committed.
    Applied,
    /// The event carries no derivable state (or falls outside a configured
    /// window, or would re-transition a terminal order); nothing was written.
    Ignored(&'static str),
    /// A required entity was not found; the event was dropped without
    /// writing anything.
    Skipped(MissingEntity),
}

/// Entity referenced by an event but absent from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingEntity {
    pub kind: EntityKind,
    pub id: String,
}

impl Outcome {
    pub fn missing<E: Entity>(id: &str) -> Self {
        Self::Skipped(MissingEntity {
            kind: E::KIND,
            id: id.to_string(),
        })
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}
