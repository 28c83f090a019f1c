//! Colliders and the logical entities that own them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a single physical collider supplied by the collision host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// Stable handle to a logical entity, unique within its kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Recognized kinds of logical entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Multi-part linked entity (convoy, train of wagons)
    Convoy,
    /// Any other game entity
    Generic,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Convoy => "convoy",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which a collider's owner is resolved
pub const RESOLUTION_ORDER: [EntityKind; 2] = [EntityKind::Convoy, EntityKind::Generic];

/// A logical entity: the unit of zone occupancy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityRef {
    Convoy(EntityId),
    Generic(EntityId),
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        match kind {
            EntityKind::Convoy => Self::Convoy(id),
            EntityKind::Generic => Self::Generic(id),
        }
    }

    pub fn id(&self) -> EntityId {
        match *self {
            Self::Convoy(id) | Self::Generic(id) => id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Convoy(_) => EntityKind::Convoy,
            Self::Generic(_) => EntityKind::Generic,
        }
    }

    pub fn is_convoy(&self) -> bool {
        matches!(self, Self::Convoy(_))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind(), self.id().0)
    }
}

/// Entity state captured when a logical zone event is emitted.
///
/// Filters and trigger actions read from the snapshot, so they see the
/// entity as it was at the transition even if the host destroys it later
/// in the same step.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// The logical entity
    pub entity: EntityRef,
    /// Display name of the entity's root object
    pub name: String,
    /// Stable identifier of the entity's concrete type
    pub type_id: String,
    /// World position at the time of the event
    pub position: [f32; 3],
}

impl EntitySnapshot {
    pub fn new(entity: EntityRef, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
            type_id: String::new(),
            position: [0.0, 0.0, 0.0],
        }
    }

    pub fn with_type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = type_id.into();
        self
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref_kind_roundtrip() {
        for kind in RESOLUTION_ORDER {
            let entity = EntityRef::new(kind, EntityId(7));
            assert_eq!(entity.kind(), kind);
            assert_eq!(entity.id(), EntityId(7));
        }
    }

    #[test]
    fn test_same_id_different_kind_is_distinct() {
        let convoy = EntityRef::Convoy(EntityId(1));
        let generic = EntityRef::Generic(EntityId(1));

        assert_ne!(convoy, generic);
        assert!(convoy.is_convoy());
        assert!(!generic.is_convoy());
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityRef::Generic(EntityId(3)).to_string(), "generic#3");
        assert_eq!(EntityKind::Convoy.to_string(), "convoy");
    }
}
