//! Raw collider signals and logical zone events

use crate::entity::{ColliderId, EntityRef, EntitySnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Phase of a raw per-collider overlap signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPhase {
    /// Collider started overlapping the zone shape
    Begin,
    /// Collider stopped overlapping the zone shape
    End,
}

/// A raw overlap signal as delivered by the collision host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawOverlap {
    /// The zone's own shape
    pub zone_shape: ColliderId,
    /// The collider that started or stopped overlapping it
    pub other: ColliderId,
    /// Begin or end
    pub phase: OverlapPhase,
}

impl RawOverlap {
    /// Create a begin signal
    pub fn begin(zone_shape: ColliderId, other: ColliderId) -> Self {
        Self {
            zone_shape,
            other,
            phase: OverlapPhase::Begin,
        }
    }

    /// Create an end signal
    pub fn end(zone_shape: ColliderId, other: ColliderId) -> Self {
        Self {
            zone_shape,
            other,
            phase: OverlapPhase::End,
        }
    }

    pub fn is_begin(&self) -> bool {
        self.phase == OverlapPhase::Begin
    }
}

/// Identity of a zone as seen by observers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneRef {
    /// The zone's collision shape, which also identifies the zone
    pub shape: ColliderId,
    /// Zone name, matched by name filters
    pub name: Arc<str>,
}

impl ZoneRef {
    pub fn new(shape: ColliderId, name: impl Into<Arc<str>>) -> Self {
        Self {
            shape,
            name: name.into(),
        }
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (shape {})", self.name, self.shape.0)
    }
}

/// Type of logical zone event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneEventType {
    /// First collider of the entity entered the zone
    Entered,
    /// Last collider of the entity left the zone
    Left,
}

/// A deduplicated per-entity zone transition
#[derive(Debug, Clone)]
pub struct ZoneEvent {
    /// Type of event
    pub event_type: ZoneEventType,
    /// The zone that changed
    pub zone: ZoneRef,
    /// Collider whose raw signal caused the transition
    pub collider: ColliderId,
    /// The entity, captured at the transition
    pub entity: EntitySnapshot,
}

impl ZoneEvent {
    /// Create an entered event
    pub fn entered(zone: ZoneRef, collider: ColliderId, entity: EntitySnapshot) -> Self {
        Self {
            event_type: ZoneEventType::Entered,
            zone,
            collider,
            entity,
        }
    }

    /// Create a left event
    pub fn left(zone: ZoneRef, collider: ColliderId, entity: EntitySnapshot) -> Self {
        Self {
            event_type: ZoneEventType::Left,
            zone,
            collider,
            entity,
        }
    }

    pub fn is_entered(&self) -> bool {
        self.event_type == ZoneEventType::Entered
    }

    pub fn is_left(&self) -> bool {
        self.event_type == ZoneEventType::Left
    }

    pub fn entity_ref(&self) -> EntityRef {
        self.entity.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;

    #[test]
    fn test_event_creation() {
        let zone = ZoneRef::new(ColliderId(1), "Vault");
        let entity = EntitySnapshot::new(EntityRef::Generic(EntityId(9)), "Goblin_1");

        let event = ZoneEvent::entered(zone.clone(), ColliderId(4), entity);
        assert!(event.is_entered());
        assert!(!event.is_left());
        assert_eq!(event.zone, zone);
        assert_eq!(event.entity_ref(), EntityRef::Generic(EntityId(9)));
    }

    #[test]
    fn test_raw_overlap() {
        assert!(RawOverlap::begin(ColliderId(1), ColliderId(2)).is_begin());
        assert!(!RawOverlap::end(ColliderId(1), ColliderId(2)).is_begin());
    }
}
