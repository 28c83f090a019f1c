//! Capabilities the surrounding engine provides to the zone core.
//!
//! The core never owns colliders or entities. It queries the host through
//! these traits while handling a raw overlap signal and never caches the
//! answers across signals.

use crate::entity::{ColliderId, EntityId, EntityKind, EntityRef, EntitySnapshot, RESOLUTION_ORDER};

/// Collider-level queries answered by the collision host
pub trait ColliderWorld {
    /// Whether the collider's game object is active in the object hierarchy
    fn is_active_in_hierarchy(&self, collider: ColliderId) -> bool;

    /// Whether the collider component itself is enabled
    fn is_enabled(&self, collider: ColliderId) -> bool;

    /// Whether the collider's game object carries `tag` (exact match)
    fn has_tag(&self, collider: ColliderId, tag: &str) -> bool;

    /// Whether the collider only detects overlaps (no collision response)
    fn is_sensor(&self, _collider: ColliderId) -> bool {
        true
    }

    /// Owner of the collider's root object, if it is an entity of `kind`
    fn resolve_kind(&self, collider: ColliderId, kind: EntityKind) -> Option<EntityId>;

    /// Resolve the logical entity owning a collider, trying each kind in
    /// [`RESOLUTION_ORDER`]
    fn resolve_owning_entity(&self, collider: ColliderId) -> Option<EntityRef> {
        RESOLUTION_ORDER.iter().find_map(|&kind| {
            self.resolve_kind(collider, kind)
                .map(|id| EntityRef::new(kind, id))
        })
    }
}

/// Entity-level queries answered by the entity model
pub trait EntityDirectory {
    fn name_of(&self, entity: EntityRef) -> String;

    fn type_id_of(&self, entity: EntityRef) -> String;

    fn world_position_of(&self, entity: EntityRef) -> [f32; 3];

    /// Capture everything filters and actions need about an entity
    fn snapshot(&self, entity: EntityRef) -> EntitySnapshot {
        EntitySnapshot::new(entity, self.name_of(entity))
            .with_type_id(self.type_id_of(entity))
            .with_position(self.world_position_of(entity))
    }
}

/// Everything a [`crate::ZoneTracker`] needs from its host
pub trait Scene: ColliderWorld + EntityDirectory {}

impl<T: ColliderWorld + EntityDirectory + ?Sized> Scene for T {}
