//! In-memory host scene
//!
//! A small implementation of [`ColliderWorld`] and [`EntityDirectory`] for
//! tools, replays and tests. Cloning a `MemoryScene` yields another handle
//! to the same scene, so a trigger action can deactivate entities while a
//! zone tracker is still querying it.

use crate::entity::{ColliderId, EntityId, EntityKind, EntityRef};
use crate::host::{ColliderWorld, EntityDirectory};
use crate::zone::DETECTOR_TAG;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Entity data held by the scene
#[derive(Debug, Clone)]
pub struct SceneEntity {
    /// Entity reference
    pub entity: EntityRef,
    /// Root object name
    pub name: String,
    /// Concrete type identifier
    pub type_id: String,
    /// World position
    pub position: [f32; 3],
    /// Whether the root object is active
    pub active: bool,
}

/// Collider data held by the scene
#[derive(Debug, Clone)]
pub struct SceneCollider {
    /// Collider ID
    pub id: ColliderId,
    /// Owning entity, if any
    pub owner: Option<EntityRef>,
    /// Object tags
    pub tags: HashSet<String>,
    /// Whether the collider's own object is active
    pub active: bool,
    /// Whether the collider component is enabled
    pub enabled: bool,
    /// Overlap-only shape
    pub sensor: bool,
}

impl SceneCollider {
    fn new(id: ColliderId, owner: Option<EntityRef>) -> Self {
        Self {
            id,
            owner,
            tags: HashSet::new(),
            active: true,
            enabled: true,
            sensor: false,
        }
    }
}

#[derive(Debug, Default)]
struct SceneState {
    next_entity: u64,
    next_collider: u64,
    entities: HashMap<EntityRef, SceneEntity>,
    colliders: HashMap<ColliderId, SceneCollider>,
}

/// Shared in-memory scene
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    state: Arc<RwLock<SceneState>>,
}

impl MemoryScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logical entity with no colliders
    pub fn spawn_entity(
        &self,
        kind: EntityKind,
        name: impl Into<String>,
        type_id: impl Into<String>,
        position: [f32; 3],
    ) -> EntityRef {
        let mut state = self.state.write();
        state.next_entity += 1;
        let entity = EntityRef::new(kind, EntityId(state.next_entity));
        state.entities.insert(
            entity,
            SceneEntity {
                entity,
                name: name.into(),
                type_id: type_id.into(),
                position,
                active: true,
            },
        );
        entity
    }

    /// Attach a new collider to an entity
    pub fn add_collider(&self, owner: EntityRef) -> ColliderId {
        self.insert_collider(Some(owner), |_| {})
    }

    /// Add a collider that belongs to no recognized entity
    pub fn add_loose_collider(&self) -> ColliderId {
        self.insert_collider(None, |_| {})
    }

    /// Add a sensor shape tagged as a detector, as used by zones
    pub fn add_zone_shape(&self) -> ColliderId {
        self.insert_collider(None, |c| {
            c.sensor = true;
            c.tags.insert(DETECTOR_TAG.to_string());
        })
    }

    fn insert_collider(
        &self,
        owner: Option<EntityRef>,
        init: impl FnOnce(&mut SceneCollider),
    ) -> ColliderId {
        let mut state = self.state.write();
        state.next_collider += 1;
        let id = ColliderId(state.next_collider);
        let mut collider = SceneCollider::new(id, owner);
        init(&mut collider);
        state.colliders.insert(id, collider);
        id
    }

    pub fn add_tag(&self, collider: ColliderId, tag: impl Into<String>) {
        if let Some(c) = self.state.write().colliders.get_mut(&collider) {
            c.tags.insert(tag.into());
        }
    }

    pub fn set_sensor(&self, collider: ColliderId, sensor: bool) {
        if let Some(c) = self.state.write().colliders.get_mut(&collider) {
            c.sensor = sensor;
        }
    }

    pub fn set_collider_active(&self, collider: ColliderId, active: bool) {
        if let Some(c) = self.state.write().colliders.get_mut(&collider) {
            c.active = active;
        }
    }

    pub fn set_collider_enabled(&self, collider: ColliderId, enabled: bool) {
        if let Some(c) = self.state.write().colliders.get_mut(&collider) {
            c.enabled = enabled;
        }
    }

    /// Activate or deactivate an entity's root object (and so all its colliders)
    pub fn set_entity_active(&self, entity: EntityRef, active: bool) {
        if let Some(e) = self.state.write().entities.get_mut(&entity) {
            e.active = active;
        }
    }

    pub fn set_position(&self, entity: EntityRef, position: [f32; 3]) {
        if let Some(e) = self.state.write().entities.get_mut(&entity) {
            e.position = position;
        }
    }

    /// Deactivate an entity and disable its colliders.
    ///
    /// The entity stays resolvable so exit signals delivered after the
    /// destruction can still be attributed to it.
    pub fn destroy_entity(&self, entity: EntityRef) {
        let mut state = self.state.write();
        if let Some(e) = state.entities.get_mut(&entity) {
            e.active = false;
        }
        for collider in state.colliders.values_mut() {
            if collider.owner == Some(entity) {
                collider.enabled = false;
            }
        }
    }

    /// Look up an entity by name
    pub fn entity_by_name(&self, name: &str) -> Option<EntityRef> {
        self.state
            .read()
            .entities
            .values()
            .find(|e| e.name == name)
            .map(|e| e.entity)
    }

    /// All colliders of an entity, in creation order
    pub fn colliders_of(&self, entity: EntityRef) -> Vec<ColliderId> {
        let state = self.state.read();
        let mut colliders: Vec<ColliderId> = state
            .colliders
            .values()
            .filter(|c| c.owner == Some(entity))
            .map(|c| c.id)
            .collect();
        colliders.sort();
        colliders
    }

    pub fn entity(&self, entity: EntityRef) -> Option<SceneEntity> {
        self.state.read().entities.get(&entity).cloned()
    }
}

impl ColliderWorld for MemoryScene {
    fn is_active_in_hierarchy(&self, collider: ColliderId) -> bool {
        let state = self.state.read();
        let Some(c) = state.colliders.get(&collider) else {
            return false;
        };
        let owner_active = c
            .owner
            .and_then(|owner| state.entities.get(&owner))
            .map_or(true, |e| e.active);
        c.active && owner_active
    }

    fn is_enabled(&self, collider: ColliderId) -> bool {
        self.state
            .read()
            .colliders
            .get(&collider)
            .map_or(false, |c| c.enabled)
    }

    fn has_tag(&self, collider: ColliderId, tag: &str) -> bool {
        self.state
            .read()
            .colliders
            .get(&collider)
            .map_or(false, |c| c.tags.contains(tag))
    }

    fn is_sensor(&self, collider: ColliderId) -> bool {
        self.state
            .read()
            .colliders
            .get(&collider)
            .map_or(false, |c| c.sensor)
    }

    fn resolve_kind(&self, collider: ColliderId, kind: EntityKind) -> Option<EntityId> {
        self.state
            .read()
            .colliders
            .get(&collider)
            .and_then(|c| c.owner)
            .filter(|owner| owner.kind() == kind)
            .map(|owner| owner.id())
    }
}

impl EntityDirectory for MemoryScene {
    fn name_of(&self, entity: EntityRef) -> String {
        self.state
            .read()
            .entities
            .get(&entity)
            .map(|e| e.name.clone())
            .unwrap_or_default()
    }

    fn type_id_of(&self, entity: EntityRef) -> String {
        self.state
            .read()
            .entities
            .get(&entity)
            .map(|e| e.type_id.clone())
            .unwrap_or_default()
    }

    fn world_position_of(&self, entity: EntityRef) -> [f32; 3] {
        self.state
            .read()
            .entities
            .get(&entity)
            .map_or([0.0, 0.0, 0.0], |e| e.position)
    }
}
