//! Zone occupancy tracking
//!
//! A [`ZoneTracker`] turns the raw per-collider overlap signals of one zone
//! shape into exactly one `Entered` and one `Left` event per logical entity
//! and occupancy transition. Each occupant keeps a count of its colliders
//! currently overlapping the shape; events fire only on the 0 -> 1 and
//! 1 -> 0 edges of that count.
//!
//! Begin and end signals are deliberately checked differently. Within one
//! physics step the host may deliver the signals of a multi-collider entity
//! out of order, e.g. begin(A), end(A) because an enter handler deactivated
//! the entity, then begin(B), begin(C) for the already inactive entity.
//! A begin signal is therefore accepted only from an active, enabled
//! collider, while an end signal is always counted if its entity is inside.

use crate::entity::{ColliderId, EntityRef};
use crate::events::{RawOverlap, ZoneEvent, ZoneRef};
use crate::host::{ColliderWorld, Scene};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use zone_event::{Listeners, SubscriberId};

/// Tag carried by zone shapes and other detectors
pub const DETECTOR_TAG: &str = "Detector";

/// Tag carried by transient non-entity colliders
pub const DROPLET_TAG: &str = "Droplet";

/// Colliders with any of these tags never count as zone occupants
pub const IGNORED_TAGS: [&str; 2] = [DETECTOR_TAG, DROPLET_TAG];

/// Shared, cloneable subscription point of a zone.
///
/// Rules hold handles, never the tracker itself, so a zone can be observed
/// by any number of rules and a rule can observe any number of zones.
#[derive(Clone)]
pub struct ZoneHandle {
    zone: ZoneRef,
    entered: Listeners<ZoneEvent>,
    left: Listeners<ZoneEvent>,
}

impl ZoneHandle {
    fn new(zone: ZoneRef) -> Self {
        Self {
            zone,
            entered: Listeners::new(),
            left: Listeners::new(),
        }
    }

    pub fn zone(&self) -> &ZoneRef {
        &self.zone
    }

    pub fn name(&self) -> &str {
        &self.zone.name
    }

    pub fn shape(&self) -> ColliderId {
        self.zone.shape
    }

    /// Subscribe to `Entered` events
    pub fn on_entered<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&ZoneEvent) + Send + Sync + 'static,
    {
        self.entered.subscribe(handler)
    }

    /// Subscribe to `Left` events
    pub fn on_left<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&ZoneEvent) + Send + Sync + 'static,
    {
        self.left.subscribe(handler)
    }

    pub fn unsubscribe_entered(&self, id: SubscriberId) -> bool {
        self.entered.unsubscribe(id)
    }

    pub fn unsubscribe_left(&self, id: SubscriberId) -> bool {
        self.left.unsubscribe(id)
    }

    /// Number of `(entered, left)` subscribers
    pub fn subscriber_counts(&self) -> (usize, usize) {
        (self.entered.len(), self.left.len())
    }
}

impl fmt::Debug for ZoneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneHandle")
            .field("zone", &self.zone)
            .field("entered_subscribers", &self.entered.len())
            .field("left_subscribers", &self.left.len())
            .finish()
    }
}

/// Per-zone occupancy tracker
pub struct ZoneTracker {
    handle: ZoneHandle,
    /// Entity -> number of its colliders overlapping the shape (always >= 1)
    occupants: HashMap<EntityRef, u32>,
}

impl ZoneTracker {
    /// Create a tracker for a zone shape
    pub fn new(name: impl Into<Arc<str>>, shape: ColliderId) -> Self {
        Self {
            handle: ZoneHandle::new(ZoneRef::new(shape, name)),
            occupants: HashMap::new(),
        }
    }

    /// Create a tracker, warning if the host does not treat the shape as a sensor
    pub fn attach<W: ColliderWorld + ?Sized>(
        world: &W,
        name: impl Into<Arc<str>>,
        shape: ColliderId,
    ) -> Self {
        let tracker = Self::new(name, shape);
        if !world.is_sensor(shape) {
            log::warn!(
                "Zone {} is not a sensor shape, overlaps may be ignored",
                tracker.zone()
            );
        }
        tracker
    }

    /// Get a subscription handle for this zone
    pub fn handle(&self) -> ZoneHandle {
        self.handle.clone()
    }

    pub fn zone(&self) -> &ZoneRef {
        &self.handle.zone
    }

    pub fn shape(&self) -> ColliderId {
        self.handle.zone.shape
    }

    /// Check if an entity is currently inside
    pub fn contains(&self, entity: EntityRef) -> bool {
        self.occupants.contains_key(&entity)
    }

    /// Number of the entity's colliders currently inside (0 if outside)
    pub fn colliders_inside(&self, entity: EntityRef) -> u32 {
        self.occupants.get(&entity).copied().unwrap_or(0)
    }

    /// Number of entities currently inside
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    /// Entities currently inside, in no particular order
    pub fn occupants(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.occupants.keys().copied()
    }

    /// Route a raw signal to the begin or end handler.
    ///
    /// Returns `true` if a logical event was emitted.
    pub fn handle_raw<W: Scene + ?Sized>(&mut self, world: &W, raw: &RawOverlap) -> bool {
        if raw.zone_shape != self.shape() {
            log::warn!(
                "Zone {}: dropping signal addressed to shape {:?}",
                self.zone(),
                raw.zone_shape
            );
            return false;
        }

        if raw.is_begin() {
            self.on_raw_overlap_begin(world, raw.other)
        } else {
            self.on_raw_overlap_end(world, raw.other)
        }
    }

    /// A collider started overlapping the zone shape.
    ///
    /// Returns `true` if this made its entity enter the zone.
    pub fn on_raw_overlap_begin<W: Scene + ?Sized>(
        &mut self,
        world: &W,
        collider: ColliderId,
    ) -> bool {
        // The end signal for an inactive or disabled collider has already
        // been delivered, so this begin is stale.
        if !world.is_active_in_hierarchy(collider) {
            log::trace!(
                "Zone {}: ignoring begin from inactive collider {:?}",
                self.zone(),
                collider
            );
            return false;
        }
        if !world.is_enabled(collider) {
            log::trace!(
                "Zone {}: ignoring begin from disabled collider {:?}",
                self.zone(),
                collider
            );
            return false;
        }

        let Some(entity) = Self::resolve(world, collider) else {
            return false;
        };

        if let Some(count) = self.occupants.get_mut(&entity) {
            *count += 1;
            return false;
        }

        self.occupants.insert(entity, 1);
        log::debug!("Zone {}: {} entered", self.zone(), entity);

        if !self.handle.entered.is_empty() {
            let event = ZoneEvent::entered(self.zone().clone(), collider, world.snapshot(entity));
            self.handle.entered.emit(&event);
        }
        true
    }

    /// A collider stopped overlapping the zone shape.
    ///
    /// Returns `true` if this made its entity leave the zone.
    pub fn on_raw_overlap_end<W: Scene + ?Sized>(
        &mut self,
        world: &W,
        collider: ColliderId,
    ) -> bool {
        // No liveness checks: the collider may already be deactivated or
        // destroyed, and its exit must still be counted.
        let Some(entity) = Self::resolve(world, collider) else {
            return false;
        };

        let Some(count) = self.occupants.get_mut(&entity) else {
            log::trace!("Zone {}: ignoring end for {} which is not inside", self.zone(), entity);
            return false;
        };

        *count -= 1;
        if *count > 0 {
            return false;
        }

        self.occupants.remove(&entity);
        log::debug!("Zone {}: {} left", self.zone(), entity);

        if !self.handle.left.is_empty() {
            let event = ZoneEvent::left(self.zone().clone(), collider, world.snapshot(entity));
            self.handle.left.emit(&event);
        }
        true
    }

    /// Tag exclusion and owner resolution shared by both signal phases
    fn resolve<W: Scene + ?Sized>(world: &W, collider: ColliderId) -> Option<EntityRef> {
        if IGNORED_TAGS.iter().any(|tag| world.has_tag(collider, tag)) {
            return None;
        }

        let entity = world.resolve_owning_entity(collider);
        if entity.is_none() {
            log::trace!("Collider {:?} belongs to no recognized entity", collider);
        }
        entity
    }
}

impl fmt::Debug for ZoneTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneTracker")
            .field("zone", self.zone())
            .field("occupant_count", &self.occupants.len())
            .finish()
    }
}
