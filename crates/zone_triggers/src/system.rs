//! Zone system routing raw collision signals to trackers

use crate::entity::ColliderId;
use crate::events::RawOverlap;
use crate::host::{ColliderWorld, Scene};
use crate::zone::{ZoneHandle, ZoneTracker};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owns every zone tracker of a scene, keyed by zone shape
#[derive(Debug, Default)]
pub struct ZoneSystem {
    zones: BTreeMap<ColliderId, ZoneTracker>,
}

impl ZoneSystem {
    /// Create an empty zone system
    pub fn new() -> Self {
        Self {
            zones: BTreeMap::new(),
        }
    }

    /// Create and register a tracker for a zone shape.
    ///
    /// If the shape is already registered its existing handle is returned.
    pub fn add_zone<W: ColliderWorld + ?Sized>(
        &mut self,
        world: &W,
        name: impl Into<Arc<str>>,
        shape: ColliderId,
    ) -> ZoneHandle {
        if let Some(existing) = self.zones.get(&shape) {
            log::warn!("Zone shape {:?} is already registered as {}", shape, existing.zone());
            return existing.handle();
        }

        let tracker = ZoneTracker::attach(world, name, shape);
        let handle = tracker.handle();
        self.zones.insert(shape, tracker);
        handle
    }

    /// Register an existing tracker.
    ///
    /// A tracker already registered for the same shape is kept, since rules
    /// may hold its handle. The returned handle is the registered one.
    pub fn register_zone(&mut self, tracker: ZoneTracker) -> ZoneHandle {
        let shape = tracker.shape();
        if let Some(existing) = self.zones.get(&shape) {
            log::warn!(
                "Zone shape {:?} is already registered as {}, keeping it",
                shape,
                existing.zone()
            );
            return existing.handle();
        }

        let handle = tracker.handle();
        self.zones.insert(shape, tracker);
        handle
    }

    /// Unregister a tracker
    pub fn remove_zone(&mut self, shape: ColliderId) -> Option<ZoneTracker> {
        self.zones.remove(&shape)
    }

    pub fn zone(&self, shape: ColliderId) -> Option<&ZoneTracker> {
        self.zones.get(&shape)
    }

    /// Find a zone by exact name
    pub fn zone_named(&self, name: &str) -> Option<&ZoneTracker> {
        self.zones.values().find(|z| &*z.zone().name == name)
    }

    /// Handles of every registered zone, ordered by shape.
    ///
    /// This is the zone list a scene-wide rule observes.
    pub fn handles(&self) -> Vec<ZoneHandle> {
        self.zones.values().map(ZoneTracker::handle).collect()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Route one raw signal to its zone.
    ///
    /// Returns `true` if a logical event was emitted. Signals for shapes that
    /// are not registered are dropped.
    pub fn handle<W: Scene + ?Sized>(&mut self, world: &W, raw: &RawOverlap) -> bool {
        match self.zones.get_mut(&raw.zone_shape) {
            Some(tracker) => tracker.handle_raw(world, raw),
            None => {
                log::trace!("No zone registered for shape {:?}", raw.zone_shape);
                false
            }
        }
    }

    /// Route a step's raw signals in delivery order.
    ///
    /// Returns the number of logical events emitted.
    pub fn process<W, I>(&mut self, world: &W, signals: I) -> usize
    where
        W: Scene + ?Sized,
        I: IntoIterator<Item = RawOverlap>,
    {
        signals
            .into_iter()
            .filter(|raw| self.handle(world, raw))
            .count()
    }
}
