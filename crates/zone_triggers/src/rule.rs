//! Trigger rules
//!
//! A [`TriggerRule`] observes one or more zones, passes their events
//! through its filter chain, counts the filtered entities currently inside
//! and fires its [`TriggerAction`] on the configured transitions.

use crate::action::TriggerAction;
use crate::config::TriggerRuleConfig;
use crate::entity::{EntityRef, EntitySnapshot};
use crate::error::Result;
use crate::events::ZoneEvent;
use crate::filter::CompiledFilter;
use crate::zone::ZoneHandle;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use zone_event::SubscriberId;

/// Lifecycle state of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleState {
    /// Constructed, not yet subscribed
    Uninitialized,
    /// Subscribed and reacting to zone events
    Active,
    /// Unsubscribed
    Deinitialized,
}

/// Mutable state shared with the zone subscriptions
#[derive(Debug)]
struct RuleCore {
    filter: CompiledFilter,
    trigger_on_enter: bool,
    trigger_on_leave: bool,
    treat_as_one: bool,
    /// Filtered entities currently inside any observed zone
    occupancy_count: u32,
    /// Filtered exits seen while the count was already zero
    invariant_violations: u64,
}

impl RuleCore {
    /// Returns whether the action should fire
    fn on_zone_entered(&mut self, event: &ZoneEvent) -> bool {
        if !self.filter.passes(&event.zone, &event.entity) {
            return false;
        }

        self.occupancy_count += 1;
        self.trigger_on_enter && (!self.treat_as_one || self.occupancy_count == 1)
    }

    /// Returns whether the action should fire
    fn on_zone_left(&mut self, event: &ZoneEvent) -> bool {
        if !self.filter.passes(&event.zone, &event.entity) {
            return false;
        }

        if self.occupancy_count == 0 {
            self.invariant_violations += 1;
            log::error!(
                "Occupancy underflow: {} left zone {} with no filtered entity inside",
                event.entity.entity,
                event.zone
            );
            return false;
        }

        self.occupancy_count -= 1;
        self.trigger_on_leave && (!self.treat_as_one || self.occupancy_count == 0)
    }
}

struct ZoneSubscription {
    zone: ZoneHandle,
    entered: SubscriberId,
    left: SubscriberId,
}

type SharedAction = Arc<Mutex<Box<dyn TriggerAction>>>;

/// Filtered, counting trigger over a set of zones
pub struct TriggerRule {
    config: TriggerRuleConfig,
    zones: Vec<ZoneHandle>,
    core: Arc<Mutex<RuleCore>>,
    action: SharedAction,
    subscriptions: Vec<ZoneSubscription>,
    state: RuleState,
}

impl TriggerRule {
    /// Create a rule, compiling its filters.
    ///
    /// Fails on an invalid or missing name pattern. An empty zone list is
    /// valid; such a rule never fires.
    pub fn new<A>(config: TriggerRuleConfig, zones: Vec<ZoneHandle>, action: A) -> Result<Self>
    where
        A: TriggerAction + 'static,
    {
        let filter = config.validate()?;

        let core = RuleCore {
            filter,
            trigger_on_enter: config.trigger_on_enter,
            trigger_on_leave: config.trigger_on_leave,
            treat_as_one: config.treat_as_one,
            occupancy_count: 0,
            invariant_violations: 0,
        };

        let action: Box<dyn TriggerAction> = Box::new(action);

        Ok(Self {
            config,
            zones,
            core: Arc::new(Mutex::new(core)),
            action: Arc::new(Mutex::new(action)),
            subscriptions: Vec::new(),
            state: RuleState::Uninitialized,
        })
    }

    /// Subscribe to every zone and reset the occupancy count
    pub fn init(&mut self) {
        if self.state == RuleState::Active {
            log::warn!("Trigger rule is already active, ignoring init");
            return;
        }

        self.core.lock().occupancy_count = 0;

        if self.zones.is_empty() {
            log::warn!("Trigger rule has no zones to observe and will never fire");
        }

        for zone in &self.zones {
            let entered = {
                let core = Arc::clone(&self.core);
                let action = Arc::clone(&self.action);
                zone.on_entered(move |event| {
                    // Lock released before the action runs
                    let fire = core.lock().on_zone_entered(event);
                    if fire {
                        trigger(&action, &event.entity);
                    }
                })
            };
            let left = {
                let core = Arc::clone(&self.core);
                let action = Arc::clone(&self.action);
                zone.on_left(move |event| {
                    let fire = core.lock().on_zone_left(event);
                    if fire {
                        trigger(&action, &event.entity);
                    }
                })
            };

            self.subscriptions.push(ZoneSubscription {
                zone: zone.clone(),
                entered,
                left,
            });
        }

        self.state = RuleState::Active;
        log::debug!("Trigger rule active on {} zone(s)", self.zones.len());
    }

    /// Unsubscribe from every zone. No event reaches the rule afterwards.
    pub fn deinit(&mut self) {
        if self.state != RuleState::Active {
            return;
        }

        for subscription in self.subscriptions.drain(..) {
            subscription.zone.unsubscribe_entered(subscription.entered);
            subscription.zone.unsubscribe_left(subscription.left);
        }

        self.state = RuleState::Deinitialized;
        log::debug!("Trigger rule deinitialized");
    }

    pub fn state(&self) -> RuleState {
        self.state
    }

    pub fn config(&self) -> &TriggerRuleConfig {
        &self.config
    }

    pub fn zones(&self) -> &[ZoneHandle] {
        &self.zones
    }

    /// Filtered entities currently inside the observed zones
    pub fn occupancy_count(&self) -> u32 {
        self.core.lock().occupancy_count
    }

    /// Filtered exits that arrived with no filtered entity inside
    pub fn invariant_violations(&self) -> u64 {
        self.core.lock().invariant_violations
    }
}

impl Drop for TriggerRule {
    fn drop(&mut self) {
        self.deinit();
    }
}

impl fmt::Debug for TriggerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerRule")
            .field("state", &self.state)
            .field("zones", &self.zones.len())
            .field("occupancy_count", &self.occupancy_count())
            .finish()
    }
}

/// Set the event context and fire the action
fn trigger(action: &Mutex<Box<dyn TriggerAction>>, entity: &EntitySnapshot) {
    log::debug!("Triggering for {} ({})", entity.name, entity.entity);

    let mut action = action.lock();
    action.set_event_point(entity.position);
    if let EntityRef::Generic(_) = entity.entity {
        action.set_event_entities(vec![entity.entity]);
    }
    action.activate();
}
