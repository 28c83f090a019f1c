//! Activation boundary between trigger rules and the surrounding game

use crate::entity::EntityRef;
use parking_lot::Mutex;
use std::sync::Arc;

/// The side-effecting action a trigger rule fires.
///
/// The rule sets the event context, then calls [`TriggerAction::activate`].
/// `set_event_entities` is only called for generic entities, so an action
/// firing for a convoy keeps whatever entity list it already had.
pub trait TriggerAction: Send {
    /// World position the activation refers to
    fn set_event_point(&mut self, point: [f32; 3]);

    /// Entities the activation refers to
    fn set_event_entities(&mut self, entities: Vec<EntityRef>);

    /// Fire the action
    fn activate(&mut self);
}

/// One recorded activation
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Event point at activation time
    pub point: [f32; 3],
    /// Event entities at activation time
    pub entities: Vec<EntityRef>,
}

/// Shared list of activations recorded by a [`RecordingAction`]
#[derive(Debug, Clone, Default)]
pub struct ActivationLog {
    entries: Arc<Mutex<Vec<Activation>>>,
}

impl ActivationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of every activation so far
    pub fn snapshot(&self) -> Vec<Activation> {
        self.entries.lock().clone()
    }

    pub fn last(&self) -> Option<Activation> {
        self.entries.lock().last().cloned()
    }

    /// Take every activation recorded so far
    pub fn drain(&self) -> Vec<Activation> {
        std::mem::take(&mut *self.entries.lock())
    }

    fn push(&self, activation: Activation) {
        self.entries.lock().push(activation);
    }
}

/// Action that appends every activation to an [`ActivationLog`].
///
/// Event entities are cleared after each activation, so a convoy activation
/// is recorded with an empty entity list.
#[derive(Debug, Default)]
pub struct RecordingAction {
    log: ActivationLog,
    point: [f32; 3],
    entities: Vec<EntityRef>,
}

impl RecordingAction {
    /// Create an action writing to `log`
    pub fn new(log: ActivationLog) -> Self {
        Self {
            log,
            point: [0.0, 0.0, 0.0],
            entities: Vec::new(),
        }
    }

    pub fn log(&self) -> &ActivationLog {
        &self.log
    }
}

impl TriggerAction for RecordingAction {
    fn set_event_point(&mut self, point: [f32; 3]) {
        self.point = point;
    }

    fn set_event_entities(&mut self, entities: Vec<EntityRef>) {
        self.entities = entities;
    }

    fn activate(&mut self) {
        self.log.push(Activation {
            point: self.point,
            entities: std::mem::take(&mut self.entities),
        });
    }
}

/// Action backed by a closure, called with the current event context
pub struct FnAction<F>
where
    F: FnMut(&Activation) + Send,
{
    context: Activation,
    callback: F,
}

impl<F> FnAction<F>
where
    F: FnMut(&Activation) + Send,
{
    pub fn new(callback: F) -> Self {
        Self {
            context: Activation {
                point: [0.0, 0.0, 0.0],
                entities: Vec::new(),
            },
            callback,
        }
    }
}

impl<F> TriggerAction for FnAction<F>
where
    F: FnMut(&Activation) + Send,
{
    fn set_event_point(&mut self, point: [f32; 3]) {
        self.context.point = point;
    }

    fn set_event_entities(&mut self, entities: Vec<EntityRef>) {
        self.context.entities = entities;
    }

    fn activate(&mut self) {
        (self.callback)(&self.context);
    }
}
