//! Zone Triggers - Zone Occupancy and Trigger Rules
//!
//! This crate turns noisy per-collider overlap signals into logical
//! "entity entered / left zone" events and lets rules react to them.
//!
//! # Features
//!
//! - One `Entered` and one `Left` per entity, however many colliders it has
//! - Robust to out-of-order begin/end signals within a physics step
//! - Three-stage rule filters: zone name, entity type, entity name
//! - Per-entity or aggregate ("treat as one") triggering
//! - Explicit subscribe / unsubscribe lifetimes
//!
//! # Architecture
//!
//! ```text
//!  collision host ──raw begin/end──▶ ZoneSystem ──▶ ZoneTracker (per zone)
//!                                                      │ Entered / Left
//!                                                      ▼
//!                                   TriggerRule (filter + count) ──▶ TriggerAction
//! ```
//!
//! # Example
//!
//! ```ignore
//! use zone_triggers::prelude::*;
//!
//! let mut zones = ZoneSystem::new();
//! let vault = zones.add_zone(&scene, "Vault", vault_shape);
//!
//! let config = TriggerRuleConfig::new()
//!     .with_zone_name(FilterMode::Require, "^Vault$")
//!     .with_trigger_on_enter(true);
//! let mut rule = TriggerRule::new(config, vec![vault], RecordingAction::new(log.clone()))?;
//! rule.init();
//!
//! // Every physics step
//! zones.process(&scene, step_signals);
//! ```

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod filter;
pub mod host;
pub mod rule;
pub mod scene;
pub mod system;
pub mod zone;

pub mod prelude {
    pub use crate::action::{Activation, ActivationLog, FnAction, RecordingAction, TriggerAction};
    pub use crate::config::TriggerRuleConfig;
    pub use crate::entity::{ColliderId, EntityId, EntityKind, EntityRef, EntitySnapshot};
    pub use crate::error::{PatternField, Result, TriggerError};
    pub use crate::events::{OverlapPhase, RawOverlap, ZoneEvent, ZoneEventType, ZoneRef};
    pub use crate::filter::{CompiledFilter, FilterMode};
    pub use crate::host::{ColliderWorld, EntityDirectory, Scene};
    pub use crate::rule::{RuleState, TriggerRule};
    pub use crate::scene::MemoryScene;
    pub use crate::system::ZoneSystem;
    pub use crate::zone::{ZoneHandle, ZoneTracker, DETECTOR_TAG, DROPLET_TAG};
}

pub use prelude::*;
