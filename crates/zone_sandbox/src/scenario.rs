//! Scenario files
//!
//! A scenario declares zones, entities and rules, then a list of steps
//! replayed in order. Files are TOML or JSON, chosen by extension.
//!
//! # Example
//!
//! ```toml
//! [[zones]]
//! name = "Vault"
//!
//! [[entities]]
//! name = "Goblin_1"
//! kind = "generic"
//! type_id = "Goblin"
//! position = [1.0, 2.0, 0.0]
//! colliders = 2
//!
//! [[rules]]
//! name = "vault-alarm"
//! filter_zone_name = "Require"
//! zone_name_pattern = "^Vault$"
//! trigger_on_enter = true
//!
//! [[steps]]
//! op = "begin"
//! zone = "Vault"
//! entity = "Goblin_1"
//! ```

use crate::error::{Result, SandboxError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zone_triggers::{EntityKind, TriggerRuleConfig};

/// A complete replay scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub zones: Vec<ZoneSpec>,
    pub entities: Vec<EntitySpec>,
    pub rules: Vec<RuleSpec>,
    pub steps: Vec<Step>,
}

/// A zone and its shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    /// Whether the zone shape is an overlap-only sensor
    #[serde(default = "default_true")]
    pub sensor: bool,
}

/// A logical entity and its colliders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub kind: EntityKind,
    /// Concrete type id; defaults to the kind name
    #[serde(default)]
    pub type_id: Option<String>,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_colliders")]
    pub colliders: usize,
}

/// A trigger rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    /// Zones to observe; empty observes every zone
    #[serde(default)]
    pub zones: Vec<String>,
    /// Initialize before the first step
    #[serde(default = "default_true")]
    pub init: bool,
    #[serde(flatten)]
    pub config: TriggerRuleConfig,
}

/// One scripted host action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Raw begin signal for one collider of an entity
    Begin {
        zone: String,
        entity: String,
        #[serde(default)]
        collider: usize,
    },
    /// Raw end signal for one collider of an entity
    End {
        zone: String,
        entity: String,
        #[serde(default)]
        collider: usize,
    },
    Activate { entity: String },
    Deactivate { entity: String },
    Destroy { entity: String },
    Enable {
        entity: String,
        #[serde(default)]
        collider: usize,
    },
    Disable {
        entity: String,
        #[serde(default)]
        collider: usize,
    },
    Move { entity: String, position: [f32; 3] },
    Init { rule: String },
    Deinit { rule: String },
}

fn default_true() -> bool {
    true
}

fn default_colliders() -> usize {
    1
}

impl Scenario {
    /// Load a scenario from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            other => Err(SandboxError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
