//! Scenario replay against an in-memory scene

use crate::error::{Result, SandboxError};
use crate::scenario::{Scenario, Step};
use serde::Serialize;
use std::collections::HashMap;
use zone_triggers::prelude::*;

/// One activation, with entities resolved to names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationReport {
    pub point: [f32; 3],
    pub entities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub name: String,
    pub activations: Vec<ActivationReport>,
    pub occupancy_count: u32,
    pub invariant_violations: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneReport {
    pub name: String,
    /// Names of entities inside, sorted
    pub occupants: Vec<String>,
}

/// Final state after a replay
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: usize,
    pub logical_events: usize,
    pub rules: Vec<RuleReport>,
    pub zones: Vec<ZoneReport>,
}

struct ReplayRule {
    name: String,
    rule: TriggerRule,
    log: ActivationLog,
}

/// A scenario loaded into a scene, ready to run
pub struct Replay {
    scene: MemoryScene,
    zones: ZoneSystem,
    zone_shapes: HashMap<String, ColliderId>,
    entities: HashMap<String, EntityRef>,
    rules: Vec<ReplayRule>,
    logical_events: usize,
}

impl Replay {
    /// Build the scene, zones and rules declared by a scenario
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let scene = MemoryScene::new();
        let mut zones = ZoneSystem::new();
        let mut zone_shapes = HashMap::new();

        for spec in &scenario.zones {
            let shape = scene.add_zone_shape();
            scene.set_sensor(shape, spec.sensor);
            zones.add_zone(&scene, spec.name.as_str(), shape);
            zone_shapes.insert(spec.name.clone(), shape);
        }

        let mut entities = HashMap::new();
        for spec in &scenario.entities {
            let type_id = spec
                .type_id
                .clone()
                .unwrap_or_else(|| spec.kind.as_str().to_string());
            let entity = scene.spawn_entity(spec.kind, spec.name.as_str(), type_id, spec.position);
            for _ in 0..spec.colliders {
                scene.add_collider(entity);
            }
            entities.insert(spec.name.clone(), entity);
        }

        let mut rules = Vec::new();
        for spec in &scenario.rules {
            let handles = if spec.zones.is_empty() {
                zones.handles()
            } else {
                spec.zones
                    .iter()
                    .map(|name| {
                        zone_shapes
                            .get(name)
                            .and_then(|shape| zones.zone(*shape))
                            .map(ZoneTracker::handle)
                            .ok_or_else(|| SandboxError::UnknownZone(name.clone()))
                    })
                    .collect::<Result<Vec<_>>>()?
            };

            let log = ActivationLog::new();
            let action = RecordingAction::new(log.clone());
            let mut rule = TriggerRule::new(spec.config.clone(), handles, action).map_err(
                |source| SandboxError::Rule {
                    rule: spec.name.clone(),
                    source,
                },
            )?;
            if spec.init {
                rule.init();
            }
            rules.push(ReplayRule {
                name: spec.name.clone(),
                rule,
                log,
            });
        }

        log::info!(
            "Loaded {} zone(s), {} entities, {} rule(s)",
            zones.zone_count(),
            entities.len(),
            rules.len()
        );

        Ok(Self {
            scene,
            zones,
            zone_shapes,
            entities,
            rules,
            logical_events: 0,
        })
    }

    /// Execute one step
    pub fn apply(&mut self, step: &Step) -> Result<()> {
        log::debug!("Step: {:?}", step);
        match step {
            Step::Begin {
                zone,
                entity,
                collider,
            } => {
                let shape = self.zone_shape(zone)?;
                let raw = RawOverlap::begin(shape, self.collider(entity, *collider)?);
                self.deliver(&raw);
            }
            Step::End {
                zone,
                entity,
                collider,
            } => {
                let shape = self.zone_shape(zone)?;
                let raw = RawOverlap::end(shape, self.collider(entity, *collider)?);
                self.deliver(&raw);
            }
            Step::Activate { entity } => {
                self.scene.set_entity_active(self.entity(entity)?, true)
            }
            Step::Deactivate { entity } => {
                self.scene.set_entity_active(self.entity(entity)?, false)
            }
            Step::Destroy { entity } => self.scene.destroy_entity(self.entity(entity)?),
            Step::Enable { entity, collider } => {
                self.scene.set_collider_enabled(self.collider(entity, *collider)?, true)
            }
            Step::Disable { entity, collider } => {
                self.scene.set_collider_enabled(self.collider(entity, *collider)?, false)
            }
            Step::Move { entity, position } => {
                self.scene.set_position(self.entity(entity)?, *position)
            }
            Step::Init { rule } => self.rule_mut(rule)?.init(),
            Step::Deinit { rule } => self.rule_mut(rule)?.deinit(),
        }
        Ok(())
    }

    /// Execute every step of a scenario and report the final state
    pub fn run(mut self, scenario: &Scenario) -> Result<Report> {
        for step in &scenario.steps {
            self.apply(step)?;
        }
        Ok(self.report(scenario.steps.len()))
    }

    fn deliver(&mut self, raw: &RawOverlap) {
        if self.zones.handle(&self.scene, raw) {
            self.logical_events += 1;
        }
    }

    fn report(&self, steps: usize) -> Report {
        let rules = self
            .rules
            .iter()
            .map(|r| RuleReport {
                name: r.name.clone(),
                activations: r
                    .log
                    .snapshot()
                    .into_iter()
                    .map(|a| ActivationReport {
                        point: a.point,
                        entities: a.entities.iter().map(|&e| self.scene.name_of(e)).collect(),
                    })
                    .collect(),
                occupancy_count: r.rule.occupancy_count(),
                invariant_violations: r.rule.invariant_violations(),
            })
            .collect();

        let zones = self
            .zones
            .handles()
            .iter()
            .filter_map(|handle| self.zones.zone(handle.shape()))
            .map(|tracker| {
                let mut occupants: Vec<String> =
                    tracker.occupants().map(|e| self.scene.name_of(e)).collect();
                occupants.sort();
                ZoneReport {
                    name: tracker.zone().name.to_string(),
                    occupants,
                }
            })
            .collect();

        Report {
            steps,
            logical_events: self.logical_events,
            rules,
            zones,
        }
    }

    fn zone_shape(&self, name: &str) -> Result<ColliderId> {
        self.zone_shapes
            .get(name)
            .copied()
            .ok_or_else(|| SandboxError::UnknownZone(name.to_string()))
    }

    fn entity(&self, name: &str) -> Result<EntityRef> {
        self.entities
            .get(name)
            .copied()
            .ok_or_else(|| SandboxError::UnknownEntity(name.to_string()))
    }

    fn collider(&self, entity: &str, index: usize) -> Result<ColliderId> {
        let owner = self.entity(entity)?;
        self.scene
            .colliders_of(owner)
            .get(index)
            .copied()
            .ok_or_else(|| SandboxError::ColliderOutOfRange {
                entity: entity.to_string(),
                index,
            })
    }

    fn rule_mut(&mut self, name: &str) -> Result<&mut TriggerRule> {
        self.rules
            .iter_mut()
            .find(|r| r.name == name)
            .map(|r| &mut r.rule)
            .ok_or_else(|| SandboxError::UnknownRule(name.to_string()))
    }
}
