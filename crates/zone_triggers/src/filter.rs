//! Trigger filtering system
//!
//! A rule reacts to a zone event only if all three stages pass:
//! zone name, entity type, then entity name. Every stage is a pure
//! predicate over the event snapshot and the compiled configuration.

use crate::entity::{EntityKind, EntitySnapshot};
use crate::error::{PatternField, Result, TriggerError};
use crate::events::ZoneRef;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a filter stage treats a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Stage always passes
    #[default]
    Any,
    /// Pass only on a match
    Require,
    /// Pass only without a match
    Exclude,
}

impl FilterMode {
    /// Apply the mode to a match result
    #[inline]
    pub fn admits(self, matched: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Require => matched,
            Self::Exclude => !matched,
        }
    }

    pub fn is_any(self) -> bool {
        self == Self::Any
    }
}

/// Regex match against a zone or entity name
#[derive(Debug, Clone)]
pub struct NameFilter {
    mode: FilterMode,
    pattern: Option<Regex>,
}

impl NameFilter {
    /// A stage that always passes
    pub fn any() -> Self {
        Self {
            mode: FilterMode::Any,
            pattern: None,
        }
    }

    /// Compile a name stage. A pattern is required unless the mode is `Any`,
    /// in which case it is ignored.
    pub fn compile(mode: FilterMode, pattern: Option<&str>, field: PatternField) -> Result<Self> {
        if mode.is_any() {
            return Ok(Self::any());
        }

        let source = pattern.ok_or(TriggerError::MissingPattern { field, mode })?;
        let regex = Regex::new(source).map_err(|source_err| TriggerError::InvalidPattern {
            field,
            pattern: source.to_string(),
            source: source_err,
        })?;

        Ok(Self {
            mode,
            pattern: Some(regex),
        })
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Check a name against this stage
    pub fn passes(&self, name: &str) -> bool {
        match &self.pattern {
            Some(regex) => self.mode.admits(regex.is_match(name)),
            None => true,
        }
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::any()
    }
}

/// Entity kind / concrete type stage
#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    mode: FilterMode,
    /// Decides convoy entities
    react_to_convoy: bool,
    /// Decides generic entities by their type id
    allowed_type_ids: HashSet<String>,
}

impl TypeFilter {
    pub fn new(mode: FilterMode, react_to_convoy: bool, allowed_type_ids: HashSet<String>) -> Self {
        Self {
            mode,
            react_to_convoy,
            allowed_type_ids,
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Check an entity against this stage
    pub fn passes(&self, entity: &EntitySnapshot) -> bool {
        if self.mode.is_any() {
            return true;
        }

        let matched = match entity.entity.kind() {
            EntityKind::Convoy => self.react_to_convoy,
            EntityKind::Generic => self.allowed_type_ids.contains(&entity.type_id),
        };
        self.mode.admits(matched)
    }
}

/// The full three-stage filter chain of a trigger rule
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    pub zone_name: NameFilter,
    pub entity_type: TypeFilter,
    pub entity_name: NameFilter,
}

impl CompiledFilter {
    /// Check whether a zone event concerns this rule
    pub fn passes(&self, zone: &ZoneRef, entity: &EntitySnapshot) -> bool {
        self.zone_name.passes(&zone.name)
            && self.entity_type.passes(entity)
            && self.entity_name.passes(&entity.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColliderId, EntityId, EntityRef};

    fn goblin() -> EntitySnapshot {
        EntitySnapshot::new(EntityRef::Generic(EntityId(1)), "Goblin_1").with_type_id("Goblin")
    }

    fn cart() -> EntitySnapshot {
        EntitySnapshot::new(EntityRef::Convoy(EntityId(2)), "Cart_1").with_type_id("Convoy")
    }

    fn zone_filter(mode: FilterMode, pattern: &str) -> NameFilter {
        NameFilter::compile(mode, Some(pattern), PatternField::ZoneName).unwrap()
    }

    fn entity_filter(mode: FilterMode, pattern: &str) -> NameFilter {
        NameFilter::compile(mode, Some(pattern), PatternField::EntityName).unwrap()
    }

    #[test]
    fn test_mode_admits() {
        assert!(FilterMode::Any.admits(false));
        assert!(FilterMode::Require.admits(true));
        assert!(!FilterMode::Require.admits(false));
        assert!(FilterMode::Exclude.admits(false));
        assert!(!FilterMode::Exclude.admits(true));
    }

    #[test]
    fn test_name_filter_require_and_exclude() {
        let require = zone_filter(FilterMode::Require, "^Vault$");
        assert!(require.passes("Vault"));
        assert!(!require.passes("Vault2"));

        let exclude = zone_filter(FilterMode::Exclude, "^Vault");
        assert!(!exclude.passes("Vault2"));
        assert!(exclude.passes("Armory"));
    }

    #[test]
    fn test_name_filter_is_unanchored_by_default() {
        let filter = entity_filter(FilterMode::Require, "oblin");
        assert!(filter.passes("Goblin_1"));
    }

    #[test]
    fn test_any_ignores_pattern() {
        let filter = zone_filter(FilterMode::Any, "(unclosed");
        assert!(filter.passes("whatever"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err =
            NameFilter::compile(FilterMode::Require, Some("(unclosed"), PatternField::EntityName)
                .unwrap_err();
        assert!(matches!(
            err,
            TriggerError::InvalidPattern { field: PatternField::EntityName, .. }
        ));
    }

    #[test]
    fn test_missing_pattern() {
        let err =
            NameFilter::compile(FilterMode::Exclude, None, PatternField::ZoneName).unwrap_err();
        assert!(matches!(
            err,
            TriggerError::MissingPattern { mode: FilterMode::Exclude, .. }
        ));
    }

    #[test]
    fn test_type_filter_convoy_flag() {
        let require = TypeFilter::new(FilterMode::Require, true, HashSet::new());
        assert!(require.passes(&cart()));
        assert!(!require.passes(&goblin()));

        let exclude = TypeFilter::new(FilterMode::Exclude, true, HashSet::new());
        assert!(!exclude.passes(&cart()));
        assert!(exclude.passes(&goblin()));
    }

    #[test]
    fn test_type_filter_allow_list() {
        let allowed: HashSet<String> = ["Goblin".to_string()].into_iter().collect();

        let require = TypeFilter::new(FilterMode::Require, false, allowed.clone());
        assert!(require.passes(&goblin()));
        assert!(!require.passes(&cart()));

        let exclude = TypeFilter::new(FilterMode::Exclude, false, allowed);
        assert!(!exclude.passes(&goblin()));
        assert!(exclude.passes(&cart()));
    }

    #[test]
    fn test_chain_requires_all_stages() {
        let filter = CompiledFilter {
            zone_name: zone_filter(FilterMode::Require, "^Vault$"),
            entity_type: TypeFilter::default(),
            entity_name: entity_filter(FilterMode::Exclude, "^Cart"),
        };

        let vault = ZoneRef::new(ColliderId(1), "Vault");
        let armory = ZoneRef::new(ColliderId(2), "Armory");

        assert!(filter.passes(&vault, &goblin()));
        assert!(!filter.passes(&vault, &cart()));
        assert!(!filter.passes(&armory, &goblin()));
    }
}
