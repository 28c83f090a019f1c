//! Trigger rule configuration

use crate::error::{PatternField, Result};
use crate::filter::{CompiledFilter, FilterMode, NameFilter, TypeFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for a [`crate::TriggerRule`].
///
/// Set before the rule is constructed and never changed afterwards. The
/// default configuration passes every event and fires on nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerRuleConfig {
    /// Zone-name stage mode
    pub filter_zone_name: FilterMode,
    /// Regex matched against the zone name
    pub zone_name_pattern: Option<String>,

    /// Entity-type stage mode
    pub filter_entity_type: FilterMode,
    /// Type stage result for convoy entities
    pub react_to_convoy: bool,
    /// Type ids matched for generic entities
    pub allowed_type_ids: HashSet<String>,

    /// Entity-name stage mode
    pub filter_entity_name: FilterMode,
    /// Regex matched against the entity name
    pub entity_name_pattern: Option<String>,

    /// Fire when a filtered entity enters
    pub trigger_on_enter: bool,
    /// Fire when a filtered entity leaves
    pub trigger_on_leave: bool,
    /// Collapse all filtered entities into one occupied/empty signal
    pub treat_as_one: bool,
}

impl TriggerRuleConfig {
    /// Create a configuration that passes everything and fires on nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zone-name stage
    pub fn with_zone_name(mut self, mode: FilterMode, pattern: impl Into<String>) -> Self {
        self.filter_zone_name = mode;
        self.zone_name_pattern = Some(pattern.into());
        self
    }

    /// Set the entity-type stage
    pub fn with_entity_type<I, S>(
        mut self,
        mode: FilterMode,
        react_to_convoy: bool,
        type_ids: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_entity_type = mode;
        self.react_to_convoy = react_to_convoy;
        self.allowed_type_ids = type_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the entity-name stage
    pub fn with_entity_name(mut self, mode: FilterMode, pattern: impl Into<String>) -> Self {
        self.filter_entity_name = mode;
        self.entity_name_pattern = Some(pattern.into());
        self
    }

    pub fn with_trigger_on_enter(mut self, enabled: bool) -> Self {
        self.trigger_on_enter = enabled;
        self
    }

    pub fn with_trigger_on_leave(mut self, enabled: bool) -> Self {
        self.trigger_on_leave = enabled;
        self
    }

    pub fn with_treat_as_one(mut self, enabled: bool) -> Self {
        self.treat_as_one = enabled;
        self
    }

    /// Compile the filter chain, rejecting bad or missing patterns
    pub fn validate(&self) -> Result<CompiledFilter> {
        Ok(CompiledFilter {
            zone_name: NameFilter::compile(
                self.filter_zone_name,
                self.zone_name_pattern.as_deref(),
                PatternField::ZoneName,
            )?,
            entity_type: TypeFilter::new(
                self.filter_entity_type,
                self.react_to_convoy,
                self.allowed_type_ids.clone(),
            ),
            entity_name: NameFilter::compile(
                self.filter_entity_name,
                self.entity_name_pattern.as_deref(),
                PatternField::EntityName,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriggerError;

    #[test]
    fn test_default_passes_everything() {
        let config = TriggerRuleConfig::new();
        let filter = config.validate().unwrap();

        assert!(filter.zone_name.mode().is_any());
        assert!(filter.entity_type.mode().is_any());
        assert!(filter.entity_name.mode().is_any());
        assert!(!config.trigger_on_enter);
        assert!(!config.trigger_on_leave);
    }

    #[test]
    fn test_validate_reports_entity_pattern() {
        let config = TriggerRuleConfig::new().with_entity_name(FilterMode::Require, "[a-");

        match config.validate() {
            Err(TriggerError::InvalidPattern { field, pattern, .. }) => {
                assert_eq!(field, PatternField::EntityName);
                assert_eq!(pattern, "[a-");
            }
            other => panic!("expected invalid pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: TriggerRuleConfig = serde_json::from_str(
            r#"{
                "filter_zone_name": "Require",
                "zone_name_pattern": "^Vault$",
                "filter_entity_type": "Exclude",
                "allowed_type_ids": ["Goblin"],
                "trigger_on_enter": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.filter_zone_name, FilterMode::Require);
        assert_eq!(config.filter_entity_type, FilterMode::Exclude);
        assert!(config.allowed_type_ids.contains("Goblin"));
        assert!(config.trigger_on_enter);
        assert!(!config.treat_as_one);
        assert!(config.validate().is_ok());
    }
}
