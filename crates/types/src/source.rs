//! Panel-level field config: defaults plus matcher-based override rules
//!
//! This is the serializable shape a dashboard persists and hands to override
//! resolution verbatim.

use crate::config::FieldConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Selects the fields a rule applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub id: String,
    #[serde(default)]
    pub options: JsonValue,
}

impl MatcherConfig {
    pub fn new(id: impl Into<String>, options: JsonValue) -> Self {
        Self {
            id: id.into(),
            options,
        }
    }
}

/// A property id and the raw value to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicConfigValue {
    pub id: String,
    #[serde(default)]
    pub value: JsonValue,
}

impl DynamicConfigValue {
    pub fn new(id: impl Into<String>, value: JsonValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// A matcher plus the property changes for every field it selects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub properties: Vec<DynamicConfigValue>,
    /// Set on rules generated by the application rather than a user
    #[serde(
        rename = "__systemRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub system_ref: Option<String>,
}

impl OverrideRule {
    pub fn new(matcher: MatcherConfig, properties: Vec<DynamicConfigValue>) -> Self {
        Self {
            matcher,
            properties,
            system_ref: None,
        }
    }

    /// A rule owned by the application, tagged with `system_ref`
    pub fn system(
        system_ref: impl Into<String>,
        matcher: MatcherConfig,
        properties: Vec<DynamicConfigValue>,
    ) -> Self {
        Self {
            matcher,
            properties,
            system_ref: Some(system_ref.into()),
        }
    }

    pub fn is_system(&self) -> bool {
        self.system_ref.is_some()
    }

    pub fn is_system_with_ref(&self, system_ref: &str) -> bool {
        self.system_ref.as_deref() == Some(system_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConfigSource {
    #[serde(default)]
    pub defaults: FieldConfig,
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
}

impl FieldConfigSource {
    pub fn new(defaults: FieldConfig, overrides: Vec<OverrideRule>) -> Self {
        Self {
            defaults,
            overrides,
        }
    }

    pub fn system_override(&self, system_ref: &str) -> Option<&OverrideRule> {
        self.overrides
            .iter()
            .find(|r| r.is_system_with_ref(system_ref))
    }

    /// Replace the system rule carrying the same ref, or append it
    ///
    /// Rules without a system ref are appended as-is.
    pub fn set_system_override(&mut self, rule: OverrideRule) {
        let existing = rule.system_ref.as_deref().and_then(|system_ref| {
            self.overrides
                .iter()
                .position(|r| r.is_system_with_ref(system_ref))
        });
        match existing {
            Some(index) => self.overrides[index] = rule,
            None => self.overrides.push(rule),
        }
    }

    pub fn remove_system_override(&mut self, system_ref: &str) -> Option<OverrideRule> {
        let index = self
            .overrides
            .iter()
            .position(|r| r.is_system_with_ref(system_ref))?;
        Some(self.overrides.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hide_rule(name: &str) -> OverrideRule {
        OverrideRule::system(
            "hideSeriesFrom",
            MatcherConfig::new("byNames", json!({"names": [name]})),
            vec![DynamicConfigValue::new("custom.hideFrom", json!({"viz": true}))],
        )
    }

    #[test]
    fn test_set_system_override_replaces_by_ref() {
        let mut source = FieldConfigSource::default();
        source.overrides.push(OverrideRule::new(
            MatcherConfig::new("byName", json!("a")),
            vec![],
        ));
        source.set_system_override(hide_rule("a"));
        source.set_system_override(hide_rule("b"));

        assert_eq!(source.overrides.len(), 2);
        let rule = source.system_override("hideSeriesFrom").unwrap();
        assert_eq!(rule.matcher.options, json!({"names": ["b"]}));

        assert!(source.remove_system_override("hideSeriesFrom").is_some());
        assert!(source.system_override("hideSeriesFrom").is_none());
        assert_eq!(source.overrides.len(), 1);
    }

    #[test]
    fn test_system_ref_json_field() {
        let json = serde_json::to_value(hide_rule("a")).unwrap();
        assert_eq!(json["__systemRef"], json!("hideSeriesFrom"));

        let user: OverrideRule = serde_json::from_value(json!({
            "matcher": {"id": "byType", "options": "number"},
            "properties": [{"id": "unit", "value": "ms"}]
        }))
        .unwrap();
        assert!(!user.is_system());
        assert_eq!(user.properties[0].id, "unit");
    }
}
