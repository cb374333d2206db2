//! Registry of field config properties
//!
//! Every property a rule or default may set is registered here with the
//! path it writes, which fields it applies to, and how a raw JSON value is
//! validated before it lands in a [`FieldConfig`](fieldkit_types::FieldConfig).
//! The registry is built once at startup and passed to resolution by
//! reference.

use fieldkit_types::{
    ConfigError, DataFrame, DataLink, Field, FieldColor, FieldType, ThresholdsConfig,
    ValueMapping,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use thiserror::Error;

/// Why a property value was rejected
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("'{id}' expects {expected}, got {got}")]
    WrongType {
        id: String,
        expected: &'static str,
        got: String,
    },

    #[error("'{id}' value {value} is outside {min}..={max}")]
    OutOfRange {
        id: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid value for '{id}': {source}")]
    Invalid {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What a property's process step sees besides the value
#[derive(Debug, Clone, Copy)]
pub struct FieldOverrideContext<'a> {
    pub field: &'a Field,
    pub frame: &'a DataFrame,
    pub data: &'a [DataFrame],
}

/// A settable field config property
pub trait ConfigProperty: Send + Sync {
    /// Registry key; custom properties use `custom.<path>`
    fn id(&self) -> &str;

    /// Path inside the config (inside `custom` for custom properties)
    fn path(&self) -> &str;

    fn is_custom(&self) -> bool {
        false
    }

    fn hide_from_defaults(&self) -> bool {
        false
    }

    fn hide_from_overrides(&self) -> bool {
        false
    }

    /// Properties that do not apply to a field are never written to it
    fn should_apply(&self, _field: &Field) -> bool {
        true
    }

    /// Validate and normalize a raw value; `Ok(None)` means leave it unset
    fn process(
        &self,
        value: &JsonValue,
        ctx: &FieldOverrideContext<'_>,
    ) -> Result<Option<JsonValue>, ProcessError>;
}

/// Built-in value handling for standard and simple custom properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyProcessor {
    Text,
    Number {
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    Thresholds,
    Mappings,
    Color,
    Links,
    /// Any JSON value, stored as given
    Any,
}

/// A property described by data rather than a hand-written impl
#[derive(Debug, Clone)]
pub struct StandardProperty {
    id: String,
    path: String,
    is_custom: bool,
    processor: PropertyProcessor,
    applies_to: Option<FieldType>,
    hide_from_defaults: bool,
    hide_from_overrides: bool,
}

impl StandardProperty {
    pub fn new(path: &str, processor: PropertyProcessor) -> Self {
        Self {
            id: path.to_string(),
            path: path.to_string(),
            is_custom: false,
            processor,
            applies_to: None,
            hide_from_defaults: false,
            hide_from_overrides: false,
        }
    }

    /// A plugin property stored under `custom`
    pub fn custom(path: &str, processor: PropertyProcessor) -> Self {
        Self {
            id: format!("custom.{}", path),
            is_custom: true,
            ..Self::new(path, processor)
        }
    }

    /// Restrict the property to fields of one type
    pub fn applies_to(mut self, field_type: FieldType) -> Self {
        self.applies_to = Some(field_type);
        self
    }

    pub fn hidden_from_defaults(mut self) -> Self {
        self.hide_from_defaults = true;
        self
    }

    pub fn hidden_from_overrides(mut self) -> Self {
        self.hide_from_overrides = true;
        self
    }

    fn wrong_type(&self, expected: &'static str, value: &JsonValue) -> ProcessError {
        ProcessError::WrongType {
            id: self.id.clone(),
            expected,
            got: value.to_string(),
        }
    }

    /// Round-trip through the typed form so only well-formed values pass
    fn typed<T: DeserializeOwned + Serialize>(
        &self,
        value: &JsonValue,
        normalize: impl FnOnce(T) -> T,
    ) -> Result<Option<JsonValue>, ProcessError> {
        let typed: T = serde_json::from_value(value.clone()).map_err(|source| {
            ProcessError::Invalid {
                id: self.id.clone(),
                source,
            }
        })?;
        serde_json::to_value(normalize(typed))
            .map(Some)
            .map_err(|source| ProcessError::Invalid {
                id: self.id.clone(),
                source,
            })
    }

    fn number(
        &self,
        value: &JsonValue,
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Option<JsonValue>, ProcessError> {
        let mut n = match value {
            JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            JsonValue::String(s) if s.trim().is_empty() => return Ok(None),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.wrong_type("a number", value))?,
            _ => return Err(self.wrong_type("a number", value)),
        };
        if !n.is_finite() {
            return Err(self.wrong_type("a finite number", value));
        }
        if integer {
            n = n.round();
        }

        let (lo, hi) = (min.unwrap_or(f64::MIN), max.unwrap_or(f64::MAX));
        if n < lo || n > hi {
            return Err(ProcessError::OutOfRange {
                id: self.id.clone(),
                value: n,
                min: lo,
                max: hi,
            });
        }

        if integer {
            Ok(Some(JsonValue::from(n as i64)))
        } else {
            Ok(serde_json::Number::from_f64(n).map(JsonValue::Number))
        }
    }
}

impl ConfigProperty for StandardProperty {
    fn id(&self) -> &str {
        &self.id
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn is_custom(&self) -> bool {
        self.is_custom
    }

    fn hide_from_defaults(&self) -> bool {
        self.hide_from_defaults
    }

    fn hide_from_overrides(&self) -> bool {
        self.hide_from_overrides
    }

    fn should_apply(&self, field: &Field) -> bool {
        match self.applies_to {
            Some(field_type) => field.resolved_type() == field_type,
            None => true,
        }
    }

    fn process(
        &self,
        value: &JsonValue,
        _ctx: &FieldOverrideContext<'_>,
    ) -> Result<Option<JsonValue>, ProcessError> {
        if value.is_null() {
            return Ok(None);
        }

        match self.processor {
            PropertyProcessor::Text => match value {
                JsonValue::String(_) => Ok(Some(value.clone())),
                JsonValue::Number(n) => Ok(Some(JsonValue::String(n.to_string()))),
                JsonValue::Bool(b) => Ok(Some(JsonValue::String(b.to_string()))),
                _ => Err(self.wrong_type("text", value)),
            },
            PropertyProcessor::Number { integer, min, max } => {
                self.number(value, integer, min, max)
            }
            PropertyProcessor::Boolean => match value {
                JsonValue::Bool(_) => Ok(Some(value.clone())),
                JsonValue::String(s) if s == "true" || s == "false" => {
                    Ok(Some(JsonValue::Bool(s == "true")))
                }
                _ => Err(self.wrong_type("a boolean", value)),
            },
            PropertyProcessor::Thresholds => {
                self.typed::<ThresholdsConfig>(value, ThresholdsConfig::normalized)
            }
            PropertyProcessor::Mappings => self.typed::<Vec<ValueMapping>>(value, |m| m),
            PropertyProcessor::Color => match value {
                // a bare color name means a fixed color
                JsonValue::String(name) => serde_json::to_value(FieldColor::fixed(name.as_str()))
                    .map(Some)
                    .map_err(|source| ProcessError::Invalid {
                        id: self.id.clone(),
                        source,
                    }),
                _ => self.typed::<FieldColor>(value, |c| c),
            },
            PropertyProcessor::Links => self.typed::<Vec<DataLink>>(value, |l| l),
            PropertyProcessor::Any => Ok(Some(value.clone())),
        }
    }
}

/// Field config properties by id, in registration order
pub struct FieldConfigRegistry {
    properties: Vec<Box<dyn ConfigProperty>>,
    index: HashMap<String, usize>,
}

impl FieldConfigRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The standard property set
    pub fn standard() -> Self {
        use PropertyProcessor::*;

        let mut r = Self::new();
        r.register(StandardProperty::new("unit", Text));
        r.register(
            StandardProperty::new(
                "min",
                Number {
                    integer: false,
                    min: None,
                    max: None,
                },
            )
            .applies_to(FieldType::Number),
        );
        r.register(
            StandardProperty::new(
                "max",
                Number {
                    integer: false,
                    min: None,
                    max: None,
                },
            )
            .applies_to(FieldType::Number),
        );
        r.register(
            StandardProperty::new(
                "decimals",
                Number {
                    integer: true,
                    min: Some(0.0),
                    max: Some(15.0),
                },
            )
            .applies_to(FieldType::Number),
        );
        r.register(StandardProperty::new("displayName", Text));
        r.register(StandardProperty::new("noValue", Text));
        r.register(StandardProperty::new("thresholds", Thresholds));
        r.register(StandardProperty::new("mappings", Mappings));
        r.register(StandardProperty::new("color", Color));
        r.register(StandardProperty::new("links", Links));
        r.register(StandardProperty::new("fieldMinMax", Boolean).applies_to(FieldType::Number));
        r
    }

    /// Register a property; a later registration replaces an earlier one
    /// with the same id in place
    pub fn register(&mut self, property: impl ConfigProperty + 'static) {
        let id = property.id().to_string();
        match self.index.get(&id) {
            Some(&i) => self.properties[i] = Box::new(property),
            None => {
                self.index.insert(id, self.properties.len());
                self.properties.push(Box::new(property));
            }
        }
    }

    /// Get a property by ID
    pub fn get(&self, id: &str) -> Result<&dyn ConfigProperty, ConfigError> {
        self.get_if_exists(id)
            .ok_or_else(|| ConfigError::UnknownProperty(id.to_string()))
    }

    pub fn get_if_exists(&self, id: &str) -> Option<&dyn ConfigProperty> {
        self.index.get(id).map(|&i| self.properties[i].as_ref())
    }

    /// All properties in registration order
    pub fn list(&self) -> impl Iterator<Item = &dyn ConfigProperty> {
        self.properties.iter().map(|p| p.as_ref())
    }

    /// True when some custom property owns `key` or a path below it
    pub fn has_custom_path(&self, key: &str) -> bool {
        self.list().any(|p| {
            p.is_custom()
                && (p.path() == key
                    || p.path()
                        .strip_prefix(key)
                        .is_some_and(|rest| rest.starts_with('.')))
        })
    }
}

impl Default for FieldConfigRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldkit_types::{Threshold, ThresholdsMode, Value};
    use serde_json::json;

    fn with_ctx<R>(field_type: FieldType, f: impl FnOnce(&FieldOverrideContext<'_>) -> R) -> R {
        let frame = DataFrame::new(
            None,
            vec![Field::new("value", field_type, vec![Value::from(1.0)])],
        );
        let data = std::slice::from_ref(&frame);
        let ctx = FieldOverrideContext {
            field: &frame.fields[0],
            frame: &frame,
            data,
        };
        f(&ctx)
    }

    #[test]
    fn test_standard_ids_in_order() {
        let registry = FieldConfigRegistry::standard();
        let ids: Vec<&str> = registry.list().map(|p| p.id()).collect();
        assert_eq!(ids[0], "unit");
        assert!(ids.contains(&"thresholds"));
        assert!(registry.get("decimals").is_ok());
        assert!(matches!(
            registry.get("nope"),
            Err(ConfigError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_decimals_processing() {
        let registry = FieldConfigRegistry::standard();
        let decimals = registry.get_if_exists("decimals").unwrap();
        with_ctx(FieldType::Number, |ctx| {
            assert_eq!(decimals.process(&json!(2), ctx).unwrap(), Some(json!(2)));
            assert_eq!(decimals.process(&json!("3"), ctx).unwrap(), Some(json!(3)));
            assert_eq!(decimals.process(&json!(1.6), ctx).unwrap(), Some(json!(2)));
            assert_eq!(decimals.process(&json!(null), ctx).unwrap(), None);
            assert!(matches!(
                decimals.process(&json!(40), ctx),
                Err(ProcessError::OutOfRange { .. })
            ));
            assert!(matches!(
                decimals.process(&json!("two"), ctx),
                Err(ProcessError::WrongType { .. })
            ));
        });
    }

    #[test]
    fn test_number_only_properties() {
        let registry = FieldConfigRegistry::standard();
        let min = registry.get_if_exists("min").unwrap();
        let unit = registry.get_if_exists("unit").unwrap();
        with_ctx(FieldType::String, |ctx| {
            assert!(!min.should_apply(ctx.field));
            assert!(unit.should_apply(ctx.field));
        });
    }

    #[test]
    fn test_thresholds_are_normalized() {
        let registry = FieldConfigRegistry::standard();
        let thresholds = registry.get_if_exists("thresholds").unwrap();
        let raw = json!({
            "mode": "absolute",
            "steps": [
                {"value": 80, "color": "red"},
                {"value": 5, "color": "green"}
            ]
        });
        let processed = with_ctx(FieldType::Number, |ctx| thresholds.process(&raw, ctx))
            .unwrap()
            .unwrap();
        let config: ThresholdsConfig = serde_json::from_value(processed).unwrap();
        assert_eq!(
            config,
            ThresholdsConfig::new(
                ThresholdsMode::Absolute,
                vec![Threshold::base("green"), Threshold::new(80.0, "red")]
            )
        );
    }

    #[test]
    fn test_color_from_name() {
        let registry = FieldConfigRegistry::standard();
        let color = registry.get_if_exists("color").unwrap();
        let processed = with_ctx(FieldType::Number, |ctx| color.process(&json!("red"), ctx));
        assert_eq!(
            processed.unwrap(),
            Some(json!({"mode": "fixed", "fixedColor": "red"}))
        );
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = FieldConfigRegistry::standard();
        registry.register(StandardProperty::custom("lineStyle.width", PropertyProcessor::Any));
        let width = registry.get_if_exists("custom.lineStyle.width").unwrap();
        assert!(width.is_custom());
        assert_eq!(width.path(), "lineStyle.width");
        assert!(registry.has_custom_path("lineStyle"));
        assert!(!registry.has_custom_path("line"));

        let before = registry.list().count();
        registry.register(StandardProperty::custom("lineStyle.width", PropertyProcessor::Text));
        assert_eq!(registry.list().count(), before);
    }
}
