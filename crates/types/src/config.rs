//! Per-field configuration and path-based access to its properties
//!
//! Config properties are addressed by path ("unit", "thresholds",
//! "custom.lineWidth"), which is how the property registry and override
//! rules refer to them. `get`/`set` translate between those paths and the
//! typed struct.

use crate::mapping::ValueMapping;
use crate::scoped::ScopedVars;
use crate::thresholds::ThresholdsConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Errors raised when writing a config property
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown config path: {0}")]
    UnknownPath(String),

    #[error("Unknown config property: {0}")]
    UnknownProperty(String),

    #[error("Invalid value for '{path}': {source}")]
    InvalidValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How a field picks its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldColorMode {
    #[default]
    #[serde(rename = "thresholds")]
    Thresholds,
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "palette-classic")]
    PaletteClassic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldColor {
    #[serde(default)]
    pub mode: FieldColorMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_color: Option<String>,
}

impl FieldColor {
    pub fn fixed(color: impl Into<String>) -> Self {
        Self {
            mode: FieldColorMode::Fixed,
            fixed_color: Some(color.into()),
        }
    }
}

/// A link rendered next to values; title and url may hold template variables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataLink {
    pub title: String,
    pub url: String,
}

/// Resolved configuration for a single field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Unit key; `"string"` disables numeric interpretation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Explicit precision; inferred per value when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Scale against the field's own values instead of all fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_min_max: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdsConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<ValueMapping>,
    /// Text shown when there is nothing else to show
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldColor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<DataLink>,
    /// Plugin specific properties
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, JsonValue>,
    #[serde(skip)]
    pub scoped_vars: Option<ScopedVars>,
}

fn to_json<T: Serialize>(value: &T) -> Option<JsonValue> {
    serde_json::to_value(value).ok()
}

fn from_json<T: DeserializeOwned>(path: &str, value: JsonValue) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(|source| ConfigError::InvalidValue {
        path: path.to_string(),
        source,
    })
}

impl FieldConfig {
    /// Read a standard property by path; `None` when unset
    pub fn get(&self, path: &str) -> Option<JsonValue> {
        match path {
            "displayName" => self.display_name.as_ref().and_then(to_json),
            "unit" => self.unit.as_ref().and_then(to_json),
            "decimals" => self.decimals.map(JsonValue::from),
            "min" => self.min.and_then(|v| to_json(&v)),
            "max" => self.max.and_then(|v| to_json(&v)),
            "fieldMinMax" => self.field_min_max.map(JsonValue::Bool),
            "thresholds" => self.thresholds.as_ref().and_then(to_json),
            "mappings" if !self.mappings.is_empty() => to_json(&self.mappings),
            "noValue" => self.no_value.as_ref().and_then(to_json),
            "color" => self.color.as_ref().and_then(to_json),
            "links" if !self.links.is_empty() => to_json(&self.links),
            _ => None,
        }
    }

    /// Write a standard property by path
    pub fn set(&mut self, path: &str, value: JsonValue) -> Result<(), ConfigError> {
        match path {
            "displayName" => self.display_name = Some(from_json(path, value)?),
            "unit" => self.unit = Some(from_json(path, value)?),
            "decimals" => self.decimals = Some(from_json(path, value)?),
            "min" => self.min = Some(from_json(path, value)?),
            "max" => self.max = Some(from_json(path, value)?),
            "fieldMinMax" => self.field_min_max = Some(from_json(path, value)?),
            "thresholds" => self.thresholds = Some(from_json(path, value)?),
            "mappings" => self.mappings = from_json(path, value)?,
            "noValue" => self.no_value = Some(from_json(path, value)?),
            "color" => self.color = Some(from_json(path, value)?),
            "links" => self.links = from_json(path, value)?,
            _ => return Err(ConfigError::UnknownPath(path.to_string())),
        }
        Ok(())
    }

    /// Read a custom property; dotted paths walk nested objects
    pub fn custom_value(&self, path: &str) -> Option<&JsonValue> {
        let mut parts = path.split('.');
        let mut current = self.custom.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current).filter(|v| !v.is_null())
    }

    /// Write a custom property, creating intermediate objects as needed
    pub fn set_custom(&mut self, path: &str, value: JsonValue) {
        let mut parts: Vec<&str> = path.split('.').collect();
        let Some(last) = parts.pop() else {
            return;
        };

        let mut target = &mut self.custom;
        for part in parts {
            let entry = target
                .entry(part.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !entry.is_object() {
                *entry = JsonValue::Object(Map::new());
            }
            match entry {
                JsonValue::Object(map) => target = map,
                _ => return,
            }
        }
        target.insert(last.to_string(), value);
    }

    /// Enforce cross-property invariants after merging
    ///
    /// Inverted bounds are swapped, and a config with thresholds but no
    /// color choice colors by thresholds.
    pub fn validate(&mut self) {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                self.min = Some(max);
                self.max = Some(min);
            }
        }
        if self.color.is_none() && self.thresholds.is_some() {
            self.color = Some(FieldColor::default());
        }
    }
}
