//! Fields and data frames: the tabular data a panel displays

use crate::config::{DataLink, FieldConfig};
use crate::display::ValueDisplay;
use crate::value::{looks_numeric, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Type of data a field contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Epoch milliseconds or parseable timestamps
    Time,
    Number,
    String,
    Boolean,
    #[default]
    Other,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Time => "time",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Other => "other",
        }
    }

    /// Guess a type from a single sample value
    pub fn guess_from_value(value: &Value) -> FieldType {
        match value {
            Value::Number(_) => FieldType::Number,
            Value::Bool(_) => FieldType::Boolean,
            Value::Text(s) if looks_numeric(s) => FieldType::Number,
            Value::Text(s) if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") => {
                FieldType::Boolean
            }
            Value::Text(_) => FieldType::String,
            _ => FieldType::Other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(FieldType::Time),
            "number" => Ok(FieldType::Number),
            "string" => Ok(FieldType::String),
            "boolean" => Ok(FieldType::Boolean),
            "other" => Ok(FieldType::Other),
            _ => Err(format!("Unknown field type: {}", s)),
        }
    }
}

/// Numeric bounds used to place values on a scale
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `max - min`, or 0 when either bound is missing
    pub delta: f64,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let delta = match (min, max) {
            (Some(min), Some(max)) => max - min,
            _ => 0.0,
        };
        Self { min, max, delta }
    }
}

/// Derived, non-persisted data attached to a field during resolution
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    pub display_name: Option<String>,
    /// Position among the non-time fields of all frames
    pub series_index: Option<usize>,
    pub range: Option<NumericRange>,
    /// Links after interpolation and post-processing
    pub links: Vec<DataLink>,
    pub display: Option<Arc<dyn ValueDisplay>>,
}

/// A named, typed column of values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub config: FieldConfig,
    #[serde(skip)]
    pub state: FieldState,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            field_type,
            values,
            config: FieldConfig::default(),
            state: FieldState::default(),
        }
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Name shown to users: resolved display name, configured name, or raw name
    pub fn display_name(&self) -> &str {
        self.state
            .display_name
            .as_deref()
            .or(self.config.display_name.as_deref())
            .unwrap_or(&self.name)
    }

    /// The declared type, or a guess from the first non-null value for `other`
    pub fn resolved_type(&self) -> FieldType {
        if self.field_type != FieldType::Other {
            return self.field_type;
        }
        self.values
            .iter()
            .find(|v| !v.is_null())
            .map(FieldType::guess_from_value)
            .unwrap_or(FieldType::Other)
    }

    /// Display processor attached by override resolution, if any
    pub fn display(&self) -> Option<&Arc<dyn ValueDisplay>> {
        self.state.display.as_ref()
    }
}

/// A named collection of fields sharing a row count
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Identifier of the query that produced this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl DataFrame {
    pub fn new(name: Option<String>, fields: Vec<Field>) -> Self {
        Self {
            name,
            ref_id: None,
            fields,
        }
    }

    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    /// Row count
    pub fn length(&self) -> usize {
        self.fields.first().map(|f| f.values.len()).unwrap_or(0)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True when every field carries the same number of rows
    pub fn is_rectangular(&self) -> bool {
        let len = self.length();
        self.fields.iter().all(|f| f.values.len() == len)
    }
}
