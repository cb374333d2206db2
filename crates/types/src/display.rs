//! Output types of the display pipeline

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Explicit or inferred number of decimals; `None` means infer
pub type DecimalCount = Option<i32>;

/// Result of decimal precision inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecimalInfo {
    pub decimals: i32,
    /// `None` when decimals were set explicitly
    pub scaled_decimals: Option<i32>,
}

/// Output of a unit formatter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormattedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl FormattedValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_suffix(text: impl Into<String>, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        Self {
            prefix: None,
            text: text.into(),
            suffix: (!suffix.is_empty()).then_some(suffix),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, text: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
            text: text.into(),
            suffix: None,
        }
    }
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            self.text,
            self.suffix.as_deref().unwrap_or("")
        )
    }
}

/// The rendered representation of one cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayValue {
    pub text: String,
    /// Numeric interpretation; NaN when there is none, `None` for raw display
    pub numeric: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Position in the field's range, 0..1 inside the bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            self.text,
            self.suffix.as_deref().unwrap_or("")
        )
    }
}

/// Anything that turns a raw cell value into a display value.
///
/// Override resolution attaches one of these to every field it resolves.
pub trait ValueDisplay: Send + Sync + fmt::Debug {
    fn display(&self, value: &Value) -> DisplayValue;
}
