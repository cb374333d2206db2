//! fieldkit-types: Shared data types for fieldkit.
//!
//! This crate contains the pure data types (values, fields, frames, field
//! configuration, override rules, theme) that the display pipeline in
//! fieldkit-core computes over. Everything here is serde-serializable in the
//! camelCase shape dashboards persist.

pub mod color;
pub mod config;
pub mod display;
pub mod field;
pub mod mapping;
pub mod scoped;
pub mod source;
pub mod theme;
pub mod thresholds;
pub mod time_zone;
pub mod value;

// Re-export commonly used types at the crate root for convenience
pub use color::Color;
pub use config::{ConfigError, DataLink, FieldColor, FieldColorMode, FieldConfig};
pub use display::{DecimalCount, DecimalInfo, DisplayValue, FormattedValue, ValueDisplay};
pub use field::{DataFrame, Field, FieldState, FieldType, NumericRange};
pub use mapping::{
    MappingResult, RangeMapOptions, RegexMapOptions, SpecialValueMatch, SpecialValueOptions,
    ValueMapping,
};
pub use scoped::{ScopedVar, ScopedVars};
pub use source::{DynamicConfigValue, FieldConfigSource, MatcherConfig, OverrideRule};
pub use theme::Theme;
pub use thresholds::{Threshold, ThresholdsConfig, ThresholdsMode};
pub use time_zone::TimeZone;
pub use value::{number_to_string, parse_float, string_to_number, Value};
