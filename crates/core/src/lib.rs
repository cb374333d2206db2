//! fieldkit-core: the field display pipeline.
//!
//! This crate turns raw data frames plus a panel's field config into
//! resolved per-field configs and display processors: unit formatting,
//! decimal inference, value mappings, threshold scales and override
//! resolution. Everything here is synchronous and free of I/O.

pub mod decimals;
pub mod display;
pub mod interpolate;
pub mod mapping;
pub mod matchers;
pub mod min_max;
pub mod overrides;
pub mod pattern;
pub mod registry;
pub mod scale;
pub mod units;

pub use decimals::get_decimals_for_value;
pub use display::{
    get_display_processor, get_raw_display_processor, to_string_processor, DisplayProcessor,
    DisplayProcessorOptions,
};
pub use interpolate::{
    DataLinkPostProcessor, NoopInterpolator, TemplateVariables, VariableInterpolator,
};
pub use mapping::{get_mapped_value, ValueMapper};
pub use matchers::{FieldMatcher, FieldMatcherRegistry, MatcherError, MatcherFactory};
pub use min_max::find_numeric_field_min_max;
pub use overrides::{
    apply_field_overrides, set_dynamic_config_value, set_field_config_defaults,
    ApplyFieldOverrideOptions,
};
pub use registry::{
    ConfigProperty, FieldConfigRegistry, FieldOverrideContext, ProcessError, PropertyProcessor,
    StandardProperty,
};
pub use scale::{get_min_max_and_delta, get_scale_calculator, ScaleCalculator, ScaleResult};
pub use units::{get_value_format, is_date_unit, UnitRegistry, ValueFormatter};

// Re-export the data types the pipeline works on
pub use fieldkit_types::*;
