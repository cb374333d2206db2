//! Display processors: raw cell value to [`DisplayValue`]
//!
//! A processor is built once per field and applied to every cell of it.
//! Everything that depends only on the field (unit lookup, compiled mapping
//! rules, scale bounds) is resolved up front in [`get_display_processor`].

use crate::decimals::get_decimals_for_value;
use crate::mapping::ValueMapper;
use crate::scale::{ScaleCalculator, ScaleResult};
use crate::units::date::parse_date_time;
use crate::units::{get_value_format, is_date_unit, ValueFormatter, STRING_UNIT, SYSTEM_DATE_UNIT};
use fieldkit_types::{
    DecimalCount, DisplayValue, Field, FieldType, Theme, TimeZone, Value, ValueDisplay,
};
use std::sync::Arc;

/// Context for building a field's processor
#[derive(Debug, Clone, Default)]
pub struct DisplayProcessorOptions<'a> {
    pub field: Option<&'a Field>,
    pub theme: Arc<Theme>,
    pub time_zone: TimeZone,
    /// Axis tick spacing; drives precision when the field sets no decimals
    pub tick_size: Option<f64>,
}

impl<'a> DisplayProcessorOptions<'a> {
    pub fn for_field(field: &'a Field, theme: Arc<Theme>) -> Self {
        Self {
            field: Some(field),
            theme,
            time_zone: TimeZone::default(),
            tick_size: None,
        }
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = Some(tick_size);
        self
    }
}

/// Per-field state closed over by a field processor
#[derive(Debug, Clone)]
struct FieldDisplay {
    formatter: ValueFormatter,
    scale: ScaleCalculator,
    mapper: ValueMapper,
    theme: Arc<Theme>,
    time_zone: TimeZone,
    decimals: DecimalCount,
    no_value: Option<String>,
    is_string_unit: bool,
    is_date: bool,
    /// Text that fails to parse here counts as missing data
    expects_number: bool,
}

#[derive(Debug, Clone)]
enum ProcessorKind {
    /// Stringify, numeric coercion, nothing else
    Text,
    /// Stringify only
    Raw,
    Field(Box<FieldDisplay>),
}

/// Turns cell values into display values
#[derive(Debug, Clone)]
pub struct DisplayProcessor {
    kind: ProcessorKind,
}

impl DisplayProcessor {
    pub fn apply(&self, value: &Value) -> DisplayValue {
        match &self.kind {
            ProcessorKind::Text => DisplayValue {
                text: value.to_display_string(),
                numeric: Some(value.to_number()),
                ..DisplayValue::default()
            },
            ProcessorKind::Raw => DisplayValue {
                text: value.to_display_string(),
                numeric: None,
                ..DisplayValue::default()
            },
            ProcessorKind::Field(display) => display.apply(value),
        }
    }

    /// The unit formatter in use, `None` for text and raw processors
    pub fn formatter(&self) -> Option<&ValueFormatter> {
        match &self.kind {
            ProcessorKind::Field(display) => Some(&display.formatter),
            _ => None,
        }
    }
}

impl ValueDisplay for DisplayProcessor {
    fn display(&self, value: &Value) -> DisplayValue {
        self.apply(value)
    }
}

impl FieldDisplay {
    fn new(field: &Field, options: &DisplayProcessorOptions<'_>) -> Self {
        let config = &field.config;

        let mut unit = config.unit.as_deref();
        if field.resolved_type() == FieldType::Time && !unit.is_some_and(is_date_unit) {
            unit = Some(SYSTEM_DATE_UNIT);
        }
        let formatter = get_value_format(unit);

        let decimals = config.decimals.or_else(|| {
            options
                .tick_size
                .filter(|t| t.is_finite())
                .map(|t| get_decimals_for_value(t, None).decimals)
        });

        let is_string_unit = unit == Some(STRING_UNIT);
        Self {
            expects_number: field.resolved_type() == FieldType::Number && !is_string_unit,
            is_string_unit,
            is_date: formatter.is_date(),
            formatter,
            scale: ScaleCalculator::new(field, Arc::clone(&options.theme)),
            mapper: ValueMapper::new(&config.mappings),
            theme: Arc::clone(&options.theme),
            time_zone: options.time_zone,
            decimals,
            no_value: config.no_value.clone(),
        }
    }

    fn apply(&self, value: &Value) -> DisplayValue {
        let parsed;
        let value = match value {
            Value::Text(s) if self.is_date => {
                parsed = Value::Number(parse_date_time(s, &self.time_zone));
                &parsed
            }
            _ => value,
        };

        let mut text = value.to_display_string();
        let mut numeric = if self.is_string_unit {
            f64::NAN
        } else {
            value.to_number()
        };
        let mut prefix = None;
        let mut suffix = None;
        let mut color = None;
        let mut mapped = false;
        let mut should_format = true;

        if let Some(result) = self.mapper.map_value(value) {
            if let Some(mapped_text) = result.text {
                if !self.is_string_unit {
                    let v = Value::Text(mapped_text.clone()).to_number();
                    if !v.is_nan() {
                        numeric = v;
                    }
                }
                text = mapped_text;
                mapped = true;
                should_format = false;
            }
            color = result.color.map(|c| self.theme.get_color_by_name(&c));
        }

        if !numeric.is_nan() {
            if should_format && !value.is_bool() {
                let info = get_decimals_for_value(numeric, self.decimals);
                let formatted = self.formatter.format(
                    numeric,
                    Some(info.decimals),
                    info.scaled_decimals,
                    &self.time_zone,
                );
                text = formatted.text;
                prefix = formatted.prefix;
                suffix = formatted.suffix;

                if let Some(result) = self.mapper.map_value(&Value::Text(text.clone())) {
                    if let Some(mapped_text) = result.text {
                        text = mapped_text;
                    }
                    if color.is_none() {
                        color = result.color.map(|c| self.theme.get_color_by_name(&c));
                    }
                }
            }

            if !text.is_empty() {
                let scale = self.scale.calculate(numeric);
                return finish(text, numeric, prefix, suffix, color, scale);
            }
        }

        // Mapped labels stand; missing or unparseable numbers show noValue
        let missing = value.is_null() || value.is_nan_number() || self.expects_number;
        if text.is_empty() || (missing && !mapped) {
            if let Some(no_value) = &self.no_value {
                text = no_value.clone();
            }
        }
        let scale = self.scale.calculate(f64::NEG_INFINITY);
        finish(text, numeric, prefix, suffix, color, scale)
    }
}

fn finish(
    text: String,
    numeric: f64,
    prefix: Option<String>,
    suffix: Option<String>,
    color: Option<String>,
    scale: ScaleResult,
) -> DisplayValue {
    DisplayValue {
        text,
        numeric: Some(numeric),
        prefix,
        suffix,
        color: color.or(scale.color),
        percent: Some(scale.percent),
    }
}

/// Build the processor for a field.
///
/// Without options, or without a field, the result only stringifies
/// (see [`to_string_processor`]).
pub fn get_display_processor(options: Option<DisplayProcessorOptions<'_>>) -> DisplayProcessor {
    match options {
        Some(options) => match options.field {
            Some(field) => DisplayProcessor {
                kind: ProcessorKind::Field(Box::new(FieldDisplay::new(field, &options))),
            },
            None => to_string_processor(),
        },
        None => to_string_processor(),
    }
}

/// `text = toString(value)`, `numeric = toNumber(value)`
pub fn to_string_processor() -> DisplayProcessor {
    DisplayProcessor {
        kind: ProcessorKind::Text,
    }
}

/// `text = toString(value)` with no numeric interpretation at all
pub fn get_raw_display_processor() -> DisplayProcessor {
    DisplayProcessor {
        kind: ProcessorKind::Raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldkit_types::{
        FieldConfig, MappingResult, Threshold, ThresholdsConfig, ThresholdsMode, ValueMapping,
    };

    fn processor(field_type: FieldType, config: FieldConfig) -> DisplayProcessor {
        let field = Field::new("value", field_type, vec![]).with_config(config);
        get_display_processor(Some(
            DisplayProcessorOptions::for_field(&field, Arc::new(Theme::dark()))
                .with_time_zone(TimeZone::Utc),
        ))
    }

    fn thresholds() -> ThresholdsConfig {
        ThresholdsConfig::new(
            ThresholdsMode::Absolute,
            vec![Threshold::base("green"), Threshold::new(80.0, "red")],
        )
    }

    #[test]
    fn test_fallback_processors() {
        let v = get_display_processor(None).apply(&Value::Number(5.0));
        assert_eq!(v.text, "5");
        assert_eq!(v.numeric, Some(5.0));
        assert_eq!(v.color, None);

        let no_field = DisplayProcessorOptions::default();
        let v = get_display_processor(Some(no_field)).apply(&Value::Number(5.0));
        assert_eq!(v, to_string_processor().apply(&Value::Number(5.0)));
    }

    #[test]
    fn test_raw_processor() {
        let raw = get_raw_display_processor();
        for value in [Value::from("hello"), Value::Number(1.5), Value::Null] {
            let v = raw.apply(&value);
            assert_eq!(v.text, value.to_display_string());
            assert_eq!(v.numeric, None);
        }
    }

    #[test]
    fn test_inferred_and_explicit_decimals() {
        let p = processor(FieldType::Number, FieldConfig::default());
        assert_eq!(p.apply(&Value::Number(1.2345)).text, "1.23");

        let p = processor(
            FieldType::Number,
            FieldConfig {
                decimals: Some(1),
                ..FieldConfig::default()
            },
        );
        assert_eq!(p.apply(&Value::Number(12.3456)).text, "12.3");
    }

    #[test]
    fn test_unit_suffix_and_color() {
        let p = processor(
            FieldType::Number,
            FieldConfig {
                unit: Some("ms".into()),
                min: Some(0.0),
                max: Some(500.0),
                thresholds: Some(thresholds()),
                ..FieldConfig::default()
            },
        );
        let v = p.apply(&Value::Number(250.0));
        assert_eq!(v.text, "250");
        assert_eq!(v.suffix.as_deref(), Some(" ms"));
        assert_eq!(v.to_string(), "250 ms");
        assert_eq!(v.percent, Some(0.5));
        assert_eq!(v.color.as_deref(), Some("#F2495C"));
    }

    #[test]
    fn test_time_field_defaults_to_date_unit() {
        let p = processor(FieldType::Time, FieldConfig::default());
        assert_eq!(p.formatter().map(|f| f.id()), Some("dateTimeAsSystem"));

        let v = p.apply(&Value::from("2021-03-04T05:06:07.089Z"));
        assert_eq!(v.text, "2021-03-04 05:06:07");
        assert_eq!(v.numeric, Some(1_614_834_367_089.0));

        let v = p.apply(&Value::Number(1_614_834_367_089.0));
        assert_eq!(v.text, "2021-03-04 05:06:07");
    }

    #[test]
    fn test_time_field_keeps_date_unit() {
        let p = processor(
            FieldType::Time,
            FieldConfig {
                unit: Some("dateTimeAsUS".into()),
                ..FieldConfig::default()
            },
        );
        assert_eq!(
            p.apply(&Value::Number(1_614_834_367_089.0)).text,
            "03/04/2021 5:06:07 am"
        );
    }

    #[test]
    fn test_mapping_short_circuits_formatting() {
        let p = processor(
            FieldType::Number,
            FieldConfig {
                unit: Some("ms".into()),
                mappings: vec![ValueMapping::value("0", MappingResult::text("Zero"))],
                ..FieldConfig::default()
            },
        );
        let v = p.apply(&Value::Number(0.0));
        assert_eq!(v.text, "Zero");
        assert_eq!(v.numeric, Some(0.0));
        assert_eq!(v.suffix, None);
    }

    #[test]
    fn test_numeric_mapping_text_sets_numeric() {
        let p = processor(
            FieldType::Number,
            FieldConfig {
                mappings: vec![ValueMapping::value("0", MappingResult::text("5"))],
                ..FieldConfig::default()
            },
        );
        let v = p.apply(&Value::Number(0.0));
        assert_eq!(v.text, "5");
        assert_eq!(v.numeric, Some(5.0));
    }

    #[test]
    fn test_mapping_on_formatted_text() {
        let p = processor(
            FieldType::Number,
            FieldConfig {
                decimals: Some(1),
                mappings: vec![ValueMapping::value(
                    "2.0",
                    MappingResult::text("two").with_color("blue"),
                )],
                ..FieldConfig::default()
            },
        );
        let v = p.apply(&Value::Number(2.04));
        assert_eq!(v.text, "two");
        assert_eq!(v.numeric, Some(2.04));
        assert_eq!(v.color.as_deref(), Some("#5794F2"));
    }

    #[test]
    fn test_no_value_fallback() {
        let p = processor(
            FieldType::Number,
            FieldConfig {
                no_value: Some("N/A".into()),
                thresholds: Some(thresholds()),
                ..FieldConfig::default()
            },
        );
        for value in [Value::Number(f64::NAN), Value::Null, Value::from("")] {
            let v = p.apply(&value);
            assert_eq!(v.text, "N/A");
            assert_eq!(v.color.as_deref(), Some("#73BF69"));
        }

        // unparseable text is replaced too, colored as missing data
        let v = p.apply(&Value::from("hello"));
        assert_eq!(v.text, "N/A");
        assert!(v.numeric.is_some_and(f64::is_nan));
        assert_eq!(v.color.as_deref(), Some("#73BF69"));
    }

    #[test]
    fn test_string_field_keeps_text_with_no_value() {
        let p = processor(
            FieldType::String,
            FieldConfig {
                no_value: Some("N/A".into()),
                ..FieldConfig::default()
            },
        );
        assert_eq!(p.apply(&Value::from("web-1")).text, "web-1");
        assert_eq!(p.apply(&Value::Null).text, "N/A");
    }

    #[test]
    fn test_unparseable_text_without_no_value() {
        let p = processor(FieldType::Number, FieldConfig::default());
        let v = p.apply(&Value::from("hello"));
        assert_eq!(v.text, "hello");
        assert!(v.numeric.is_some_and(f64::is_nan));
    }

    #[test]
    fn test_empty_text_without_no_value() {
        let p = processor(FieldType::Number, FieldConfig::default());
        assert_eq!(p.apply(&Value::Null).text, "");
    }

    #[test]
    fn test_string_unit_never_coerces() {
        let p = processor(
            FieldType::String,
            FieldConfig {
                unit: Some("string".into()),
                ..FieldConfig::default()
            },
        );
        let v = p.apply(&Value::from("0042"));
        assert_eq!(v.text, "0042");
        assert!(v.numeric.is_some_and(f64::is_nan));
    }

    #[test]
    fn test_booleans_are_not_formatted() {
        let p = processor(
            FieldType::Boolean,
            FieldConfig {
                unit: Some("percent".into()),
                ..FieldConfig::default()
            },
        );
        let v = p.apply(&Value::Bool(true));
        assert_eq!(v.text, "true");
        assert_eq!(v.numeric, Some(1.0));
        assert_eq!(p.apply(&Value::Bool(false)).numeric, Some(0.0));
    }

    #[test]
    fn test_tick_size_drives_decimals() {
        let field = Field::new("value", FieldType::Number, vec![]);
        let p = get_display_processor(Some(
            DisplayProcessorOptions::for_field(&field, Arc::new(Theme::dark())).with_tick_size(10.0),
        ));
        assert_eq!(p.apply(&Value::Number(12.34)).text, "12");
    }

    #[test]
    fn test_sentinels_never_panic() {
        let p = processor(
            FieldType::Number,
            FieldConfig {
                unit: Some("bytes".into()),
                ..FieldConfig::default()
            },
        );
        assert_eq!(p.apply(&Value::Number(f64::INFINITY)).text, "∞");
        assert_eq!(p.apply(&Value::Number(f64::NEG_INFINITY)).text, "-∞");
    }
}
