//! Scale position and color for a single field

use crate::min_max::field_min_max;
use fieldkit_types::{
    Field, FieldColorMode, FieldType, NumericRange, Theme, Threshold, ThresholdsConfig,
    ThresholdsMode,
};
use std::sync::Arc;

/// Where a value sits in its field's range and how to color it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScaleResult {
    /// `(value - min) / (max - min)`, not clamped; 0 when undefined
    pub percent: f64,
    pub threshold: Option<Threshold>,
    pub color: Option<String>,
}

/// Effective bounds of a field.
///
/// Explicit `min`/`max` win, then the range attached during override
/// resolution, then the field's own values. Non-number fields always scale
/// over 0..100.
pub fn get_min_max_and_delta(field: &Field) -> NumericRange {
    if field.resolved_type() != FieldType::Number {
        return NumericRange::new(Some(0.0), Some(100.0));
    }

    let state = field.state.range.unwrap_or_default();
    let mut min = field.config.min.or(state.min);
    let mut max = field.config.max.or(state.max);

    if min.is_none() || max.is_none() {
        let own = field_min_max(field);
        min = min.or(own.min);
        max = max.or(own.max);
    }

    NumericRange::new(Some(min.unwrap_or(0.0)), Some(max.unwrap_or(100.0)))
}

/// Color source resolved once per field
#[derive(Debug, Clone)]
enum ColorSource {
    Thresholds,
    Fixed(String),
    Palette(String),
    None,
}

#[derive(Debug, Clone)]
pub struct ScaleCalculator {
    range: NumericRange,
    thresholds: Option<ThresholdsConfig>,
    color: ColorSource,
    theme: Arc<Theme>,
}

impl ScaleCalculator {
    pub fn new(field: &Field, theme: Arc<Theme>) -> Self {
        let config = &field.config;
        let thresholds = config
            .thresholds
            .clone()
            .filter(|t| !t.steps.is_empty())
            .map(ThresholdsConfig::normalized);

        let color = match &config.color {
            Some(c) => match c.mode {
                FieldColorMode::Thresholds => ColorSource::Thresholds,
                FieldColorMode::Fixed => ColorSource::Fixed(
                    c.fixed_color
                        .as_deref()
                        .map(|name| theme.get_color_by_name(name))
                        .unwrap_or_else(|| theme.text_color.clone()),
                ),
                FieldColorMode::PaletteClassic => ColorSource::Palette(
                    theme.classic_palette_color(field.state.series_index.unwrap_or(0)),
                ),
            },
            None if thresholds.is_some() => ColorSource::Thresholds,
            None => ColorSource::None,
        };

        Self {
            range: get_min_max_and_delta(field),
            thresholds,
            color,
            theme,
        }
    }

    pub fn calculate(&self, value: f64) -> ScaleResult {
        let percent = self.percent(value);

        let threshold = self.thresholds.as_ref().and_then(|t| {
            let probe = match t.mode {
                ThresholdsMode::Absolute => value,
                ThresholdsMode::Percentage if value.is_finite() => percent * 100.0,
                ThresholdsMode::Percentage => value,
            };
            t.active_step(probe).cloned()
        });

        let color = match &self.color {
            ColorSource::Thresholds => threshold
                .as_ref()
                .map(|step| self.theme.get_color_by_name(&step.color)),
            ColorSource::Fixed(c) | ColorSource::Palette(c) => Some(c.clone()),
            ColorSource::None => None,
        };

        ScaleResult {
            percent,
            threshold,
            color,
        }
    }

    fn percent(&self, value: f64) -> f64 {
        let (Some(min), Some(_)) = (self.range.min, self.range.max) else {
            return 0.0;
        };
        if value == f64::NEG_INFINITY || self.range.delta == 0.0 {
            return 0.0;
        }
        let percent = (value - min) / self.range.delta;
        if percent.is_finite() {
            percent
        } else {
            0.0
        }
    }
}

/// Build the scale function for a field
pub fn get_scale_calculator(field: &Field, theme: Arc<Theme>) -> ScaleCalculator {
    ScaleCalculator::new(field, theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldkit_types::{FieldColor, FieldConfig, Value};

    fn number_field(config: FieldConfig) -> Field {
        Field::new(
            "value",
            FieldType::Number,
            vec![Value::from(10.0), Value::from(30.0)],
        )
        .with_config(config)
    }

    fn ladder(mode: ThresholdsMode) -> ThresholdsConfig {
        ThresholdsConfig::new(
            mode,
            vec![
                Threshold::base("green"),
                Threshold::new(50.0, "orange"),
                Threshold::new(80.0, "red"),
            ],
        )
    }

    #[test]
    fn test_percent_and_threshold_color() {
        let field = number_field(FieldConfig {
            min: Some(0.0),
            max: Some(100.0),
            thresholds: Some(ladder(ThresholdsMode::Absolute)),
            ..FieldConfig::default()
        });
        let calc = get_scale_calculator(&field, Arc::new(Theme::dark()));

        let r = calc.calculate(65.0);
        assert_eq!(r.percent, 0.65);
        assert_eq!(r.color.as_deref(), Some("#FF9830"));

        let r = calc.calculate(80.0);
        assert_eq!(r.threshold.map(|t| t.color), Some("red".to_string()));

        // out of range still yields a percent
        assert_eq!(calc.calculate(150.0).percent, 1.5);
    }

    #[test]
    fn test_negative_infinity_hits_base_step() {
        let field = number_field(FieldConfig {
            thresholds: Some(ladder(ThresholdsMode::Absolute)),
            ..FieldConfig::default()
        });
        let calc = get_scale_calculator(&field, Arc::new(Theme::dark()));
        let r = calc.calculate(f64::NEG_INFINITY);
        assert_eq!(r.percent, 0.0);
        assert_eq!(r.color.as_deref(), Some("#73BF69"));
        assert_eq!(calc.calculate(f64::NAN).color.as_deref(), Some("#73BF69"));
    }

    #[test]
    fn test_percentage_mode() {
        let field = number_field(FieldConfig {
            min: Some(0.0),
            max: Some(200.0),
            thresholds: Some(ladder(ThresholdsMode::Percentage)),
            ..FieldConfig::default()
        });
        let calc = get_scale_calculator(&field, Arc::new(Theme::dark()));
        // 120 of 0..200 is 60%
        let r = calc.calculate(120.0);
        assert_eq!(r.threshold.map(|t| t.color), Some("orange".to_string()));
    }

    #[test]
    fn test_range_resolution() {
        let mut field = number_field(FieldConfig::default());
        assert_eq!(get_min_max_and_delta(&field), NumericRange::new(Some(10.0), Some(30.0)));

        field.state.range = Some(NumericRange::new(Some(-5.0), Some(500.0)));
        field.config.max = Some(40.0);
        assert_eq!(get_min_max_and_delta(&field), NumericRange::new(Some(-5.0), Some(40.0)));

        let text = Field::new("name", FieldType::String, vec!["a".into()]);
        assert_eq!(get_min_max_and_delta(&text).delta, 100.0);
    }

    #[test]
    fn test_degenerate_range() {
        let field = number_field(FieldConfig {
            min: Some(5.0),
            max: Some(5.0),
            ..FieldConfig::default()
        });
        let calc = get_scale_calculator(&field, Arc::new(Theme::dark()));
        assert_eq!(calc.calculate(5.0).percent, 0.0);
        assert_eq!(calc.calculate(5.0).color, None);
    }

    #[test]
    fn test_fixed_and_palette_colors() {
        let theme = Arc::new(Theme::dark());
        let fixed = number_field(FieldConfig {
            color: Some(FieldColor::fixed("purple")),
            ..FieldConfig::default()
        });
        assert_eq!(
            get_scale_calculator(&fixed, theme.clone()).calculate(1.0).color.as_deref(),
            Some("#B877D9")
        );

        let mut palette = number_field(FieldConfig {
            color: Some(FieldColor {
                mode: FieldColorMode::PaletteClassic,
                fixed_color: None,
            }),
            ..FieldConfig::default()
        });
        palette.state.series_index = Some(1);
        assert_eq!(
            get_scale_calculator(&palette, theme).calculate(1.0).color.as_deref(),
            Some("#EAB839")
        );
    }
}
