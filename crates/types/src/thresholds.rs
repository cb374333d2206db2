//! Threshold steps: ascending color bands over a numeric range

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How step values are compared against a display value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdsMode {
    /// Compare against the raw value
    #[default]
    Absolute,
    /// Compare against the value's position in its range, 0..100
    Percentage,
}

/// One step of a threshold ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Lower bound of the band; the base step uses -Infinity (stored as null)
    #[serde(with = "step_value", default = "neg_infinity")]
    pub value: f64,
    pub color: String,
}

impl Threshold {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
        }
    }

    /// The base step every ladder starts with
    pub fn base(color: impl Into<String>) -> Self {
        Self::new(f64::NEG_INFINITY, color)
    }
}

fn neg_infinity() -> f64 {
    f64::NEG_INFINITY
}

mod step_value {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

/// A threshold ladder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default)]
    pub mode: ThresholdsMode,
    #[serde(default)]
    pub steps: Vec<Threshold>,
}

impl ThresholdsConfig {
    pub fn new(mode: ThresholdsMode, steps: Vec<Threshold>) -> Self {
        Self { mode, steps }
    }

    /// Sort steps ascending and pin the first one to -Infinity
    pub fn normalize(&mut self) {
        self.steps.sort_by(|a, b| a.value.total_cmp(&b.value));
        if let Some(first) = self.steps.first_mut() {
            first.value = f64::NEG_INFINITY;
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// The last step whose value is `<= value`; the base step for NaN and -Infinity
    pub fn active_step(&self, value: f64) -> Option<&Threshold> {
        let first = self.steps.first()?;
        if value.is_nan() || value == f64::NEG_INFINITY {
            return Some(first);
        }
        let mut active = first;
        for step in &self.steps[1..] {
            if value >= step.value {
                active = step;
            } else {
                break;
            }
        }
        Some(active)
    }
}
