//! Value mapping rules: replace a value with custom text and color

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a matching rule produces
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Ordering hint for legends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl MappingResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Inclusive numeric range; an absent bound is open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeMapOptions {
    #[serde(default)]
    pub from: Option<f64>,
    #[serde(default)]
    pub to: Option<f64>,
    pub result: MappingResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexMapOptions {
    /// `/pattern/flags`, or a bare pattern that must match the whole text
    pub pattern: String,
    pub result: MappingResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialValueMatch {
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "nan")]
    NaN,
    #[serde(rename = "null+nan")]
    NullAndNaN,
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
    #[serde(rename = "empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialValueOptions {
    #[serde(rename = "match")]
    pub match_on: SpecialValueMatch,
    pub result: MappingResult,
}

/// One mapping rule; lists of rules are evaluated first-match-wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueMapping {
    /// Exact match on the value's text form
    Value {
        options: BTreeMap<String, MappingResult>,
    },
    Range {
        options: RangeMapOptions,
    },
    Regex {
        options: RegexMapOptions,
    },
    Special {
        options: SpecialValueOptions,
    },
}

impl ValueMapping {
    /// Exact-value rule with a single entry
    pub fn value(key: impl Into<String>, result: MappingResult) -> Self {
        let mut options = BTreeMap::new();
        options.insert(key.into(), result);
        ValueMapping::Value { options }
    }

    pub fn range(from: Option<f64>, to: Option<f64>, result: MappingResult) -> Self {
        ValueMapping::Range {
            options: RangeMapOptions { from, to, result },
        }
    }

    pub fn regex(pattern: impl Into<String>, result: MappingResult) -> Self {
        ValueMapping::Regex {
            options: RegexMapOptions {
                pattern: pattern.into(),
                result,
            },
        }
    }

    pub fn special(match_on: SpecialValueMatch, result: MappingResult) -> Self {
        ValueMapping::Special {
            options: SpecialValueOptions { match_on, result },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_json_shape() {
        let json = r#"[
            {"type": "value", "options": {"0": {"text": "Zero", "color": "red"}}},
            {"type": "range", "options": {"from": 10, "to": null, "result": {"text": "High"}}},
            {"type": "regex", "options": {"pattern": "/^srv-(.*)$/", "result": {"text": "$1"}}},
            {"type": "special", "options": {"match": "null+nan", "result": {"text": "-"}}}
        ]"#;
        let mappings: Vec<ValueMapping> = serde_json::from_str(json).unwrap();
        assert_eq!(mappings.len(), 4);
        assert_eq!(
            mappings[0],
            ValueMapping::value("0", MappingResult::text("Zero").with_color("red"))
        );
        assert_eq!(
            mappings[1],
            ValueMapping::range(Some(10.0), None, MappingResult::text("High"))
        );
        assert_eq!(
            mappings[3],
            ValueMapping::special(SpecialValueMatch::NullAndNaN, MappingResult::text("-"))
        );
    }
}
