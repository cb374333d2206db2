//! Value mapping evaluation
//!
//! Rules are checked in order and the first match wins. Regex rules are
//! compiled once when the mapper is built; a rule whose pattern does not
//! compile never matches.

use crate::pattern::Pattern;
use fieldkit_types::{
    parse_float, MappingResult, RangeMapOptions, SpecialValueMatch, Value, ValueMapping,
};
use log::warn;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum CompiledRule {
    Value(BTreeMap<String, MappingResult>),
    Range(RangeMapOptions),
    Regex {
        pattern: Option<Pattern>,
        result: MappingResult,
    },
    Special {
        match_on: SpecialValueMatch,
        result: MappingResult,
    },
}

/// A list of mapping rules ready to evaluate against cell values
#[derive(Debug, Clone, Default)]
pub struct ValueMapper {
    rules: Vec<CompiledRule>,
}

impl ValueMapper {
    pub fn new(mappings: &[ValueMapping]) -> Self {
        let rules = mappings
            .iter()
            .map(|mapping| match mapping {
                ValueMapping::Value { options } => CompiledRule::Value(options.clone()),
                ValueMapping::Range { options } => CompiledRule::Range(options.clone()),
                ValueMapping::Regex { options } => {
                    let pattern = match Pattern::parse(&options.pattern) {
                        Ok(pattern) => Some(pattern),
                        Err(e) => {
                            warn!("Ignoring regex value mapping: {}", e);
                            None
                        }
                    };
                    CompiledRule::Regex {
                        pattern,
                        result: options.result.clone(),
                    }
                }
                ValueMapping::Special { options } => CompiledRule::Special {
                    match_on: options.match_on,
                    result: options.result.clone(),
                },
            })
            .collect();
        Self { rules }
    }

    /// Result of the first rule matching `value`, if any
    pub fn map_value(&self, value: &Value) -> Option<MappingResult> {
        self.rules.iter().find_map(|rule| apply_rule(rule, value))
    }
}

fn apply_rule(rule: &CompiledRule, value: &Value) -> Option<MappingResult> {
    match rule {
        CompiledRule::Value(options) => {
            if value.is_null() {
                return None;
            }
            options.get(&value.to_display_string()).cloned()
        }
        CompiledRule::Range(options) => {
            if options.from.is_none() && options.to.is_none() {
                return None;
            }
            let number = match value {
                Value::Number(n) => *n,
                Value::Text(s) => parse_float(s),
                _ => return None,
            };
            if number.is_nan() {
                return None;
            }
            let above = options.from.map_or(true, |from| number >= from);
            let below = options.to.map_or(true, |to| number <= to);
            (above && below).then(|| options.result.clone())
        }
        CompiledRule::Regex { pattern, result } => {
            let pattern = pattern.as_ref()?;
            let text = value.as_str()?;
            if !pattern.is_match(text) {
                return None;
            }
            let mut mapped = result.clone();
            if let Some(replacement) = &result.text {
                mapped.text = Some(pattern.replace(text, replacement));
            }
            Some(mapped)
        }
        CompiledRule::Special { match_on, result } => {
            let matched = match match_on {
                SpecialValueMatch::Null => value.is_null(),
                SpecialValueMatch::NaN => value.is_nan_number(),
                SpecialValueMatch::NullAndNaN => value.is_null() || value.is_nan_number(),
                SpecialValueMatch::True => {
                    matches!(value, Value::Bool(true)) || value.as_str() == Some("true")
                }
                SpecialValueMatch::False => {
                    matches!(value, Value::Bool(false)) || value.as_str() == Some("false")
                }
                SpecialValueMatch::Empty => value.as_str() == Some(""),
            };
            matched.then(|| result.clone())
        }
    }
}

/// Evaluate `mappings` against `value` without keeping a compiled mapper
pub fn get_mapped_value(mappings: &[ValueMapping], value: &Value) -> Option<MappingResult> {
    ValueMapper::new(mappings).map_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(mappings: &[ValueMapping], value: Value) -> Option<String> {
        get_mapped_value(mappings, &value).and_then(|r| r.text)
    }

    #[test]
    fn test_exact_value() {
        let mappings = vec![ValueMapping::value("0", MappingResult::text("Zero"))];
        assert_eq!(text_of(&mappings, Value::Number(0.0)), Some("Zero".into()));
        assert_eq!(text_of(&mappings, Value::from("0")), Some("Zero".into()));
        assert_eq!(text_of(&mappings, Value::Number(1.0)), None);
        assert_eq!(text_of(&mappings, Value::Null), None);
    }

    #[test]
    fn test_first_match_wins() {
        let mappings = vec![
            ValueMapping::range(Some(0.0), Some(10.0), MappingResult::text("low")),
            ValueMapping::range(Some(5.0), None, MappingResult::text("high")),
        ];
        assert_eq!(text_of(&mappings, Value::Number(7.0)), Some("low".into()));
        assert_eq!(text_of(&mappings, Value::Number(10.0)), Some("low".into()));
        assert_eq!(text_of(&mappings, Value::Number(11.0)), Some("high".into()));
        assert_eq!(text_of(&mappings, Value::from("12px")), Some("high".into()));
        assert_eq!(text_of(&mappings, Value::Number(-1.0)), None);
    }

    #[test]
    fn test_regex_substitution() {
        let mappings = vec![ValueMapping::regex(
            "/^srv-(.*)$/",
            MappingResult::text("server $1"),
        )];
        assert_eq!(text_of(&mappings, Value::from("srv-db")), Some("server db".into()));
        assert_eq!(text_of(&mappings, Value::from("host-db")), None);
        assert_eq!(text_of(&mappings, Value::Number(3.0)), None);
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        let mappings = vec![
            ValueMapping::regex("/(broken/", MappingResult::text("never")),
            ValueMapping::value("x", MappingResult::text("fallback")),
        ];
        assert_eq!(text_of(&mappings, Value::from("x")), Some("fallback".into()));
    }

    #[test]
    fn test_special_values() {
        let mappings = vec![
            ValueMapping::special(SpecialValueMatch::NullAndNaN, MappingResult::text("-")),
            ValueMapping::special(SpecialValueMatch::True, MappingResult::text("yes")),
            ValueMapping::special(SpecialValueMatch::Empty, MappingResult::text("blank")),
        ];
        assert_eq!(text_of(&mappings, Value::Null), Some("-".into()));
        assert_eq!(text_of(&mappings, Value::Number(f64::NAN)), Some("-".into()));
        assert_eq!(text_of(&mappings, Value::Bool(true)), Some("yes".into()));
        assert_eq!(text_of(&mappings, Value::from("true")), Some("yes".into()));
        assert_eq!(text_of(&mappings, Value::from("")), Some("blank".into()));
        assert_eq!(text_of(&mappings, Value::Bool(false)), None);
    }

    #[test]
    fn test_color_only_result() {
        let mappings = vec![ValueMapping::value(
            "ok",
            MappingResult::default().with_color("green"),
        )];
        let result = get_mapped_value(&mappings, &Value::from("ok")).unwrap();
        assert_eq!(result.text, None);
        assert_eq!(result.color.as_deref(), Some("green"));
    }
}
