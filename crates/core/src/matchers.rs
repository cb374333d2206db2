//! Field matchers: select the fields an override rule applies to

use crate::pattern::{Pattern, PatternError};
use fieldkit_types::{DataFrame, Field, FieldType, MatcherConfig};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::ptr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Unknown matcher: {0}")]
    Unknown(String),

    #[error("Invalid options for matcher '{id}': {reason}")]
    InvalidOptions { id: String, reason: String },

    #[error("Invalid pattern for matcher '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: PatternError,
    },
}

/// Decides whether a field is selected
pub trait FieldMatcher: Send + Sync {
    fn matches(&self, field: &Field, frame: &DataFrame, data: &[DataFrame]) -> bool;
}

/// Function that builds a matcher from its options
pub type MatcherFactory = fn(&JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError>;

/// Registry of matcher factories
pub struct FieldMatcherRegistry {
    matchers: HashMap<String, MatcherFactory>,
}

impl FieldMatcherRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            matchers: HashMap::new(),
        }
    }

    /// The built-in matchers
    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register("byName", by_name);
        r.register("byNames", by_names);
        r.register("byRegexp", by_regexp);
        r.register("byType", by_type);
        r.register("byFrameRefID", by_frame_ref_id);
        r.register("numeric", numeric);
        r.register("time", time);
        r.register("first", first);
        r
    }

    /// Register a matcher
    pub fn register(&mut self, id: &str, factory: MatcherFactory) {
        self.matchers.insert(id.to_string(), factory);
    }

    /// Create a matcher from its config
    pub fn create(&self, config: &MatcherConfig) -> Result<Box<dyn FieldMatcher>, MatcherError> {
        let factory = self
            .matchers
            .get(&config.id)
            .ok_or_else(|| MatcherError::Unknown(config.id.clone()))?;
        factory(&config.options)
    }

    /// List all registered matcher IDs
    pub fn list_matchers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.matchers.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for FieldMatcherRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid(id: &str, reason: impl Into<String>) -> MatcherError {
    MatcherError::InvalidOptions {
        id: id.to_string(),
        reason: reason.into(),
    }
}

fn string_option(id: &str, options: &JsonValue) -> Result<String, MatcherError> {
    match options {
        JsonValue::String(s) => Ok(s.clone()),
        _ => Err(invalid(id, format!("expected a string, got {}", options))),
    }
}

struct NameMatcher(String);

impl FieldMatcher for NameMatcher {
    fn matches(&self, field: &Field, _frame: &DataFrame, _data: &[DataFrame]) -> bool {
        field.display_name() == self.0
    }
}

fn by_name(options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    Ok(Box::new(NameMatcher(string_option("byName", options)?)))
}

struct NamesMatcher {
    names: Vec<String>,
    exclude: bool,
}

impl FieldMatcher for NamesMatcher {
    fn matches(&self, field: &Field, _frame: &DataFrame, _data: &[DataFrame]) -> bool {
        let listed = self.names.iter().any(|n| n == field.display_name());
        listed != self.exclude
    }
}

fn by_names(options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    let names_of = |list: &JsonValue| -> Result<Vec<String>, MatcherError> {
        list.as_array()
            .ok_or_else(|| invalid("byNames", "expected a list of names"))?
            .iter()
            .map(|n| {
                n.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("byNames", format!("name {} is not a string", n)))
            })
            .collect()
    };

    let (names, exclude) = match options {
        JsonValue::Array(_) => (names_of(options)?, false),
        JsonValue::Object(map) => {
            let names = names_of(map.get("names").unwrap_or(&JsonValue::Null))?;
            let exclude = match map.get("mode").and_then(JsonValue::as_str) {
                None | Some("include") => false,
                Some("exclude") => true,
                Some(other) => return Err(invalid("byNames", format!("unknown mode '{}'", other))),
            };
            (names, exclude)
        }
        _ => return Err(invalid("byNames", "expected a list or {names, mode}")),
    };
    Ok(Box::new(NamesMatcher { names, exclude }))
}

struct RegexpMatcher(Pattern);

impl FieldMatcher for RegexpMatcher {
    fn matches(&self, field: &Field, _frame: &DataFrame, _data: &[DataFrame]) -> bool {
        self.0.is_match(field.display_name())
    }
}

fn by_regexp(options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    let source = string_option("byRegexp", options)?;
    let pattern = Pattern::parse(&source).map_err(|source| MatcherError::InvalidPattern {
        id: "byRegexp".to_string(),
        source,
    })?;
    Ok(Box::new(RegexpMatcher(pattern)))
}

struct TypeMatcher(FieldType);

impl FieldMatcher for TypeMatcher {
    fn matches(&self, field: &Field, _frame: &DataFrame, _data: &[DataFrame]) -> bool {
        field.resolved_type() == self.0
    }
}

fn by_type(options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    let name = string_option("byType", options)?;
    let field_type = name.parse::<FieldType>().map_err(|e| invalid("byType", e))?;
    Ok(Box::new(TypeMatcher(field_type)))
}

fn numeric(_options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    Ok(Box::new(TypeMatcher(FieldType::Number)))
}

fn time(_options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    Ok(Box::new(TypeMatcher(FieldType::Time)))
}

struct RefIdMatcher(String);

impl FieldMatcher for RefIdMatcher {
    fn matches(&self, _field: &Field, frame: &DataFrame, _data: &[DataFrame]) -> bool {
        frame.ref_id.as_deref() == Some(self.0.as_str())
    }
}

fn by_frame_ref_id(options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    Ok(Box::new(RefIdMatcher(string_option("byFrameRefID", options)?)))
}

/// The first field of its frame
struct FirstFieldMatcher;

impl FieldMatcher for FirstFieldMatcher {
    fn matches(&self, field: &Field, frame: &DataFrame, _data: &[DataFrame]) -> bool {
        frame.fields.first().is_some_and(|first| ptr::eq(first, field))
    }
}

fn first(_options: &JsonValue) -> Result<Box<dyn FieldMatcher>, MatcherError> {
    Ok(Box::new(FirstFieldMatcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldkit_types::Value;
    use serde_json::json;

    fn frame() -> DataFrame {
        DataFrame::new(
            Some("A".into()),
            vec![
                Field::new("time", FieldType::Time, vec![Value::from(1.0)]),
                Field::new("cpu_user", FieldType::Number, vec![Value::from(2.0)]),
                Field::new("host", FieldType::String, vec![Value::from("a")]),
                Field::new("mystery", FieldType::Other, vec![Value::Null, Value::from(3.0)]),
            ],
        )
        .with_ref_id("Q1")
    }

    fn selected(config: MatcherConfig) -> Vec<String> {
        let registry = FieldMatcherRegistry::standard();
        let matcher = registry.create(&config).unwrap();
        let data = vec![frame()];
        data[0]
            .fields
            .iter()
            .filter(|f| matcher.matches(f, &data[0], &data))
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn test_by_name_and_names() {
        assert_eq!(selected(MatcherConfig::new("byName", json!("host"))), ["host"]);
        assert_eq!(
            selected(MatcherConfig::new("byNames", json!(["host", "time"]))),
            ["time", "host"]
        );
        assert_eq!(
            selected(MatcherConfig::new(
                "byNames",
                json!({"names": ["host", "time"], "mode": "exclude"})
            )),
            ["cpu_user", "mystery"]
        );
    }

    #[test]
    fn test_by_regexp() {
        assert_eq!(selected(MatcherConfig::new("byRegexp", json!("cpu.*"))), ["cpu_user"]);
        assert_eq!(
            selected(MatcherConfig::new("byRegexp", json!("/S/i"))),
            ["cpu_user", "host", "mystery"]
        );
    }

    #[test]
    fn test_type_matchers_use_guessed_types() {
        assert_eq!(
            selected(MatcherConfig::new("numeric", JsonValue::Null)),
            ["cpu_user", "mystery"]
        );
        assert_eq!(selected(MatcherConfig::new("time", JsonValue::Null)), ["time"]);
        assert_eq!(selected(MatcherConfig::new("byType", json!("string"))), ["host"]);
    }

    #[test]
    fn test_frame_matchers() {
        assert_eq!(selected(MatcherConfig::new("byFrameRefID", json!("Q2"))).len(), 0);
        assert_eq!(selected(MatcherConfig::new("byFrameRefID", json!("Q1"))).len(), 4);
        assert_eq!(selected(MatcherConfig::new("first", JsonValue::Null)), ["time"]);
    }

    #[test]
    fn test_create_errors() {
        let registry = FieldMatcherRegistry::standard();
        assert!(matches!(
            registry.create(&MatcherConfig::new("byMagic", JsonValue::Null)),
            Err(MatcherError::Unknown(_))
        ));
        assert!(matches!(
            registry.create(&MatcherConfig::new("byName", json!(5))),
            Err(MatcherError::InvalidOptions { .. })
        ));
        assert!(matches!(
            registry.create(&MatcherConfig::new("byRegexp", json!("/(x/"))),
            Err(MatcherError::InvalidPattern { .. })
        ));
        assert!(registry.list_matchers().contains(&"first".to_string()));
    }
}
