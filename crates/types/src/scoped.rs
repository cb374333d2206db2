//! Template-variable context attached to fields for later interpolation

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// One scoped variable: a display text plus a structured value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScopedVar {
    pub text: String,
    pub value: JsonValue,
}

impl ScopedVar {
    pub fn new(text: impl Into<String>, value: JsonValue) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }

    /// Look up a dotted path inside the value; an empty path yields the value
    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        if path.is_empty() {
            return Some(&self.value);
        }
        path.split('.')
            .try_fold(&self.value, |current, part| current.get(part))
    }
}

/// Variables keyed by name, e.g. `__field` and `__series`
pub type ScopedVars = BTreeMap<String, ScopedVar>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_paths() {
        let var = ScopedVar::new("Field", json!({"name": "cpu", "labels": {"host": "a"}}));
        assert_eq!(var.lookup("name"), Some(&json!("cpu")));
        assert_eq!(var.lookup("labels.host"), Some(&json!("a")));
        assert_eq!(var.lookup("missing"), None);
        assert!(var.lookup("").is_some());
    }
}
