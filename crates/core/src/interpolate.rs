//! Template variable interpolation for matcher options and data links

use fieldkit_types::{DataFrame, DataLink, Field, ScopedVars};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_.]+)\}|\$([A-Za-z0-9_]+)").expect("Invalid regex")
});

/// Replaces variable references in a template string
pub trait VariableInterpolator {
    fn interpolate(&self, template: &str, scoped: Option<&ScopedVars>) -> String;
}

impl<F> VariableInterpolator for F
where
    F: Fn(&str, Option<&ScopedVars>) -> String,
{
    fn interpolate(&self, template: &str, scoped: Option<&ScopedVars>) -> String {
        self(template, scoped)
    }
}

/// Leaves templates untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInterpolator;

impl VariableInterpolator for NoopInterpolator {
    fn interpolate(&self, template: &str, _scoped: Option<&ScopedVars>) -> String {
        template.to_string()
    }
}

/// Named variables plus per-field scoped vars.
///
/// `$name`, `${name}` and `${name.path}` resolve from scoped vars first and
/// then from the named variables. Unknown references stay as written.
#[derive(Debug, Clone, Default)]
pub struct TemplateVariables {
    vars: BTreeMap<String, String>,
}

impl TemplateVariables {
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    fn resolve(&self, reference: &str, scoped: Option<&ScopedVars>) -> Option<String> {
        let (head, path) = reference.split_once('.').unwrap_or((reference, ""));
        if let Some(var) = scoped.and_then(|s| s.get(head)) {
            if path.is_empty() {
                return Some(var.text.clone());
            }
            if let Some(value) = var.lookup(path) {
                return Some(json_text(value));
            }
        }
        self.vars.get(reference).cloned()
    }
}

impl VariableInterpolator for TemplateVariables {
    fn interpolate(&self, template: &str, scoped: Option<&ScopedVars>) -> String {
        VARIABLE_RE
            .replace_all(template, |caps: &Captures| {
                let reference = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                self.resolve(reference, scoped)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Final adjustment of a field's links after interpolation
pub trait DataLinkPostProcessor {
    fn process(&self, link: DataLink, field: &Field, frame: &DataFrame) -> DataLink;
}

impl<F> DataLinkPostProcessor for F
where
    F: Fn(DataLink, &Field, &DataFrame) -> DataLink,
{
    fn process(&self, link: DataLink, field: &Field, frame: &DataFrame) -> DataLink {
        self(link, field, frame)
    }
}
