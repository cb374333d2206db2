//! Input documents: frames plus the panel field config to resolve them with

use anyhow::{Context, Result};
use fieldkit_core::{
    apply_field_overrides, ApplyFieldOverrideOptions, DataFrame, FieldConfigRegistry,
    FieldConfigSource, FieldMatcherRegistry, TemplateVariables, Theme, TimeZone,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// A dashboard-shaped JSON document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub frames: Vec<DataFrame>,
    #[serde(default)]
    pub field_config: FieldConfigSource,
    /// Template variables; these win over variables from settings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid document")
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("While loading {}", path.display()))
    }

    /// Resolve every field with the standard registries
    pub fn resolve(
        &self,
        theme: Arc<Theme>,
        time_zone: TimeZone,
        variables: &BTreeMap<String, String>,
    ) -> Vec<DataFrame> {
        let mut vars = variables.clone();
        vars.extend(self.variables.clone());
        let interpolator = TemplateVariables::new(vars);

        let registry = FieldConfigRegistry::standard();
        let matchers = FieldMatcherRegistry::standard();
        let mut options =
            ApplyFieldOverrideOptions::new(&self.frames, &self.field_config, &registry, &matchers);
        options.replace_variables = &interpolator;
        options.theme = theme;
        options.time_zone = time_zone;

        log::debug!(
            "Resolving {} frames with {} override rules",
            self.frames.len(),
            self.field_config.overrides.len()
        );
        apply_field_overrides(&options)
    }
}
