//! Override resolution: merge defaults and rules into every field's config
//!
//! For each field of each frame the resolved config is built from, in
//! increasing precedence: the field's own (datasource) config, panel
//! defaults, then every matching override rule in list order. The result
//! carries a display processor, scoped vars, links and a scale range.
//!
//! Faults never abort a pass. A rule whose matcher cannot be built is
//! skipped, and a property value the registry rejects is skipped for that
//! field. Both are logged.

use crate::display::{get_display_processor, DisplayProcessorOptions};
use crate::interpolate::{DataLinkPostProcessor, NoopInterpolator, VariableInterpolator};
use crate::matchers::{FieldMatcher, FieldMatcherRegistry};
use crate::min_max::{field_min_max, find_numeric_field_min_max};
use crate::registry::{ConfigProperty, FieldConfigRegistry, FieldOverrideContext};
use fieldkit_types::{
    DataFrame, DataLink, DynamicConfigValue, Field, FieldConfig, FieldConfigSource, FieldState,
    FieldType, MatcherConfig, NumericRange, OverrideRule, ScopedVar, ScopedVars, Theme, TimeZone,
};
use log::{debug, trace, warn};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Inputs of one resolution pass
pub struct ApplyFieldOverrideOptions<'a> {
    pub data: &'a [DataFrame],
    pub field_config: &'a FieldConfigSource,
    pub field_config_registry: &'a FieldConfigRegistry,
    pub matchers: &'a FieldMatcherRegistry,
    /// Interpolates matcher options and link templates
    pub replace_variables: &'a dyn VariableInterpolator,
    pub theme: Arc<Theme>,
    pub time_zone: TimeZone,
    pub data_link_post_processor: Option<&'a dyn DataLinkPostProcessor>,
}

impl<'a> ApplyFieldOverrideOptions<'a> {
    pub fn new(
        data: &'a [DataFrame],
        field_config: &'a FieldConfigSource,
        field_config_registry: &'a FieldConfigRegistry,
        matchers: &'a FieldMatcherRegistry,
    ) -> Self {
        Self {
            data,
            field_config,
            field_config_registry,
            matchers,
            replace_variables: &NoopInterpolator,
            theme: Arc::new(Theme::default()),
            time_zone: TimeZone::default(),
            data_link_post_processor: None,
        }
    }
}

/// A rule with its matcher built
struct CompiledRule<'a> {
    matcher: Box<dyn FieldMatcher>,
    rule: &'a OverrideRule,
}

/// Resolve every field of every frame.
///
/// Returns new frames; the input is left untouched. Empty input yields an
/// empty result.
pub fn apply_field_overrides(options: &ApplyFieldOverrideOptions<'_>) -> Vec<DataFrame> {
    if options.data.is_empty() {
        return Vec::new();
    }

    let rules = compile_rules(options);
    // must be complete before any scale is built
    let global_range = find_numeric_field_min_max(options.data);
    let mut series_index = 0;

    options
        .data
        .iter()
        .enumerate()
        .map(|(frame_index, frame)| {
            let series_name = frame
                .name
                .clone()
                .unwrap_or_else(|| format!("Series {}", frame_index + 1));

            let fields = frame
                .fields
                .iter()
                .map(|field| {
                    let ctx = FieldOverrideContext {
                        field,
                        frame,
                        data: options.data,
                    };
                    let mut resolved = resolve_field(options, &rules, &ctx, &series_name, global_range);
                    if resolved.field_type != FieldType::Time {
                        resolved.state.series_index = Some(series_index);
                        series_index += 1;
                    }
                    attach_display(options, &mut resolved);
                    resolved
                })
                .collect();

            DataFrame {
                name: frame.name.clone(),
                ref_id: frame.ref_id.clone(),
                fields,
            }
        })
        .collect()
}

fn compile_rules<'a>(options: &ApplyFieldOverrideOptions<'a>) -> Vec<CompiledRule<'a>> {
    let overrides = &options.field_config.overrides;
    let mut rules = Vec::with_capacity(overrides.len());

    for (i, rule) in overrides.iter().enumerate() {
        if let Some(system_ref) = rule.system_ref.as_deref() {
            if overrides[i + 1..]
                .iter()
                .any(|later| later.is_system_with_ref(system_ref))
            {
                debug!("Superseded system override '{}' skipped", system_ref);
                continue;
            }
        }

        let config = MatcherConfig::new(
            rule.matcher.id.clone(),
            interpolate_options(&rule.matcher.options, options.replace_variables),
        );
        match options.matchers.create(&config) {
            Ok(matcher) => rules.push(CompiledRule { matcher, rule }),
            Err(e) => warn!("Skipping override rule {}: {}", i, e),
        }
    }
    rules
}

/// Interpolate strings in matcher options, one level deep
fn interpolate_options(options: &JsonValue, vars: &dyn VariableInterpolator) -> JsonValue {
    let one = |v: &JsonValue| match v {
        JsonValue::String(s) => JsonValue::String(vars.interpolate(s, None)),
        other => other.clone(),
    };
    match options {
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(one).collect()),
        JsonValue::Object(map) => {
            JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), one(v))).collect())
        }
        other => one(other),
    }
}

fn resolve_field(
    options: &ApplyFieldOverrideOptions<'_>,
    rules: &[CompiledRule<'_>],
    ctx: &FieldOverrideContext<'_>,
    series_name: &str,
    global_range: NumericRange,
) -> Field {
    let field = ctx.field;
    let registry = options.field_config_registry;

    let mut config = set_field_config_defaults(
        &field.config,
        &options.field_config.defaults,
        registry,
        ctx,
    );
    for compiled in rules {
        if !compiled.matcher.matches(field, ctx.frame, ctx.data) {
            continue;
        }
        for property in &compiled.rule.properties {
            set_dynamic_config_value(&mut config, property, registry, ctx);
        }
    }
    config.validate();

    let field_type = field.resolved_type();
    let display_name = config
        .display_name
        .clone()
        .unwrap_or_else(|| field.name.clone());
    trace!(
        "Resolved field '{}' ({}) as '{}'",
        field.name,
        field_type,
        display_name
    );

    let mut scoped = ScopedVars::new();
    scoped.insert(
        "__field".to_string(),
        ScopedVar::new(
            display_name.clone(),
            json!({
                "name": field.name,
                "displayName": display_name,
                "type": field_type.as_str(),
            }),
        ),
    );
    scoped.insert(
        "__series".to_string(),
        ScopedVar::new(series_name, json!({ "name": series_name })),
    );

    let base = if config.field_min_max == Some(true) {
        field_min_max(field)
    } else {
        global_range
    };
    let range = NumericRange::new(config.min.or(base.min), config.max.or(base.max));

    let links = config
        .links
        .iter()
        .map(|link| DataLink {
            title: options.replace_variables.interpolate(&link.title, Some(&scoped)),
            url: options.replace_variables.interpolate(&link.url, Some(&scoped)),
        })
        .collect::<Vec<_>>();

    config.scoped_vars = Some(scoped);

    let mut resolved = Field {
        name: field.name.clone(),
        field_type,
        values: field.values.clone(),
        config,
        state: FieldState {
            display_name: Some(display_name),
            range: Some(range),
            ..FieldState::default()
        },
    };

    resolved.state.links = match options.data_link_post_processor {
        Some(post) => links
            .into_iter()
            .map(|link| post.process(link, &resolved, ctx.frame))
            .collect(),
        None => links,
    };
    resolved
}

fn attach_display(options: &ApplyFieldOverrideOptions<'_>, field: &mut Field) {
    let processor = get_display_processor(Some(DisplayProcessorOptions {
        field: Some(&*field),
        theme: Arc::clone(&options.theme),
        time_zone: options.time_zone,
        tick_size: None,
    }));
    field.state.display = Some(Arc::new(processor));
}

/// Merge panel defaults into a field's own config, returning a new config.
///
/// Standard properties only fill values the datasource left unset. Custom
/// properties from the panel replace the datasource value key by key.
/// Properties that do not apply to the field, or are hidden from defaults,
/// are not taken from the panel.
pub fn set_field_config_defaults(
    datasource: &FieldConfig,
    defaults: &FieldConfig,
    registry: &FieldConfigRegistry,
    ctx: &FieldOverrideContext<'_>,
) -> FieldConfig {
    let mut config = datasource.clone();

    for property in registry.list() {
        if property.hide_from_defaults() || !property.should_apply(ctx.field) {
            continue;
        }

        let raw = if property.is_custom() {
            defaults.custom_value(property.path()).cloned()
        } else if config.get(property.path()).is_some() {
            continue;
        } else {
            defaults.get(property.path())
        };
        let Some(raw) = raw else {
            continue;
        };

        match property.process(&raw, ctx) {
            Ok(Some(value)) => write_property(&mut config, property, value),
            Ok(None) => {}
            Err(e) => warn!("Ignoring default for field '{}': {}", ctx.field.name, e),
        }
    }

    for (key, value) in &defaults.custom {
        if !registry.has_custom_path(key) {
            config.custom.insert(key.clone(), value.clone());
        }
    }

    config.validate();
    config
}

/// Apply one override property to a config.
///
/// Unknown ids, properties that do not apply to the field, and values the
/// property rejects leave the config unchanged.
pub fn set_dynamic_config_value(
    config: &mut FieldConfig,
    value: &DynamicConfigValue,
    registry: &FieldConfigRegistry,
    ctx: &FieldOverrideContext<'_>,
) {
    let Some(property) = registry.get_if_exists(&value.id) else {
        warn!("Unknown config property '{}' in override", value.id);
        return;
    };
    if property.hide_from_overrides() {
        debug!("Property '{}' cannot be overridden", value.id);
        return;
    }
    if !property.should_apply(ctx.field) {
        return;
    }

    match property.process(&value.value, ctx) {
        Ok(Some(processed)) => write_property(config, property, processed),
        Ok(None) => {}
        Err(e) => warn!("Skipping override for field '{}': {}", ctx.field.name, e),
    }
}

fn write_property(config: &mut FieldConfig, property: &dyn ConfigProperty, value: JsonValue) {
    if property.is_custom() {
        config.set_custom(property.path(), value);
    } else if let Err(e) = config.set(property.path(), value) {
        warn!("{}", e);
    }
}
