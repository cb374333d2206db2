//! Benchmarks for display processors and override resolution
//!
//! Run with: cargo bench --bench display_processor

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fieldkit::{
    apply_field_overrides, get_display_processor, ApplyFieldOverrideOptions, DataFrame,
    DisplayProcessorOptions, DynamicConfigValue, Field, FieldConfig, FieldConfigRegistry,
    FieldConfigSource, FieldMatcherRegistry, FieldType, MatcherConfig, OverrideRule, Theme,
    Threshold, ThresholdsConfig, ThresholdsMode, Value,
};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

fn number_field(name: &str, rows: usize, unit: &str) -> Field {
    let values = (0..rows).map(|i| Value::from(i as f64 * 1.37)).collect();
    Field::new(name, FieldType::Number, values).with_config(FieldConfig {
        unit: Some(unit.to_string()),
        thresholds: Some(ThresholdsConfig::new(
            ThresholdsMode::Absolute,
            vec![Threshold::base("green"), Threshold::new(80.0, "red")],
        )),
        ..FieldConfig::default()
    })
}

fn bench_processor_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("display/apply");
    let theme = Arc::new(Theme::dark());

    for unit in ["none", "ms", "bytes", "percent", "dateTimeAsIso"] {
        let field = number_field("value", 1000, unit);
        let processor =
            get_display_processor(Some(DisplayProcessorOptions::for_field(&field, theme.clone())));

        group.throughput(Throughput::Elements(field.values.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(unit), &field, |b, field| {
            b.iter(|| {
                for value in &field.values {
                    black_box(processor.apply(value));
                }
            })
        });
    }

    group.finish();
}

fn bench_apply_overrides(c: &mut Criterion) {
    let mut group = c.benchmark_group("overrides/apply");
    let registry = FieldConfigRegistry::standard();
    let matchers = FieldMatcherRegistry::standard();
    let source = FieldConfigSource::new(
        FieldConfig {
            decimals: Some(2),
            ..FieldConfig::default()
        },
        vec![OverrideRule::new(
            MatcherConfig::new("byRegexp", json!("/cpu.*/")),
            vec![DynamicConfigValue::new("unit", json!("percent"))],
        )],
    );

    for fields in [4, 32, 128] {
        let frames = vec![DataFrame::new(
            Some("bench".into()),
            (0..fields)
                .map(|i| number_field(&format!("cpu{}", i), 100, "none"))
                .collect(),
        )];

        group.throughput(Throughput::Elements(fields as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fields), &frames, |b, frames| {
            b.iter(|| {
                let options = ApplyFieldOverrideOptions::new(frames, &source, &registry, &matchers);
                black_box(apply_field_overrides(&options))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_processor_apply, bench_apply_overrides);
criterion_main!(benches);
