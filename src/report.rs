//! Rendering of resolved frames as a text table or JSON

use fieldkit_core::{to_string_processor, DataFrame, DisplayValue, Field, FieldType, ValueDisplay};
use serde::Serialize;

/// Display values of one resolved field
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub values: Vec<DisplayValue>,
}

impl FieldReport {
    /// Fields without an attached display fall back to plain strings
    pub fn from_field(field: &Field) -> Self {
        let fallback;
        let display: &dyn ValueDisplay = match field.display() {
            Some(display) => display.as_ref(),
            None => {
                fallback = to_string_processor();
                &fallback
            }
        };

        Self {
            name: field.name.clone(),
            display_name: field.display_name().to_string(),
            field_type: field.field_type,
            unit: field.config.unit.clone(),
            values: field.values.iter().map(|v| display.display(v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    pub fields: Vec<FieldReport>,
}

impl FrameReport {
    pub fn from_frame(frame: &DataFrame) -> Self {
        Self {
            name: frame.name.clone(),
            ref_id: frame.ref_id.clone(),
            fields: frame.fields.iter().map(FieldReport::from_field).collect(),
        }
    }
}

pub fn build_reports(frames: &[DataFrame]) -> Vec<FrameReport> {
    frames.iter().map(FrameReport::from_frame).collect()
}

pub fn render_json(reports: &[FrameReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// One table per frame; numeric columns are right aligned
pub fn render_text(reports: &[FrameReport]) -> String {
    let mut out = String::new();

    for (index, frame) in reports.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let title = frame
            .name
            .clone()
            .or_else(|| frame.ref_id.clone())
            .unwrap_or_else(|| format!("Frame {}", index + 1));
        out.push_str(&title);
        out.push('\n');

        let columns: Vec<Column> = frame.fields.iter().map(Column::new).collect();
        let rows = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);

        let header: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        push_line(&mut out, &columns, &header);
        for row in 0..rows {
            let cells: Vec<&str> = columns
                .iter()
                .map(|c| c.cells.get(row).map(String::as_str).unwrap_or(""))
                .collect();
            push_line(&mut out, &columns, &cells);
        }
    }

    out
}

struct Column {
    header: String,
    cells: Vec<String>,
    width: usize,
    right: bool,
}

impl Column {
    fn new(field: &FieldReport) -> Self {
        let cells: Vec<String> = field.values.iter().map(|v| v.to_string()).collect();
        let width = cells
            .iter()
            .map(|c| c.chars().count())
            .chain(std::iter::once(field.display_name.chars().count()))
            .max()
            .unwrap_or(0);
        Self {
            header: field.display_name.clone(),
            cells,
            width,
            right: field.field_type == FieldType::Number,
        }
    }
}

fn push_line(out: &mut String, columns: &[Column], cells: &[&str]) {
    let line = columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| {
            if column.right {
                format!("{:>width$}", cell, width = column.width)
            } else {
                format!("{:<width$}", cell, width = column.width)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldkit_core::{
        apply_field_overrides, ApplyFieldOverrideOptions, FieldConfig, FieldConfigRegistry,
        FieldConfigSource, FieldMatcherRegistry, Value,
    };

    fn resolved() -> Vec<DataFrame> {
        let frames = vec![DataFrame::new(
            Some("cpu".into()),
            vec![
                Field::new(
                    "host",
                    FieldType::String,
                    vec![Value::from("a"), Value::from("bb")],
                ),
                Field::new(
                    "load",
                    FieldType::Number,
                    vec![Value::from(12.0), Value::from(250.0)],
                )
                .with_config(FieldConfig {
                    unit: Some("ms".into()),
                    ..FieldConfig::default()
                }),
            ],
        )];
        let source = FieldConfigSource::default();
        let registry = FieldConfigRegistry::standard();
        let matchers = FieldMatcherRegistry::standard();
        let options = ApplyFieldOverrideOptions::new(&frames, &source, &registry, &matchers);
        apply_field_overrides(&options)
    }

    #[test]
    fn test_text_table() {
        let text = render_text(&build_reports(&resolved()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            ["cpu", "host    load", "a      12 ms", "bb    250 ms"]
        );
    }

    #[test]
    fn test_unresolved_fields_use_plain_strings() {
        let frame = DataFrame::new(
            None,
            vec![Field::new("n", FieldType::Number, vec![Value::from(1.5)])],
        );
        let reports = build_reports(&[frame]);
        assert_eq!(reports[0].fields[0].values[0].text, "1.5");
        assert!(render_text(&reports).starts_with("Frame 1\n"));
    }

    #[test]
    fn test_json_output() {
        let json = render_json(&build_reports(&resolved())).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let load = &parsed[0]["fields"][1];
        assert_eq!(load["displayName"], "load");
        assert_eq!(load["type"], "number");
        assert_eq!(load["values"][1]["text"], "250");
        assert_eq!(load["values"][1]["suffix"], " ms");
    }
}
