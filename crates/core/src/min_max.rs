//! Numeric range scanning across fields and frames

use fieldkit_types::{DataFrame, Field, FieldType, NumericRange, Value};

/// Running min/max over finite numbers
#[derive(Debug, Clone, Copy, Default)]
struct RangeScan {
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeScan {
    fn add(&mut self, value: &Value) {
        let Value::Number(n) = value else {
            return;
        };
        if !n.is_finite() {
            return;
        }
        self.min = Some(self.min.map_or(*n, |m| m.min(*n)));
        self.max = Some(self.max.map_or(*n, |m| m.max(*n)));
    }

    fn scan(&mut self, field: &Field) {
        for value in &field.values {
            self.add(value);
        }
    }

    fn finish(self) -> NumericRange {
        NumericRange::new(self.min, self.max)
    }
}

/// Range of the finite numbers in one field, whatever its declared type
pub fn field_min_max(field: &Field) -> NumericRange {
    let mut scan = RangeScan::default();
    scan.scan(field);
    scan.finish()
}

/// Range shared by every number field of every frame
///
/// Null, NaN, infinite and non-numeric cells do not contribute.
pub fn find_numeric_field_min_max(data: &[DataFrame]) -> NumericRange {
    let mut scan = RangeScan::default();
    for frame in data {
        for field in &frame.fields {
            if field.resolved_type() == FieldType::Number {
                scan.scan(field);
            }
        }
    }
    scan.finish()
}
