//! Numeric value formatters: fixed precision, scaled unit ladders, durations

use crate::decimals::get_decimals_for_value;
use fieldkit_types::{number_to_string, DecimalCount, FormattedValue, TimeZone};

use super::{format_fn, FormatFn};
use std::sync::Arc;

const SI_PREFIXES: [&str; 14] = [
    "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];
const SI_BASE_INDEX: i32 = 5;
const BIN_PREFIXES: [&str; 9] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi", "Yi"];

/// Round half up, towards positive infinity
fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Text for values no formatter can scale
fn non_finite_text(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value == f64::INFINITY {
        Some("∞".to_string())
    } else if value == f64::NEG_INFINITY {
        Some("-∞".to_string())
    } else {
        None
    }
}

/// Fixed-point rendering padded with zeros to `decimals`.
///
/// `None` decimals are inferred from the value.
pub fn to_fixed(value: f64, decimals: DecimalCount) -> String {
    if let Some(text) = non_finite_text(value) {
        return text;
    }

    let decimals = decimals
        .unwrap_or_else(|| get_decimals_for_value(value, None).decimals)
        .clamp(0, 20);

    if value == 0.0 {
        return format!("{:.*}", decimals as usize, 0.0);
    }

    let factor = if decimals > 0 {
        10f64.powi(decimals)
    } else {
        1.0
    };
    let formatted = number_to_string(round_half_up(value * factor) / factor);
    if formatted.contains('e') {
        return formatted;
    }

    let precision = formatted
        .find('.')
        .map(|pos| (formatted.len() - pos - 1) as i32)
        .unwrap_or(0);
    if precision >= decimals {
        return formatted;
    }

    let padding = "0".repeat((decimals - precision) as usize);
    if precision > 0 {
        format!("{}{}", formatted, padding)
    } else {
        format!("{}.{}", formatted, padding)
    }
}

/// Plain number with an optional unit text before or after it
pub fn fixed_unit(unit: &str, as_prefix: bool) -> Arc<FormatFn> {
    let unit = unit.to_string();
    format_fn(move |value, decimals, _, _| {
        let text = to_fixed(value, decimals);
        if unit.is_empty() {
            FormattedValue::text(text)
        } else if as_prefix {
            FormattedValue::with_prefix(unit.clone(), text)
        } else {
            FormattedValue::with_suffix(text, format!(" {}", unit))
        }
    })
}

/// Step through `suffixes` by powers of `factor`; `offset` is the index of
/// the unscaled suffix
pub fn scaled_units(factor: f64, suffixes: Vec<String>, offset: i32) -> Arc<FormatFn> {
    format_fn(move |value, decimals, scaled_decimals, tz| {
        scale_value(factor, &suffixes, offset, value, decimals, scaled_decimals, tz)
    })
}

/// Largest `i` with `factor^i <= abs`, found by stepping so exact powers
/// never land one step short through log rounding
fn step_index(factor: f64, abs: f64) -> i32 {
    if abs == 0.0 {
        return 0;
    }
    let mut index = 0;
    if abs >= 1.0 {
        while index < 32 && abs >= factor.powi(index + 1) {
            index += 1;
        }
    } else {
        while index > -32 && abs < factor.powi(index) {
            index -= 1;
        }
    }
    index
}

fn scale_value(
    factor: f64,
    suffixes: &[String],
    offset: i32,
    value: f64,
    decimals: DecimalCount,
    _scaled_decimals: DecimalCount,
    _tz: &TimeZone,
) -> FormattedValue {
    if let Some(text) = non_finite_text(value) {
        return FormattedValue::text(text);
    }
    if suffixes.is_empty() {
        return FormattedValue::text(to_fixed(value, decimals));
    }

    let last = suffixes.len() as i32 - 1;
    let si_index = step_index(factor, value.abs());
    let suffix = &suffixes[(offset + si_index).clamp(0, last) as usize];
    let exponent = si_index.clamp(-offset, last - offset);
    let text = to_fixed(value / factor.powi(exponent), decimals);
    FormattedValue::with_suffix(text, suffix.clone())
}

/// SI ladder (`k`, `M`, `G`... and `m`, `µ`...) around `unit`
pub fn si_prefix(unit: &str, offset: i32) -> Arc<FormatFn> {
    let suffixes = SI_PREFIXES
        .iter()
        .map(|p| format!(" {}{}", p, unit))
        .collect();
    scaled_units(1000.0, suffixes, SI_BASE_INDEX + offset)
}

/// IEC ladder (`Ki`, `Mi`...) around `unit`
pub fn binary_prefix(unit: &str, offset: i32) -> Arc<FormatFn> {
    let suffixes = BIN_PREFIXES
        .iter()
        .map(|p| format!(" {}{}", p, unit))
        .collect();
    scaled_units(1024.0, suffixes, offset)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn short() -> Arc<FormatFn> {
    scaled_units(
        1000.0,
        strings(&["", " K", " Mil", " Bil", " Tri", " Quadr", " Quint", " Sext", " Sept"]),
        0,
    )
}

/// Counts with K/M/B/T steps followed by a unit symbol
pub fn count_unit(symbol: &str) -> Arc<FormatFn> {
    let symbol = symbol.to_string();
    let suffixes = strings(&["", "K", "M", "B", "T"]);
    format_fn(move |value, decimals, scaled_decimals, tz| {
        let mut v = scale_value(1000.0, &suffixes, 0, value, decimals, scaled_decimals, tz);
        v.suffix = Some(format!("{} {}", v.suffix.unwrap_or_default(), symbol));
        v
    })
}

/// Money with K/M/B/T steps; the symbol leads unless `as_suffix`
pub fn currency(symbol: &str, as_suffix: bool) -> Arc<FormatFn> {
    let symbol = symbol.to_string();
    let suffixes = strings(&["", "K", "M", "B", "T"]);
    format_fn(move |value, decimals, scaled_decimals, tz| {
        let mut v = scale_value(1000.0, &suffixes, 0, value, decimals, scaled_decimals, tz);
        if as_suffix {
            v.suffix = Some(format!("{}{}", v.suffix.unwrap_or_default(), symbol));
        } else {
            v.prefix = Some(symbol.clone());
        }
        v
    })
}

pub fn percent() -> Arc<FormatFn> {
    format_fn(|value, decimals, _, _| FormattedValue::with_suffix(to_fixed(value, decimals), "%"))
}

/// Ratio in 0..1 shown as a percentage
pub fn percent_unit() -> Arc<FormatFn> {
    format_fn(|value, decimals, _, _| {
        FormattedValue::with_suffix(to_fixed(100.0 * value, decimals), "%")
    })
}

fn to_hex_text(value: f64, decimals: DecimalCount) -> String {
    if let Some(text) = non_finite_text(value) {
        return text;
    }
    let rounded = to_fixed(value, decimals).parse::<f64>().unwrap_or(value);
    let negative = rounded < 0.0;
    let abs = rounded.abs();
    let mut text = format!("{:X}", abs.trunc() as u64);

    let mut fraction = abs.fract();
    if fraction > 0.0 {
        text.push('.');
        for _ in 0..6 {
            fraction *= 16.0;
            let digit = fraction.trunc() as u32;
            text.push(std::char::from_digit(digit, 16).unwrap_or('0').to_ascii_uppercase());
            fraction = fraction.fract();
            if fraction == 0.0 {
                break;
            }
        }
    }

    if negative {
        format!("-{}", text)
    } else {
        text
    }
}

pub fn hex() -> Arc<FormatFn> {
    format_fn(|value, decimals, _, _| FormattedValue::text(to_hex_text(value, decimals)))
}

pub fn hex_0x() -> Arc<FormatFn> {
    format_fn(|value, decimals, _, _| {
        let text = to_hex_text(value, decimals);
        match text.strip_prefix('-') {
            Some(rest) => FormattedValue::text(format!("-0x{}", rest)),
            None => FormattedValue::text(format!("0x{}", text)),
        }
    })
}

pub fn scientific() -> Arc<FormatFn> {
    format_fn(|value, decimals, _, _| {
        if let Some(text) = non_finite_text(value) {
            return FormattedValue::text(text);
        }
        let exp = if value == 0.0 {
            0
        } else {
            value.abs().log10().floor() as i32
        };
        let significand = value / 10f64.powi(exp);
        let text = to_fixed(significand, decimals);
        if exp == 0 {
            FormattedValue::text(text)
        } else {
            FormattedValue::with_suffix(text, format!("e{}", exp))
        }
    })
}

/// Fixed precision with thousands separators
pub fn locale() -> Arc<FormatFn> {
    format_fn(|value, decimals, _, _| {
        let fixed = to_fixed(value, decimals);
        if !value.is_finite() {
            return FormattedValue::text(fixed);
        }
        let (sign, digits) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits, None),
        };

        let mut grouped = String::new();
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let text = match frac_part {
            Some(f) => format!("{}{}.{}", sign, grouped, f),
            None => format!("{}{}", sign, grouped),
        };
        FormattedValue::text(text)
    })
}

/// Boolean rendering of a number: zero is false, anything else true
pub fn boolean(on_true: &str, on_false: &str) -> Arc<FormatFn> {
    let (on_true, on_false) = (on_true.to_string(), on_false.to_string());
    format_fn(move |value, _, _, _| {
        if value.is_nan() {
            return FormattedValue::text("NaN");
        }
        FormattedValue::text(if value != 0.0 {
            on_true.clone()
        } else {
            on_false.clone()
        })
    })
}

/// Duration steps in nanoseconds with their suffix
const DURATION_STEPS: [(f64, &str); 9] = [
    (1.0, "ns"),
    (1e3, "µs"),
    (1e6, "ms"),
    (1e9, "s"),
    (60e9, "min"),
    (3600e9, "hour"),
    (86400e9, "day"),
    (604800e9, "week"),
    (31536000e9, "year"),
];

/// Duration in the given base step, promoted to the largest step that fits.
///
/// `min_step` is the smallest step values may be demoted to when below one
/// unit of the base (seconds below 1 render as ms, but never as ns).
pub fn duration(base_step: usize, min_step: usize) -> Arc<FormatFn> {
    format_fn(move |value, decimals, _, _| {
        if let Some(text) = non_finite_text(value) {
            return FormattedValue::text(text);
        }
        let base_factor = DURATION_STEPS[base_step].0;
        let nanos = value.abs() * base_factor;

        let step = if value == 0.0 {
            base_step
        } else {
            DURATION_STEPS
                .iter()
                .enumerate()
                .skip(min_step)
                .take_while(|(_, (factor, _))| nanos >= *factor)
                .map(|(i, _)| i)
                .last()
                .unwrap_or(min_step)
        };

        let (factor, suffix) = DURATION_STEPS[step];
        let scaled = value * base_factor / factor;
        FormattedValue::with_suffix(to_fixed(scaled, decimals), format!(" {}", suffix))
    })
}

/// Spelled-out duration such as "1 hour, 5 minutes"; `decimals` + 1 parts
pub fn spelled_duration(base_seconds: f64) -> Arc<FormatFn> {
    const PARTS: [(f64, &str); 6] = [
        (31536000.0, "year"),
        (86400.0, "day"),
        (3600.0, "hour"),
        (60.0, "minute"),
        (1.0, "second"),
        (0.001, "millisecond"),
    ];

    format_fn(move |value, decimals, _, _| {
        if let Some(text) = non_finite_text(value) {
            return FormattedValue::text(text);
        }
        let negative = value < 0.0;
        let mut remaining = value.abs() * base_seconds;
        let max_parts = (decimals.unwrap_or(0) + 1).clamp(1, PARTS.len() as i32) as usize;

        let mut parts = Vec::new();
        for (size, name) in PARTS {
            if parts.len() == max_parts {
                break;
            }
            let count = (remaining / size).floor();
            if count >= 1.0 {
                remaining -= count * size;
                let plural = if count == 1.0 { "" } else { "s" };
                parts.push(format!("{} {}{}", count, name, plural));
            } else if !parts.is_empty() {
                // Only consecutive units are shown
                break;
            }
        }

        if parts.is_empty() {
            return FormattedValue::text("0 milliseconds");
        }
        let text = parts.join(", ");
        FormattedValue::text(if negative {
            format!("-{}", text)
        } else {
            text
        })
    })
}
