//! Timestamp formatters: values are epoch milliseconds rendered in a zone

use super::{format_fn, FormatFn};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use fieldkit_types::{FormattedValue, TimeZone};
use std::fmt::Write;
use std::sync::Arc;

pub const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const US_FORMAT: &str = "%m/%d/%Y %-I:%M:%S %P";
const ISO_TIME_FORMAT: &str = "%H:%M:%S";
const US_TIME_FORMAT: &str = "%-I:%M:%S %P";
const INVALID_DATE: &str = "Invalid date";

fn to_utc(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)
}

/// Render with a strftime pattern in the given zone; `None` on bad input
pub fn format_in_zone(millis: f64, tz: &TimeZone, pattern: &str) -> Option<String> {
    let utc = to_utc(millis)?;
    let mut out = String::new();
    // write! surfaces bad patterns as an error instead of panicking like to_string
    let written = match tz {
        TimeZone::Utc => write!(out, "{}", utc.format(pattern)),
        TimeZone::Browser => write!(out, "{}", utc.with_timezone(&Local).format(pattern)),
        TimeZone::Named(zone) => write!(out, "{}", utc.with_timezone(zone).format(pattern)),
    };
    written.ok().map(|_| out)
}

fn same_day_as_now(millis: f64, tz: &TimeZone) -> bool {
    let now = Utc::now().timestamp_millis() as f64;
    match (
        format_in_zone(millis, tz, "%Y-%m-%d"),
        format_in_zone(now, tz, "%Y-%m-%d"),
    ) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Fixed pattern date formatter
pub fn date_time(pattern: &str) -> Arc<FormatFn> {
    let pattern = pattern.to_string();
    format_fn(move |value, _, _, tz| {
        FormattedValue::text(
            format_in_zone(value, tz, &pattern).unwrap_or_else(|| INVALID_DATE.to_string()),
        )
    })
}

/// Full date and time, or only the time when the value falls on today
pub fn date_time_no_date_if_today(full: &'static str, time_only: &'static str) -> Arc<FormatFn> {
    format_fn(move |value, _, _, tz| {
        let pattern = if same_day_as_now(value, tz) {
            time_only
        } else {
            full
        };
        FormattedValue::text(
            format_in_zone(value, tz, pattern).unwrap_or_else(|| INVALID_DATE.to_string()),
        )
    })
}

pub fn iso_no_date_if_today() -> Arc<FormatFn> {
    date_time_no_date_if_today(ISO_FORMAT, ISO_TIME_FORMAT)
}

pub fn us_no_date_if_today() -> Arc<FormatFn> {
    date_time_no_date_if_today(US_FORMAT, US_TIME_FORMAT)
}

/// Relative wording for a signed distance in seconds ("3 hours ago")
pub fn relative_time(seconds: f64) -> String {
    let abs = seconds.abs();
    let minutes = abs / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;

    let phrase = if abs < 45.0 {
        "a few seconds".to_string()
    } else if abs < 90.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes.round())
    } else if minutes < 90.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours.round())
    } else if hours < 36.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days.round())
    } else if days < 45.0 {
        "a month".to_string()
    } else if days < 320.0 {
        format!("{} months", (days / 30.4).round())
    } else if days < 548.0 {
        "a year".to_string()
    } else {
        format!("{} years", (days / 365.0).round())
    };

    if seconds <= 0.0 {
        format!("{} ago", phrase)
    } else {
        format!("in {}", phrase)
    }
}

pub fn from_now() -> Arc<FormatFn> {
    format_fn(|value, _, _, _| {
        if !value.is_finite() {
            return FormattedValue::text(INVALID_DATE);
        }
        let now = Utc::now().timestamp_millis() as f64;
        FormattedValue::text(relative_time((value - now) / 1000.0))
    })
}

/// Translate date tokens like `YYYY-MM-DD HH:mm` into a strftime pattern.
///
/// Text inside `[brackets]` is copied literally.
pub fn date_tokens_to_strftime(format: &str) -> String {
    const TOKENS: [(&str, &str); 23] = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("DD", "%d"),
        ("D", "%-d"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("s", "%-S"),
        ("SSS", "%3f"),
        ("A", "%p"),
        ("a", "%P"),
        ("ZZ", "%z"),
        ("Z", "%:z"),
    ];

    let mut out = String::new();
    let mut rest = format;
    'outer: while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end].replace('%', "%%"));
                rest = &rest[end + 1..];
                continue;
            }
        }
        for (token, replacement) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Formatter for a custom `time:<format>` unit
pub fn custom_format(format: &str) -> Arc<FormatFn> {
    date_time(&date_tokens_to_strftime(format))
}

/// Wall-clock time in `tz` as epoch milliseconds; `None` inside a DST gap
fn local_millis(naive: &NaiveDateTime, tz: &TimeZone) -> Option<f64> {
    let millis = match tz {
        TimeZone::Utc => Utc.from_utc_datetime(naive).timestamp_millis(),
        TimeZone::Browser => Local.from_local_datetime(naive).earliest()?.timestamp_millis(),
        TimeZone::Named(zone) => zone.from_local_datetime(naive).earliest()?.timestamp_millis(),
    };
    Some(millis as f64)
}

/// Parse a timestamp string into epoch milliseconds, NaN when unparseable.
///
/// Strings without an offset are wall-clock times in `tz`.
pub fn parse_date_time(text: &str, tz: &TimeZone) -> f64 {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.timestamp_millis() as f64;
    }
    let naive = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    if let Some(naive) = naive {
        return local_millis(&naive, tz).unwrap_or(f64::NAN);
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}
