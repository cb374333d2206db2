//! Unit formatting: unit keys to value formatters
//!
//! A unit key ("ms", "bytes", "dateTimeAsIso", "suffix:rpm") resolves to a
//! [`ValueFormatter`] that turns a number into `{prefix, text, suffix}`.
//! Standard units live in a [`UnitRegistry`]; custom `kind:arg` keys are
//! built on demand, and unknown keys fall back to plain numbers.

pub mod date;
pub mod numeric;

use fieldkit_types::{DecimalCount, FormattedValue, TimeZone};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// `(value, decimals, scaled_decimals, time_zone) -> formatted`
pub type FormatFn =
    dyn Fn(f64, DecimalCount, DecimalCount, &TimeZone) -> FormattedValue + Send + Sync;

/// Box a closure as a [`FormatFn`]
pub fn format_fn<F>(f: F) -> Arc<FormatFn>
where
    F: Fn(f64, DecimalCount, DecimalCount, &TimeZone) -> FormattedValue + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Units whose values are epoch milliseconds
pub const DATE_UNITS: [&str; 9] = [
    "dateTimeAsIso",
    "dateTimeAsIsoNoDateIfToday",
    "dateTimeAsIsoSmart",
    "dateTimeAsUS",
    "dateTimeAsUSNoDateIfToday",
    "dateTimeAsUSSmart",
    "dateTimeAsSystem",
    "dateTimeFromNow",
    "dateTimeAsLocal",
];

/// Unit key that disables numeric interpretation
pub const STRING_UNIT: &str = "string";

/// Unit forced onto time fields that have no date unit
pub const SYSTEM_DATE_UNIT: &str = "dateTimeAsSystem";

pub fn is_date_unit(unit: &str) -> bool {
    DATE_UNITS.contains(&unit) || unit.starts_with("time:")
}

/// A resolved unit: its key plus the function that formats values
#[derive(Clone)]
pub struct ValueFormatter {
    id: String,
    format: Arc<FormatFn>,
}

impl ValueFormatter {
    pub fn new(id: impl Into<String>, format: Arc<FormatFn>) -> Self {
        Self {
            id: id.into(),
            format,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_date(&self) -> bool {
        is_date_unit(&self.id)
    }

    pub fn format(
        &self,
        value: f64,
        decimals: DecimalCount,
        scaled_decimals: DecimalCount,
        time_zone: &TimeZone,
    ) -> FormattedValue {
        (self.format)(value, decimals, scaled_decimals, time_zone)
    }
}

impl fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueFormatter")
            .field("id", &self.id)
            .finish()
    }
}

/// Metadata about a registered unit
#[derive(Debug, Clone)]
pub struct UnitInfo {
    pub id: String,
    pub name: String,
    pub category: String,
}

/// Registry of known units
pub struct UnitRegistry {
    units: HashMap<String, Arc<FormatFn>>,
    infos: Vec<UnitInfo>,
}

impl UnitRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            infos: Vec::new(),
        }
    }

    /// Register a unit under a category
    pub fn register(&mut self, category: &str, id: &str, name: &str, format: Arc<FormatFn>) {
        if self.units.insert(id.to_string(), format).is_none() {
            self.infos.push(UnitInfo {
                id: id.to_string(),
                name: name.to_string(),
                category: category.to_string(),
            });
        }
    }

    /// The built-in unit set
    pub fn standard() -> Self {
        use numeric::*;

        let mut r = Self::new();

        r.register("Misc", "none", "Number", fixed_unit("", false));
        r.register("Misc", STRING_UNIT, "String", string_unit());
        r.register("Misc", "short", "Short", short());
        r.register("Misc", "percent", "Percent (0-100)", percent());
        r.register("Misc", "percentunit", "Percent (0.0-1.0)", percent_unit());
        r.register("Misc", "humidity", "Humidity (%H)", fixed_unit("%H", false));
        r.register("Misc", "dB", "Decibel", fixed_unit("dB", false));
        r.register("Misc", "hex", "Hexadecimal", hex());
        r.register("Misc", "hex0x", "Hexadecimal (0x)", hex_0x());
        r.register("Misc", "sci", "Scientific notation", scientific());
        r.register("Misc", "locale", "Locale format", locale());

        r.register("Data", "bytes", "bytes(IEC)", binary_prefix("B", 0));
        r.register("Data", "decbytes", "bytes(SI)", si_prefix("B", 0));
        r.register("Data", "bits", "bits(IEC)", binary_prefix("b", 0));
        r.register("Data", "decbits", "bits(SI)", si_prefix("b", 0));
        r.register("Data", "kbytes", "kibibytes", binary_prefix("B", 1));
        r.register("Data", "mbytes", "mebibytes", binary_prefix("B", 2));

        r.register("Data rate", "Bps", "bytes/sec(SI)", si_prefix("B/s", 0));
        r.register("Data rate", "bps", "bits/sec(SI)", si_prefix("b/s", 0));
        r.register("Throughput", "pps", "packets/sec", si_prefix("p/s", 0));
        r.register("Throughput", "reqps", "requests/sec (rps)", count_unit("req/s"));

        r.register("Frequency", "hertz", "Hertz (1/s)", si_prefix("Hz", 0));

        r.register("Time", "ns", "nanoseconds (ns)", duration(0, 0));
        r.register("Time", "µs", "microseconds (µs)", duration(1, 0));
        r.register("Time", "ms", "milliseconds (ms)", duration(2, 2));
        r.register("Time", "s", "seconds (s)", duration(3, 2));
        r.register("Time", "m", "minutes (m)", duration(4, 3));
        r.register("Time", "h", "hours (h)", duration(5, 4));
        r.register("Time", "d", "days (d)", duration(6, 5));
        r.register("Time", "dtdurationms", "duration (ms)", spelled_duration(0.001));
        r.register("Time", "dtdurations", "duration (s)", spelled_duration(1.0));

        r.register("Temperature", "celsius", "Celsius (°C)", fixed_unit("°C", false));
        r.register("Temperature", "fahrenheit", "Fahrenheit (°F)", fixed_unit("°F", false));
        r.register("Temperature", "kelvin", "Kelvin (K)", fixed_unit("K", false));

        r.register("Length", "lengthmm", "millimeter (mm)", si_prefix("m", -1));
        r.register("Length", "lengthm", "meter (m)", si_prefix("m", 0));
        r.register("Length", "lengthkm", "kilometer (km)", si_prefix("m", 1));

        r.register("Currency", "currencyUSD", "Dollars ($)", currency("$", false));
        r.register("Currency", "currencyEUR", "Euro (€)", currency("€", false));
        r.register("Currency", "currencyGBP", "Pounds (£)", currency("£", false));

        r.register("Date & time", "dateTimeAsIso", "Datetime ISO", date::date_time(date::ISO_FORMAT));
        r.register("Date & time", "dateTimeAsIsoNoDateIfToday", "Datetime ISO (No date if today)", date::iso_no_date_if_today());
        r.register("Date & time", "dateTimeAsIsoSmart", "Datetime ISO (smart)", date::iso_no_date_if_today());
        r.register("Date & time", "dateTimeAsUS", "Datetime US", date::date_time(date::US_FORMAT));
        r.register("Date & time", "dateTimeAsUSNoDateIfToday", "Datetime US (No date if today)", date::us_no_date_if_today());
        r.register("Date & time", "dateTimeAsUSSmart", "Datetime US (smart)", date::us_no_date_if_today());
        r.register("Date & time", SYSTEM_DATE_UNIT, "Datetime default", date::date_time(date::ISO_FORMAT));
        r.register("Date & time", "dateTimeAsLocal", "Datetime local", date::date_time("%c"));
        r.register("Date & time", "dateTimeFromNow", "From Now", date::from_now());

        r.register("Boolean", "bool", "True / False", boolean("True", "False"));
        r.register("Boolean", "bool_yes_no", "Yes / No", boolean("Yes", "No"));
        r.register("Boolean", "bool_on_off", "On / Off", boolean("On", "Off"));

        r
    }

    /// Look up a registered unit only
    pub fn get_if_exists(&self, id: &str) -> Option<ValueFormatter> {
        self.units
            .get(id)
            .map(|f| ValueFormatter::new(id, Arc::clone(f)))
    }

    /// Resolve a unit key, including custom `kind:arg` keys
    ///
    /// Missing or unknown keys yield the plain number formatter.
    pub fn get(&self, id: Option<&str>) -> ValueFormatter {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return ValueFormatter::new("none", numeric::fixed_unit("", false));
        };
        if let Some(formatter) = self.get_if_exists(id) {
            return formatter;
        }
        if let Some(format) = custom_unit(id) {
            return ValueFormatter::new(id, format);
        }

        debug!("Unknown unit '{}', formatting as plain number", id);
        ValueFormatter::new(id, numeric::fixed_unit("", false))
    }

    /// List registered units in registration order
    pub fn list_units(&self) -> &[UnitInfo] {
        &self.infos
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn string_unit() -> Arc<FormatFn> {
    format_fn(|value, _, _, _| FormattedValue::text(fieldkit_types::number_to_string(value)))
}

/// Number with literal text glued on, no separator added
fn affix(text: &str, as_prefix: bool) -> Arc<FormatFn> {
    let text = text.to_string();
    format_fn(move |value, decimals, _, _| {
        let number = numeric::to_fixed(value, decimals);
        if as_prefix {
            FormattedValue::with_prefix(text.clone(), number)
        } else {
            FormattedValue::with_suffix(number, text.clone())
        }
    })
}

/// Build a formatter for `prefix:`, `suffix:`, `si:`, `count:`,
/// `currency:` and `time:` keys
fn custom_unit(id: &str) -> Option<Arc<FormatFn>> {
    let (kind, arg) = id.split_once(':')?;
    if kind.is_empty() {
        return None;
    }
    match kind {
        "prefix" => Some(affix(arg, true)),
        "suffix" => Some(affix(arg, false)),
        "time" => Some(date::custom_format(arg)),
        "si" => {
            let offset = arg.chars().next().and_then(si_offset);
            match offset {
                Some(offset) => {
                    let unit: String = arg.chars().skip(1).collect();
                    Some(numeric::si_prefix(&unit, offset))
                }
                None => Some(numeric::si_prefix(arg, 0)),
            }
        }
        "count" => Some(numeric::count_unit(arg)),
        "currency" => Some(match arg.strip_suffix(":suffix") {
            Some(symbol) => numeric::currency(symbol, true),
            None => numeric::currency(arg, false),
        }),
        _ => None,
    }
}

/// Ladder offset of an SI prefix character
fn si_offset(prefix: char) -> Option<i32> {
    let offset = match prefix {
        'f' => -5,
        'p' => -4,
        'n' => -3,
        'µ' | 'u' => -2,
        'm' => -1,
        'k' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        'E' => 6,
        'Z' => 7,
        'Y' => 8,
        _ => return None,
    };
    Some(offset)
}

static STANDARD_UNITS: Lazy<UnitRegistry> = Lazy::new(UnitRegistry::standard);

/// The shared built-in registry
pub fn standard_units() -> &'static UnitRegistry {
    &STANDARD_UNITS
}

/// Resolve a unit key against the built-in registry
pub fn get_value_format(unit: Option<&str>) -> ValueFormatter {
    STANDARD_UNITS.get(unit)
}
