//! Time zone used when rendering timestamps

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeZone {
    /// The local zone of the machine doing the rendering
    #[default]
    Browser,
    Utc,
    Named(chrono_tz::Tz),
}

impl FromStr for TimeZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "browser" | "local" | "system" => Ok(TimeZone::Browser),
            "utc" | "UTC" => Ok(TimeZone::Utc),
            other => other
                .parse::<chrono_tz::Tz>()
                .map(TimeZone::Named)
                .map_err(|_| format!("Unknown time zone: {}", other)),
        }
    }
}

impl TryFrom<String> for TimeZone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeZone> for String {
    fn from(tz: TimeZone) -> Self {
        tz.to_string()
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZone::Browser => f.write_str("browser"),
            TimeZone::Utc => f.write_str("utc"),
            TimeZone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_zones() {
        assert_eq!("utc".parse::<TimeZone>().unwrap(), TimeZone::Utc);
        assert_eq!("".parse::<TimeZone>().unwrap(), TimeZone::Browser);
        assert_eq!(
            "Europe/Berlin".parse::<TimeZone>().unwrap(),
            TimeZone::Named(chrono_tz::Europe::Berlin)
        );
        assert!("Mars/Olympus".parse::<TimeZone>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let tz: TimeZone = serde_json::from_str(r#""America/New_York""#).unwrap();
        assert_eq!(serde_json::to_string(&tz).unwrap(), r#""America/New_York""#);
    }
}
