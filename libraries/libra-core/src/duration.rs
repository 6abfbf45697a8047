//! Human-friendly durations
//!
//! Accepted forms:
//! - unit suffixes `ns us µs ms s m h d w`, summed when concatenated (`1w2d3h`)
//! - word units (`2 weeks`, `1 day, 3 hours`); commas and spaces are ignored
//! - `MM:SS` and `HH:MM:SS`
//! - a bare integer, read as seconds
//! - a leading `-` negates the whole value; components may carry decimals (`1.5h`)
//!
//! Weeks and days are fixed at 7·24 h and 24 h.

use crate::error::LibraError;
use chrono::Duration;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: i128 = 7 * NANOS_PER_DAY;

const WORD_UNITS: [(&str, &str); 10] = [
    ("weeks", "w"),
    ("week", "w"),
    ("days", "d"),
    ("day", "d"),
    ("hours", "h"),
    ("hour", "h"),
    ("minutes", "m"),
    ("minute", "m"),
    ("seconds", "s"),
    ("second", "s"),
];

/// Duration parse failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// Malformed input
    #[error("invalid duration {0:?}")]
    Invalid(String),

    /// A number was not followed by a unit
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// A unit suffix was not recognised
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit {
        /// The offending suffix
        unit: String,
        /// Full input
        input: String,
    },

    /// The value does not fit in a signed 64-bit nanosecond count
    #[error("duration {0:?} is out of range")]
    OutOfRange(String),
}

impl From<DurationParseError> for LibraError {
    fn from(err: DurationParseError) -> Self {
        LibraError::InvalidInput(err.to_string())
    }
}

/// A signed duration that parses from and prints to the human format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HumanDuration(Duration);

impl HumanDuration {
    /// Wrap a `chrono` duration
    pub fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Zero-length duration
    pub fn zero() -> Self {
        Self(Duration::zero())
    }

    /// Whole seconds
    pub fn from_secs(secs: i64) -> Self {
        Self(Duration::seconds(secs))
    }

    /// The underlying `chrono` duration
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Standard library duration; negative values clamp to zero
    pub fn to_std(&self) -> std::time::Duration {
        self.0.to_std().unwrap_or_default()
    }

    /// Total whole seconds
    pub fn num_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Whether the duration is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0 == Duration::zero()
    }

    /// Whether the duration is below zero
    pub fn is_negative(&self) -> bool {
        self.0 < Duration::zero()
    }

    fn total_nanos(&self) -> i128 {
        self.0
            .num_nanoseconds()
            .map(i128::from)
            .unwrap_or_else(|| i128::from(self.0.num_milliseconds()) * 1_000_000)
    }
}

impl Default for HumanDuration {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Duration> for HumanDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

/// Parse a human duration string
///
/// # Examples
///
/// ```
/// use libra_core::parse_human_duration;
///
/// assert_eq!(parse_human_duration("1w2d3h").unwrap().num_seconds(), 788_400);
/// assert_eq!(parse_human_duration("01:30").unwrap().num_seconds(), 90);
/// assert_eq!(parse_human_duration("45").unwrap().num_seconds(), 45);
/// ```
pub fn parse_human_duration(input: &str) -> Result<HumanDuration, DurationParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(HumanDuration::zero());
    }

    if trimmed.contains(':') {
        let parts: Vec<&str> = trimmed.split(':').map(str::trim).collect();
        let normalized = match parts.as_slice() {
            [minutes, seconds] => format!("{minutes}m{seconds}s"),
            [hours, minutes, seconds] => format!("{hours}h{minutes}m{seconds}s"),
            _ => return Err(DurationParseError::Invalid(input.to_string())),
        };
        return parse_units(&normalized, input);
    }

    if let Ok(secs) = trimmed.parse::<i64>() {
        return from_nanos(i128::from(secs) * NANOS_PER_SECOND, input);
    }

    let mut normalized: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    for (word, unit) in WORD_UNITS {
        normalized = normalized.replace(word, unit);
    }
    parse_units(&normalized, input)
}

fn parse_units(s: &str, input: &str) -> Result<HumanDuration, DurationParseError> {
    let invalid = || DurationParseError::Invalid(input.to_string());

    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let component = scale_number(number, scale).ok_or_else(invalid)?;
        total = total
            .checked_add(component)
            .ok_or_else(|| DurationParseError::OutOfRange(input.to_string()))?;
        rest = tail;
    }

    if negative {
        total = -total;
    }
    from_nanos(total, input)
}

fn unit_nanos(unit: &str) -> Option<i128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SECOND,
        "m" => NANOS_PER_MINUTE,
        "h" => NANOS_PER_HOUR,
        "d" | "D" => NANOS_PER_DAY,
        "w" | "W" => NANOS_PER_WEEK,
        _ => return None,
    };
    Some(nanos)
}

fn scale_number(number: &str, scale: i128) -> Option<i128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if fraction.contains('.') {
        return None;
    }

    let whole: i128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(scale)?;

    if !fraction.is_empty() {
        let digits = &fraction[..fraction.len().min(18)];
        let numerator: i128 = digits.parse().ok()?;
        let denominator = 10i128.pow(digits.len() as u32);
        value = value.checked_add(numerator * scale / denominator)?;
    }
    Some(value)
}

fn from_nanos(nanos: i128, input: &str) -> Result<HumanDuration, DurationParseError> {
    let nanos =
        i64::try_from(nanos).map_err(|_| DurationParseError::OutOfRange(input.to_string()))?;
    Ok(HumanDuration(Duration::nanoseconds(nanos)))
}

impl FromStr for HumanDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_human_duration(s)
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.total_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }
        if nanos < 0 {
            f.write_str("-")?;
        }

        let mut rest = nanos.abs();
        for (unit, suffix) in [
            (NANOS_PER_WEEK, "w"),
            (NANOS_PER_DAY, "d"),
            (NANOS_PER_HOUR, "h"),
            (NANOS_PER_MINUTE, "m"),
        ] {
            let count = rest / unit;
            if count > 0 {
                write!(f, "{count}{suffix}")?;
            }
            rest %= unit;
        }

        if rest > 0 {
            let secs = rest / NANOS_PER_SECOND;
            let sub = rest % NANOS_PER_SECOND;
            if sub == 0 {
                write!(f, "{secs}s")?;
            } else {
                let fraction = format!("{sub:09}");
                write!(f, "{secs}.{}s", fraction.trim_end_matches('0'))?;
            }
        }
        Ok(())
    }
}

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HumanDurationVisitor;

        impl de::Visitor<'_> for HumanDurationVisitor {
            type Value = HumanDuration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration such as \"1w2d\", \"01:30\" or a number of seconds")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse_human_duration(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                from_nanos(i128::from(v) * NANOS_PER_SECOND, &v.to_string()).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                from_nanos(i128::from(v) * NANOS_PER_SECOND, &v.to_string()).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(HumanDurationVisitor)
    }
}

/// Serde adapter for entity durations: written as whole seconds
///
/// Reading accepts anything [`HumanDuration`] accepts, so both integer
/// seconds and `"3m25s"` load.
pub mod seconds {
    use super::HumanDuration;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write the duration as an integer number of seconds
    pub fn serialize<S: Serializer>(
        duration: &HumanDuration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    /// Read integer seconds or a human duration string
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HumanDuration, D::Error> {
        HumanDuration::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(input: &str) -> i64 {
        parse_human_duration(input).unwrap().num_seconds()
    }

    #[test]
    fn unit_suffixes_sum() {
        assert_eq!(secs("1w2d3h"), 7 * 86_400 + 2 * 86_400 + 3 * 3_600);
        assert_eq!(secs("15m"), 900);
        assert_eq!(secs("30d"), 30 * 86_400);
        assert_eq!(secs("1h30m15s"), 5_415);
    }

    #[test]
    fn word_units_commas_and_spaces() {
        assert_eq!(secs("2 weeks"), 14 * 86_400);
        assert_eq!(secs("1 day, 3 hours"), 86_400 + 3 * 3_600);
        assert_eq!(secs("1 minute 5 seconds"), 65);
    }

    #[test]
    fn colon_forms() {
        assert_eq!(secs("01:30"), 90);
        assert_eq!(secs("1:02:03"), 3_723);
        assert!(parse_human_duration("1:2:3:4").is_err());
    }

    #[test]
    fn bare_integers_are_seconds_and_empty_is_zero() {
        assert_eq!(secs("45"), 45);
        assert!(parse_human_duration("").unwrap().is_zero());
        assert!(parse_human_duration("   ").unwrap().is_zero());
    }

    #[test]
    fn negative_and_fractional() {
        assert_eq!(secs("-1.5h"), -5_400);
        assert!(parse_human_duration("-2d").unwrap().is_negative());
        assert_eq!(
            parse_human_duration("250ms").unwrap().as_duration(),
            Duration::milliseconds(250)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_human_duration("3x"),
            Err(DurationParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_human_duration("1h30"),
            Err(DurationParseError::MissingUnit(_))
        ));
        assert!(parse_human_duration("abc").is_err());
        assert!(parse_human_duration("-").is_err());
    }

    #[test]
    fn display_normalises_units() {
        assert_eq!(parse_human_duration("90").unwrap().to_string(), "1m30s");
        assert_eq!(parse_human_duration("9d").unwrap().to_string(), "1w2d");
        assert_eq!(parse_human_duration("0s").unwrap().to_string(), "0s");
        assert_eq!(parse_human_duration("-1.5s").unwrap().to_string(), "-1.5s");
    }

    #[test]
    fn deserializes_from_strings_and_numbers() {
        let from_str: HumanDuration = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(from_str.num_seconds(), 604_800);
        let from_int: HumanDuration = serde_json::from_str("60").unwrap();
        assert_eq!(from_int.num_seconds(), 60);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"1m\"");
    }
}
