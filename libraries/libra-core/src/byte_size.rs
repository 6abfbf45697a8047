/// Byte sizes with binary unit suffixes (`512B`, `10MB`, `1.5GiB`)
use crate::error::LibraError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

const UNITS: [(&str, u64); 7] = [
    ("E", 1 << 60),
    ("P", 1 << 50),
    ("T", 1 << 40),
    ("G", 1 << 30),
    ("M", 1 << 20),
    ("K", 1 << 10),
    ("", 1),
];

/// A count of bytes; zero is commonly used to mean "unlimited"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// Raw byte count
    pub fn bytes(self) -> u64 {
        self.0
    }

    /// Whether the size is zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Kibibytes
    pub fn kib(n: u64) -> Self {
        Self(n << 10)
    }

    /// Mebibytes
    pub fn mib(n: u64) -> Self {
        Self(n << 20)
    }
}

fn multiplier(unit: &str) -> Option<u64> {
    let upper = unit.trim().to_ascii_uppercase();
    let prefix = upper
        .strip_suffix("IB")
        .or_else(|| upper.strip_suffix('B'))
        .unwrap_or(&upper);
    UNITS
        .iter()
        .find(|(name, _)| *name == prefix)
        .map(|(_, factor)| *factor)
}

impl FromStr for ByteSize {
    type Err = LibraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || LibraError::invalid_input(format!("invalid byte size {s:?}"));

        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        if number.is_empty() {
            return Err(invalid());
        }
        let factor = multiplier(unit).ok_or_else(invalid)?;

        if let Ok(whole) = number.parse::<u64>() {
            return whole.checked_mul(factor).map(Self).ok_or_else(invalid);
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;
        let bytes = value * factor as f64;
        if !bytes.is_finite() || bytes > u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(Self(bytes.round() as u64))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0B");
        }
        for (name, factor) in UNITS {
            if self.0 % factor == 0 {
                return write!(f, "{}{}B", self.0 / factor, name);
            }
        }
        write!(f, "{}B", self.0)
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ByteSizeVisitor;

        impl de::Visitor<'_> for ByteSizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte size such as \"10MB\" or a number of bytes")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ByteSize(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| E::custom("byte size cannot be negative"))
            }
        }

        deserializer.deserialize_any(ByteSizeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units_case_insensitively() {
        assert_eq!("0B".parse::<ByteSize>().unwrap(), ByteSize(0));
        assert_eq!("512".parse::<ByteSize>().unwrap(), ByteSize(512));
        assert_eq!("10MB".parse::<ByteSize>().unwrap(), ByteSize::mib(10));
        assert_eq!("10 mib".parse::<ByteSize>().unwrap(), ByteSize::mib(10));
        assert_eq!("4k".parse::<ByteSize>().unwrap(), ByteSize::kib(4));
        assert_eq!("1.5GB".parse::<ByteSize>().unwrap(), ByteSize(3 << 29));
    }

    #[test]
    fn rejects_unknown_units() {
        assert!("10XB".parse::<ByteSize>().is_err());
        assert!("MB".parse::<ByteSize>().is_err());
        assert!("".parse::<ByteSize>().is_err());
    }

    #[test]
    fn displays_largest_exact_unit() {
        assert_eq!(ByteSize::mib(10).to_string(), "10MB");
        assert_eq!(ByteSize(1536).to_string(), "1536B");
        assert_eq!(ByteSize(0).to_string(), "0B");
    }
}
