/// Semantic versions: `major.minor.patch[-suffix]`
use crate::error::LibraError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

/// A parsed version
///
/// Missing minor/patch components parse as zero. Ordering compares the
/// numbers first; with equal numbers a release outranks a pre-release and
/// two pre-releases compare by suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Text after the first `-`, without the dash
    pub suffix: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: None,
        }
    }

    /// Version of the running build
    pub fn current() -> Self {
        env!("CARGO_PKG_VERSION")
            .parse()
            .unwrap_or_else(|_| Self::new(0, 0, 0))
    }

    /// Parse `major[.minor[.patch]][-suffix]`
    pub fn parse(input: &str) -> Result<Self, LibraError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let (numbers, suffix) = match trimmed.split_once('-') {
            Some((numbers, suffix)) => (numbers, Some(suffix.to_string())),
            None => (trimmed, None),
        };

        let invalid = || LibraError::invalid_input(format!("invalid version {input:?}"));
        let mut parts = numbers.split('.');
        let mut next = |required: bool| -> Result<u64, LibraError> {
            match parts.next() {
                Some(part) => part.parse().map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(false)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor,
            patch,
            suffix,
        })
    }

    /// Whether `self >= other`
    pub fn is_at_least(&self, other: &Version) -> bool {
        self >= other
    }

    pub fn is_prerelease(&self) -> bool {
        self.suffix.is_some()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.suffix, &other.suffix) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "-{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = LibraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_versions() {
        assert_eq!(Version::parse("2").unwrap(), Version::new(2, 0, 0));
        assert_eq!(Version::parse("1.4").unwrap(), Version::new(1, 4, 0));

        let pre = Version::parse("1.0.0-beta.2").unwrap();
        assert_eq!(pre.suffix.as_deref(), Some("beta.2"));
        assert_eq!(pre.to_string(), "1.0.0-beta.2");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
    }

    #[test]
    fn release_outranks_prerelease() {
        let release = Version::new(1, 0, 0);
        let pre = Version::parse("1.0.0-rc1").unwrap();
        assert!(release > pre);
        assert!(release.is_at_least(&pre));
        assert!(!pre.is_at_least(&release));
        assert!(Version::new(1, 0, 1) > release);
    }

    #[test]
    fn current_matches_package() {
        assert_eq!(Version::current().to_string(), env!("CARGO_PKG_VERSION"));
    }
}
