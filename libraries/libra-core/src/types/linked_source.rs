/// Source references: `"<source-id>::<locator>"`
use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR: &str = "::";

/// A reference to the source that produced a piece of data and how to
/// re-address it there.
///
/// Without a `::` separator the whole string is the locator and the source id
/// is empty. This type is the only place that splits the string.
///
/// # Example
///
/// ```rust
/// use libra_core::LinkedSource;
///
/// let linked = LinkedSource::from("youtube::https://youtu.be/abc");
/// assert_eq!(linked.source_id(), "youtube");
/// assert_eq!(linked.locator(), "https://youtu.be/abc");
///
/// let bare = LinkedSource::from("/music/song.mp3");
/// assert_eq!(bare.source_id(), "");
/// assert_eq!(bare.locator(), "/music/song.mp3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkedSource(String);

impl LinkedSource {
    /// Build a reference from a source id and locator
    pub fn new(source_id: &str, locator: &str) -> Self {
        Self(format!("{source_id}{SEPARATOR}{locator}"))
    }

    /// Split into `(source_id, locator)`
    pub fn parts(&self) -> (&str, &str) {
        self.0.split_once(SEPARATOR).unwrap_or(("", &self.0))
    }

    /// Source id; empty when absent
    pub fn source_id(&self) -> &str {
        self.parts().0
    }

    /// Opaque locator
    pub fn locator(&self) -> &str {
        self.parts().1
    }

    /// Whether the reference is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LinkedSource {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LinkedSource {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for LinkedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_keeps_inner_separators() {
        let linked = LinkedSource::new("file:/music", "a::b.mp3");
        assert_eq!(linked.source_id(), "file:/music");
        assert_eq!(linked.locator(), "a::b.mp3");
    }

    #[test]
    fn empty_reference() {
        let linked = LinkedSource::default();
        assert!(linked.is_empty());
        assert_eq!(linked.parts(), ("", ""));
    }
}
