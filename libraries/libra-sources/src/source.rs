//! The source adapter contract

use async_trait::async_trait;
use libra_core::{
    LanguageMap, LibraError, MediaType, Playable, PlayableKind, Result, SourceType, Version,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::filters::SearchFilters;

/// An adapter over an external service or local resource
///
/// Capability calls for a kind outside [`media_types`](Source::media_types)
/// fail with [`LibraError::UnsupportedMediaType`]; `content` on a source
/// without [`SourceType::Content`] fails with
/// [`LibraError::UnsupportedSourceType`].
#[async_trait]
pub trait Source: Send + Sync + fmt::Debug {
    /// Whether this adapter handles `id`
    fn satisfies(&self, id: &str) -> bool;

    /// Whether [`derive`](Source::derive) produces parameterised instances
    fn supports_multiple(&self) -> bool {
        false
    }

    /// Produce an instance bound to `id`
    async fn derive(&self, id: &str) -> Result<Arc<dyn Source>> {
        Err(LibraError::InvalidSource(format!(
            "source {} does not support multiple instances (requested {id})",
            self.id()
        )))
    }

    /// Stable, unique id
    fn id(&self) -> &str;

    /// Human label
    fn name(&self) -> &str;

    fn version(&self) -> Version {
        Version::current()
    }

    fn source_types(&self) -> &[SourceType];

    fn media_types(&self) -> &[MediaType];

    /// Transient playables matching `query`
    ///
    /// `page` starts at 1; sources without pagination ignore it.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        page: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<Playable>>;

    /// Raw media bytes
    async fn content(&self, playable: &Playable) -> Result<Vec<u8>>;

    /// Language code to lyrics or subtitles
    async fn lyrics(&self, playable: &Playable) -> Result<LanguageMap>;

    /// Fill in what a search result leaves out
    async fn complete_metadata(&self, playable: Playable) -> Result<Playable>;
}

/// Whether `source` serves playables of `kind`
pub fn supports_media_type(source: &dyn Source, kind: PlayableKind) -> bool {
    kind.media_type()
        .is_some_and(|media_type| source.media_types().contains(&media_type))
}

/// Fail with `UnsupportedMediaType` unless `source` serves `kind`
pub fn ensure_media_type(source: &dyn Source, kind: PlayableKind) -> Result<()> {
    if supports_media_type(source, kind) {
        Ok(())
    } else {
        Err(LibraError::UnsupportedMediaType(kind.to_string()))
    }
}

/// Fail with `UnsupportedSourceType` unless `source` provides `source_type`
pub fn ensure_source_type(source: &dyn Source, source_type: SourceType) -> Result<()> {
    if source.source_types().contains(&source_type) {
        Ok(())
    } else {
        Err(LibraError::UnsupportedSourceType(source_type.to_string()))
    }
}

/// Self-description a Libra-compatible service publishes at `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub source_types: Vec<SourceType>,
    #[serde(default)]
    pub media_types: Vec<MediaType>,
}

impl SourceDescriptor {
    /// Describe an existing source
    pub fn of(source: &dyn Source) -> Self {
        Self {
            id: source.id().to_string(),
            name: source.name().to_string(),
            version: source.version(),
            source_types: source.source_types().to_vec(),
            media_types: source.media_types().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpotifySource;

    #[test]
    fn media_type_support_follows_kind() {
        let spotify = SpotifySource::new();
        assert!(supports_media_type(&spotify, PlayableKind::Album));
        assert!(supports_media_type(&spotify, PlayableKind::Video));
        assert!(!supports_media_type(&spotify, PlayableKind::User));
        assert!(matches!(
            ensure_media_type(&spotify, PlayableKind::User),
            Err(LibraError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn source_type_check() {
        let spotify = SpotifySource::new();
        assert!(ensure_source_type(&spotify, SourceType::Lyrics).is_ok());
        assert!(matches!(
            ensure_source_type(&spotify, SourceType::Content),
            Err(LibraError::UnsupportedSourceType(t)) if t == "content"
        ));
    }

    #[test]
    fn descriptor_serializes_lowercase_capabilities() {
        let descriptor = SourceDescriptor::of(&SpotifySource::new());
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["id"], "spotify");
        assert_eq!(json["source_types"], serde_json::json!(["metadata", "lyrics"]));
    }
}
