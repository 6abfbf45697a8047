use async_trait::async_trait;
use libra_core::{LanguageMap, LibraError, MediaType, Playable, Result, SourceType};
use tracing::debug;

use crate::filters::SearchFilters;
use crate::source::{ensure_media_type, Source};

const SOURCE_TYPES: [SourceType; 2] = [SourceType::Metadata, SourceType::Lyrics];
const MEDIA_TYPES: [MediaType; 3] = [MediaType::Music, MediaType::Video, MediaType::Playlist];

/// Spotify registration
///
/// Registers the `spotify`/`sp` ids and their capability sets. There is no
/// API client behind it yet, so searches come back empty and metadata and
/// lyrics pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotifySource;

impl SpotifySource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Source for SpotifySource {
    fn satisfies(&self, id: &str) -> bool {
        matches!(id.to_ascii_lowercase().as_str(), "spotify" | "sp")
    }

    fn id(&self) -> &str {
        "spotify"
    }

    fn name(&self) -> &str {
        "Spotify"
    }

    fn source_types(&self) -> &[SourceType] {
        &SOURCE_TYPES
    }

    fn media_types(&self) -> &[MediaType] {
        &MEDIA_TYPES
    }

    async fn search(
        &self,
        query: &str,
        _limit: usize,
        _page: usize,
        _filters: &SearchFilters,
    ) -> Result<Vec<Playable>> {
        debug!(query, "Spotify search has no backend, returning nothing");
        Ok(Vec::new())
    }

    async fn content(&self, _playable: &Playable) -> Result<Vec<u8>> {
        Err(LibraError::UnsupportedSourceType(SourceType::Content.to_string()))
    }

    async fn lyrics(&self, playable: &Playable) -> Result<LanguageMap> {
        ensure_media_type(self, playable.kind())?;
        Ok(LanguageMap::new())
    }

    async fn complete_metadata(&self, playable: Playable) -> Result<Playable> {
        ensure_media_type(self, playable.kind())?;
        Ok(playable)
    }
}
