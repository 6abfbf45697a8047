//! Test helpers for source integration tests
//!
//! `FakeSource` is a scriptable in-memory adapter: canned results, optional
//! delay or failure, and a call counter.

#![allow(dead_code)]

use async_trait::async_trait;
use libra_core::{
    LanguageMap, LibraError, LinkedSource, MediaType, Playable, Result, SourceType, Track,
};
use libra_sources::{SearchFilters, Source, SourceRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FakeSource {
    id: String,
    media_types: Vec<MediaType>,
    source_types: Vec<SourceType>,
    results: Vec<Playable>,
    lyrics: LanguageMap,
    delay: Option<Duration>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            media_types: vec![MediaType::Music, MediaType::Video, MediaType::Playlist],
            source_types: vec![SourceType::Content, SourceType::Metadata, SourceType::Lyrics],
            results: Vec::new(),
            lyrics: LanguageMap::new(),
            delay: None,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn returning(mut self, results: Vec<Playable>) -> Self {
        self.results = results;
        self
    }

    pub fn with_media_types(mut self, media_types: Vec<MediaType>) -> Self {
        self.media_types = media_types;
        self
    }

    pub fn with_source_types(mut self, source_types: Vec<SourceType>) -> Self {
        self.source_types = source_types;
        self
    }

    pub fn with_lyrics(mut self, lang: &str, text: &str) -> Self {
        self.lyrics.insert(lang.to_string(), text.to_string());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LibraError::source(&self.id, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Source for FakeSource {
    fn satisfies(&self, id: &str) -> bool {
        id == self.id
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn source_types(&self) -> &[SourceType] {
        &self.source_types
    }

    fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    async fn search(
        &self,
        _query: &str,
        _limit: usize,
        _page: usize,
        _filters: &SearchFilters,
    ) -> Result<Vec<Playable>> {
        self.enter().await?;
        Ok(self.results.clone())
    }

    async fn content(&self, playable: &Playable) -> Result<Vec<u8>> {
        self.enter().await?;
        Ok(format!("{}:{}", self.id, playable.title()).into_bytes())
    }

    async fn lyrics(&self, _playable: &Playable) -> Result<LanguageMap> {
        self.enter().await?;
        Ok(self.lyrics.clone())
    }

    async fn complete_metadata(&self, playable: Playable) -> Result<Playable> {
        self.enter().await?;
        Ok(match playable {
            Playable::Track(mut track) => {
                track.description = format!("completed by {}", self.id);
                Playable::Track(track)
            }
            other => other,
        })
    }
}

/// Registry with `sources` registered and enabled in the given order
pub async fn registry_of(sources: Vec<FakeSource>) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    let ids: Vec<String> = sources.iter().map(|s| s.id().to_string()).collect();
    for source in sources {
        registry.register_prototype(Arc::new(source));
    }
    let failures = registry.enable_all(&ids).await;
    assert!(failures.is_empty(), "enable failed: {failures:?}");
    registry
}

/// A transient track as a source would return it
pub fn track(title: &str) -> Playable {
    Playable::Track(Track {
        title: title.to_string(),
        ..Track::default()
    })
}

/// A track credited to `artist` through display metadata
pub fn track_by(title: &str, artist: &str) -> Playable {
    let mut track = Track {
        title: title.to_string(),
        ..Track::default()
    };
    track
        .additional_meta
        .insert("display_artists".to_string(), serde_json::json!([artist]));
    Playable::Track(track)
}

/// A track whose metadata came from `source_id`
pub fn sourced_track(title: &str, source_id: &str) -> Playable {
    Playable::Track(Track {
        title: title.to_string(),
        metadata_source: LinkedSource::new(source_id, title),
        ..Track::default()
    })
}
