//! Fan-out across enabled sources
//!
//! Every per-source call is isolated: failures and timeouts are collected
//! into [`SourceFailures`] and never fail the aggregate search.

use futures::future::join_all;
use libra_core::{
    LanguageMap, LibraError, LinkedSource, Playable, PlayableKind, Result, SourceType,
};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::filters::SearchFilters;
use crate::registry::SourceRegistry;
use crate::source::{ensure_source_type, supports_media_type, Source};

/// Per-source deadline for fan-out calls
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(15);

/// Non-fatal failures collected during a fan-out
#[derive(Debug, Default)]
pub struct SourceFailures(Vec<LibraError>);

impl SourceFailures {
    pub fn push(&mut self, error: LibraError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraError> {
        self.0.iter()
    }
}

impl fmt::Display for SourceFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} source(s) failed", self.0.len())?;
        for (i, error) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SourceFailures {}

/// Merged search results plus whatever went wrong getting them
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub results: Vec<Playable>,
    pub failures: SourceFailures,
}

/// Dispatches capability calls across the enabled sources
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<SourceRegistry>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    /// Search every enabled source serving one of the requested kinds
    ///
    /// Results are ordered by source priority, then by position within each
    /// source. Entries with equal kind, title and primary credit collapse into
    /// the one from the highest-priority source. When `cancel` fires, sources
    /// that already answered still contribute.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        page: usize,
        filters: &SearchFilters,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let kinds = filters.kinds();
        let media_types = filters.media_types();
        let sources: Vec<Arc<dyn Source>> = self
            .registry
            .enumerate()
            .into_iter()
            .filter(|s| media_types.iter().any(|m| s.media_types().contains(m)))
            .collect();

        debug!(
            query,
            sources = sources.len(),
            kinds = ?kinds,
            "Fanning out search"
        );

        let calls = sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let call = tokio::time::timeout(
                    self.timeout,
                    source.search(query, limit, page, filters),
                );
                let result = tokio::select! {
                    () = cancel.cancelled() => Err(LibraError::source(source.id(), "cancelled")),
                    res = call => match res {
                        Ok(inner) => inner.map_err(|e| match e {
                            e @ LibraError::Source { .. } => e,
                            other => LibraError::source(source.id(), other),
                        }),
                        Err(_) => Err(LibraError::source(source.id(), "timed out")),
                    },
                };
                (source, result)
            }
        });

        let mut outcome = SearchOutcome::default();
        let mut seen = HashSet::new();
        for (source, result) in join_all(calls).await {
            let items = match result {
                Ok(items) => items,
                Err(e) => {
                    warn!(source = source.id(), error = %e, "Source search failed");
                    outcome.failures.push(e);
                    continue;
                }
            };

            for mut item in items {
                if !kinds.contains(&item.kind()) {
                    continue;
                }
                stamp_metadata_source(&mut item, source.id());
                let key = (item.kind(), item.title().to_lowercase(), item.primary_credit());
                if seen.insert(key) {
                    outcome.results.push(item);
                }
            }
        }

        if limit > 0 {
            outcome.results.truncate(limit);
        }
        outcome
    }

    /// Complete a playable through the source that produced its metadata
    ///
    /// Playables from sources that are not enabled come back unchanged.
    pub async fn complete_metadata(&self, playable: Playable) -> Result<Playable> {
        let Some(source_id) = playable
            .metadata_source()
            .map(|s| s.source_id().to_string())
        else {
            return Ok(playable);
        };

        match self.registry.get(&source_id) {
            Some(source) => source.complete_metadata(playable).await,
            None => {
                debug!(source = %source_id, "Metadata source not enabled, leaving playable as-is");
                Ok(playable)
            }
        }
    }

    /// First non-empty lyrics (or subtitles) mapping
    ///
    /// The playable's own `lyric_sources` are tried first, then every enabled
    /// lyrics source serving its kind, in priority order. Per-source failures
    /// are logged and skipped.
    pub async fn lyrics(&self, playable: &Playable) -> Result<LanguageMap> {
        let bearing = playable
            .as_lyric_bearing()
            .ok_or_else(|| LibraError::UnsupportedMediaType(playable.kind().to_string()))?;

        let mut tried: Vec<String> = Vec::new();
        for linked in bearing.lyric_sources().values() {
            let id = linked.source_id();
            if id.is_empty() || tried.iter().any(|t| t == id) {
                continue;
            }
            tried.push(id.to_string());
            if let Some(source) = self.registry.get(id) {
                if let Some(lyrics) = self.try_lyrics(&source, playable).await {
                    return Ok(lyrics);
                }
            }
        }

        let kind = playable.kind();
        for source in self.registry.enumerate() {
            if tried.iter().any(|t| t == source.id())
                || !source.source_types().contains(&SourceType::Lyrics)
                || !supports_media_type(source.as_ref(), kind)
            {
                continue;
            }
            if let Some(lyrics) = self.try_lyrics(&source, playable).await {
                return Ok(lyrics);
            }
        }

        Ok(LanguageMap::new())
    }

    async fn try_lyrics(&self, source: &Arc<dyn Source>, playable: &Playable) -> Option<LanguageMap> {
        match tokio::time::timeout(self.timeout, source.lyrics(playable)).await {
            Ok(Ok(lyrics)) if !lyrics.is_empty() => Some(lyrics),
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                warn!(source = source.id(), error = %e, "Lyrics lookup failed");
                None
            }
            Err(_) => {
                warn!(source = source.id(), "Lyrics lookup timed out");
                None
            }
        }
    }

    /// Media bytes for a track or video
    ///
    /// A locator without a source id that names an existing file is read
    /// straight from disk. Otherwise the `content_source` (or, for fresh
    /// search results, the `metadata_source`) names the source to ask.
    pub async fn content(&self, playable: &Playable) -> Result<Vec<u8>> {
        let kind = playable.kind();
        if !matches!(kind, PlayableKind::Track | PlayableKind::Video) {
            return Err(LibraError::UnsupportedMediaType(kind.to_string()));
        }

        let linked = playable
            .content_source()
            .filter(|s| !s.is_empty())
            .or_else(|| playable.metadata_source().filter(|s| !s.is_empty()))
            .ok_or_else(|| {
                LibraError::invalid_input(format!("{kind} {} has no content source", playable.id()))
            })?;

        if linked.source_id().is_empty() {
            let path = Path::new(linked.locator());
            if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
                debug!(path = %path.display(), "Reading local content");
                return Ok(tokio::fs::read(path).await?);
            }
            return Err(LibraError::not_found("content", linked.locator()));
        }

        let source = self
            .registry
            .get(linked.source_id())
            .ok_or_else(|| LibraError::InvalidSource(linked.source_id().to_string()))?;
        ensure_source_type(source.as_ref(), SourceType::Content)?;
        source.content(playable).await
    }
}

/// Attribute results that came back without a source id to `source_id`
fn stamp_metadata_source(item: &mut Playable, source_id: &str) {
    let Some(current) = item.metadata_source() else {
        return;
    };
    if current.source_id().is_empty() {
        let stamped = LinkedSource::new(source_id, current.locator());
        item.set_metadata_source(stamped);
    }
}
