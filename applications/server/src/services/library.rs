/// Library service - read paths behind the HTTP API
use crate::{
    error::{Result, ServerError},
    services::ContentCache,
};
use libra_core::{
    Album, CatalogStore, HumanDuration, LanguageMap, LibraError, Playable, PlayableKind, Track,
};
use libra_sources::{Aggregator, SearchFilters, SearchOutcome};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Language-indexed text: the whole map, or one entry of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TextLookup {
    All(LanguageMap),
    One(String),
}

/// Media bytes served from (or just written to) the cache
#[derive(Debug, Clone)]
pub struct CachedContent {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct Library {
    catalog: Arc<dyn CatalogStore>,
    aggregator: Arc<Aggregator>,
    cache: Arc<ContentCache>,
    max_search_results: usize,
    max_track_duration: HumanDuration,
}

impl Library {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        aggregator: Arc<Aggregator>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            catalog,
            aggregator,
            cache,
            max_search_results: 0,
            max_track_duration: HumanDuration::zero(),
        }
    }

    /// Cap search results and fetchable track length; 0 disables either cap
    pub fn with_limits(mut self, max_search_results: usize, max_track_duration: HumanDuration) -> Self {
        self.max_search_results = max_search_results;
        self.max_track_duration = max_track_duration;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub async fn all_playables(&self) -> Result<Vec<Playable>> {
        Ok(self.catalog.get_all_playables().await?)
    }

    pub async fn user_playables(&self, user_id: &str) -> Result<Vec<Playable>> {
        Ok(self.catalog.get_playables(user_id).await?)
    }

    /// Any catalog entity (or user) by kind and id
    pub async fn get(&self, kind: PlayableKind, id: &str) -> Result<Playable> {
        let playable: Playable = match kind {
            PlayableKind::Track => self.catalog.get_track(id).await?.into(),
            PlayableKind::Album => self.catalog.get_album(id).await?.into(),
            PlayableKind::Video => self.catalog.get_video(id).await?.into(),
            PlayableKind::Artist => self.catalog.get_artist(id).await?.into(),
            PlayableKind::Playlist => self.catalog.get_playlist(id).await?.into(),
            PlayableKind::User => Playable::User(self.catalog.get_user(id).await?),
        };
        Ok(playable)
    }

    /// Stored lyrics, or those the enabled sources find when none are stored
    pub async fn track_lyrics(&self, id: &str, lang: Option<&str>) -> Result<TextLookup> {
        let track = self.catalog.get_track(id).await?;
        let lyrics = if track.lyrics.is_empty() {
            self.aggregator.lyrics(&Playable::Track(track)).await?
        } else {
            track.lyrics
        };
        select_language(lyrics, "lyrics", id, lang)
    }

    pub async fn video_subtitles(&self, id: &str, lang: Option<&str>) -> Result<TextLookup> {
        let video = self.catalog.get_video(id).await?;
        let subtitles = if video.subtitles.is_empty() {
            self.aggregator.lyrics(&Playable::Video(video)).await?
        } else {
            video.subtitles
        };
        select_language(subtitles, "subtitles", id, lang)
    }

    pub async fn album_tracks(&self, id: &str) -> Result<Vec<Track>> {
        let album = self.catalog.get_album(id).await?;
        self.resolve_tracks(&album.track_ids).await
    }

    pub async fn playlist_tracks(&self, id: &str) -> Result<Vec<Track>> {
        let playlist = self.catalog.get_playlist(id).await?;
        self.resolve_tracks(&playlist.track_ids).await
    }

    pub async fn artist_tracks(&self, id: &str) -> Result<Vec<Track>> {
        let artist = self.catalog.get_artist(id).await?;
        self.resolve_tracks(&artist.track_ids).await
    }

    pub async fn artist_albums(&self, id: &str) -> Result<Vec<Album>> {
        let artist = self.catalog.get_artist(id).await?;
        let mut albums = Vec::with_capacity(artist.album_ids.len());
        for album_id in &artist.album_ids {
            match self.catalog.get_album(album_id).await {
                Ok(album) => albums.push(album),
                Err(e) if e.is_not_found() => debug!(album_id, "dangling album reference"),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(albums)
    }

    /// Referenced tracks in list order; ids that no longer exist are skipped
    async fn resolve_tracks(&self, ids: &[String]) -> Result<Vec<Track>> {
        let mut tracks = Vec::with_capacity(ids.len());
        for track_id in ids {
            match self.catalog.get_track(track_id).await {
                Ok(track) => tracks.push(track),
                Err(e) if e.is_not_found() => debug!(track_id, "dangling track reference"),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(tracks)
    }

    /// Whether content for a track or video is cached
    pub async fn is_stored(&self, kind: PlayableKind, id: &str) -> Result<bool> {
        self.cache.is_content_stored(kind, id).await
    }

    /// Aggregated search; source failures are logged, never returned
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        page: usize,
        filters: &SearchFilters,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let limit = match (limit, self.max_search_results) {
            (0, max) => max,
            (requested, 0) => requested,
            (requested, max) => requested.min(max),
        };

        let outcome = self
            .aggregator
            .search(query, limit, page.max(1), filters, cancel)
            .await;
        if !outcome.failures.is_empty() {
            warn!(query, failures = %outcome.failures, "search completed with source failures");
        }
        outcome
    }

    /// Cached content, fetching and caching it through the sources on a miss
    pub async fn content(&self, kind: PlayableKind, id: &str) -> Result<CachedContent> {
        if let Some(path) = self.cache.content_path(kind, id).await? {
            let bytes = tokio::fs::read(&path).await?;
            return Ok(CachedContent { path, bytes });
        }

        let playable = self.get(kind, id).await?;
        if let Playable::Track(track) = &playable {
            if !self.max_track_duration.is_zero() && track.duration > self.max_track_duration {
                return Err(ServerError::BadRequest(format!(
                    "track is longer than the allowed {}",
                    self.max_track_duration
                )));
            }
        }

        let bytes = self.aggregator.content(&playable).await?;
        let extension = playable
            .content_source()
            .and_then(|source| locator_extension(source.locator()))
            .unwrap_or_else(|| "bin".to_string());
        let path = self.cache.store_content(kind, id, &bytes, &extension).await?;
        debug!(%kind, id, bytes = bytes.len(), "content cached");

        Ok(CachedContent { path, bytes })
    }
}

fn select_language(
    map: LanguageMap,
    what: &str,
    id: &str,
    lang: Option<&str>,
) -> Result<TextLookup> {
    let Some(lang) = lang else {
        return Ok(TextLookup::All(map));
    };
    map.get(lang)
        .cloned()
        .map(TextLookup::One)
        .ok_or_else(|| LibraError::not_found(what, format!("{id}/{lang}")).into())
}

/// A short alphanumeric file extension in the locator's last path segment
fn locator_extension(locator: &str) -> Option<String> {
    let path = locator.split(|c| c == '?' || c == '#').next().unwrap_or(locator);
    let extension = Path::new(path).extension()?.to_str()?;
    let plausible = !extension.is_empty()
        && extension.len() <= 5
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    plausible.then(|| extension.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_one_language_or_all() {
        let map = LanguageMap::from([
            ("en".to_string(), "hello".to_string()),
            ("fr".to_string(), "bonjour".to_string()),
        ]);

        assert_eq!(
            select_language(map.clone(), "lyrics", "t1", Some("fr")).unwrap(),
            TextLookup::One("bonjour".to_string())
        );
        assert_eq!(
            select_language(map.clone(), "lyrics", "t1", None).unwrap(),
            TextLookup::All(map.clone())
        );
        assert!(select_language(map, "lyrics", "t1", Some("de")).is_err());
    }

    #[test]
    fn extensions_from_locators() {
        assert_eq!(locator_extension("Artist/01 Intro.MP3").as_deref(), Some("mp3"));
        assert_eq!(
            locator_extension("https://cdn.example/a.opus?sig=1").as_deref(),
            Some("opus")
        );
        assert_eq!(locator_extension("https://music.youtube.com/watch?v=abc"), None);
        assert_eq!(locator_extension("http://host/api/v1/track/r1/content"), None);
    }
}
