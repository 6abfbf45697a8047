//! Local files and directory trees
//!
//! The `file:` prototype derives one instance per configured path
//! (`file:/srv/music`). Results are addressed as
//! `file:<path>::<path relative to the root>`.

use async_trait::async_trait;
use libra_core::{
    HumanDuration, LanguageMap, LibraError, LinkedSource, MediaType, Metadata, Playable,
    PlayableKind, Result, SourceType, Track, Video,
};
use lofty::{Accessor, AudioFile, ItemKey, Probe, TaggedFileExt};
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::filters::SearchFilters;
use crate::source::{ensure_media_type, Source};

const PREFIX: &str = "file:";
const SOURCE_TYPES: [SourceType; 3] = [SourceType::Content, SourceType::Metadata, SourceType::Lyrics];
const MEDIA_TYPES: [MediaType; 2] = [MediaType::Music, MediaType::Video];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "aac", "m4a", "aiff", "wv"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "avi"];

#[derive(Debug, Clone)]
pub struct LocalFileSource {
    root: PathBuf,
    id: String,
    name: String,
}

impl LocalFileSource {
    /// The unbound `file:` prototype
    pub fn prototype() -> Self {
        Self {
            root: PathBuf::new(),
            id: PREFIX.to_string(),
            name: "Local File".to_string(),
        }
    }

    /// Instance rooted at `path` (a file or a directory)
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let root = path.into();
        Self {
            id: format!("{PREFIX}{}", root.display()),
            name: format!("Local File ({})", root.display()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a locator back to a file under the root
    fn resolve(&self, locator: &str) -> Result<PathBuf> {
        let relative = Path::new(locator);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if locator.is_empty() || escapes {
            return Err(LibraError::invalid_input(format!(
                "locator {locator:?} is outside {}",
                self.root.display()
            )));
        }

        if self.root.is_file() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(relative))
    }

    /// The file a playable produced by this instance points at
    fn file_of(&self, playable: &Playable) -> Result<PathBuf> {
        let linked = playable
            .content_source()
            .filter(|s| s.source_id() == self.id)
            .or_else(|| playable.metadata_source().filter(|s| s.source_id() == self.id))
            .ok_or_else(|| {
                LibraError::invalid_input(format!(
                    "{} {:?} does not come from {}",
                    playable.kind(),
                    playable.title(),
                    self.id
                ))
            })?;
        self.resolve(linked.locator())
    }

    fn relative_locator(&self, file: &Path) -> String {
        if self.root.is_file() {
            return file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        file.strip_prefix(&self.root)
            .unwrap_or(file)
            .to_string_lossy()
            .into_owned()
    }

    fn to_playable(&self, file: &Path, tags: FileTags) -> Playable {
        let linked = LinkedSource::new(&self.id, &self.relative_locator(file));
        let additional_meta: Metadata = [
            ("display_artists".to_string(), json!(tags.artist.into_iter().collect::<Vec<_>>())),
            ("display_album".to_string(), json!(tags.album.unwrap_or_default())),
        ]
        .into_iter()
        .collect();

        if is_video(file) {
            Playable::Video(Video {
                title: tags.title,
                duration: tags.duration,
                release_date: tags.year,
                additional_meta,
                content_source: linked.clone(),
                metadata_source: linked,
                ..Video::default()
            })
        } else {
            Playable::Track(Track {
                title: tags.title,
                duration: tags.duration,
                release_date: tags.year,
                track_number: tags.track_number,
                additional_meta,
                content_source: linked.clone(),
                metadata_source: linked,
                ..Track::default()
            })
        }
    }
}

#[async_trait]
impl Source for LocalFileSource {
    fn satisfies(&self, id: &str) -> bool {
        id.starts_with(PREFIX)
    }

    fn supports_multiple(&self) -> bool {
        self.root.as_os_str().is_empty()
    }

    async fn derive(&self, id: &str) -> Result<Arc<dyn Source>> {
        if !self.supports_multiple() {
            return Err(LibraError::InvalidSource(format!(
                "source {} does not support multiple instances",
                self.id
            )));
        }
        let path = id.strip_prefix(PREFIX).unwrap_or(id);
        if path.is_empty() {
            return Err(LibraError::InvalidSource(id.to_string()));
        }
        Ok(Arc::new(Self::at(path)))
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
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
        limit: usize,
        page: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<Playable>> {
        let kinds = filters.kinds();
        let want_tracks = kinds.contains(&PlayableKind::Track);
        let want_videos = kinds.contains(&PlayableKind::Video);
        if !want_tracks && !want_videos {
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let needle = query.trim().to_lowercase();
        let matches = tokio::task::spawn_blocking(move || {
            scan(&root)
                .into_iter()
                .filter(|file| if is_video(file) { want_videos } else { want_tracks })
                .filter_map(|file| {
                    let tags = read_tags(&file);
                    let stem = file_stem(&file).to_lowercase();
                    let hit = needle.is_empty()
                        || stem.contains(&needle)
                        || tags.title.to_lowercase().contains(&needle);
                    hit.then_some((file, tags))
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| LibraError::source(&self.id, e))?;

        let skip = page.saturating_sub(1).saturating_mul(limit);
        let take = if limit == 0 { usize::MAX } else { limit };
        debug!(source = %self.id, query, found = matches.len(), "Local search");

        Ok(matches
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(file, tags)| self.to_playable(&file, tags))
            .collect())
    }

    async fn content(&self, playable: &Playable) -> Result<Vec<u8>> {
        ensure_media_type(self, playable.kind())?;
        let file = self.file_of(playable)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LibraError::not_found("file", file.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn lyrics(&self, playable: &Playable) -> Result<LanguageMap> {
        ensure_media_type(self, playable.kind())?;
        let file = self.file_of(playable)?;
        tokio::task::spawn_blocking(move || read_lyrics(&file))
            .await
            .map_err(|e| LibraError::source(&self.id, e))
    }

    async fn complete_metadata(&self, playable: Playable) -> Result<Playable> {
        ensure_media_type(self, playable.kind())?;
        let file = self.file_of(&playable)?;
        let tags = {
            let file = file.clone();
            tokio::task::spawn_blocking(move || read_tags(&file))
                .await
                .map_err(|e| LibraError::source(&self.id, e))?
        };

        let fresh = self.to_playable(&file, tags);
        Ok(match (playable, fresh) {
            (Playable::Track(mut track), Playable::Track(read)) => {
                track.title = read.title;
                track.duration = read.duration;
                track.track_number = read.track_number;
                if !read.release_date.is_empty() {
                    track.release_date = read.release_date;
                }
                track.additional_meta.extend(read.additional_meta);
                Playable::Track(track)
            }
            (Playable::Video(mut video), Playable::Video(read)) => {
                video.title = read.title;
                video.duration = read.duration;
                if !read.release_date.is_empty() {
                    video.release_date = read.release_date;
                }
                video.additional_meta.extend(read.additional_meta);
                Playable::Video(video)
            }
            (original, _) => original,
        })
    }
}

/// What the tags (or, failing that, the file name) say about a file
#[derive(Debug, Default)]
struct FileTags {
    title: String,
    artist: Option<String>,
    album: Option<String>,
    year: String,
    track_number: i64,
    duration: HumanDuration,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn is_video(path: &Path) -> bool {
    VIDEO_EXTENSIONS.contains(&extension(path).as_str())
}

fn is_media(path: &Path) -> bool {
    let ext = extension(path);
    AUDIO_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
}

/// Media files under `root`, sorted by path; a missing root yields nothing
fn scan(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_media(root) { vec![root.to_path_buf()] } else { Vec::new() };
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_media(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn read_tags(path: &Path) -> FileTags {
    let mut tags = FileTags {
        title: file_stem(path),
        ..FileTags::default()
    };

    let tagged = match Probe::open(path).and_then(|p| p.read()) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No readable tags, using file name");
            return tags;
        }
    };

    let duration = tagged.properties().duration();
    tags.duration = HumanDuration::from_secs(duration.as_secs() as i64);

    if let Some(tag) = tagged.primary_tag().or(tagged.first_tag()) {
        if let Some(title) = tag.title().filter(|t| !t.trim().is_empty()) {
            tags.title = title.into_owned();
        }
        tags.artist = tag.artist().map(|a| a.into_owned());
        tags.album = tag.album().map(|a| a.into_owned());
        tags.year = tag.year().map(|y| y.to_string()).unwrap_or_default();
        tags.track_number = tag.track().map(i64::from).unwrap_or_default();
    }
    tags
}

/// Embedded lyrics tag, else a `.lrc` or `.txt` file next to the media
///
/// Values are prefixed with their format (`txt` or `lrc`) and a newline.
fn read_lyrics(path: &Path) -> LanguageMap {
    let mut lyrics = LanguageMap::new();

    if let Ok(tagged) = Probe::open(path).and_then(|p| p.read()) {
        let embedded = tagged
            .primary_tag()
            .or(tagged.first_tag())
            .and_then(|tag| tag.get_string(&ItemKey::Lyrics))
            .filter(|text| !text.trim().is_empty());
        if let Some(text) = embedded {
            lyrics.insert("unknown".to_string(), format!("txt\n{text}"));
            return lyrics;
        }
    }

    for format in ["lrc", "txt"] {
        let sidecar = path.with_extension(format);
        match std::fs::read_to_string(&sidecar) {
            Ok(text) if !text.trim().is_empty() => {
                lyrics.insert("unknown".to_string(), format!("{format}\n{}", text.replace("\r\n", "\n")));
                break;
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %sidecar.display(), error = %e, "Failed to read lyrics file"),
        }
    }
    lyrics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prototype_derives_instances() {
        let prototype = LocalFileSource::prototype();
        assert!(prototype.supports_multiple());
        assert!(prototype.satisfies("file:/music"));
        assert!(!prototype.satisfies("youtube"));

        let instance = LocalFileSource::at("/music");
        assert!(!instance.supports_multiple());
        assert_eq!(instance.id(), "file:/music");
    }

    #[test]
    fn locators_cannot_escape_root() {
        let source = LocalFileSource::at("/music");
        assert!(source.resolve("../etc/passwd").is_err());
        assert!(source.resolve("/etc/passwd").is_err());
        assert!(source.resolve("").is_err());
        assert_eq!(
            source.resolve("a/b.mp3").unwrap(),
            PathBuf::from("/music/a/b.mp3")
        );
    }

    #[test]
    fn untagged_files_fall_back_to_stem() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Night Drive.mp3");
        std::fs::write(&file, b"not really audio").unwrap();

        let tags = read_tags(&file);
        assert_eq!(tags.title, "Night Drive");
        assert!(tags.artist.is_none());
    }

    #[test]
    fn sidecar_lyrics_prefer_lrc() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.flac");
        std::fs::write(&file, b"x").unwrap();
        std::fs::write(dir.path().join("song.txt"), "plain").unwrap();
        std::fs::write(dir.path().join("song.lrc"), "[00:01.00]timed").unwrap();

        let lyrics = read_lyrics(&file);
        assert_eq!(lyrics["unknown"], "lrc\n[00:01.00]timed");
    }
}
