//! YouTube / YouTube Music through the companion script
//!
//! The script ships inside the binary and is extracted to
//! [`SourceSettings::youtube_script`] on first use. Each call runs
//! `<python> <script> <verb> key=value...` and parses stdout as JSON
//! (`content` returns raw bytes). The child is killed if the calling future
//! is dropped, so deadlines and cancellation reach the subprocess.

use async_trait::async_trait;
use chrono::DateTime;
use libra_core::{
    Album, Artist, HumanDuration, LanguageMap, LibraError, LinkedSource, MediaType, Metadata,
    Playable, PlayableKind, Playlist, Result, SourceType, Track, Video,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use crate::filters::SearchFilters;
use crate::settings::SourceSettings;
use crate::source::{ensure_media_type, Source};

/// The companion script, as embedded at build time
pub const YOUTUBE_SCRIPT: &str = include_str!("../assets/youtube.py");

const ID: &str = "youtube";
const SOURCE_TYPES: [SourceType; 3] = [SourceType::Content, SourceType::Metadata, SourceType::Lyrics];
const MEDIA_TYPES: [MediaType; 3] = [MediaType::Music, MediaType::Video, MediaType::Playlist];

const MUSIC_WATCH_URL: &str = "https://music.youtube.com/watch?v=";
const VIDEO_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Clone)]
pub struct YouTubeSource {
    settings: SourceSettings,
}

impl YouTubeSource {
    /// Adapter without touching the filesystem
    pub fn new(settings: SourceSettings) -> Self {
        Self { settings }
    }

    /// Adapter with its script extracted, unless a script is already there
    pub async fn install(settings: SourceSettings) -> Result<Self> {
        let path = &settings.youtube_script;
        if tokio::fs::try_exists(path).await? {
            debug!(path = %path.display(), "YouTube script already present");
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, YOUTUBE_SCRIPT).await?;
            info!(path = %path.display(), "Extracted YouTube script");
        }
        Ok(Self::new(settings))
    }

    async fn run(&self, verb: &str, args: &[(&str, String)]) -> Result<Vec<u8>> {
        let mut parts = self.settings.python_command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| LibraError::invalid_input("python command is empty"))?;

        let mut command = Command::new(program);
        command
            .args(parts)
            .arg(&self.settings.youtube_script)
            .arg(verb)
            .args(args.iter().map(|(key, value)| format!("{key}={value}")))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(verb, "Running YouTube script");
        let output = command
            .output()
            .await
            .map_err(|e| LibraError::source(ID, format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LibraError::source(
                ID,
                format!("{verb} exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned>(&self, verb: &str, args: &[(&str, String)]) -> Result<T> {
        let stdout = self.run(verb, args).await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| LibraError::source(ID, format!("unreadable {verb} output: {e}")))
    }

    fn linked(locator: String) -> LinkedSource {
        LinkedSource::new(ID, &locator)
    }

    fn parse_search_item(&self, item: SearchItem) -> Option<Playable> {
        let display_artists: Vec<String> = item
            .artists
            .iter()
            .filter_map(|a| a.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        let cover = last_thumbnail(&item.thumbnails);
        let year = item.year.as_ref().map(value_to_string).unwrap_or_default();
        let duration = HumanDuration::from_secs(item.duration_seconds.unwrap_or_default());
        let album_name = item
            .album
            .as_ref()
            .and_then(|a| a.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match item.result_type.as_str() {
            "song" => {
                let video_id = item.video_id?;
                Some(Playable::Track(Track {
                    title: item.title,
                    duration,
                    release_date: year,
                    additional_meta: metadata([
                        ("display_artists", json!(display_artists)),
                        ("display_album", json!(album_name)),
                        ("display_cover_art", json!(cover)),
                        ("yt_id", json!(video_id)),
                        ("yt_artists", json!(item.artists)),
                        ("yt_album", item.album.unwrap_or(Value::Null)),
                    ]),
                    metadata_source: Self::linked(format!("{MUSIC_WATCH_URL}{video_id}")),
                    ..Track::default()
                }))
            }
            "album" => {
                let browse_id = item.browse_id?;
                Some(Playable::Album(Album {
                    title: item.title,
                    release_date: year,
                    additional_meta: metadata([
                        ("display_artists", json!(display_artists)),
                        ("display_cover_art", json!(cover)),
                        ("yt_id", json!(browse_id)),
                        ("yt_artists", json!(item.artists)),
                    ]),
                    metadata_source: Self::linked(format!(
                        "https://music.youtube.com/browse/{browse_id}"
                    )),
                    ..Album::default()
                }))
            }
            "video" if !self.settings.include_video_results => None,
            "video" if self.settings.video_audio_only => {
                let video_id = item.video_id?;
                Some(Playable::Track(Track {
                    title: item.title,
                    duration,
                    release_date: year,
                    additional_meta: metadata([
                        ("display_artists", json!(display_artists)),
                        ("display_album", json!(album_name)),
                        ("display_cover_art", json!(cover)),
                        ("is_video", json!(true)),
                        ("yt_id", json!(video_id)),
                        ("yt_artists", json!(item.artists)),
                        ("yt_album", json!(album_name)),
                    ]),
                    metadata_source: Self::linked(format!("{MUSIC_WATCH_URL}{video_id}")),
                    ..Track::default()
                }))
            }
            "video" => {
                let video_id = item.video_id?;
                Some(Playable::Video(Video {
                    title: item.title,
                    duration,
                    release_date: year,
                    additional_meta: metadata([
                        ("display_artists", json!(display_artists)),
                        ("display_thumbnail", json!(cover)),
                        ("yt_id", json!(video_id)),
                        ("yt_artists", json!(item.artists)),
                    ]),
                    metadata_source: Self::linked(format!("{VIDEO_WATCH_URL}{video_id}")),
                    ..Video::default()
                }))
            }
            "artist" => {
                let browse_id = item.browse_id?;
                let name = if item.artist.is_empty() { item.title } else { item.artist };
                Some(Playable::Artist(Artist {
                    name,
                    additional_meta: metadata([
                        ("display_cover_art", json!(cover)),
                        ("yt_id", json!(browse_id)),
                    ]),
                    metadata_source: Self::linked(format!(
                        "https://music.youtube.com/channel/{browse_id}"
                    )),
                    ..Artist::default()
                }))
            }
            "playlist" => {
                let browse_id = item.browse_id?;
                Some(Playable::Playlist(Playlist {
                    title: item.title,
                    additional_meta: metadata([
                        ("display_artists", json!(display_artists)),
                        ("display_cover_art", json!(cover)),
                        ("yt_id", json!(browse_id)),
                        ("yt_artists", json!(item.artists)),
                    ]),
                    metadata_source: Self::linked(format!(
                        "https://music.youtube.com/playlist?list={browse_id}"
                    )),
                    ..Playlist::default()
                }))
            }
            other => {
                debug!(result_type = other, "Skipping unsupported YouTube result");
                None
            }
        }
    }

    fn inherited_count(&self, value: Option<&Value>) -> Option<i64> {
        if self.settings.inherit_listen_counts {
            value.and_then(parse_count)
        } else {
            None
        }
    }

    fn complete_track(&self, mut track: Track, output: &Value) -> Result<Track> {
        if let Some(number) = output
            .pointer("/track/lyricsId")
            .and_then(Value::as_str)
            .and_then(|id| id.rsplit('-').next())
            .and_then(|n| n.parse().ok())
        {
            track.track_number = number;
        }

        let details = output.pointer("/video/microformat/microformatDataRenderer");
        if let Some(description) = details.and_then(|d| d.get("description")).and_then(Value::as_str) {
            track.description = description.to_string();
        }
        if let Some(date) = details.and_then(|d| d.get("publishDate")).and_then(Value::as_str) {
            track.release_date = format_publish_date(date)?;
        }
        if let Some(count) = self.inherited_count(details.and_then(|d| d.get("viewCount"))) {
            track.listen_count = count;
        }
        if let Some(cover) = output.pointer("/track/thumbnail").and_then(last_url) {
            track.additional_meta.insert("display_cover_art".into(), json!(cover));
        }
        Ok(track)
    }

    fn complete_video(&self, mut video: Video, output: &Value) -> Result<Video> {
        let details = output.pointer("/video/microformat/microformatDataRenderer");
        if let Some(description) = details.and_then(|d| d.get("description")).and_then(Value::as_str) {
            video.description = description.to_string();
        }
        if let Some(date) = details.and_then(|d| d.get("publishDate")).and_then(Value::as_str) {
            video.release_date = format_publish_date(date)?;
        }
        if let Some(count) = self.inherited_count(details.and_then(|d| d.get("viewCount"))) {
            video.watch_count = count;
        }
        if let Some(thumbnail) = output.pointer("/track/thumbnail").and_then(last_url) {
            video.additional_meta.insert("display_thumbnail".into(), json!(thumbnail));
        }
        Ok(video)
    }

    fn complete_album(mut album: Album, output: &Value) -> Album {
        if let Some(description) = output.get("description").and_then(Value::as_str) {
            album.description = description.to_string();
        }
        let meta = &mut album.additional_meta;
        if let Some(cover) = output.get("thumbnails").and_then(last_url) {
            meta.insert("display_cover_art".into(), json!(cover));
        }
        if let Some(tracks) = output.get("tracks") {
            meta.insert("yt_tracks".into(), tracks.clone());
        }
        if let Some(count) = output.get("trackCount").and_then(parse_count) {
            meta.insert("display_track_count".into(), json!(count));
        }
        album
    }

    fn complete_artist(&self, mut artist: Artist, output: &Value) -> Artist {
        if let Some(description) = output.get("description").and_then(Value::as_str) {
            artist.description = description.to_string();
        }
        if !self.settings.artist_listen_counts_by_track {
            if let Some(count) = self.inherited_count(output.get("views")) {
                artist.listen_count = count;
            }
        }

        let meta = &mut artist.additional_meta;
        if let Some(cover) = output.get("thumbnails").and_then(last_url) {
            meta.insert("display_cover_art".into(), json!(cover));
        }
        for (section, key, count_key) in [
            ("songs", "yt_tracks", "display_track_count"),
            ("albums", "yt_albums", "display_album_count"),
            ("singles", "yt_singles", "display_single_count"),
            ("videos", "yt_videos", "display_video_count"),
        ] {
            let results = output
                .get(section)
                .and_then(|s| s.get("results"))
                .cloned()
                .unwrap_or_else(|| json!([]));
            let count = results.as_array().map_or(0, Vec::len);
            meta.insert(key.into(), results);
            meta.insert(count_key.into(), json!(count));
        }
        artist
    }

    fn complete_playlist(&self, mut playlist: Playlist, output: &Value) -> Playlist {
        if let Some(description) = output.get("description").and_then(Value::as_str) {
            playlist.description = description.to_string();
        }
        if let Some(year) = output.get("year").filter(|y| !y.is_null()) {
            playlist.creation_date = value_to_string(year);
        }
        if let Some(count) = self.inherited_count(output.get("views")) {
            playlist.listen_count = count;
        }

        let meta = &mut playlist.additional_meta;
        if let Some(cover) = output.get("thumbnails").and_then(last_url) {
            meta.insert("display_cover_art".into(), json!(cover));
        }
        if let Some(tracks) = output.get("tracks") {
            meta.insert("yt_tracks".into(), tracks.clone());
        }
        if let Some(count) = output.get("trackCount").and_then(parse_count) {
            meta.insert("display_track_count".into(), json!(count));
        }
        playlist
    }
}

#[async_trait]
impl Source for YouTubeSource {
    fn satisfies(&self, id: &str) -> bool {
        matches!(id.to_ascii_lowercase().as_str(), "youtube" | "yt")
    }

    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "YouTube"
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
        _page: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<Playable>> {
        let filters_json = serde_json::to_string(&filters.normalized())?;
        let limit = if limit == 0 { "all".to_string() } else { limit.to_string() };
        let items: Vec<SearchItem> = self
            .run_json(
                "search",
                &[
                    ("query", query.to_string()),
                    ("limit", limit),
                    ("filters", filters_json),
                ],
            )
            .await?;

        Ok(items
            .into_iter()
            .filter_map(|item| self.parse_search_item(item))
            .collect())
    }

    async fn content(&self, playable: &Playable) -> Result<Vec<u8>> {
        ensure_media_type(self, playable.kind())?;
        let content_type = match playable.kind() {
            PlayableKind::Track => "audio",
            PlayableKind::Video => "video",
            other => return Err(LibraError::UnsupportedMediaType(other.to_string())),
        };
        let yt_id = yt_id(playable)?;
        self.run("content", &[("type", content_type.to_string()), ("id", yt_id)])
            .await
    }

    async fn lyrics(&self, playable: &Playable) -> Result<LanguageMap> {
        ensure_media_type(self, playable.kind())?;
        let is_video = playable.kind() == PlayableKind::Video
            || playable
                .additional_meta()
                .get("is_video")
                .and_then(Value::as_bool)
                .unwrap_or(false);
        let verb = if is_video { "subtitles" } else { "lyrics" };
        self.run_json(verb, &[("id", yt_id(playable)?)]).await
    }

    async fn complete_metadata(&self, playable: Playable) -> Result<Playable> {
        ensure_media_type(self, playable.kind())?;
        let output: Value = self
            .run_json(playable.kind().as_str(), &[("id", yt_id(&playable)?)])
            .await?;

        Ok(match playable {
            Playable::Track(track) => self.complete_track(track, &output)?.into(),
            Playable::Video(video) => self.complete_video(video, &output)?.into(),
            Playable::Album(album) => Self::complete_album(album, &output).into(),
            Playable::Artist(artist) => self.complete_artist(artist, &output).into(),
            Playable::Playlist(playlist) => self.complete_playlist(playlist, &output).into(),
            user @ Playable::User(_) => {
                warn!("User playables have no YouTube metadata");
                user
            }
        })
    }
}

/// One entry of the script's search output
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    result_type: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    artists: Vec<Value>,
    #[serde(default)]
    album: Option<Value>,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
    video_id: Option<String>,
    browse_id: Option<String>,
    #[serde(default, rename = "duration_seconds")]
    duration_seconds: Option<i64>,
    #[serde(default)]
    year: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

fn metadata<const N: usize>(entries: [(&str, Value); N]) -> Metadata {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// The largest thumbnail is listed last
fn last_thumbnail(thumbnails: &[Thumbnail]) -> String {
    thumbnails.last().map(|t| t.url.clone()).unwrap_or_default()
}

fn last_url(thumbnails: &Value) -> Option<String> {
    thumbnails
        .as_array()?
        .last()?
        .get("url")?
        .as_str()
        .map(str::to_string)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Counts arrive as numbers or as text like `"1,234 views"`
fn parse_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s
            .replace(',', "")
            .trim_end_matches(" views")
            .trim_end_matches(" view")
            .trim()
            .parse()
            .ok(),
        _ => None,
    }
}

fn format_publish_date(date: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(date)
        .map_err(|e| LibraError::source(ID, format!("invalid publish date {date:?}: {e}")))?;
    Ok(parsed.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// The YouTube id of a playable: `additional_meta.yt_id`, else recovered from
/// its YouTube locator
fn yt_id(playable: &Playable) -> Result<String> {
    if let Some(id) = playable
        .additional_meta()
        .get("yt_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
    {
        return Ok(id.to_string());
    }

    playable
        .metadata_source()
        .filter(|s| s.source_id() == ID)
        .and_then(|s| id_from_locator(s.locator()))
        .ok_or_else(|| {
            LibraError::invalid_input(format!("{} has no YouTube id", playable.kind()))
        })
}

fn id_from_locator(locator: &str) -> Option<String> {
    let url = Url::parse(locator).ok()?;
    if let Some((_, value)) = url.query_pairs().find(|(key, _)| key == "v" || key == "list") {
        return Some(value.into_owned());
    }
    url.path_segments()?
        .last()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(video_audio_only: bool, include_video_results: bool) -> YouTubeSource {
        YouTubeSource::new(SourceSettings {
            video_audio_only,
            include_video_results,
            inherit_listen_counts: true,
            ..SourceSettings::default()
        })
    }

    fn item(value: Value) -> SearchItem {
        serde_json::from_value(value).unwrap()
    }

    fn song() -> Value {
        json!({
            "resultType": "song",
            "title": "Intro",
            "artists": [{"name": "The xx", "id": "UC1"}],
            "album": {"name": "xx", "id": "MPRE1"},
            "thumbnails": [{"url": "small.jpg"}, {"url": "large.jpg"}],
            "videoId": "abc123",
            "duration_seconds": 128,
            "year": 2009
        })
    }

    #[test]
    fn song_becomes_track() {
        let playable = source(true, true).parse_search_item(item(song())).unwrap();
        let Playable::Track(track) = playable else {
            panic!("expected track");
        };
        assert_eq!(track.title, "Intro");
        assert_eq!(track.duration.num_seconds(), 128);
        assert_eq!(track.release_date, "2009");
        assert_eq!(track.additional_meta["display_artists"], json!(["The xx"]));
        assert_eq!(track.additional_meta["display_cover_art"], json!("large.jpg"));
        assert_eq!(track.additional_meta["yt_id"], json!("abc123"));
        assert_eq!(
            track.metadata_source.as_str(),
            "youtube::https://music.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn videos_follow_settings() {
        let video = json!({
            "resultType": "video",
            "title": "Live",
            "artists": [],
            "thumbnails": [],
            "videoId": "v1",
            "duration_seconds": 60
        });

        let as_track = source(true, true).parse_search_item(item(video.clone())).unwrap();
        assert_eq!(as_track.kind(), PlayableKind::Track);
        assert_eq!(as_track.additional_meta()["is_video"], json!(true));

        let as_video = source(false, true).parse_search_item(item(video.clone())).unwrap();
        assert_eq!(as_video.kind(), PlayableKind::Video);
        assert_eq!(
            as_video.metadata_source().unwrap().locator(),
            "https://www.youtube.com/watch?v=v1"
        );

        assert!(source(false, false).parse_search_item(item(video)).is_none());
    }

    #[test]
    fn unknown_result_types_are_skipped() {
        let episode = json!({"resultType": "episode", "title": "Pod"});
        assert!(source(true, true).parse_search_item(item(episode)).is_none());
    }

    #[test]
    fn yt_id_falls_back_to_locator() {
        let track = Playable::Track(Track {
            metadata_source: LinkedSource::new(ID, "https://music.youtube.com/watch?v=xyz"),
            ..Track::default()
        });
        assert_eq!(yt_id(&track).unwrap(), "xyz");

        let channel = Playable::Artist(Artist {
            metadata_source: LinkedSource::new(ID, "https://music.youtube.com/channel/UC9"),
            ..Artist::default()
        });
        assert_eq!(yt_id(&channel).unwrap(), "UC9");

        assert!(yt_id(&Playable::Track(Track::default())).is_err());
    }

    #[test]
    fn counts_parse_from_text() {
        assert_eq!(parse_count(&json!("1,234 views")), Some(1234));
        assert_eq!(parse_count(&json!("1 view")), Some(1));
        assert_eq!(parse_count(&json!(42)), Some(42));
        assert_eq!(parse_count(&json!(null)), None);
    }

    #[test]
    fn track_completion_reads_nested_fields() {
        let output = json!({
            "track": {"lyricsId": "MPLYt_abc-7", "thumbnail": [{"url": "t.jpg"}]},
            "video": {"microformat": {"microformatDataRenderer": {
                "description": "An intro",
                "publishDate": "2009-08-14T00:00:00-07:00",
                "viewCount": "5000"
            }}}
        });
        let track = source(true, true)
            .complete_track(Track::default(), &output)
            .unwrap();

        assert_eq!(track.track_number, 7);
        assert_eq!(track.description, "An intro");
        assert_eq!(track.release_date, "2009-08-14 00:00:00");
        assert_eq!(track.listen_count, 5000);
        assert_eq!(track.additional_meta["display_cover_art"], json!("t.jpg"));
    }

    #[test]
    fn artist_completion_counts_sections() {
        let output = json!({
            "description": "Band",
            "views": "10 views",
            "thumbnails": [{"url": "a.jpg"}],
            "songs": {"results": [{}, {}]},
            "albums": {"results": [{}]}
        });
        let artist = source(true, true).complete_artist(Artist::default(), &output);
        assert_eq!(artist.description, "Band");
        // counts come from tracks by default
        assert_eq!(artist.listen_count, 0);
        assert_eq!(artist.additional_meta["display_track_count"], json!(2));
        assert_eq!(artist.additional_meta["display_album_count"], json!(1));
        assert_eq!(artist.additional_meta["display_video_count"], json!(0));
    }
}
