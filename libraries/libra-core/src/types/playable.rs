/// The polymorphic playable model and its capability overlays
use super::{
    Album, Artist, LanguageMap, LinkedSource, Metadata, Permissions, PlayableKind, Playlist,
    Track, User, Video,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Accessors every playable variant provides
pub trait Entity {
    /// Discriminator
    fn kind(&self) -> PlayableKind;
    /// Id; empty for transient search results
    fn id(&self) -> &str;
    /// Owner id; empty for system items
    fn user_id(&self) -> &str;
    /// Title or name
    fn title(&self) -> &str;
    /// Description
    fn description(&self) -> &str;
    /// Release or creation date
    fn release_date(&self) -> Cow<'_, str>;
    /// Unix seconds when the entity entered the catalog
    fn addition_date(&self) -> i64;
    /// Ordered tags
    fn tags(&self) -> &[String];
    /// Free-form metadata
    fn additional_meta(&self) -> &Metadata;
    /// Permissions
    fn permissions(&self) -> &Permissions;

    /// Transient entities have no id yet
    fn is_temporary(&self) -> bool {
        self.id().is_empty()
    }
}

/// Entities that link to related catalog items
pub trait Linkable {
    /// Ids of linked items
    fn linked_item_ids(&self) -> &[String];
}

/// Entities produced by a source
pub trait Sourced {
    /// Listen count for audio kinds, watch count for videos
    fn view_count(&self) -> i64;
    /// Where the metadata came from
    fn metadata_source(&self) -> &LinkedSource;
}

/// Sourced entities that carry language-indexed text
pub trait LyricBearing: Sourced {
    /// Lyrics (tracks) or subtitles (videos)
    fn lyrics(&self) -> &LanguageMap;
    /// Per-language origin of the text
    fn lyric_sources(&self) -> &BTreeMap<String, LinkedSource>;
}

/// Any catalog entity addressable by id
///
/// Serialized as the inner entity with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Playable {
    /// Audio track
    Track(Track),
    /// Album
    Album(Album),
    /// Video
    Video(Video),
    /// Artist
    Artist(Artist),
    /// Playlist
    Playlist(Playlist),
    /// User profile
    User(User),
}

impl Playable {
    /// The variant as a common [`Entity`]
    pub fn entity(&self) -> &dyn Entity {
        match self {
            Playable::Track(t) => t,
            Playable::Album(a) => a,
            Playable::Video(v) => v,
            Playable::Artist(a) => a,
            Playable::Playlist(p) => p,
            Playable::User(u) => u,
        }
    }

    /// Discriminator
    pub fn kind(&self) -> PlayableKind {
        self.entity().kind()
    }

    /// Id; empty for transient search results
    pub fn id(&self) -> &str {
        self.entity().id()
    }

    /// Owner id
    pub fn user_id(&self) -> &str {
        self.entity().user_id()
    }

    /// Title or name
    pub fn title(&self) -> &str {
        self.entity().title()
    }

    /// Unix seconds when the entity entered the catalog
    pub fn addition_date(&self) -> i64 {
        self.entity().addition_date()
    }

    /// Free-form metadata
    pub fn additional_meta(&self) -> &Metadata {
        self.entity().additional_meta()
    }

    /// Whether the playable is a transient search result
    pub fn is_temporary(&self) -> bool {
        self.entity().is_temporary()
    }

    /// Linkable overlay, if the variant has one
    pub fn as_linkable(&self) -> Option<&dyn Linkable> {
        match self {
            Playable::Track(t) => Some(t),
            Playable::Album(a) => Some(a),
            Playable::Video(v) => Some(v),
            Playable::Artist(a) => Some(a),
            Playable::Playlist(_) | Playable::User(_) => None,
        }
    }

    /// Sourced overlay, if the variant has one
    pub fn as_sourced(&self) -> Option<&dyn Sourced> {
        match self {
            Playable::Track(t) => Some(t),
            Playable::Album(a) => Some(a),
            Playable::Video(v) => Some(v),
            Playable::Artist(a) => Some(a),
            Playable::Playlist(p) => Some(p),
            Playable::User(_) => None,
        }
    }

    /// Lyric-bearing overlay, if the variant has one
    pub fn as_lyric_bearing(&self) -> Option<&dyn LyricBearing> {
        match self {
            Playable::Track(t) => Some(t),
            Playable::Video(v) => Some(v),
            _ => None,
        }
    }

    /// View count of sourced variants
    pub fn view_count(&self) -> Option<i64> {
        self.as_sourced().map(Sourced::view_count)
    }

    /// Metadata source of sourced variants
    pub fn metadata_source(&self) -> Option<&LinkedSource> {
        self.as_sourced().map(Sourced::metadata_source)
    }

    /// Replace the metadata source; no-op for users
    pub fn set_metadata_source(&mut self, source: LinkedSource) {
        match self {
            Playable::Track(t) => t.metadata_source = source,
            Playable::Album(a) => a.metadata_source = source,
            Playable::Video(v) => v.metadata_source = source,
            Playable::Artist(a) => a.metadata_source = source,
            Playable::Playlist(p) => p.metadata_source = source,
            Playable::User(_) => {}
        }
    }

    /// Content source of tracks and videos
    pub fn content_source(&self) -> Option<&LinkedSource> {
        match self {
            Playable::Track(t) => Some(&t.content_source),
            Playable::Video(v) => Some(&v.content_source),
            _ => None,
        }
    }

    /// The credit used to tell two same-titled results apart: the primary
    /// artist, falling back to the album.
    ///
    /// Transient results usually have no catalog ids yet, so the
    /// `display_artists`/`display_album` metadata is consulted as well.
    pub fn primary_credit(&self) -> String {
        let meta = self.additional_meta();
        let display_artist = || {
            meta.get("display_artists")
                .and_then(|v| v.as_array())
                .and_then(|a| a.first())
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let display_album = || {
            meta.get("display_album")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let credit = match self {
            Playable::Track(t) => t
                .artist_ids
                .first()
                .cloned()
                .or_else(display_artist)
                .or_else(|| Some(t.primary_album_id.clone()).filter(|s| !s.is_empty()))
                .or_else(display_album),
            Playable::Album(a) => a.artist_ids.first().cloned().or_else(display_artist),
            Playable::Video(v) => v.artist_ids.first().cloned().or_else(display_artist),
            Playable::Artist(_) | Playable::Playlist(_) | Playable::User(_) => display_artist(),
        };
        credit.unwrap_or_default().to_lowercase()
    }
}

impl From<Track> for Playable {
    fn from(value: Track) -> Self {
        Playable::Track(value)
    }
}

impl From<Album> for Playable {
    fn from(value: Album) -> Self {
        Playable::Album(value)
    }
}

impl From<Video> for Playable {
    fn from(value: Video) -> Self {
        Playable::Video(value)
    }
}

impl From<Artist> for Playable {
    fn from(value: Artist) -> Self {
        Playable::Artist(value)
    }
}

impl From<Playlist> for Playable {
    fn from(value: Playlist) -> Self {
        Playable::Playlist(value)
    }
}

impl From<User> for Playable {
    fn from(value: User) -> Self {
        Playable::User(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::HumanDuration;
    use serde_json::json;

    #[test]
    fn serializes_with_type_discriminator() {
        let playable = Playable::Track(Track {
            id: "abc".to_string(),
            title: "Song".to_string(),
            ..Track::default()
        });

        let value = serde_json::to_value(&playable).unwrap();
        assert_eq!(value["type"], "track");
        assert_eq!(value["title"], "Song");

        let back: Playable = serde_json::from_value(value).unwrap();
        assert_eq!(back, playable);
    }

    #[test]
    fn durations_travel_as_whole_seconds() {
        let playable = Playable::Track(Track {
            id: "abc".to_string(),
            duration: HumanDuration::from_secs(128),
            ..Track::default()
        });

        let value = serde_json::to_value(&playable).unwrap();
        assert_eq!(value["duration"], json!(128));
        assert!(serde_json::to_string(&playable)
            .unwrap()
            .contains("\"duration\":128"));

        let back: Playable = serde_json::from_value(value).unwrap();
        assert_eq!(back, playable);

        let video: Playable =
            serde_json::from_value(json!({"type": "video", "duration": 95})).unwrap();
        match video {
            Playable::Video(video) => assert_eq!(video.duration.num_seconds(), 95),
            other => panic!("expected a video, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_default() {
        let playable: Playable =
            serde_json::from_value(json!({"type": "album", "title": "LP"})).unwrap();
        assert_eq!(playable.kind(), PlayableKind::Album);
        assert!(playable.is_temporary());
    }

    #[test]
    fn overlays_follow_variant() {
        let video = Playable::Video(Video {
            watch_count: 42,
            ..Video::default()
        });
        assert_eq!(video.view_count(), Some(42));
        assert!(video.as_lyric_bearing().is_some());
        assert!(video.as_linkable().is_some());

        let playlist = Playable::Playlist(Playlist::default());
        assert!(playlist.as_linkable().is_none());
        assert!(playlist.as_lyric_bearing().is_none());

        let user = Playable::User(User::default());
        assert!(user.as_sourced().is_none());
        assert_eq!(user.view_count(), None);
    }

    #[test]
    fn user_release_date_is_creation_timestamp() {
        let user = User {
            creation_date: 1_700_000_000,
            ..User::default()
        };
        assert_eq!(user.release_date(), "1700000000");
        assert_eq!(user.addition_date(), 1_700_000_000);
    }

    #[test]
    fn primary_credit_falls_back_to_display_metadata() {
        let mut meta = Metadata::new();
        meta.insert("display_artists".to_string(), json!(["Daft Punk"]));
        let track = Playable::Track(Track {
            additional_meta: meta,
            ..Track::default()
        });
        assert_eq!(track.primary_credit(), "daft punk");

        let bare = Playable::Track(Track::default());
        assert_eq!(bare.primary_credit(), "");
    }
}
