/// Discriminators shared by playables and sources
use crate::error::LibraError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Kind of a [`Playable`](super::Playable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayableKind {
    /// Audio track
    Track,
    /// Album
    Album,
    /// Video
    Video,
    /// Artist
    Artist,
    /// Playlist
    Playlist,
    /// User profile
    User,
}

impl PlayableKind {
    /// Catalog kinds in aggregate order; `User` is excluded
    pub const CATALOG: [PlayableKind; 5] = [
        PlayableKind::Track,
        PlayableKind::Album,
        PlayableKind::Video,
        PlayableKind::Artist,
        PlayableKind::Playlist,
    ];

    /// Singular name, e.g. `track`
    pub fn as_str(self) -> &'static str {
        match self {
            PlayableKind::Track => "track",
            PlayableKind::Album => "album",
            PlayableKind::Video => "video",
            PlayableKind::Artist => "artist",
            PlayableKind::Playlist => "playlist",
            PlayableKind::User => "user",
        }
    }

    /// Plural name, used in search filters and directory names
    pub fn plural(self) -> &'static str {
        match self {
            PlayableKind::Track => "tracks",
            PlayableKind::Album => "albums",
            PlayableKind::Video => "videos",
            PlayableKind::Artist => "artists",
            PlayableKind::Playlist => "playlists",
            PlayableKind::User => "users",
        }
    }

    /// Media type a source must support to handle this kind
    pub fn media_type(self) -> Option<MediaType> {
        match self {
            PlayableKind::Track | PlayableKind::Album | PlayableKind::Artist => {
                Some(MediaType::Music)
            }
            PlayableKind::Video => Some(MediaType::Video),
            PlayableKind::Playlist => Some(MediaType::Playlist),
            PlayableKind::User => None,
        }
    }
}

impl fmt::Display for PlayableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayableKind {
    type Err = LibraError;

    /// Accepts singular or plural names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "track" | "tracks" | "song" | "songs" => Ok(PlayableKind::Track),
            "album" | "albums" => Ok(PlayableKind::Album),
            "video" | "videos" => Ok(PlayableKind::Video),
            "artist" | "artists" => Ok(PlayableKind::Artist),
            "playlist" | "playlists" => Ok(PlayableKind::Playlist),
            "user" | "users" => Ok(PlayableKind::User),
            other => Err(LibraError::UnsupportedMediaType(other.to_string())),
        }
    }
}

/// Media family a source can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Tracks, albums and artists
    Music,
    /// Videos
    Video,
    /// Playlists
    Playlist,
}

impl MediaType {
    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Music => "music",
            MediaType::Video => "video",
            MediaType::Playlist => "playlist",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = LibraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "music" => Ok(MediaType::Music),
            "video" => Ok(MediaType::Video),
            "playlist" => Ok(MediaType::Playlist),
            other => Err(LibraError::UnsupportedMediaType(other.to_string())),
        }
    }
}

/// Capability a source offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Raw media bytes
    Content,
    /// Search and metadata completion
    Metadata,
    /// Lyrics and subtitles
    Lyrics,
}

impl SourceType {
    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Content => "content",
            SourceType::Metadata => "metadata",
            SourceType::Lyrics => "lyrics",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = LibraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "content" => Ok(SourceType::Content),
            "metadata" => Ok(SourceType::Metadata),
            "lyrics" => Ok(SourceType::Lyrics),
            other => Err(LibraError::UnsupportedSourceType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_media_types() {
        assert_eq!(PlayableKind::Track.media_type(), Some(MediaType::Music));
        assert_eq!(PlayableKind::Album.media_type(), Some(MediaType::Music));
        assert_eq!(PlayableKind::Artist.media_type(), Some(MediaType::Music));
        assert_eq!(PlayableKind::Video.media_type(), Some(MediaType::Video));
        assert_eq!(PlayableKind::Playlist.media_type(), Some(MediaType::Playlist));
        assert_eq!(PlayableKind::User.media_type(), None);
    }

    #[test]
    fn kinds_parse_from_singular_and_plural() {
        assert_eq!("tracks".parse::<PlayableKind>().unwrap(), PlayableKind::Track);
        assert_eq!("Video".parse::<PlayableKind>().unwrap(), PlayableKind::Video);
        assert!("podcast".parse::<PlayableKind>().is_err());
    }
}
