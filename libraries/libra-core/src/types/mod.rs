/// Domain types for Libra
mod album;
mod artist;
mod kind;
mod linked_source;
mod playable;
mod playlist;
mod track;
mod user;
mod version;
mod video;

use std::collections::BTreeMap;

pub use album::Album;
pub use artist::Artist;
pub use kind::{MediaType, PlayableKind, SourceType};
pub use linked_source::LinkedSource;
pub use playable::{Entity, Linkable, LyricBearing, Playable, Sourced};
pub use playlist::Playlist;
pub use track::Track;
pub use user::{DatabaseUser, User};
pub use version::Version;
pub use video::Video;

/// Free-form metadata attached to an entity
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Language code to text (lyrics, subtitles)
pub type LanguageMap = BTreeMap<String, String>;

/// Permission name to value
pub type Permissions = BTreeMap<String, String>;
