//! Libra Core
//!
//! Storage-agnostic building blocks shared by every Libra crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: the [`Playable`] sum type over `Track`, `Album`, `Video`,
//!   `Artist`, `Playlist` and `User`, plus the capability overlays
//!   [`Linkable`], [`Sourced`] and [`LyricBearing`]
//! - **Source references**: [`LinkedSource`], the `"<source-id>::<locator>"` string
//! - **Catalog contract**: the [`CatalogStore`] trait implemented by the storage backends
//! - **Value parsers**: [`Version`], [`HumanDuration`] and [`ByteSize`]
//! - **Error Handling**: unified [`LibraError`] and [`Result`] types
//!
//! # Example
//!
//! ```rust
//! use libra_core::{LinkedSource, Playable, Track};
//!
//! let track = Track {
//!     title: "Intro".to_string(),
//!     metadata_source: LinkedSource::new("youtube", "https://music.youtube.com/watch?v=abc"),
//!     ..Track::default()
//! };
//! let playable = Playable::Track(track);
//!
//! assert!(playable.is_temporary());
//! assert_eq!(playable.metadata_source().map(|s| s.source_id()), Some("youtube"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod byte_size;
pub mod duration;
pub mod error;
pub mod ids;
pub mod storage;
pub mod types;

pub use byte_size::ByteSize;
pub use duration::{parse_human_duration, HumanDuration};
pub use error::{LibraError, Result};
pub use ids::{generate_id, DEFAULT_ID_LENGTH};
pub use storage::CatalogStore;

pub use types::{
    Album, Artist, DatabaseUser, Entity, LanguageMap, LinkedSource, Linkable, LyricBearing,
    MediaType, Metadata, Permissions, Playable, PlayableKind, Playlist, Sourced, SourceType, Track,
    User, Version, Video,
};
