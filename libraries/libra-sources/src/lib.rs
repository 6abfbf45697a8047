//! Libra Sources
//!
//! Adapters that turn external services and local resources into
//! [`Playable`](libra_core::Playable)s, plus the machinery that fans requests
//! out across them.
//!
//! # Architecture
//!
//! - **[`Source`]**: the adapter contract (search, content, lyrics, metadata)
//! - **[`SourceRegistry`]**: prototypes and the ordered set of enabled sources;
//!   the enable order is the priority order
//! - **[`Aggregator`]**: concurrent search with per-source deadlines,
//!   priority-ordered merging and failure isolation
//! - **Adapters**: [`YouTubeSource`] (companion script), [`LocalFileSource`],
//!   [`WebSource`] (remote Libra-compatible service) and [`SpotifySource`]
//!
//! # Example
//!
//! ```rust,no_run
//! use libra_sources::{Aggregator, SearchFilters, SourceRegistry, SourceSettings};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> libra_core::Result<()> {
//! let mut registry = SourceRegistry::with_builtin(SourceSettings::default()).await;
//! registry
//!     .enable_all(&["youtube".to_string(), "file:/srv/music".to_string()])
//!     .await;
//!
//! let aggregator = Aggregator::new(Arc::new(registry));
//! let outcome = aggregator
//!     .search("intro", 20, 1, &SearchFilters::default(), &CancellationToken::new())
//!     .await;
//! println!("{} results, {} failures", outcome.results.len(), outcome.failures.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod aggregator;
mod filters;
mod local_file;
mod registry;
mod settings;
mod source;
mod spotify;
mod web;
mod youtube;

pub use aggregator::{Aggregator, SearchOutcome, SourceFailures, DEFAULT_SOURCE_TIMEOUT};
pub use filters::SearchFilters;
pub use local_file::LocalFileSource;
pub use registry::SourceRegistry;
pub use settings::SourceSettings;
pub use source::{
    ensure_media_type, ensure_source_type, supports_media_type, Source, SourceDescriptor,
};
pub use spotify::SpotifySource;
pub use web::WebSource;
pub use youtube::{YouTubeSource, YOUTUBE_SCRIPT};
