//! Catalog storage contract
//!
//! Implemented by `libra-storage` for SQLite and PostgreSQL. Every single-row
//! lookup fails with [`LibraError::NotFound`](crate::LibraError::NotFound)
//! rather than returning an empty value, and uniqueness violations surface as
//! [`LibraError::Duplicate`](crate::LibraError::Duplicate).

use crate::error::Result;
use crate::types::{Album, Artist, DatabaseUser, Playable, Playlist, Track, User, Video};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistent CRUD over the catalog, user accounts and the token blacklist
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// `"sqlite"` or `"postgresql"`
    fn engine_name(&self) -> &'static str;

    /// Close the underlying pool
    async fn close(&self) -> Result<()>;

    /// Apply `steps` pending migrations; `-1` applies all
    async fn migrate_up(&self, steps: i64) -> Result<()>;

    /// Revert `steps` applied migrations; `-1` reverts all
    async fn migrate_down(&self, steps: i64) -> Result<()>;

    // ========================================================================
    // Tracks
    // ========================================================================

    async fn get_all_tracks(&self) -> Result<Vec<Track>>;
    async fn get_user_tracks(&self, user_id: &str) -> Result<Vec<Track>>;
    async fn get_track(&self, id: &str) -> Result<Track>;
    async fn add_track(&self, track: &Track) -> Result<()>;
    async fn update_track(&self, track: &Track) -> Result<()>;
    async fn delete_track(&self, id: &str) -> Result<()>;

    // ========================================================================
    // Albums
    // ========================================================================

    async fn get_all_albums(&self) -> Result<Vec<Album>>;
    async fn get_user_albums(&self, user_id: &str) -> Result<Vec<Album>>;
    async fn get_album(&self, id: &str) -> Result<Album>;
    async fn add_album(&self, album: &Album) -> Result<()>;
    async fn update_album(&self, album: &Album) -> Result<()>;
    async fn delete_album(&self, id: &str) -> Result<()>;

    // ========================================================================
    // Videos
    // ========================================================================

    async fn get_all_videos(&self) -> Result<Vec<Video>>;
    async fn get_user_videos(&self, user_id: &str) -> Result<Vec<Video>>;
    async fn get_video(&self, id: &str) -> Result<Video>;
    async fn add_video(&self, video: &Video) -> Result<()>;
    async fn update_video(&self, video: &Video) -> Result<()>;
    async fn delete_video(&self, id: &str) -> Result<()>;

    // ========================================================================
    // Artists
    // ========================================================================

    async fn get_all_artists(&self) -> Result<Vec<Artist>>;
    async fn get_user_artists(&self, user_id: &str) -> Result<Vec<Artist>>;
    async fn get_artist(&self, id: &str) -> Result<Artist>;
    async fn add_artist(&self, artist: &Artist) -> Result<()>;
    async fn update_artist(&self, artist: &Artist) -> Result<()>;
    async fn delete_artist(&self, id: &str) -> Result<()>;

    // ========================================================================
    // Playlists
    // ========================================================================

    async fn get_all_playlists(&self) -> Result<Vec<Playlist>>;
    async fn get_user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>>;
    async fn get_playlist(&self, id: &str) -> Result<Playlist>;
    async fn add_playlist(&self, playlist: &Playlist) -> Result<()>;
    async fn update_playlist(&self, playlist: &Playlist) -> Result<()>;
    async fn delete_playlist(&self, id: &str) -> Result<()>;

    // ========================================================================
    // Users
    // ========================================================================

    async fn get_users(&self) -> Result<Vec<User>>;
    async fn get_user(&self, id: &str) -> Result<User>;

    /// Resolve by username or email, case-insensitively
    async fn get_user_by_username(&self, username_or_email: &str) -> Result<DatabaseUser>;

    async fn create_user(&self, user: &DatabaseUser) -> Result<()>;
    async fn update_user(&self, user: &DatabaseUser) -> Result<()>;
    async fn delete_user(&self, id: &str) -> Result<()>;
    async fn username_exists(&self, username: &str) -> Result<bool>;

    /// Always false for an empty email
    async fn email_exists(&self, email: &str) -> Result<bool>;

    // ========================================================================
    // Federated identity links
    // ========================================================================

    /// The user linked to an external account
    async fn get_provider_user(&self, provider: &str, provider_user_id: &str) -> Result<User>;

    /// Whether `user_id` has an account at `provider` linked
    async fn is_provider_linked(&self, provider: &str, user_id: &str) -> Result<bool>;

    async fn link_provider_account(
        &self,
        provider: &str,
        user_id: &str,
        provider_user_id: &str,
    ) -> Result<()>;
    async fn disconnect_provider_account(&self, provider: &str, user_id: &str) -> Result<()>;

    // ========================================================================
    // Token blacklist
    // ========================================================================

    /// Idempotent; re-blacklisting keeps a single entry
    async fn blacklist_token(&self, token: &str, expiration: DateTime<Utc>) -> Result<()>;
    async fn is_token_blacklisted(&self, token: &str) -> Result<bool>;

    /// Remove entries whose expiration has passed
    async fn clean_expired_tokens(&self) -> Result<()>;

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Every catalog entity in the order Track, Album, Video, Artist, Playlist
    async fn get_all_playables(&self) -> Result<Vec<Playable>> {
        let mut playables = Vec::new();
        playables.extend(self.get_all_tracks().await?.into_iter().map(Playable::from));
        playables.extend(self.get_all_albums().await?.into_iter().map(Playable::from));
        playables.extend(self.get_all_videos().await?.into_iter().map(Playable::from));
        playables.extend(self.get_all_artists().await?.into_iter().map(Playable::from));
        playables.extend(self.get_all_playlists().await?.into_iter().map(Playable::from));
        Ok(playables)
    }

    /// Like [`get_all_playables`](Self::get_all_playables), scoped to one owner
    async fn get_playables(&self, user_id: &str) -> Result<Vec<Playable>> {
        let mut playables = Vec::new();
        playables.extend(self.get_user_tracks(user_id).await?.into_iter().map(Playable::from));
        playables.extend(self.get_user_albums(user_id).await?.into_iter().map(Playable::from));
        playables.extend(self.get_user_videos(user_id).await?.into_iter().map(Playable::from));
        playables.extend(self.get_user_artists(user_id).await?.into_iter().map(Playable::from));
        playables.extend(self.get_user_playlists(user_id).await?.into_iter().map(Playable::from));
        Ok(playables)
    }
}
