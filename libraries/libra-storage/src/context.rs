use crate::{
    albums, artists, migrations, playlists, tokens, tracks, users, videos, DatabaseConfig,
    DbPool,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libra_core::{
    error::Result, Album, Artist, CatalogStore, DatabaseUser, Playlist, Track, User, Video,
};
use tracing::info;

/// SQL-backed catalog for either supported engine
#[derive(Debug, Clone)]
pub struct SqlCatalog {
    pool: DbPool,
}

impl SqlCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connect using `config`; migrations are not applied
    pub async fn connect(config: &DatabaseConfig) -> crate::Result<Self> {
        Ok(Self::new(DbPool::connect(config).await?))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for SqlCatalog {
    fn engine_name(&self) -> &'static str {
        self.pool.engine().as_str()
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    async fn migrate_up(&self, steps: i64) -> Result<()> {
        let applied = migrations::migrate_up(&self.pool, steps).await?;
        info!(engine = self.engine_name(), applied, "database migrated up");
        Ok(())
    }

    async fn migrate_down(&self, steps: i64) -> Result<()> {
        let reverted = migrations::migrate_down(&self.pool, steps).await?;
        info!(engine = self.engine_name(), reverted, "database migrated down");
        Ok(())
    }

    // Tracks
    async fn get_all_tracks(&self) -> Result<Vec<Track>> {
        Ok(tracks::get_all(&self.pool).await?)
    }

    async fn get_user_tracks(&self, user_id: &str) -> Result<Vec<Track>> {
        Ok(tracks::get_by_user(&self.pool, user_id).await?)
    }

    async fn get_track(&self, id: &str) -> Result<Track> {
        Ok(tracks::get_by_id(&self.pool, id).await?)
    }

    async fn add_track(&self, track: &Track) -> Result<()> {
        Ok(tracks::insert(&self.pool, track).await?)
    }

    async fn update_track(&self, track: &Track) -> Result<()> {
        Ok(tracks::update(&self.pool, track).await?)
    }

    async fn delete_track(&self, id: &str) -> Result<()> {
        Ok(tracks::delete(&self.pool, id).await?)
    }

    // Albums
    async fn get_all_albums(&self) -> Result<Vec<Album>> {
        Ok(albums::get_all(&self.pool).await?)
    }

    async fn get_user_albums(&self, user_id: &str) -> Result<Vec<Album>> {
        Ok(albums::get_by_user(&self.pool, user_id).await?)
    }

    async fn get_album(&self, id: &str) -> Result<Album> {
        Ok(albums::get_by_id(&self.pool, id).await?)
    }

    async fn add_album(&self, album: &Album) -> Result<()> {
        Ok(albums::insert(&self.pool, album).await?)
    }

    async fn update_album(&self, album: &Album) -> Result<()> {
        Ok(albums::update(&self.pool, album).await?)
    }

    async fn delete_album(&self, id: &str) -> Result<()> {
        Ok(albums::delete(&self.pool, id).await?)
    }

    // Videos
    async fn get_all_videos(&self) -> Result<Vec<Video>> {
        Ok(videos::get_all(&self.pool).await?)
    }

    async fn get_user_videos(&self, user_id: &str) -> Result<Vec<Video>> {
        Ok(videos::get_by_user(&self.pool, user_id).await?)
    }

    async fn get_video(&self, id: &str) -> Result<Video> {
        Ok(videos::get_by_id(&self.pool, id).await?)
    }

    async fn add_video(&self, video: &Video) -> Result<()> {
        Ok(videos::insert(&self.pool, video).await?)
    }

    async fn update_video(&self, video: &Video) -> Result<()> {
        Ok(videos::update(&self.pool, video).await?)
    }

    async fn delete_video(&self, id: &str) -> Result<()> {
        Ok(videos::delete(&self.pool, id).await?)
    }

    // Artists
    async fn get_all_artists(&self) -> Result<Vec<Artist>> {
        Ok(artists::get_all(&self.pool).await?)
    }

    async fn get_user_artists(&self, user_id: &str) -> Result<Vec<Artist>> {
        Ok(artists::get_by_user(&self.pool, user_id).await?)
    }

    async fn get_artist(&self, id: &str) -> Result<Artist> {
        Ok(artists::get_by_id(&self.pool, id).await?)
    }

    async fn add_artist(&self, artist: &Artist) -> Result<()> {
        Ok(artists::insert(&self.pool, artist).await?)
    }

    async fn update_artist(&self, artist: &Artist) -> Result<()> {
        Ok(artists::update(&self.pool, artist).await?)
    }

    async fn delete_artist(&self, id: &str) -> Result<()> {
        Ok(artists::delete(&self.pool, id).await?)
    }

    // Playlists
    async fn get_all_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(playlists::get_all(&self.pool).await?)
    }

    async fn get_user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
        Ok(playlists::get_by_user(&self.pool, user_id).await?)
    }

    async fn get_playlist(&self, id: &str) -> Result<Playlist> {
        Ok(playlists::get_by_id(&self.pool, id).await?)
    }

    async fn add_playlist(&self, playlist: &Playlist) -> Result<()> {
        Ok(playlists::insert(&self.pool, playlist).await?)
    }

    async fn update_playlist(&self, playlist: &Playlist) -> Result<()> {
        Ok(playlists::update(&self.pool, playlist).await?)
    }

    async fn delete_playlist(&self, id: &str) -> Result<()> {
        Ok(playlists::delete(&self.pool, id).await?)
    }

    // Users
    async fn get_users(&self) -> Result<Vec<User>> {
        Ok(users::get_all(&self.pool).await?)
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        Ok(users::get_by_id(&self.pool, id).await?)
    }

    async fn get_user_by_username(&self, username_or_email: &str) -> Result<DatabaseUser> {
        Ok(users::get_by_username(&self.pool, username_or_email).await?)
    }

    async fn create_user(&self, user: &DatabaseUser) -> Result<()> {
        Ok(users::insert(&self.pool, user).await?)
    }

    async fn update_user(&self, user: &DatabaseUser) -> Result<()> {
        Ok(users::update(&self.pool, user).await?)
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        Ok(users::delete(&self.pool, id).await?)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(users::username_exists(&self.pool, username).await?)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(users::email_exists(&self.pool, email).await?)
    }

    // Provider links
    async fn get_provider_user(&self, provider: &str, provider_user_id: &str) -> Result<User> {
        Ok(users::get_provider_user(&self.pool, provider, provider_user_id).await?)
    }

    async fn is_provider_linked(&self, provider: &str, user_id: &str) -> Result<bool> {
        Ok(users::is_provider_linked(&self.pool, provider, user_id).await?)
    }

    async fn link_provider_account(
        &self,
        provider: &str,
        user_id: &str,
        provider_user_id: &str,
    ) -> Result<()> {
        Ok(users::link_provider(&self.pool, provider, user_id, provider_user_id).await?)
    }

    async fn disconnect_provider_account(&self, provider: &str, user_id: &str) -> Result<()> {
        Ok(users::unlink_provider(&self.pool, provider, user_id).await?)
    }

    // Token blacklist
    async fn blacklist_token(&self, token: &str, expiration: DateTime<Utc>) -> Result<()> {
        Ok(tokens::blacklist(&self.pool, token, expiration).await?)
    }

    async fn is_token_blacklisted(&self, token: &str) -> Result<bool> {
        Ok(tokens::is_blacklisted(&self.pool, token).await?)
    }

    async fn clean_expired_tokens(&self) -> Result<()> {
        tokens::clean_expired(&self.pool, Utc::now()).await?;
        Ok(())
    }
}
