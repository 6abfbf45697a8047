//! Test helpers for storage integration tests
//!
//! Databases are REAL SQLite files in a temp dir (not in-memory) so WAL,
//! migrations, constraints and indexes behave as in production.

#![allow(dead_code)]

use libra_core::{CatalogStore, DatabaseUser, LinkedSource, Track, User};
use libra_storage::{DbPool, SqlCatalog};
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub catalog: SqlCatalog,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new migrated database
    pub async fn new() -> Self {
        let db = Self::unmigrated().await;
        db.catalog
            .migrate_up(-1)
            .await
            .expect("Failed to run migrations");
        db
    }

    /// Create a database with an empty schema
    pub async fn unmigrated() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pool = DbPool::connect_sqlite(&temp_dir.path().join("test.db"))
            .await
            .expect("Failed to create pool");

        Self {
            catalog: SqlCatalog::new(pool),
            _temp_dir: temp_dir,
        }
    }
}

/// PostgreSQL catalog from `LIBRA_TEST_POSTGRES_URL`, if set
pub async fn postgres_catalog() -> Option<SqlCatalog> {
    let url = std::env::var("LIBRA_TEST_POSTGRES_URL").ok()?;
    let pool = DbPool::connect_postgres(&url)
        .await
        .expect("Failed to connect to postgres");
    Some(SqlCatalog::new(pool))
}

/// Test fixture: a fully populated track
pub fn sample_track(id: &str, user_id: &str) -> Track {
    let mut track = Track {
        id: id.to_string(),
        user_id: user_id.to_string(),
        isrc: "USUM71703861".to_string(),
        title: format!("Track {id}"),
        artist_ids: vec!["artist00001".to_string()],
        album_ids: vec!["album000001".to_string()],
        primary_album_id: "album000001".to_string(),
        track_number: 3,
        duration: "3m25s".parse().unwrap(),
        release_date: "2017-06-02".to_string(),
        listen_count: 12,
        addition_date: 1_700_000_000,
        tags: vec!["pop".to_string(), "live".to_string()],
        content_source: LinkedSource::new("youtube", "https://youtu.be/abc"),
        metadata_source: LinkedSource::new("youtube", "https://youtu.be/abc"),
        ..Track::default()
    };
    track
        .lyrics
        .insert("en".to_string(), "la la la".to_string());
    track
        .lyric_sources
        .insert("en".to_string(), LinkedSource::new("youtube", "abc"));
    track
        .additional_meta
        .insert("yt_id".to_string(), serde_json::json!("abc"));
    track
}

/// Test fixture: a stored user with the given credentials
pub fn sample_user(id: &str, username: &str, email: &str) -> DatabaseUser {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        display_name: username.to_string(),
        creation_date: 1_700_000_000,
        ..User::default()
    }
    .into_database_user("$2b$12$hash")
}
