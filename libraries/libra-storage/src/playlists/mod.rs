//! Playlist queries

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use crate::require_affected;
use libra_core::{Metadata, Permissions, Playlist};
use sqlx::types::Json;

const SELECT: &str = r#"
    SELECT
        id, user_id, title, track_ids, listen_count, favorite_count, description,
        creation_date, addition_date, tags, additional_meta, permissions, metadata_source
    FROM playlists
"#;

#[derive(sqlx::FromRow)]
struct PlaylistRow {
    id: String,
    user_id: String,
    title: String,
    track_ids: Json<Vec<String>>,
    listen_count: i64,
    favorite_count: i64,
    description: String,
    creation_date: String,
    addition_date: i64,
    tags: Json<Vec<String>>,
    additional_meta: Json<Metadata>,
    permissions: Json<Permissions>,
    metadata_source: String,
}

impl From<PlaylistRow> for Playlist {
    fn from(row: PlaylistRow) -> Self {
        Playlist {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            track_ids: row.track_ids.0,
            listen_count: row.listen_count,
            favorite_count: row.favorite_count,
            description: row.description,
            creation_date: row.creation_date,
            addition_date: row.addition_date,
            tags: row.tags.0,
            additional_meta: row.additional_meta.0,
            permissions: row.permissions.0,
            metadata_source: row.metadata_source.into(),
        }
    }
}

pub async fn get_all(pool: &DbPool) -> Result<Vec<Playlist>> {
    let rows: Vec<PlaylistRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} ORDER BY addition_date, id"))
            .fetch_all(p)
            .await
    })?;
    Ok(rows.into_iter().map(Playlist::from).collect())
}

/// Playlists owned by `user_id`
pub async fn get_by_user(pool: &DbPool, user_id: &str) -> Result<Vec<Playlist>> {
    let rows: Vec<PlaylistRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!(
            "{SELECT} WHERE user_id = $1 ORDER BY addition_date, id"
        ))
        .bind(user_id)
        .fetch_all(p)
        .await
    })?;
    Ok(rows.into_iter().map(Playlist::from).collect())
}

pub async fn get_by_id(pool: &DbPool, id: &str) -> Result<Playlist> {
    let row: Option<PlaylistRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(p)
            .await
    })?;
    row.map(Playlist::from)
        .ok_or_else(|| StorageError::not_found("playlist", id))
}

pub async fn insert(pool: &DbPool, playlist: &Playlist) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(
            r#"
            INSERT INTO playlists (
                id, user_id, title, track_ids, listen_count, favorite_count, description,
                creation_date, addition_date, tags, additional_meta, permissions, metadata_source
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(playlist.id.as_str())
        .bind(playlist.user_id.as_str())
        .bind(playlist.title.as_str())
        .bind(Json(&playlist.track_ids))
        .bind(playlist.listen_count)
        .bind(playlist.favorite_count)
        .bind(playlist.description.as_str())
        .bind(playlist.creation_date.as_str())
        .bind(playlist.addition_date)
        .bind(Json(&playlist.tags))
        .bind(Json(&playlist.additional_meta))
        .bind(Json(&playlist.permissions))
        .bind(playlist.metadata_source.as_str())
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn update(pool: &DbPool, playlist: &Playlist) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query(
            r#"
            UPDATE playlists SET
                user_id = $2, title = $3, track_ids = $4, listen_count = $5,
                favorite_count = $6, description = $7, creation_date = $8,
                addition_date = $9, tags = $10, additional_meta = $11, permissions = $12,
                metadata_source = $13
            WHERE id = $1
            "#,
        )
        .bind(playlist.id.as_str())
        .bind(playlist.user_id.as_str())
        .bind(playlist.title.as_str())
        .bind(Json(&playlist.track_ids))
        .bind(playlist.listen_count)
        .bind(playlist.favorite_count)
        .bind(playlist.description.as_str())
        .bind(playlist.creation_date.as_str())
        .bind(playlist.addition_date)
        .bind(Json(&playlist.tags))
        .bind(Json(&playlist.additional_meta))
        .bind(Json(&playlist.permissions))
        .bind(playlist.metadata_source.as_str())
        .execute(p)
        .await
        .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "playlist", &playlist.id)
}

pub async fn delete(pool: &DbPool, id: &str) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "playlist", id)
}
