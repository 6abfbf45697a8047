//! Album queries

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use crate::require_affected;
use libra_core::{Album, Metadata, Permissions};
use sqlx::types::Json;

const SELECT: &str = r#"
    SELECT
        id, user_id, upc, title, artist_ids, track_ids, description, release_date,
        listen_count, favorite_count, addition_date, tags, additional_meta,
        permissions, linked_item_ids, metadata_source
    FROM albums
"#;

#[derive(sqlx::FromRow)]
struct AlbumRow {
    id: String,
    user_id: String,
    upc: String,
    title: String,
    artist_ids: Json<Vec<String>>,
    track_ids: Json<Vec<String>>,
    description: String,
    release_date: String,
    listen_count: i64,
    favorite_count: i64,
    addition_date: i64,
    tags: Json<Vec<String>>,
    additional_meta: Json<Metadata>,
    permissions: Json<Permissions>,
    linked_item_ids: Json<Vec<String>>,
    metadata_source: String,
}

impl From<AlbumRow> for Album {
    fn from(row: AlbumRow) -> Self {
        Album {
            id: row.id,
            user_id: row.user_id,
            upc: row.upc,
            title: row.title,
            artist_ids: row.artist_ids.0,
            track_ids: row.track_ids.0,
            description: row.description,
            release_date: row.release_date,
            listen_count: row.listen_count,
            favorite_count: row.favorite_count,
            addition_date: row.addition_date,
            tags: row.tags.0,
            additional_meta: row.additional_meta.0,
            permissions: row.permissions.0,
            linked_item_ids: row.linked_item_ids.0,
            metadata_source: row.metadata_source.into(),
        }
    }
}

pub async fn get_all(pool: &DbPool) -> Result<Vec<Album>> {
    let rows: Vec<AlbumRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} ORDER BY addition_date, id"))
            .fetch_all(p)
            .await
    })?;
    Ok(rows.into_iter().map(Album::from).collect())
}

pub async fn get_by_user(pool: &DbPool, user_id: &str) -> Result<Vec<Album>> {
    let rows: Vec<AlbumRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!(
            "{SELECT} WHERE user_id = $1 ORDER BY addition_date, id"
        ))
        .bind(user_id)
        .fetch_all(p)
        .await
    })?;
    Ok(rows.into_iter().map(Album::from).collect())
}

pub async fn get_by_id(pool: &DbPool, id: &str) -> Result<Album> {
    let row: Option<AlbumRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(p)
            .await
    })?;
    row.map(Album::from)
        .ok_or_else(|| StorageError::not_found("album", id))
}

pub async fn insert(pool: &DbPool, album: &Album) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(
            r#"
            INSERT INTO albums (
                id, user_id, upc, title, artist_ids, track_ids, description, release_date,
                listen_count, favorite_count, addition_date, tags, additional_meta,
                permissions, linked_item_ids, metadata_source
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(album.id.as_str())
        .bind(album.user_id.as_str())
        .bind(album.upc.as_str())
        .bind(album.title.as_str())
        .bind(Json(&album.artist_ids))
        .bind(Json(&album.track_ids))
        .bind(album.description.as_str())
        .bind(album.release_date.as_str())
        .bind(album.listen_count)
        .bind(album.favorite_count)
        .bind(album.addition_date)
        .bind(Json(&album.tags))
        .bind(Json(&album.additional_meta))
        .bind(Json(&album.permissions))
        .bind(Json(&album.linked_item_ids))
        .bind(album.metadata_source.as_str())
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn update(pool: &DbPool, album: &Album) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query(
            r#"
            UPDATE albums SET
                user_id = $2, upc = $3, title = $4, artist_ids = $5, track_ids = $6,
                description = $7, release_date = $8, listen_count = $9, favorite_count = $10,
                addition_date = $11, tags = $12, additional_meta = $13, permissions = $14,
                linked_item_ids = $15, metadata_source = $16
            WHERE id = $1
            "#,
        )
        .bind(album.id.as_str())
        .bind(album.user_id.as_str())
        .bind(album.upc.as_str())
        .bind(album.title.as_str())
        .bind(Json(&album.artist_ids))
        .bind(Json(&album.track_ids))
        .bind(album.description.as_str())
        .bind(album.release_date.as_str())
        .bind(album.listen_count)
        .bind(album.favorite_count)
        .bind(album.addition_date)
        .bind(Json(&album.tags))
        .bind(Json(&album.additional_meta))
        .bind(Json(&album.permissions))
        .bind(Json(&album.linked_item_ids))
        .bind(album.metadata_source.as_str())
        .execute(p)
        .await
        .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "album", &album.id)
}

pub async fn delete(pool: &DbPool, id: &str) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "album", id)
}
