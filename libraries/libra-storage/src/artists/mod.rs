//! Artist queries

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use crate::require_affected;
use libra_core::{Artist, Metadata, Permissions};
use sqlx::types::Json;

const SELECT: &str = r#"
    SELECT
        id, user_id, name, album_ids, track_ids, description, creation_date,
        listen_count, favorite_count, addition_date, tags, additional_meta,
        permissions, linked_item_ids, metadata_source
    FROM artists
"#;

#[derive(sqlx::FromRow)]
struct ArtistRow {
    id: String,
    user_id: String,
    name: String,
    album_ids: Json<Vec<String>>,
    track_ids: Json<Vec<String>>,
    description: String,
    creation_date: String,
    listen_count: i64,
    favorite_count: i64,
    addition_date: i64,
    tags: Json<Vec<String>>,
    additional_meta: Json<Metadata>,
    permissions: Json<Permissions>,
    linked_item_ids: Json<Vec<String>>,
    metadata_source: String,
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        Artist {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            album_ids: row.album_ids.0,
            track_ids: row.track_ids.0,
            description: row.description,
            creation_date: row.creation_date,
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

pub async fn get_all(pool: &DbPool) -> Result<Vec<Artist>> {
    let rows: Vec<ArtistRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} ORDER BY addition_date, id"))
            .fetch_all(p)
            .await
    })?;
    Ok(rows.into_iter().map(Artist::from).collect())
}

pub async fn get_by_user(pool: &DbPool, user_id: &str) -> Result<Vec<Artist>> {
    let rows: Vec<ArtistRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!(
            "{SELECT} WHERE user_id = $1 ORDER BY addition_date, id"
        ))
        .bind(user_id)
        .fetch_all(p)
        .await
    })?;
    Ok(rows.into_iter().map(Artist::from).collect())
}

pub async fn get_by_id(pool: &DbPool, id: &str) -> Result<Artist> {
    let row: Option<ArtistRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(p)
            .await
    })?;
    row.map(Artist::from)
        .ok_or_else(|| StorageError::not_found("artist", id))
}

pub async fn insert(pool: &DbPool, artist: &Artist) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(
            r#"
            INSERT INTO artists (
                id, user_id, name, album_ids, track_ids, description, creation_date,
                listen_count, favorite_count, addition_date, tags, additional_meta,
                permissions, linked_item_ids, metadata_source
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(artist.id.as_str())
        .bind(artist.user_id.as_str())
        .bind(artist.name.as_str())
        .bind(Json(&artist.album_ids))
        .bind(Json(&artist.track_ids))
        .bind(artist.description.as_str())
        .bind(artist.creation_date.as_str())
        .bind(artist.listen_count)
        .bind(artist.favorite_count)
        .bind(artist.addition_date)
        .bind(Json(&artist.tags))
        .bind(Json(&artist.additional_meta))
        .bind(Json(&artist.permissions))
        .bind(Json(&artist.linked_item_ids))
        .bind(artist.metadata_source.as_str())
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn update(pool: &DbPool, artist: &Artist) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query(
            r#"
            UPDATE artists SET
                user_id = $2, name = $3, album_ids = $4, track_ids = $5, description = $6,
                creation_date = $7, listen_count = $8, favorite_count = $9,
                addition_date = $10, tags = $11, additional_meta = $12, permissions = $13,
                linked_item_ids = $14, metadata_source = $15
            WHERE id = $1
            "#,
        )
        .bind(artist.id.as_str())
        .bind(artist.user_id.as_str())
        .bind(artist.name.as_str())
        .bind(Json(&artist.album_ids))
        .bind(Json(&artist.track_ids))
        .bind(artist.description.as_str())
        .bind(artist.creation_date.as_str())
        .bind(artist.listen_count)
        .bind(artist.favorite_count)
        .bind(artist.addition_date)
        .bind(Json(&artist.tags))
        .bind(Json(&artist.additional_meta))
        .bind(Json(&artist.permissions))
        .bind(Json(&artist.linked_item_ids))
        .bind(artist.metadata_source.as_str())
        .execute(p)
        .await
        .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "artist", &artist.id)
}

pub async fn delete(pool: &DbPool, id: &str) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "artist", id)
}
