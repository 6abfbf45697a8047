//! Video queries

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use crate::require_affected;
use crate::tracks::duration_nanos;
use chrono::Duration;
use libra_core::{HumanDuration, LanguageMap, LinkedSource, Metadata, Permissions, Video};
use sqlx::types::Json;
use std::collections::BTreeMap;

const SELECT: &str = r#"
    SELECT
        id, user_id, title, artist_ids, duration, description, release_date, subtitles,
        watch_count, favorite_count, addition_date, tags, additional_meta, permissions,
        linked_item_ids, content_source, metadata_source, lyric_sources
    FROM videos
"#;

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: String,
    user_id: String,
    title: String,
    artist_ids: Json<Vec<String>>,
    duration: i64,
    description: String,
    release_date: String,
    subtitles: Json<LanguageMap>,
    watch_count: i64,
    favorite_count: i64,
    addition_date: i64,
    tags: Json<Vec<String>>,
    additional_meta: Json<Metadata>,
    permissions: Json<Permissions>,
    linked_item_ids: Json<Vec<String>>,
    content_source: String,
    metadata_source: String,
    lyric_sources: Json<BTreeMap<String, LinkedSource>>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            artist_ids: row.artist_ids.0,
            duration: HumanDuration::new(Duration::nanoseconds(row.duration)),
            description: row.description,
            release_date: row.release_date,
            subtitles: row.subtitles.0,
            watch_count: row.watch_count,
            favorite_count: row.favorite_count,
            addition_date: row.addition_date,
            tags: row.tags.0,
            additional_meta: row.additional_meta.0,
            permissions: row.permissions.0,
            linked_item_ids: row.linked_item_ids.0,
            content_source: row.content_source.into(),
            metadata_source: row.metadata_source.into(),
            lyric_sources: row.lyric_sources.0,
        }
    }
}

pub async fn get_all(pool: &DbPool) -> Result<Vec<Video>> {
    let rows: Vec<VideoRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} ORDER BY addition_date, id"))
            .fetch_all(p)
            .await
    })?;
    Ok(rows.into_iter().map(Video::from).collect())
}

pub async fn get_by_user(pool: &DbPool, user_id: &str) -> Result<Vec<Video>> {
    let rows: Vec<VideoRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!(
            "{SELECT} WHERE user_id = $1 ORDER BY addition_date, id"
        ))
        .bind(user_id)
        .fetch_all(p)
        .await
    })?;
    Ok(rows.into_iter().map(Video::from).collect())
}

pub async fn get_by_id(pool: &DbPool, id: &str) -> Result<Video> {
    let row: Option<VideoRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(p)
            .await
    })?;
    row.map(Video::from)
        .ok_or_else(|| StorageError::not_found("video", id))
}

pub async fn insert(pool: &DbPool, video: &Video) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, user_id, title, artist_ids, duration, description, release_date, subtitles,
                watch_count, favorite_count, addition_date, tags, additional_meta, permissions,
                linked_item_ids, content_source, metadata_source, lyric_sources
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18
            )
            "#,
        )
        .bind(video.id.as_str())
        .bind(video.user_id.as_str())
        .bind(video.title.as_str())
        .bind(Json(&video.artist_ids))
        .bind(duration_nanos(&video.duration))
        .bind(video.description.as_str())
        .bind(video.release_date.as_str())
        .bind(Json(&video.subtitles))
        .bind(video.watch_count)
        .bind(video.favorite_count)
        .bind(video.addition_date)
        .bind(Json(&video.tags))
        .bind(Json(&video.additional_meta))
        .bind(Json(&video.permissions))
        .bind(Json(&video.linked_item_ids))
        .bind(video.content_source.as_str())
        .bind(video.metadata_source.as_str())
        .bind(Json(&video.lyric_sources))
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn update(pool: &DbPool, video: &Video) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query(
            r#"
            UPDATE videos SET
                user_id = $2, title = $3, artist_ids = $4, duration = $5, description = $6,
                release_date = $7, subtitles = $8, watch_count = $9, favorite_count = $10,
                addition_date = $11, tags = $12, additional_meta = $13, permissions = $14,
                linked_item_ids = $15, content_source = $16, metadata_source = $17,
                lyric_sources = $18
            WHERE id = $1
            "#,
        )
        .bind(video.id.as_str())
        .bind(video.user_id.as_str())
        .bind(video.title.as_str())
        .bind(Json(&video.artist_ids))
        .bind(duration_nanos(&video.duration))
        .bind(video.description.as_str())
        .bind(video.release_date.as_str())
        .bind(Json(&video.subtitles))
        .bind(video.watch_count)
        .bind(video.favorite_count)
        .bind(video.addition_date)
        .bind(Json(&video.tags))
        .bind(Json(&video.additional_meta))
        .bind(Json(&video.permissions))
        .bind(Json(&video.linked_item_ids))
        .bind(video.content_source.as_str())
        .bind(video.metadata_source.as_str())
        .bind(Json(&video.lyric_sources))
        .execute(p)
        .await
        .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "video", &video.id)
}

pub async fn delete(pool: &DbPool, id: &str) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "video", id)
}
