//! Track queries

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use crate::require_affected;
use chrono::Duration;
use libra_core::{HumanDuration, LanguageMap, LinkedSource, Metadata, Permissions, Track};
use sqlx::types::Json;
use std::collections::BTreeMap;

const SELECT: &str = r#"
    SELECT
        id, user_id, isrc, title, artist_ids, album_ids, primary_album_id,
        track_number, duration, description, release_date, lyrics,
        listen_count, favorite_count, addition_date, tags, additional_meta,
        permissions, linked_item_ids, content_source, metadata_source, lyric_sources
    FROM tracks
"#;

const INSERT: &str = r#"
    INSERT INTO tracks (
        id, user_id, isrc, title, artist_ids, album_ids, primary_album_id,
        track_number, duration, description, release_date, lyrics,
        listen_count, favorite_count, addition_date, tags, additional_meta,
        permissions, linked_item_ids, content_source, metadata_source, lyric_sources
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
        $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
    )
"#;

const UPDATE: &str = r#"
    UPDATE tracks SET
        user_id = $2, isrc = $3, title = $4, artist_ids = $5, album_ids = $6,
        primary_album_id = $7, track_number = $8, duration = $9, description = $10,
        release_date = $11, lyrics = $12, listen_count = $13, favorite_count = $14,
        addition_date = $15, tags = $16, additional_meta = $17, permissions = $18,
        linked_item_ids = $19, content_source = $20, metadata_source = $21,
        lyric_sources = $22
    WHERE id = $1
"#;

#[derive(sqlx::FromRow)]
struct TrackRow {
    id: String,
    user_id: String,
    isrc: String,
    title: String,
    artist_ids: Json<Vec<String>>,
    album_ids: Json<Vec<String>>,
    primary_album_id: String,
    track_number: i64,
    /// Nanoseconds
    duration: i64,
    description: String,
    release_date: String,
    lyrics: Json<LanguageMap>,
    listen_count: i64,
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

impl From<TrackRow> for Track {
    fn from(row: TrackRow) -> Self {
        Track {
            id: row.id,
            user_id: row.user_id,
            isrc: row.isrc,
            title: row.title,
            artist_ids: row.artist_ids.0,
            album_ids: row.album_ids.0,
            primary_album_id: row.primary_album_id,
            track_number: row.track_number,
            duration: HumanDuration::new(Duration::nanoseconds(row.duration)),
            description: row.description,
            release_date: row.release_date,
            lyrics: row.lyrics.0,
            listen_count: row.listen_count,
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

pub(crate) fn duration_nanos(duration: &HumanDuration) -> i64 {
    duration.as_duration().num_nanoseconds().unwrap_or(i64::MAX)
}

/// Every track
pub async fn get_all(pool: &DbPool) -> Result<Vec<Track>> {
    let rows: Vec<TrackRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} ORDER BY addition_date, id"))
            .fetch_all(p)
            .await
    })?;
    Ok(rows.into_iter().map(Track::from).collect())
}

/// Tracks owned by `user_id`
pub async fn get_by_user(pool: &DbPool, user_id: &str) -> Result<Vec<Track>> {
    let rows: Vec<TrackRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!(
            "{SELECT} WHERE user_id = $1 ORDER BY addition_date, id"
        ))
        .bind(user_id)
        .fetch_all(p)
        .await
    })?;
    Ok(rows.into_iter().map(Track::from).collect())
}

pub async fn get_by_id(pool: &DbPool, id: &str) -> Result<Track> {
    let row: Option<TrackRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(p)
            .await
    })?;
    row.map(Track::from)
        .ok_or_else(|| StorageError::not_found("track", id))
}

pub async fn insert(pool: &DbPool, track: &Track) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(INSERT)
            .bind(track.id.as_str())
            .bind(track.user_id.as_str())
            .bind(track.isrc.as_str())
            .bind(track.title.as_str())
            .bind(Json(&track.artist_ids))
            .bind(Json(&track.album_ids))
            .bind(track.primary_album_id.as_str())
            .bind(track.track_number)
            .bind(duration_nanos(&track.duration))
            .bind(track.description.as_str())
            .bind(track.release_date.as_str())
            .bind(Json(&track.lyrics))
            .bind(track.listen_count)
            .bind(track.favorite_count)
            .bind(track.addition_date)
            .bind(Json(&track.tags))
            .bind(Json(&track.additional_meta))
            .bind(Json(&track.permissions))
            .bind(Json(&track.linked_item_ids))
            .bind(track.content_source.as_str())
            .bind(track.metadata_source.as_str())
            .bind(Json(&track.lyric_sources))
            .execute(p)
            .await
            .map(|_| ())
    })?;
    Ok(())
}

/// Replace every column of the track with `track.id`
pub async fn update(pool: &DbPool, track: &Track) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query(UPDATE)
            .bind(track.id.as_str())
            .bind(track.user_id.as_str())
            .bind(track.isrc.as_str())
            .bind(track.title.as_str())
            .bind(Json(&track.artist_ids))
            .bind(Json(&track.album_ids))
            .bind(track.primary_album_id.as_str())
            .bind(track.track_number)
            .bind(duration_nanos(&track.duration))
            .bind(track.description.as_str())
            .bind(track.release_date.as_str())
            .bind(Json(&track.lyrics))
            .bind(track.listen_count)
            .bind(track.favorite_count)
            .bind(track.addition_date)
            .bind(Json(&track.tags))
            .bind(Json(&track.additional_meta))
            .bind(Json(&track.permissions))
            .bind(Json(&track.linked_item_ids))
            .bind(track.content_source.as_str())
            .bind(track.metadata_source.as_str())
            .bind(Json(&track.lyric_sources))
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "track", &track.id)
}

pub async fn delete(pool: &DbPool, id: &str) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "track", id)
}
