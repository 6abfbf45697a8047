//! User accounts and federated identity links
//!
//! Usernames are unique case-insensitively; emails are unique
//! case-insensitively when non-empty. Both are enforced by indexes, so a
//! conflicting insert surfaces as [`StorageError::Duplicate`].

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use crate::require_affected;
use libra_core::{DatabaseUser, Permissions, User};
use sqlx::types::Json;
use std::collections::BTreeMap;

const SELECT: &str = r#"
    SELECT
        id, username, email, password_hash, display_name, description, listened_to,
        favorites, public_view_count, creation_date, permissions, linked_artist_id,
        linked_sources
    FROM users
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    display_name: String,
    description: String,
    listened_to: Json<BTreeMap<String, i64>>,
    favorites: Json<Vec<String>>,
    public_view_count: i64,
    creation_date: i64,
    permissions: Json<Permissions>,
    linked_artist_id: String,
    linked_sources: Json<BTreeMap<String, String>>,
}

impl From<UserRow> for DatabaseUser {
    fn from(row: UserRow) -> Self {
        DatabaseUser {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
                display_name: row.display_name,
                description: row.description,
                listened_to: row.listened_to.0,
                favorites: row.favorites.0,
                public_view_count: row.public_view_count,
                creation_date: row.creation_date,
                permissions: row.permissions.0,
                linked_artist_id: row.linked_artist_id,
                linked_sources: row.linked_sources.0,
            },
            password_hash: row.password_hash,
        }
    }
}

pub async fn get_all(pool: &DbPool) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} ORDER BY creation_date, id"))
            .fetch_all(p)
            .await
    })?;
    Ok(rows
        .into_iter()
        .map(|row| DatabaseUser::from(row).into_user())
        .collect())
}

pub async fn get_by_id(pool: &DbPool, id: &str) -> Result<User> {
    let row: Option<UserRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(p)
            .await
    })?;
    row.map(|row| DatabaseUser::from(row).into_user())
        .ok_or_else(|| StorageError::not_found("user", id))
}

/// Resolve a login name that may be either the username or the email
pub async fn get_by_username(pool: &DbPool, username_or_email: &str) -> Result<DatabaseUser> {
    let row: Option<UserRow> = with_pool!(pool, |p| {
        sqlx::query_as(&format!(
            "{SELECT} WHERE LOWER(username) = LOWER($1) \
             OR (email <> '' AND LOWER(email) = LOWER($1)) \
             ORDER BY CASE WHEN LOWER(username) = LOWER($1) THEN 0 ELSE 1 END \
             LIMIT 1"
        ))
        .bind(username_or_email)
        .fetch_optional(p)
        .await
    })?;
    row.map(DatabaseUser::from)
        .ok_or_else(|| StorageError::not_found("user", username_or_email))
}

pub async fn insert(pool: &DbPool, user: &DatabaseUser) -> Result<()> {
    let hash = user.password_hash.as_str();
    let user = &user.user;
    with_pool!(pool, |p| {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, display_name, description, listened_to,
                favorites, public_view_count, creation_date, permissions, linked_artist_id,
                linked_sources
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(hash)
        .bind(user.display_name.as_str())
        .bind(user.description.as_str())
        .bind(Json(&user.listened_to))
        .bind(Json(&user.favorites))
        .bind(user.public_view_count)
        .bind(user.creation_date)
        .bind(Json(&user.permissions))
        .bind(user.linked_artist_id.as_str())
        .bind(Json(&user.linked_sources))
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn update(pool: &DbPool, user: &DatabaseUser) -> Result<()> {
    let hash = user.password_hash.as_str();
    let user = &user.user;
    let rows = with_pool!(pool, |p| {
        sqlx::query(
            r#"
            UPDATE users SET
                username = $2, email = $3, password_hash = $4, display_name = $5,
                description = $6, listened_to = $7, favorites = $8, public_view_count = $9,
                creation_date = $10, permissions = $11, linked_artist_id = $12,
                linked_sources = $13
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(hash)
        .bind(user.display_name.as_str())
        .bind(user.description.as_str())
        .bind(Json(&user.listened_to))
        .bind(Json(&user.favorites))
        .bind(user.public_view_count)
        .bind(user.creation_date)
        .bind(Json(&user.permissions))
        .bind(user.linked_artist_id.as_str())
        .bind(Json(&user.linked_sources))
        .execute(p)
        .await
        .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "user", &user.id)
}

/// Delete a user and its provider links
pub async fn delete(pool: &DbPool, id: &str) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query("DELETE FROM auth_providers WHERE user_id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|_| ())
    })?;
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "user", id)
}

pub async fn username_exists(pool: &DbPool, username: &str) -> Result<bool> {
    let count: i64 = with_pool!(pool, |p| {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_one(p)
            .await
    })?;
    Ok(count > 0)
}

pub async fn email_exists(pool: &DbPool, email: &str) -> Result<bool> {
    if email.is_empty() {
        return Ok(false);
    }
    let count: i64 = with_pool!(pool, |p| {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE email <> '' AND LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_one(p)
        .await
    })?;
    Ok(count > 0)
}

// ============================================================================
// Provider links
// ============================================================================

pub async fn get_provider_user(
    pool: &DbPool,
    provider: &str,
    provider_user_id: &str,
) -> Result<User> {
    let row: Option<UserRow> = with_pool!(pool, |p| {
        sqlx::query_as(
            r#"
            SELECT
                u.id, u.username, u.email, u.password_hash, u.display_name, u.description,
                u.listened_to, u.favorites, u.public_view_count, u.creation_date,
                u.permissions, u.linked_artist_id, u.linked_sources
            FROM users u
            JOIN auth_providers a ON u.id = a.user_id
            WHERE a.provider = $1 AND a.provider_user_id = $2
            "#,
        )
        .bind(provider)
        .bind(provider_user_id)
        .fetch_optional(p)
        .await
    })?;
    row.map(|row| DatabaseUser::from(row).into_user())
        .ok_or_else(|| StorageError::not_found("user", format!("{provider}:{provider_user_id}")))
}

pub async fn is_provider_linked(pool: &DbPool, provider: &str, user_id: &str) -> Result<bool> {
    let count: i64 = with_pool!(pool, |p| {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM auth_providers WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider)
        .fetch_one(p)
        .await
    })?;
    Ok(count > 0)
}

pub async fn link_provider(
    pool: &DbPool,
    provider: &str,
    user_id: &str,
    provider_user_id: &str,
) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(
            "INSERT INTO auth_providers (user_id, provider, provider_user_id) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(provider)
        .bind(provider_user_id)
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn unlink_provider(pool: &DbPool, provider: &str, user_id: &str) -> Result<()> {
    let rows = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM auth_providers WHERE user_id = $1 AND provider = $2")
            .bind(user_id)
            .bind(provider)
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    require_affected(rows, "provider link", &format!("{provider}:{user_id}"))
}
