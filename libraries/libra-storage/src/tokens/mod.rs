//! Revoked-token blacklist

use crate::error::Result;
use crate::pool::DbPool;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Record a revoked token until `expiration`; re-adding is a no-op
pub async fn blacklist(pool: &DbPool, token: &str, expiration: DateTime<Utc>) -> Result<()> {
    with_pool!(pool, |p| {
        sqlx::query(
            "INSERT INTO blacklisted_tokens (token, expiration) VALUES ($1, $2) \
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .bind(expiration.timestamp())
        .execute(p)
        .await
        .map(|_| ())
    })?;
    Ok(())
}

pub async fn is_blacklisted(pool: &DbPool, token: &str) -> Result<bool> {
    let count: i64 = with_pool!(pool, |p| {
        sqlx::query_scalar("SELECT COUNT(*) FROM blacklisted_tokens WHERE token = $1")
            .bind(token)
            .fetch_one(p)
            .await
    })?;
    Ok(count > 0)
}

/// Drop entries that expired before `now`
pub async fn clean_expired(pool: &DbPool, now: DateTime<Utc>) -> Result<u64> {
    let removed = with_pool!(pool, |p| {
        sqlx::query("DELETE FROM blacklisted_tokens WHERE expiration < $1")
            .bind(now.timestamp())
            .execute(p)
            .await
            .map(|r| r.rows_affected())
    })?;
    debug!(removed, "cleaned expired blacklisted tokens");
    Ok(removed)
}
