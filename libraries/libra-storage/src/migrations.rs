//! Embedded, reversible schema migrations
//!
//! Each engine carries its own migration set. `steps` counts migrations to
//! apply or revert; a negative value means all of them.

use crate::error::{Result, StorageError};
use crate::pool::DbPool;
use sqlx::migrate::{Migrate, MigrateError, Migrator};
use sqlx::{Database, Pool};
use std::collections::HashSet;
use tracing::info;

static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

/// Apply up to `steps` pending migrations, returning how many ran
pub async fn migrate_up(pool: &DbPool, steps: i64) -> Result<usize> {
    match pool {
        DbPool::Sqlite(pool) => up(pool, &SQLITE_MIGRATOR, steps).await,
        DbPool::Postgres(pool) => up(pool, &POSTGRES_MIGRATOR, steps).await,
    }
}

/// Revert up to `steps` applied migrations, newest first
pub async fn migrate_down(pool: &DbPool, steps: i64) -> Result<usize> {
    match pool {
        DbPool::Sqlite(pool) => down(pool, &SQLITE_MIGRATOR, steps).await,
        DbPool::Postgres(pool) => down(pool, &POSTGRES_MIGRATOR, steps).await,
    }
}

fn within(steps: i64, done: usize) -> bool {
    usize::try_from(steps).map_or(true, |limit| done < limit)
}

async fn up<DB>(pool: &Pool<DB>, migrator: &Migrator, steps: i64) -> Result<usize>
where
    DB: Database,
    DB::Connection: Migrate,
{
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    if let Some(version) = conn.dirty_version().await? {
        return Err(StorageError::Migration(MigrateError::Dirty(version)));
    }

    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    let mut done = 0;
    for migration in migrator
        .iter()
        .filter(|m| m.migration_type.is_up_migration())
    {
        if applied.contains(&migration.version) {
            continue;
        }
        if !within(steps, done) {
            break;
        }
        conn.apply(migration).await?;
        info!(
            version = migration.version,
            description = %migration.description,
            "applied migration"
        );
        done += 1;
    }
    Ok(done)
}

async fn down<DB>(pool: &Pool<DB>, migrator: &Migrator, steps: i64) -> Result<usize>
where
    DB: Database,
    DB::Connection: Migrate,
{
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    if let Some(version) = conn.dirty_version().await? {
        return Err(StorageError::Migration(MigrateError::Dirty(version)));
    }

    let mut applied: Vec<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();
    applied.sort_unstable_by(|a, b| b.cmp(a));

    let mut done = 0;
    for version in applied {
        if !within(steps, done) {
            break;
        }
        let migration = migrator
            .iter()
            .find(|m| m.version == version && m.migration_type.is_down_migration())
            .ok_or(MigrateError::VersionMissing(version))?;
        conn.revert(migration).await?;
        info!(
            version,
            description = %migration.description,
            "reverted migration"
        );
        done += 1;
    }
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::within;

    #[test]
    fn negative_steps_are_unbounded() {
        assert!(within(-1, 1_000));
        assert!(within(2, 1));
        assert!(!within(2, 2));
        assert!(!within(0, 0));
    }
}
