//! Stepwise migrations

mod common;

use common::{sample_track, TestDb};
use libra_core::CatalogStore;

#[tokio::test]
async fn test_down_then_up_restores_schema() {
    let db = TestDb::new().await;
    assert_eq!(db.catalog.engine_name(), "sqlite");

    db.catalog.migrate_down(-1).await.unwrap();
    assert!(db.catalog.get_all_tracks().await.is_err());

    db.catalog.migrate_up(-1).await.unwrap();
    db.catalog.add_track(&sample_track("t", "")).await.unwrap();
    assert_eq!(db.catalog.get_all_tracks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_steps_is_a_no_op() {
    let db = TestDb::unmigrated().await;
    db.catalog.migrate_up(0).await.unwrap();
    assert!(db.catalog.get_all_tracks().await.is_err());

    db.catalog.migrate_up(1).await.unwrap();
    assert!(db.catalog.get_all_tracks().await.unwrap().is_empty());

    // Already applied
    db.catalog.migrate_up(-1).await.unwrap();
}
