//! Accounts, provider links and the token blacklist

mod common;

use chrono::{Duration, Utc};
use common::{sample_user, TestDb};
use libra_core::{CatalogStore, LibraError};

#[tokio::test]
async fn test_username_is_unique_case_insensitively() {
    let db = TestDb::new().await;
    db.catalog
        .create_user(&sample_user("u1", "Alice", "alice@example.com"))
        .await
        .unwrap();

    assert!(db.catalog.username_exists("alice").await.unwrap());
    assert!(db.catalog.username_exists("ALICE").await.unwrap());
    assert!(!db.catalog.username_exists("bob").await.unwrap());

    let err = db
        .catalog
        .create_user(&sample_user("u2", "aLiCe", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraError::Duplicate(_)), "got {err:?}");
}

#[tokio::test]
async fn test_empty_emails_do_not_collide() {
    let db = TestDb::new().await;
    db.catalog
        .create_user(&sample_user("u1", "one", ""))
        .await
        .unwrap();
    db.catalog
        .create_user(&sample_user("u2", "two", ""))
        .await
        .unwrap();

    assert!(!db.catalog.email_exists("").await.unwrap());

    db.catalog
        .create_user(&sample_user("u3", "three", "Me@Example.com"))
        .await
        .unwrap();
    assert!(db.catalog.email_exists("me@example.COM").await.unwrap());
    let err = db
        .catalog
        .create_user(&sample_user("u4", "four", "me@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraError::Duplicate(_)));
}

#[tokio::test]
async fn test_login_name_resolves_username_or_email() {
    let db = TestDb::new().await;
    db.catalog
        .create_user(&sample_user("u1", "alice", "alice@example.com"))
        .await
        .unwrap();

    let by_name = db.catalog.get_user_by_username("ALICE").await.unwrap();
    assert_eq!(by_name.user.id, "u1");
    assert_eq!(by_name.password_hash, "$2b$12$hash");

    let by_email = db
        .catalog
        .get_user_by_username("Alice@Example.com")
        .await
        .unwrap();
    assert_eq!(by_email.user.id, "u1");

    assert!(db
        .catalog
        .get_user_by_username("nobody")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_update_and_delete_user() {
    let db = TestDb::new().await;
    let mut stored = sample_user("u1", "alice", "");
    db.catalog.create_user(&stored).await.unwrap();

    stored.user.display_name = "Alice A.".to_string();
    stored.user.listened_to.insert("trk".to_string(), 4);
    db.catalog.update_user(&stored).await.unwrap();

    let user = db.catalog.get_user("u1").await.unwrap();
    assert_eq!(user.display_name, "Alice A.");
    assert_eq!(user.listened_to.get("trk"), Some(&4));

    db.catalog.delete_user("u1").await.unwrap();
    assert!(db.catalog.get_user("u1").await.unwrap_err().is_not_found());
    assert!(db.catalog.get_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_links() {
    let db = TestDb::new().await;
    db.catalog
        .create_user(&sample_user("u1", "alice", ""))
        .await
        .unwrap();

    assert!(!db.catalog.is_provider_linked("github", "u1").await.unwrap());
    db.catalog
        .link_provider_account("github", "u1", "gh-42")
        .await
        .unwrap();
    assert!(db.catalog.is_provider_linked("github", "u1").await.unwrap());

    let linked = db.catalog.get_provider_user("github", "gh-42").await.unwrap();
    assert_eq!(linked.username, "alice");

    db.catalog
        .disconnect_provider_account("github", "u1")
        .await
        .unwrap();
    assert!(db
        .catalog
        .get_provider_user("github", "gh-42")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_blacklist_is_idempotent_and_cleanable() {
    let db = TestDb::new().await;
    let past = Utc::now() - Duration::hours(1);
    let future = Utc::now() + Duration::hours(1);

    db.catalog.blacklist_token("old", past).await.unwrap();
    db.catalog.blacklist_token("new", future).await.unwrap();
    db.catalog.blacklist_token("new", future).await.unwrap();

    assert!(db.catalog.is_token_blacklisted("old").await.unwrap());
    assert!(db.catalog.is_token_blacklisted("new").await.unwrap());
    assert!(!db.catalog.is_token_blacklisted("other").await.unwrap());

    db.catalog.clean_expired_tokens().await.unwrap();
    assert!(!db.catalog.is_token_blacklisted("old").await.unwrap());
    assert!(db.catalog.is_token_blacklisted("new").await.unwrap());
}
