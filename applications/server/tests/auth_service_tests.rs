/// Authentication service tests
/// Tests JWT issuance, verification, revocation and key configuration
mod common;

use chrono::{Duration, Utc};
use common::{TestApp, TEST_SECRET};
use libra_core::{HumanDuration, LibraError};
use libra_server::{
    config::JwtConfig,
    services::auth::{hash_password, verify_password},
    AuthService, ServerError,
};
use std::sync::Arc;

#[tokio::test]
async fn test_password_hashing() {
    let hash = hash_password("MySecurePassword123!").unwrap();

    assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));
    assert_ne!(
        hash,
        hash_password("MySecurePassword123!").unwrap(),
        "Hashes should differ due to random salt"
    );
    assert!(verify_password(&hash, "MySecurePassword123!").unwrap());
    assert!(!verify_password(&hash, "WrongPassword").unwrap());
}

#[tokio::test]
async fn test_issue_and_verify_token() {
    let app = TestApp::new().await;

    let token = app.auth_service.issue_token("user-1").unwrap();
    let claims = app.auth_service.verify_token(&token).await.unwrap();

    assert_eq!(claims.user_id, "user-1");
    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.iat, claims.nbf);
    assert_eq!(claims.exp - claims.iat, 15 * 60);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = TestApp::new().await;
    let other = AuthService::with_secret(
        Arc::clone(&app.catalog),
        "another-secret",
        HumanDuration::from_secs(60),
    );

    let token = other.issue_token("user-1").unwrap();
    let err = app.auth_service.verify_token(&token).await.unwrap_err();
    assert!(matches!(err, ServerError::Jwt(_)));
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new().await;
    let expired = AuthService::with_secret(
        Arc::clone(&app.catalog),
        TEST_SECRET,
        HumanDuration::from_secs(-10 * 60),
    );

    let token = expired.issue_token("user-1").unwrap();
    assert!(app.auth_service.verify_token(&token).await.is_err());
}

#[tokio::test]
async fn test_revoked_token_invalidated() {
    let app = TestApp::new().await;
    let token = app.auth_service.issue_token("user-1").unwrap();

    app.auth_service.revoke(&token).await.unwrap();

    let err = app.auth_service.verify_token(&token).await.unwrap_err();
    assert!(matches!(err, ServerError::Libra(LibraError::Invalidated)));

    // Other tokens stay valid
    let fresh = app.auth_service.issue_token("user-2").unwrap();
    assert!(app.auth_service.verify_token(&fresh).await.is_ok());
}

#[tokio::test]
async fn test_clean_expired_tokens() {
    let app = TestApp::new().await;
    app.catalog
        .blacklist_token("stale-token", Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    app.catalog
        .blacklist_token("live-token", Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    app.auth_service.clean_expired_tokens().await.unwrap();

    assert!(!app.catalog.is_token_blacklisted("stale-token").await.unwrap());
    assert!(app.catalog.is_token_blacklisted("live-token").await.unwrap());
}

#[tokio::test]
async fn test_from_config() {
    let app = TestApp::new().await;
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("jwt.key");
    std::fs::write(&key_path, "file-secret").unwrap();

    let config = JwtConfig {
        signing_method: "hs512".to_string(),
        signing_key: format!("file:{}", key_path.display()),
        ..JwtConfig::default()
    };
    let service = AuthService::from_config(&config, Arc::clone(&app.catalog)).unwrap();
    assert_eq!(service.algorithm(), jsonwebtoken::Algorithm::HS512);

    let token = service.issue_token("user-1").unwrap();
    assert_eq!(service.verify_token(&token).await.unwrap().user_id, "user-1");
}

#[tokio::test]
async fn test_from_config_rejects_bad_setups() {
    let app = TestApp::new().await;

    let unknown = JwtConfig {
        signing_method: "ES512".to_string(),
        ..JwtConfig::default()
    };
    assert!(matches!(
        AuthService::from_config(&unknown, Arc::clone(&app.catalog)),
        Err(ServerError::Config(_))
    ));

    let missing_public_key = JwtConfig {
        signing_method: "RS256".to_string(),
        signing_key: "not a pem".to_string(),
        ..JwtConfig::default()
    };
    assert!(matches!(
        AuthService::from_config(&missing_public_key, Arc::clone(&app.catalog)),
        Err(ServerError::Config(_))
    ));
}
