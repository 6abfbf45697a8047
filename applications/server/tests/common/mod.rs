//! Common test utilities and fixtures
//!
//! Every app runs against a REAL SQLite file and a cache directory inside
//! its own temp dir, with no sources enabled.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use libra_core::{CatalogStore, HumanDuration, LanguageMap, Track};
use libra_server::{router, AppState, AuthService, ContentCache, Library, ServerConfig};
use libra_sources::{Aggregator, SourceRegistry};
use libra_storage::{DbPool, SqlCatalog};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<dyn CatalogStore>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<ContentCache>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::default()).await
    }

    pub async fn with_config(mut config: ServerConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let pool = DbPool::connect_sqlite(&temp_dir.path().join("test.db"))
            .await
            .expect("Failed to create pool");
        let catalog: Arc<dyn CatalogStore> = Arc::new(SqlCatalog::new(pool));
        catalog
            .migrate_up(-1)
            .await
            .expect("Failed to run migrations");

        config.storage.location = temp_dir.path().join("storage");
        let cache = Arc::new(ContentCache::new(
            config.storage.location.clone(),
            config.storage.size_limit,
            config.storage.minimum_age_threshold,
        ));
        cache.initialize().await.expect("Failed to initialize cache");

        let auth_service = Arc::new(AuthService::with_secret(
            Arc::clone(&catalog),
            TEST_SECRET,
            HumanDuration::from_secs(15 * 60),
        ));
        let aggregator = Arc::new(Aggregator::new(Arc::new(SourceRegistry::new())));
        let library = Arc::new(Library::new(
            Arc::clone(&catalog),
            aggregator,
            Arc::clone(&cache),
        ));

        let state = AppState::new(Arc::new(config), Arc::clone(&auth_service), library);

        Self {
            router: router(state),
            catalog,
            auth_service,
            cache,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request and return the status with the body as JSON (or a JSON string)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Register an account and return its token
    pub async fn register(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/auth/register",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["token"].as_str().expect("token in response").to_string()
    }
}

/// Test fixture: a track with lyrics in the given languages
pub fn track_with_lyrics(id: &str, lyrics: &[(&str, &str)]) -> Track {
    Track {
        id: id.to_string(),
        user_id: "default".to_string(),
        title: format!("Track {id}"),
        duration: HumanDuration::from_secs(200),
        lyrics: lyrics
            .iter()
            .map(|(lang, text)| (lang.to_string(), text.to_string()))
            .collect::<LanguageMap>(),
        ..Track::default()
    }
}
