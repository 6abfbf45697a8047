/// Listing and search routes
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use libra_core::Playable;
use libra_sources::SearchFilters;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    /// 0 uses the server maximum
    #[serde(default)]
    pub limit: usize,
    #[serde(default = "first_page")]
    pub page: usize,
    /// Comma-separated kinds, e.g. `tracks,albums`
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub allow_videos: Option<bool>,
}

fn first_page() -> usize {
    1
}

impl SearchQuery {
    pub fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new();
        if let Some(types) = &self.types {
            filters.insert("types", types.clone());
        }
        if let Some(allow) = self.allow_videos {
            filters.insert("allow_videos", allow);
        }
        filters
    }
}

/// GET /api/v1/playables
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Playable>>> {
    Ok(Json(state.library.all_playables().await?))
}

/// GET /api/v1/playables/:user_id
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    caller: Option<AuthenticatedUser>,
) -> Result<Json<Vec<Playable>>> {
    if state.config.auth.user_api_require_same_user {
        match &caller {
            Some(caller) if caller.user_id == user_id => {}
            Some(_) => {
                return Err(ServerError::Forbidden(
                    "cannot list another user's playables".to_string(),
                ));
            }
            None => {
                return Err(ServerError::Unauthenticated(
                    "Missing or malformed JWT".to_string(),
                ));
            }
        }
    }

    Ok(Json(state.library.user_playables(&user_id).await?))
}

/// GET /api/v1/search
///
/// Sources still running when the client goes away are cancelled.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Playable>> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = state
        .library
        .search(&query.q, query.limit, query.page, &query.filters(), &cancel)
        .await;
    Json(outcome.results)
}
