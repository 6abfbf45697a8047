/// HTTP API
///
/// ```text
/// GET  /                         descriptor (Accept: application/json) or banner
/// GET  /source, /meta
/// POST /api/auth/{register,login,logout}
/// GET  /api/v1/playables[/{user_id}], /api/v1/search
/// GET  /api/v1/{kind}/{id}[/tracks|/albums|/is_stored|/content|/lyrics[/{lang}]|/subtitles[/{lang}]]
/// ```
pub mod auth;
pub mod entities;
pub mod info;
pub mod playables;

use crate::{middleware, state::AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth)),
        );

    // Lists and search
    let global_routes = Router::new()
        .route("/playables", get(playables::list_all))
        .route("/search", get(playables::search))
        .route_layer(from_fn_with_state(state.clone(), middleware::global_api_auth));

    // Per-user and per-entity
    let user_routes = Router::new()
        .route("/playables/:user_id", get(playables::list_for_user))
        .route("/:kind/:id", get(entities::get_entity))
        .route("/:kind/:id/tracks", get(entities::tracks))
        .route("/:kind/:id/albums", get(entities::albums))
        .route("/:kind/:id/is_stored", get(entities::is_stored))
        .route("/:kind/:id/content", get(entities::content))
        .route("/:kind/:id/lyrics", get(entities::lyrics))
        .route("/:kind/:id/lyrics/:lang", get(entities::lyrics_in))
        .route("/:kind/:id/subtitles", get(entities::subtitles))
        .route("/:kind/:id/subtitles/:lang", get(entities::subtitles_in))
        .route_layer(from_fn_with_state(state.clone(), middleware::user_api_auth));

    Router::new()
        .route("/", get(info::root))
        .route("/source", get(info::descriptor))
        .route("/meta", get(info::meta))
        .nest("/api/auth", auth_routes)
        .nest("/api/v1", global_routes.merge(user_routes))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
