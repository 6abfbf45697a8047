/// Service description routes
use crate::{config::ServerConfig, state::AppState};
use axum::{
    extract::State,
    http::{header::ACCEPT, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use libra_core::{SourceType, Version};
use libra_sources::SourceDescriptor;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub version: String,
    #[serde(rename = "database")]
    pub database_engine: String,
}

/// How this server presents itself to other Libra instances
pub fn descriptor_of(config: &ServerConfig) -> SourceDescriptor {
    SourceDescriptor {
        id: config.application.source_id.clone(),
        name: config.application.source_name.clone(),
        version: Version::current(),
        source_types: vec![SourceType::Content, SourceType::Metadata, SourceType::Lyrics],
        media_types: config.application.media_types.clone(),
    }
}

/// GET / - descriptor for JSON clients, a banner otherwise
pub async fn root(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let wants_json = headers
        .get(ACCEPT)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        Json(descriptor_of(&state.config)).into_response()
    } else {
        format!(
            "{} {}\n",
            state.config.application.source_name,
            Version::current()
        )
        .into_response()
    }
}

/// GET /source
pub async fn descriptor(State(state): State<AppState>) -> Json<SourceDescriptor> {
    Json(descriptor_of(&state.config))
}

/// GET /meta
pub async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    Json(MetaResponse {
        version: Version::current().to_string(),
        database_engine: state.library.catalog().engine_name().to_string(),
    })
}
