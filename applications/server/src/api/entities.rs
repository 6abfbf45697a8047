/// Per-entity routes under /api/v1/{kind}/{id}
use crate::{
    error::{Result, ServerError},
    services::TextLookup,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use libra_core::{Album, LibraError, Playable, PlayableKind, Track};

/// Kinds addressable by singular name in the URL
fn parse_kind(name: &str) -> Result<PlayableKind> {
    PlayableKind::CATALOG
        .into_iter()
        .find(|kind| kind.as_str() == name)
        .ok_or_else(|| ServerError::NotFound(format!("unknown kind {name:?}")))
}

fn unsupported(kind: PlayableKind) -> ServerError {
    LibraError::UnsupportedMediaType(kind.to_string()).into()
}

/// GET /api/v1/:kind/:id
pub async fn get_entity(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Playable>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.library.get(kind, &id).await?))
}

/// GET /api/v1/{album|playlist|artist}/:id/tracks
pub async fn tracks(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Vec<Track>>> {
    let tracks = match parse_kind(&kind)? {
        PlayableKind::Album => state.library.album_tracks(&id).await?,
        PlayableKind::Playlist => state.library.playlist_tracks(&id).await?,
        PlayableKind::Artist => state.library.artist_tracks(&id).await?,
        other => return Err(unsupported(other)),
    };
    Ok(Json(tracks))
}

/// GET /api/v1/artist/:id/albums
pub async fn albums(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Vec<Album>>> {
    match parse_kind(&kind)? {
        PlayableKind::Artist => Ok(Json(state.library.artist_albums(&id).await?)),
        other => Err(unsupported(other)),
    }
}

/// GET /api/v1/{track|video}/:id/is_stored
pub async fn is_stored(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<bool>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.library.is_stored(kind, &id).await?))
}

/// GET /api/v1/{track|video}/:id/content
pub async fn content(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Response> {
    let kind = parse_kind(&kind)?;
    let content = state.library.content(kind, &id).await?;
    let mime = mime_guess::from_path(&content.path).first_or_octet_stream();

    Ok(([(CONTENT_TYPE, mime.to_string())], content.bytes).into_response())
}

async fn text(
    state: &AppState,
    kind: &str,
    id: &str,
    lang: Option<&str>,
    subtitles_only: bool,
) -> Result<Json<TextLookup>> {
    let lookup = match parse_kind(kind)? {
        PlayableKind::Track if !subtitles_only => state.library.track_lyrics(id, lang).await?,
        PlayableKind::Video => state.library.video_subtitles(id, lang).await?,
        other => return Err(unsupported(other)),
    };
    Ok(Json(lookup))
}

/// GET /api/v1/{track|video}/:id/lyrics
///
/// For videos this is an alias of `/subtitles`.
pub async fn lyrics(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<TextLookup>> {
    text(&state, &kind, &id, None, false).await
}

/// GET /api/v1/{track|video}/:id/lyrics/:lang
pub async fn lyrics_in(
    State(state): State<AppState>,
    Path((kind, id, lang)): Path<(String, String, String)>,
) -> Result<Json<TextLookup>> {
    text(&state, &kind, &id, Some(&lang), false).await
}

/// GET /api/v1/video/:id/subtitles
pub async fn subtitles(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<TextLookup>> {
    text(&state, &kind, &id, None, true).await
}

/// GET /api/v1/video/:id/subtitles/:lang
pub async fn subtitles_in(
    State(state): State<AppState>,
    Path((kind, id, lang)): Path<(String, String, String)>,
) -> Result<Json<TextLookup>> {
    text(&state, &kind, &id, Some(&lang), true).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_singular_catalog_kinds_route() {
        assert_eq!(parse_kind("track").unwrap(), PlayableKind::Track);
        assert_eq!(parse_kind("playlist").unwrap(), PlayableKind::Playlist);
        assert!(parse_kind("tracks").is_err());
        assert!(parse_kind("user").is_err());
    }
}
