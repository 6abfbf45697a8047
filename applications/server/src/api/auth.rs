/// Account API routes
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::auth::{hash_password, verify_password},
    state::AppState,
};
use axum::{extract::State, Json};
use chrono::Utc;
use libra_core::{generate_id, User};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Always reserved, in addition to `general.reserved_usernames`
const BUILTIN_RESERVED: &[&str] = &["default"];

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn is_reserved(username: &str, configured: &[String]) -> bool {
    BUILTIN_RESERVED
        .iter()
        .copied()
        .chain(configured.iter().map(String::as_str))
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
}

/// Run bcrypt off the async workers
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("password task failed: {e}")))?
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>> {
    let config = &state.config;
    if config.auth.disable_account_creation {
        return Err(ServerError::BadRequest(
            "account creation is disabled".to_string(),
        ));
    }

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();
    if username.is_empty() {
        return Err(ServerError::BadRequest("username is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(ServerError::BadRequest("password is required".to_string()));
    }
    if is_reserved(&username, &config.general.reserved_usernames) {
        return Err(ServerError::BadRequest("username is reserved".to_string()));
    }

    let catalog = state.library.catalog();
    if catalog.username_exists(&username).await? {
        return Err(ServerError::BadRequest(
            "username already exists".to_string(),
        ));
    }
    if !email.is_empty() && catalog.email_exists(&email).await? {
        return Err(ServerError::BadRequest("email already exists".to_string()));
    }

    let password = req.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = User {
        id: generate_id(config.general.id_length),
        display_name: username.clone(),
        username,
        email,
        creation_date: Utc::now().timestamp(),
        ..User::default()
    };
    let user_id = user.id.clone();
    catalog
        .create_user(&user.into_database_user(password_hash))
        .await?;

    let token = state.auth_service.issue_token(&user_id)?;
    tracing::info!(user_id = %user_id, "account registered");

    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let user = match state
        .library
        .catalog()
        .get_user_by_username(req.username.trim())
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            return Err(ServerError::NotFound("user not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let hash = user.password_hash.clone();
    let password = req.password;
    if !blocking(move || verify_password(&hash, &password)).await? {
        return Err(ServerError::Unauthenticated(
            "incorrect password".to_string(),
        ));
    }

    let token = state.auth_service.issue_token(&user.user.id)?;
    tracing::debug!(user_id = %user.user.id, "login");

    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/logout
///
/// The token is blacklisted before the response is sent.
pub async fn logout(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<Value>> {
    state.auth_service.revoke(&caller.token).await?;
    tracing::debug!(user_id = %caller.user_id, "logout");
    Ok(Json(json!({ "message": "logged out" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_are_case_insensitive() {
        let configured = vec!["admin".to_string()];
        assert!(is_reserved("default", &configured));
        assert!(is_reserved("ADMIN", &configured));
        assert!(!is_reserved("alice", &configured));
    }
}
