// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON route handlers.
//!
//! Request bodies tolerate missing fields (they default to empty) so that the
//! vault reports them as usage errors with a consistent 400 body.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hotvault_core::{HotvaultError, SessionId};
use hotvault_storage::{AppSummary, SecretMetadata};
use hotvault_vault::{StoreSecret, UpdateSecret, VaultService};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::server::AppState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "hotvault_session";

const MISSING_SESSION: &str = "missing session credentials; please login again";

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub app_username: String,
    #[serde(default)]
    pub secret_text: String,
    #[serde(default)]
    pub passphrase: String,
}

#[derive(Deserialize)]
pub struct RetrieveRequest {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub passphrase: String,
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub passphrase: String,
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AppsResponse {
    pub apps: Vec<AppSummary>,
}

#[derive(Serialize)]
pub struct RetrieveResponse {
    pub success: bool,
    pub secret: String,
    pub app_username: String,
    pub timestamp: String,
}

/// Run a vault call on the blocking pool; PBKDF2 would otherwise stall the
/// async workers.
async fn with_vault<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&VaultService) -> Result<T, HotvaultError> + Send + 'static,
{
    let vault = Arc::clone(&state.vault);
    tokio::task::spawn_blocking(move || call(&vault))
        .await
        .map_err(|e| HotvaultError::Internal(format!("vault task failed: {e}")))?
        .map_err(ApiError)
}

fn session_cookie(session_id: &SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

/// The session id from the cookie. A missing or malformed cookie is treated
/// like an expired session.
fn session_from(jar: &CookieJar) -> Result<SessionId, ApiError> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::parse(cookie.value()).ok())
        .ok_or_else(|| ApiError(HotvaultError::Authentication(MISSING_SESSION.into())))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.clone();
    let session_id =
        with_vault(&state, move |vault| vault.register(&body.username, &body.password)).await?;
    Ok((
        jar.add(session_cookie(&session_id)),
        Json(AuthResponse {
            success: true,
            username,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.clone();
    let session_id =
        with_vault(&state, move |vault| vault.login(&body.username, &body.password)).await?;
    Ok((
        jar.add(session_cookie(&session_id)),
        Json(AuthResponse {
            success: true,
            username,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds; the cookie is dropped even if no server entry existed.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(session_id) = session_from(&jar) {
        with_vault(&state, move |vault| vault.logout(&session_id)).await?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "success": true }))))
}

/// GET /api/auth/check
pub async fn check(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let Ok(session_id) = session_from(&jar) else {
        return Ok(Json(json!({ "authenticated": false })));
    };
    let user = with_vault(&state, move |vault| vault.session_user(&session_id)).await?;
    Ok(Json(match user {
        Some(username) => json!({ "authenticated": true, "username": username }),
        None => json!({ "authenticated": false }),
    }))
}

/// GET /api/apps
pub async fn list_apps(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AppsResponse>, ApiError> {
    let session_id = session_from(&jar)?;
    let apps = with_vault(&state, move |vault| vault.list_apps(&session_id)).await?;
    Ok(Json(AppsResponse { apps }))
}

/// POST /api/secrets/store
pub async fn store_secret(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<StoreRequest>,
) -> Result<Json<Value>, ApiError> {
    let session_id = session_from(&jar)?;
    let request = StoreSecret {
        app_name: body.app_name,
        app_username: body.app_username,
        secret_text: SecretString::from(body.secret_text),
        passphrase: SecretString::from(body.passphrase),
    };
    with_vault(&state, move |vault| vault.store_secret(&session_id, request)).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/secrets/retrieve
pub async fn retrieve_secret(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let session_id = session_from(&jar)?;
    let passphrase = SecretString::from(body.passphrase);
    let app_name = body.app_name;
    let retrieved = with_vault(&state, move |vault| {
        vault.retrieve_secret(&session_id, &app_name, &passphrase)
    })
    .await?;
    Ok(Json(RetrieveResponse {
        success: true,
        secret: retrieved.secret.expose_secret().to_string(),
        app_username: retrieved.app_username,
        timestamp: retrieved.timestamp,
    }))
}

/// POST /api/secrets/update
pub async fn update_secret(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let session_id = session_from(&jar)?;
    let request = UpdateSecret {
        app_name: body.app_name,
        passphrase: SecretString::from(body.passphrase),
        key_path: body.key_path,
        value: body.value,
    };
    let updated = with_vault(&state, move |vault| vault.update_secret(&session_id, request)).await?;
    Ok(Json(json!({ "success": true, "updated_secret": updated })))
}

/// GET /api/secrets/metadata/{app_name}
pub async fn secret_metadata(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(app_name): Path<String>,
) -> Result<Json<SecretMetadata>, ApiError> {
    let session_id = session_from(&jar)?;
    debug!(%app_name, "metadata requested");
    let metadata =
        with_vault(&state, move |vault| vault.secret_metadata(&session_id, &app_name)).await?;
    Ok(Json(metadata))
}
