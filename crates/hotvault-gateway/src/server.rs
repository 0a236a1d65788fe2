// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and the HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use hotvault_config::model::ServerConfig;
use hotvault_core::HotvaultError;
use hotvault_netguard::Gatekeeper;
use hotvault_vault::VaultService;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::guard::gatekeeper_middleware;
use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<VaultService>,
    pub gatekeeper: Arc<Gatekeeper>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("vault", &"<VaultService>")
            .field("gatekeeper", &self.gatekeeper)
            .finish()
    }
}

/// Build the full application router.
///
/// The gatekeeper wraps every route and the fallback, so unknown paths are
/// denied to outsiders too. The router expects `ConnectInfo<SocketAddr>`.
pub fn router(state: AppState) -> Router {
    let gatekeeper = Arc::clone(&state.gatekeeper);

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/check", get(handlers::check));

    let secret_routes = Router::new()
        .route("/api/apps", get(handlers::list_apps))
        .route("/api/secrets/store", post(handlers::store_secret))
        .route("/api/secrets/retrieve", post(handlers::retrieve_secret))
        .route("/api/secrets/update", post(handlers::update_secret))
        .route(
            "/api/secrets/metadata/{app_name}",
            get(handlers::secret_metadata),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(auth_routes)
        .merge(secret_routes)
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            gatekeeper,
            gatekeeper_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `host:port` and serve until `cancel` fires, then drain in-flight
/// requests.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    cancel: CancellationToken,
) -> Result<(), HotvaultError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HotvaultError::Config(format!("failed to bind {addr}: {e}")))?;

    info!("Hotvault listening on {addr}");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await
    .map_err(|e| HotvaultError::Internal(format!("server error: {e}")))?;

    info!("Hotvault server stopped");
    Ok(())
}
