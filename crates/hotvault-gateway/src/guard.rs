// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gatekeeper middleware.
//!
//! Runs before routing for every request. The decision is made on the TCP
//! peer address only; forwarding headers are ignored.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hotvault_core::HotvaultError;
use hotvault_netguard::Gatekeeper;

use crate::error::ApiError;

pub async fn gatekeeper_middleware(
    State(gatekeeper): State<Arc<Gatekeeper>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let ip = remote.ip().to_canonical();
    if !gatekeeper.is_request_allowed(ip).await {
        return ApiError(HotvaultError::AccessDenied { ip }).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use hotvault_netguard::{DetectionStrategy, PeerRegistry, SubnetDetector};
    use tower::ServiceExt;

    use super::*;

    fn guarded(remote: &str) -> Router {
        let gatekeeper = Arc::new(Gatekeeper::new(
            SubnetDetector::new(vec![DetectionStrategy::new("none", || None)]),
            PeerRegistry::new(vec![]),
            Duration::from_secs(2),
        ));
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(gatekeeper, gatekeeper_middleware))
            .layer(MockConnectInfo(remote.parse::<SocketAddr>().unwrap()))
    }

    #[tokio::test]
    async fn denial_is_reported_as_access_denied() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = guarded("203.0.113.9:50000").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let expected = HotvaultError::AccessDenied {
            ip: IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)),
        };
        assert_eq!(body["error"], expected.to_string());
    }

    #[tokio::test]
    async fn loopback_passes_through() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = guarded("127.0.0.1:40000").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
