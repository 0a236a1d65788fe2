// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`HotvaultError`] to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hotvault_core::HotvaultError;
use serde::Serialize;
use tracing::error;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// A handler failure. Server-side faults are logged and replaced by a
/// generic message so paths and I/O details never reach the client.
#[derive(Debug)]
pub struct ApiError(pub HotvaultError);

impl From<HotvaultError> for ApiError {
    fn from(e: HotvaultError) -> Self {
        Self(e)
    }
}

pub fn status_for(error: &HotvaultError) -> StatusCode {
    match error {
        HotvaultError::Usage(_) => StatusCode::BAD_REQUEST,
        HotvaultError::Authentication(_) => StatusCode::UNAUTHORIZED,
        HotvaultError::AlreadyExists(_) => StatusCode::CONFLICT,
        HotvaultError::NotFound(_) => StatusCode::NOT_FOUND,
        HotvaultError::Decryption | HotvaultError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        HotvaultError::Storage { .. }
        | HotvaultError::Crypto(_)
        | HotvaultError::Config(_)
        | HotvaultError::Timeout { .. }
        | HotvaultError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status.is_server_error() {
            error!(error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let response = ApiError(HotvaultError::NotFound("no secret stored for `s3`".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn status_table() {
        let ip = "10.0.0.9".parse().unwrap();
        let cases = [
            (HotvaultError::Usage("x".into()), StatusCode::BAD_REQUEST),
            (HotvaultError::Authentication("x".into()), StatusCode::UNAUTHORIZED),
            (HotvaultError::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (HotvaultError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (HotvaultError::Decryption, StatusCode::FORBIDDEN),
            (HotvaultError::AccessDenied { ip }, StatusCode::FORBIDDEN),
            (HotvaultError::Crypto("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                HotvaultError::Timeout {
                    duration: std::time::Duration::from_secs(1),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(status_for(&error), expected, "{error}");
        }
    }

    #[test]
    fn storage_details_are_hidden() {
        let err = HotvaultError::storage(std::io::Error::other("/srv/hotvault/db/carol: EIO"));
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
