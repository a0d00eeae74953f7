// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Image could not be processed: {0}")]
    ImageProcessing(String),

    #[error("Images are still being processed")]
    ImagesPending,

    #[error("Entry store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Entry store write failed: {0}")]
    StoreWrite(String),

    #[error("Strava credentials are not configured")]
    CredentialsMissing,

    #[error("Strava authentication failed: {0}")]
    StravaAuth(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when Strava answers 429.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";
    /// Message used when Strava rejects the bearer token.
    pub const STRAVA_TOKEN_ERROR: &'static str = "Invalid or expired access token";

    /// Whether this error means the Strava bearer token is no longer usable.
    pub fn is_strava_token_error(&self) -> bool {
        match self {
            AppError::StravaAuth(_) => true,
            AppError::StravaApi(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("token") || msg.contains("invalid") || msg.contains("unauthorized")
            }
            _ => false,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::ImageProcessing(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "image_processing_error",
                Some(msg.clone()),
            ),
            AppError::ImagesPending => (StatusCode::CONFLICT, "images_processing", None),
            AppError::StoreUnavailable(msg) => {
                tracing::warn!(error = %msg, "Entry store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    Some(msg.clone()),
                )
            }
            AppError::StoreWrite(msg) => {
                tracing::warn!(error = %msg, "Entry store write failed");
                (StatusCode::BAD_GATEWAY, "store_write_error", Some(msg.clone()))
            }
            AppError::CredentialsMissing => {
                (StatusCode::SERVICE_UNAVAILABLE, "credentials_missing", None)
            }
            AppError::StravaAuth(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_auth_error", Some(msg.clone()))
            }
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
