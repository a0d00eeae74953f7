// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Write-session routes.
//!
//! The passphrase gate only discourages accidental edits from a shared
//! browser. It is not access control.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_token, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", post(open_session))
        .route("/session/logout", post(logout))
}

#[derive(Deserialize)]
struct SessionRequest {
    passphrase: String,
}

/// Exchange the passphrase for a session cookie.
async fn open_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SessionRequest>,
) -> Result<(StatusCode, CookieJar)> {
    let expected = state.config.write_passphrase.as_bytes();
    let matches: bool = body.passphrase.trim().as_bytes().ct_eq(expected).into();
    if !matches {
        tracing::warn!("Write session rejected: passphrase mismatch");
        return Err(AppError::Unauthorized);
    }

    let token = create_session_token(&state.config.jwt_signing_key)?;
    tracing::info!("Write session opened");

    let cookie = session_cookie(&state.config.frontend_url, token, SESSION_TTL_SECS as i64);
    Ok((StatusCode::NO_CONTENT, jar.add(cookie)))
}

/// Clear the session cookie. Always succeeds.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let cookie = session_cookie(&state.config.frontend_url, String::new(), 0);
    (StatusCode::NO_CONTENT, jar.add(cookie))
}

/// Session cookie with the same attributes on creation and removal.
/// `Secure` is set whenever the frontend is served over HTTPS.
fn session_cookie(frontend_url: &str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(frontend_url.starts_with("https://"))
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}
