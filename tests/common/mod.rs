// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use walk_journal::config::{Config, StoreConfig};
use walk_journal::db::EntryStore;
use walk_journal::middleware::auth::{create_session_token, SESSION_COOKIE};
use walk_journal::routes::create_router;
use walk_journal::services::{ImageNormalizer, JournalService, StravaService};
use walk_journal::AppState;

/// Hosted store settings from the environment, if a live store is available.
#[allow(dead_code)]
pub fn live_store_config() -> Option<StoreConfig> {
    let url = std::env::var("STORE_URL").ok()?;
    let api_key = std::env::var("STORE_API_KEY").ok()?;
    Some(StoreConfig {
        url,
        api_key,
        table: std::env::var("STORE_TABLE").unwrap_or_else(|_| "entries".to_string()),
    })
}

/// Skip test with message if no live store is configured.
#[macro_export]
macro_rules! require_live_store {
    () => {
        match crate::common::live_store_config() {
            Some(config) => config,
            None => {
                eprintln!("⚠️  Skipping: STORE_URL / STORE_API_KEY not set");
                return;
            }
        }
    };
}

/// Create a test app backed by the given store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with_store(store: EntryStore) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let journal = JournalService::new(
        store,
        ImageNormalizer::new(config.image),
        config.challenge_target_days,
    );
    let strava = StravaService::new(&config);

    let state = Arc::new(AppState {
        config,
        journal,
        strava,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with an empty in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(EntryStore::in_memory())
}

/// `Cookie` header value carrying a valid write session.
#[allow(dead_code)]
pub fn session_cookie(state: &AppState) -> String {
    let token = create_session_token(&state.config.jwt_signing_key).unwrap();
    format!("{}={}", SESSION_COOKIE, token)
}

/// Request builder with a write session attached.
#[allow(dead_code)]
pub fn authed(state: &AppState, method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, session_cookie(state))
}

/// Send a request and return status plus parsed JSON body (Null if empty).
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (Response<Body>, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, 1024 * 1024 * 16).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (Response::from_parts(parts, Body::empty()), json)
}

/// JSON request body.
#[allow(dead_code)]
pub fn json_body(value: serde_json::Value) -> Body {
    Body::from(serde_json::to_vec(&value).unwrap())
}

/// Generated PNG of the given size.
#[allow(dead_code)]
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Poll the draft until nothing is processing.
#[allow(dead_code)]
pub async fn wait_for_draft(app: &axum::Router, state: &AppState) -> serde_json::Value {
    for _ in 0..200 {
        let (_, status) = send(
            app,
            authed(state, "GET", "/api/draft").body(Body::empty()).unwrap(),
        )
        .await;
        if status["processing"] == false {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("draft images never finished processing");
}
