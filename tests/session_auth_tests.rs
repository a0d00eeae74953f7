// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Write-session tests.
//!
//! The session gate is cosmetic, but it still has to behave consistently:
//! the cookie minted by `/session` must be accepted by the middleware, and
//! removal must use the same attributes as creation.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::json;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn open_session(passphrase: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(common::json_body(json!({ "passphrase": passphrase })))
        .unwrap()
}

#[tokio::test]
async fn test_wrong_passphrase_rejected() {
    let (app, _) = common::create_test_app();

    let (response, body) = common::send(&app, open_session("guess")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert!(set_cookie_headers(&response).is_empty());
}

#[tokio::test]
async fn test_session_cookie_opens_write_routes() {
    let (app, state) = common::create_test_app();

    let (response, _) = common::send(&app, open_session(&state.config.write_passphrase)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cookies = set_cookie_headers(&response);
    let session = cookies
        .iter()
        .find(|c| c.starts_with("journal_session="))
        .expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(session.contains("SameSite=Lax"));
    assert!(session.contains("Path=/"));
    assert!(session.contains("Max-Age=43200"));
    assert!(!session.contains("Secure"));

    let pair = session.split(';').next().unwrap().to_string();
    let (response, _) = common::send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/draft")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let (app, state) = common::create_test_app();
    let token =
        walk_journal::middleware::auth::create_session_token(&state.config.jwt_signing_key)
            .unwrap();

    let (response, _) = common::send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/draft")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forged_token_rejected() {
    let (app, _) = common::create_test_app();
    let token =
        walk_journal::middleware::auth::create_session_token(b"not_the_configured_signing_key!!")
            .unwrap();

    let (response, _) = common::send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/draft")
            .header(header::COOKIE, format!("journal_session={}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_removes_cookie() {
    let (app, _) = common::create_test_app();

    let (response, _) = common::send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/session/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookie_headers(&response);
    let removal = cookies
        .iter()
        .find(|c| c.starts_with("journal_session="))
        .expect("removal cookie");
    assert!(removal.contains("Max-Age=0"));
    assert!(removal.contains("HttpOnly"));
    assert!(removal.contains("Path=/"));
}

#[tokio::test]
async fn test_reads_need_no_session() {
    let (app, _) = common::create_test_app();

    for uri in ["/api/entries", "/api/summary", "/api/strava"] {
        let (response, _) = common::send(
            &app,
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}
