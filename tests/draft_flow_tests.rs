// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry creation through the draft routes: open, attach images, submit.

use axum::{
    body::Body,
    http::{header, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::GenericImageView;
use serde_json::json;

mod common;

fn form() -> serde_json::Value {
    json!({
        "date": "2024-01-01",
        "label": "Day 1",
        "routeName": "Morning Park Loop",
        "distanceKm": "3.5",
        "durationMin": 42,
        "heartRate": { "start": "72", "train": "", "rest": 65 },
        "mealCalories": [300, "500", "abc"]
    })
}

#[tokio::test]
async fn test_full_creation_flow() {
    let (app, state) = common::create_test_app();

    let (response, status) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status["canSubmit"], true);
    assert_eq!(status["slots"].as_array().unwrap().len(), 4);

    let (response, _) = common::send(
        &app,
        common::authed(&state, "PUT", "/api/draft/images/route")
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(common::png_fixture(800, 600)))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let (response, _) = common::send(
        &app,
        common::authed(&state, "PUT", "/api/draft/images/dinner")
            .body(Body::from(common::png_fixture(120, 90)))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let status = common::wait_for_draft(&app, &state).await;
    assert_eq!(status["canSubmit"], true);
    assert_eq!(status["slots"][0]["state"], "ready");
    assert_eq!(status["slots"][3]["state"], "ready");

    let (response, entry) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(common::json_body(form()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(entry["distanceKm"], 3.5);
    assert_eq!(entry["durationMin"], 42.0);
    assert_eq!(entry["totalCalories"], 800);
    assert_eq!(entry["heartRate"]["start"], 72);
    assert_eq!(entry["heartRate"]["train"], serde_json::Value::Null);
    assert_eq!(entry["meals"][2]["calories"], 0);
    assert_eq!(entry["meals"][0]["image"], serde_json::Value::Null);

    let uri = entry["routeImage"].as_str().unwrap();
    let payload = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
    let decoded = image::load_from_memory(&STANDARD.decode(payload).unwrap()).unwrap();
    assert_eq!(decoded.dimensions(), (400, 300));

    let dinner = entry["meals"][2]["image"].as_str().unwrap();
    assert!(dinner.starts_with("data:image/jpeg;base64,"));

    // The draft closes once the entry is persisted
    let (response, _) = common::send(
        &app,
        common::authed(&state, "GET", "/api/draft")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.journal.entries().len(), 1);
}

#[tokio::test]
async fn test_undecodable_image_blocks_submit_until_removed() {
    let (app, state) = common::create_test_app();
    state.journal.open_draft();

    common::send(
        &app,
        common::authed(&state, "PUT", "/api/draft/images/lunch")
            .body(Body::from("this is not an image"))
            .unwrap(),
    )
    .await;

    let status = common::wait_for_draft(&app, &state).await;
    assert_eq!(status["canSubmit"], false);
    assert_eq!(status["slots"][2]["state"], "failed");
    assert!(status["slots"][2]["error"].is_string());

    let (response, body) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(common::json_body(form()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "image_processing_error");
    assert!(state.journal.entries().is_empty());

    let (response, status) = common::send(
        &app,
        common::authed(&state, "DELETE", "/api/draft/images/lunch")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status["canSubmit"], true);

    let (response, _) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(common::json_body(form()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_submit_without_draft() {
    let (app, state) = common::create_test_app();

    let (response, body) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(common::json_body(form()))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_missing_required_field_keeps_draft() {
    let (app, state) = common::create_test_app();
    state.journal.open_draft();

    let mut incomplete = form();
    incomplete["routeName"] = json!("  ");

    let (response, body) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(common::json_body(incomplete))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(state.journal.draft_status().is_ok());
}

#[tokio::test]
async fn test_unknown_slot() {
    let (app, state) = common::create_test_app();
    state.journal.open_draft();

    let (response, _) = common::send(
        &app,
        common::authed(&state, "PUT", "/api/draft/images/snack")
            .body(Body::from(common::png_fixture(10, 10)))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_discards_draft() {
    let (app, state) = common::create_test_app();
    state.journal.open_draft();

    common::send(
        &app,
        common::authed(&state, "PUT", "/api/draft/images/breakfast")
            .body(Body::from(common::png_fixture(1600, 1200)))
            .unwrap(),
    )
    .await;

    let (response, _) = common::send(
        &app,
        common::authed(&state, "DELETE", "/api/draft")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (response, _) = common::send(
        &app,
        common::authed(&state, "POST", "/api/draft/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(common::json_body(form()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(state.journal.entries().is_empty());
}

#[tokio::test]
async fn test_draft_routes_require_session() {
    let (app, _) = common::create_test_app();

    let (response, _) = common::send(
        &app,
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/draft")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
