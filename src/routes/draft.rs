// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry-creation routes: open a draft, attach images, submit.
//!
//! Images are uploaded as raw request bodies, one per slot. Normalization
//! runs in the background; clients poll `GET /api/draft` until
//! `canSubmit` is true.

use crate::error::{AppError, Result};
use crate::models::ActivityEntry;
use crate::services::{DraftStatus, EntryForm, ImageSlot};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use std::sync::Arc;

/// Draft routes (require a write session).
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/draft",
            post(open_draft).get(get_draft).delete(cancel_draft),
        )
        .route(
            "/api/draft/images/{slot}",
            put(attach_image)
                .delete(remove_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/draft/submit", post(submit_draft))
}

fn parse_slot(slot: &str) -> Result<ImageSlot> {
    ImageSlot::parse(slot).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown image slot '{}' (expected route, breakfast, lunch or dinner)",
            slot
        ))
    })
}

/// Open a new draft; any previous draft and its images are discarded.
async fn open_draft(State(state): State<Arc<AppState>>) -> Json<DraftStatus> {
    Json(state.journal.open_draft())
}

async fn get_draft(State(state): State<Arc<AppState>>) -> Result<Json<DraftStatus>> {
    Ok(Json(state.journal.draft_status()?))
}

async fn cancel_draft(State(state): State<Arc<AppState>>) -> StatusCode {
    state.journal.cancel_draft();
    StatusCode::NO_CONTENT
}

async fn attach_image(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<DraftStatus>)> {
    let slot = parse_slot(&slot)?;
    if body.is_empty() {
        return Err(AppError::BadRequest("Image body is empty".to_string()));
    }

    let status = state.journal.attach_image(slot, body.to_vec())?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

async fn remove_image(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<Json<DraftStatus>> {
    let slot = parse_slot(&slot)?;
    Ok(Json(state.journal.remove_image(slot)?))
}

/// Build the entry from the submitted form and the draft's images.
async fn submit_draft(
    State(state): State<Arc<AppState>>,
    Json(form): Json<EntryForm>,
) -> Result<(StatusCode, Json<ActivityEntry>)> {
    let entry = state.journal.create(form).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
