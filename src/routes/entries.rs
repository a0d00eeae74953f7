// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry list, selection and summary routes.

use crate::error::Result;
use crate::models::{ActivityEntry, EntryId, Summary};
use crate::services::JournalView;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Read-only routes (no write session needed).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/entries", get(list_entries))
        .route("/api/entries/reload", post(reload_entries))
        .route("/api/entries/{id}", get(select_entry))
        .route("/api/selection", delete(clear_selection))
        .route("/api/summary", get(get_summary))
}

/// Mutating routes. The auth middleware is applied in routes/mod.rs.
pub fn write_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/entries/{id}", delete(delete_entry))
}

// ─── Reads ───────────────────────────────────────────────────

async fn list_entries(State(state): State<Arc<AppState>>) -> Json<JournalView> {
    Json(state.journal.view())
}

/// Re-run the initial load against the store.
async fn reload_entries(State(state): State<Arc<AppState>>) -> Json<JournalView> {
    Json(state.journal.load().await)
}

/// Open the read-only detail view of one entry.
async fn select_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActivityEntry>> {
    let entry = state.journal.select(&EntryId::new(id))?;
    Ok(Json(entry))
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.journal.clear_selection();
    StatusCode::NO_CONTENT
}

async fn get_summary(State(state): State<Arc<AppState>>) -> Json<Summary> {
    Json(state.journal.summary())
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    confirm: bool,
}

async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode> {
    state
        .journal
        .delete(&EntryId::new(id), params.confirm)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
