// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava stats card route.

use crate::services::StravaCard;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/strava", get(get_card))
}

/// Live stats when available, otherwise the profile link.
async fn get_card(State(state): State<Arc<AppState>>) -> Json<StravaCard> {
    Json(state.strava.fetch_card().await)
}
