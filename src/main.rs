// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Walk-Journal API Server
//!
//! Personal walking journal: daily entries with route, heart rate and meal
//! photos, dashboard aggregates and an optional Strava stats card.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walk_journal::{
    config::Config,
    db::EntryStore,
    services::{ImageNormalizer, JournalService, StravaService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Walk-Journal API");

    // Entry store: hosted table if configured, otherwise in-memory
    let store = match &config.store {
        Some(store_config) => EntryStore::rest(store_config)?,
        None => {
            tracing::warn!("STORE_URL not set, entries are kept in memory only");
            EntryStore::in_memory()
        }
    };

    let journal = JournalService::new(
        store,
        ImageNormalizer::new(config.image),
        config.challenge_target_days,
    );

    // Initial load. A failure leaves an empty journal; /api/entries/reload retries.
    let view = journal.load().await;
    tracing::info!(
        count = view.entry_count,
        error = ?view.load_error,
        "Initial entry load finished"
    );

    let strava = StravaService::new(&config);
    tracing::info!(
        configured = strava.is_configured(),
        "Strava service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        journal,
        strava,
    });

    // Build router
    let app = walk_journal::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("walk_journal=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
