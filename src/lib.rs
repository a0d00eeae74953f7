// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Walk-Journal: a personal walking and meal journal
//!
//! This crate provides the backend API for logging daily walks, normalizing
//! attached photos, persisting entries to a hosted table and computing the
//! dashboard aggregates.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{JournalService, StravaService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub journal: JournalService,
    pub strava: StravaService,
}
