// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregate;
pub mod builder;
pub mod draft;
pub mod image;
pub mod journal;
pub mod strava;

pub use builder::{build_entry, EntryForm, EntryImages};
pub use draft::{DraftStatus, EntryDraft, ImageSlot};
pub use image::ImageNormalizer;
pub use journal::{JournalService, JournalView};
pub use strava::{StravaCard, StravaClient, StravaService};
