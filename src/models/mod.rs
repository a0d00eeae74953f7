// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod entry;
pub mod field;
pub mod stats;

pub use entry::{
    total_calories, ActivityEntry, EntryId, HeartRate, Meal, MealSlot, NewEntry, NormalizedImage,
};
pub use field::{non_negative, RawField};
pub use stats::{Summary, Trend, TrendPoint};
