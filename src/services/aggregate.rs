// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary statistics over the entry set.
//!
//! Everything here is a pure function of the entries passed in. Callers hand
//! over entries already sorted by date ascending (the journal keeps them that
//! way); the trend relies on that order.

use crate::config::TREND_WINDOW;
use crate::models::stats::{Summary, Trend, TrendPoint};
use crate::models::ActivityEntry;
use crate::time_utils::short_date;

/// Compute all dashboard aggregates.
pub fn summarize(entries: &[ActivityEntry], challenge_target_days: u32) -> Summary {
    let total_distance_km = total_distance(entries);
    let total_duration_min = total_duration(entries);

    Summary {
        entry_count: entries.len() as u32,
        total_distance_km,
        longest_distance_km: longest_distance(entries),
        total_duration_min,
        average_pace: average_pace(total_duration_min, total_distance_km),
        progress_percent: progress_percent(entries.len(), challenge_target_days),
        challenge_target_days,
        trend: trend(entries),
    }
}

pub fn total_distance(entries: &[ActivityEntry]) -> f64 {
    entries.iter().map(ActivityEntry::distance_km).sum()
}

/// Longest single distance; 0 for an empty set.
pub fn longest_distance(entries: &[ActivityEntry]) -> f64 {
    entries
        .iter()
        .map(ActivityEntry::distance_km)
        .fold(0.0, f64::max)
}

pub fn total_duration(entries: &[ActivityEntry]) -> f64 {
    entries.iter().map(ActivityEntry::duration_min).sum()
}

/// Minutes per kilometre rounded to one decimal place.
///
/// Defined as 0 when no distance has been logged, whatever the duration.
pub fn average_pace(total_duration_min: f64, total_distance_km: f64) -> f64 {
    if total_distance_km <= 0.0 {
        return 0.0;
    }
    round_1dp(total_duration_min / total_distance_km)
}

/// `min(count / target * 100, 100)`. A zero target counts as complete.
pub fn progress_percent(entry_count: usize, challenge_target_days: u32) -> f64 {
    if challenge_target_days == 0 {
        return 100.0;
    }
    (entry_count as f64 / challenge_target_days as f64 * 100.0).min(100.0)
}

/// The last `TREND_WINDOW` entries as `(short date, distance)` points.
pub fn trend(entries: &[ActivityEntry]) -> Trend {
    if entries.len() < 2 {
        return Trend::InsufficientData;
    }

    let start = entries.len().saturating_sub(TREND_WINDOW);
    let points = entries[start..]
        .iter()
        .map(|entry| TrendPoint {
            date: short_date(entry.date()),
            distance_km: entry.distance_km(),
        })
        .collect();

    Trend::Series { points }
}

fn round_1dp(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
