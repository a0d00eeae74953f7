//! Summary statistics over the journal, as shown on the dashboard cards.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Aggregates over the current entry set.
///
/// Recomputed from scratch whenever the entry set changes; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub entry_count: u32,
    /// Sum of distances (km)
    pub total_distance_km: f64,
    /// Longest single walk (km), 0 when empty
    pub longest_distance_km: f64,
    /// Sum of durations (min)
    pub total_duration_min: f64,
    /// Minutes per km, one decimal place; 0 when no distance was logged
    pub average_pace: f64,
    /// Challenge progress, clamped to 100
    pub progress_percent: f64,
    pub challenge_target_days: u32,
    pub trend: Trend,
}

/// Distance trend for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Trend {
    /// Fewer than two entries
    InsufficientData,
    Series { points: Vec<TrendPoint> },
}

/// One point of the distance trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Short date label, e.g. "Jan 5"
    pub date: String,
    pub distance_km: f64,
}
