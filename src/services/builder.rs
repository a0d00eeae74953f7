// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry builder: turns raw form input plus normalized images into a
//! [`NewEntry`].
//!
//! Numeric fields never reject the form; see [`RawField`] for the coercion
//! rules.

use crate::error::AppError;
use crate::models::{
    total_calories, HeartRate, Meal, MealSlot, NewEntry, NormalizedImage, RawField,
};
use crate::time_utils::parse_entry_date;
use serde::Deserialize;
use validator::Validate;

/// Heart-rate inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartRateForm {
    #[serde(default)]
    pub start: RawField,
    #[serde(default)]
    pub train: RawField,
    #[serde(default)]
    pub rest: RawField,
}

/// Scalar fields of the entry-creation form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EntryForm {
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "label is required"))]
    pub label: String,
    #[validate(length(min = 1, message = "route name is required"))]
    pub route_name: String,
    #[serde(default)]
    pub distance_km: RawField,
    #[serde(default)]
    pub duration_min: RawField,
    #[serde(default)]
    pub heart_rate: HeartRateForm,
    /// Breakfast, Lunch, Dinner
    #[serde(default)]
    pub meal_calories: [RawField; 3],
}

/// Normalized images attached to the form.
#[derive(Debug, Clone, Default)]
pub struct EntryImages {
    pub route: Option<NormalizedImage>,
    /// Indexed by [`MealSlot::index`]
    pub meals: [Option<NormalizedImage>; 3],
}

/// Build an entry from form input.
///
/// Required text fields are trimmed and must be non-empty; `date` must be a
/// `YYYY-MM-DD` calendar date.
pub fn build_entry(form: EntryForm, images: EntryImages) -> Result<NewEntry, AppError> {
    let form = EntryForm {
        date: form.date.trim().to_string(),
        label: form.label.trim().to_string(),
        route_name: form.route_name.trim().to_string(),
        ..form
    };
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let date = parse_entry_date(&form.date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", form.date)))?;

    let route_image = images.route;
    let mut meal_images = images.meals;
    let meals: [Meal; 3] = MealSlot::ALL.map(|slot| Meal {
        slot,
        image: meal_images[slot.index()].take(),
        calories: form.meal_calories[slot.index()].to_non_negative_u32(),
    });

    let total_calories = total_calories(&meals);

    Ok(NewEntry {
        date,
        label: form.label,
        route_name: form.route_name,
        distance_km: form.distance_km.to_non_negative_f64(),
        duration_min: form.duration_min.to_non_negative_f64(),
        route_image,
        heart_rate: HeartRate {
            start: form.heart_rate.start.to_optional_u32(),
            train: form.heart_rate.train.to_optional_u32(),
            rest: form.heart_rate.rest.to_optional_u32(),
        },
        meals,
        total_calories,
    })
}
