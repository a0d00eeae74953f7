// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wire representation of the `entries` table and its translation to and
//! from [`ActivityEntry`].
//!
//! This is the only module that knows the column names. Reads are lenient:
//! older rows hold raw form strings (`"72"`, `""`) where numbers are
//! expected, so every numeric column goes through the same coercion the form
//! builder uses.

use crate::models::{ActivityEntry, EntryId, HeartRate, Meal, MealSlot, NewEntry, NormalizedImage};
use crate::models::{non_negative, RawField};
use crate::time_utils::{format_entry_date, parse_entry_date};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row as returned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRow {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub distance: Value,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub calories: Value,
    #[serde(default)]
    pub heart_rate: Option<WireHeartRate>,
    #[serde(default)]
    pub meals: Option<Vec<WireMeal>>,
}

/// `heart_rate` column (JSON).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireHeartRate {
    #[serde(default)]
    pub start: Value,
    #[serde(default)]
    pub train: Value,
    #[serde(default)]
    pub rest: Value,
}

/// One element of the `meals` column (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMeal {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub calories: Value,
}

/// Row body for inserts. `id` is left to the store.
#[derive(Debug, Clone, Serialize)]
pub struct InsertRow {
    pub date: String,
    pub day: String,
    pub route: String,
    pub distance: f64,
    pub duration: f64,
    pub image: Option<String>,
    pub calories: u32,
    pub heart_rate: WireHeartRate,
    pub meals: Vec<WireMeal>,
}

impl From<&NewEntry> for InsertRow {
    fn from(entry: &NewEntry) -> Self {
        Self {
            date: format_entry_date(entry.date),
            day: entry.label.clone(),
            route: entry.route_name.clone(),
            distance: entry.distance_km,
            duration: entry.duration_min,
            image: entry.route_image.as_ref().map(NormalizedImage::to_data_uri),
            calories: entry.total_calories,
            heart_rate: WireHeartRate {
                start: optional_number(entry.heart_rate.start),
                train: optional_number(entry.heart_rate.train),
                rest: optional_number(entry.heart_rate.rest),
            },
            meals: entry
                .meals
                .iter()
                .map(|meal| WireMeal {
                    name: meal.slot.label().to_string(),
                    image: meal.image.as_ref().map(NormalizedImage::to_data_uri),
                    calories: Value::from(meal.calories),
                })
                .collect(),
        }
    }
}

/// Why a row could not be turned into an entry.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("row has no usable id")]
    MissingId,

    #[error("row {id} has an invalid date: {date:?}")]
    InvalidDate { id: String, date: String },
}

impl TryFrom<EntryRow> for ActivityEntry {
    type Error = RowError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let id = wire_id(&row.id).ok_or(RowError::MissingId)?;
        let date = parse_entry_date(&row.date).ok_or_else(|| RowError::InvalidDate {
            id: id.clone(),
            date: row.date.clone(),
        })?;

        let heart_rate = row.heart_rate.unwrap_or_default();

        Ok(ActivityEntry {
            id: EntryId::new(id),
            fields: NewEntry {
                date,
                label: row.day.unwrap_or_default(),
                route_name: row.route.unwrap_or_default(),
                distance_km: value_to_field(&row.distance).to_non_negative_f64(),
                duration_min: value_to_field(&row.duration).to_non_negative_f64(),
                route_image: decode_image(row.image.as_deref()),
                heart_rate: HeartRate {
                    start: value_to_field(&heart_rate.start).to_optional_u32(),
                    train: value_to_field(&heart_rate.train).to_optional_u32(),
                    rest: value_to_field(&heart_rate.rest).to_optional_u32(),
                },
                meals: meals_from_wire(row.meals.unwrap_or_default()),
                total_calories: value_to_field(&row.calories).to_non_negative_u32(),
            },
        })
    }
}

/// String form of a store-assigned id (numeric or textual).
pub fn wire_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Place wire meals into the three fixed slots: by name first, then by
/// position for unnamed leftovers. Missing slots are empty.
fn meals_from_wire(wire: Vec<WireMeal>) -> [Meal; 3] {
    let mut meals = Meal::empty_set();
    let mut filled = [false; 3];
    let mut unnamed = Vec::new();

    for (position, item) in wire.into_iter().enumerate() {
        match MealSlot::from_label(&item.name) {
            Some(slot) if !filled[slot.index()] => {
                meals[slot.index()] = meal_from_wire(slot, &item);
                filled[slot.index()] = true;
            }
            _ => unnamed.push((position, item)),
        }
    }

    for (position, item) in unnamed {
        if position < 3 && !filled[position] {
            let slot = MealSlot::ALL[position];
            meals[position] = meal_from_wire(slot, &item);
            filled[position] = true;
        }
    }

    meals
}

fn meal_from_wire(slot: MealSlot, item: &WireMeal) -> Meal {
    Meal {
        slot,
        image: decode_image(item.image.as_deref()),
        calories: value_to_field(&item.calories).to_non_negative_u32(),
    }
}

fn decode_image(raw: Option<&str>) -> Option<NormalizedImage> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let image = NormalizedImage::from_data_uri(raw);
    if image.is_none() {
        tracing::warn!(len = raw.len(), "Ignoring stored image that is not a data URI");
    }
    image
}

fn value_to_field(value: &Value) -> RawField {
    match value {
        Value::Number(n) => RawField::Number(non_negative(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => RawField::Text(s.clone()),
        _ => RawField::default(),
    }
}

fn optional_number(value: Option<u32>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
