// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity entry model: one day of walking, heart rate and meals.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque entry identifier, assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored activity entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: EntryId,
    #[serde(flatten)]
    pub fields: NewEntry,
}

impl ActivityEntry {
    pub fn date(&self) -> NaiveDate {
        self.fields.date
    }

    pub fn distance_km(&self) -> f64 {
        self.fields.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.fields.duration_min
    }
}

/// Entry contents before the store has assigned an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    /// Calendar date of the walk
    pub date: NaiveDate,
    /// Short day label (e.g. "Day 1")
    pub label: String,
    /// Description of the walking route
    pub route_name: String,
    /// Distance in kilometres (never negative)
    pub distance_km: f64,
    /// Duration in minutes (never negative)
    pub duration_min: f64,
    /// Screenshot of the route, if one was attached
    pub route_image: Option<NormalizedImage>,
    pub heart_rate: HeartRate,
    /// Always Breakfast, Lunch, Dinner in that order
    pub meals: [Meal; 3],
    /// Sum of meal calories at creation time
    pub total_calories: u32,
}

/// Heart-rate samples in beats per minute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRate {
    pub start: Option<u32>,
    pub train: Option<u32>,
    pub rest: Option<u32>,
}

/// The three fixed meal slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }

    pub fn index(self) -> usize {
        match self {
            MealSlot::Breakfast => 0,
            MealSlot::Lunch => 1,
            MealSlot::Dinner => 2,
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// One meal slot: optional photo plus calorie count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub slot: MealSlot,
    pub image: Option<NormalizedImage>,
    pub calories: u32,
}

impl Meal {
    pub fn empty(slot: MealSlot) -> Self {
        Self {
            slot,
            image: None,
            calories: 0,
        }
    }

    /// Three empty meals in fixed order.
    pub fn empty_set() -> [Meal; 3] {
        MealSlot::ALL.map(Meal::empty)
    }
}

/// Sum of meal calories.
pub fn total_calories(meals: &[Meal; 3]) -> u32 {
    meals
        .iter()
        .fold(0u32, |acc, meal| acc.saturating_add(meal.calories))
}

/// Bounded-size re-encoded image, serialized as a data URI.
#[derive(Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl NormalizedImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// Parse a base64 data URI. Returns `None` for anything else.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.trim().strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime_type = meta.strip_suffix(";base64")?;
        if mime_type.is_empty() {
            return None;
        }
        let data = STANDARD.decode(payload).ok()?;
        Some(Self::new(mime_type, data))
    }

    /// Encoded payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for NormalizedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Serialize for NormalizedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for NormalizedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        NormalizedImage::from_data_uri(&uri)
            .ok_or_else(|| serde::de::Error::custom("expected a base64 data URI"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip() {
        let image = NormalizedImage::new("image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0]);
        let uri = image.to_data_uri();

        assert_eq!(uri, "data:image/jpeg;base64,/9j/4A==");
        assert_eq!(NormalizedImage::from_data_uri(&uri), Some(image));
    }

    #[test]
    fn test_data_uri_rejects_other_strings() {
        assert_eq!(NormalizedImage::from_data_uri(""), None);
        assert_eq!(NormalizedImage::from_data_uri("https://x/y.jpg"), None);
        assert_eq!(NormalizedImage::from_data_uri("data:image/png,raw"), None);
        assert_eq!(NormalizedImage::from_data_uri("data:;base64,AAAA"), None);
    }

    #[test]
    fn test_meal_slots_fixed_order() {
        let meals = Meal::empty_set();
        let labels: Vec<_> = meals.iter().map(|m| m.slot.label()).collect();
        assert_eq!(labels, ["Breakfast", "Lunch", "Dinner"]);
        assert_eq!(MealSlot::from_label(" lunch"), Some(MealSlot::Lunch));
        assert_eq!(MealSlot::from_label("Snack"), None);
    }

    #[test]
    fn test_total_calories() {
        let mut meals = Meal::empty_set();
        meals[0].calories = 300;
        meals[1].calories = 500;
        assert_eq!(total_calories(&meals), 800);
    }
}
