// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Loosely typed numeric input and the coercion rules applied to it.
//!
//! Used for form input and for lenient reads of stored rows. Anything that
//! does not parse, and anything negative or non-finite, becomes 0.

use serde::Deserialize;

/// A form field as typed by the user: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl Default for RawField {
    fn default() -> Self {
        RawField::Text(String::new())
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl RawField {
    /// Non-negative real number, 0 on parse failure.
    pub fn to_non_negative_f64(&self) -> f64 {
        let value = match self {
            RawField::Number(n) => *n,
            RawField::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        non_negative(value)
    }

    /// Non-negative integer, 0 on parse failure. Decimals are truncated.
    pub fn to_non_negative_u32(&self) -> u32 {
        match self {
            RawField::Text(s) => match s.trim().parse::<i64>() {
                Ok(n) => n.clamp(0, u32::MAX as i64) as u32,
                Err(_) => truncate_to_u32(self.to_non_negative_f64()),
            },
            RawField::Number(_) => truncate_to_u32(self.to_non_negative_f64()),
        }
    }

    /// Optional integer sample: empty input is absent, garbage is absent.
    pub fn to_optional_u32(&self) -> Option<u32> {
        match self {
            RawField::Text(s) if s.trim().is_empty() => None,
            RawField::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64))
                    .filter(|n| *n >= 0)
                    .map(|n| n.min(u32::MAX as i64) as u32)
            }
            RawField::Number(n) if n.is_finite() && *n >= 0.0 => {
                Some(truncate_to_u32(*n))
            }
            RawField::Number(_) => None,
        }
    }
}

/// Clamp to a finite, non-negative value.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn truncate_to_u32(value: f64) -> u32 {
    value.trunc().min(u32::MAX as f64) as u32
}
