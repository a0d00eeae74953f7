// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry store client with typed operations.
//!
//! Provides:
//! - `load_all` (ordered by date ascending)
//! - `create` (returns the entry with its store-assigned id)
//! - `delete` (by id; deleting nothing is an error)
//!
//! Backends: the hosted REST table, an in-memory table for offline use and
//! tests, and an offline mock where every call fails.

use crate::config::StoreConfig;
use crate::db::row::{EntryRow, InsertRow};
use crate::error::AppError;
use crate::models::{ActivityEntry, EntryId, NewEntry};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Entry store client.
#[derive(Clone)]
pub struct EntryStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Rest(RestTable),
    Memory(Arc<Mutex<MemoryTable>>),
    Offline,
}

impl EntryStore {
    /// Connect to the hosted entry table.
    pub fn rest(config: &StoreConfig) -> Result<Self, AppError> {
        let table = RestTable::new(config)?;
        tracing::info!(url = %config.url, table = %config.table, "Using hosted entry store");
        Ok(Self {
            backend: Backend::Rest(table),
        })
    }

    /// In-memory store. Identifiers are derived from the creation timestamp.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(MemoryTable::default()))),
        }
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All operations return an error.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    /// Backend name for logs.
    pub fn kind(&self) -> &'static str {
        match self.backend {
            Backend::Rest(_) => "rest",
            Backend::Memory(_) => "memory",
            Backend::Offline => "offline",
        }
    }

    /// Fetch every entry, ordered by date ascending.
    pub async fn load_all(&self) -> Result<Vec<ActivityEntry>, AppError> {
        let mut entries = match &self.backend {
            Backend::Rest(table) => table.load_all().await?,
            Backend::Memory(table) => lock(table)?.rows.clone(),
            Backend::Offline => {
                return Err(AppError::StoreUnavailable(
                    "Entry store not connected (offline mode)".to_string(),
                ))
            }
        };
        // The REST query already orders by date; sort anyway so every
        // backend hands back the same order. Stable for equal dates.
        entries.sort_by_key(ActivityEntry::date);
        tracing::debug!(count = entries.len(), backend = self.kind(), "Entries loaded");
        Ok(entries)
    }

    /// Persist a new entry and return it with its assigned id.
    pub async fn create(&self, entry: &NewEntry) -> Result<ActivityEntry, AppError> {
        let created = match &self.backend {
            Backend::Rest(table) => table.create(entry).await?,
            Backend::Memory(table) => lock(table)
                .map_err(|e| AppError::StoreWrite(e.to_string()))?
                .insert(entry.clone()),
            Backend::Offline => {
                return Err(AppError::StoreWrite(
                    "Entry store not connected (offline mode)".to_string(),
                ))
            }
        };
        tracing::info!(id = %created.id, date = %created.date(), "Entry created");
        Ok(created)
    }

    /// Delete an entry by id. Fails if no entry has that id.
    pub async fn delete(&self, id: &EntryId) -> Result<(), AppError> {
        match &self.backend {
            Backend::Rest(table) => table.delete(id).await?,
            Backend::Memory(table) => lock(table)
                .map_err(|e| AppError::StoreWrite(e.to_string()))?
                .remove(id)?,
            Backend::Offline => {
                return Err(AppError::StoreWrite(
                    "Entry store not connected (offline mode)".to_string(),
                ))
            }
        }
        tracing::info!(id = %id, "Entry deleted");
        Ok(())
    }
}

fn lock(table: &Mutex<MemoryTable>) -> Result<std::sync::MutexGuard<'_, MemoryTable>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::StoreUnavailable("In-memory table poisoned".to_string()))
}

// ─── In-memory table ─────────────────────────────────────────

#[derive(Default)]
struct MemoryTable {
    rows: Vec<ActivityEntry>,
    last_id: i64,
}

impl MemoryTable {
    fn insert(&mut self, entry: NewEntry) -> ActivityEntry {
        // Millisecond timestamps, bumped so ids stay unique within a burst.
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);

        let created = ActivityEntry {
            id: EntryId::new(self.last_id.to_string()),
            fields: entry,
        };
        self.rows.push(created.clone());
        created
    }

    fn remove(&mut self, id: &EntryId) -> Result<(), AppError> {
        let before = self.rows.len();
        self.rows.retain(|row| &row.id != id);
        if self.rows.len() == before {
            return Err(AppError::StoreWrite(format!("No entry with id {}", id)));
        }
        Ok(())
    }
}

// ─── REST table ──────────────────────────────────────────────

/// Hosted table reached over its REST interface.
#[derive(Clone)]
struct RestTable {
    http: reqwest::Client,
    endpoint: String,
}

impl RestTable {
    fn new(config: &StoreConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid store API key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid store API key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                config.table
            ),
        })
    }

    async fn load_all(&self) -> Result<Vec<ActivityEntry>, AppError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "date.asc")])
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StoreUnavailable(format!("HTTP {}: {}", status, body)));
        }

        let rows: Vec<EntryRow> = response
            .json()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("JSON parse error: {}", e)))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match ActivityEntry::try_from(row) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed entry row");
                    None
                }
            })
            .collect())
    }

    async fn create(&self, entry: &NewEntry) -> Result<ActivityEntry, AppError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Prefer", "return=representation")
            .json(&[InsertRow::from(entry)])
            .send()
            .await
            .map_err(|e| AppError::StoreWrite(e.to_string()))?;

        let rows: Vec<EntryRow> = check_write(response).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::StoreWrite("Insert returned no row".to_string()))?;

        ActivityEntry::try_from(row).map_err(|e| AppError::StoreWrite(e.to_string()))
    }

    async fn delete(&self, id: &EntryId) -> Result<(), AppError> {
        let response = self
            .http
            .delete(&self.endpoint)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| AppError::StoreWrite(e.to_string()))?;

        let deleted: Vec<Value> = check_write(response).await?;
        if deleted.is_empty() {
            return Err(AppError::StoreWrite(format!("No entry with id {}", id)));
        }
        Ok(())
    }
}

/// Check a write response and parse its JSON representation.
async fn check_write<T: for<'de> serde::Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::StoreWrite(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::StoreWrite(format!("JSON parse error: {}", e)))
}
