// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journal state and the intents that mutate it.
//!
//! [`Journal`] is the single application-state object: the loaded entry set,
//! the current selection, load status, the write-in-progress flag and the
//! open creation draft. Only [`JournalService`] touches it, and only in
//! response to an intent. The entry set changes after a store call succeeds,
//! never before.
//!
//! The state lock is a plain mutex and is never held across an await.
//!
//! Loads take part in write exclusion through an epoch counter: a load that
//! overlaps a create or delete is discarded rather than applied over the
//! write's result.

use crate::db::EntryStore;
use crate::error::AppError;
use crate::models::{ActivityEntry, EntryId, Summary};
use crate::services::aggregate;
use crate::services::builder::{build_entry, EntryForm};
use crate::services::draft::{DraftStatus, EntryDraft, ImageSlot};
use crate::services::image::ImageNormalizer;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Application state for one journal.
#[derive(Default)]
pub struct Journal {
    entries: Vec<ActivityEntry>,
    selected: Option<EntryId>,
    loading: bool,
    load_error: Option<String>,
    write_pending: bool,
    /// Bumped whenever a create or delete starts
    write_epoch: u64,
    draft: Option<EntryDraft>,
    drafts_opened: u64,
}

impl Journal {
    /// Entries, sorted by date ascending.
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&EntryId> {
        self.selected.as_ref()
    }

    pub fn view(&self) -> JournalView {
        JournalView {
            entries: self.entries.clone(),
            loading: self.loading,
            load_error: self.load_error.clone(),
            selected_id: self.selected.clone(),
            entry_count: self.entries.len() as u32,
        }
    }

    fn apply_load(&mut self, result: Result<Vec<ActivityEntry>, AppError>) {
        self.loading = false;
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.load_error = None;
                if let Some(id) = &self.selected {
                    if !self.entries.iter().any(|e| &e.id == id) {
                        self.selected = None;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Entry load failed, showing empty journal");
                self.entries.clear();
                self.selected = None;
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Insert keeping date order; equal dates keep insertion order. An entry
    /// with the same id is replaced, never duplicated.
    fn insert(&mut self, entry: ActivityEntry) {
        self.entries.retain(|existing| existing.id != entry.id);
        let position = self
            .entries
            .partition_point(|existing| existing.date() <= entry.date());
        self.entries.insert(position, entry);
    }

    fn remove(&mut self, id: &EntryId) {
        self.entries.retain(|entry| &entry.id != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    fn begin_write(&mut self) -> Result<(), AppError> {
        if self.write_pending {
            return Err(AppError::Conflict(
                "Another create or delete is still in progress".to_string(),
            ));
        }
        self.write_pending = true;
        self.write_epoch += 1;
        Ok(())
    }

    /// Draft edits are refused while a create is in flight; its success
    /// closes the draft.
    fn check_draft_editable(&self) -> Result<(), AppError> {
        if self.write_pending {
            return Err(AppError::Conflict(
                "The entry is being saved; the draft cannot change".to_string(),
            ));
        }
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut EntryDraft, AppError> {
        self.draft
            .as_mut()
            .ok_or_else(|| AppError::NotFound("No entry draft is open".to_string()))
    }
}

/// Entry list as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct JournalView {
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<unknown>"))]
    pub entries: Vec<ActivityEntry>,
    pub loading: bool,
    pub load_error: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub selected_id: Option<EntryId>,
    pub entry_count: u32,
}

/// Clears `write_pending` when the write finishes or its future is dropped.
struct WriteGuard {
    state: Arc<Mutex<Journal>>,
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        lock(&self.state).write_pending = false;
    }
}

fn lock(state: &Mutex<Journal>) -> MutexGuard<'_, Journal> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the journal state and the collaborators its intents call.
#[derive(Clone)]
pub struct JournalService {
    store: EntryStore,
    normalizer: ImageNormalizer,
    challenge_target_days: u32,
    state: Arc<Mutex<Journal>>,
}

impl JournalService {
    pub fn new(store: EntryStore, normalizer: ImageNormalizer, challenge_target_days: u32) -> Self {
        Self {
            store,
            normalizer,
            challenge_target_days,
            state: Arc::new(Mutex::new(Journal::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, Journal> {
        lock(&self.state)
    }

    fn begin_write(&self) -> Result<WriteGuard, AppError> {
        self.state().begin_write()?;
        Ok(WriteGuard {
            state: self.state.clone(),
        })
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Backend name of the entry store.
    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    pub fn view(&self) -> JournalView {
        self.state().view()
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.state().entries().to_vec()
    }

    pub fn selected(&self) -> Option<EntryId> {
        self.state().selected().cloned()
    }

    /// Aggregates over the current entry set.
    pub fn summary(&self) -> Summary {
        aggregate::summarize(self.state().entries(), self.challenge_target_days)
    }

    // ─── Load ────────────────────────────────────────────────────

    /// Replace the entry set with the store's contents.
    ///
    /// A failed load is not an error for the caller: the journal shows an
    /// empty set and records why.
    ///
    /// If a create or delete was pending when the load started, or started
    /// while it ran, the result may not reflect that write and is dropped.
    pub async fn load(&self) -> JournalView {
        let started_epoch = {
            let mut state = self.state();
            state.loading = true;
            (!state.write_pending).then_some(state.write_epoch)
        };
        let result = self.store.load_all().await;

        let mut state = self.state();
        if started_epoch != Some(state.write_epoch) {
            state.loading = false;
            tracing::info!("Discarding entry load that overlapped a write");
            return state.view();
        }
        state.apply_load(result);
        tracing::info!(
            count = state.entries().len(),
            failed = state.load_error.is_some(),
            "Journal loaded"
        );
        state.view()
    }

    // ─── Selection ───────────────────────────────────────────────

    /// Open the read-only detail view of one entry.
    pub fn select(&self, id: &EntryId) -> Result<ActivityEntry, AppError> {
        let mut state = self.state();
        let entry = state
            .entries
            .iter()
            .find(|entry| &entry.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Entry {}", id)))?;
        state.selected = Some(id.clone());
        Ok(entry)
    }

    pub fn clear_selection(&self) {
        self.state().selected = None;
    }

    // ─── Draft ───────────────────────────────────────────────────

    /// Open a fresh creation draft, discarding any previous one.
    pub fn open_draft(&self) -> DraftStatus {
        let mut state = self.state();
        state.drafts_opened += 1;
        let generation = state.drafts_opened;
        if state.draft.is_some() {
            tracing::debug!("Discarding previous entry draft");
        }
        state.draft.insert(EntryDraft::new(generation)).status()
    }

    pub fn draft_status(&self) -> Result<DraftStatus, AppError> {
        Ok(self.state().draft_mut()?.status())
    }

    /// Close the draft. In-flight normalizations are aborted and their
    /// results discarded. Returns whether a draft was open.
    pub fn cancel_draft(&self) -> bool {
        self.state().draft.take().is_some()
    }

    /// Start normalizing `source` into `slot` of the open draft.
    pub fn attach_image(&self, slot: ImageSlot, source: Vec<u8>) -> Result<DraftStatus, AppError> {
        let mut state = self.state();
        state.check_draft_editable()?;
        let draft = state.draft_mut()?;
        tracing::debug!(slot = slot.name(), bytes = source.len(), "Normalizing image");
        draft.attach(slot, self.normalizer.spawn(source));
        Ok(draft.status())
    }

    pub fn remove_image(&self, slot: ImageSlot) -> Result<DraftStatus, AppError> {
        let mut state = self.state();
        state.check_draft_editable()?;
        let draft = state.draft_mut()?;
        draft.remove(slot);
        Ok(draft.status())
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Build an entry from `form` and the draft's images and persist it.
    ///
    /// Rejected while any image is still normalizing. On store failure the
    /// entry set and the draft are left as they were.
    pub async fn create(&self, form: EntryForm) -> Result<ActivityEntry, AppError> {
        let (entry, generation) = {
            let mut state = self.state();
            let draft = state.draft_mut()?;
            let generation = draft.generation();
            let images = draft.images()?;
            (build_entry(form, images)?, generation)
        };

        let _write = self.begin_write()?;
        let created = self.store.create(&entry).await?;

        let mut state = self.state();
        state.insert(created.clone());
        if state.draft.as_ref().map(EntryDraft::generation) == Some(generation) {
            state.draft = None;
        }
        Ok(created)
    }

    /// Delete an entry. `confirmed` must be set; the client asks first.
    ///
    /// On store failure the entry set and selection are unchanged.
    pub async fn delete(&self, id: &EntryId, confirmed: bool) -> Result<(), AppError> {
        if !confirmed {
            return Err(AppError::BadRequest(
                "Deleting an entry requires confirmation".to_string(),
            ));
        }

        let _write = self.begin_write()?;
        self.store.delete(id).await?;

        self.state().remove(id);
        Ok(())
    }
}
