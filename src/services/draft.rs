// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry-creation draft: the images attached to an entry that has not been
//! submitted yet.
//!
//! Each image slot runs its own normalization task. The draft is "processing"
//! while any slot is still running, and cannot be submitted until every task
//! has resolved. Dropping a draft aborts whatever is still in flight.

use crate::error::AppError;
use crate::models::{MealSlot, NormalizedImage};
use crate::services::builder::EntryImages;
use futures_util::FutureExt;
use serde::Serialize;
use tokio::task::JoinHandle;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// In-flight normalization task.
pub type NormalizeTask = JoinHandle<Result<NormalizedImage, AppError>>;

/// Where an image is attached on the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Route,
    Meal(MealSlot),
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 4] = [
        ImageSlot::Route,
        ImageSlot::Meal(MealSlot::Breakfast),
        ImageSlot::Meal(MealSlot::Lunch),
        ImageSlot::Meal(MealSlot::Dinner),
    ];

    /// Path segment name (`route`, `breakfast`, `lunch`, `dinner`).
    pub fn name(self) -> &'static str {
        match self {
            ImageSlot::Route => "route",
            ImageSlot::Meal(MealSlot::Breakfast) => "breakfast",
            ImageSlot::Meal(MealSlot::Lunch) => "lunch",
            ImageSlot::Meal(MealSlot::Dinner) => "dinner",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(name.trim()))
    }

    fn index(self) -> usize {
        match self {
            ImageSlot::Route => 0,
            ImageSlot::Meal(meal) => 1 + meal.index(),
        }
    }
}

enum SlotState {
    Empty,
    Processing(NormalizeTask),
    Ready(NormalizedImage),
    Failed(String),
}

/// Open entry-creation view.
pub struct EntryDraft {
    generation: u64,
    slots: [SlotState; 4],
}

impl EntryDraft {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            slots: [
                SlotState::Empty,
                SlotState::Empty,
                SlotState::Empty,
                SlotState::Empty,
            ],
        }
    }

    /// Identifies this draft among drafts opened over the process lifetime.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Attach a running normalization to `slot`, replacing (and aborting)
    /// whatever was there.
    pub fn attach(&mut self, slot: ImageSlot, task: NormalizeTask) {
        self.replace(slot, SlotState::Processing(task));
    }

    /// Clear `slot`. Returns whether anything was there.
    pub fn remove(&mut self, slot: ImageSlot) -> bool {
        !matches!(self.replace(slot, SlotState::Empty), SlotState::Empty)
    }

    fn replace(&mut self, slot: ImageSlot, state: SlotState) -> SlotState {
        let previous = std::mem::replace(&mut self.slots[slot.index()], state);
        if let SlotState::Processing(task) = &previous {
            task.abort();
        }
        previous
    }

    /// Move finished tasks into `Ready` or `Failed`.
    pub fn harvest(&mut self) {
        for (index, state) in self.slots.iter_mut().enumerate() {
            let SlotState::Processing(task) = state else {
                continue;
            };
            if !task.is_finished() {
                continue;
            }
            let Some(joined) = task.now_or_never() else {
                continue;
            };

            *state = match joined {
                Ok(Ok(image)) => SlotState::Ready(image),
                Ok(Err(e)) => {
                    tracing::warn!(slot = ImageSlot::ALL[index].name(), error = %e, "Image normalization failed");
                    SlotState::Failed(e.to_string())
                }
                Err(e) => {
                    tracing::warn!(slot = ImageSlot::ALL[index].name(), error = %e, "Image normalization task failed");
                    SlotState::Failed(format!("Image normalization did not complete: {}", e))
                }
            };
        }
    }

    /// True while at least one normalization is outstanding.
    pub fn is_processing(&mut self) -> bool {
        self.harvest();
        self.slots
            .iter()
            .any(|state| matches!(state, SlotState::Processing(_)))
    }

    /// Normalized images for the builder.
    ///
    /// Fails with `ImagesPending` while anything is processing, and with
    /// `ImageProcessing` if a slot failed and has not been replaced or
    /// removed. The draft keeps its images, so a failed store write can be
    /// retried.
    pub fn images(&mut self) -> Result<EntryImages, AppError> {
        if self.is_processing() {
            return Err(AppError::ImagesPending);
        }

        let mut images = EntryImages::default();
        for slot in ImageSlot::ALL {
            let image = match &self.slots[slot.index()] {
                SlotState::Ready(image) => Some(image.clone()),
                SlotState::Failed(reason) => {
                    return Err(AppError::ImageProcessing(format!(
                        "{} image: {}",
                        slot.name(),
                        reason
                    )))
                }
                SlotState::Empty | SlotState::Processing(_) => None,
            };
            match slot {
                ImageSlot::Route => images.route = image,
                ImageSlot::Meal(meal) => images.meals[meal.index()] = image,
            }
        }
        Ok(images)
    }

    /// Abort all in-flight normalizations and discard every result.
    pub fn cancel(&mut self) {
        for slot in ImageSlot::ALL {
            self.replace(slot, SlotState::Empty);
        }
    }

    /// Snapshot for the client.
    pub fn status(&mut self) -> DraftStatus {
        self.harvest();

        let slots: Vec<SlotStatus> = ImageSlot::ALL
            .into_iter()
            .map(|slot| {
                let (state, bytes, error) = match &self.slots[slot.index()] {
                    SlotState::Empty => (SlotPhase::Empty, None, None),
                    SlotState::Processing(_) => (SlotPhase::Processing, None, None),
                    SlotState::Ready(image) => (SlotPhase::Ready, Some(image.len()), None),
                    SlotState::Failed(reason) => (SlotPhase::Failed, None, Some(reason.clone())),
                };
                SlotStatus {
                    slot: slot.name().to_string(),
                    state,
                    bytes,
                    error,
                }
            })
            .collect();

        let processing = slots.iter().any(|s| s.state == SlotPhase::Processing);
        let failed = slots.iter().any(|s| s.state == SlotPhase::Failed);

        DraftStatus {
            processing,
            can_submit: !processing && !failed,
            slots,
        }
    }
}

impl Drop for EntryDraft {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Draft state as shown to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DraftStatus {
    /// True while any image is still being normalized
    pub processing: bool,
    /// Submit is enabled only when nothing is processing or failed
    pub can_submit: bool,
    pub slots: Vec<SlotStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SlotStatus {
    pub slot: String,
    pub state: SlotPhase,
    /// Encoded size once ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SlotPhase {
    Empty,
    Processing,
    Ready,
    Failed,
}
