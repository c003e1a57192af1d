// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visibility isolation: only room geometry visible while the overlay is
//! active, with exact restoration on exit.
//!
//! Entering isolation hides every non-space category and records what was
//! hidden, keyed by `(model, category)`. The space category needs two
//! steps — hide all space elements, then re-show only the room-classified
//! subset — because area markers share the category with rooms and must end
//! up hidden while rooms end up visible.
//!
//! Exiting restores every recorded category and clears the records; it is
//! idempotent on empty or partially built state. [`hide_spaces_only`]
//! (used when the overlay deactivates) hides the space category while
//! leaving everything else exactly as currently visible.
//!
//! [`hide_spaces_only`]: IsolationController::hide_spaces_only

use rustc_hash::{FxHashMap, FxHashSet};

use crate::geometry::{GeometryApi, LocalRef, ModelId, SPACE_CATEGORY};
use crate::index::CorrespondenceIndex;

/// Hidden-element records, keyed by model and category.
type VisibilityRecords = FxHashMap<(ModelId, String), FxHashSet<LocalRef>>;

/// Enters and exits the room-only isolation mode.
#[derive(Debug, Default)]
pub struct IsolationController {
    hidden: VisibilityRecords,
}

impl IsolationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while isolation entry state is being held.
    pub fn is_isolating(&self) -> bool {
        !self.hidden.is_empty()
    }

    /// Hides every non-space category (recording what was hidden), then
    /// hides all space elements and re-shows only the rooms. One refresh
    /// per model touched. Geometry faults skip the affected category or
    /// model and never abort the pass.
    pub async fn enter<G: GeometryApi>(
        &mut self,
        geometry: &G,
        models: &[ModelId],
        index: &CorrespondenceIndex,
    ) {
        for &model in models {
            let categories = match geometry.categories(model).await {
                Ok(categories) => categories,
                Err(err) => {
                    tracing::warn!(model = model.0, error = %err, "category enumeration failed, skipping model");
                    continue;
                }
            };

            for category in categories {
                if category == SPACE_CATEGORY {
                    continue;
                }
                let elements = match geometry.elements(model, &category).await {
                    Ok(elements) => elements,
                    Err(err) => {
                        tracing::warn!(model = model.0, category = %category, error = %err, "element enumeration failed, skipping category");
                        continue;
                    }
                };
                if elements.is_empty() {
                    continue;
                }
                if let Err(err) = geometry.set_visibility(model, &elements, false).await {
                    tracing::warn!(model = model.0, category = %category, error = %err, "hide failed, skipping category");
                    continue;
                }
                self.hidden
                    .insert((model, category), elements.into_iter().collect());
            }

            // Space category: hide everything, then re-show rooms so area
            // markers end up hidden.
            match geometry.elements(model, SPACE_CATEGORY).await {
                Ok(spaces) if !spaces.is_empty() => {
                    if let Err(err) = geometry.set_visibility(model, &spaces, false).await {
                        tracing::warn!(model = model.0, error = %err, "hiding spaces failed");
                    }
                    let rooms = index.room_local_refs(model);
                    if !rooms.is_empty() {
                        if let Err(err) = geometry.set_visibility(model, rooms, true).await {
                            tracing::warn!(model = model.0, error = %err, "re-showing rooms failed");
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(model = model.0, error = %err, "space enumeration failed");
                }
            }

            if let Err(err) = geometry.refresh(model).await {
                tracing::warn!(model = model.0, error = %err, "refresh failed");
            }
        }

        tracing::debug!(records = self.hidden.len(), "isolation entered");
    }

    /// Restores every recorded category to visible and clears the records.
    /// Callable even if [`enter`](Self::enter) only partially completed;
    /// restoring with no records is a no-op.
    pub async fn exit<G: GeometryApi>(&mut self, geometry: &G) {
        if self.hidden.is_empty() {
            return;
        }

        let records = std::mem::take(&mut self.hidden);
        let mut touched: FxHashSet<ModelId> = FxHashSet::default();

        for ((model, category), elements) in records {
            let refs: Vec<LocalRef> = elements.into_iter().collect();
            if let Err(err) = geometry.set_visibility(model, &refs, true).await {
                tracing::warn!(model = model.0, category = %category, error = %err, "restore failed");
            }
            touched.insert(model);
        }

        for model in touched {
            if let Err(err) = geometry.refresh(model).await {
                tracing::warn!(model = model.0, error = %err, "refresh failed");
            }
        }

        tracing::debug!("isolation exited");
    }

    /// Hides the space category (rooms included) while leaving every other
    /// category exactly as currently visible. Used when the overlay leaves
    /// the active state: the model returns to its default spaces-hidden
    /// resting state.
    pub async fn hide_spaces_only<G: GeometryApi>(&self, geometry: &G, models: &[ModelId]) {
        for &model in models {
            let spaces = match geometry.elements(model, SPACE_CATEGORY).await {
                Ok(spaces) => spaces,
                Err(err) => {
                    tracing::warn!(model = model.0, error = %err, "space enumeration failed, skipping model");
                    continue;
                }
            };
            if spaces.is_empty() {
                continue;
            }
            if let Err(err) = geometry.set_visibility(model, &spaces, false).await {
                tracing::warn!(model = model.0, error = %err, "hiding spaces failed");
            }
            if let Err(err) = geometry.refresh(model).await {
                tracing::warn!(model = model.0, error = %err, "refresh failed");
            }
        }
    }
}
