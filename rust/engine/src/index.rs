// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Correspondence index: stable space identifiers ↔ renderable references.
//!
//! A space's stable identifier survives reloads; its [`LocalRef`] does not.
//! The index scans the space category of every loaded model once (and on
//! demand) and builds the mapping wholesale — it is rebuilt, never
//! partially mutated. Space records whose name carries the area-marker
//! prefix are auxiliary annotation geometry: they are excluded from lookup
//! and room classification, but their local references are still tracked so
//! the isolation controller can hide them.

use heatlens_core::attr::text_attr;
use rustc_hash::FxHashMap;

use crate::events::MappingStats;
use crate::geometry::{GeometryApi, LocalRef, ModelId, SPACE_CATEGORY};

/// Default naming-convention prefix marking pseudo-space "area" records.
pub const DEFAULT_AREA_MARKER_PREFIX: &str = "Area";

/// One resolved correspondence. Owned exclusively by the index; read-only
/// to every other component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub space_id: String,
    pub model: ModelId,
    pub local_ref: LocalRef,
}

/// Bidirectional map between stable space identifiers and renderable
/// references, plus the room/area classification per model.
#[derive(Debug)]
pub struct CorrespondenceIndex {
    area_marker_prefix: String,
    by_space_id: FxHashMap<String, Entry>,
    rooms: FxHashMap<ModelId, Vec<LocalRef>>,
    areas: FxHashMap<ModelId, Vec<LocalRef>>,
    stats: MappingStats,
}

impl CorrespondenceIndex {
    pub fn new() -> Self {
        Self::with_area_marker_prefix(DEFAULT_AREA_MARKER_PREFIX)
    }

    /// Creates an index with a custom area-marker naming prefix.
    pub fn with_area_marker_prefix(prefix: impl Into<String>) -> Self {
        Self {
            area_marker_prefix: prefix.into(),
            by_space_id: FxHashMap::default(),
            rooms: FxHashMap::default(),
            areas: FxHashMap::default(),
            stats: MappingStats::default(),
        }
    }

    /// Rebuilds the index from scratch over the given models.
    ///
    /// Best-effort per element: a failure reading one element's identifier
    /// or attributes is logged and that element skipped. A failure
    /// enumerating one model is logged and the remaining models are still
    /// processed. Neither aborts the rebuild.
    pub async fn rebuild<G: GeometryApi>(&mut self, geometry: &G, models: &[ModelId]) -> MappingStats {
        self.by_space_id.clear();
        self.rooms.clear();
        self.areas.clear();

        let mut stats = MappingStats {
            models: models.len(),
            ..MappingStats::default()
        };

        for &model in models {
            let elements = match geometry.elements(model, SPACE_CATEGORY).await {
                Ok(elements) => elements,
                Err(err) => {
                    tracing::warn!(model = model.0, error = %err, "space enumeration failed, skipping model");
                    continue;
                }
            };

            for local_ref in elements {
                stats.spaces += 1;

                let space_id = match geometry.stable_id(model, local_ref).await {
                    Ok(id) => id,
                    Err(err) => {
                        stats.skipped += 1;
                        tracing::warn!(
                            model = model.0,
                            element = local_ref.0,
                            error = %err,
                            "stable id read failed, skipping element"
                        );
                        continue;
                    }
                };

                let name = match geometry.attributes(model, local_ref).await {
                    Ok(bag) => match text_attr(&bag, "Name") {
                        Ok(name) => name.to_string(),
                        Err(err) => {
                            stats.skipped += 1;
                            tracing::warn!(
                                model = model.0,
                                element = local_ref.0,
                                error = %err,
                                "name attribute missing, skipping element"
                            );
                            continue;
                        }
                    },
                    Err(err) => {
                        stats.skipped += 1;
                        tracing::warn!(
                            model = model.0,
                            element = local_ref.0,
                            error = %err,
                            "attribute read failed, skipping element"
                        );
                        continue;
                    }
                };

                if name.starts_with(&self.area_marker_prefix) {
                    // Area markers stay out of the lookup but their refs are
                    // still needed for isolation hiding.
                    stats.area_markers += 1;
                    self.areas.entry(model).or_default().push(local_ref);
                    continue;
                }

                stats.rooms += 1;
                self.rooms.entry(model).or_default().push(local_ref);
                self.by_space_id.insert(
                    space_id.clone(),
                    Entry {
                        space_id,
                        model,
                        local_ref,
                    },
                );
            }
        }

        tracing::info!(
            models = stats.models,
            spaces = stats.spaces,
            rooms = stats.rooms,
            area_markers = stats.area_markers,
            skipped = stats.skipped,
            "correspondence index rebuilt"
        );

        self.stats = stats;
        stats
    }

    /// O(1) lookup of a space's renderable reference.
    pub fn lookup(&self, space_id: &str) -> Option<&Entry> {
        self.by_space_id.get(space_id)
    }

    /// Local references of elements classified as real rooms in one model.
    pub fn room_local_refs(&self, model: ModelId) -> &[LocalRef] {
        self.rooms.get(&model).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Local references of area-marker elements in one model.
    pub fn area_local_refs(&self, model: ModelId) -> &[LocalRef] {
        self.areas.get(&model).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of spaces currently resolvable through [`lookup`](Self::lookup).
    pub fn len(&self) -> usize {
        self.by_space_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_space_id.is_empty()
    }

    /// Statistics from the last rebuild.
    pub fn stats(&self) -> MappingStats {
        self.stats
    }
}

impl Default for CorrespondenceIndex {
    fn default() -> Self {
        Self::new()
    }
}
