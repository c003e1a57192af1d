// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Latest-known reading per space.
//!
//! The store merges incoming batches by `space_id`, keeping the reading
//! with the later timestamp. It never touches the renderer: applying data
//! happens only through the engine's explicit batch pass, so readings
//! received while the overlay is inactive simply accumulate and are applied
//! once on activation.

use heatlens_core::SpaceReading;
use rustc_hash::FxHashMap;

/// Map of space id → latest reading.
#[derive(Debug, Default)]
pub struct HeatDataStore {
    readings: FxHashMap<String, SpaceReading>,
}

impl HeatDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a batch into the store. A reading replaces the stored one for
    /// the same `space_id` when its timestamp is strictly later; on an equal
    /// timestamp the last reading ingested wins. Duplicate ids within one
    /// batch resolve the same way, in batch order. Returns `true` if
    /// anything changed.
    pub fn ingest(&mut self, batch: Vec<SpaceReading>) -> bool {
        let mut changed = false;
        for reading in batch {
            match self.readings.get(&reading.space_id) {
                Some(existing) if reading.timestamp < existing.timestamp => {
                    // Late-arriving but older reading: discard
                }
                _ => {
                    self.readings.insert(reading.space_id.clone(), reading);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Snapshot of all current readings.
    pub fn current_readings(&self) -> Vec<SpaceReading> {
        self.readings.values().cloned().collect()
    }

    pub fn get(&self, space_id: &str) -> Option<&SpaceReading> {
        self.readings.get(space_id)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
