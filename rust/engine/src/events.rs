// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer-style notifications produced by the engine.
//!
//! The engine broadcasts events over a `tokio::sync::broadcast` channel.
//! [`crate::HeatMapEngine::subscribe`] returns a receiver; dropping it
//! unsubscribes. The engine never requires subscribers to exist — send
//! errors with no receivers are ignored.

use heatlens_core::SpaceReading;
use serde::{Deserialize, Serialize};

/// Statistics about the current space ↔ geometry correspondence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStats {
    /// Models scanned during the last rebuild.
    pub models: usize,
    /// Space-category elements seen (rooms and area markers).
    pub spaces: usize,
    /// Elements classified as real rooms.
    pub rooms: usize,
    /// Elements excluded by the area-marker naming convention.
    pub area_markers: usize,
    /// Elements skipped because an identifier or attribute read failed.
    pub skipped: usize,
}

/// Notifications fired by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The heat data store merged a batch. Carries the full current
    /// reading set; data availability, not a render instruction.
    DataUpdated(Vec<SpaceReading>),
    /// The correspondence index was rebuilt.
    MappingUpdated(MappingStats),
    /// Activation failed; the engine stayed inactive.
    ActivationFailed(String),
}
