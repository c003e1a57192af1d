// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-space sensor readings and their quality classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall quality of an aggregated reading.
///
/// Ordered by severity: `Good < Warning < Critical < Error`, so the worst
/// observed quality for a space is simply the `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Good,
    Warning,
    Critical,
    Error,
}

impl Quality {
    /// Returns the more severe of two qualities.
    pub fn worst(self, other: Quality) -> Quality {
        self.max(other)
    }
}

/// One aggregated reading for a building space.
///
/// Immutable once constructed: a newer reading with the same `space_id`
/// supersedes it during a store merge, it is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceReading {
    /// Stable space identifier, independent of any load session.
    pub space_id: String,
    /// Human-readable space name as found in the model.
    pub space_name: String,
    /// Temperature in degrees Celsius, supplied externally.
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<u32>,
    /// When the reading was taken (ISO-8601 on the wire).
    pub timestamp: DateTime<Utc>,
    pub quality: Quality,
}

impl SpaceReading {
    /// Convenience constructor for a temperature-only reading.
    pub fn new(
        space_id: impl Into<String>,
        space_name: impl Into<String>,
        temperature: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            space_id: space_id.into(),
            space_name: space_name.into(),
            temperature,
            humidity: None,
            occupancy: None,
            timestamp,
            quality: Quality::Good,
        }
    }
}
