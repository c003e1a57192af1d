// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration with partial-merge reconfiguration.

use serde::{Deserialize, Serialize};

/// RGBA color, components in `[0,1]`.
pub type Rgba = [f32; 4];

/// The comfortable sub-range inside the full temperature range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalBand {
    pub min: f64,
    pub max: f64,
}

/// Temperature range the color mapping normalizes against.
///
/// Numeric fields are not validated defensively; callers supply sane values
/// (`min < max`, optimal band inside the range).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    pub optimal: OptimalBand,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self {
            min: 15.0,
            max: 32.0,
            optimal: OptimalBand { min: 20.0, max: 24.0 },
        }
    }
}

/// One color per zone, plus the color used for spaces without a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub cold: Rgba,
    pub cool: Rgba,
    pub optimal: Rgba,
    pub warm: Rgba,
    pub hot: Rgba,
    pub no_data: Rgba,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            cold: [0.18, 0.35, 0.90, 1.0],
            cool: [0.30, 0.70, 0.95, 1.0],
            optimal: [0.25, 0.80, 0.35, 1.0],
            warm: [0.98, 0.65, 0.15, 1.0],
            hot: [0.92, 0.20, 0.15, 1.0],
            no_data: [0.55, 0.55, 0.58, 1.0],
        }
    }
}

/// Full engine configuration, supplied at construction and replaceable at
/// runtime via [`ConfigPatch`]. Reapplying the same configuration produces
/// the same visuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub temperature_range: TemperatureRange,
    pub color_scheme: ColorScheme,
    /// Highlight opacity in `[0,1]`.
    pub opacity: f32,
    /// Cadence of the periodic re-apply while active.
    pub update_interval_ms: u64,
    /// Whether activation isolates room geometry.
    pub isolate_spaces: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temperature_range: TemperatureRange::default(),
            color_scheme: ColorScheme::default(),
            opacity: 0.65,
            update_interval_ms: 30_000,
            isolate_spaces: true,
        }
    }
}

/// A partial configuration: any subset of [`EngineConfig`] fields.
/// Unset fields retain their prior values when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_range: Option<TemperatureRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolate_spaces: Option<bool>,
}

impl ConfigPatch {
    /// `true` if applying this patch cannot change anything.
    pub fn is_empty(&self) -> bool {
        self.temperature_range.is_none()
            && self.color_scheme.is_none()
            && self.opacity.is_none()
            && self.update_interval_ms.is_none()
            && self.isolate_spaces.is_none()
    }
}

impl EngineConfig {
    /// Merges a partial configuration into this one. Unspecified fields are
    /// left untouched; an empty patch is a no-op.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(range) = patch.temperature_range {
            self.temperature_range = range;
        }
        if let Some(scheme) = patch.color_scheme {
            self.color_scheme = scheme;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(interval) = patch.update_interval_ms {
            self.update_interval_ms = interval;
        }
        if let Some(isolate) = patch.isolate_spaces {
            self.isolate_spaces = isolate;
        }
    }
}
