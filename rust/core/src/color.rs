// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature → color mapping.
//!
//! The mapping is deliberately a five-zone classification, not a smooth
//! gradient: a temperature is normalized against the configured range and
//! bucketed into cold/cool/optimal/warm/hot using both the normalized value
//! and the optimal band. Zone edges tie-break with the exact comparison
//! operators below (`<` against the band minimum, `<=` against the maximum).

use crate::config::{ColorScheme, Rgba, TemperatureRange};
use serde::{Deserialize, Serialize};

/// Normalized threshold below which a sub-optimal temperature is `Cold`
/// rather than `Cool`. Empirically tuned; do not re-derive.
pub const COLD_NORMALIZED_MAX: f64 = 0.3;

/// Normalized threshold below which a super-optimal temperature is `Warm`
/// rather than `Hot`. Empirically tuned; do not re-derive.
pub const WARM_NORMALIZED_MAX: f64 = 0.8;

/// Factor applied to the configured opacity for spaces without a reading.
pub const NO_DATA_OPACITY_FACTOR: f32 = 0.3;

/// The five discrete temperature zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Cold,
    Cool,
    Optimal,
    Warm,
    Hot,
}

/// Normalizes a temperature into `[0,1]` against the range, clamped at the
/// ends. A degenerate range (`max <= min`) normalizes everything to 0.
fn normalize(temperature: f64, range: &TemperatureRange) -> f64 {
    let span = range.max - range.min;
    if span <= 0.0 {
        return 0.0;
    }
    ((temperature - range.min) / span).clamp(0.0, 1.0)
}

/// Classifies a temperature into its zone.
pub fn zone_for(temperature: f64, range: &TemperatureRange) -> Zone {
    let normalized = normalize(temperature, range);

    if temperature < range.optimal.min {
        if normalized < COLD_NORMALIZED_MAX {
            Zone::Cold
        } else {
            Zone::Cool
        }
    } else if temperature <= range.optimal.max {
        Zone::Optimal
    } else if normalized < WARM_NORMALIZED_MAX {
        Zone::Warm
    } else {
        Zone::Hot
    }
}

/// Maps a temperature to its zone color.
pub fn color_for(temperature: f64, range: &TemperatureRange, scheme: &ColorScheme) -> Rgba {
    match zone_for(temperature, range) {
        Zone::Cold => scheme.cold,
        Zone::Cool => scheme.cool,
        Zone::Optimal => scheme.optimal,
        Zone::Warm => scheme.warm,
        Zone::Hot => scheme.hot,
    }
}

/// Color and reduced opacity for a space that has no reading.
pub fn no_data_color(scheme: &ColorScheme, opacity: f32) -> (Rgba, f32) {
    (scheme.no_data, (opacity * NO_DATA_OPACITY_FACTOR).clamp(0.0, 1.0))
}
