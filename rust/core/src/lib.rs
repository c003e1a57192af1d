// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Heatlens Core
//!
//! Data model and pure functions for the heat-map overlay engine:
//!
//! - [`SpaceReading`] / [`Quality`] — one aggregated sensor reading per
//!   building space, superseded (never mutated) by newer readings.
//! - [`EngineConfig`] / [`ConfigPatch`] — temperature range, color scheme
//!   and update cadence, with partial-merge reconfiguration.
//! - [`color`] — the five-zone temperature → color mapping.
//! - [`attr`] — a normalized attribute reader that decodes the geometry
//!   backend's loosely shaped property bags into one tagged union at the
//!   boundary.
//!
//! Nothing here touches a renderer or an async runtime; the stateful engine
//! lives in `heatlens-engine`.

pub mod attr;
pub mod color;
pub mod config;
pub mod reading;

pub use attr::{AttrBag, AttrError, AttrValue};
pub use color::{color_for, no_data_color, zone_for, Zone};
pub use config::{ColorScheme, ConfigPatch, EngineConfig, OptimalBand, Rgba, TemperatureRange};
pub use reading::{Quality, SpaceReading};
