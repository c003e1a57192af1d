// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Heatlens Engine
//!
//! A stateful heat-map overlay engine for 3D building models. Periodic
//! sensor readings keyed to logical building spaces are merged, debounced,
//! and painted onto space geometry, while non-space geometry is temporarily
//! hidden so the colored spaces are unobstructed.
//!
//! The engine is an explicit instance with a constructor-injected geometry
//! backend (the [`GeometryApi`] trait); there is no process-wide singleton
//! and no global event bus. Consumers subscribe to [`EngineEvent`]
//! notifications through a broadcast channel and unsubscribe by dropping
//! the receiver.
//!
//! Data flow:
//!
//! ```text
//! telemetry → SensorSpaceIntegrationService → HeatDataStore (debounced)
//!           → [gated by activation state] → CorrespondenceIndex lookup
//!           → color mapping → highlight calls → one refresh per model
//! ```
//!
//! Concurrency model: single-threaded cooperative scheduling. Every call
//! into the geometry backend is an await point; overlapping apply passes
//! are prevented by the scheduler's re-entrancy flags, not locks.

pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod index;
pub mod integration;
pub mod isolation;
pub mod runner;
pub mod scheduler;
pub mod store;

#[cfg(test)]
pub(crate) mod testgeo;

pub use engine::{HeatMapEngine, State};
pub use error::{Error, Result};
pub use events::{EngineEvent, MappingStats};
pub use geometry::{FaceStyle, GeometryApi, Highlight, LocalRef, ModelId, SPACE_CATEGORY};
pub use index::CorrespondenceIndex;
pub use integration::{SensorKind, SensorReading, SensorSpaceIntegrationService};
pub use runner::{run, EngineCommand, EngineHandle};
pub use store::HeatDataStore;
