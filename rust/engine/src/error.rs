// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the heat-map engine.
//!
//! Per-element and per-model geometry faults never surface here: they are
//! caught, logged, and skipped inside the enclosing scan. Only activation
//! faults propagate outward.

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Activation failed; the engine remains inactive. No automatic retry
    /// is performed, the caller must activate again.
    #[error("activation failed: {0}")]
    Activation(String),

    /// A geometry backend call failed. Used by collaborators to describe
    /// individual call failures; recovered locally in scan paths.
    #[error("geometry backend error: {0}")]
    Geometry(String),

    /// The engine command channel closed before the command was delivered.
    #[error("engine command channel closed")]
    ChannelClosed,
}
