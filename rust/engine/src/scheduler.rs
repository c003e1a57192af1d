// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch scheduling: coalesce a stream of ingests into one debounced apply
//! pass, and serialize passes with a re-entrancy guard.
//!
//! A pure state machine: the runner loop owns the clock and asks when the
//! next flush is due. The first ingest of a burst arms a fixed deadline;
//! further ingests inside the window coalesce into the same pass (the
//! deadline is not extended, so a continuous stream cannot starve the
//! flush). While a pass is running, a second request is deferred, never run
//! concurrently.

use tokio::time::{Duration, Instant};

/// Debounce window and pass serialization for reading batches.
#[derive(Debug)]
pub struct BatchScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
    applying: bool,
    deferred: bool,
}

impl BatchScheduler {
    /// Default debounce window between the first ingest of a burst and the
    /// coalesced apply pass.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_debounce(Self::DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            applying: false,
            deferred: false,
        }
    }

    /// Notes that a batch arrived. Arms the flush deadline if none is
    /// pending; bursts inside the window coalesce into one pass.
    pub fn note_ingest(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.debounce);
        }
    }

    /// The pending flush deadline, if one is armed.
    pub fn next_flush(&self) -> Option<Instant> {
        self.deadline
    }

    /// `true` once the armed deadline has passed.
    pub fn due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Tries to start an apply pass. Returns `false` — and marks a pass as
    /// deferred — if one is already running.
    pub fn begin_pass(&mut self) -> bool {
        if self.applying {
            self.deferred = true;
            return false;
        }
        self.applying = true;
        self.deadline = None;
        true
    }

    /// Ends the running pass. Returns `true` if another pass was requested
    /// while this one ran and should be executed now.
    pub fn finish_pass(&mut self) -> bool {
        self.applying = false;
        std::mem::take(&mut self.deferred)
    }

    /// Drops any armed deadline without running a pass.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.deferred = false;
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new()
    }
}
