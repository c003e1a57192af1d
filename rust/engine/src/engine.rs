// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The activation state machine and apply-pass orchestration.
//!
//! The engine is either `Inactive` or `Active`. Readings accumulate in the
//! store regardless of state, but they reach the renderer only through the
//! explicit batch pass, and only while `Active`. Activation rebuilds the
//! correspondence index, enters isolation, and applies whatever the store
//! holds in one coalesced pass; deactivation clears every applied
//! highlight, restores non-space visibility, and returns the model to its
//! spaces-hidden resting state while keeping the store intact.
//!
//! Invariants:
//! - `Inactive` ⇒ the applied-highlight set is empty.
//! - `Active` ⇒ applied highlights ⊆ index entries ∩ stored readings.

use heatlens_core::{color_for, ConfigPatch, EngineConfig, SpaceReading};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::events::EngineEvent;
use crate::geometry::{GeometryApi, Highlight, LocalRef, ModelId};
use crate::index::CorrespondenceIndex;
use crate::isolation::IsolationController;
use crate::scheduler::BatchScheduler;
use crate::store::HeatDataStore;

/// Broadcast capacity for engine events. Slow consumers observe lag, they
/// never block the engine.
const EVENT_CAPACITY: usize = 64;

/// Engine activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Inactive,
    Active,
}

/// The heat-map overlay engine.
///
/// Constructed with an injected geometry backend; lifecycle is explicit
/// construction and drop, not a process-wide singleton.
pub struct HeatMapEngine<G: GeometryApi> {
    geometry: G,
    models: Vec<ModelId>,
    config: EngineConfig,
    index: CorrespondenceIndex,
    isolation: IsolationController,
    store: HeatDataStore,
    scheduler: BatchScheduler,
    /// Highlights currently painted: space id → renderable reference.
    applied: FxHashMap<String, (ModelId, LocalRef)>,
    state: State,
    events: broadcast::Sender<EngineEvent>,
    last_error: Option<String>,
}

impl<G: GeometryApi> HeatMapEngine<G> {
    pub fn new(geometry: G, config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            geometry,
            models: Vec::new(),
            config,
            index: CorrespondenceIndex::new(),
            isolation: IsolationController::new(),
            store: HeatDataStore::new(),
            scheduler: BatchScheduler::new(),
            applied: FxHashMap::default(),
            state: State::Inactive,
            events,
            last_error: None,
        }
    }

    // --- accessors ---

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &HeatDataStore {
        &self.store
    }

    pub fn index(&self) -> &CorrespondenceIndex {
        &self.index
    }

    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    /// The last activation error, if the most recent activation failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Space ids currently painted.
    pub fn applied_spaces(&self) -> Vec<&str> {
        self.applied.keys().map(String::as_str).collect()
    }

    /// Subscribes to engine notifications. Dropping the receiver
    /// unsubscribes; the engine never requires subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Pending debounced flush deadline, polled by the runner loop.
    pub fn next_flush(&self) -> Option<Instant> {
        self.scheduler.next_flush()
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is normal, not an error
        let _ = self.events.send(event);
    }

    // --- model lifecycle ---

    /// Replaces the model set and rebuilds the correspondence index
    /// wholesale. Called when models finish loading or change.
    pub async fn set_models(&mut self, models: Vec<ModelId>) {
        self.models = models;
        let stats = self.index.rebuild(&self.geometry, &self.models).await;
        self.emit(EngineEvent::MappingUpdated(stats));

        if self.state == State::Active {
            if self.config.isolate_spaces {
                self.isolation
                    .enter(&self.geometry, &self.models, &self.index)
                    .await;
            }
            self.apply_now().await;
        }
    }

    // --- data ingestion ---

    /// Merges a reading batch into the store. Never touches the renderer:
    /// while inactive, data just accumulates; while active, a debounced
    /// apply pass is scheduled.
    pub fn ingest(&mut self, batch: Vec<SpaceReading>) {
        if batch.is_empty() {
            return;
        }
        self.store.ingest(batch);
        self.emit(EngineEvent::DataUpdated(self.store.current_readings()));

        if self.state == State::Active {
            self.scheduler.note_ingest(Instant::now());
        }
    }

    // --- activation state machine ---

    /// Inactive → Active. Rebuilds the index (defensive, in case models
    /// changed), enters isolation when configured, applies stored readings
    /// in one coalesced pass. No-op if already active. On failure the
    /// engine stays inactive and the error is surfaced; there is no
    /// automatic retry.
    pub async fn activate(&mut self) -> Result<()> {
        if self.state == State::Active {
            return Ok(());
        }

        if let Err(err) = self.geometry.wait_ready().await {
            let message = err.to_string();
            tracing::warn!(error = %message, "activation failed");
            self.last_error = Some(message.clone());
            self.emit(EngineEvent::ActivationFailed(message.clone()));
            return Err(Error::Activation(message));
        }

        let stats = self.index.rebuild(&self.geometry, &self.models).await;
        self.emit(EngineEvent::MappingUpdated(stats));

        if self.config.isolate_spaces {
            self.isolation
                .enter(&self.geometry, &self.models, &self.index)
                .await;
        }

        self.state = State::Active;
        self.last_error = None;
        tracing::info!(
            readings = self.store.len(),
            spaces = self.index.len(),
            "heat map activated"
        );

        self.apply_now().await;
        Ok(())
    }

    /// Active → Inactive. Clears applied highlights, restores non-space
    /// visibility, then hides the space category so the model returns to
    /// its default spaces-invisible resting state. Stored readings are
    /// retained for the next activation. No-op if already inactive; safe
    /// to call while an apply pass is in flight.
    pub async fn deactivate(&mut self) {
        if self.state == State::Inactive {
            return;
        }

        // Flip state first: an in-flight pass checks it before each
        // renderer call.
        self.state = State::Inactive;
        self.scheduler.cancel();

        let applied = std::mem::take(&mut self.applied);
        let mut touched: FxHashSet<ModelId> = FxHashSet::default();
        for (_, (model, local_ref)) in applied {
            if let Err(err) = self.geometry.clear_highlight(model, &[local_ref]).await {
                tracing::warn!(model = model.0, element = local_ref.0, error = %err, "clear highlight failed");
            }
            touched.insert(model);
        }
        for model in touched {
            if let Err(err) = self.geometry.refresh(model).await {
                tracing::warn!(model = model.0, error = %err, "refresh failed");
            }
        }

        self.isolation.exit(&self.geometry).await;
        self.isolation
            .hide_spaces_only(&self.geometry, &self.models)
            .await;

        tracing::info!("heat map deactivated");
    }

    /// Deactivates if active, activates if inactive.
    pub async fn toggle(&mut self) -> Result<()> {
        if self.state == State::Active {
            self.deactivate().await;
            Ok(())
        } else {
            self.activate().await
        }
    }

    // --- configuration ---

    /// Merges a partial configuration. If active with data present, the
    /// apply pass re-runs under the new configuration; if the isolation
    /// flag changed, isolation is entered or exited accordingly. While
    /// inactive only the stored configuration changes — no renderer calls.
    pub async fn configure(&mut self, patch: &ConfigPatch) {
        if patch.is_empty() {
            return;
        }

        let was_isolating = self.config.isolate_spaces;
        self.config.apply(patch);

        if self.state != State::Active {
            return;
        }

        if self.config.isolate_spaces != was_isolating {
            if self.config.isolate_spaces {
                self.isolation
                    .enter(&self.geometry, &self.models, &self.index)
                    .await;
            } else {
                self.isolation.exit(&self.geometry).await;
            }
        }

        if !self.store.is_empty() {
            self.apply_now().await;
        }
    }

    // --- batch pass ---

    /// Runs one coalesced apply pass now, honoring the re-entrancy guard:
    /// a request made while a pass is running is deferred and executed
    /// right after, never concurrently.
    pub async fn apply_now(&mut self) {
        if !self.scheduler.begin_pass() {
            return;
        }
        loop {
            self.run_apply_pass().await;
            if !self.scheduler.finish_pass() {
                break;
            }
            if !self.scheduler.begin_pass() {
                break;
            }
        }
    }

    /// One pass: paint every stored reading that resolves through the
    /// index, clear highlights that lost their backing, then refresh each
    /// model touched exactly once. Zero readings means zero renderer calls.
    async fn run_apply_pass(&mut self) {
        if self.state != State::Active {
            return;
        }

        let readings = self.store.current_readings();
        let mut next_applied: FxHashMap<String, (ModelId, LocalRef)> = FxHashMap::default();
        let mut touched: FxHashSet<ModelId> = FxHashSet::default();
        let mut painted = 0usize;
        let mut skipped = 0usize;

        for reading in &readings {
            // Deactivation may land between suspension points
            if self.state != State::Active {
                return;
            }
            let Some(entry) = self.index.lookup(&reading.space_id) else {
                skipped += 1;
                continue;
            };
            let color = color_for(
                reading.temperature,
                &self.config.temperature_range,
                &self.config.color_scheme,
            );
            let highlight = Highlight::overlay(color, self.config.opacity);
            match self
                .geometry
                .highlight(entry.model, &[entry.local_ref], &highlight)
                .await
            {
                Ok(()) => {
                    next_applied.insert(reading.space_id.clone(), (entry.model, entry.local_ref));
                    touched.insert(entry.model);
                    painted += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        space_id = %reading.space_id,
                        error = %err,
                        "highlight failed, skipping space"
                    );
                }
            }
        }

        // Highlights no longer backed by a reading and an index entry
        let stale: Vec<(String, (ModelId, LocalRef))> = self
            .applied
            .iter()
            .filter(|(space_id, _)| !next_applied.contains_key(*space_id))
            .map(|(space_id, target)| (space_id.clone(), *target))
            .collect();
        for (space_id, (model, local_ref)) in stale {
            if self.state != State::Active {
                return;
            }
            if let Err(err) = self.geometry.clear_highlight(model, &[local_ref]).await {
                tracing::warn!(space_id = %space_id, error = %err, "clear highlight failed");
            }
            touched.insert(model);
        }

        self.applied = next_applied;

        for model in touched {
            if let Err(err) = self.geometry.refresh(model).await {
                tracing::warn!(model = model.0, error = %err, "refresh failed");
            }
        }

        if painted > 0 || skipped > 0 {
            tracing::debug!(painted, skipped, "apply pass complete");
        }
    }
}
