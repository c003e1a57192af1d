// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine runner: a single task owning the engine, driven by a command
//! channel, the debounce deadline, and the periodic refresh tick.
//!
//! Commands are processed one at a time; because every geometry call is an
//! await point inside this one task, batch passes are serialized by
//! construction and a `deactivate` issued during an in-flight pass takes
//! effect before the next renderer call.

use heatlens_core::{ConfigPatch, SpaceReading};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

use crate::engine::HeatMapEngine;
use crate::error::{Error, Result};
use crate::geometry::{GeometryApi, ModelId};
use crate::integration::{SensorReading, SensorSpaceIntegrationService};

/// Commands accepted by the runner loop.
#[derive(Debug)]
pub enum EngineCommand {
    Activate,
    Deactivate,
    Toggle,
    /// Replace the loaded model set and rebuild the correspondence index.
    SetModels(Vec<ModelId>),
    /// Pre-aggregated per-space readings.
    Ingest(Vec<SpaceReading>),
    /// Raw per-sensor readings, aggregated per space before ingestion.
    Sensors(Vec<SensorReading>),
    Configure(ConfigPatch),
    Shutdown,
}

/// Cloneable handle for sending commands to a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Creates a command channel; pass the receiver to [`run`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EngineCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    async fn send(&self, command: EngineCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    pub async fn activate(&self) -> Result<()> {
        self.send(EngineCommand::Activate).await
    }

    pub async fn deactivate(&self) -> Result<()> {
        self.send(EngineCommand::Deactivate).await
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(EngineCommand::Toggle).await
    }

    pub async fn set_models(&self, models: Vec<ModelId>) -> Result<()> {
        self.send(EngineCommand::SetModels(models)).await
    }

    pub async fn ingest(&self, batch: Vec<SpaceReading>) -> Result<()> {
        self.send(EngineCommand::Ingest(batch)).await
    }

    pub async fn sensors(&self, batch: Vec<SensorReading>) -> Result<()> {
        self.send(EngineCommand::Sensors(batch)).await
    }

    pub async fn configure(&self, patch: ConfigPatch) -> Result<()> {
        self.send(EngineCommand::Configure(patch)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(EngineCommand::Shutdown).await
    }
}

/// Drives the engine until the channel closes or [`EngineCommand::Shutdown`]
/// arrives. Single-threaded cooperative scheduling: commands, the debounced
/// flush, and the periodic refresh interleave at await points only.
pub async fn run<G: GeometryApi>(
    mut engine: HeatMapEngine<G>,
    mut rx: mpsc::Receiver<EngineCommand>,
) {
    let mut integration = SensorSpaceIntegrationService::new();
    // Armed while active; re-applies the current reading set each tick.
    let mut next_tick: Option<Instant> = None;

    loop {
        let flush_at = engine.next_flush();

        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };
                match command {
                    EngineCommand::Activate => {
                        if engine.activate().await.is_ok() {
                            next_tick = Some(Instant::now() + refresh_period(&engine));
                        }
                    }
                    EngineCommand::Deactivate => {
                        engine.deactivate().await;
                        next_tick = None;
                    }
                    EngineCommand::Toggle => {
                        let _ = engine.toggle().await;
                        next_tick = engine
                            .is_active()
                            .then(|| Instant::now() + refresh_period(&engine));
                    }
                    EngineCommand::SetModels(models) => {
                        engine.set_models(models).await;
                    }
                    EngineCommand::Ingest(batch) => {
                        engine.ingest(batch);
                    }
                    EngineCommand::Sensors(batch) => {
                        integration.push(batch);
                        let aggregated = integration.drain_aggregated();
                        engine.ingest(aggregated);
                    }
                    EngineCommand::Configure(patch) => {
                        engine.configure(&patch).await;
                        if engine.is_active() {
                            next_tick = Some(Instant::now() + refresh_period(&engine));
                        }
                    }
                    EngineCommand::Shutdown => break,
                }
            }
            // Debounced flush of coalesced ingests
            _ = sleep_until(flush_at.unwrap_or_else(far_future)), if flush_at.is_some() => {
                engine.apply_now().await;
            }
            // Periodic re-apply while active
            _ = sleep_until(next_tick.unwrap_or_else(far_future)), if next_tick.is_some() => {
                engine.apply_now().await;
                next_tick = Some(Instant::now() + refresh_period(&engine));
            }
        }
    }

    // Leave the scene in its resting state on shutdown
    engine.deactivate().await;
}

fn refresh_period<G: GeometryApi>(engine: &HeatMapEngine<G>) -> Duration {
    Duration::from_millis(engine.config().update_interval_ms.max(1))
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400)
}
