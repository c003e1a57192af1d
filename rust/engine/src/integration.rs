// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor → space integration.
//!
//! Raw per-sensor readings are aggregated into one reading per space:
//! same-kind sensor values are averaged, humidity and occupancy are
//! unioned where present, the timestamp is the newest contributing one,
//! and the overall quality is the worst observed for the space. The engine
//! consumes the output purely as `SpaceReading` batches.

use chrono::{DateTime, Utc};
use heatlens_core::{Quality, SpaceReading};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Occupancy,
}

/// One raw reading from one sensor, tagged with the space it sits in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub space_id: String,
    pub space_name: String,
    pub kind: SensorKind,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub quality: Quality,
}

/// Running aggregate for one space.
#[derive(Debug, Default)]
struct SpaceAccumulator {
    space_name: String,
    temperature_sum: f64,
    temperature_count: u32,
    humidity_sum: f64,
    humidity_count: u32,
    occupancy_sum: f64,
    occupancy_count: u32,
    newest: Option<DateTime<Utc>>,
    worst_quality: Option<Quality>,
}

impl SpaceAccumulator {
    fn add(&mut self, reading: &SensorReading) {
        if self.space_name.is_empty() {
            self.space_name = reading.space_name.clone();
        }
        match reading.kind {
            SensorKind::Temperature => {
                self.temperature_sum += reading.value;
                self.temperature_count += 1;
            }
            SensorKind::Humidity => {
                self.humidity_sum += reading.value;
                self.humidity_count += 1;
            }
            SensorKind::Occupancy => {
                self.occupancy_sum += reading.value;
                self.occupancy_count += 1;
            }
        }
        self.newest = Some(match self.newest {
            Some(current) => current.max(reading.timestamp),
            None => reading.timestamp,
        });
        self.worst_quality = Some(match self.worst_quality {
            Some(current) => current.worst(reading.quality),
            None => reading.quality,
        });
    }

    fn finish(self, space_id: String) -> Option<SpaceReading> {
        // A space without a temperature sensor produces no reading
        if self.temperature_count == 0 {
            return None;
        }
        Some(SpaceReading {
            space_id,
            space_name: self.space_name,
            temperature: self.temperature_sum / f64::from(self.temperature_count),
            humidity: (self.humidity_count > 0)
                .then(|| self.humidity_sum / f64::from(self.humidity_count)),
            occupancy: (self.occupancy_count > 0)
                .then(|| (self.occupancy_sum / f64::from(self.occupancy_count)).round() as u32),
            timestamp: self.newest.unwrap_or_else(Utc::now),
            quality: self.worst_quality.unwrap_or(Quality::Good),
        })
    }
}

/// Aggregates raw sensor readings into per-space batches.
#[derive(Debug, Default)]
pub struct SensorSpaceIntegrationService {
    buffered: Vec<SensorReading>,
}

impl SensorSpaceIntegrationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers raw sensor readings for the next aggregation.
    pub fn push(&mut self, readings: Vec<SensorReading>) {
        self.buffered.extend(readings);
    }

    /// Number of buffered raw readings.
    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }

    /// Aggregates and drains everything buffered, returning one reading
    /// per space that had at least one temperature sensor.
    pub fn drain_aggregated(&mut self) -> Vec<SpaceReading> {
        let buffered = std::mem::take(&mut self.buffered);
        aggregate(&buffered)
    }

    /// Immediate refresh: aggregate whatever is buffered right now without
    /// waiting for the next scheduled drain.
    pub fn refresh_now(&mut self) -> Vec<SpaceReading> {
        self.drain_aggregated()
    }
}

/// Aggregates a slice of raw readings into per-space readings.
pub fn aggregate(readings: &[SensorReading]) -> Vec<SpaceReading> {
    let mut by_space: FxHashMap<String, SpaceAccumulator> = FxHashMap::default();
    for reading in readings {
        by_space
            .entry(reading.space_id.clone())
            .or_default()
            .add(reading);
    }

    let mut result: Vec<SpaceReading> = by_space
        .into_iter()
        .filter_map(|(space_id, acc)| acc.finish(space_id))
        .collect();
    // Deterministic batch order
    result.sort_by(|a, b| a.space_id.cmp(&b.space_id));
    result
}
