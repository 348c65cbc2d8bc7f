// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Periodic flush of the point buffer with bounded retry.
//!
//! Each tick drains the buffer and hands the batch to the sink. A failed
//! batch goes back in front of newer points and a failure counter climbs;
//! once it reaches the configured limit the next tick throws the backlog
//! away instead of sending, so a dead destination cannot grow memory
//! without bound.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::buffer::PointBuffer;
use crate::influx::PointSink;
use crate::point::TimePrecision;

pub struct Flusher {
    buffer: Arc<PointBuffer>,
    sink: Arc<dyn PointSink + Send + Sync>,
    precision: TimePrecision,
    tick_limit: u32,
    ticks: u32,
}

pub struct FlusherConfig {
    pub buffer: Arc<PointBuffer>,
    pub sink: Arc<dyn PointSink + Send + Sync>,
    pub precision: TimePrecision,
    pub tick_limit: u32,
}

impl Flusher {
    pub fn new(config: FlusherConfig) -> Self {
        Flusher {
            buffer: config.buffer,
            sink: config.sink,
            precision: config.precision,
            tick_limit: config.tick_limit,
            ticks: 0,
        }
    }

    /// Runs one flush attempt. Ticks are serial; the caller drives them from
    /// a single interval loop.
    pub async fn tick(&mut self) {
        if self.ticks >= self.tick_limit {
            // The backlog has been failing for a full retry window. Drop it,
            // newer points included, and start over.
            let discarded = self.buffer.drain();
            if !discarded.is_empty() {
                error!(
                    "no successful flush in {} ticks, discarding {} points",
                    self.tick_limit,
                    discarded.len()
                );
            }
            self.ticks = 0;
            return;
        }

        let batch = self.buffer.drain();
        if batch.is_empty() {
            return;
        }

        match self.sink.write(&batch, self.precision).await {
            Ok(()) => {
                debug!("flushed {} points", batch.len());
                self.ticks = 0;
            }
            Err(e) => {
                self.ticks += 1;
                warn!(
                    "flush failed ({}/{}), requeueing {} points: {e}",
                    self.ticks,
                    self.tick_limit,
                    batch.len()
                );
                self.buffer.requeue_front(batch);
            }
        }
    }

    #[cfg(test)]
    fn ticks(&self) -> u32 {
        self.ticks
    }
}
