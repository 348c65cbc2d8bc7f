// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared in-memory queue between the event handlers and the flusher.

use std::sync::Mutex;

use crate::point::Point;

/// Points waiting for the next flush, oldest first. All access goes through
/// one mutex; callers hold the lock only long enough to move vectors around.
#[derive(Debug, Default)]
pub struct PointBuffer {
    points: Mutex<Vec<Point>>,
}

impl PointBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends points behind everything already queued. An empty batch does
    /// not take the lock.
    #[allow(clippy::expect_used)]
    pub fn append(&self, mut points: Vec<Point>) {
        if points.is_empty() {
            return;
        }
        let mut guard = self.points.lock().expect("lock poisoned");
        guard.append(&mut points);
    }

    /// Takes every queued point, leaving the buffer empty.
    #[allow(clippy::expect_used)]
    pub fn drain(&self) -> Vec<Point> {
        let mut guard = self.points.lock().expect("lock poisoned");
        std::mem::take(&mut *guard)
    }

    /// Puts a failed batch back in front of anything queued since it was
    /// drained, so a later flush still sends points oldest first.
    #[allow(clippy::expect_used)]
    pub fn requeue_front(&self, mut older: Vec<Point>) {
        if older.is_empty() {
            return;
        }
        let mut guard = self.points.lock().expect("lock poisoned");
        older.append(&mut guard);
        *guard = older;
    }

    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.points.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
