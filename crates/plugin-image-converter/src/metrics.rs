//! Walk counters.
//!
//! Counters are atomics so one `WalkMetrics` can be shared through an `Arc`
//! by every walker a converter creates. Walk durations are kept in a
//! bounded sample buffer for percentile reporting.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum number of walk duration samples kept in memory.
const MAX_DURATION_SAMPLES: usize = 256;

/// Counters accumulated across walks.
#[derive(Debug)]
pub struct WalkMetrics {
    /// Images the walker tried to explode.
    pub images_attempted: AtomicU64,
    /// Images exploded into at least one face.
    pub images_converted: AtomicU64,
    /// Images that failed and were left in place or destroyed without faces.
    pub images_failed: AtomicU64,
    /// Faces produced by explode.
    pub faces_created: AtomicU64,
    /// Container edit contexts opened.
    pub containers_entered: AtomicU64,
    /// Containers skipped after a recoverable failure.
    pub containers_failed: AtomicU64,
    /// Walks that reached the end of the tree.
    pub walks_completed: AtomicU64,
    /// Walks stopped by a fatal error.
    pub walks_aborted: AtomicU64,
    duration_samples: Mutex<Vec<Duration>>,
}

impl WalkMetrics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            images_attempted: AtomicU64::new(0),
            images_converted: AtomicU64::new(0),
            images_failed: AtomicU64::new(0),
            faces_created: AtomicU64::new(0),
            containers_entered: AtomicU64::new(0),
            containers_failed: AtomicU64::new(0),
            walks_completed: AtomicU64::new(0),
            walks_aborted: AtomicU64::new(0),
            duration_samples: Mutex::new(Vec::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    pub fn record_image_attempted(&self) {
        self.images_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_image_converted(&self, faces: usize) {
        self.images_converted.fetch_add(1, Ordering::Relaxed);
        self.faces_created.fetch_add(faces as u64, Ordering::Relaxed);
    }

    pub fn record_image_failed(&self) {
        self.images_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_container_entered(&self) {
        self.containers_entered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_container_failed(&self) {
        self.containers_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished walk and its duration.
    pub fn record_walk_completed(&self, duration: Duration) {
        self.walks_completed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.remove(0);
            }
            samples.push(duration);
        }
    }

    pub fn record_walk_aborted(&self) {
        self.walks_aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut durations = self
            .duration_samples
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        durations.sort();

        MetricsSnapshot {
            images_attempted: self.images_attempted.load(Ordering::Relaxed),
            images_converted: self.images_converted.load(Ordering::Relaxed),
            images_failed: self.images_failed.load(Ordering::Relaxed),
            faces_created: self.faces_created.load(Ordering::Relaxed),
            containers_entered: self.containers_entered.load(Ordering::Relaxed),
            containers_failed: self.containers_failed.load(Ordering::Relaxed),
            walks_completed: self.walks_completed.load(Ordering::Relaxed),
            walks_aborted: self.walks_aborted.load(Ordering::Relaxed),
            walk_p50_ms: percentile(&durations, 50),
            walk_max_ms: durations.last().map(|d| d.as_millis() as u64),
        }
    }
}

impl Default for WalkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn percentile(sorted: &[Duration], pct: usize) -> Option<u64> {
    sorted
        .get(sorted.len() * pct / 100)
        .map(|d| d.as_millis() as u64)
}

/// A point-in-time copy of [`WalkMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub images_attempted: u64,
    pub images_converted: u64,
    pub images_failed: u64,
    pub faces_created: u64,
    pub containers_entered: u64,
    pub containers_failed: u64,
    pub walks_completed: u64,
    pub walks_aborted: u64,
    /// Median walk duration in milliseconds.
    pub walk_p50_ms: Option<u64>,
    /// Slowest walk in milliseconds.
    pub walk_max_ms: Option<u64>,
}
