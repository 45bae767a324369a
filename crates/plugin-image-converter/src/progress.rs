//! Progress reporting during a conversion walk.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Images converted so far out of the total counted before the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub converted: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`. An empty walk is complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.converted as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converted {} of {} images...", self.converted, self.total)
    }
}

/// Receives a [`Progress`] after every successful image conversion.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressObserver for F {
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&mut self, _progress: Progress) {}
}

/// Keeps every update, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    updates: Vec<Progress>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> &[Progress] {
        &self.updates
    }

    pub fn last(&self) -> Option<Progress> {
        self.updates.last().copied()
    }
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&mut self, progress: Progress) {
        self.updates.push(progress);
    }
}
