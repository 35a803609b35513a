//! Per-file progress reporting.
//!
//! A probe run over a directory can take `files × max_wait` in the worst
//! case, so callers can register a [`ProgressCallback`] on
//! [`ProbeOptions`](crate::ProbeOptions) to be told after each file.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use playprobe::{ProbeOptions, ProbeProgress, ProgressCallback};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProbeProgress) {
//!         println!("[{}/{}] {}", info.current, info.total, info.file_name);
//!     }
//! }
//!
//! let options = ProbeOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::time::Duration;

use tokio::time::Instant;

/// A snapshot taken after one file has been probed.
#[derive(Debug, Clone)]
pub struct ProbeProgress {
    /// How many files have been probed so far, including this one.
    pub current: u64,
    /// Total number of files in the run.
    pub total: u64,
    /// Display name of the file that was just probed.
    pub file_name: String,
    /// Whether the probe of this file succeeded.
    pub succeeded: bool,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
}

impl ProbeProgress {
    /// Completion percentage (0.0 – 100.0).
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            (self.current as f32 / self.total as f32) * 100.0
        }
    }
}

/// Trait for receiving progress updates during a probe run.
///
/// Callbacks are infallible and are invoked on the task driving the run,
/// between files. They must not block for long.
pub trait ProgressCallback: Send + Sync {
    /// Called once per file, after its probe finished.
    fn on_progress(&self, info: &ProbeProgress);
}

/// Discards all progress notifications. The default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProbeProgress) {}
}

/// Tracks position and timing within a run and builds snapshots.
pub(crate) struct ProgressTracker {
    total: u64,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total: total as u64,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one finished file and return the snapshot to report.
    pub(crate) fn advance(&mut self, file_name: &str, succeeded: bool) -> ProbeProgress {
        self.current += 1;
        ProbeProgress {
            current: self.current,
            total: self.total,
            file_name: file_name.to_string(),
            succeeded,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_counts_up() {
        let mut tracker = ProgressTracker::new(2);
        let first = tracker.advance("a.mp4", true);
        assert_eq!((first.current, first.total), (1, 2));
        assert_eq!(first.percentage(), 50.0);

        let second = tracker.advance("b.mp4", false);
        assert_eq!(second.current, 2);
        assert!(!second.succeeded);
        assert_eq!(second.percentage(), 100.0);
    }
}
