//! Probe configuration.
//!
//! [`ProbeOptions`] is a builder that threads timing limits, the sidecar
//! filter, the failure policy and the progress callback through a probe run
//! without polluting every function signature.
//!
//! The disposal delay and settle delay work around a teardown crash in
//! native playback libraries: disposing a player very shortly after `play`
//! can take the process down. Both values are empirical.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use playprobe::{FailurePolicy, ProbeOptions};
//!
//! let options = ProbeOptions::new()
//!     .with_max_wait(Duration::from_secs(5))
//!     .with_disposal_delay(Duration::from_millis(750))
//!     .with_failure_policy(FailurePolicy::Continue);
//! assert_eq!(options.max_wait(), Duration::from_secs(5));
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::progress::{NoOpProgress, ProgressCallback};

/// Default maximum time to wait for duration metadata per file.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

/// Default polling cadence, roughly one frame at 60 Hz.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Default delay between handing a player to the disposal queue and
/// actually disposing it.
pub const DEFAULT_DISPOSAL_DELAY: Duration = Duration::from_millis(500);

/// Default best-effort drain after the last file, giving in-flight disposals
/// time to finish.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Default sidecar suffixes skipped during file enumeration.
pub const DEFAULT_SIDECAR_SUFFIXES: &[&str] = &[".meta"];

/// What a multi-file run does after one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and skip the remaining files. The default.
    #[default]
    Abort,
    /// Record the failure and carry on with the next file.
    Continue,
}

/// Configuration for a probe run.
///
/// Defaults: 10 s maximum
/// wait, 16 ms polling, 500 ms disposal delay, 1 s settle, `.meta` sidecars
/// skipped, abort on first failure.
#[derive(Clone)]
pub struct ProbeOptions {
    pub(crate) max_wait: Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) disposal_delay: Duration,
    pub(crate) settle_delay: Duration,
    pub(crate) sidecar_suffixes: Vec<String>,
    pub(crate) failure_policy: FailurePolicy,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ProbeOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ProbeOptions")
            .field("max_wait", &self.max_wait)
            .field("poll_interval", &self.poll_interval)
            .field("disposal_delay", &self.disposal_delay)
            .field("settle_delay", &self.settle_delay)
            .field("sidecar_suffixes", &self.sidecar_suffixes)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            disposal_delay: DEFAULT_DISPOSAL_DELAY,
            settle_delay: DEFAULT_SETTLE_DELAY,
            sidecar_suffixes: DEFAULT_SIDECAR_SUFFIXES
                .iter()
                .map(|suffix| suffix.to_string())
                .collect(),
            failure_policy: FailurePolicy::Abort,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the maximum time to wait for duration metadata per file.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Set how often readiness is polled.
    ///
    /// Clamped to a minimum of 1 ms; a zero-period interval would spin.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the delay before a scheduled disposal runs.
    #[must_use]
    pub fn with_disposal_delay(mut self, delay: Duration) -> Self {
        self.disposal_delay = delay;
        self
    }

    /// Set the drain interval after the last file.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Replace the sidecar suffix list used by file enumeration.
    #[must_use]
    pub fn with_sidecar_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sidecar_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set what happens after a file fails.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Attach a progress callback, invoked once per file.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Maximum wait for duration metadata.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Readiness polling cadence.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Delay before each disposal.
    pub fn disposal_delay(&self) -> Duration {
        self.disposal_delay
    }

    /// Drain interval after the last file.
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Suffixes excluded from enumeration.
    pub fn sidecar_suffixes(&self) -> &[String] {
        &self.sidecar_suffixes
    }

    /// Behaviour after a failed file.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}
