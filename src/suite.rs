//! One-time setup and teardown around a probe run.
//!
//! [`ProbeSuite`] owns the engine for the lifetime of a run. Setup wraps
//! the engine once. The run methods probe files sequentially. Teardown waits
//! for every delayed disposal and only then disposes the engine, so the
//! engine is always released last.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use playprobe::{ProbeOptions, ProbeSuite, Readiness, SimulatedEngine};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), playprobe::ProbeError> {
//! let engine = SimulatedEngine::new()
//!     .with_file("clip.mp4", Readiness::after(Duration::from_millis(20), 5000));
//! let options = ProbeOptions::new()
//!     .with_disposal_delay(Duration::from_millis(5))
//!     .with_settle_delay(Duration::ZERO);
//!
//! let suite = ProbeSuite::setup(engine, options);
//! let run = suite.run_files(&["clip.mp4"]).await;
//! assert!(run.is_success());
//! suite.teardown().await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use crate::{
    configuration::ProbeOptions,
    discovery::list_media_files,
    disposal::DisposalSummary,
    engine::{EngineHandle, MediaEngine},
    error::ProbeError,
    probe::{PlaybackProbe, ProbeRun},
};

/// A probe run with explicit setup and teardown.
#[derive(Debug)]
pub struct ProbeSuite<E: MediaEngine> {
    probe: PlaybackProbe<E>,
}

impl<E: MediaEngine> ProbeSuite<E> {
    /// One-time setup: take ownership of an initialised engine.
    pub fn setup(engine: E, options: ProbeOptions) -> Self {
        log::debug!("Setting up probe suite on {} engine", engine.name());
        Self {
            probe: PlaybackProbe::new(EngineHandle::new(engine), options),
        }
    }

    /// The underlying probe, for single-file probing.
    pub fn probe(&self) -> &PlaybackProbe<E> {
        &self.probe
    }

    /// List the candidate files of `directory` using the configured sidecar
    /// suffixes.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::DirectoryRead`] if the directory cannot be read.
    pub fn discover<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<PathBuf>, ProbeError> {
        list_media_files(directory, self.probe.options().sidecar_suffixes())
    }

    /// Probe every candidate file of `directory` in name order.
    ///
    /// # Errors
    ///
    /// Only enumeration errors are returned here; per-file failures are in
    /// the returned [`ProbeRun`].
    pub async fn run_directory<P: AsRef<Path>>(&self, directory: P) -> Result<ProbeRun, ProbeError> {
        let files = self.discover(directory)?;
        Ok(self.probe.probe_files(&files).await)
    }

    /// Probe an explicit list of files in the given order.
    pub async fn run_files<P: AsRef<Path>>(&self, paths: &[P]) -> ProbeRun {
        self.probe.probe_files(paths).await
    }

    /// One-time teardown: wait for pending disposals, then dispose the engine.
    ///
    /// # Errors
    ///
    /// Returns the engine's dispose error. Individual player disposal
    /// failures are reported in the returned [`DisposalSummary`].
    pub async fn teardown(self) -> Result<DisposalSummary, ProbeError> {
        let summary = self.probe.shutdown().await?;
        log::debug!(
            "Probe suite torn down ({} disposal(s) joined, {} failed)",
            summary.completed,
            summary.failures.len()
        );
        Ok(summary)
    }
}
