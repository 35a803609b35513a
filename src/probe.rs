//! The playback probe.
//!
//! [`PlaybackProbe`] plays each file through a [`MediaEngine`] and waits for
//! the engine to publish a duration. A file passes when a positive duration
//! shows up within [`ProbeOptions::max_wait`]. Files are probed strictly one
//! after another. A player is never disposed inline: it is always handed to
//! the [`DisposalQueue`], so file N's disposal may still be pending while
//! file N+1 plays.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    configuration::{FailurePolicy, ProbeOptions},
    disposal::{DisposalQueue, DisposalStats, DisposalSummary},
    engine::{EngineHandle, MediaEngine, MediaPlayer},
    error::ProbeError,
    media::{Media, NativeHandle, file_display_name},
    progress::ProgressTracker,
    wait::wait_until,
};

/// Result of a successful single-file probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Path that was probed.
    pub path: PathBuf,
    /// File name used in log lines.
    pub file_name: String,
    /// Duration reported by the engine, in milliseconds (always > 0).
    pub duration_millis: i64,
    /// Time spent waiting for the duration after `play`.
    pub waited: Duration,
    /// Native identity of the player that was used.
    pub native_handle: NativeHandle,
}

impl ProbeReport {
    /// Reported duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_millis.max(0) as u64)
    }
}

impl Display for ProbeReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Duration of file {}: {} ms",
            self.file_name, self.duration_millis
        )
    }
}

/// What happened to one file of a run.
#[derive(Debug)]
pub enum FileOutcome {
    /// A positive duration was observed.
    Passed(ProbeReport),
    /// The probe failed.
    Failed {
        /// Path that was probed.
        path: PathBuf,
        /// Why it failed.
        error: ProbeError,
    },
    /// Not probed because an earlier file failed under [`FailurePolicy::Abort`].
    Skipped(PathBuf),
}

impl FileOutcome {
    /// Path this outcome refers to.
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Passed(report) => &report.path,
            FileOutcome::Failed { path, .. } | FileOutcome::Skipped(path) => path,
        }
    }

    /// Whether the file passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, FileOutcome::Passed(_))
    }
}

/// Result of probing a sequence of files.
#[derive(Debug)]
pub struct ProbeRun {
    /// One entry per input path, in input order.
    pub outcomes: Vec<FileOutcome>,
    /// Disposal counters observed after the settle interval.
    pub disposals: DisposalStats,
}

impl ProbeRun {
    /// Whether every file passed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_passed)
    }

    /// Reports of the files that passed, in order.
    pub fn reports(&self) -> impl Iterator<Item = &ProbeReport> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Passed(report) => Some(report),
            _ => None,
        })
    }

    /// The first failure, if any.
    pub fn first_failure(&self) -> Option<(&Path, &ProbeError)> {
        self.outcomes.iter().find_map(|outcome| match outcome {
            FileOutcome::Failed { path, error } => Some((path.as_path(), error)),
            _ => None,
        })
    }

    /// Number of files that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, FileOutcome::Skipped(_)))
            .count()
    }

    /// Convert into the first failure, or the reports if all passed.
    pub fn into_result(self) -> Result<Vec<ProbeReport>, ProbeError> {
        let mut reports = Vec::with_capacity(self.outcomes.len());
        for outcome in self.outcomes {
            match outcome {
                FileOutcome::Passed(report) => reports.push(report),
                FileOutcome::Failed { error, .. } => return Err(error),
                FileOutcome::Skipped(_) => {}
            }
        }
        Ok(reports)
    }
}

/// Drives players through play → wait for duration → delayed disposal.
#[derive(Debug)]
pub struct PlaybackProbe<E: MediaEngine> {
    disposals: DisposalQueue<E>,
    options: ProbeOptions,
}

impl<E: MediaEngine> PlaybackProbe<E> {
    /// Create a probe over `engine`.
    pub fn new(engine: EngineHandle<E>, options: ProbeOptions) -> Self {
        Self {
            disposals: DisposalQueue::new(engine, options.disposal_delay),
            options,
        }
    }

    /// The options this probe runs with.
    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// The queue holding players awaiting disposal.
    pub fn disposals(&self) -> &DisposalQueue<E> {
        &self.disposals
    }

    /// Probe a single file.
    ///
    /// On success the player has been handed to the disposal queue and may
    /// not be disposed yet. On failure the player is handed over as well,
    /// so it is still disposed exactly once.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::PlayerCreation`] / [`ProbeError::Playback`] from the engine.
    /// - [`ProbeError::Timeout`] if no positive duration appears within
    ///   the configured maximum.
    pub async fn probe_file<P: AsRef<Path>>(&self, path: P) -> Result<ProbeReport, ProbeError> {
        let path = path.as_ref();
        let mut player = self.disposals.engine().create_player()?;
        let native_handle = player.native_handle();

        log::debug!("Playing '{}' on player {native_handle}", path.display());
        if let Err(error) = player.play(Media::from_path(path)) {
            self.disposals.schedule(player);
            return Err(error);
        }

        let wait_result = wait_until(self.options.max_wait, self.options.poll_interval, || {
            player.media().is_some_and(Media::is_ready)
        })
        .await;
        let waited = match wait_result {
            Ok(waited) => waited,
            Err(error) => {
                self.disposals.schedule(player);
                return Err(error);
            }
        };

        let duration_millis = player.media().map_or(0, Media::duration_millis);
        let report = ProbeReport {
            path: path.to_path_buf(),
            file_name: file_display_name(path),
            duration_millis,
            waited,
            native_handle,
        };
        log::info!("{report}");

        self.disposals.schedule(player);
        Ok(report)
    }

    /// Probe `paths` in order, then wait the settle interval.
    ///
    /// Behaviour after a failure follows [`ProbeOptions::failure_policy`].
    /// The settle wait happens regardless of outcome so that pending
    /// disposals get their chance to finish.
    pub async fn probe_files<P: AsRef<Path>>(&self, paths: &[P]) -> ProbeRun {
        let mut tracker = ProgressTracker::new(paths.len());
        let mut outcomes = Vec::with_capacity(paths.len());
        let mut aborted = false;

        for path in paths {
            let path = path.as_ref();
            if aborted {
                outcomes.push(FileOutcome::Skipped(path.to_path_buf()));
                continue;
            }

            let result = self.probe_file(path).await;
            let info = tracker.advance(&file_display_name(path), result.is_ok());
            self.options.progress.on_progress(&info);

            match result {
                Ok(report) => outcomes.push(FileOutcome::Passed(report)),
                Err(error) => {
                    log::error!("Probe of '{}' failed: {error}", path.display());
                    outcomes.push(FileOutcome::Failed {
                        path: path.to_path_buf(),
                        error,
                    });
                    if self.options.failure_policy == FailurePolicy::Abort {
                        aborted = true;
                    }
                }
            }
        }

        let disposals = self.disposals.settle(self.options.settle_delay).await;
        ProbeRun {
            outcomes,
            disposals,
        }
    }

    /// Wait for all pending disposals, then dispose the engine.
    ///
    /// # Errors
    ///
    /// Returns the engine's dispose error, or [`ProbeError::EngineInUse`]
    /// if a caller still holds an [`EngineHandle`] clone.
    pub async fn shutdown(self) -> Result<DisposalSummary, ProbeError> {
        let summary = self.disposals.join_all().await;
        for failure in &summary.failures {
            log::warn!("Player disposal failed: {failure}");
        }

        self.disposals.into_engine().dispose()?;
        Ok(summary)
    }
}
