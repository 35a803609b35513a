//! Delayed, fire-and-forget player disposal.
//!
//! Native playback libraries have been observed to crash when a player is
//! disposed very shortly after `play` was issued, apparently while the media
//! is still being loaded. Waiting before disposal makes the crash far less
//! likely, but the probe must not stall for that long on every file.
//!
//! [`DisposalQueue::schedule`] therefore takes ownership of the player and
//! spawns a task that sleeps the configured delay and then disposes it on
//! the blocking pool (native teardown may block). The caller gets control
//! back immediately and goes on to the next file. Each job also holds an
//! [`EngineHandle`] clone, so the engine cannot be torn down underneath a
//! player that is still waiting for disposal.
//!
//! The delay reduces the risk but does not remove it.

use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;

use crate::{
    engine::{EngineHandle, MediaEngine, MediaPlayer},
    error::ProbeError,
};

type DisposalJob = JoinHandle<Result<(), ProbeError>>;

/// Counters describing the queue's activity so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisposalStats {
    /// Players handed to the queue.
    pub scheduled: usize,
    /// Players whose disposal returned `Ok`.
    pub completed: usize,
    /// Players whose disposal returned an error or whose task died.
    pub failed: usize,
}

impl DisposalStats {
    /// Jobs that have neither completed nor failed yet.
    pub fn in_flight(&self) -> usize {
        self.scheduled
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
    }
}

#[derive(Debug, Default)]
struct Counters {
    scheduled: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

/// Outcome of waiting for every scheduled disposal.
#[derive(Debug, Default)]
pub struct DisposalSummary {
    /// Number of jobs that finished successfully.
    pub completed: usize,
    /// Errors from jobs that failed.
    pub failures: Vec<ProbeError>,
}

/// Work queue that disposes players after a delay.
#[derive(Debug)]
pub struct DisposalQueue<E: MediaEngine> {
    engine: EngineHandle<E>,
    delay: Duration,
    jobs: Mutex<Vec<DisposalJob>>,
    counters: Arc<Counters>,
}

impl<E: MediaEngine> DisposalQueue<E> {
    /// Create a queue whose jobs wait `delay` before disposing.
    pub fn new(engine: EngineHandle<E>, delay: Duration) -> Self {
        Self {
            engine,
            delay,
            jobs: Mutex::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// The engine players are created from and disposed against.
    pub fn engine(&self) -> &EngineHandle<E> {
        &self.engine
    }

    /// The configured pre-disposal delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Hand `player` over for disposal and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, player: E::Player) {
        let handle = player.native_handle();
        let locator = player
            .media()
            .map(|media| media.locator().to_string())
            .unwrap_or_default();
        let delay = self.delay;
        let engine = self.engine.clone();
        let counters = Arc::clone(&self.counters);

        log::debug!("Disposing media player (media: '{locator}', native handle: {handle})");
        counters.scheduled.fetch_add(1, Ordering::AcqRel);

        let job = tokio::spawn(async move {
            log::debug!(
                "Sleeping {} ms before disposing media player (media: '{locator}', native handle: {handle})",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;

            let result = tokio::task::spawn_blocking(move || {
                let result = player.dispose();
                // The engine reference goes only after the player is gone.
                drop(engine);
                result
            })
            .await
            .map_err(|error| {
                ProbeError::Disposal(format!("disposal task for player {handle} failed: {error}"))
            })
            .and_then(|result| result);

            match &result {
                Ok(()) => {
                    counters.completed.fetch_add(1, Ordering::AcqRel);
                    log::debug!(
                        "Successfully disposed media player (media: '{locator}', native handle: {handle})"
                    );
                }
                Err(error) => {
                    counters.failed.fetch_add(1, Ordering::AcqRel);
                    log::warn!(
                        "Disposing media player failed (media: '{locator}', native handle: {handle}): {error}"
                    );
                }
            }
            result
        });

        self.lock_jobs().push(job);
    }

    /// Current counters.
    pub fn stats(&self) -> DisposalStats {
        DisposalStats {
            scheduled: self.counters.scheduled.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Acquire),
            failed: self.counters.failed.load(Ordering::Acquire),
        }
    }

    /// Best-effort drain: sleep for `settle`, then report what is still
    /// in flight. Does not wait for anything beyond `settle`.
    pub async fn settle(&self, settle: Duration) -> DisposalStats {
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        let stats = self.stats();
        if stats.in_flight() > 0 {
            log::debug!(
                "{} disposal(s) still in flight after {} ms settle",
                stats.in_flight(),
                settle.as_millis()
            );
        }
        stats
    }

    /// Wait for every scheduled disposal to finish.
    ///
    /// There is no timeout: a disposal that hangs blocks this call.
    pub async fn join_all(&self) -> DisposalSummary {
        let jobs = std::mem::take(&mut *self.lock_jobs());

        let mut summary = DisposalSummary::default();
        for job in jobs {
            match job.await {
                Ok(Ok(())) => summary.completed += 1,
                Ok(Err(error)) => summary.failures.push(error),
                Err(error) => summary
                    .failures
                    .push(ProbeError::Disposal(format!("disposal task failed: {error}"))),
            }
        }
        summary
    }

    /// Give back the engine handle. Used at teardown after [`join_all`](Self::join_all).
    pub fn into_engine(self) -> EngineHandle<E> {
        self.engine
    }

    fn lock_jobs(&self) -> MutexGuard<'_, Vec<DisposalJob>> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
