//! A scripted, in-process media engine.
//!
//! [`SimulatedEngine`] implements [`MediaEngine`] without any native
//! library. Each file name is scripted to either publish a duration after a
//! loading delay or never become ready, and every lifecycle step is
//! recorded as an [`EngineEvent`]. The integration tests use it to check
//! ordering and disposal counts; the CLI uses it for `--dry-run`.
//!
//! Timers run on the ambient tokio runtime when there is one, so a test
//! using `#[tokio::test(start_paused = true)]` drives loading in virtual
//! time.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use playprobe::{Readiness, SimulatedEngine};
//!
//! let engine = SimulatedEngine::new()
//!     .with_file("clip.mp4", Readiness::after(Duration::from_millis(200), 5000))
//!     .with_file("broken.mov", Readiness::Never);
//! ```

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::time::Instant;

use crate::{
    engine::{MediaEngine, MediaPlayer},
    error::ProbeError,
    media::{Media, NativeHandle},
};

/// How a scripted file behaves once played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Publish `duration_millis` once `delay` has elapsed since `play`.
    After {
        /// Simulated loading time.
        delay: Duration,
        /// Duration to publish, in milliseconds.
        duration_millis: i64,
    },
    /// Never publish a duration.
    Never,
}

impl Readiness {
    /// Shorthand for [`Readiness::After`].
    pub fn after(delay: Duration, duration_millis: i64) -> Self {
        Readiness::After {
            delay,
            duration_millis,
        }
    }
}

/// One recorded lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A player was created.
    PlayerCreated(NativeHandle),
    /// `play` was called on a player.
    PlaybackStarted {
        /// The player.
        handle: NativeHandle,
        /// Locator of the media it was given.
        locator: String,
    },
    /// The loader published a duration.
    DurationPublished {
        /// The player whose media became ready.
        handle: NativeHandle,
        /// Published value.
        duration_millis: i64,
    },
    /// A player was disposed.
    PlayerDisposed(NativeHandle),
    /// The engine itself was disposed.
    EngineDisposed,
}

type EventLog = Arc<Mutex<Vec<EngineEvent>>>;

fn lock(events: &EventLog) -> MutexGuard<'_, Vec<EngineEvent>> {
    // A poisoned log only means a test thread panicked mid-push.
    events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
struct Script {
    files: HashMap<String, Readiness>,
    default_readiness: Readiness,
}

impl Script {
    fn readiness_for(&self, media: &Media) -> Readiness {
        self.files
            .get(&media.display_name())
            .copied()
            .unwrap_or(self.default_readiness)
    }
}

/// Scripted engine. See the module documentation.
#[derive(Debug)]
pub struct SimulatedEngine {
    script: Script,
    fragile_window: Option<Duration>,
    dispose_cost: Duration,
    next_handle: AtomicU64,
    events: EventLog,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedEngine {
    /// An engine where unscripted files become ready immediately with a
    /// duration of one second.
    pub fn new() -> Self {
        Self {
            script: Script {
                files: HashMap::new(),
                default_readiness: Readiness::after(Duration::ZERO, 1000),
            },
            fragile_window: None,
            dispose_cost: Duration::ZERO,
            next_handle: AtomicU64::new(1),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the behaviour of a file, matched by file name.
    #[must_use]
    pub fn with_file(mut self, file_name: impl Into<String>, readiness: Readiness) -> Self {
        self.script.files.insert(file_name.into(), readiness);
        self
    }

    /// Behaviour for files that are not explicitly scripted.
    #[must_use]
    pub fn with_default(mut self, readiness: Readiness) -> Self {
        self.script.default_readiness = readiness;
        self
    }

    /// Make disposal fail when it happens within `window` of `play`.
    ///
    /// Models the native teardown crash as a recoverable error so tests
    /// can show that delayed disposal stays clear of it.
    #[must_use]
    pub fn with_fragile_window(mut self, window: Duration) -> Self {
        self.fragile_window = Some(window);
        self
    }

    /// Make each player's disposal block its thread for `cost`.
    #[must_use]
    pub fn with_dispose_cost(mut self, cost: Duration) -> Self {
        self.dispose_cost = cost;
        self
    }

    /// A live view of the event log, usable after the engine is disposed.
    pub fn recorder(&self) -> EventRecorder {
        EventRecorder {
            events: Arc::clone(&self.events),
        }
    }
}

impl MediaEngine for SimulatedEngine {
    type Player = SimulatedPlayer;

    fn name(&self) -> &'static str {
        "simulated"
    }

    fn create_player(&self) -> Result<Self::Player, ProbeError> {
        let handle = NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        lock(&self.events).push(EngineEvent::PlayerCreated(handle));

        Ok(SimulatedPlayer {
            handle,
            media: None,
            started_at: None,
            script: Arc::new(self.script.clone()),
            fragile_window: self.fragile_window,
            dispose_cost: self.dispose_cost,
            events: Arc::clone(&self.events),
        })
    }

    fn dispose(self) -> Result<(), ProbeError> {
        lock(&self.events).push(EngineEvent::EngineDisposed);
        Ok(())
    }
}

/// Player created by [`SimulatedEngine`].
#[derive(Debug)]
pub struct SimulatedPlayer {
    handle: NativeHandle,
    media: Option<Media>,
    started_at: Option<Instant>,
    script: Arc<Script>,
    fragile_window: Option<Duration>,
    dispose_cost: Duration,
    events: EventLog,
}

impl MediaPlayer for SimulatedPlayer {
    fn play(&mut self, media: Media) -> Result<(), ProbeError> {
        let readiness = self.script.readiness_for(&media);

        lock(&self.events).push(EngineEvent::PlaybackStarted {
            handle: self.handle,
            locator: media.locator().to_string(),
        });
        self.started_at = Some(Instant::now());

        if let Readiness::After {
            delay,
            duration_millis,
        } = readiness
        {
            let loader_media = media.clone();
            let events = Arc::clone(&self.events);
            let handle = self.handle;
            let publish = move || {
                loader_media.set_duration_millis(duration_millis);
                lock(&events).push(EngineEvent::DurationPublished {
                    handle,
                    duration_millis,
                });
            };

            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        tokio::time::sleep(delay).await;
                        publish();
                    });
                }
                Err(_) => {
                    std::thread::spawn(move || {
                        std::thread::sleep(delay);
                        publish();
                    });
                }
            }
        }

        self.media = Some(media);
        Ok(())
    }

    fn media(&self) -> Option<&Media> {
        self.media.as_ref()
    }

    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn dispose(self) -> Result<(), ProbeError> {
        if !self.dispose_cost.is_zero() {
            std::thread::sleep(self.dispose_cost);
        }

        lock(&self.events).push(EngineEvent::PlayerDisposed(self.handle));

        if let (Some(window), Some(started_at)) = (self.fragile_window, self.started_at) {
            let since_play = started_at.elapsed();
            if since_play < window {
                return Err(ProbeError::Disposal(format!(
                    "player {} disposed {since_play:?} after play, inside the {window:?} fragile window",
                    self.handle
                )));
            }
        }

        Ok(())
    }
}

/// Read access to a [`SimulatedEngine`]'s event log.
#[derive(Debug, Clone)]
pub struct EventRecorder {
    events: EventLog,
}

impl EventRecorder {
    /// Snapshot of every event so far, in order.
    pub fn events(&self) -> Vec<EngineEvent> {
        lock(&self.events).clone()
    }

    /// How many times the given player was disposed.
    pub fn disposal_count(&self, handle: NativeHandle) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| **event == EngineEvent::PlayerDisposed(handle))
            .count()
    }

    /// Handles of every player created, in creation order.
    pub fn created_players(&self) -> Vec<NativeHandle> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                EngineEvent::PlayerCreated(handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    /// Position of the first event matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&EngineEvent) -> bool) -> Option<usize> {
        lock(&self.events).iter().position(predicate)
    }
}
