//! Media engine and player abstractions.
//!
//! The probe never talks to a playback library directly. It goes through
//! two traits:
//!
//! - [`MediaEngine`] is the process-wide library instance. It is created
//!   once per run and is required to construct any player.
//! - [`MediaPlayer`] plays one [`Media`] at a time and exposes the media so
//!   the probe can watch its duration.
//!
//! [`EngineHandle`] is the shared context object passed to everything that
//! needs the engine. Each clone is a reference that keeps the engine alive,
//! and [`EngineHandle::dispose`] refuses to tear the engine down while any
//! clone is still held. This is how "the engine outlives every player"
//! is enforced: pending disposal jobs hold a clone until their player is
//! gone.

use std::sync::Arc;

use crate::{
    error::ProbeError,
    media::{Media, NativeHandle},
};

/// A playback library instance that can create players.
///
/// Backends construct themselves through their own initialisation function
/// (for example [`FfmpegEngine::initialize`](crate::FfmpegEngine::initialize))
/// since what "initialise" needs differs per library.
pub trait MediaEngine: Send + Sync + 'static {
    /// The player type this engine creates.
    type Player: MediaPlayer;

    /// Short backend name used in log lines.
    fn name(&self) -> &'static str;

    /// Create a new, idle player bound to this engine.
    fn create_player(&self) -> Result<Self::Player, ProbeError>;

    /// Release the engine's native resources.
    ///
    /// Called exactly once, after every player has been disposed.
    fn dispose(self) -> Result<(), ProbeError>
    where
        Self: Sized;
}

/// A player able to play a single media source at a time.
pub trait MediaPlayer: Send + 'static {
    /// Begin playback of `media`.
    ///
    /// Fire-and-forget: returning `Ok` means the request was accepted, not
    /// that playback has started or that the duration is known.
    fn play(&mut self, media: Media) -> Result<(), ProbeError>;

    /// The media currently assigned to this player, if any.
    fn media(&self) -> Option<&Media>;

    /// Identity of the underlying native object, for diagnostics.
    fn native_handle(&self) -> NativeHandle;

    /// Stop playback and release the player.
    ///
    /// Consumes the player, so a player can be disposed at most once.
    fn dispose(self) -> Result<(), ProbeError>
    where
        Self: Sized;
}

/// Shared, reference-counted access to a [`MediaEngine`].
#[derive(Debug)]
pub struct EngineHandle<E: MediaEngine> {
    engine: Arc<E>,
}

impl<E: MediaEngine> Clone for EngineHandle<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: MediaEngine> EngineHandle<E> {
    /// Wrap an initialised engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Borrow the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Create a player bound to this engine.
    pub fn create_player(&self) -> Result<E::Player, ProbeError> {
        self.engine.create_player()
    }

    /// Number of other handles (disposal jobs, callers) sharing the engine.
    pub fn outstanding_references(&self) -> usize {
        Arc::strong_count(&self.engine).saturating_sub(1)
    }

    /// Dispose the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::EngineInUse`] if another handle is still alive;
    /// the engine is then dropped without an explicit dispose call once the
    /// last reference goes away.
    pub fn dispose(self) -> Result<(), ProbeError> {
        let name = self.engine.name();
        match Arc::try_unwrap(self.engine) {
            Ok(engine) => {
                log::debug!("Disposing {name} engine");
                engine.dispose()
            }
            Err(shared) => Err(ProbeError::EngineInUse {
                outstanding: Arc::strong_count(&shared) - 1,
            }),
        }
    }
}
