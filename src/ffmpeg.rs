//! FFmpeg-backed media engine and FFmpeg log level configuration.
//!
//! [`FfmpegEngine`] implements [`MediaEngine`] on top of
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next). "Playing" a media
//! means opening it on a background loader thread, publishing the container
//! duration as soon as the header is parsed, and then demuxing packets
//! until the player is disposed or the input ends. The loader owns the
//! demuxer context for its whole life; the player only holds the stop flag
//! and the thread handle.
//!
//! FFmpeg has its own internal logging system, separate from the Rust
//! [`log`](https://crates.io/crates/log) crate, which prints to stderr.
//! [`set_ffmpeg_log_level`] tunes it without importing `ffmpeg-next`
//! directly. To see the Rust-side messages, install a `log` subscriber such
//! as `env_logger`.
//!
//! # Example
//!
//! ```no_run
//! use playprobe::{FfmpegEngine, FfmpegLogLevel, ProbeOptions, ProbeSuite};
//!
//! # async fn example() -> Result<(), playprobe::ProbeError> {
//! let engine = FfmpegEngine::initialize(FfmpegLogLevel::Error)?;
//! let suite = ProbeSuite::setup(engine, ProbeOptions::new());
//! let reports = suite.run_directory("videos").await;
//! suite.teardown().await?;
//! # Ok(())
//! # }
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::JoinHandle,
};

use ffmpeg_next::{format::context::Input, util::log::Level};

use crate::{
    engine::{MediaEngine, MediaPlayer},
    error::ProbeError,
    media::{Media, NativeHandle},
};

/// FFmpeg internal log verbosity level.
///
/// Maps directly to FFmpeg's `AV_LOG_*` constants, from `Quiet` (nothing)
/// to `Trace` (everything).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors. The default for probing, since every file that
    /// fails to open is already reported through the probe result.
    #[default]
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// This controls what FFmpeg prints to stderr. It does **not** affect
/// Rust-side `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// The FFmpeg library as a [`MediaEngine`].
#[derive(Debug)]
pub struct FfmpegEngine {
    next_handle: AtomicU64,
}

impl FfmpegEngine {
    /// Initialise FFmpeg and apply `log_level`.
    ///
    /// The libraries are linked at build time, so there is no install path
    /// to load them from; `ffmpeg_next::init` is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::EngineInitialization`] if FFmpeg fails to
    /// initialise.
    pub fn initialize(log_level: FfmpegLogLevel) -> Result<Self, ProbeError> {
        ffmpeg_next::init().map_err(|error| {
            ProbeError::EngineInitialization(format!("FFmpeg initialisation failed: {error}"))
        })?;
        set_ffmpeg_log_level(log_level);

        log::debug!("FFmpeg engine initialised (log level {log_level:?})");

        Ok(Self {
            next_handle: AtomicU64::new(1),
        })
    }
}

impl MediaEngine for FfmpegEngine {
    type Player = FfmpegPlayer;

    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn create_player(&self) -> Result<Self::Player, ProbeError> {
        Ok(FfmpegPlayer {
            handle: NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)),
            media: None,
            loader: None,
        })
    }

    fn dispose(self) -> Result<(), ProbeError> {
        // FFmpeg keeps no per-instance global state that needs releasing.
        log::debug!("FFmpeg engine disposed");
        Ok(())
    }
}

struct Loader {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Player created by [`FfmpegEngine`].
pub struct FfmpegPlayer {
    handle: NativeHandle,
    media: Option<Media>,
    loader: Option<Loader>,
}

impl std::fmt::Debug for FfmpegPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegPlayer")
            .field("handle", &self.handle)
            .field("media", &self.media)
            .field("loading", &self.loader.is_some())
            .finish()
    }
}

impl FfmpegPlayer {
    fn stop_loader(&mut self) -> Result<(), ProbeError> {
        let Some(loader) = self.loader.take() else {
            return Ok(());
        };

        loader.stop.store(true, Ordering::Release);
        loader.thread.join().map_err(|_| {
            ProbeError::Disposal(format!("loader thread of player {} panicked", self.handle))
        })
    }
}

impl MediaPlayer for FfmpegPlayer {
    fn play(&mut self, media: Media) -> Result<(), ProbeError> {
        self.stop_loader()?;

        let stop = Arc::new(AtomicBool::new(false));
        let loader_stop = Arc::clone(&stop);
        let loader_media = media.clone();
        let handle = self.handle;

        let thread = std::thread::Builder::new()
            .name(format!("playprobe-loader-{}", handle.0))
            .spawn(move || run_loader(handle, &loader_media, &loader_stop))
            .map_err(|error| ProbeError::Playback(error.to_string()))?;

        self.loader = Some(Loader { stop, thread });
        self.media = Some(media);
        Ok(())
    }

    fn media(&self) -> Option<&Media> {
        self.media.as_ref()
    }

    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn dispose(mut self) -> Result<(), ProbeError> {
        self.stop_loader()
    }
}

/// Loader thread body: open, publish the duration, then demux until told
/// to stop.
fn run_loader(handle: NativeHandle, media: &Media, stop: &AtomicBool) {
    let mut input_context = match ffmpeg_next::format::input(media.path()) {
        Ok(input_context) => input_context,
        Err(error) => {
            log::warn!(
                "Player {handle} could not open '{}': {error}",
                media.locator()
            );
            return;
        }
    };

    match duration_millis(&input_context) {
        Some(millis) => media.set_duration_millis(millis),
        None => log::warn!(
            "Player {handle} found no duration in '{}'",
            media.locator()
        ),
    }

    let mut packet_count: u64 = 0;
    for (_stream, _packet) in input_context.packets() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        packet_count += 1;
    }

    log::trace!("Player {handle} loader finished after {packet_count} packets");
}

/// Container duration in milliseconds, falling back to the longest stream.
fn duration_millis(input_context: &Input) -> Option<i64> {
    let container_microseconds = input_context.duration();
    if container_microseconds > 0 {
        return Some(micros_to_millis(container_microseconds));
    }

    input_context
        .streams()
        .filter_map(|stream| {
            let time_base = stream.time_base();
            let ticks = stream.duration();
            if ticks <= 0 || time_base.denominator() == 0 {
                return None;
            }
            let seconds =
                ticks as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
            Some((seconds * 1000.0).ceil() as i64)
        })
        .filter(|millis| *millis > 0)
        .max()
}

/// Rounds up so that any positive duration stays positive.
fn micros_to_millis(microseconds: i64) -> i64 {
    microseconds.saturating_add(999) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_millisecond_durations_stay_positive() {
        assert_eq!(micros_to_millis(1), 1);
        assert_eq!(micros_to_millis(999), 1);
        assert_eq!(micros_to_millis(1000), 1);
        assert_eq!(micros_to_millis(5_000_001), 5001);
    }

    #[test]
    fn log_level_defaults_to_error() {
        assert_eq!(Level::from(FfmpegLogLevel::default()), Level::Error);
    }
}
