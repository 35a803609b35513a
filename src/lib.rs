//! # playprobe
//!
//! Probe media files through a playback engine's full lifecycle: create a
//! player, start playback, wait (bounded) for the engine to report the
//! file's duration, and dispose of the player safely.
//!
//! Disposal is never immediate. Some native playback libraries crash when a
//! player is torn down right after `play`, so every player goes through a
//! [`DisposalQueue`] that waits a configurable delay on a background task
//! before disposing. The probe itself moves on to the next file at once.
//!
//! ## Quick Start
//!
//! ```no_run
//! use playprobe::{FfmpegEngine, FfmpegLogLevel, ProbeOptions, ProbeSuite};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), playprobe::ProbeError> {
//! let engine = FfmpegEngine::initialize(FfmpegLogLevel::Error)?;
//! let suite = ProbeSuite::setup(engine, ProbeOptions::new());
//!
//! let run = suite.run_directory("videos").await?;
//! for report in run.reports() {
//!     println!("{report}");
//! }
//!
//! suite.teardown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Engines
//!
//! | Engine | Description |
//! |--------|-------------|
//! | [`FfmpegEngine`] | Opens and demuxes files with FFmpeg via `ffmpeg-next` |
//! | [`SimulatedEngine`] | Scripted, in-process; for tests and dry runs |
//!
//! Any other library can be plugged in by implementing [`MediaEngine`] and
//! [`MediaPlayer`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system for the
//! FFmpeg engine to build.

pub mod configuration;
pub mod discovery;
pub mod disposal;
pub mod engine;
pub mod error;
pub mod ffmpeg;
pub mod media;
pub mod probe;
pub mod progress;
pub mod simulated;
pub mod suite;
pub mod wait;

pub use configuration::{FailurePolicy, ProbeOptions};
pub use disposal::{DisposalQueue, DisposalStats, DisposalSummary};
pub use engine::{EngineHandle, MediaEngine, MediaPlayer};
pub use error::ProbeError;
pub use ffmpeg::{FfmpegEngine, FfmpegLogLevel, FfmpegPlayer, set_ffmpeg_log_level};
pub use media::{Media, NativeHandle};
pub use probe::{FileOutcome, PlaybackProbe, ProbeReport, ProbeRun};
pub use progress::{ProbeProgress, ProgressCallback};
pub use simulated::{EngineEvent, EventRecorder, Readiness, SimulatedEngine, SimulatedPlayer};
pub use suite::ProbeSuite;
