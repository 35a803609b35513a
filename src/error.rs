//! Error types for the `playprobe` crate.
//!
//! This module defines [`ProbeError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry enough context (paths,
//! configured limits, upstream messages) to be reported as-is.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `playprobe` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// Duration metadata was not observed within the configured maximum wait.
    ///
    /// The message embeds the maximum in seconds, e.g.
    /// `Duration not available after 10 s`.
    #[error("Duration not available after {} s", format_seconds(*max_wait))]
    Timeout {
        /// The configured maximum wait that was exceeded.
        max_wait: Duration,
    },

    /// The media engine could not be initialised.
    #[error("Failed to initialise media engine: {0}")]
    EngineInitialization(String),

    /// The engine refused to create a player.
    #[error("Failed to create media player: {0}")]
    PlayerCreation(String),

    /// The player could not start playback of a media source.
    #[error("Failed to start playback: {0}")]
    Playback(String),

    /// Disposing a player failed, or its disposal task died.
    #[error("Failed to dispose media player: {0}")]
    Disposal(String),

    /// The engine was torn down while players created from it were still alive.
    #[error("Media engine still in use by {outstanding} player(s)")]
    EngineInUse {
        /// Number of references still held when teardown was attempted.
        outstanding: usize,
    },

    /// The media directory could not be listed.
    #[error("Failed to read media directory {path}: {reason}")]
    DirectoryRead {
        /// Directory that was passed to the file enumeration.
        path: PathBuf,
        /// Underlying reason the listing failed.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

impl ProbeError {
    /// Whether this error is a readiness timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. })
    }
}

impl From<FfmpegError> for ProbeError {
    fn from(error: FfmpegError) -> Self {
        ProbeError::FfmpegError(error.to_string())
    }
}

// Whole seconds print without a fractional part so the default reads "10 s".
fn format_seconds(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.3}", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_whole_seconds() {
        let error = ProbeError::Timeout {
            max_wait: Duration::from_secs(10),
        };
        assert_eq!(error.to_string(), "Duration not available after 10 s");
        assert!(error.is_timeout());
    }

    #[test]
    fn timeout_message_keeps_fraction() {
        let error = ProbeError::Timeout {
            max_wait: Duration::from_millis(250),
        };
        assert_eq!(error.to_string(), "Duration not available after 0.250 s");
    }
}
