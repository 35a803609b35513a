//! Media references and native handle identities.
//!
//! A [`Media`] is what a player is asked to play: a source locator plus a
//! duration slot that the engine fills in once it has loaded enough of the
//! file to know. The slot is shared between the probe (which reads it on
//! every scheduler tick) and the engine's loader (which writes it once), so
//! cloning a `Media` is cheap and every clone observes the same duration.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};

/// A loaded pointer to a specific media source.
///
/// The duration is reported in milliseconds. Values of zero or below mean
/// "not known yet", mirroring what native playback libraries return before
/// the demuxer has parsed the container header.
///
/// # Example
///
/// ```
/// use playprobe::Media;
///
/// let media = Media::from_path("videos/clip.mp4");
/// assert_eq!(media.duration_millis(), 0);
/// assert!(media.duration().is_none());
///
/// media.set_duration_millis(5000);
/// assert_eq!(media.duration().unwrap().as_millis(), 5000);
/// ```
#[derive(Debug, Clone)]
pub struct Media {
    inner: Arc<MediaState>,
}

#[derive(Debug)]
struct MediaState {
    path: PathBuf,
    locator: String,
    duration_millis: AtomicI64,
}

impl Media {
    /// Create a media reference for a local file.
    ///
    /// The locator is the path's display form; no I/O happens here.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let locator = path.display().to_string();
        Self {
            inner: Arc::new(MediaState {
                path,
                locator,
                duration_millis: AtomicI64::new(0),
            }),
        }
    }

    /// The source locator (path or URL) this media was created from.
    pub fn locator(&self) -> &str {
        &self.inner.locator
    }

    /// The filesystem path this media was created from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// File name component of the source, used in log lines.
    ///
    /// Falls back to the full path when it has no file name.
    pub fn display_name(&self) -> String {
        file_display_name(&self.inner.path)
    }

    /// Raw duration in milliseconds. Zero or negative means unknown.
    pub fn duration_millis(&self) -> i64 {
        self.inner.duration_millis.load(Ordering::Acquire)
    }

    /// Duration, once the engine has published a positive value.
    pub fn duration(&self) -> Option<Duration> {
        let millis = self.duration_millis();
        if millis > 0 {
            Some(Duration::from_millis(millis as u64))
        } else {
            None
        }
    }

    /// Whether the engine has published a positive duration.
    pub fn is_ready(&self) -> bool {
        self.duration_millis() > 0
    }

    /// Publish the duration. Called by engine backends from their loader.
    pub fn set_duration_millis(&self, millis: i64) {
        self.inner.duration_millis.store(millis, Ordering::Release);
    }
}

/// File name component of `path`, or the whole path when it has none.
pub(crate) fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Opaque identity of a player's native object.
///
/// Only used for diagnostics: it is logged when disposal is scheduled and
/// again when it completes, so the two lines can be matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

impl Display for NativeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "0x{:08x}", self.0)
    }
}
