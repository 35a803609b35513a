//! Media file enumeration.
//!
//! Lists the top level of a directory and drops auxiliary sidecar files
//! (asset metadata such as `clip.mp4.meta`) by suffix. Results are sorted by
//! file name so runs are reproducible across platforms, since directory
//! iteration order is not.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ProbeError;

/// Whether `path` ends in one of the sidecar suffixes.
///
/// The comparison is ASCII case-insensitive, so `CLIP.MP4.META` is a sidecar
/// too.
pub fn is_sidecar<S: AsRef<str>>(path: &Path, sidecar_suffixes: &[S]) -> bool {
    let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();

    sidecar_suffixes
        .iter()
        .map(|suffix| suffix.as_ref().to_ascii_lowercase())
        .any(|suffix| !suffix.is_empty() && name.ends_with(&suffix))
}

/// List candidate media files in `directory`.
///
/// Only regular files directly inside `directory` are returned (no
/// recursion), as absolute paths, excluding sidecars.
///
/// # Errors
///
/// Returns [`ProbeError::DirectoryRead`] if the directory cannot be read.
///
/// # Example
///
/// ```no_run
/// use playprobe::discovery::list_media_files;
///
/// let files = list_media_files("videos", &[".meta"])?;
/// for file in &files {
///     println!("{}", file.display());
/// }
/// # Ok::<(), playprobe::ProbeError>(())
/// ```
pub fn list_media_files<P: AsRef<Path>, S: AsRef<str>>(
    directory: P,
    sidecar_suffixes: &[S],
) -> Result<Vec<PathBuf>, ProbeError> {
    let directory = directory.as_ref();
    let directory_read_error = |reason: String| ProbeError::DirectoryRead {
        path: directory.to_path_buf(),
        reason,
    };

    let absolute_directory = directory
        .canonicalize()
        .map_err(|error| directory_read_error(error.to_string()))?;

    let entries =
        fs::read_dir(&absolute_directory).map_err(|error| directory_read_error(error.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| directory_read_error(error.to_string()))?;
        let file_type = entry
            .file_type()
            .map_err(|error| directory_read_error(error.to_string()))?;
        let path = entry.path();
        let is_file = if file_type.is_symlink() {
            // Follow the link; dangling links are skipped.
            fs::metadata(&path).is_ok_and(|metadata| metadata.is_file())
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        if is_sidecar(&path, sidecar_suffixes) {
            log::trace!("Skipping sidecar {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    log::debug!(
        "Found {} media file(s) in {}",
        files.len(),
        absolute_directory.display()
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_matching() {
        let suffixes = [".meta"];
        assert!(is_sidecar(Path::new("a/clip.mp4.meta"), &suffixes));
        assert!(is_sidecar(Path::new("CLIP.MP4.META"), &suffixes));
        assert!(!is_sidecar(Path::new("clip.mp4"), &suffixes));
        assert!(!is_sidecar(Path::new("metadata.mp4"), &suffixes));
    }

    #[test]
    fn empty_suffix_matches_nothing() {
        assert!(!is_sidecar(Path::new("clip.mp4"), &[""]));
    }
}
