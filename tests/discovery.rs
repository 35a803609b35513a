//! Media file enumeration tests.

use std::fs;

use playprobe::{ProbeError, discovery::list_media_files};

fn touch(directory: &std::path::Path, name: &str) {
    fs::write(directory.join(name), b"").expect("Failed to write fixture file");
}

#[test]
fn lists_top_level_files_sorted_without_sidecars() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temporary_directory.path();
    touch(root, "b.mkv");
    touch(root, "a.mp4");
    touch(root, "a.mp4.meta");
    touch(root, "b.mkv.meta");
    fs::create_dir(root.join("nested")).unwrap();
    touch(&root.join("nested"), "c.mp4");

    let files = list_media_files(root, &[".meta"]).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["a.mp4", "b.mkv"]);
    assert!(files.iter().all(|path| path.is_absolute()));
}

#[test]
fn multiple_suffixes_are_excluded() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temporary_directory.path();
    touch(root, "clip.mp4");
    touch(root, "notes.txt");
    touch(root, "clip.mp4.meta");

    let files = list_media_files(root, &[".meta", ".txt"]).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("clip.mp4"));
}

#[test]
fn no_suffixes_keeps_everything() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temporary_directory.path();
    touch(root, "clip.mp4");
    touch(root, "clip.mp4.meta");

    let files = list_media_files::<_, &str>(root, &[]).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn empty_directory_lists_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let files = list_media_files(temporary_directory.path(), &[".meta"]).unwrap();
    assert!(files.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let result = list_media_files("this_directory_does_not_exist", &[".meta"]);

    match result {
        Err(ProbeError::DirectoryRead { path, .. }) => {
            assert!(path.ends_with("this_directory_does_not_exist"));
        }
        other => panic!("expected DirectoryRead, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_listed() {
    use std::os::unix::fs::symlink;

    let storage = tempfile::tempdir().expect("Failed to create temp dir");
    let target = storage.path().join("real.mp4");
    fs::write(&target, b"").unwrap();

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temporary_directory.path();
    symlink(&target, root.join("clip.mp4")).unwrap();
    symlink(storage.path().join("missing.mp4"), root.join("dangling.mp4")).unwrap();
    symlink(storage.path(), root.join("folder")).unwrap();

    let files = list_media_files(root, &[".meta"]).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("clip.mp4"));
}
