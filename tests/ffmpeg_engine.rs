//! FFmpeg engine integration tests.
//!
//! Tests that need real media read `tests/fixtures/sample_video.mp4` and
//! return early when it is absent. Any short clip works, e.g.
//! `ffmpeg -f lavfi -i testsrc=duration=5:size=320x240:rate=30 sample_video.mp4`.

use std::{path::Path, time::Duration};

use playprobe::{
    EngineHandle, FfmpegEngine, FfmpegLogLevel, Media, MediaEngine, MediaPlayer, PlaybackProbe,
    ProbeOptions,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn fast_options() -> ProbeOptions {
    ProbeOptions::new()
        .with_max_wait(Duration::from_secs(2))
        .with_disposal_delay(Duration::from_millis(50))
        .with_settle_delay(Duration::ZERO)
}

#[test]
fn players_get_distinct_handles() {
    let engine = FfmpegEngine::initialize(FfmpegLogLevel::Quiet).expect("FFmpeg init failed");
    let first = engine.create_player().unwrap();
    let second = engine.create_player().unwrap();

    assert_ne!(first.native_handle(), second.native_handle());
    assert!(first.media().is_none());

    first.dispose().unwrap();
    second.dispose().unwrap();
    engine.dispose().unwrap();
}

#[test]
fn dispose_stops_loader_of_garbage_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let engine = FfmpegEngine::initialize(FfmpegLogLevel::Quiet).expect("FFmpeg init failed");
    let mut player = engine.create_player().unwrap();
    player.play(Media::from_path(&invalid_file_path)).unwrap();

    assert_eq!(player.media().unwrap().locator(), invalid_file_path.display().to_string());
    player.dispose().unwrap();
}

#[tokio::test]
async fn invalid_file_times_out() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let engine = FfmpegEngine::initialize(FfmpegLogLevel::Quiet).expect("FFmpeg init failed");
    let probe = PlaybackProbe::new(EngineHandle::new(engine), fast_options());

    let error = probe.probe_file(&invalid_file_path).await.unwrap_err();
    assert!(error.is_timeout(), "expected timeout, got {error}");
    assert!(error.to_string().contains("2 s"));

    let summary = probe.shutdown().await.unwrap();
    assert_eq!(summary.completed, 1);
}

#[tokio::test]
async fn sample_video_reports_duration() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let engine = FfmpegEngine::initialize(FfmpegLogLevel::Quiet).expect("FFmpeg init failed");
    let probe = PlaybackProbe::new(EngineHandle::new(engine), fast_options());

    let report = probe.probe_file(path).await.expect("Failed to probe fixture");
    assert_eq!(report.file_name, "sample_video.mp4");
    assert!(report.duration_millis > 0);
    assert!(report.to_string().starts_with("Duration of file sample_video.mp4: "));

    probe.shutdown().await.unwrap();
}
