//! Benchmarks for enumeration and the probe loop.
//!
//! Run with: cargo bench
//!
//! The FFmpeg benchmark needs `tests/fixtures/sample_video.mp4` and is
//! skipped when it is absent.

use std::{fs, path::Path, time::Duration};

use criterion::Criterion;
use playprobe::{
    EngineHandle, FfmpegEngine, FfmpegLogLevel, PlaybackProbe, ProbeOptions, Readiness,
    SimulatedEngine, discovery::list_media_files,
};
use tokio::runtime::{Builder, Runtime};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn runtime() -> Runtime {
    Builder::new_current_thread().enable_time().build().unwrap()
}

fn no_delay_options() -> ProbeOptions {
    ProbeOptions::new()
        .with_poll_interval(Duration::from_millis(1))
        .with_disposal_delay(Duration::ZERO)
        .with_settle_delay(Duration::ZERO)
}

fn benchmark_enumeration(criterion: &mut Criterion) {
    let temporary_directory = tempfile::tempdir().unwrap();
    for index in 0..500 {
        fs::write(temporary_directory.path().join(format!("clip_{index:03}.mp4")), b"").unwrap();
        fs::write(temporary_directory.path().join(format!("clip_{index:03}.mp4.meta")), b"")
            .unwrap();
    }

    criterion.bench_function("list 500 files with sidecars", |bencher| {
        bencher.iter(|| {
            let files = list_media_files(temporary_directory.path(), &[".meta"]).unwrap();
            assert_eq!(files.len(), 500);
        });
    });
}

fn benchmark_simulated_probe(criterion: &mut Criterion) {
    let runtime = runtime();
    let paths: Vec<String> = (0..20).map(|index| format!("clip_{index}.mp4")).collect();

    criterion.bench_function("probe 20 instantly ready files", |bencher| {
        bencher.iter(|| {
            runtime.block_on(async {
                let engine = SimulatedEngine::new()
                    .with_default(Readiness::after(Duration::ZERO, 1000));
                let probe = PlaybackProbe::new(EngineHandle::new(engine), no_delay_options());
                let run = probe.probe_files(paths.as_slice()).await;
                assert!(run.is_success());
                probe.shutdown().await.unwrap();
            });
        });
    });
}

fn benchmark_ffmpeg_probe(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let runtime = runtime();
    let mut group = criterion.benchmark_group("ffmpeg");
    group.sample_size(20);

    group.bench_function("probe sample video", |bencher| {
        bencher.iter(|| {
            runtime.block_on(async {
                let engine = FfmpegEngine::initialize(FfmpegLogLevel::Quiet).unwrap();
                let probe = PlaybackProbe::new(EngineHandle::new(engine), no_delay_options());
                probe.probe_file(SAMPLE_VIDEO).await.unwrap();
                probe.shutdown().await.unwrap();
            });
        });
    });

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_enumeration,
    benchmark_simulated_probe,
    benchmark_ffmpeg_probe,
);
criterion::criterion_main!(benches);
