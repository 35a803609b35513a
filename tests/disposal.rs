//! Delayed disposal and engine lifetime tests.

use std::time::Duration;

use playprobe::{
    DisposalQueue, EngineEvent, EngineHandle, MediaEngine, MediaPlayer, Media, PlaybackProbe,
    ProbeError, ProbeOptions, Readiness, SimulatedEngine,
};
use tokio::time::Instant;

fn quick_engine() -> SimulatedEngine {
    SimulatedEngine::new().with_default(Readiness::after(Duration::from_millis(10), 1500))
}

#[tokio::test(start_paused = true)]
async fn schedule_returns_before_disposal() {
    let engine = quick_engine();
    let recorder = engine.recorder();
    let handle = EngineHandle::new(engine);
    let queue = DisposalQueue::new(handle.clone(), Duration::from_millis(500));

    let mut player = handle.create_player().unwrap();
    player.play(Media::from_path("clip.mp4")).unwrap();
    let native_handle = player.native_handle();

    let started = Instant::now();
    queue.schedule(player);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(recorder.disposal_count(native_handle), 0);
    assert_eq!(queue.stats().in_flight(), 1);

    let summary = queue.join_all().await;
    assert_eq!(summary.completed, 1);
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(recorder.disposal_count(native_handle), 1);
    assert_eq!(queue.stats().completed, 1);
}

#[tokio::test(start_paused = true)]
async fn next_file_starts_before_previous_disposal() {
    let engine = quick_engine();
    let recorder = engine.recorder();
    let options = ProbeOptions::new()
        .with_disposal_delay(Duration::from_millis(500))
        .with_settle_delay(Duration::ZERO);
    let probe = PlaybackProbe::new(EngineHandle::new(engine), options);

    probe.probe_files(&["one.mp4", "two.mp4"]).await;

    let players = recorder.created_players();
    assert_eq!(players.len(), 2);
    let second_created = recorder
        .position(|event| *event == EngineEvent::PlayerCreated(players[1]))
        .unwrap();
    // Nothing has been disposed yet: both delays are still running.
    assert!(
        recorder
            .position(|event| *event == EngineEvent::PlayerDisposed(players[0]))
            .is_none()
    );

    probe.shutdown().await.unwrap();

    let first_disposed = recorder
        .position(|event| *event == EngineEvent::PlayerDisposed(players[0]))
        .unwrap();
    assert!(second_created < first_disposed);
}

#[tokio::test(start_paused = true)]
async fn every_player_disposed_exactly_once() {
    let engine = quick_engine().with_file("stuck.mkv", Readiness::Never);
    let recorder = engine.recorder();
    let options = ProbeOptions::new()
        .with_max_wait(Duration::from_secs(1))
        .with_failure_policy(playprobe::FailurePolicy::Continue);
    let probe = PlaybackProbe::new(EngineHandle::new(engine), options);

    probe
        .probe_files(&["a.mp4", "stuck.mkv", "b.mp4", "c.mp4"])
        .await;
    probe.shutdown().await.unwrap();

    let players = recorder.created_players();
    assert_eq!(players.len(), 4);
    for player in players {
        assert_eq!(recorder.disposal_count(player), 1, "player {player}");
    }
}

#[tokio::test(start_paused = true)]
async fn engine_is_disposed_last() {
    let engine = quick_engine();
    let recorder = engine.recorder();
    let probe = PlaybackProbe::new(EngineHandle::new(engine), ProbeOptions::new());

    probe.probe_files(&["a.mp4", "b.mp4"]).await;
    probe.shutdown().await.unwrap();

    let events = recorder.events();
    assert_eq!(events.last(), Some(&EngineEvent::EngineDisposed));
    assert_eq!(
        events
            .iter()
            .filter(|event| **event == EngineEvent::EngineDisposed)
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn engine_teardown_refused_while_handle_shared() {
    let engine = quick_engine();
    let recorder = engine.recorder();
    let handle = EngineHandle::new(engine);
    let extra = handle.clone();
    assert_eq!(handle.outstanding_references(), 1);

    let probe = PlaybackProbe::new(handle, ProbeOptions::new());
    probe.probe_file("a.mp4").await.unwrap();

    match probe.shutdown().await {
        Err(ProbeError::EngineInUse { outstanding }) => assert_eq!(outstanding, 1),
        other => panic!("expected EngineInUse, got {other:?}"),
    }
    assert!(!recorder.events().contains(&EngineEvent::EngineDisposed));

    extra.dispose().unwrap();
    assert!(recorder.events().contains(&EngineEvent::EngineDisposed));
}

#[tokio::test(start_paused = true)]
async fn delayed_disposal_clears_fragile_window() {
    let engine = quick_engine().with_fragile_window(Duration::from_millis(300));
    let options = ProbeOptions::new().with_disposal_delay(Duration::from_millis(500));
    let probe = PlaybackProbe::new(EngineHandle::new(engine), options);

    probe.probe_files(&["a.mp4", "b.mp4"]).await;
    let summary = probe.shutdown().await.unwrap();

    assert_eq!(summary.completed, 2);
    assert!(summary.failures.is_empty());
}

#[tokio::test(start_paused = true)]
async fn immediate_disposal_hits_fragile_window() {
    let engine = quick_engine().with_fragile_window(Duration::from_millis(300));
    let recorder = engine.recorder();
    let options = ProbeOptions::new().with_disposal_delay(Duration::ZERO);
    let probe = PlaybackProbe::new(EngineHandle::new(engine), options);

    probe.probe_file("a.mp4").await.unwrap();
    assert_eq!(probe.disposals().stats().scheduled, 1);

    let summary = probe.shutdown().await.unwrap();
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.failures.len(), 1);
    assert!(matches!(summary.failures[0], ProbeError::Disposal(_)));

    // Still only one disposal attempt.
    let players = recorder.created_players();
    assert_eq!(recorder.disposal_count(players[0]), 1);
}

#[tokio::test]
async fn blocking_disposal_does_not_stall_probing() {
    let engine = quick_engine().with_dispose_cost(Duration::from_millis(200));
    let options = ProbeOptions::new()
        .with_disposal_delay(Duration::ZERO)
        .with_settle_delay(Duration::ZERO);
    let probe = PlaybackProbe::new(EngineHandle::new(engine), options);

    let started = std::time::Instant::now();
    let run = probe
        .probe_files(&["a.mp4", "b.mp4", "c.mp4"])
        .await;
    let probing = started.elapsed();

    assert!(run.is_success());
    // Three blocking 200 ms disposals run off the probing task.
    assert!(probing < Duration::from_millis(600), "probing took {probing:?}");

    let summary = probe.shutdown().await.unwrap();
    assert_eq!(summary.completed, 3);
}

#[test]
fn engine_dispose_consumes_engine() {
    let engine = SimulatedEngine::new();
    let recorder = engine.recorder();
    engine.dispose().unwrap();
    assert_eq!(recorder.events(), vec![EngineEvent::EngineDisposed]);
}
