use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lumen::kernel::clock::SyntheticFrameClock;
use lumen::kernel::host::{DeviceCapability, NetworkClass, StaticDeviceProbe};
use lumen::kernel::telemetry::Telemetry;
use lumen::kernel::time::Timestamp;
use lumen::monitor::{MonitorConfig, MonitorStatus, PerformanceMonitor, INITIAL_FPS};
use parking_lot::Mutex;
use tokio::sync::mpsc;

fn desktop() -> DeviceCapability {
    DeviceCapability {
        approx_memory_gb: Some(16.0),
        cores: Some(8),
        network_class: Some(NetworkClass::FourG),
        ..DeviceCapability::default()
    }
}

fn monitor_with(capability: DeviceCapability) -> (PerformanceMonitor, Telemetry) {
    let telemetry = Telemetry::new();
    let monitor = PerformanceMonitor::new(
        MonitorConfig::default(),
        Arc::new(StaticDeviceProbe(capability)),
        telemetry.clone(),
    );
    (monitor, telemetry)
}

/// Feeds `seconds` of frames at an exact rate and returns the emitted samples.
fn drive(monitor: &PerformanceMonitor, start_ms: f64, fps: u32, seconds: u32) -> Vec<u32> {
    let step = 1000.0 / fps as f64;
    (1..=fps * seconds)
        .filter_map(|k| monitor.on_frame(Timestamp::from_millis(start_ms + step * k as f64)))
        .collect()
}

#[test]
fn test_initial_state() {
    let (monitor, _) = monitor_with(desktop());
    assert_eq!(monitor.status(), MonitorStatus::Idle);
    assert_eq!(monitor.current_fps(), INITIAL_FPS);
    assert!(!monitor.should_reduce_animations());
}

#[test]
fn test_frames_ignored_while_idle() {
    let (monitor, telemetry) = monitor_with(desktop());
    assert!(drive(&monitor, 0.0, 20, 2).is_empty());
    assert_eq!(monitor.current_fps(), INITIAL_FPS);
    assert_eq!(telemetry.snapshot().fps_stats.samples, 0);
}

#[test]
fn test_start_is_idempotent() {
    let (monitor, telemetry) = monitor_with(desktop());

    assert!(monitor.start_at(Timestamp::from_millis(0.0)));
    assert!(!monitor.start_at(Timestamp::from_millis(500.0)));
    assert_eq!(telemetry.snapshot().lifecycle_stats.monitor_starts, 1);

    // The window still opened at 0, not at the ignored second start.
    assert_eq!(drive(&monitor, 0.0, 50, 1), vec![50]);

    monitor.stop();
    monitor.stop();
    assert_eq!(monitor.status(), MonitorStatus::Idle);
}

#[test]
fn test_low_fps_triggers_reduction_and_recovers() {
    let (monitor, telemetry) = monitor_with(desktop());
    monitor.start_at(Timestamp::from_millis(0.0));

    assert_eq!(drive(&monitor, 0.0, 20, 2), vec![20, 20]);
    assert_eq!(monitor.current_fps(), 20);
    assert!(monitor.should_reduce_animations());

    assert_eq!(drive(&monitor, 2000.0, 50, 1), vec![50]);
    assert!(!monitor.should_reduce_animations());

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.fps_stats.samples, 3);
    // Only the transition into the low state is logged.
    assert_eq!(snapshot.fps_stats.low_fps_events, 1);
    assert_eq!(snapshot.fps_stats.min_fps, Some(20));
    assert_eq!(snapshot.fps_stats.max_fps, Some(50));
}

#[test]
fn test_threshold_is_strict() {
    let (monitor, _) = monitor_with(desktop());
    monitor.start_at(Timestamp::from_millis(0.0));

    // 30 frames closing at exactly one second: 30 FPS, the threshold itself.
    for k in 1..30 {
        assert_eq!(monitor.on_frame(Timestamp::from_millis(k as f64 * 33.0)), None);
    }
    assert_eq!(monitor.on_frame(Timestamp::from_millis(1000.0)), Some(30));
    assert!(!monitor.should_reduce_animations());
}

#[test]
fn test_device_signals_recommend_reduction() {
    let cases = [
        DeviceCapability { prefers_reduced_motion: true, ..desktop() },
        DeviceCapability { approx_memory_gb: Some(2.0), ..desktop() },
        DeviceCapability { cores: Some(2), ..desktop() },
        DeviceCapability { network_class: Some(NetworkClass::Slow2g), ..desktop() },
        DeviceCapability { network_class: Some(NetworkClass::TwoG), ..desktop() },
        DeviceCapability { is_mobile: true, ..desktop() },
    ];

    for capability in cases {
        let (monitor, _) = monitor_with(capability);
        assert!(monitor.should_reduce_animations(), "expected reduction for {:?}", capability);
    }

    // 3G is not slow, unknown figures are not low-end.
    let (monitor, _) = monitor_with(DeviceCapability {
        network_class: Some(NetworkClass::ThreeG),
        approx_memory_gb: None,
        cores: None,
        ..desktop()
    });
    assert!(!monitor.should_reduce_animations());
}

#[test]
fn test_subscribers_receive_every_sample() {
    let (monitor, _) = monitor_with(desktop());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let id = monitor.on_fps_change(move |fps| sink.lock().push(fps));

    monitor.start_at(Timestamp::from_millis(0.0));
    drive(&monitor, 0.0, 40, 2);
    assert_eq!(*seen.lock(), vec![40, 40]);

    assert!(monitor.remove_fps_callback(id));
    assert!(!monitor.remove_fps_callback(id));
    drive(&monitor, 2000.0, 40, 1);
    assert_eq!(seen.lock().len(), 2);
}

#[test]
fn test_callback_may_unsubscribe_itself() {
    let (monitor, _) = monitor_with(desktop());
    let calls = Arc::new(AtomicUsize::new(0));
    let other_calls = Arc::new(AtomicUsize::new(0));

    let subscribers = monitor.subscribers();
    let own_id = Arc::new(Mutex::new(None));

    let counter = Arc::clone(&calls);
    let id_slot = Arc::clone(&own_id);
    let id = monitor.on_fps_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = *id_slot.lock() {
            subscribers.unsubscribe(id);
        }
    });
    *own_id.lock() = Some(id);

    let counter = Arc::clone(&other_calls);
    monitor.on_fps_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    monitor.start_at(Timestamp::from_millis(0.0));
    drive(&monitor, 0.0, 50, 3);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // Removal mid-notification does not skip the next subscriber.
    assert_eq!(other_calls.load(Ordering::SeqCst), 3);
    assert_eq!(monitor.subscribers().len(), 1);
}

#[tokio::test]
async fn test_background_loop_drives_samples() {
    let (monitor, _) = monitor_with(desktop());
    let monitor = Arc::new(monitor);
    let (tx, mut rx) = mpsc::unbounded_channel();
    monitor.on_fps_change(move |fps| {
        let _ = tx.send(fps);
    });

    let clock = SyntheticFrameClock::at_rate(Timestamp::from_millis(0.0), 25.0, 3000.0);
    monitor.start(clock);
    assert!(monitor.is_monitoring());

    for _ in 0..3 {
        let fps = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("sample in time")
            .expect("channel open");
        assert_eq!(fps, 25);
    }

    monitor.stop();
    assert_eq!(monitor.status(), MonitorStatus::Idle);
}

#[tokio::test]
async fn test_second_start_keeps_first_clock() {
    let (monitor, telemetry) = monitor_with(desktop());
    let monitor = Arc::new(monitor);
    let (tx, mut rx) = mpsc::unbounded_channel();
    monitor.on_fps_change(move |fps| {
        let _ = tx.send(fps);
    });

    monitor.start(SyntheticFrameClock::at_rate(Timestamp::from_millis(0.0), 50.0, 1000.0));
    monitor.start(SyntheticFrameClock::at_rate(Timestamp::from_millis(0.0), 10.0, 1000.0));

    let fps = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("sample in time")
        .expect("channel open");
    assert_eq!(fps, 50);
    assert_eq!(monitor.current_fps(), 50);
    assert_eq!(telemetry.snapshot().lifecycle_stats.monitor_starts, 1);
}
