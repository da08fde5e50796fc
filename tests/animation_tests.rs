use std::sync::Arc;

use lumen::animation::{
    generate_smart_config, smart_config, AnimatedElement, AnimationPreset, AnimationRegistry, PlayState,
};
use lumen::kernel::host::{AnimatedElementCounter, DeviceCapability, DeviceThresholds, StaticDeviceProbe};
use lumen::kernel::telemetry::Telemetry;
use lumen::kernel::time::Timestamp;
use lumen::monitor::{MonitorConfig, PerformanceMonitor};
use parking_lot::Mutex;

#[derive(Default)]
struct Star {
    state: Mutex<Option<PlayState>>,
    cleared: Mutex<bool>,
}

impl AnimatedElement for Star {
    fn animation_name(&self) -> Option<String> {
        (!*self.cleared.lock()).then(|| "float".to_string())
    }

    fn set_play_state(&self, state: PlayState) {
        *self.state.lock() = Some(state);
    }

    fn clear_animation(&self) {
        *self.cleared.lock() = true;
    }
}

fn desktop() -> DeviceCapability {
    DeviceCapability {
        approx_memory_gb: Some(8.0),
        cores: Some(8),
        ..DeviceCapability::default()
    }
}

#[test]
fn test_presets_by_device_class() {
    let thresholds = DeviceThresholds::default();

    let config = smart_config(false, &desktop(), &thresholds);
    assert_eq!(config, AnimationPreset::Desktop.config());
    assert_eq!(config.stars_count, 60);

    let tablet = DeviceCapability { is_tablet: true, ..desktop() };
    assert_eq!(smart_config(false, &tablet, &thresholds).stars_count, 45);

    let phone = DeviceCapability { is_mobile: true, ..desktop() };
    assert_eq!(smart_config(false, &phone, &thresholds).stars_count, 30);

    // A tablet that also reports mobile is still a tablet.
    let both = DeviceCapability { is_mobile: true, is_tablet: true, ..desktop() };
    assert_eq!(AnimationPreset::select(false, &both, &thresholds), AnimationPreset::Tablet);
}

#[test]
fn test_reduce_and_low_memory_pick_reduced() {
    let thresholds = DeviceThresholds::default();

    let reduced = smart_config(true, &desktop(), &thresholds);
    assert_eq!(reduced.stars_count, 20);
    assert_eq!(reduced.animation_duration_sec, 6.0);
    assert!(reduced.enable_twinkle);
    assert!(!reduced.enable_float);
    assert!(!reduced.enable_hardware_acceleration);

    let low_memory = DeviceCapability { approx_memory_gb: Some(2.0), ..desktop() };
    assert_eq!(
        AnimationPreset::select(false, &low_memory, &thresholds),
        AnimationPreset::Reduced
    );
}

#[test]
fn test_reduced_motion_always_wins() {
    let thresholds = DeviceThresholds::default();
    let capability = DeviceCapability { prefers_reduced_motion: true, ..desktop() };

    for should_reduce in [false, true] {
        let config = smart_config(should_reduce, &capability, &thresholds);
        assert_eq!(config.stars_count, 0);
        assert!(!config.enable_twinkle);
        assert!(!config.enable_float);
    }
}

#[test]
fn test_generated_config_follows_live_fps() {
    let monitor = PerformanceMonitor::new(
        MonitorConfig::default(),
        Arc::new(StaticDeviceProbe(desktop())),
        Telemetry::new(),
    );
    assert_eq!(generate_smart_config(&monitor).stars_count, 60);

    monitor.start_at(Timestamp::from_millis(0.0));
    for k in 1..=10 {
        monitor.on_frame(Timestamp::from_millis(k as f64 * 100.0));
    }
    assert_eq!(monitor.current_fps(), 10);
    assert_eq!(generate_smart_config(&monitor), AnimationPreset::Reduced.config());
}

#[test]
fn test_registry_pause_resume_cleanup() {
    let registry = AnimationRegistry::new();
    let stars: Vec<Arc<Star>> = (0..3).map(|_| Arc::new(Star::default())).collect();
    let ids: Vec<_> = stars.iter().map(|s| registry.register(s.clone())).collect();
    assert_eq!(registry.count(), 3);

    assert_eq!(registry.pause_all(), 3);
    assert!(stars.iter().all(|s| *s.state.lock() == Some(PlayState::Paused)));
    assert_eq!(registry.resume_all(), 3);
    assert!(stars.iter().all(|s| *s.state.lock() == Some(PlayState::Running)));

    assert!(registry.cleanup(ids[0]));
    assert!(!registry.cleanup(ids[0]));
    assert!(*stars[0].cleared.lock());
    assert_eq!(registry.len(), 2);

    assert_eq!(registry.cleanup_all(), 2);
    assert!(registry.is_empty());
    assert!(stars.iter().all(|s| *s.cleared.lock()));
    assert_eq!(registry.pause_all(), 0);
}
