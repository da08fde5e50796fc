use serde::{Deserialize, Serialize};

use crate::kernel::host::{DeviceCapability, DeviceThresholds};
use crate::monitor::performance::PerformanceMonitor;

/// Concrete settings for one animated surface. Produced fresh per query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub stars_count: u32,
    pub animation_duration_sec: f64,
    pub enable_twinkle: bool,
    pub enable_float: bool,
    pub enable_hardware_acceleration: bool,
}

/// Degradation ladder, most constrained first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationPreset {
    Reduced,
    Mobile,
    Tablet,
    Desktop,
}

impl AnimationPreset {
    pub fn config(self) -> AnimationConfig {
        match self {
            AnimationPreset::Reduced => AnimationConfig {
                stars_count: 20,
                animation_duration_sec: 6.0,
                enable_twinkle: true,
                enable_float: false,
                enable_hardware_acceleration: false,
            },
            AnimationPreset::Mobile => AnimationConfig {
                stars_count: 30,
                animation_duration_sec: 5.0,
                enable_twinkle: true,
                enable_float: true,
                enable_hardware_acceleration: true,
            },
            AnimationPreset::Tablet => AnimationConfig {
                stars_count: 45,
                animation_duration_sec: 4.5,
                enable_twinkle: true,
                enable_float: true,
                enable_hardware_acceleration: true,
            },
            AnimationPreset::Desktop => AnimationConfig {
                stars_count: 60,
                animation_duration_sec: 4.0,
                enable_twinkle: true,
                enable_float: true,
                enable_hardware_acceleration: true,
            },
        }
    }

    /// First matching rung: reduce/low-end, phone, tablet, then desktop.
    pub fn select(should_reduce: bool, capability: &DeviceCapability, thresholds: &DeviceThresholds) -> Self {
        if should_reduce || capability.is_low_end(thresholds) {
            AnimationPreset::Reduced
        } else if capability.is_mobile && !capability.is_tablet {
            AnimationPreset::Mobile
        } else if capability.is_tablet {
            AnimationPreset::Tablet
        } else {
            AnimationPreset::Desktop
        }
    }
}

/// Pure decision: preset from the signals, then the reduced-motion override.
///
/// A reduced-motion preference always wins: no stars, no twinkle, no float.
pub fn smart_config(should_reduce: bool, capability: &DeviceCapability, thresholds: &DeviceThresholds) -> AnimationConfig {
    let mut config = AnimationPreset::select(should_reduce, capability, thresholds).config();

    if capability.prefers_reduced_motion {
        config.stars_count = 0;
        config.enable_twinkle = false;
        config.enable_float = false;
    }

    config
}

/// Query the monitor and the device once each and derive the configuration.
pub fn generate_smart_config(monitor: &PerformanceMonitor) -> AnimationConfig {
    let capability = monitor.device_capability();
    let should_reduce = monitor.should_reduce_with(&capability);
    smart_config(should_reduce, &capability, &monitor.config().device)
}
