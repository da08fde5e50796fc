use std::sync::Arc;

use crate::kernel::host::{BatterySource, BatteryStatus};

/// Below this level, and not charging, animations should be trimmed.
pub const LOW_BATTERY_LEVEL: f64 = 0.2;

/// Battery-driven degradation signal.
///
/// Without a battery API the host is treated as fully charged and plugged in,
/// so it never asks for optimization.
pub struct BatteryOptimizer {
    source: Arc<dyn BatterySource>,
}

impl BatteryOptimizer {
    pub fn new(source: Arc<dyn BatterySource>) -> Self {
        Self { source }
    }

    fn status(&self) -> BatteryStatus {
        self.source.read().unwrap_or(BatteryStatus {
            level: 1.0,
            charging: true,
        })
    }

    pub fn should_optimize_for_battery(&self) -> bool {
        let status = self.status();
        status.level < LOW_BATTERY_LEVEL && !status.charging
    }

    pub fn battery_level(&self) -> f64 {
        self.status().level
    }

    pub fn is_charging(&self) -> bool {
        self.status().charging
    }
}
