//! Host capability seams.
//!
//! Everything the monitoring core needs from the outside world is read
//! through these traits: memory introspection, static device signals, and
//! the animated-surface query. Reads are synchronous and best-effort.
//! An absent capability is reported as `None`, never as a panic.

use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Heap-like memory figures, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySample {
    pub used: u64,
    pub total: u64,
    pub limit: u64,
}

/// Whole megabytes, halves rounded toward positive infinity (-2.5 -> -2).
pub fn bytes_to_mb(bytes: f64) -> i64 {
    (bytes / BYTES_PER_MB + 0.5).floor() as i64
}

/// Optional capability: hosts without memory introspection return `None`.
pub trait MemoryTelemetrySource: Send + Sync {
    fn read(&self) -> Option<MemorySample>;
}

/// A host with no memory introspection at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemoryTelemetry;

impl MemoryTelemetrySource for NoMemoryTelemetry {
    fn read(&self) -> Option<MemorySample> {
        None
    }
}

/// Effective network class, slowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkClass {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl NetworkClass {
    /// The two slowest classes.
    pub fn is_slow(&self) -> bool {
        matches!(self, NetworkClass::Slow2g | NetworkClass::TwoG)
    }
}

/// Static device signals. Read fresh on every query; preferences can change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceCapability {
    pub approx_memory_gb: Option<f64>,
    pub cores: Option<u32>,
    pub network_class: Option<NetworkClass>,
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub prefers_reduced_motion: bool,
}

/// Cut-offs below which a device counts as constrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceThresholds {
    pub min_memory_gb: f64,
    pub min_cores: u32,
}

impl Default for DeviceThresholds {
    fn default() -> Self {
        Self {
            min_memory_gb: 4.0,
            min_cores: 4,
        }
    }
}

impl DeviceCapability {
    /// Reported memory below the threshold. Unknown memory is not low-end.
    pub fn is_low_end(&self, thresholds: &DeviceThresholds) -> bool {
        self.approx_memory_gb
            .map(|gb| gb < thresholds.min_memory_gb)
            .unwrap_or(false)
    }

    /// Static recommendation to reduce animations, independent of live FPS.
    pub fn recommends_reduction(&self, thresholds: &DeviceThresholds) -> bool {
        if self.prefers_reduced_motion {
            return true;
        }
        if self.is_low_end(thresholds) {
            return true;
        }
        if self.cores.map(|c| c < thresholds.min_cores).unwrap_or(false) {
            return true;
        }
        if self.network_class.map(|n| n.is_slow()).unwrap_or(false) {
            return true;
        }
        self.is_mobile
    }
}

pub trait DeviceCapabilityProbe: Send + Sync {
    fn read(&self) -> DeviceCapability;
}

/// Fixed answers; useful for headless hosts and replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDeviceProbe(pub DeviceCapability);

impl DeviceCapabilityProbe for StaticDeviceProbe {
    fn read(&self) -> DeviceCapability {
        self.0
    }
}

/// Number of currently animated elements, supplied by the rendering layer.
pub trait AnimatedElementCounter: Send + Sync {
    fn count(&self) -> usize;
}

/// Battery level in `0.0..=1.0` and charging state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub level: f64,
    pub charging: bool,
}

/// Optional capability: hosts without a battery API return `None`.
pub trait BatterySource: Send + Sync {
    fn read(&self) -> Option<BatteryStatus>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoBattery;

impl BatterySource for NoBattery {
    fn read(&self) -> Option<BatteryStatus> {
        None
    }
}

/// Fixed battery reading, e.g. from configuration.
#[derive(Debug, Clone, Copy)]
pub struct StaticBattery(pub BatteryStatus);

impl BatterySource for StaticBattery {
    fn read(&self) -> Option<BatteryStatus> {
        Some(self.0)
    }
}
