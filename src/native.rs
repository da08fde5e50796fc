//! Leaf implementations for a native (non-browser) host process.

use std::env;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};

use crate::a11y::auditor::{ElementStyle, StaticStyleInspector};
use crate::animation::registry::AnimationRegistry;
use crate::kernel::host::{
    BatterySource, BatteryStatus, DeviceCapability, DeviceCapabilityProbe, MemorySample,
    MemoryTelemetrySource, NetworkClass, NoBattery, StaticBattery,
};
use crate::surface::SurfaceHost;

/// Set to `1`/`true` to report a reduced-motion preference at runtime.
pub const REDUCED_MOTION_ENV: &str = "LUMEN_REDUCED_MOTION";

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Signals a native process cannot discover on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub network_class: Option<NetworkClass>,
    pub prefers_reduced_motion: bool,
    /// Battery reading to report; the OS battery is not queried.
    pub battery: Option<BatteryStatus>,
    /// Text/background pairs audited for contrast.
    pub audit_palette: Vec<ElementStyle>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            is_mobile: false,
            is_tablet: false,
            network_class: None,
            prefers_reduced_motion: false,
            battery: None,
            audit_palette: vec![
                ElementStyle::new("p", "rgb(23, 23, 23)", "rgb(255, 255, 255)"),
                ElementStyle::new("a", "rgb(37, 99, 235)", "rgb(255, 255, 255)"),
                ElementStyle::new("p", "rgb(237, 237, 237)", "rgb(10, 10, 10)"),
                ElementStyle::new("span", "rgb(156, 163, 175)", "rgb(255, 255, 255)"),
            ],
        }
    }
}

/// Process memory via `sysinfo`: resident set as used, virtual size as
/// total, physical memory as the limit.
pub struct ProcessMemorySource {
    system: Mutex<System>,
    pid: Pid,
}

impl ProcessMemorySource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: Pid::from_u32(std::process::id()),
        }
    }
}

impl Default for ProcessMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTelemetrySource for ProcessMemorySource {
    fn read(&self) -> Option<MemorySample> {
        let mut system = self.system.lock();
        system.refresh_memory();
        if !system.refresh_process(self.pid) {
            return None;
        }

        let limit = system.total_memory();
        system.process(self.pid).map(|p| MemorySample {
            used: p.memory(),
            total: p.virtual_memory(),
            limit,
        })
    }
}

/// Hardware signals from the OS, presentation signals from configuration.
pub struct NativeDeviceProbe {
    host: HostConfig,
    system: Mutex<System>,
}

impl NativeDeviceProbe {
    pub fn new(host: HostConfig) -> Self {
        Self {
            host,
            system: Mutex::new(System::new()),
        }
    }

    fn reduced_motion(&self) -> bool {
        match env::var(REDUCED_MOTION_ENV) {
            Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            Err(_) => self.host.prefers_reduced_motion,
        }
    }
}

impl DeviceCapabilityProbe for NativeDeviceProbe {
    fn read(&self) -> DeviceCapability {
        let total = {
            let mut system = self.system.lock();
            system.refresh_memory();
            system.total_memory()
        };

        DeviceCapability {
            approx_memory_gb: (total > 0).then(|| total as f64 / BYTES_PER_GB),
            cores: thread::available_parallelism().ok().map(|n| n.get() as u32),
            network_class: self.host.network_class,
            is_mobile: self.host.is_mobile,
            is_tablet: self.host.is_tablet,
            prefers_reduced_motion: self.reduced_motion(),
        }
    }
}

impl SurfaceHost {
    /// Leaf implementations for the current process.
    pub fn native(host: &HostConfig) -> Self {
        let battery: Arc<dyn BatterySource> = match host.battery {
            Some(status) => Arc::new(StaticBattery(status)),
            None => Arc::new(NoBattery),
        };

        SurfaceHost {
            memory: Arc::new(ProcessMemorySource::new()),
            probe: Arc::new(NativeDeviceProbe::new(host.clone())),
            styles: Arc::new(StaticStyleInspector(host.audit_palette.clone())),
            animations: Arc::new(AnimationRegistry::new()),
            battery,
        }
    }
}
