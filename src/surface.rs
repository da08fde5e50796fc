//! Host UI boundary.
//!
//! Invariants:
//! - OWNERSHIP: the frame loop and the leak timer belong to the surface that
//!   mounted them and are released on its teardown path (`unmount` or drop).
//! - REFRESH: while mounted, the latest memory report is refreshed on a
//!   fixed period so rendered state never goes stale.
//! - IDEMPOTENCE: `mount` and `unmount` may be repeated; only the first of
//!   each has an effect.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::a11y::auditor::{AccessibilityAuditor, AccessibilityReport, StyleInspector};
use crate::animation::config::{generate_smart_config, AnimationConfig};
use crate::animation::registry::AnimationRegistry;
use crate::config::LumenConfig;
use crate::kernel::clock::FrameClock;
use crate::kernel::error::MonitorError;
use crate::kernel::host::{BatterySource, DeviceCapabilityProbe, MemoryTelemetrySource};
use crate::kernel::telemetry::{LifecycleEvent, Telemetry, TelemetryEvent, TelemetrySnapshot};
use crate::monitor::battery::BatteryOptimizer;
use crate::monitor::leak::{MemoryLeakDetector, MIN_SAMPLE_INTERVAL};
use crate::monitor::performance::PerformanceMonitor;
use crate::monitor::tester::AnimationPerformanceTester;
use crate::monitor::types::{MemoryReport, TestSummary};

/// Leaf implementations supplied by whoever embeds the surface.
#[derive(Clone)]
pub struct SurfaceHost {
    pub memory: Arc<dyn MemoryTelemetrySource>,
    pub probe: Arc<dyn DeviceCapabilityProbe>,
    pub styles: Arc<dyn StyleInspector>,
    pub animations: Arc<AnimationRegistry>,
    pub battery: Arc<dyn BatterySource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Period of the memory report refresh while mounted.
    pub memory_refresh_ms: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            memory_refresh_ms: 5_000,
        }
    }
}

/// Most recent on-demand results, for rendering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatestResults {
    pub performance: Option<TestSummary>,
    pub accessibility: Option<AccessibilityReport>,
    pub memory: Option<MemoryReport>,
    pub leak_suspected: bool,
}

pub struct MonitoringSurface {
    config: LumenConfig,
    telemetry: Telemetry,
    animations: Arc<AnimationRegistry>,
    monitor: Arc<PerformanceMonitor>,
    detector: Arc<MemoryLeakDetector>,
    tester: AnimationPerformanceTester,
    auditor: AccessibilityAuditor,
    battery: BatteryOptimizer,
    latest: Arc<Mutex<LatestResults>>,
    mounted_at: Option<Instant>,
    refresh: Option<RefreshTask>,
}

struct RefreshTask {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Read a report from `detector` into `latest`, flagging growth past `leak_percent`.
fn refresh_memory(
    detector: &MemoryLeakDetector,
    latest: &Mutex<LatestResults>,
    leak_percent: f64,
) -> Result<MemoryReport, MonitorError> {
    let report = detector.memory_report();
    let mut latest = latest.lock();
    match &report {
        Ok(r) => {
            latest.leak_suspected = r.leak_suspected(leak_percent);
            if latest.leak_suspected {
                warn!("Memory grew {:.2}% since mount", r.growth_percent);
            }
            latest.memory = Some(r.clone());
        }
        Err(e) => debug!("Memory report unavailable: {}", e),
    }
    report
}

impl MonitoringSurface {
    pub fn new(config: LumenConfig, host: SurfaceHost) -> Self {
        let telemetry = Telemetry::new();

        let monitor = Arc::new(PerformanceMonitor::new(
            config.monitor,
            Arc::clone(&host.probe),
            telemetry.clone(),
        ));
        let detector = Arc::new(MemoryLeakDetector::new(
            config.leak,
            Arc::clone(&host.memory),
            telemetry.clone(),
        ));
        let tester = AnimationPerformanceTester::new(
            Arc::clone(&host.memory),
            host.animations.clone(),
            telemetry.clone(),
        );
        let auditor = AccessibilityAuditor::new(
            config.audit,
            host.styles,
            host.animations.clone(),
            host.probe,
        );

        Self {
            config,
            telemetry,
            animations: host.animations,
            monitor,
            detector,
            tester,
            auditor,
            battery: BatteryOptimizer::new(host.battery),
            latest: Arc::new(Mutex::new(LatestResults::default())),
            mounted_at: None,
            refresh: None,
        }
    }

    /// Start the FPS monitor on `clock`, the leak detector on its configured
    /// interval and the memory report refresh. Must be called inside a tokio runtime.
    pub fn mount<C>(&mut self, clock: C)
    where
        C: FrameClock + 'static,
    {
        if self.mounted_at.is_some() {
            debug!("Surface already mounted");
            return;
        }

        self.monitor.start(clock);
        self.detector
            .start_monitoring(Duration::from_millis(self.config.leak.interval_ms));
        self.refresh = Some(self.spawn_memory_refresh());

        self.mounted_at = Some(Instant::now());
        info!("Monitoring surface mounted");
        self.telemetry
            .record(TelemetryEvent::Lifecycle(LifecycleEvent::SurfaceMounted));
    }

    /// Stop everything this surface started and close the telemetry session.
    pub fn unmount(&mut self) {
        let Some(mounted_at) = self.mounted_at.take() else {
            return;
        };

        if let Some(task) = self.refresh.take() {
            task.token.cancel();
        }
        self.monitor.stop();
        self.detector.stop_monitoring();
        self.tester.stop_test();

        self.telemetry
            .record(TelemetryEvent::Lifecycle(LifecycleEvent::SurfaceUnmounted));
        let duration_ms = mounted_at.elapsed().as_secs_f64() * 1000.0;
        self.telemetry.close_session(duration_ms);
        info!("Monitoring surface unmounted after {:.0}ms", duration_ms);
    }

    fn spawn_memory_refresh(&self) -> RefreshTask {
        let period = Duration::from_millis(self.config.surface.memory_refresh_ms).max(MIN_SAMPLE_INTERVAL);
        let leak_percent = self.config.leak.report_leak_percent;
        let detector = Arc::downgrade(&self.detector);
        let latest = Arc::clone(&self.latest);
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut cadence = interval_at(Instant::now() + period, period);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = cadence.tick() => {}
                }

                match detector.upgrade() {
                    Some(detector) => {
                        let _ = refresh_memory(&detector, &latest, leak_percent);
                    }
                    None => break,
                }
            }
            debug!("Memory report refresh exited");
        });

        RefreshTask {
            token,
            _handle: handle,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted_at.is_some()
    }

    /// Manual trigger: bounded test over the configured duration.
    pub async fn run_performance_test<C>(&self, clock: C) -> Result<TestSummary, MonitorError>
    where
        C: FrameClock,
    {
        let summary = self
            .tester
            .start_test(self.config.tester.duration_ms, clock)
            .await?;
        self.latest.lock().performance = Some(summary.clone());
        Ok(summary)
    }

    /// Manual trigger: contrast and reduced-motion audit.
    pub fn run_accessibility_audit(&self) -> AccessibilityReport {
        let report = self.auditor.audit();
        self.latest.lock().accessibility = Some(report.clone());
        report
    }

    pub fn memory_report(&self) -> Result<MemoryReport, MonitorError> {
        refresh_memory(&self.detector, &self.latest, self.config.leak.report_leak_percent)
    }

    pub fn latest(&self) -> LatestResults {
        self.latest.lock().clone()
    }

    /// Configuration for an animated surface initialized now.
    pub fn animation_config(&self) -> AnimationConfig {
        generate_smart_config(&self.monitor)
    }

    pub fn pause_animations(&self) -> usize {
        self.animations.pause_all()
    }

    pub fn resume_animations(&self) -> usize {
        self.animations.resume_all()
    }

    pub fn battery(&self) -> &BatteryOptimizer {
        &self.battery
    }

    pub fn stop_performance_test(&self) -> bool {
        self.tester.stop_test()
    }

    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    pub fn detector(&self) -> &Arc<MemoryLeakDetector> {
        &self.detector
    }

    pub fn animations(&self) -> &Arc<AnimationRegistry> {
        &self.animations
    }

    pub fn config(&self) -> &LumenConfig {
        &self.config
    }
}

impl Drop for MonitoringSurface {
    fn drop(&mut self) {
        self.unmount();
    }
}
