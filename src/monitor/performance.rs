use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::kernel::clock::FrameClock;
use crate::kernel::fps::FpsSampler;
use crate::kernel::host::{DeviceCapability, DeviceCapabilityProbe, DeviceThresholds};
use crate::kernel::telemetry::{LifecycleEvent, Telemetry, TelemetryEvent};
use crate::kernel::time::Timestamp;

/// Reported until the first full window has been sampled.
pub const INITIAL_FPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Live FPS below this recommends degrading animations.
    pub low_fps_threshold: u32,
    pub device: DeviceThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            low_fps_threshold: 30,
            device: DeviceThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

pub type FpsCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// Observer list for FPS samples.
///
/// Iteration policy: `notify` snapshots the list and releases the lock before
/// invoking anyone, so callbacks may subscribe or unsubscribe (themselves
/// included) freely. Changes made during a notification apply from the next
/// sample on.
#[derive(Clone, Default)]
pub struct FpsSubscribers {
    inner: Arc<Mutex<Vec<(SubscriptionId, FpsCallback)>>>,
}

impl FpsSubscribers {
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.inner.lock().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut list = self.inner.lock();
        let before = list.len();
        list.retain(|(sub, _)| *sub != id);
        list.len() != before
    }

    pub fn notify(&self, fps: u32) {
        let snapshot: Vec<FpsCallback> = self
            .inner
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(fps);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl fmt::Debug for FpsSubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FpsSubscribers").field("len", &self.len()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorStatus {
    Idle,
    Monitoring,
}

#[derive(Debug)]
struct MonitorState {
    status: MonitorStatus,
    sampler: FpsSampler,
    current_fps: u32,
    low_fps: bool,
}

struct FrameTask {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Continuous FPS observer and degrade/no-degrade oracle.
///
/// Idle -> Monitoring -> Idle via `start`/`stop`. Frames arrive either from a
/// spawned `FrameClock` loop (`start`) or from the host's own loop
/// (`start_at` + `on_frame`).
pub struct PerformanceMonitor {
    config: MonitorConfig,
    probe: Arc<dyn DeviceCapabilityProbe>,
    state: Mutex<MonitorState>,
    subscribers: FpsSubscribers,
    frame_task: Mutex<Option<FrameTask>>,
    telemetry: Telemetry,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig, probe: Arc<dyn DeviceCapabilityProbe>, telemetry: Telemetry) -> Self {
        Self {
            config,
            probe,
            state: Mutex::new(MonitorState {
                status: MonitorStatus::Idle,
                sampler: FpsSampler::new(Timestamp::default()),
                current_fps: INITIAL_FPS,
                low_fps: false,
            }),
            subscribers: FpsSubscribers::default(),
            frame_task: Mutex::new(None),
            telemetry,
        }
    }

    /// Enter Monitoring with the first window opening at `now`.
    /// Returns false (and changes nothing) if already monitoring.
    pub fn start_at(&self, now: Timestamp) -> bool {
        let mut state = self.state.lock();
        if state.status == MonitorStatus::Monitoring {
            return false;
        }
        state.status = MonitorStatus::Monitoring;
        state.sampler.reset(now);
        drop(state);

        info!("Performance monitor started at {:.1}ms", now.ms);
        self.telemetry
            .record(TelemetryEvent::Lifecycle(LifecycleEvent::MonitorStarted));
        true
    }

    /// Start monitoring and drive frames from `clock` on a background task.
    /// No-op while already monitoring.
    ///
    /// The task holds only a weak reference; it ends at the next frame after
    /// `stop`, or after the monitor is dropped.
    pub fn start<C>(self: &Arc<Self>, mut clock: C)
    where
        C: FrameClock + 'static,
    {
        if !self.start_at(clock.now()) {
            debug!("Performance monitor already running; start ignored");
            return;
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            loop {
                let frame = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    frame = clock.next_frame() => frame,
                };

                let now = match frame {
                    Some(now) => now,
                    None => {
                        debug!("Frame clock ended; monitor loop exiting");
                        break;
                    }
                };

                match weak.upgrade() {
                    Some(monitor) if monitor.is_monitoring() => {
                        monitor.on_frame(now);
                    }
                    _ => break,
                }
            }
        });

        let previous = self.frame_task.lock().replace(FrameTask {
            token,
            _handle: handle,
        });
        if let Some(task) = previous {
            task.token.cancel();
        }
    }

    /// Back to Idle. Safe to call when not monitoring.
    pub fn stop(&self) {
        if let Some(task) = self.frame_task.lock().take() {
            task.token.cancel();
        }

        let mut state = self.state.lock();
        if state.status == MonitorStatus::Idle {
            return;
        }
        state.status = MonitorStatus::Idle;
        state.low_fps = false;
        drop(state);

        info!("Performance monitor stopped");
        self.telemetry
            .record(TelemetryEvent::Lifecycle(LifecycleEvent::MonitorStopped));
    }

    /// Feed one frame. Returns the new sample if this frame closed a window.
    /// Ignored while Idle.
    pub fn on_frame(&self, now: Timestamp) -> Option<u32> {
        let threshold = self.config.low_fps_threshold;
        let (fps, entered_low, recovered) = {
            let mut state = self.state.lock();
            if state.status != MonitorStatus::Monitoring {
                return None;
            }
            let fps = state.sampler.on_tick(now)?;
            state.current_fps = fps;

            let is_low = fps < threshold;
            let entered_low = is_low && !state.low_fps;
            let recovered = !is_low && state.low_fps;
            state.low_fps = is_low;
            (fps, entered_low, recovered)
        };

        self.telemetry.record(TelemetryEvent::FpsSampled { fps });
        if entered_low {
            warn!("Low FPS detected: {} (threshold {})", fps, threshold);
            self.telemetry
                .record(TelemetryEvent::LowFps { fps, threshold });
        } else if recovered {
            info!("FPS recovered: {}", fps);
        }

        // Lock released: callbacks may touch the monitor or the subscriber list.
        self.subscribers.notify(fps);
        Some(fps)
    }

    pub fn current_fps(&self) -> u32 {
        self.state.lock().current_fps
    }

    pub fn status(&self) -> MonitorStatus {
        self.state.lock().status
    }

    pub fn is_monitoring(&self) -> bool {
        self.status() == MonitorStatus::Monitoring
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Fresh device read; never cached.
    pub fn device_capability(&self) -> DeviceCapability {
        self.probe.read()
    }

    /// Live FPS below threshold, or the device itself recommends reduction.
    /// Evaluated fresh on every call.
    pub fn should_reduce_animations(&self) -> bool {
        self.should_reduce_with(&self.device_capability())
    }

    /// Same decision against a capability the caller already read.
    pub fn should_reduce_with(&self, capability: &DeviceCapability) -> bool {
        self.current_fps() < self.config.low_fps_threshold
            || capability.recommends_reduction(&self.config.device)
    }

    pub fn on_fps_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn remove_fps_callback(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Shared handle to the observer list, e.g. for a callback that removes itself.
    pub fn subscribers(&self) -> FpsSubscribers {
        self.subscribers.clone()
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.frame_task.get_mut().take() {
            task.token.cancel();
        }
    }
}
