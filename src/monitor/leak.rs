use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{round_to_hundredths, LeakWarning, MemoryReport};
use crate::kernel::error::MonitorError;
use crate::kernel::host::{bytes_to_mb, MemoryTelemetrySource};
use crate::kernel::history::{MemoryHistory, DEFAULT_HISTORY_CAPACITY};
use crate::kernel::telemetry::{LifecycleEvent, Telemetry, TelemetryEvent};

/// Shortest accepted sampling period.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakDetectorConfig {
    pub interval_ms: u64,
    pub history_capacity: usize,
    /// Size of both the recent and the older comparison window.
    pub window: usize,
    /// Relative growth of the recent average over the older one that counts as a leak.
    pub growth_threshold: f64,
    /// Baseline growth (percent) at which a `MemoryReport` is flagged.
    pub report_leak_percent: f64,
}

impl Default for LeakDetectorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            window: 10,
            growth_threshold: 0.10,
            report_leak_percent: 20.0,
        }
    }
}

/// Sliding-window leak heuristic over `history`.
///
/// Compares the average of the most recent `window` entries against the
/// `window` entries immediately before them. Both windows must be full.
pub fn detect_leak(history: &MemoryHistory, window: usize, growth_threshold: f64) -> Option<LeakWarning> {
    let (recent, older) = history.windows(window)?;

    let avg = |values: &[u64]| values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
    let recent_avg = avg(&recent);
    let older_avg = avg(&older);
    if older_avg <= 0.0 {
        return None;
    }

    let growth_rate = (recent_avg - older_avg) / older_avg;
    if growth_rate > growth_threshold {
        Some(LeakWarning {
            growth_rate,
            recent_avg_bytes: recent_avg,
            older_avg_bytes: older_avg,
        })
    } else {
        None
    }
}

#[derive(Debug)]
struct DetectorState {
    history: MemoryHistory,
    initial_bytes: Option<u64>,
    monitoring: bool,
    last_warning: Option<LeakWarning>,
}

struct IntervalTask {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Long-running memory sampler with a capped history and a growth heuristic.
pub struct MemoryLeakDetector {
    config: LeakDetectorConfig,
    source: Arc<dyn MemoryTelemetrySource>,
    state: Mutex<DetectorState>,
    task: Mutex<Option<IntervalTask>>,
    telemetry: Telemetry,
}

impl MemoryLeakDetector {
    pub fn new(config: LeakDetectorConfig, source: Arc<dyn MemoryTelemetrySource>, telemetry: Telemetry) -> Self {
        Self {
            state: Mutex::new(DetectorState {
                history: MemoryHistory::new(config.history_capacity),
                initial_bytes: None,
                monitoring: false,
                last_warning: None,
            }),
            config,
            source,
            task: Mutex::new(None),
            telemetry,
        }
    }

    /// Capture the baseline and mark the detector as monitoring, without a timer.
    ///
    /// Returns false if already monitoring or if the host has no memory telemetry
    /// (logged, nothing changes).
    pub fn begin(&self) -> bool {
        let mut state = self.state.lock();
        if state.monitoring {
            warn!("Memory leak detector already running");
            return false;
        }

        let baseline = match self.source.read() {
            Some(sample) => sample.used,
            None => {
                drop(state);
                warn!("Memory telemetry unsupported on this host; leak detection disabled");
                self.telemetry.record(TelemetryEvent::MemoryUnavailable);
                return false;
            }
        };

        state.monitoring = true;
        state.initial_bytes = Some(baseline);
        state.history.clear();
        state.history.push(baseline);
        state.last_warning = None;
        drop(state);

        info!("Memory leak detector started, baseline {} MB", bytes_to_mb(baseline as f64));
        self.telemetry
            .record(TelemetryEvent::Lifecycle(LifecycleEvent::LeakDetectorStarted));
        true
    }

    /// Start sampling every `interval`. Idempotent; a no-op without memory telemetry.
    ///
    /// A zero interval is raised to `MIN_SAMPLE_INTERVAL`.
    pub fn start_monitoring(self: &Arc<Self>, interval: Duration) {
        if interval.is_zero() {
            warn!("Zero leak-check interval; using {:?}", MIN_SAMPLE_INTERVAL);
        }
        let interval = interval.max(MIN_SAMPLE_INTERVAL);

        if !self.begin() {
            return;
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            // First check one full interval after start.
            let mut cadence = interval_at(Instant::now() + interval, interval);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = cadence.tick() => {}
                }

                match weak.upgrade() {
                    Some(detector) if detector.is_monitoring() => {
                        detector.sample();
                    }
                    _ => break,
                }
            }
            debug!("Memory leak detector loop exited");
        });

        let previous = self.task.lock().replace(IntervalTask {
            token,
            _handle: handle,
        });
        if let Some(task) = previous {
            task.token.cancel();
        }
    }

    /// Cancel the interval. Safe to call when not running.
    pub fn stop_monitoring(&self) {
        if let Some(task) = self.task.lock().take() {
            task.token.cancel();
        }

        let mut state = self.state.lock();
        if !state.monitoring {
            return;
        }
        state.monitoring = false;
        drop(state);

        info!("Memory leak detector stopped");
        self.telemetry
            .record(TelemetryEvent::Lifecycle(LifecycleEvent::LeakDetectorStopped));
    }

    pub fn is_monitoring(&self) -> bool {
        self.state.lock().monitoring
    }

    /// One interval tick: append the current reading, then run the heuristic.
    ///
    /// A warning is advisory; monitoring continues either way.
    pub fn sample(&self) -> Option<LeakWarning> {
        let used = match self.source.read() {
            Some(sample) => sample.used,
            None => {
                debug!("Memory reading unavailable this interval; skipped");
                return None;
            }
        };

        let (history_len, warning) = {
            let mut state = self.state.lock();
            if !state.monitoring {
                return None;
            }
            state.history.push(used);
            let warning = detect_leak(&state.history, self.config.window, self.config.growth_threshold);
            if warning.is_some() {
                state.last_warning = warning;
            }
            (state.history.len(), warning)
        };

        self.telemetry.record(TelemetryEvent::MemoryCheck {
            used_bytes: used,
            history_len,
        });

        if let Some(leak) = warning {
            warn!(
                "Possible memory leak: growth rate {:.2}%, current usage {} MB",
                leak.growth_rate * 100.0,
                bytes_to_mb(leak.recent_avg_bytes)
            );
            self.telemetry.record(TelemetryEvent::LeakSuspected {
                growth_rate: leak.growth_rate,
                recent_avg_bytes: leak.recent_avg_bytes,
            });
        }

        warning
    }

    /// Current figures relative to the baseline captured when monitoring began.
    ///
    /// Before any baseline exists the current reading serves as one.
    pub fn memory_report(&self) -> Result<MemoryReport, MonitorError> {
        let sample = self.source.read().ok_or(MonitorError::TelemetryUnavailable)?;
        let state = self.state.lock();

        let initial = state.initial_bytes.unwrap_or(sample.used) as f64;
        let current = sample.used as f64;
        let growth = current - initial;
        let growth_percent = if initial > 0.0 {
            round_to_hundredths(growth / initial * 100.0)
        } else {
            0.0
        };

        Ok(MemoryReport {
            initial_mb: bytes_to_mb(initial),
            current_mb: bytes_to_mb(current),
            growth_mb: bytes_to_mb(growth),
            growth_percent,
            total_mb: bytes_to_mb(sample.total as f64),
            limit_mb: bytes_to_mb(sample.limit as f64),
            history_mb: state
                .history
                .to_vec()
                .into_iter()
                .map(|b| bytes_to_mb(b as f64))
                .collect(),
        })
    }

    pub fn history(&self) -> Vec<u64> {
        self.state.lock().history.to_vec()
    }

    pub fn last_warning(&self) -> Option<LeakWarning> {
        self.state.lock().last_warning
    }

    pub fn config(&self) -> &LeakDetectorConfig {
        &self.config
    }
}

impl Drop for MemoryLeakDetector {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.token.cancel();
        }
    }
}
