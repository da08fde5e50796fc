use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.buffer.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Session aggregation, recorded when the owning surface is torn down.
    pub fn aggregate_session(&self, duration_ms: f64) -> TelemetryEvent {
        let snap = self.snapshot();

        TelemetryEvent::SessionSummary {
            duration_ms,
            fps_samples: snap.fps_stats.samples,
            low_fps: snap.fps_stats.low_fps_events,
            leak_warnings: snap.memory_stats.leak_warnings,
            tests_completed: snap.test_stats.completed,
        }
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to one recorder. Cloning shares the log.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    inner: Arc<Mutex<TelemetryRecorder>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: TelemetryEvent) {
        self.inner.lock().record(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.inner.lock().snapshot()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.inner.lock().events()
    }

    /// Aggregates the session and appends the summary to the log.
    pub fn close_session(&self, duration_ms: f64) -> TelemetryEvent {
        let mut recorder = self.inner.lock();
        let summary = recorder.aggregate_session(duration_ms);
        recorder.record(summary.clone());
        summary
    }
}
