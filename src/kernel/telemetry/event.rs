use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::monitor::types::PerformanceGrade;

// Allowed: ids, timestamps, durations, counts, rates, enums.
// Forbidden: element contents, colors, anything rendered to the user.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    FpsSampled {
        fps: u32,
    },

    LowFps {
        fps: u32,
        threshold: u32,
    },

    MemoryCheck {
        used_bytes: u64,
        history_len: usize,
    },

    LeakSuspected {
        growth_rate: f64,
        recent_avg_bytes: f64,
    },

    MemoryUnavailable,

    TestStarted {
        run_id: Uuid,
        duration_ms: u64,
        animation_count: usize,
    },

    TestCompleted {
        run_id: Uuid,
        average_fps: u32,
        grade: PerformanceGrade,
    },

    TestRejected,

    TestCancelled {
        run_id: Uuid,
    },

    Lifecycle(LifecycleEvent),

    SessionSummary {
        duration_ms: f64,
        fps_samples: u64,
        low_fps: u64,
        leak_warnings: u64,
        tests_completed: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    MonitorStarted,
    MonitorStopped,
    LeakDetectorStarted,
    LeakDetectorStopped,
    SurfaceMounted,
    SurfaceUnmounted,
}
