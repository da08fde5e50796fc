use std::collections::VecDeque;

use serde::Serialize;

use super::event::{LifecycleEvent, TelemetryEvent};
use crate::monitor::types::PerformanceGrade;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetrySnapshot {
    pub fps_stats: FpsStats,
    pub memory_stats: MemoryStats,
    pub test_stats: TestStats,
    pub lifecycle_stats: LifecycleStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FpsStats {
    pub samples: u64,
    pub total_fps: u64,
    pub avg_fps: f64,
    pub min_fps: Option<u32>,
    pub max_fps: Option<u32>,
    pub low_fps_events: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryStats {
    pub checks: u64,
    pub leak_warnings: u64,
    pub max_growth_rate: f64,
    pub unavailable: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TestStats {
    pub started: u64,
    pub completed: u64,
    pub rejected: u64,
    pub cancelled: u64,
    pub last_grade: Option<PerformanceGrade>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LifecycleStats {
    pub monitor_starts: u64,
    pub detector_starts: u64,
    pub mounts: u64,
    pub sessions: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::FpsSampled { fps } => {
                let stats = &mut snap.fps_stats;
                stats.samples += 1;
                stats.total_fps += *fps as u64;
                stats.min_fps = Some(stats.min_fps.map_or(*fps, |m| m.min(*fps)));
                stats.max_fps = Some(stats.max_fps.map_or(*fps, |m| m.max(*fps)));
            }
            TelemetryEvent::LowFps { .. } => snap.fps_stats.low_fps_events += 1,
            TelemetryEvent::MemoryCheck { .. } => snap.memory_stats.checks += 1,
            TelemetryEvent::LeakSuspected { growth_rate, .. } => {
                snap.memory_stats.leak_warnings += 1;
                if *growth_rate > snap.memory_stats.max_growth_rate {
                    snap.memory_stats.max_growth_rate = *growth_rate;
                }
            }
            TelemetryEvent::MemoryUnavailable => snap.memory_stats.unavailable += 1,
            TelemetryEvent::TestStarted { .. } => snap.test_stats.started += 1,
            TelemetryEvent::TestCompleted { grade, .. } => {
                snap.test_stats.completed += 1;
                snap.test_stats.last_grade = Some(*grade);
            }
            TelemetryEvent::TestRejected => snap.test_stats.rejected += 1,
            TelemetryEvent::TestCancelled { .. } => snap.test_stats.cancelled += 1,
            TelemetryEvent::Lifecycle(kind) => match kind {
                LifecycleEvent::MonitorStarted => snap.lifecycle_stats.monitor_starts += 1,
                LifecycleEvent::LeakDetectorStarted => snap.lifecycle_stats.detector_starts += 1,
                LifecycleEvent::SurfaceMounted => snap.lifecycle_stats.mounts += 1,
                _ => {}
            },
            TelemetryEvent::SessionSummary { .. } => snap.lifecycle_stats.sessions += 1,
        }
    }

    if snap.fps_stats.samples > 0 {
        snap.fps_stats.avg_fps = snap.fps_stats.total_fps as f64 / snap.fps_stats.samples as f64;
    }

    snap
}
