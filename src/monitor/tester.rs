use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{FpsSummary, PerformanceGrade, RunMemoryStats, TestSummary};
use crate::kernel::clock::FrameClock;
use crate::kernel::error::MonitorError;
use crate::kernel::fps::{self, FpsSampler};
use crate::kernel::host::{bytes_to_mb, AnimatedElementCounter, MemorySample, MemoryTelemetrySource};
use crate::kernel::telemetry::{Telemetry, TelemetryEvent};
use crate::kernel::time::{Timestamp, DEFAULT_FRAME_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    pub duration_ms: u64,
    /// Frame cadence for hosts that drive the test from a timer.
    pub frame_interval_ms: u64,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

/// Accumulator for a single run. Lives only inside `start_test`.
#[derive(Debug)]
struct TestRun {
    run_id: Uuid,
    fps_series: Vec<u32>,
    memory_series: Vec<MemorySample>,
    animation_count: usize,
    duration_ms: u64,
    started_at: Timestamp,
}

impl TestRun {
    fn begin(started_at: Timestamp, duration_ms: u64, animation_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            fps_series: Vec::new(),
            memory_series: Vec::new(),
            animation_count,
            duration_ms,
            started_at,
        }
    }

    fn memory_stats(&self) -> Option<RunMemoryStats> {
        if self.memory_series.is_empty() {
            return None;
        }

        let used: Vec<u64> = self.memory_series.iter().map(|m| m.used).collect();
        let average = used.iter().map(|&u| u as f64).sum::<f64>() / used.len() as f64;
        let max = used.iter().copied().max().unwrap_or(0);
        let min = used.iter().copied().min().unwrap_or(0);

        Some(RunMemoryStats {
            average: bytes_to_mb(average),
            max: bytes_to_mb(max as f64),
            min: bytes_to_mb(min as f64),
            growth: bytes_to_mb((max - min) as f64),
        })
    }

    fn summarize(&self) -> TestSummary {
        let series = &self.fps_series;
        let average = fps::mean(series);
        let min = series.iter().copied().min().unwrap_or(0);
        let max = series.iter().copied().max().unwrap_or(0);

        TestSummary {
            run_id: self.run_id,
            fps: FpsSummary {
                average: average.round() as u32,
                min,
                max,
                stability: fps::stability(series),
            },
            memory: self.memory_stats(),
            animation_count: self.animation_count,
            test_duration_ms: self.duration_ms,
            started_at: self.started_at,
            performance: PerformanceGrade::evaluate(average, min),
        }
    }
}

/// Clears the busy flag however the run ends, including a dropped future.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Bounded-duration FPS + memory experiment.
///
/// At most one run at a time: a second `start_test` while one is in flight
/// fails immediately with `AlreadyRunning` and leaves the active run alone.
pub struct AnimationPerformanceTester {
    memory: Arc<dyn MemoryTelemetrySource>,
    animations: Arc<dyn AnimatedElementCounter>,
    running: AtomicBool,
    stop_requested: AtomicBool,
    telemetry: Telemetry,
}

impl AnimationPerformanceTester {
    pub fn new(
        memory: Arc<dyn MemoryTelemetrySource>,
        animations: Arc<dyn AnimatedElementCounter>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            memory,
            animations,
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            telemetry,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the active run to end at its next frame. Returns false when idle.
    pub fn stop_test(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.stop_requested.store(true, Ordering::Release);
        info!("Performance test stop requested");
        true
    }

    /// Run for `duration_ms` of frame time and reduce the series into a summary.
    ///
    /// One FPS sample (and one memory sample, when the host supports it) is
    /// taken per elapsed second. The clock is owned by the run and released
    /// when it resolves.
    pub async fn start_test<C>(&self, duration_ms: u64, mut clock: C) -> Result<TestSummary, MonitorError>
    where
        C: FrameClock,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Performance test already running; request rejected");
            self.telemetry.record(TelemetryEvent::TestRejected);
            return Err(MonitorError::AlreadyRunning);
        }
        let _guard = RunGuard {
            flag: &self.running,
        };
        self.stop_requested.store(false, Ordering::Release);

        let started_at = clock.now();
        let mut run = TestRun::begin(started_at, duration_ms, self.animations.count());
        let mut sampler = FpsSampler::new(started_at);

        info!(
            "Performance test {} started: {}ms, {} animated elements",
            run.run_id, duration_ms, run.animation_count
        );
        self.telemetry.record(TelemetryEvent::TestStarted {
            run_id: run.run_id,
            duration_ms,
            animation_count: run.animation_count,
        });

        loop {
            let now = match clock.next_frame().await {
                Some(now) => now,
                None => {
                    warn!("Frame clock stopped during performance test {}", run.run_id);
                    return Err(MonitorError::ClockStopped);
                }
            };

            if self.stop_requested.swap(false, Ordering::AcqRel) {
                info!("Performance test {} cancelled", run.run_id);
                self.telemetry
                    .record(TelemetryEvent::TestCancelled { run_id: run.run_id });
                return Err(MonitorError::Cancelled);
            }

            if let Some(fps) = sampler.on_tick(now) {
                run.fps_series.push(fps);
                if let Some(sample) = self.memory.read() {
                    run.memory_series.push(sample);
                }
            }

            if now.millis_since(started_at) >= duration_ms as f64 {
                break;
            }
        }

        let summary = run.summarize();
        info!(
            "Performance test {} complete: avg {} FPS, min {}, grade {:?}",
            summary.run_id, summary.fps.average, summary.fps.min, summary.performance
        );
        self.telemetry.record(TelemetryEvent::TestCompleted {
            run_id: summary.run_id,
            average_fps: summary.fps.average,
            grade: summary.performance,
        });
        Ok(summary)
    }
}
