use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::time::Timestamp;

/// Categorical grade from average and worst-window FPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceGrade {
    Excellent,
    Good,
    Fair,
    Poor,
    Bad,
}

impl PerformanceGrade {
    /// Highest band whose average and minimum thresholds are both met.
    pub fn evaluate(average: f64, min: u32) -> Self {
        const BANDS: [(f64, u32, PerformanceGrade); 4] = [
            (55.0, 45, PerformanceGrade::Excellent),
            (45.0, 35, PerformanceGrade::Good),
            (30.0, 25, PerformanceGrade::Fair),
            (20.0, 15, PerformanceGrade::Poor),
        ];

        BANDS
            .iter()
            .find(|(avg_floor, min_floor, _)| average >= *avg_floor && min >= *min_floor)
            .map(|(_, _, grade)| *grade)
            .unwrap_or(PerformanceGrade::Bad)
    }

    /// Good enough that the host can keep full animations.
    pub fn is_healthy(&self) -> bool {
        matches!(self, PerformanceGrade::Excellent | PerformanceGrade::Good)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpsSummary {
    pub average: u32,
    pub min: u32,
    pub max: u32,
    /// 0..=100, see `kernel::fps::stability`.
    pub stability: f64,
}

/// Per-run memory figures in whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMemoryStats {
    pub average: i64,
    pub max: i64,
    pub min: i64,
    /// max - min over this run's own series.
    pub growth: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub run_id: Uuid,
    pub fps: FpsSummary,
    /// `None` when the host never produced a memory sample during the run.
    pub memory: Option<RunMemoryStats>,
    pub animation_count: usize,
    pub test_duration_ms: u64,
    pub started_at: Timestamp,
    pub performance: PerformanceGrade,
}

/// Long-lived memory picture relative to the leak detector's baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub initial_mb: i64,
    pub current_mb: i64,
    pub growth_mb: i64,
    /// Rounded to two decimals.
    pub growth_percent: f64,
    pub total_mb: i64,
    pub limit_mb: i64,
    pub history_mb: Vec<i64>,
}

impl MemoryReport {
    /// Host-panel heuristic: growth beyond `threshold_percent` since the baseline.
    pub fn leak_suspected(&self, threshold_percent: f64) -> bool {
        self.growth_percent > threshold_percent
    }
}

/// Advisory leak signal. Sampling continues after one is raised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakWarning {
    pub growth_rate: f64,
    pub recent_avg_bytes: f64,
    pub older_avg_bytes: f64,
}

/// Two decimals, halves rounded up like `bytes_to_mb`.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}
