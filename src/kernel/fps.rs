use super::time::{Timestamp, FRAME_WINDOW_MS};

/// Turns per-frame ticks into one FPS sample per elapsed window.
///
/// The first window starts at construction. Nothing is emitted until a full
/// window has elapsed; a trailing partial window is simply never reported.
/// Each consumer owns its own sampler so windows never interfere.
#[derive(Debug, Clone)]
pub struct FpsSampler {
    frame_count: u32,
    window_start: Timestamp,
    window_ms: f64,
}

impl FpsSampler {
    pub fn new(start: Timestamp) -> Self {
        Self::with_window(start, FRAME_WINDOW_MS)
    }

    pub fn with_window(start: Timestamp, window_ms: f64) -> Self {
        Self {
            frame_count: 0,
            window_start: start,
            window_ms,
        }
    }

    /// Count one frame. Returns `Some(fps)` when this frame closes a window.
    pub fn on_tick(&mut self, now: Timestamp) -> Option<u32> {
        self.frame_count += 1;
        let elapsed = now.millis_since(self.window_start);
        if elapsed < self.window_ms {
            return None;
        }

        let fps = (self.frame_count as f64 * 1000.0 / elapsed).round() as u32;
        self.frame_count = 0;
        self.window_start = now;
        Some(fps)
    }

    pub fn reset(&mut self, start: Timestamp) {
        self.frame_count = 0;
        self.window_start = start;
    }

    pub fn pending_frames(&self) -> u32 {
        self.frame_count
    }
}

/// Arithmetic mean. 0.0 for an empty series.
pub fn mean(samples: &[u32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64
}

/// Population standard deviation.
pub fn std_dev(samples: &[u32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let m = mean(samples);
    let variance = samples
        .iter()
        .map(|&s| (s as f64 - m).powi(2))
        .sum::<f64>()
        / samples.len() as f64;
    variance.sqrt()
}

/// 0..=100 score: 100 minus the coefficient of variation in percent.
/// Fewer than two samples, or no spread at all, is perfectly stable.
pub fn stability(samples: &[u32]) -> f64 {
    if samples.len() < 2 {
        return 100.0;
    }
    let sd = std_dev(samples);
    if sd == 0.0 {
        return 100.0;
    }
    let m = mean(samples);
    (100.0 - (sd / m) * 100.0).max(0.0)
}
