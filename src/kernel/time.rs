use serde::{Deserialize, Serialize};

/// Monotonic frame timestamp in milliseconds (host clock origin).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub ms: f64,
}

/// One FPS sample is emitted per elapsed window.
pub const FRAME_WINDOW_MS: f64 = 1000.0;

/// ~60Hz cadence for hosts without a native per-frame callback.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Timestamp { ms }
    }

    /// Milliseconds elapsed since `earlier`. Negative if the clock went backwards.
    pub fn millis_since(&self, earlier: Timestamp) -> f64 {
        self.ms - earlier.ms
    }

    pub fn advance(&self, ms: f64) -> Self {
        Timestamp { ms: self.ms + ms }
    }
}
