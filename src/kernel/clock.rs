use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

use super::time::Timestamp;

/// Per-frame tick source.
///
/// `next_frame` resolves once per rendered frame with the frame's monotonic
/// timestamp, or `None` once the clock has stopped for good. Whoever drives
/// a clock owns it exclusively; dropping the driver releases the frame source.
#[async_trait]
pub trait FrameClock: Send {
    /// Current time on this clock.
    fn now(&self) -> Timestamp;

    async fn next_frame(&mut self) -> Option<Timestamp>;
}

/// Fixed-cadence frames from the tokio timer.
pub struct IntervalFrameClock {
    origin: Instant,
    cadence: Interval,
}

impl IntervalFrameClock {
    pub fn new(frame_interval: Duration) -> Self {
        let mut cadence = interval(frame_interval);
        // A stalled host drops frames rather than bursting to catch up.
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            origin: Instant::now(),
            cadence,
        }
    }

    fn elapsed(&self) -> Timestamp {
        Timestamp::from_millis(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

#[async_trait]
impl FrameClock for IntervalFrameClock {
    fn now(&self) -> Timestamp {
        self.elapsed()
    }

    async fn next_frame(&mut self) -> Option<Timestamp> {
        self.cadence.tick().await;
        Some(self.elapsed())
    }
}

/// Replays a pre-computed sequence of frame timestamps.
#[derive(Debug, Clone)]
pub struct SyntheticFrameClock {
    now: Timestamp,
    frames: VecDeque<Timestamp>,
}

impl SyntheticFrameClock {
    pub fn from_timestamps(start: Timestamp, frames: impl IntoIterator<Item = Timestamp>) -> Self {
        Self {
            now: start,
            frames: frames.into_iter().collect(),
        }
    }

    /// Evenly spaced frames at `fps`, covering `duration_ms` after `start`.
    pub fn at_rate(start: Timestamp, fps: f64, duration_ms: f64) -> Self {
        let step = 1000.0 / fps;
        let count = (duration_ms / step).floor() as u64;
        let frames = (1..=count).map(|k| start.advance(step * k as f64));
        Self::from_timestamps(start, frames)
    }

    /// Appends frames at `fps` for `duration_ms` after the last queued frame.
    pub fn then_at_rate(mut self, fps: f64, duration_ms: f64) -> Self {
        let from = self.frames.back().copied().unwrap_or(self.now);
        let step = 1000.0 / fps;
        let count = (duration_ms / step).floor() as u64;
        self.frames
            .extend((1..=count).map(|k| from.advance(step * k as f64)));
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl FrameClock for SyntheticFrameClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    async fn next_frame(&mut self) -> Option<Timestamp> {
        // Let other tasks on the loop interleave, as a real frame boundary would.
        tokio::task::yield_now().await;
        let frame = self.frames.pop_front()?;
        self.now = frame;
        Some(frame)
    }
}
