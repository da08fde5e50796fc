use std::fmt;

use ringbuf::traits::{Consumer, Observer, RingBuffer};
use ringbuf::HeapRb;

/// Observed capacity of the leak detector's history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity memory history. Once full, each push evicts the oldest entry.
pub struct MemoryHistory {
    buffer: HeapRb<u64>,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: HeapRb::new(capacity.max(1)),
        }
    }

    /// Append `used_bytes`; returns the evicted entry if the history was full.
    pub fn push(&mut self, used_bytes: u64) -> Option<u64> {
        self.buffer.push_overwrite(used_bytes)
    }

    pub fn len(&self) -> usize {
        self.buffer.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity().get()
    }

    pub fn clear(&mut self) {
        Consumer::clear(&mut self.buffer);
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<u64> {
        self.buffer.iter().copied().collect()
    }

    /// The most recent `window` entries and the `window` entries right before them.
    ///
    /// `None` until both windows are full.
    pub fn windows(&self, window: usize) -> Option<(Vec<u64>, Vec<u64>)> {
        if window == 0 || self.len() < window * 2 {
            return None;
        }
        let all = self.to_vec();
        let split = all.len() - window;
        let recent = all[split..].to_vec();
        let older = all[split - window..split].to_vec();
        Some((recent, older))
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
