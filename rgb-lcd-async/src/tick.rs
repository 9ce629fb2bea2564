//! Millisecond tick for the GUI clock.

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

/// Milliseconds elapsed since start, advanced by a periodic tick task.
///
/// Wraps after about 49 days.
pub struct TickCounter {
    millis: AtomicU32,
}

impl TickCounter {
    /// A counter at zero.
    pub const fn new() -> Self {
        Self {
            millis: AtomicU32::new(0),
        }
    }

    /// Advances the counter by `period_ms`.
    pub fn inc(&self, period_ms: u32) {
        self.millis.fetch_add(period_ms, Ordering::Relaxed);
    }

    /// Milliseconds counted so far.
    pub fn millis(&self) -> u32 {
        self.millis.load(Ordering::Relaxed)
    }

    /// Time counted so far.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.millis() as u64)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
