//! The idle `wait` signal.
//!
//! Armed once when the page loads. The first tick is due `timeout` ms after
//! arming, then one tick every [`WAIT_INTERVAL_MS`]. Each tick yields the
//! current idle count and increments it; user interactions reset the count.
//! Time is supplied by the caller, so the timer never sleeps.

/// Period between ticks once the timer has started firing.
pub const WAIT_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WaitTimer {
    next_due: Option<u64>,
    count: u64,
}

impl WaitTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer at `now_ms`. Later calls are no-ops.
    pub fn arm(&mut self, now_ms: u64, timeout_ms: u64) {
        if self.next_due.is_none() {
            self.next_due = Some(now_ms.saturating_add(timeout_ms));
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn reset_count(&mut self) {
        self.count = 0;
    }

    /// Fire every tick due at or before `now_ms`, returning the idle count
    /// of each in order.
    ///
    /// A tick whose successor would fall past the end of the clock is the
    /// last one; the timer disarms after it.
    pub fn fire_due(&mut self, now_ms: u64) -> Vec<u64> {
        let mut fired = Vec::new();
        while let Some(due) = self.next_due.filter(|due| *due <= now_ms) {
            fired.push(self.count);
            self.count = self.count.saturating_add(1);
            self.next_due = due.checked_add(WAIT_INTERVAL_MS);
        }
        fired
    }
}
