#![forbid(unsafe_code)]

//! Monotonic wall clock for driving a [`Scheduler`](crate::Scheduler).
//!
//! Hosts call [`MonotonicClock::tick`] from their frame or event loop and
//! feed the returned delta into the tour. `web_time::Instant` keeps this
//! working under `wasm32-unknown-unknown`, where `std::time::Instant` panics.

use std::time::Duration;
use web_time::Instant;

/// Measures elapsed time between ticks.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    last: Duration,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last: Duration::ZERO,
        }
    }

    /// Time since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Time since the previous tick (or creation).
    pub fn tick(&mut self) -> Duration {
        self.tick_at(self.elapsed())
    }

    /// Tick with an explicit elapsed reading. Readings behind the last one
    /// yield a zero delta.
    pub fn tick_at(&mut self, elapsed: Duration) -> Duration {
        let delta = elapsed.saturating_sub(self.last);
        self.last = self.last.max(elapsed);
        delta
    }
}
