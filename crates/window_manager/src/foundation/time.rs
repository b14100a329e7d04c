//! Time management utilities

use std::time::{Duration, Instant};

/// Monotonic clock anchored at the moment it was created
///
/// Backs the session's time query. Readings never go backwards.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Start a new clock at zero
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    /// Time elapsed since the clock started
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Whole milliseconds since the clock started
    pub fn millis(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Seconds since the clock started
    pub fn seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

/// Counts frames against wall time for loop-rate reporting
pub struct FrameCounter {
    started: Instant,
    frame_count: u64,
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCounter {
    /// Create a new counter
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            frame_count: 0,
        }
    }

    /// Record one frame
    pub fn tick(&mut self) {
        self.frame_count += 1;
    }

    /// Frames recorded so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since creation
    pub fn average_fps(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.frame_count as f64 / elapsed
        } else {
            0.0
        }
    }
}
