//! Frame timing.

use std::time::{Duration, Instant};

/// High-resolution timer for frame delta times and uptime.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Delta time in seconds since the last call to `delta_secs()`.
    pub fn delta_secs(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta.as_secs_f32()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_non_negative() {
        let mut timer = Timer::new();
        assert!(timer.delta_secs() >= 0.0);
        assert!(timer.elapsed_secs() >= 0.0);
    }
}
