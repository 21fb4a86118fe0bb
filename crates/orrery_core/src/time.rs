use std::time::{Duration, Instant};

/// Per-tick timing handed to update hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameState {
    /// Total simulated time since the loop started (in seconds).
    pub time: f32,
    /// Delta time since the previous tick (in seconds).
    pub dt: f32,
    /// Number of ticks that produced a draw before this one.
    pub frame_count: u64,
}

/// Wall-clock timer used by hosts to derive `dt` between animation callbacks.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    /// Restarts the measurement, e.g. after the loop was stopped for a while.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
