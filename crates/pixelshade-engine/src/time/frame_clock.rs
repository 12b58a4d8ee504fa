use std::time::{Duration, Instant};

/// Longest frame delta reported, so a stall (debugger, minimized window)
/// does not turn into one huge step.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, at most `MAX_FRAME_DELTA`.
    pub dt: f32,
    /// Seconds since the clock started. Never clamped; the light orbit runs on it.
    pub elapsed: f32,
    pub now: Instant,
    pub frame_index: u64,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frames: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).min(MAX_FRAME_DELTA);
        self.last = now;
        self.frames += 1;
        FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            now,
            frame_index: self.frames - 1,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
