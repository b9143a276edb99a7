use std::time::{Duration, Instant};

/// Timing snapshot handed to every stage, animation and post-render hook of one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds (clamped).
    pub dt: f32,

    /// Monotonic instant taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Milliseconds since the clock was created. This is the frame timestamp hooks receive.
    pub timestamp_ms: f64,
}

impl FrameTime {
    /// Builds a snapshot without a clock, for headless drivers and tests.
    pub fn synthetic(frame_index: u64, timestamp_ms: f64) -> Self {
        Self {
            dt: 0.0,
            now: Instant::now(),
            frame_index,
            timestamp_ms,
        }
    }
}

/// Frame clock producing `FrameTime` snapshots for the shared scheduler.
///
/// There is a single clock for all surfaces: every engine registered with the scheduler sees the
/// same `FrameTime` within one tick.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            origin: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline, e.g. when the frame loop restarts after going idle.
    ///
    /// The origin (and therefore `timestamp_ms`) is kept so timestamps stay monotonic.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Number of ticks produced so far.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
            timestamp_ms: now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }
}
