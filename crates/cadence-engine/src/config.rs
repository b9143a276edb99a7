//! Configuration structs.
//!
//! Plain data with `Default`, constructed by the application and handed to the scheduler or to
//! each engine. [`EngineConfig::from_env`] overlays environment overrides for quick experiments.

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use crate::coords::Rect;

/// Environment variable read by [`EngineConfig::from_env`].
pub const MAX_DRAGS_ENV: &str = "CADENCE_MAX_DRAGS";

/// Upper bound on concurrently active drag gestures per engine.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DragLimit {
    #[default]
    Unlimited,
    Max(NonZeroUsize),
}

impl DragLimit {
    /// Convenience constructor; `0` means unlimited.
    pub fn at_most(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(DragLimit::Unlimited, DragLimit::Max)
    }

    /// Returns `true` when `active` drags exceed the limit.
    #[inline]
    pub fn exceeded_by(self, active: usize) -> bool {
        match self {
            DragLimit::Unlimited => false,
            DragLimit::Max(n) => active > n.get(),
        }
    }
}

impl FromStr for DragLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(DragLimit::Unlimited);
        }
        s.parse::<NonZeroUsize>()
            .map(DragLimit::Max)
            .map_err(|_| format!("expected a positive integer or \"unlimited\", got {s:?}"))
    }
}

/// Per-surface configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Surface bounds in screen pixels. Pointer presses and wheel events outside are dropped.
    pub bounds: Rect,
    pub max_simultaneous_drags: DragLimit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 1280.0, 720.0),
            max_simultaneous_drags: DragLimit::Unlimited,
        }
    }
}

impl EngineConfig {
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_max_simultaneous_drags(mut self, limit: DragLimit) -> Self {
        self.max_simultaneous_drags = limit;
        self
    }

    /// Applies `CADENCE_MAX_DRAGS` when set. Invalid values are logged and ignored.
    pub fn from_env(mut self) -> Self {
        if let Ok(raw) = std::env::var(MAX_DRAGS_ENV) {
            match raw.parse::<DragLimit>() {
                Ok(limit) => self.max_simultaneous_drags = limit,
                Err(e) => log::warn!("ignoring {MAX_DRAGS_ENV}: {e}"),
            }
        }
        self
    }
}

/// Scheduler-wide configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Target interval between frames when the platform paces the loop itself.
    pub frame_interval: Duration,
    /// Lower clamp for frame delta time.
    pub dt_min: Duration,
    /// Upper clamp for frame delta time (long stalls are reported as this).
    pub dt_max: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_micros(16_667),
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }
}
