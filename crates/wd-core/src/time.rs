//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter advanced once per
//! movement sweep.  Each tick represents `tick_duration_ms` of walking, so the
//! distance an agent covers per tick is
//!
//!   step_distance_m = walking_speed_mps * tick_duration_ms / 1000
//!
//! The step distance is derived from the configured period, not from how long
//! a sweep actually took: a late tick moves agents exactly as far as an
//! on-time one.

use std::fmt;
use std::time::Duration;

use crate::CoreError;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The tick after `self`.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Average adult walking speed, metres per second.
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.564_64;

/// Default wall-clock period between ticks.
pub const DEFAULT_TICK_DURATION_MS: u64 = 1_000;

/// Simulation configuration.
///
/// Typically loaded from the `[sim]` table of the server's TOML file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Wall-clock milliseconds between ticks.  Default: 1000.
    pub tick_duration_ms: u64,

    /// Agent walking speed in metres per second.  Default: 1.56464.
    pub walking_speed_mps: f64,

    /// Master RNG seed.  The same seed and command stream always produce
    /// identical walks.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms:  DEFAULT_TICK_DURATION_MS,
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            seed:              0,
        }
    }
}

impl SimConfig {
    /// Distance every enabled agent covers in one tick, metres.
    #[inline]
    pub fn step_distance_m(&self) -> f64 {
        self.walking_speed_mps * self.tick_duration_ms as f64 / 1_000.0
    }

    #[inline]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_duration_ms)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tick_duration_ms == 0 {
            return Err(CoreError::Config("tick_duration_ms must be positive".into()));
        }
        if !self.walking_speed_mps.is_finite() || self.walking_speed_mps < 0.0 {
            return Err(CoreError::Config(format!(
                "walking_speed_mps must be a finite non-negative number, got {}",
                self.walking_speed_mps
            )));
        }
        Ok(())
    }
}
