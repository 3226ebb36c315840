//! Navigation states and per-tick step outcomes.

use std::fmt;

/// Where an agent is in its plan → walk → arrive cycle.
///
/// ```text
///            plan ok                 last waypoint reached
///   Idle ─────────────► EnRoute ─────────────────────────► Arrived
///    ▲                     ▲                                  │
///    │   plan failed       │            plan ok               │
///    └─────────────────────┴──────────────────────────────────┘
/// ```
///
/// `Arrived` is transient: the agent re-plans from the node it just reached
/// within the same tick, so an agent observed between ticks is either `Idle`
/// (stranded, retrying every tick) or `EnRoute`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum NavState {
    /// No destination chosen.
    #[default]
    Idle,
    /// Walking node by node along the current way toward the destination.
    EnRoute,
    /// Destination reached, re-plan pending.
    Arrived,
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NavState::Idle    => "idle",
            NavState::EnRoute => "en-route",
            NavState::Arrived => "arrived",
        };
        f.write_str(s)
    }
}

/// What a single [`Agent::advance`](crate::Agent::advance) call did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Walked the full step distance toward the current waypoint.
    Moved,
    /// Snapped onto an intermediate node and turned toward the next one.
    ReachedWaypoint,
    /// Snapped onto the destination and planned a new walk from there.
    Arrived,
    /// No plannable way at the agent's node; it did not move.
    Stranded,
}

impl StepOutcome {
    /// `true` if the agent's position changed.
    #[inline]
    pub fn moved(self) -> bool {
        !matches!(self, StepOutcome::Stranded)
    }
}
