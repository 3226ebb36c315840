//! `wd-mobility` — how a single agent wanders the street graph.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`agent`]   | `Agent` — position, current way, target, plan/advance             |
//! | [`state`]   | `NavState` (Idle / EnRoute / Arrived), `StepOutcome`              |
//! | [`error`]   | `MobilityError`, `MobilityResult<T>`                              |
//!
//! # Movement model (random walk, node by node)
//!
//! 1. **Plan**: at its current node the agent picks a random way through it
//!    and a random destination on that way other than its own position.  It
//!    then heads for the adjacent node in the destination's direction.
//! 2. **Advance**: each tick the agent walks a fixed step along the geodesic
//!    toward that adjacent node.  If the node is less than a step away the
//!    agent snaps onto it, tolerating up to one step of positional error.
//! 3. **Arrive**: snapping onto the destination triggers a new plan from
//!    that node in the same tick.
//!
//! There is no route planning: the walk is an unbounded random walk confined
//! to the graph.  An agent on a node with no usable way stays `Idle` and
//! retries every tick.

pub mod agent;
pub mod error;
pub mod state;


pub use agent::Agent;
pub use error::{MobilityError, MobilityResult};
pub use state::{NavState, StepOutcome};
