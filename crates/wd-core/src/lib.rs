//! `wd-core` — foundational types for the `wander` street-network simulator.
//!
//! This crate is a dependency of every other `wd-*` crate.  It intentionally
//! has no `wd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `WayId`, `AgentId`                          |
//! | [`geo`]         | `GeoPoint`, WGS-84 distance/bearing and projection    |
//! | [`time`]        | `Tick`, `SimConfig`                                   |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{AgentId, NodeId, WayId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimConfig, Tick};
