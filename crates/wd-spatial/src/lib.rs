//! `wd-spatial` — the street graph agents wander on.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `Node`, `Way`, `StreetGraph`, `StreetGraphBuilder`          |
//! | [`osm`]     | `load_from_pbf` (feature = `"osm"` only)                   |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                              |
//!
//! The graph is built once before the simulation starts and never mutated
//! afterwards, so it can be shared behind an `Arc` by any number of readers
//! without locking.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod graph;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use graph::{Node, StreetGraph, StreetGraphBuilder, Way};
