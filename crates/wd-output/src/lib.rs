//! `wd-output` — where agent positions go after each tick.
//!
//! Three backends implement [`PositionSink`]:
//!
//! | Feature   | Backend          | Storage                                         |
//! |-----------|------------------|-------------------------------------------------|
//! | *(none)*  | `MemorySink`     | `HashMap` behind a `RwLock`                     |
//! | *(none)*  | `CsvTrailSink`   | append-only `positions.csv` + in-memory latest  |
//! | `sqlite`  | `SqliteSink`     | `positions` table, one row per agent            |
//!
//! The simulation engine publishes one batch of [`PositionRow`]s per tick
//! from a dedicated publisher thread; protocol handlers answer position
//! queries from the same sink.
//!
//! # Usage
//!
//! ```rust
//! use wd_core::{AgentId, GeoPoint};
//! use wd_output::{MemorySink, PositionRow, PositionSink};
//!
//! let sink = MemorySink::new();
//! let alice = AgentId::new("alice").unwrap();
//! sink.upsert_position(&PositionRow::new(alice.clone(), 1, GeoPoint::new(1.0, 2.0))).unwrap();
//! assert_eq!(sink.query_position(&alice).unwrap(), GeoPoint::new(1.0, 2.0));
//! ```

pub mod csv;
pub mod error;
pub mod memory;
pub mod row;
pub mod sink;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvTrailSink;
pub use error::{SinkError, SinkResult};
pub use memory::MemorySink;
pub use row::PositionRow;
pub use sink::PositionSink;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;
