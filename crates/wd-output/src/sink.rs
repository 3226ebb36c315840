//! The `PositionSink` trait implemented by all backends.

use wd_core::{AgentId, GeoPoint};

use crate::{PositionRow, SinkResult};

/// A key-value store of each agent's latest position.
///
/// Sinks are shared between the publisher thread (writes) and protocol
/// handlers (queries), so every method takes `&self` and implementations
/// synchronise internally.  Upserts for distinct agents may arrive
/// concurrently; upserts for one agent arrive in tick order, but a sink need
/// not reject out-of-order writes.
pub trait PositionSink: Send + Sync {
    /// Insert or replace the position stored for `row.agent_id`.
    fn upsert_position(&self, row: &PositionRow) -> SinkResult<()>;

    /// Upsert one tick's snapshot.
    ///
    /// The default calls [`upsert_position`](Self::upsert_position) per row
    /// and stops at the first error.  Backends with transactions override it.
    fn upsert_batch(&self, rows: &[PositionRow]) -> SinkResult<()> {
        for row in rows {
            self.upsert_position(row)?;
        }
        Ok(())
    }

    /// The latest position stored for `agent`.
    ///
    /// # Errors
    ///
    /// [`SinkError::NotFound`](crate::SinkError::NotFound) if none is stored.
    fn query_position(&self, agent: &AgentId) -> SinkResult<GeoPoint>;

    /// Forget `agent`.  Removing an unknown agent is not an error.
    fn remove_position(&self, agent: &AgentId) -> SinkResult<()>;

    /// Push buffered writes to the backing store.
    fn flush(&self) -> SinkResult<()> {
        Ok(())
    }
}
