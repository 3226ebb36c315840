//! In-memory sink.

use std::collections::HashMap;
use std::sync::RwLock;

use wd_core::{AgentId, GeoPoint};

use crate::{PositionRow, PositionSink, SinkError, SinkResult};

/// Latest positions held in a `HashMap` behind a `RwLock`.
///
/// Used when no persistent store is configured, in tests, and as the query
/// side of [`CsvTrailSink`](crate::CsvTrailSink).
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: RwLock<HashMap<AgentId, PositionRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents with a stored position.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full stored row for `agent`, including its tick.
    pub fn row(&self, agent: &AgentId) -> Option<PositionRow> {
        self.rows.read().ok()?.get(agent).cloned()
    }
}

impl PositionSink for MemorySink {
    fn upsert_position(&self, row: &PositionRow) -> SinkResult<()> {
        let mut rows = self.rows.write().map_err(|_| SinkError::Poisoned)?;
        rows.insert(row.agent_id.clone(), row.clone());
        Ok(())
    }

    fn upsert_batch(&self, batch: &[PositionRow]) -> SinkResult<()> {
        let mut rows = self.rows.write().map_err(|_| SinkError::Poisoned)?;
        for row in batch {
            rows.insert(row.agent_id.clone(), row.clone());
        }
        Ok(())
    }

    fn query_position(&self, agent: &AgentId) -> SinkResult<GeoPoint> {
        let rows = self.rows.read().map_err(|_| SinkError::Poisoned)?;
        rows.get(agent)
            .map(PositionRow::position)
            .ok_or_else(|| SinkError::NotFound(agent.clone()))
    }

    fn remove_position(&self, agent: &AgentId) -> SinkResult<()> {
        let mut rows = self.rows.write().map_err(|_| SinkError::Poisoned)?;
        rows.remove(agent);
        Ok(())
    }
}
