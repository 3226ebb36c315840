//! CSV trail backend.
//!
//! Appends every published position to `positions.csv` in the configured
//! output directory, so the file holds each agent's full walk:
//!
//! ```text
//! agent_id,tick,lat,lon
//! alice,1,51.5073512,-0.1277583
//! ```
//!
//! A CSV file cannot be updated in place, so the latest position per agent
//! is also kept in a [`MemorySink`] to answer queries.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use csv::Writer;
use tracing::info;

use wd_core::{AgentId, GeoPoint};

use crate::{MemorySink, PositionRow, PositionSink, SinkError, SinkResult};

/// File name of the trail inside the output directory.
pub const TRAIL_FILE: &str = "positions.csv";

/// Writes an append-only position trail to CSV.
pub struct CsvTrailSink {
    path:   PathBuf,
    trail:  Mutex<Writer<File>>,
    latest: MemorySink,
}

impl CsvTrailSink {
    /// Create (or truncate) `positions.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> SinkResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(TRAIL_FILE);

        let mut trail = Writer::from_path(&path)?;
        trail.write_record(["agent_id", "tick", "lat", "lon"])?;
        trail.flush()?;
        info!("writing position trail to {}", path.display());

        Ok(Self { path, trail: Mutex::new(trail), latest: MemorySink::new() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(trail: &mut Writer<File>, row: &PositionRow) -> SinkResult<()> {
        trail.write_record(&[
            row.agent_id.to_string(),
            row.tick.to_string(),
            format!("{:.7}", row.lat),
            format!("{:.7}", row.lon),
        ])?;
        Ok(())
    }
}

impl PositionSink for CsvTrailSink {
    fn upsert_position(&self, row: &PositionRow) -> SinkResult<()> {
        self.upsert_batch(std::slice::from_ref(row))
    }

    fn upsert_batch(&self, rows: &[PositionRow]) -> SinkResult<()> {
        {
            let mut trail = self.trail.lock().map_err(|_| SinkError::Poisoned)?;
            for row in rows {
                Self::append(&mut trail, row)?;
            }
            // One flush per tick keeps the file tail-able.
            trail.flush()?;
        }
        self.latest.upsert_batch(rows)
    }

    fn query_position(&self, agent: &AgentId) -> SinkResult<GeoPoint> {
        self.latest.query_position(agent)
    }

    /// The trail keeps the agent's history; only the query side forgets it.
    fn remove_position(&self, agent: &AgentId) -> SinkResult<()> {
        self.latest.remove_position(agent)
    }

    fn flush(&self) -> SinkResult<()> {
        let mut trail = self.trail.lock().map_err(|_| SinkError::Poisoned)?;
        trail.flush()?;
        Ok(())
    }
}
