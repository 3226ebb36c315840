//! SQLite backend (feature `sqlite`).
//!
//! Keeps one row per agent in a `positions` table keyed by agent id:
//!
//! ```sql
//! CREATE TABLE positions (
//!     agent_id TEXT PRIMARY KEY,
//!     tick     INTEGER NOT NULL,
//!     lat      REAL NOT NULL,
//!     lon      REAL NOT NULL
//! );
//! ```

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use wd_core::{AgentId, GeoPoint};

use crate::{PositionRow, PositionSink, SinkError, SinkResult};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS positions (
        agent_id TEXT PRIMARY KEY,
        tick     INTEGER NOT NULL,
        lat      REAL NOT NULL,
        lon      REAL NOT NULL
    );";

const UPSERT: &str = "
    INSERT INTO positions (agent_id, tick, lat, lon) VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(agent_id) DO UPDATE SET
        tick = excluded.tick,
        lat  = excluded.lat,
        lon  = excluded.lon";

/// Latest positions stored in an SQLite database.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Open (or create) the database at `path` and initialise the schema.
    ///
    /// With `reset`, rows left over from an earlier run are deleted so stale
    /// agents are not reported as present.
    pub fn open(path: &Path, reset: bool) -> SinkResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        let sink = Self::init(conn, reset)?;
        info!(reset, "opened position store {}", path.display());
        Ok(sink)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> SinkResult<Self> {
        Self::init(Connection::open_in_memory()?, false)
    }

    fn init(conn: Connection, reset: bool) -> SinkResult<Self> {
        conn.execute_batch(SCHEMA)?;
        if reset {
            conn.execute("DELETE FROM positions", [])?;
        }
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> SinkResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SinkError::Poisoned)
    }

    /// Number of stored rows.
    pub fn len(&self) -> SinkResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM positions", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}

impl PositionSink for SqliteSink {
    fn upsert_position(&self, row: &PositionRow) -> SinkResult<()> {
        let conn = self.lock()?;
        conn.prepare_cached(UPSERT)?.execute(rusqlite::params![
            row.agent_id.as_str(),
            row.tick,
            row.lat,
            row.lon,
        ])?;
        Ok(())
    }

    /// One transaction per batch.
    fn upsert_batch(&self, rows: &[PositionRow]) -> SinkResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT)?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id.as_str(),
                    row.tick,
                    row.lat,
                    row.lon,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn query_position(&self, agent: &AgentId) -> SinkResult<GeoPoint> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT lat, lon FROM positions WHERE agent_id = ?1",
            [agent.as_str()],
            |r| Ok(GeoPoint::new(r.get(0)?, r.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| SinkError::NotFound(agent.clone()))
    }

    fn remove_position(&self, agent: &AgentId) -> SinkResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM positions WHERE agent_id = ?1", [agent.as_str()])?;
        Ok(())
    }

    fn flush(&self) -> SinkResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
