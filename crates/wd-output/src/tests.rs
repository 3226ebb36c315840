//! Integration tests for wd-output.

#[cfg(test)]
mod helpers {
    use wd_core::{AgentId, GeoPoint};

    use crate::PositionRow;

    pub fn id(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    pub fn row(agent: &str, tick: u64, lat: f64, lon: f64) -> PositionRow {
        PositionRow::new(id(agent), tick, GeoPoint::new(lat, lon))
    }
}

#[cfg(test)]
mod memory_tests {
    use std::sync::Arc;
    use std::thread;

    use wd_core::GeoPoint;

    use super::helpers::{id, row};
    use crate::{MemorySink, PositionSink, SinkError};

    #[test]
    fn upsert_then_query() {
        let sink = MemorySink::new();
        sink.upsert_position(&row("a", 1, 0.0, 0.001)).unwrap();
        assert_eq!(sink.query_position(&id("a")).unwrap(), GeoPoint::new(0.0, 0.001));
    }

    #[test]
    fn upsert_replaces() {
        let sink = MemorySink::new();
        sink.upsert_position(&row("a", 1, 0.0, 0.0)).unwrap();
        sink.upsert_position(&row("a", 2, 1.0, 1.0)).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.row(&id("a")).unwrap().tick, 2);
        assert_eq!(sink.query_position(&id("a")).unwrap(), GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn unknown_agent_not_found() {
        let sink = MemorySink::new();
        assert!(matches!(
            sink.query_position(&id("ghost")),
            Err(SinkError::NotFound(a)) if a.as_str() == "ghost"
        ));
    }

    #[test]
    fn remove_forgets_agent() {
        let sink = MemorySink::new();
        sink.upsert_batch(&[row("a", 1, 0.0, 0.0), row("b", 1, 0.0, 0.0)]).unwrap();
        sink.remove_position(&id("a")).unwrap();
        sink.remove_position(&id("never")).unwrap();
        assert!(sink.query_position(&id("a")).is_err());
        assert!(sink.query_position(&id("b")).is_ok());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn concurrent_upserts_for_distinct_agents() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for tick in 0..100 {
                        let agent = format!("agent-{t}");
                        sink.upsert_position(&row(&agent, tick, t as f64, tick as f64)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.len(), 8);
        assert_eq!(sink.row(&id("agent-3")).unwrap().tick, 99);
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use wd_core::GeoPoint;

    use super::helpers::{id, row};
    use crate::csv::{CsvTrailSink, TRAIL_FILE};
    use crate::PositionSink;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_file_created_with_header() {
        let dir = tmp();
        let sink = CsvTrailSink::new(dir.path()).unwrap();
        assert_eq!(sink.path(), dir.path().join(TRAIL_FILE));

        let mut rdr = csv::Reader::from_path(dir.path().join(TRAIL_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["agent_id", "tick", "lat", "lon"]);
    }

    #[test]
    fn trail_keeps_every_tick() {
        let dir = tmp();
        let sink = CsvTrailSink::new(dir.path()).unwrap();
        sink.upsert_batch(&[row("a", 1, 0.0, 0.0), row("b", 1, 0.5, 0.5)]).unwrap();
        sink.upsert_batch(&[row("a", 2, 0.0, 0.0000141), row("b", 2, 0.5, 0.5)]).unwrap();
        sink.flush().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TRAIL_FILE)).unwrap();
        let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(&records[2][0], "a");
        assert_eq!(&records[2][1], "2");
        assert_eq!(&records[2][3], "0.0000141");
    }

    #[test]
    fn queries_answer_latest() {
        let dir = tmp();
        let sink = CsvTrailSink::new(dir.path()).unwrap();
        sink.upsert_position(&row("a", 1, 0.0, 0.0)).unwrap();
        sink.upsert_position(&row("a", 2, 0.0, 0.001)).unwrap();
        assert_eq!(sink.query_position(&id("a")).unwrap(), GeoPoint::new(0.0, 0.001));

        sink.remove_position(&id("a")).unwrap();
        assert!(sink.query_position(&id("a")).is_err());
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use wd_core::GeoPoint;

    use super::helpers::{id, row};
    use crate::sqlite::SqliteSink;
    use crate::{PositionSink, SinkError};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_upsert_is_keyed_by_agent() {
        let sink = SqliteSink::open_in_memory().unwrap();
        sink.upsert_batch(&[row("a", 1, 0.0, 0.0), row("b", 1, 1.0, 1.0)]).unwrap();
        sink.upsert_batch(&[row("a", 2, 0.0, 0.001), row("b", 2, 1.0, 1.0)]).unwrap();
        assert_eq!(sink.len().unwrap(), 2);
        assert_eq!(sink.query_position(&id("a")).unwrap(), GeoPoint::new(0.0, 0.001));
    }

    #[test]
    fn sqlite_not_found_and_remove() {
        let sink = SqliteSink::open_in_memory().unwrap();
        assert!(matches!(sink.query_position(&id("x")), Err(SinkError::NotFound(_))));

        sink.upsert_position(&row("x", 1, 2.0, 3.0)).unwrap();
        sink.remove_position(&id("x")).unwrap();
        assert!(matches!(sink.query_position(&id("x")), Err(SinkError::NotFound(_))));
        assert_eq!(sink.len().unwrap(), 0);
    }

    #[test]
    fn sqlite_reset_on_open() {
        let dir = tmp();
        let path = dir.path().join("positions.db");
        {
            let sink = SqliteSink::open(&path, false).unwrap();
            sink.upsert_position(&row("stale", 9, 1.0, 1.0)).unwrap();
            sink.flush().unwrap();
        }

        let kept = SqliteSink::open(&path, false).unwrap();
        assert_eq!(kept.len().unwrap(), 1);
        drop(kept);

        let fresh = SqliteSink::open(&path, true).unwrap();
        assert_eq!(fresh.len().unwrap(), 0);
    }
}
