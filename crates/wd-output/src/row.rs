//! Plain data row written by sinks.

use wd_core::{AgentId, GeoPoint};

/// One agent's position as of a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub agent_id: AgentId,
    pub tick:     u64,
    pub lat:      f64,
    pub lon:      f64,
}

impl PositionRow {
    pub fn new(agent_id: AgentId, tick: u64, pos: GeoPoint) -> Self {
        Self { agent_id, tick, lat: pos.lat, lon: pos.lon }
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}
