//! Graph error type.
//!
//! Build-time variants (`UnknownNode`, `DuplicateNode`, `DuplicateWay`) mean
//! the input map is malformed and are fatal.  The query-time variants
//! (`EmptyGraph`, `NoWayAtNode`, `NodeNotOnWay`) surface degenerate
//! topology while planning; callers retry on a later tick.

use thiserror::Error;

use wd_core::{NodeId, WayId};

/// Errors produced by `wd-spatial`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("no way passes through {0}")]
    NoWayAtNode(NodeId),

    #[error("{node} is not on {way}")]
    NodeNotOnWay { node: NodeId, way: WayId },

    #[error("{way} references {node}, which is not in the graph")]
    UnknownNode { way: WayId, node: NodeId },

    #[error("{0} added twice")]
    DuplicateNode(NodeId),

    #[error("{0} added twice")]
    DuplicateWay(WayId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
