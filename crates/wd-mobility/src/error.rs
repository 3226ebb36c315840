use thiserror::Error;

use wd_core::{AgentId, NodeId, WayId};
use wd_spatial::GraphError;

#[derive(Debug, Error)]
pub enum MobilityError {
    /// No plannable way (two or more nodes) passes through the agent's node.
    #[error("agent {agent} is stranded at {node}")]
    Stranded { agent: AgentId, node: NodeId },

    /// The agent's way or waypoint is not in the graph it is advanced on.
    #[error("agent {agent} refers to {way}, which is not in the graph")]
    UnknownWay { agent: AgentId, way: WayId },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
