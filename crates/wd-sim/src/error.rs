use thiserror::Error;

use wd_core::{AgentId, CoreError};
use wd_output::SinkError;
use wd_spatial::GraphError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("agent {0} already exists")]
    AlreadyExists(AgentId),

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("position sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("engine has shut down")]
    Shutdown,

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name:   &'static str,
        source: std::io::Error,
    },

    #[error("{0} thread panicked")]
    Panicked(&'static str),
}

pub type SimResult<T> = Result<T, SimError>;
