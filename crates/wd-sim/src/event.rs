//! Messages consumed by the engine's serialization point.

use std::fmt;

use crossbeam_channel::Sender;

use wd_core::{AgentId, GeoPoint};

use crate::{SimResult, TickReport};

/// Lifecycle operations a client can request for one agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Create the agent (same as [`Engine::create`](crate::Engine::create)).
    Start,
    /// Remove the agent.
    Stop,
    /// Stop advancing the agent; it keeps its position and target.
    Pause,
    /// Resume advancing a paused agent.
    Continue,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandKind::Start    => "start",
            CommandKind::Stop     => "stop",
            CommandKind::Pause    => "pause",
            CommandKind::Continue => "continue",
        };
        f.write_str(s)
    }
}

/// A request to change one agent's lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub kind:  CommandKind,
    pub agent: AgentId,
}

impl Command {
    pub fn new(kind: CommandKind, agent: AgentId) -> Self {
        Self { kind, agent }
    }
}

/// One entry of the unified event queue.
///
/// Creations, commands, and ticks all travel through one channel, so the
/// engine thread applies them strictly in arrival order.  Each carries a
/// reply channel the producer blocks on.
pub(crate) enum Event {
    Create {
        agent: AgentId,
        reply: Sender<SimResult<GeoPoint>>,
    },
    Command {
        command: Command,
        reply:   Sender<SimResult<()>>,
    },
    /// Answered by the publisher once the tick's snapshot is in the sink.
    Tick {
        reply: Sender<TickReport>,
    },
    Shutdown,
}
