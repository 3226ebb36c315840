//! The line protocol.
//!
//! One request per line, verb and agent id separated by a space:
//!
//! | Request         | Success reply              |
//! |-----------------|----------------------------|
//! | `Tstart <id>`   | `Rstart <id>`              |
//! | `Tstop <id>`    | `Rstop <id>`               |
//! | `Tpause <id>`   | `Rpause <id>`              |
//! | `Tcontinue <id>`| `Rcontinue <id>`           |
//! | `Tpos <id>`     | `Rpos <id> <lat> <lon>`    |
//!
//! Any failure, including a malformed line, is answered with `Rerror`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use wd_core::{AgentId, CoreError, GeoPoint};
use wd_sim::EngineHandle;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty request")]
    Empty,

    #[error("unknown verb {0:?}")]
    UnknownVerb(String),

    #[error("{0} needs an agent id")]
    MissingId(String),

    #[error(transparent)]
    InvalidId(#[from] CoreError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Start(AgentId),
    Stop(AgentId),
    Pause(AgentId),
    Continue(AgentId),
    Pos(AgentId),
}

impl FromStr for Request {
    type Err = ProtocolError;

    /// Parse one line.  Trailing `\r`/`\n` are ignored, as are tokens after
    /// the id.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut tokens = line.split(' ');
        let verb = tokens.next().filter(|v| !v.is_empty()).ok_or(ProtocolError::Empty)?;

        let build: fn(AgentId) -> Request = match verb {
            "Tstart"    => Request::Start,
            "Tstop"     => Request::Stop,
            "Tpause"    => Request::Pause,
            "Tcontinue" => Request::Continue,
            "Tpos"      => Request::Pos,
            other       => return Err(ProtocolError::UnknownVerb(other.to_owned())),
        };
        let raw = tokens.next().ok_or_else(|| ProtocolError::MissingId(verb.to_owned()))?;
        Ok(build(raw.parse()?))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Start(AgentId),
    Stop(AgentId),
    Pause(AgentId),
    Continue(AgentId),
    Pos(AgentId, GeoPoint),
    Error,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Start(id)    => write!(f, "Rstart {id}"),
            Response::Stop(id)     => write!(f, "Rstop {id}"),
            Response::Pause(id)    => write!(f, "Rpause {id}"),
            Response::Continue(id) => write!(f, "Rcontinue {id}"),
            Response::Pos(id, p)   => write!(f, "Rpos {id} {:.6} {:.6}", p.lat, p.lon),
            Response::Error        => f.write_str("Rerror"),
        }
    }
}

/// Parse `line`, run it against the engine, and build the reply.
pub fn respond(engine: &EngineHandle, line: &str) -> Response {
    let request = match line.parse::<Request>() {
        Ok(request) => request,
        Err(err) => {
            debug!(%err, line, "rejected request");
            return Response::Error;
        }
    };

    let result = match request {
        Request::Start(id)    => engine.create(id.clone()).map(|_| Response::Start(id)),
        Request::Stop(id)     => engine.stop(id.clone()).map(|_| Response::Stop(id)),
        Request::Pause(id)    => engine.pause(id.clone()).map(|_| Response::Pause(id)),
        Request::Continue(id) => engine.resume(id.clone()).map(|_| Response::Continue(id)),
        Request::Pos(id)      => engine.position(&id).map(|p| Response::Pos(id, p)),
    };
    result.unwrap_or_else(|err| {
        debug!(%err, line, "request failed");
        Response::Error
    })
}
