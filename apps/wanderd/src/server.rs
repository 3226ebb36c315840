//! TCP listener: one thread per connection, one reply line per request line.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;

use tracing::{debug, info, warn};

use wd_sim::EngineHandle;

use crate::protocol::{Response, respond};

/// Longest accepted request line, newline included.  A client that sends more
/// without a newline gets `Rerror` and is disconnected.
pub const MAX_LINE: usize = 4096;

pub struct Server {
    listener: TcpListener,
    engine:   EngineHandle,
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs, engine: EngineHandle) -> io::Result<Self> {
        Ok(Self { listener: TcpListener::bind(addr)?, engine })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub fn serve(self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "accept failed");
                    continue;
                }
            };
            let peer = match stream.peer_addr() {
                Ok(peer) => peer,
                Err(err) => {
                    warn!(%err, "connection without a peer address");
                    continue;
                }
            };
            let engine = self.engine.clone();
            info!(%peer, "accepted connection");

            let spawned = thread::Builder::new()
                .name(format!("wd-conn-{peer}"))
                .spawn(move || match handle_connection(stream, &engine) {
                    Ok(())   => debug!(%peer, "connection closed"),
                    Err(err) => debug!(%peer, %err, "connection dropped"),
                });
            if let Err(err) = spawned {
                warn!(%peer, %err, "could not spawn connection thread");
            }
        }
        Ok(())
    }
}

fn handle_connection(stream: TcpStream, engine: &EngineHandle) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);
    let mut buf    = Vec::new();

    loop {
        buf.clear();
        if reader.by_ref().take(MAX_LINE as u64 + 1).read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        if buf.len() > MAX_LINE {
            warn!(bytes = buf.len(), "request line too long; closing connection");
            writeln!(writer, "{}", Response::Error)?;
            return writer.flush();
        }
        let line  = String::from_utf8_lossy(&buf);
        let reply = respond(engine, &line);
        writeln!(writer, "{reply}")?;
        writer.flush()?;
    }
}
