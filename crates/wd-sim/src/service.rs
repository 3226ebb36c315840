//! Threaded runtime around an [`Engine`].
//!
//! # Thread model
//!
//! ```text
//!   EngineHandle (any thread)        engine thread              publisher thread
//!     |                                 |                             |
//!     |--create/stop/pause/resume------>| events.recv()               |
//!     |   [events: bounded(1024)]       | engine.create/apply         |
//!     |<--reply (bounded(1))------------|                             |
//!     |                                 |                             |
//!   ticker thread                       |                             |
//!     |--Tick-------------------------->| engine.tick()               |
//!     |                                 | engine.snapshot()           |
//!     |                                 |--Batch(rows)--------------->| sink.upsert_batch
//!     |<--TickReport------------------------------------------------- |
//!     | sleep until max(prev + period, now)                           |
//! ```
//!
//! - The engine thread is the only owner of the registry.  Creations,
//!   commands, and ticks share one FIFO queue, so a command submitted before
//!   a tick is applied before that tick's sweep and one submitted after it
//!   waits for the sweep to finish.
//! - Sink I/O runs on the publisher thread, after the engine has taken the
//!   snapshot and moved on.  Publications share one FIFO queue, so an agent's
//!   upserts land in tick order and a stop's row removal lands after every
//!   batch snapshotted before it.
//! - The ticker waits for the publisher's acknowledgement before scheduling
//!   the next tick.  Ticks never overlap; one that overruns its period
//!   delays the next instead of being dropped.
//! - Position queries read the sink directly from the caller's thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{info, warn};

use wd_core::{AgentId, GeoPoint};
use wd_output::{PositionRow, PositionSink};

use crate::event::Event;
use crate::{Command, CommandKind, Engine, SimError, SimResult, TickReport};

/// Capacity of the event queue.  Producers block while it is full.
const EVENT_QUEUE_CAPACITY: usize = 1024;

/// How ticks are produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickMode {
    /// A ticker thread fires every `tick_duration_ms`.
    Periodic,
    /// No ticker; ticks happen only through [`EngineHandle::step`].
    Manual,
}

/// Work for the publisher thread.
enum Publication {
    Batch {
        rows:   Vec<PositionRow>,
        report: TickReport,
        reply:  Sender<TickReport>,
    },
    Remove {
        agent: AgentId,
        reply: Sender<SimResult<()>>,
    },
}

// ── EngineHandle ──────────────────────────────────────────────────────────────

/// Cheap, cloneable client of a running engine.
///
/// Every call blocks until the engine has processed the request.  Once the
/// service shuts down, calls fail with [`SimError::Shutdown`].
#[derive(Clone)]
pub struct EngineHandle {
    events: Sender<Event>,
    sink:   Arc<dyn PositionSink>,
}

impl EngineHandle {
    /// Create agent `id`; returns its start position.
    pub fn create(&self, id: AgentId) -> SimResult<GeoPoint> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send(Event::Create { agent: id, reply })?;
        rx.recv().map_err(|_| SimError::Shutdown)?
    }

    /// Apply `command`.
    ///
    /// For `Stop`, returns once the agent's row has also left the sink.
    pub fn submit(&self, command: Command) -> SimResult<()> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send(Event::Command { command, reply })?;
        rx.recv().map_err(|_| SimError::Shutdown)?
    }

    pub fn stop(&self, id: AgentId) -> SimResult<()> {
        self.submit(Command::new(CommandKind::Stop, id))
    }

    pub fn pause(&self, id: AgentId) -> SimResult<()> {
        self.submit(Command::new(CommandKind::Pause, id))
    }

    pub fn resume(&self, id: AgentId) -> SimResult<()> {
        self.submit(Command::new(CommandKind::Continue, id))
    }

    /// The agent's last published position, read from the sink.
    pub fn position(&self, id: &AgentId) -> SimResult<GeoPoint> {
        Ok(self.sink.query_position(id)?)
    }

    /// Run one tick now and wait until its snapshot is in the sink.
    ///
    /// Meant for [`TickMode::Manual`]; in periodic mode it adds an extra tick.
    pub fn step(&self) -> SimResult<TickReport> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send(Event::Tick { reply })?;
        rx.recv().map_err(|_| SimError::Shutdown)
    }

    fn send(&self, event: Event) -> SimResult<()> {
        self.events.send(event).map_err(|_| SimError::Shutdown)
    }
}

// ── EngineService ─────────────────────────────────────────────────────────────

/// Owns the engine, ticker, and publisher threads.
///
/// Dropping the service shuts it down; [`shutdown`](Self::shutdown) does the
/// same and also hands back the engine.
pub struct EngineService {
    handle:      EngineHandle,
    engine:      Option<JoinHandle<Engine>>,
    publisher:   Option<JoinHandle<()>>,
    ticker:      Option<JoinHandle<()>>,
    stop_ticker: Option<Sender<()>>,
}

impl EngineService {
    /// Move `engine` onto its own thread and start publishing to `sink`.
    ///
    /// # Errors
    ///
    /// [`SimError::Spawn`] if a thread cannot be started.
    pub fn start(engine: Engine, sink: Arc<dyn PositionSink>, mode: TickMode) -> SimResult<Self> {
        let period = engine.config().tick_duration();
        let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_QUEUE_CAPACITY);
        let (publish_tx, publish_rx) = crossbeam_channel::unbounded();

        let publisher = spawn("wd-publisher", {
            let sink = Arc::clone(&sink);
            move || run_publisher(sink, publish_rx)
        })?;
        let engine = spawn("wd-engine", move || run_engine(engine, events_rx, publish_tx))?;

        let mut service = Self {
            handle:      EngineHandle { events: events_tx, sink },
            engine:      Some(engine),
            publisher:   Some(publisher),
            ticker:      None,
            stop_ticker: None,
        };

        if mode == TickMode::Periodic {
            let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
            let events = service.handle.events.clone();
            service.ticker = Some(spawn("wd-ticker", move || run_ticker(events, period, stop_rx))?);
            service.stop_ticker = Some(stop_tx);
        }

        info!(?mode, period_ms = period.as_millis() as u64, "engine service started");
        Ok(service)
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Stop all threads and return the engine with its final registry.
    ///
    /// Every batch already snapshotted is written to the sink first.
    pub fn shutdown(mut self) -> SimResult<Engine> {
        self.stop_threads()?.ok_or(SimError::Shutdown)
    }

    fn stop_threads(&mut self) -> SimResult<Option<Engine>> {
        // Ticker first, so no tick is queued behind the shutdown event.
        drop(self.stop_ticker.take());
        if let Some(ticker) = self.ticker.take() {
            ticker.join().map_err(|_| SimError::Panicked("ticker"))?;
        }

        let Some(engine) = self.engine.take() else {
            return Ok(None);
        };
        let _ = self.handle.events.send(Event::Shutdown);
        let engine = engine.join().map_err(|_| SimError::Panicked("engine"))?;

        // The engine thread dropped its publication sender on exit, so the
        // publisher drains what is queued and returns.
        if let Some(publisher) = self.publisher.take() {
            publisher.join().map_err(|_| SimError::Panicked("publisher"))?;
        }
        info!(agents = engine.len(), tick = %engine.current_tick(), "engine service stopped");
        Ok(Some(engine))
    }
}

impl Drop for EngineService {
    fn drop(&mut self) {
        if let Err(err) = self.stop_threads() {
            warn!(%err, "engine service did not shut down cleanly");
        }
    }
}

// ── Thread bodies ─────────────────────────────────────────────────────────────

fn spawn<T, F>(name: &'static str, body: F) -> SimResult<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(body)
        .map_err(|source| SimError::Spawn { name, source })
}

/// The serialization point: the only code that touches the registry.
fn run_engine(mut engine: Engine, events: Receiver<Event>, publish: Sender<Publication>) -> Engine {
    for event in events.iter() {
        match event {
            Event::Create { agent, reply } => {
                let _ = reply.send(engine.create(agent));
            }
            Event::Command { command, reply } => {
                let agent   = command.agent.clone();
                let is_stop = command.kind == CommandKind::Stop;
                match engine.apply(command) {
                    Ok(()) if is_stop => {
                        // Acknowledged by the publisher after the row is gone.
                        if let Err(err) = publish.send(Publication::Remove { agent, reply }) {
                            if let Publication::Remove { reply, .. } = err.into_inner() {
                                let _ = reply.send(Ok(()));
                            }
                        }
                    }
                    result => {
                        let _ = reply.send(result);
                    }
                }
            }
            Event::Tick { reply } => {
                let report = engine.tick();
                let rows   = engine.snapshot();
                if let Err(err) = publish.send(Publication::Batch { rows, report, reply }) {
                    if let Publication::Batch { report, reply, .. } = err.into_inner() {
                        let _ = reply.send(report);
                    }
                }
            }
            Event::Shutdown => break,
        }
    }
    engine
}

/// Writes snapshots and removals to the sink, in queue order.
///
/// Sink failures are logged; the engine's state stays authoritative.
fn run_publisher(sink: Arc<dyn PositionSink>, publications: Receiver<Publication>) {
    for publication in publications.iter() {
        match publication {
            Publication::Batch { rows, report, reply } => {
                if let Err(err) = sink.upsert_batch(&rows) {
                    warn!(tick = %report.tick, rows = rows.len(), %err, "failed to publish positions");
                }
                let _ = reply.send(report);
            }
            Publication::Remove { agent, reply } => {
                if let Err(err) = sink.remove_position(&agent) {
                    warn!(agent = %agent, %err, "failed to remove position");
                }
                let _ = reply.send(Ok(()));
            }
        }
    }
    if let Err(err) = sink.flush() {
        warn!(%err, "failed to flush position sink");
    }
}

/// Fires a tick every `period`, never overlapping.
///
/// Exits when `stop` is signalled or dropped, or the engine is gone.
fn run_ticker(events: Sender<Event>, period: Duration, stop: Receiver<()>) {
    let mut deadline = Instant::now() + period;
    loop {
        match stop.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }

        let (reply, ack) = crossbeam_channel::bounded(1);
        if events.send(Event::Tick { reply }).is_err() {
            return;
        }
        let Ok(report) = ack.recv() else {
            return;
        };

        let now = Instant::now();
        deadline += period;
        if deadline < now {
            warn!(
                tick = %report.tick,
                overrun_ms = (now - deadline).as_millis() as u64,
                "tick overran its period; delaying the next one"
            );
            deadline = now;
        }
    }
}
