//! wanderd — wanderers on a real street network, driven over TCP.
//!
//! Loads an OSM PBF extract, starts the simulation engine with a 1 Hz
//! ticker (configurable), and serves the line protocol (see [`protocol`]):
//!
//! ```text
//! $ wanderd campus.osm.pbf --sink sqlite --sink-path positions.db
//! $ printf 'Tstart alice\nTpos alice\n' | nc localhost 4001
//! Rstart alice
//! Rerror                       (no tick has published alice yet)
//! ```

mod config;
mod protocol;
mod server;


use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use wd_sim::{Engine, EngineService, TickMode};
use wd_spatial::osm::load_from_pbf;

use config::{Cli, ServerConfig};
use server::Server;

fn main() -> Result<()> {
    let cli    = Cli::parse();
    let config = ServerConfig::load(&cli)?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level()?)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // ── Street graph ──────────────────────────────────────────────────────
    let map = config.map.as_deref().context("no map given (pass an .osm.pbf path)")?;
    let t0 = Instant::now();
    let graph = load_from_pbf(map).with_context(|| format!("loading {}", map.display()))?;
    if graph.is_empty() {
        bail!("{} contains no streets", map.display());
    }
    info!(
        nodes = graph.node_count(),
        ways = graph.way_count(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "street graph ready"
    );

    // ── Engine ────────────────────────────────────────────────────────────
    let sink    = config.sink.open()?;
    let engine  = Engine::new(Arc::new(graph), config.sim.clone())?;
    let service = EngineService::start(engine, sink, TickMode::Periodic)?;

    // ── Protocol ──────────────────────────────────────────────────────────
    let server = Server::bind(config.listen.as_str(), service.handle())
        .with_context(|| format!("binding {}", config.listen))?;
    info!(
        seed = config.sim.seed,
        sink = ?config.sink.kind,
        "listening on {}",
        server.local_addr()?
    );
    server.serve()?;

    service.shutdown()?;
    Ok(())
}
