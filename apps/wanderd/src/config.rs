//! Server configuration: optional TOML file, then command-line overrides.
//!
//! ```toml
//! listen    = "0.0.0.0:4001"
//! map       = "campus.osm.pbf"
//! log_level = "info"
//!
//! [sink]
//! kind  = "sqlite"          # memory | csv | sqlite
//! path  = "positions.db"
//! reset = true              # clear rows left by an earlier run
//!
//! [sim]
//! tick_duration_ms  = 1000
//! walking_speed_mps = 1.56464
//! seed              = 0
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing::Level;

use wd_core::SimConfig;
use wd_output::{CsvTrailSink, MemorySink, PositionSink, SqliteSink};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:4001";

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
#[command(name = "wanderd", version, about)]
pub struct Cli {
    /// OSM PBF extract to wander on.  Convert `.osm` XML first, e.g.
    /// `osmium cat town.osm -o town.osm.pbf`.
    pub map: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to accept protocol connections on.
    #[arg(long)]
    pub listen: Option<String>,

    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,

    /// CSV output directory or SQLite database file.
    #[arg(long)]
    pub sink_path: Option<PathBuf>,

    /// Keep positions stored by an earlier run instead of clearing them.
    #[arg(long)]
    pub keep_positions: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Milliseconds between ticks.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Walking speed in metres per second.
    #[arg(long)]
    pub speed: Option<f64>,

    /// trace | debug | info | warn | error
    #[arg(long)]
    pub log_level: Option<String>,
}

// ── File / resolved config ────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Memory,
    Csv,
    Sqlite,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind:  SinkKind,
    pub path:  Option<PathBuf>,
    pub reset: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self { kind: SinkKind::Memory, path: None, reset: true }
    }
}

impl SinkConfig {
    /// Open the configured sink.
    pub fn open(&self) -> Result<Arc<dyn PositionSink>> {
        Ok(match self.kind {
            SinkKind::Memory => Arc::new(MemorySink::new()),
            SinkKind::Csv => {
                let dir = self.path.as_deref().unwrap_or(Path::new("output"));
                Arc::new(CsvTrailSink::new(dir).with_context(|| {
                    format!("opening CSV trail in {}", dir.display())
                })?)
            }
            SinkKind::Sqlite => {
                let file = self.path.as_deref().unwrap_or(Path::new("positions.db"));
                Arc::new(SqliteSink::open(file, self.reset).with_context(|| {
                    format!("opening position store {}", file.display())
                })?)
            }
        })
    }
}

/// Everything the server needs to start.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen:    String,
    pub map:       Option<PathBuf>,
    pub log_level: String,
    pub sink:      SinkConfig,
    pub sim:       SimConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen:    DEFAULT_LISTEN.to_owned(),
            map:       None,
            log_level: "info".to_owned(),
            sink:      SinkConfig::default(),
            sim:       SimConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read `cli.config` if given, then apply the other flags on top.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        if let Some(map) = &config.map {
            if map.extension().is_some_and(|ext| ext == "osm") {
                bail!(
                    "{} looks like OSM XML; only PBF is read (convert it with `osmium cat {} -o <out>.osm.pbf`)",
                    map.display(),
                    map.display()
                );
            }
        }
        config.sim.validate()?;
        config.log_level()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(map) = &cli.map {
            self.map = Some(map.clone());
        }
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }
        if let Some(kind) = cli.sink {
            self.sink.kind = kind;
        }
        if let Some(path) = &cli.sink_path {
            self.sink.path = Some(path.clone());
        }
        if cli.keep_positions {
            self.sink.reset = false;
        }
        if let Some(seed) = cli.seed {
            self.sim.seed = seed;
        }
        if let Some(ms) = cli.tick_ms {
            self.sim.tick_duration_ms = ms;
        }
        if let Some(speed) = cli.speed {
            self.sim.walking_speed_mps = speed;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn log_level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }
}
