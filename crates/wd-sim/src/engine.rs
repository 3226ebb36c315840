//! The `Engine` — agent registry and tick sweep.

use std::sync::Arc;

use tracing::{debug, info, warn};

use wd_core::{AgentId, GeoPoint, SimConfig, SimRng, Tick};
use wd_mobility::{Agent, StepOutcome};
use wd_output::PositionRow;
use wd_spatial::StreetGraph;

use crate::{Command, CommandKind, SimError, SimResult};

// ── Registry map type ─────────────────────────────────────────────────────────

#[cfg(feature = "fx-hash")]
type Registry = rustc_hash::FxHashMap<AgentId, Agent>;

#[cfg(not(feature = "fx-hash"))]
type Registry = std::collections::HashMap<AgentId, Agent>;

// ── TickReport ────────────────────────────────────────────────────────────────

/// What one [`Engine::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick:     Tick,
    /// Enabled agents advanced this tick.
    pub active:   usize,
    /// Disabled agents skipped this tick.
    pub paused:   usize,
    /// Enabled agents whose position changed.
    pub moved:    usize,
    /// Agents that reached their destination and re-planned.
    pub arrivals: usize,
    /// Agents with no usable way at their node, sorted by id.  They stay
    /// registered and retry planning every tick.
    pub stranded: Vec<AgentId>,
}

/// Outcome counts folded over the sweep.
#[derive(Default, Clone, Copy)]
struct SweepCounts {
    active:   usize,
    paused:   usize,
    moved:    usize,
    arrivals: usize,
}

impl SweepCounts {
    fn add(mut self, outcome: Option<StepOutcome>) -> Self {
        match outcome {
            None => self.paused += 1,
            Some(step) => {
                self.active += 1;
                self.moved += step.moved() as usize;
                self.arrivals += (step == StepOutcome::Arrived) as usize;
            }
        }
        self
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn merge(self, other: Self) -> Self {
        Self {
            active:   self.active + other.active,
            paused:   self.paused + other.paused,
            moved:    self.moved + other.moved,
            arrivals: self.arrivals + other.arrivals,
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Owner of every agent.
///
/// All mutation goes through `&mut self`, so whoever holds the engine is the
/// single writer.  In a running server that is the engine thread started by
/// [`EngineService`](crate::EngineService); tests drive it directly.
pub struct Engine {
    graph:   Arc<StreetGraph>,
    config:  SimConfig,
    step_m:  f64,
    rng:     SimRng,
    agents:  Registry,
    tick:    Tick,
}

impl Engine {
    /// Create an engine with an empty registry.
    ///
    /// # Errors
    ///
    /// [`SimError::Core`] if `config` fails validation.
    pub fn new(graph: Arc<StreetGraph>, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            step_m: config.step_distance_m(),
            rng: SimRng::new(config.seed),
            agents: Registry::default(),
            tick: Tick::ZERO,
            graph,
            config,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn graph(&self) -> &Arc<StreetGraph> {
        &self.graph
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The last completed tick; `Tick::ZERO` before the first.
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Place a new agent on a random node and plan its first walk.
    ///
    /// Returns the start position.  An agent starting on an isolated node is
    /// still registered; it stays idle and shows up in
    /// [`TickReport::stranded`].
    ///
    /// # Errors
    ///
    /// - [`SimError::AlreadyExists`]: the existing agent is left untouched.
    /// - [`SimError::Graph`] with `EmptyGraph` if there is nowhere to start.
    pub fn create(&mut self, id: AgentId) -> SimResult<GeoPoint> {
        if self.agents.contains_key(&id) {
            warn!(agent = %id, "create rejected: agent already exists");
            return Err(SimError::AlreadyExists(id));
        }
        let start = self.graph.random_node(self.rng.inner())?;
        let agent = Agent::spawn(id.clone(), start, &self.graph, self.rng.next_agent_rng());
        let pos   = agent.position();

        info!(agent = %id, node = %start.id, position = %pos, state = %agent.state(), "agent created");
        self.agents.insert(id, agent);
        Ok(pos)
    }

    /// Apply one lifecycle command.
    ///
    /// Pausing a paused agent and resuming an enabled one are no-ops.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownAgent`] for an id not in the registry (the registry
    /// is unchanged), or any error of [`create`](Self::create) for `Start`.
    pub fn apply(&mut self, command: Command) -> SimResult<()> {
        let Command { kind, agent: id } = command;
        match kind {
            CommandKind::Start => return self.create(id).map(drop),
            CommandKind::Stop => {
                if self.agents.remove(&id).is_none() {
                    return Err(unknown_agent(id, kind));
                }
                info!(agent = %id, "agent stopped");
            }
            CommandKind::Pause | CommandKind::Continue => {
                let enable = kind == CommandKind::Continue;
                let Some(agent) = self.agents.get_mut(&id) else {
                    return Err(unknown_agent(id, kind));
                };
                if agent.set_enabled(enable) {
                    info!(agent = %id, "agent {}", if enable { "resumed" } else { "paused" });
                }
            }
        }
        Ok(())
    }

    /// Advance every enabled agent by one step.
    ///
    /// One agent's failure never affects the others: a stranded agent simply
    /// does not move, and an agent whose state no longer matches the graph is
    /// logged and re-planned from its current node.
    pub fn tick(&mut self) -> TickReport {
        self.tick = self.tick.next();
        let graph  = &*self.graph;
        let step_m = self.step_m;

        #[cfg(not(feature = "parallel"))]
        let counts = self
            .agents
            .values_mut()
            .map(|agent| advance_one(agent, step_m, graph))
            .fold(SweepCounts::default(), SweepCounts::add);

        #[cfg(feature = "parallel")]
        let counts = {
            use rayon::prelude::*;

            self.agents
                .par_iter_mut()
                .map(|(_, agent)| advance_one(agent, step_m, graph))
                .fold(SweepCounts::default, SweepCounts::add)
                .reduce(SweepCounts::default, SweepCounts::merge)
        };

        let mut stranded: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.is_stranded())
            .map(|a| a.id().clone())
            .collect();
        stranded.sort_unstable();

        let report = TickReport {
            tick:     self.tick,
            active:   counts.active,
            paused:   counts.paused,
            moved:    counts.moved,
            arrivals: counts.arrivals,
            stranded,
        };
        debug!(
            tick = %report.tick,
            active = report.active,
            paused = report.paused,
            arrivals = report.arrivals,
            stranded = report.stranded.len(),
            "tick complete"
        );
        report
    }

    /// Every agent's position as of the last tick, paused ones included,
    /// sorted by agent id.
    pub fn snapshot(&self) -> Vec<PositionRow> {
        let mut rows: Vec<PositionRow> = self
            .agents
            .values()
            .map(|a| PositionRow::new(a.id().clone(), self.tick.0, a.position()))
            .collect();
        rows.sort_unstable_by(|a, b| a.agent_id.cmp(&b.agent_id));
        rows
    }
}

fn unknown_agent(id: AgentId, kind: CommandKind) -> SimError {
    warn!(agent = %id, command = %kind, "command for unknown agent");
    SimError::UnknownAgent(id)
}

/// Advance one agent; `None` if it is paused.
pub(crate) fn advance_one(agent: &mut Agent, step_m: f64, graph: &StreetGraph) -> Option<StepOutcome> {
    if !agent.is_enabled() {
        return None;
    }
    match agent.advance(step_m, graph) {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            warn!(agent = %agent.id(), %err, "advance failed; re-planning");
            agent.replan(graph);
            Some(StepOutcome::Stranded)
        }
    }
}
