//! One simulated pedestrian and its plan/advance state machine.

use tracing::{debug, warn};

use wd_core::{AgentId, AgentRng, GeoPoint, NodeId, WayId};
use wd_spatial::{GraphError, Node, StreetGraph, Way};

use crate::{MobilityError, MobilityResult, NavState, StepOutcome};

/// A pedestrian wandering the street graph.
///
/// The agent walks its current way node by node: `target` is the adjacent
/// node it is heading for, `destination` the node on the same way where the
/// walk ends.  Every position it ever holds is a graph node or a point on the
/// geodesic between two consecutive nodes of its way.
///
/// Agents are mutated only by the engine's control loop.  Each owns its RNG,
/// so agents can be advanced in any order (or in parallel) with identical
/// results.
#[derive(Debug, Clone)]
pub struct Agent {
    id:           AgentId,
    position:     GeoPoint,
    /// Last graph node stood on; the origin of the next plan.
    node:         NodeId,
    way:          Option<WayId>,
    node_idx:     usize,
    waypoint_idx: usize,
    dest_idx:     usize,
    target:       Option<NodeId>,
    destination:  Option<NodeId>,
    /// Radians clockwise from north toward `target`.
    bearing:      f64,
    enabled:      bool,
    state:        NavState,
    stranded:     bool,
    rng:          AgentRng,
}

impl Agent {
    /// Place a new enabled agent on `start` and plan its first walk.
    ///
    /// A start node with no plannable way leaves the agent `Idle`; it retries
    /// on every [`advance`](Self::advance).
    pub fn spawn(id: AgentId, start: &Node, graph: &StreetGraph, rng: AgentRng) -> Self {
        let mut agent = Agent {
            id,
            position:     start.pos,
            node:         start.id,
            way:          None,
            node_idx:     0,
            waypoint_idx: 0,
            dest_idx:     0,
            target:       None,
            destination:  None,
            bearing:      0.0,
            enabled:      true,
            state:        NavState::Idle,
            stranded:     false,
            rng,
        };
        agent.replan(graph);
        agent
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    /// The graph node the agent last stood on.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn way(&self) -> Option<WayId> {
        self.way
    }

    /// The adjacent node currently walked toward.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node where the current walk ends.
    pub fn destination(&self) -> Option<NodeId> {
        self.destination
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// `true` while no plannable way passes through the agent's node.
    pub fn is_stranded(&self) -> bool {
        self.stranded
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the agent.  Returns `true` if the flag changed.
    ///
    /// Navigation state is untouched: a resumed agent carries on toward the
    /// same target.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    // ── State machine ─────────────────────────────────────────────────────

    /// Choose a way through the current node and a destination on it.
    ///
    /// Picks uniformly among the ways through the node; if the pick has a
    /// single node, falls back to a uniform pick among the ways with at least
    /// two.  The destination is uniform over the way's positions other than
    /// the agent's own.
    ///
    /// # Errors
    ///
    /// [`MobilityError::Stranded`] when no way with two or more nodes passes
    /// through the current node.  The agent is left `Idle`.
    pub fn plan(&mut self, graph: &StreetGraph) -> MobilityResult<()> {
        self.state       = NavState::Idle;
        self.way         = None;
        self.target      = None;
        self.destination = None;

        let way    = self.pick_way(graph)?;
        let origin = way.index_of(self.node)?;
        let dest   = pick_destination(origin, way.len(), &mut self.rng);

        self.way          = Some(way.id);
        self.node_idx     = origin;
        self.dest_idx     = dest;
        self.destination  = Some(way.nodes[dest]);
        self.set_waypoint(way, step_toward(origin, dest), graph)?;
        self.state        = NavState::EnRoute;
        self.stranded     = false;

        debug!(
            agent = %self.id,
            way = %way.label(),
            from = %self.node,
            to = %way.nodes[dest],
            distance_m = graph.node(way.nodes[dest]).map(|n| self.position.distance_m(n.pos)),
            "planned walk"
        );
        Ok(())
    }

    /// Walk `step_m` metres toward the current target.
    ///
    /// If the target is nearer than one step the agent snaps onto it.  Snapping
    /// onto the destination ends the walk and a new one is planned from that
    /// node at once.  An agent that is not en route plans first and, if that
    /// fails, stays where it is.
    ///
    /// The enabled flag is not consulted; the engine skips disabled agents.
    ///
    /// # Errors
    ///
    /// Only when the agent's way or nodes are missing from `graph`, i.e. it is
    /// advanced on a different graph from the one it was planned on.
    pub fn advance(&mut self, step_m: f64, graph: &StreetGraph) -> MobilityResult<StepOutcome> {
        if self.state != NavState::EnRoute && !self.replan(graph) {
            return Ok(StepOutcome::Stranded);
        }

        let way    = self.current_way(graph)?;
        let target = node_at(way, self.waypoint_idx, graph)?;
        let (remaining, bearing) = self.position.distance_and_bearing(target.pos);

        if remaining < step_m || remaining == 0.0 {
            self.position = target.pos;
            self.node     = target.id;
            self.node_idx = self.waypoint_idx;

            if self.node_idx == self.dest_idx {
                self.state = NavState::Arrived;
                debug!(agent = %self.id, node = %self.node, "arrived");
                self.replan(graph);
                return Ok(StepOutcome::Arrived);
            }
            self.set_waypoint(way, step_toward(self.node_idx, self.dest_idx), graph)?;
            return Ok(StepOutcome::ReachedWaypoint);
        }

        self.bearing  = bearing;
        self.position = self.position.project(step_m, bearing);
        Ok(StepOutcome::Moved)
    }

    /// [`plan`](Self::plan), recording a failure: the agent is marked stranded
    /// (warned about once) until a later plan succeeds.  Returns `true` if the
    /// agent is now en route.
    pub fn replan(&mut self, graph: &StreetGraph) -> bool {
        match self.plan(graph) {
            Ok(()) => true,
            Err(err) => {
                if self.stranded {
                    debug!(agent = %self.id, %err, "still stranded");
                } else {
                    warn!(agent = %self.id, %err, "agent stranded; retrying next tick");
                    self.stranded = true;
                }
                false
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn pick_way<'g>(&mut self, graph: &'g StreetGraph) -> MobilityResult<&'g Way> {
        let way = match graph.random_way(self.node, self.rng.inner()) {
            Ok(way) => way,
            Err(GraphError::NoWayAtNode(_)) => return Err(self.stranded_error()),
            Err(err) => return Err(err.into()),
        };
        if way.len() >= 2 {
            return Ok(way);
        }

        let plannable: Vec<&Way> = graph.ways_through(self.node).filter(|w| w.len() >= 2).collect();
        match self.rng.choose(&plannable) {
            Some(&way) => Ok(way),
            None => Err(self.stranded_error()),
        }
    }

    fn current_way<'g>(&self, graph: &'g StreetGraph) -> MobilityResult<&'g Way> {
        let id = self.way.ok_or_else(|| self.stranded_error())?;
        graph
            .way(id)
            .ok_or_else(|| MobilityError::UnknownWay { agent: self.id.clone(), way: id })
    }

    fn set_waypoint(&mut self, way: &Way, idx: usize, graph: &StreetGraph) -> MobilityResult<()> {
        let next = node_at(way, idx, graph)?;
        self.waypoint_idx = idx;
        self.target       = Some(next.id);
        self.bearing      = self.position.distance_and_bearing(next.pos).1;
        Ok(())
    }

    fn stranded_error(&self) -> MobilityError {
        MobilityError::Stranded { agent: self.id.clone(), node: self.node }
    }
}

/// Uniform index in `0..len` other than `origin`.  Requires `len >= 2`.
fn pick_destination(origin: usize, len: usize, rng: &mut AgentRng) -> usize {
    let draw = rng.gen_range(0..len - 1);
    if draw >= origin { draw + 1 } else { draw }
}

/// The index one step from `from` toward `to`.  Requires `from != to`.
#[inline]
fn step_toward(from: usize, to: usize) -> usize {
    if to > from { from + 1 } else { from - 1 }
}

fn node_at<'g>(way: &Way, idx: usize, graph: &'g StreetGraph) -> MobilityResult<&'g Node> {
    let id = way.nodes[idx];
    graph
        .node(id)
        .ok_or(MobilityError::Graph(GraphError::UnknownNode { way: way.id, node: id }))
}
