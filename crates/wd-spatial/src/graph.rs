//! Street graph representation and builder.
//!
//! # Data layout
//!
//! Nodes and ways are stored densely in insertion order.  Map ids are
//! resolved through hash indexes, so lookups cost one probe.
//!
//! "Which ways touch this node?" is answered from a **Compressed Sparse Row
//! (CSR)** incidence list built once in [`StreetGraphBuilder::build`].  For
//! dense node index `n`, the indices of incident ways occupy
//!
//! ```text
//! node_way_list[ node_way_start[n] .. node_way_start[n+1] ]
//! ```
//!
//! in way-definition order, each way listed once even if it passes through
//! the node more than once (closed loops).
//!
//! # Adjacency
//!
//! There are no explicit edges: two nodes are adjacent iff they appear
//! consecutively in some way's node sequence.  Agents walk a way node by node.

use std::collections::HashMap;

use rand::Rng;

use wd_core::{GeoPoint, NodeId, WayId};

use crate::{GraphError, GraphResult};

// ── Node / Way ────────────────────────────────────────────────────────────────

/// A graph vertex with a geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:  NodeId,
    pub pos: GeoPoint,
}

/// An ordered path of nodes representing one street.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Way {
    pub id:    WayId,
    /// Node ids in street order.  May repeat (closed loops).
    pub nodes: Vec<NodeId>,
    /// Street name ("4th Street"); empty when the map has none.
    pub name:  String,
    /// Street class ("residential", "secondary", ...); empty when unknown.
    pub kind:  String,
}

impl Way {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First position of `node` in this way's sequence.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotOnWay`] if the node is absent.  For an agent this
    /// means its current way no longer contains its position: a caller bug.
    pub fn index_of(&self, node: NodeId) -> GraphResult<usize> {
        self.nodes
            .iter()
            .position(|&n| n == node)
            .ok_or(GraphError::NodeNotOnWay { node, way: self.id })
    }

    /// Display label for logs: the name, or the id for unnamed ways.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

// ── StreetGraph ───────────────────────────────────────────────────────────────

/// Immutable street graph.
///
/// Do not construct directly; use [`StreetGraphBuilder`].  Every node id
/// referenced by a way is guaranteed to exist.
#[derive(Debug)]
pub struct StreetGraph {
    /// Nodes in insertion order.
    pub nodes: Vec<Node>,

    /// Ways in definition order.
    pub ways: Vec<Way>,

    node_index: HashMap<NodeId, u32>,
    way_index:  HashMap<WayId, u32>,

    // ── CSR node → way incidence ──────────────────────────────────────────
    /// Length = `node_count + 1`.
    node_way_start: Vec<u32>,
    node_way_list:  Vec<u32>,
}

impl StreetGraph {
    /// Construct an empty graph.  Every random pick against it fails with
    /// [`GraphError::EmptyGraph`].
    pub fn empty() -> Self {
        StreetGraph {
            nodes:          Vec::new(),
            ways:           Vec::new(),
            node_index:     HashMap::default(),
            way_index:      HashMap::default(),
            node_way_start: vec![0],
            node_way_list:  Vec::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&i| &self.nodes[i as usize])
    }

    pub fn way(&self, id: WayId) -> Option<&Way> {
        self.way_index.get(&id).map(|&i| &self.ways[i as usize])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// All ways whose sequence contains `node`, in definition order.
    ///
    /// Empty for an isolated node or an id not in the graph: a dead end, not
    /// an error.
    pub fn ways_through(&self, node: NodeId) -> impl Iterator<Item = &Way> + '_ {
        let (start, end) = self.incidence_range(node);
        self.node_way_list[start..end]
            .iter()
            .map(|&w| &self.ways[w as usize])
    }

    // ── Random selection ──────────────────────────────────────────────────

    /// Uniform pick over all nodes.
    pub fn random_node<R: Rng + ?Sized>(&self, rng: &mut R) -> GraphResult<&Node> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        Ok(&self.nodes[rng.gen_range(0..self.nodes.len())])
    }

    /// Uniform pick among [`ways_through`](Self::ways_through)`(node)`.
    pub fn random_way<R: Rng + ?Sized>(&self, node: NodeId, rng: &mut R) -> GraphResult<&Way> {
        let (start, end) = self.incidence_range(node);
        if start == end {
            return Err(GraphError::NoWayAtNode(node));
        }
        let w = self.node_way_list[rng.gen_range(start..end)];
        Ok(&self.ways[w as usize])
    }

    #[inline]
    fn incidence_range(&self, node: NodeId) -> (usize, usize) {
        match self.node_index.get(&node) {
            None => (0, 0),
            Some(&i) => (
                self.node_way_start[i as usize] as usize,
                self.node_way_start[i as usize + 1] as usize,
            ),
        }
    }
}

// ── StreetGraphBuilder ────────────────────────────────────────────────────────

/// Construct a [`StreetGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and ways may be added in any order; `build()` checks that every
/// node a way references was added.
///
/// # Example
///
/// ```
/// use wd_core::{GeoPoint, NodeId, WayId};
/// use wd_spatial::StreetGraphBuilder;
///
/// let mut b = StreetGraphBuilder::new();
/// b.add_node(NodeId(1), GeoPoint::new(0.0, 0.000)).unwrap();
/// b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001)).unwrap();
/// b.add_way(WayId(10), vec![NodeId(1), NodeId(2)], "Main Street", "residential").unwrap();
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.ways_through(NodeId(1)).count(), 1);
/// ```
#[derive(Default)]
pub struct StreetGraphBuilder {
    nodes:      Vec<Node>,
    ways:       Vec<Way>,
    node_index: HashMap<NodeId, u32>,
    way_index:  HashMap<WayId, u32>,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and ways to reduce
    /// reallocations when bulk-loading from OSM.
    pub fn with_capacity(nodes: usize, ways: usize) -> Self {
        Self {
            nodes:      Vec::with_capacity(nodes),
            ways:       Vec::with_capacity(ways),
            node_index: HashMap::with_capacity(nodes),
            way_index:  HashMap::with_capacity(ways),
        }
    }

    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) -> GraphResult<()> {
        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.node_index.insert(id, self.nodes.len() as u32);
        self.nodes.push(Node { id, pos });
        Ok(())
    }

    pub fn add_way(
        &mut self,
        id:    WayId,
        nodes: Vec<NodeId>,
        name:  impl Into<String>,
        kind:  impl Into<String>,
    ) -> GraphResult<()> {
        if self.way_index.contains_key(&id) {
            return Err(GraphError::DuplicateWay(id));
        }
        self.way_index.insert(id, self.ways.len() as u32);
        self.ways.push(Way { id, nodes, name: name.into(), kind: kind.into() });
        Ok(())
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Validate references and produce the immutable [`StreetGraph`].
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownNode`] if a way references a node never added.
    pub fn build(self) -> GraphResult<StreetGraph> {
        let node_count = self.nodes.len();

        // Resolve every way's node sequence to dense indices, one entry per
        // (node, way) pair.
        let mut incidence: Vec<(u32, u32)> = Vec::new();
        for (w, way) in self.ways.iter().enumerate() {
            let mut seen: Vec<u32> = Vec::with_capacity(way.nodes.len());
            for &node in &way.nodes {
                let n = *self
                    .node_index
                    .get(&node)
                    .ok_or(GraphError::UnknownNode { way: way.id, node })?;
                if !seen.contains(&n) {
                    seen.push(n);
                    incidence.push((n, w as u32));
                }
            }
        }

        // Stable sort keeps way-definition order within each node's row.
        incidence.sort_by_key(|&(n, _)| n);

        let mut node_way_start = vec![0u32; node_count + 1];
        for &(n, _) in &incidence {
            node_way_start[n as usize + 1] += 1;
        }
        for i in 1..=node_count {
            node_way_start[i] += node_way_start[i - 1];
        }
        debug_assert_eq!(node_way_start[node_count] as usize, incidence.len());

        let node_way_list = incidence.into_iter().map(|(_, w)| w).collect();

        Ok(StreetGraph {
            nodes:      self.nodes,
            ways:       self.ways,
            node_index: self.node_index,
            way_index:  self.way_index,
            node_way_start,
            node_way_list,
        })
    }
}
