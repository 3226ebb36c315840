//! OSM PBF loader — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use wd_spatial::osm::load_from_pbf;
//!
//! let graph = load_from_pbf(Path::new("campus.osm.pbf"))?;
//! ```
//!
//! # What is loaded
//!
//! Every way carrying a `highway=*` tag is kept with its `name` tag and its
//! `highway` value as the way's kind.  Pedestrians may walk any street class,
//! so nothing is filtered by road type.  Only nodes referenced by a kept way
//! enter the graph; references to nodes absent from the extract (clipped at
//! the bounding box) are dropped from the way, and ways left empty are
//! skipped.
//!
//! # Memory note
//!
//! The loader buffers all OSM node positions in a `HashMap<i64, GeoPoint>`
//! during the single sequential pass, because ways reference nodes by id and
//! may precede them in the file.  The map is freed before the graph is built.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use osmpbf::{Element, ElementReader};
use tracing::{debug, info};

use wd_core::{GeoPoint, NodeId, WayId};

use crate::graph::{StreetGraph, StreetGraphBuilder};
use crate::GraphError;

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a street graph from an OSM PBF file.
///
/// # Errors
///
/// [`GraphError::Io`] if the file cannot be opened, [`GraphError::Osm`] if it
/// is not valid PBF.
pub fn load_from_pbf(path: &Path) -> Result<StreetGraph, GraphError> {
    // ── Phase 1: collect all OSM nodes + street ways in one sequential pass ─
    let reader = ElementReader::new(BufReader::new(File::open(path)?));

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut street_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                street_ways.extend(street_way(w.id(), w.tags(), w.refs()));
            }
            _ => {}
        })
        .map_err(|e| GraphError::Osm(e.to_string()))?;

    info!(
        nodes = all_nodes.len(),
        ways = street_ways.len(),
        "read OSM extract from {}",
        path.display()
    );

    assemble(all_nodes, street_ways)
}

// ── Internal types ────────────────────────────────────────────────────────────

pub(crate) struct OsmWay {
    pub(crate) id:   i64,
    pub(crate) refs: Vec<i64>,
    pub(crate) name: String,
    pub(crate) kind: String,
}

/// The street a way describes, or `None` without a `highway` tag.
pub(crate) fn street_way<'a>(
    id:   i64,
    tags: impl Iterator<Item = (&'a str, &'a str)>,
    refs: impl Iterator<Item = i64>,
) -> Option<OsmWay> {
    let mut highway = None;
    let mut name = String::new();
    for (k, v) in tags {
        match k {
            "highway" => highway = Some(v.to_owned()),
            "name" => name = v.to_owned(),
            _ => {}
        }
    }
    let kind = highway?;
    Some(OsmWay { id, refs: refs.collect(), name, kind })
}

/// Phase 2 + 3: keep street-referenced nodes, drop dangling references, build.
pub(crate) fn assemble(
    all_nodes:   HashMap<i64, GeoPoint>,
    street_ways: Vec<OsmWay>,
) -> Result<StreetGraph, GraphError> {
    let street_node_ids: HashSet<i64> = street_ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .filter(|id| all_nodes.contains_key(id))
        .collect();

    let mut builder =
        StreetGraphBuilder::with_capacity(street_node_ids.len(), street_ways.len());

    // Insert in way order so node order (and thus seeded random picks) is
    // stable across runs.
    for way in &street_ways {
        for &osm_id in &way.refs {
            if street_node_ids.contains(&osm_id) && !builder.contains_node(NodeId(osm_id)) {
                builder.add_node(NodeId(osm_id), all_nodes[&osm_id])?;
            }
        }
    }
    drop(all_nodes);

    let mut dangling = 0usize;
    for way in street_ways {
        let refs: Vec<NodeId> = way
            .refs
            .iter()
            .copied()
            .filter(|id| street_node_ids.contains(id))
            .map(NodeId)
            .collect();
        dangling += way.refs.len() - refs.len();
        if refs.is_empty() {
            continue;
        }
        builder.add_way(WayId(way.id), refs, way.name, way.kind)?;
    }
    if dangling > 0 {
        debug!(dangling, "dropped references to nodes outside the extract");
    }

    builder.build()
}
