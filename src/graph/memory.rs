use crate::config::Mode;
use crate::error::GraphError;
use crate::graph::*;

use geo::{LineString, Point, Rect};
use log::{debug, info};
use measure_time::debug_time;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rstar::{RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// The serialised form of a road network.
///
/// ```json
/// {
///   "nodes": [{ "id": 1, "lon": -76.38, "lat": 40.53 }],
///   "edges": [{
///     "id": 1, "source": 1, "target": 2,
///     "shape": [[-76.38, 40.53], [-76.37, 40.54]],
///     "access": ["auto"],
///     "segments": [{ "id": 100, "begin": 0.0, "end": 1.0, "starts": true, "ends": true, "length": 1160.0 }]
///   }]
/// }
/// ```
///
/// An edge without a `shape` is a straight line between its nodes,
/// and one without `access` is open to every mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,

    #[serde(default)]
    pub shape: Vec<[f64; 2]>,

    #[serde(default = "every_mode")]
    pub access: Vec<Mode>,

    #[serde(default)]
    pub segments: Vec<ChunkRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: SegmentId,

    #[serde(default)]
    pub begin: f64,
    #[serde(default = "whole_edge")]
    pub end: f64,

    #[serde(default = "affirm")]
    pub starts: bool,
    #[serde(default = "affirm")]
    pub ends: bool,

    pub length: f64,
}

fn every_mode() -> Vec<Mode> {
    vec![Mode::Auto, Mode::Bicycle, Mode::Pedestrian]
}

fn whole_edge() -> f64 {
    1.0
}

fn affirm() -> bool {
    true
}

/// Spatially indexed envelope of an edge's geometry.
#[derive(Debug, Clone, Copy)]
struct EdgeEnvelope {
    id: EdgeId,
    envelope: AABB<Point>,
}

impl RTreeObject for EdgeEnvelope {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// An in-memory road network, read-only once loaded.
///
/// Topology is held in a [`DiGraph`] whose nodes are the network's nodes and
/// whose edges are weighted by [`EdgeId`], while edge geometry is indexed
/// by an [`RTree`] over each edge's bounding box.
pub struct MemoryGraph {
    topology: DiGraph<NodeId, EdgeId>,
    nodes: FxHashMap<NodeId, NodeIndex>,
    edges: FxHashMap<EdgeId, Edge>,
    index: RTree<EdgeEnvelope>,
}

impl Debug for MemoryGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MemoryGraph with Nodes: {}, Edges: {}",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

impl MemoryGraph {
    /// Reads a [`GraphDocument`] from the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let document: GraphDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_document(document: GraphDocument) -> Result<Self, GraphError> {
        debug_time!("graph construction");

        let mut topology = DiGraph::with_capacity(document.nodes.len(), document.edges.len());
        let mut nodes = FxHashMap::default();
        let mut positions = FxHashMap::default();

        for node in &document.nodes {
            let index = topology.add_node(node.id);
            nodes.insert(node.id, index);
            positions.insert(node.id, Point::new(node.lon, node.lat));
        }

        let mut edges = FxHashMap::default();
        for record in document.edges {
            let (Some(source), Some(target)) = (nodes.get(&record.source), nodes.get(&record.target))
            else {
                let node = if nodes.contains_key(&record.source) {
                    record.target
                } else {
                    record.source
                };

                return Err(GraphError::UnknownNode {
                    edge: record.id,
                    node,
                });
            };

            if edges.contains_key(&record.id) {
                return Err(GraphError::DuplicateEdge(record.id));
            }

            let line = if record.shape.is_empty() {
                [&record.source, &record.target]
                    .into_iter()
                    .filter_map(|node| positions.get(node))
                    .map(|point: &Point| (point.x(), point.y()))
                    .collect::<LineString>()
            } else {
                record
                    .shape
                    .iter()
                    .map(|[lon, lat]| (*lon, *lat))
                    .collect::<LineString>()
            };

            let shape = Shape::new(line).ok_or(GraphError::DegenerateShape(record.id))?;

            let segments = record
                .segments
                .iter()
                .map(|chunk| {
                    if !(0.0..=1.0).contains(&chunk.begin)
                        || !(0.0..=1.0).contains(&chunk.end)
                        || chunk.begin > chunk.end
                    {
                        return Err(GraphError::InvalidChunk {
                            edge: record.id,
                            begin: chunk.begin,
                            end: chunk.end,
                        });
                    }

                    Ok(SegmentChunk::new(
                        chunk.id,
                        chunk.begin,
                        chunk.end,
                        chunk.starts,
                        chunk.ends,
                        chunk.length,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?;

            topology.add_edge(*source, *target, record.id);

            let edge = Edge::new(
                record.id,
                record.source,
                record.target,
                shape,
                record.access,
                segments,
            );
            edges.insert(record.id, edge);
        }

        let envelopes = edges
            .values()
            .map(|edge| {
                let bounds = edge.shape().bounds();
                EdgeEnvelope {
                    id: edge.id(),
                    envelope: AABB::from_corners(bounds.min().into(), bounds.max().into()),
                }
            })
            .collect::<Vec<_>>();

        let index = RTree::bulk_load(envelopes);
        info!(
            "Loaded graph of {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );

        Ok(Self {
            topology,
            nodes,
            edges,
            index,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl GraphReader for MemoryGraph {
    #[inline]
    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    fn outgoing(&self, node: NodeId) -> SmallVec<[EdgeId; 4]> {
        let Some(index) = self.nodes.get(&node) else {
            return SmallVec::new();
        };

        let mut outgoing = self
            .topology
            .edges_directed(*index, Direction::Outgoing)
            .map(|edge| *edge.weight())
            .collect::<SmallVec<[EdgeId; 4]>>();

        outgoing.sort_unstable();
        outgoing
    }

    fn edges_within(&self, bounds: &Rect) -> Vec<EdgeId> {
        let envelope: AABB<Point> = AABB::from_corners(bounds.min().into(), bounds.max().into());

        let mut found = self
            .index
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.id)
            .collect::<Vec<_>>();

        found.sort_unstable();
        debug!("Found {} edges within {:?}", found.len(), bounds);
        found
    }
}

impl SegmentAssociation for MemoryGraph {
    fn segments(&self, edge: EdgeId) -> &[SegmentChunk] {
        self.edges
            .get(&edge)
            .map(Edge::segments)
            .unwrap_or_default()
    }
}
