use crate::config::Mode;
use crate::graph::{EdgeId, NodeId, SegmentChunk, Shape};

use smallvec::SmallVec;

/// A directed edge of the road network.
///
/// Bidirectional roads are represented as two edges, one per direction,
/// each with its own geometry (ordered in the direction of travel) and
/// its own traffic segment chunks.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    shape: Shape,
    access: SmallVec<[Mode; 3]>,
    segments: Vec<SegmentChunk>,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        shape: Shape,
        access: impl IntoIterator<Item = Mode>,
        mut segments: Vec<SegmentChunk>,
    ) -> Self {
        segments.sort_by(|a, b| a.begin().total_cmp(&b.begin()));

        Self {
            id,
            source,
            target,
            shape,
            access: access.into_iter().collect(),
            segments,
        }
    }

    #[inline]
    pub fn id(&self) -> EdgeId {
        self.id
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Length of the edge in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.shape.length()
    }

    #[inline]
    pub fn segments(&self) -> &[SegmentChunk] {
        &self.segments
    }

    /// Whether the mode may travel along this edge.
    #[inline]
    pub fn allows(&self, mode: Mode) -> bool {
        self.access.contains(&mode)
    }
}
