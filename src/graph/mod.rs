//! Read-only road network collaborators.
//!
//! The matcher consumes the road network through two narrow interfaces:
//!
//! - [`GraphReader`], which resolves edges by identifier, walks the directed
//!   topology, and answers bounding-box queries for the Candidate Index.
//! - [`SegmentAssociation`], which maps an edge to the traffic segment
//!   chunks that overlay it.
//!
//! [`MemoryGraph`] implements both over an in-memory network.

pub mod association;
pub mod edge;
pub mod memory;
pub mod shape;


#[doc(inline)]
pub use association::*;
#[doc(inline)]
pub use edge::*;
#[doc(inline)]
pub use memory::*;
#[doc(inline)]
pub use shape::*;

use geo::Rect;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

identifier!(
    /// Identifies a directed edge. A two-way road is two edges.
    EdgeId
);
identifier!(NodeId);
identifier!(
    /// Identifies a traffic segment, independently of the edges it spans.
    SegmentId
);

/// Resolves the directed road network.
///
/// Implementations must be safe to read concurrently, as a single
/// matcher serves many traces at once.
pub trait GraphReader: Send + Sync {
    /// Resolves an edge by its identifier.
    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    /// All edges leaving the given node, in a stable order.
    fn outgoing(&self, node: NodeId) -> SmallVec<[EdgeId; 4]>;

    /// All edges whose geometry may intersect the bounds, given in degrees.
    ///
    /// This is the unit of loading for the Candidate Index, which caches
    /// the result per grid cell.
    fn edges_within(&self, bounds: &Rect) -> Vec<EdgeId>;
}

/// Maps an edge to the traffic segments overlaying it.
pub trait SegmentAssociation: Send + Sync {
    /// The chunks of traffic segments on the edge, ordered along it.
    /// An edge with no traffic segment returns an empty slice.
    fn segments(&self, edge: EdgeId) -> &[SegmentChunk];
}
