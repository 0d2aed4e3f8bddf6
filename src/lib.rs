//! Map matching of GPS traces onto traffic segments.
//!
//! A trace is matched onto a road network with a Hidden Markov Model, the
//! matched path is interpolated edge by edge, and the time spent upon each
//! traffic segment overlaying those edges is reported.
//!
//! ```text
//!   Measurements -> MapMatcher -> MatchedTrace -> interpolate -> form_segments -> records
//!                       |  \
//!         CandidateIndex    RouteOracle
//! ```
//!
//! The entrypoint is the [`TrafficSegmentMatcher`], built from a
//! [`MatcherConfig`] and a network implementing [`GraphReader`]
//! and [`SegmentAssociation`], such as the [`MemoryGraph`].

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;
#[cfg_attr(feature = "mimalloc", global_allocator)]
#[cfg(feature = "mimalloc")]
static GLOBAL: MiMalloc = MiMalloc;

pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod interpolation;
pub mod matcher;
pub mod measurement;
pub mod route;
pub mod segment;
pub mod transition;
pub mod util;

#[doc(inline)]
pub use config::{MatchOptions, MatcherConfig, Mode};
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use graph::{GraphReader, MemoryGraph, SegmentAssociation};
#[doc(inline)]
pub use matcher::{TracePoint, TraceRequest, TraceResponse, TrafficSegmentMatcher};
#[doc(inline)]
pub use measurement::Measurement;
#[doc(inline)]
pub use segment::TrafficSegmentRecord;
