use crate::graph::{EdgeId, NodeId, SegmentId};
use crate::impl_err;

use thiserror::Error;

/// The crate-level error, raised from the [`TrafficSegmentMatcher`](crate::TrafficSegmentMatcher)
/// facade. Each variant wraps the error of the stage that failed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(InvalidArgument),

    #[error("could not match trace: {0}")]
    Match(MatchError),

    #[error("internal defect: {0}")]
    Defect(DefectError),

    #[error("invalid configuration: {0}")]
    Config(ConfigError),

    #[error("invalid graph: {0}")]
    Graph(GraphError),

    #[error("malformed json: {0}")]
    Json(serde_json::Error),

    #[error("io failure: {0}")]
    Io(std::io::Error),
}

impl_err!(InvalidArgument, InvalidArgument);
impl_err!(MatchError, Match);
impl_err!(DefectError, Defect);
impl_err!(ConfigError, Config);
impl_err!(GraphError, Graph);
impl_err!(serde_json::Error, Json);
impl_err!(std::io::Error, Io);

/// Raised when constructing a [`Measurement`](crate::Measurement) from
/// out-of-domain values.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidArgument {
    #[error("gps accuracy must be non-negative, got {0}")]
    NegativeAccuracy(f64),

    #[error("search radius must be non-negative, got {0}")]
    NegativeSearchRadius(f64),

    #[error("coordinate ({0}, {1}) is not a finite position")]
    NonFinitePosition(f64, f64),
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("no input points were given")]
    EmptyTrace,

    #[error("none of the {0} measurements had a candidate edge within reach")]
    NoCandidates(usize),

    #[error("measurement {index} is malformed: {source}")]
    InvalidMeasurement {
        index: usize,
        #[source]
        source: InvalidArgument,
    },
}

/// An internal contradiction found while assembling output.
///
/// These can only be produced by a bug in the pipeline, never by user input,
/// and are therefore surfaced instead of silently corrected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefectError {
    #[error("record for segment {segment} ends at shape index {end} before it begins at {begin}")]
    InvertedShapeIndices {
        segment: SegmentId,
        begin: usize,
        end: usize,
    },

    #[error("record for segment {next} begins at shape index {begin}, inside the previous record ending at {end}")]
    OverlappingShapeIndices {
        next: SegmentId,
        begin: usize,
        end: usize,
    },

    #[error("run for segment {expected} contains a chunk of segment {found}")]
    MixedSegmentRun {
        expected: SegmentId,
        found: SegmentId,
    },

    #[error("interpolation point on edge {edge} leaves before it enters ({begin} > {end})")]
    NonMonotonicInterpolation { edge: EdgeId, begin: f64, end: f64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("option `{key}` must be positive, got {value}")]
    NotPositive { key: &'static str, value: f64 },

    #[error("option `{key}` must be non-negative, got {value}")]
    Negative { key: &'static str, value: f64 },

    #[error("option `grid.cache_size` must hold at least one cell")]
    EmptyCache,

    #[error("search radius {search} exceeds the maximum search radius {max}")]
    RadiusAboveMaximum { search: f64, max: f64 },

    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read configuration: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode { edge: EdgeId, node: NodeId },

    #[error("edge {0} is declared more than once")]
    DuplicateEdge(EdgeId),

    #[error("edge {0} needs at least two shape points")]
    DegenerateShape(EdgeId),

    #[error("edge {edge} has a segment chunk outside [0, 1] or inverted: [{begin}, {end}]")]
    InvalidChunk { edge: EdgeId, begin: f64, end: f64 },

    #[error("could not parse graph: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read graph: {0}")]
    Read(#[from] std::io::Error),
}
