//! The Segment Former.
//!
//! Folds the edge traversals of each interpolation group into records
//! against the traffic segments overlaying those edges.
//!
//! A traversal is first cut at every segment chunk boundary within its
//! edge. Consecutive pieces of the same segment join into one run, so long
//! as the trace passes from each chunk into the next without leaving the
//! segment. Each run yields one [`TrafficSegmentRecord`], whose start (or
//! end) time is known only if the run began (or ended) at the segment's
//! true boundary.
//!
//! ```text
//!      segment 7              segment 8
//!   |===========|====================|=====...
//!        x------------------------------x
//!        start=-1, end=t1   start=t1, end=t2  ...
//! ```

pub mod record;


#[doc(inline)]
pub use record::*;

use crate::error::DefectError;
use crate::graph::{EdgeId, SegmentAssociation, SegmentChunk};
use crate::interpolation::InterpolationPoint;

use log::{debug, trace};

/// Distance, in meters, within which a position counts as
/// being upon a chunk boundary.
const BOUNDARY_TOLERANCE: f64 = 1.0;

/// The part of one interpolation point lying within one chunk.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    edge: EdgeId,
    edge_length: f64,

    /// Position of the chunk within its edge's chunks.
    slot: usize,
    chunk: &'a SegmentChunk,

    entry: f64,
    exit: f64,
    entry_time: Option<f64>,
    exit_time: Option<f64>,
    entry_index: usize,
    exit_index: usize,
}

impl Piece<'_> {
    /// Whether the piece extends a run ending in `previous`.
    fn continues(&self, previous: &Piece) -> bool {
        if self.chunk.segment_id() != previous.chunk.segment_id() {
            return false;
        }

        // A run which reached the segment's true end is complete.
        if previous.at_segment_end() {
            return false;
        }

        if self.edge == previous.edge && self.slot == previous.slot {
            return (self.entry - previous.exit).abs() * self.edge_length <= BOUNDARY_TOLERANCE;
        }

        let left_at_end =
            (previous.chunk.end() - previous.exit) * previous.edge_length <= BOUNDARY_TOLERANCE;
        let entered_at_begin =
            (self.entry - self.chunk.begin()) * self.edge_length <= BOUNDARY_TOLERANCE;

        left_at_end && entered_at_begin
    }

    fn at_segment_start(&self) -> bool {
        self.chunk.starts_segment()
            && (self.entry - self.chunk.begin()) * self.edge_length <= BOUNDARY_TOLERANCE
    }

    fn at_segment_end(&self) -> bool {
        self.chunk.ends_segment()
            && (self.chunk.end() - self.exit) * self.edge_length <= BOUNDARY_TOLERANCE
    }
}

/// Cuts the point at each chunk boundary within it.
fn pieces<'a>(
    point: &InterpolationPoint,
    chunks: &'a [SegmentChunk],
) -> Result<Vec<Piece<'a>>, DefectError> {
    let (from, to) = (point.begin_fraction, point.end_fraction);
    if from > to {
        return Err(DefectError::NonMonotonicInterpolation {
            edge: point.edge,
            begin: from,
            end: to,
        });
    }

    let time_at = |fraction: f64| match (point.begin_time, point.end_time) {
        (Some(begin), Some(end)) => Some(begin + (end - begin) * (fraction - from) / (to - from)),
        _ => None,
    };

    let overlapping = chunks
        .iter()
        .enumerate()
        .filter(|(_, chunk)| chunk.overlaps(from, to));

    // A stationary point belongs to the first chunk holding it.
    if from == to {
        return Ok(overlapping
            .take(1)
            .map(|(slot, chunk)| Piece {
                edge: point.edge,
                edge_length: point.edge_length,
                slot,
                chunk,
                entry: from,
                exit: to,
                entry_time: point.begin_time,
                exit_time: point.end_time,
                entry_index: point.begin_shape_index,
                exit_index: point.end_shape_index,
            })
            .collect());
    }

    Ok(overlapping
        .map(|(slot, chunk)| {
            let entry = from.max(chunk.begin());
            let exit = to.min(chunk.end());

            Piece {
                edge: point.edge,
                edge_length: point.edge_length,
                slot,
                chunk,
                entry,
                exit,
                entry_time: time_at(entry),
                exit_time: time_at(exit),
                entry_index: point.begin_shape_index,
                exit_index: if exit >= to {
                    point.end_shape_index
                } else {
                    point.begin_shape_index
                },
            }
        })
        .collect())
}

/// Builds the record of a run, from its first and last pieces.
fn record(first: &Piece, last: &Piece) -> Result<TrafficSegmentRecord, DefectError> {
    let segment = first.chunk.segment_id();
    if last.chunk.segment_id() != segment {
        return Err(DefectError::MixedSegmentRun {
            expected: segment,
            found: last.chunk.segment_id(),
        });
    }

    let start_time = first.entry_time.filter(|_| first.at_segment_start());
    let end_time = last.exit_time.filter(|_| last.at_segment_end());
    let length = start_time
        .and(end_time)
        .map(|_| last.chunk.length());

    trace!("Segment {segment} from {start_time:?} to {end_time:?}");

    Ok(TrafficSegmentRecord {
        segment_id: segment,
        start_time,
        begin_shape_index: first.entry_index,
        end_time,
        end_shape_index: last.exit_index,
        length,
    })
}

/// Checks the records are ordered and non-overlapping in shape-index space.
fn validate(records: &[TrafficSegmentRecord]) -> Result<(), DefectError> {
    for record in records {
        if record.begin_shape_index > record.end_shape_index {
            return Err(DefectError::InvertedShapeIndices {
                segment: record.segment_id,
                begin: record.begin_shape_index,
                end: record.end_shape_index,
            });
        }
    }

    for pair in records.windows(2) {
        if let [previous, next] = pair {
            if next.begin_shape_index < previous.end_shape_index {
                return Err(DefectError::OverlappingShapeIndices {
                    next: next.segment_id,
                    begin: next.begin_shape_index,
                    end: previous.end_shape_index,
                });
            }
        }
    }

    Ok(())
}

/// Forms the traffic segment records of the interpolation groups,
/// in the order the trace passed through them.
///
/// Traversals of edges without a traffic segment produce no record,
/// and break the run of the segment before them.
pub fn form_segments<A>(
    groups: &[Vec<InterpolationPoint>],
    association: &A,
) -> Result<Vec<TrafficSegmentRecord>, DefectError>
where
    A: SegmentAssociation + ?Sized,
{
    let mut records = Vec::new();

    for group in groups {
        // The first and latest piece of the current run.
        let mut run: Option<(Piece, Piece)> = None;

        for point in group {
            let pieces = pieces(point, association.segments(point.edge))?;

            if pieces.is_empty() {
                if let Some((first, last)) = run.take() {
                    records.push(record(&first, &last)?);
                }
                continue;
            }

            for piece in pieces {
                run = match run {
                    Some((first, last)) if piece.continues(&last) => Some((first, piece)),
                    Some((first, last)) => {
                        records.push(record(&first, &last)?);
                        Some((piece, piece))
                    }
                    None => Some((piece, piece)),
                };
            }
        }

        if let Some((first, last)) = run {
            records.push(record(&first, &last)?);
        }
    }

    validate(&records)?;
    debug!(
        "Formed {} records ({} full) from {} groups",
        records.len(),
        records.iter().filter(|r| r.is_full()).count(),
        groups.len()
    );

    Ok(records)
}
