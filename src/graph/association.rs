use crate::graph::SegmentId;

/// The footprint of one traffic segment upon one edge.
///
/// A segment may cover several consecutive edges, and its boundaries
/// may fall anywhere within an edge. Each edge it touches therefore
/// carries a chunk stating which fraction of the edge the segment covers,
/// and whether the segment's true beginning or end lies on this edge.
///
/// ```text
///   edge a                 edge b
///   o=========o------------o-----o
///             ^ begin=0.45 ^ end=1.0 (a)
///                          ^ begin=0.0, end=0.8 (b)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentChunk {
    segment: SegmentId,
    begin: f64,
    end: f64,
    starts_segment: bool,
    ends_segment: bool,
    length: f64,
}

impl SegmentChunk {
    pub fn new(
        segment: SegmentId,
        begin: f64,
        end: f64,
        starts_segment: bool,
        ends_segment: bool,
        length: f64,
    ) -> Self {
        Self {
            segment,
            begin,
            end,
            starts_segment,
            ends_segment,
            length,
        }
    }

    /// A chunk covering an entire edge, for a segment which begins
    /// and ends upon that same edge.
    pub fn whole(segment: SegmentId, length: f64) -> Self {
        Self::new(segment, 0.0, 1.0, true, true, length)
    }

    #[inline]
    pub fn segment_id(&self) -> SegmentId {
        self.segment
    }

    /// Fraction along the edge at which the chunk begins.
    #[inline]
    pub fn begin(&self) -> f64 {
        self.begin
    }

    /// Fraction along the edge at which the chunk ends.
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// The segment's true beginning is at [`SegmentChunk::begin`].
    #[inline]
    pub fn starts_segment(&self) -> bool {
        self.starts_segment
    }

    /// The segment's true end is at [`SegmentChunk::end`].
    #[inline]
    pub fn ends_segment(&self) -> bool {
        self.ends_segment
    }

    /// The cataloged length of the whole segment, in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Whether the chunk covers any part of the fractional range.
    /// A zero-width range touching the chunk counts as overlapping.
    pub fn overlaps(&self, from: f64, to: f64) -> bool {
        if from == to {
            return self.begin <= from && from <= self.end;
        }

        from.max(self.begin) < to.min(self.end)
    }
}
