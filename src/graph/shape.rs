use geo::{
    BoundingRect, Distance, Haversine, InterpolatableLine, Line, LineLocatePoint, LineString,
    Point, Rect,
};

/// Meters per degree of latitude, on the mean earth radius.
pub(crate) const METERS_PER_DEGREE: f64 = 6_371_008.8 * std::f64::consts::PI / 180.0;

/// The geometry of an edge, with the cumulative distance (in meters)
/// to each of its vertices precomputed.
///
/// Positions along the shape are expressed as a fraction of its length,
/// so `0.0` is the first vertex and `1.0` the last.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    line: LineString,
    cumulative: Vec<f64>,
    bounds: Rect,
}

/// The closest position upon a [`Shape`] to some point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Fraction of the shape's length at which the position lies.
    pub fraction: f64,

    /// The projected position.
    pub position: Point,

    /// Great-circle distance between the point and its projection, in meters.
    pub distance: f64,
}

impl Shape {
    /// Returns `None` for a line of fewer than two points.
    pub fn new(line: LineString) -> Option<Self> {
        if line.0.len() < 2 {
            return None;
        }

        let bounds = line.bounding_rect()?;

        let mut cumulative = Vec::with_capacity(line.0.len());
        let mut total = 0.0;
        cumulative.push(total);

        for segment in line.lines() {
            total += Haversine.distance(Point(segment.start), Point(segment.end));
            cumulative.push(total);
        }

        Some(Self {
            line,
            cumulative,
            bounds,
        })
    }

    #[inline]
    pub fn line(&self) -> &LineString {
        &self.line
    }

    /// Total length in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or_default()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Projects the point onto the closest position along the whole shape.
    pub fn project(&self, point: &Point) -> Projection {
        self.project_within(point, 0.0, 1.0)
    }

    /// Projects the point onto the closest position between the two fractions.
    ///
    /// Each segment of the shape is located upon in turn, with the located
    /// ratio clamped to the part of the segment inside the window. Ties
    /// resolve to the earliest position.
    pub fn project_within(&self, point: &Point, from: f64, to: f64) -> Projection {
        let length = self.length();
        let (lower, upper) = (from.clamp(0.0, 1.0) * length, to.clamp(0.0, 1.0) * length);

        let mut best: Option<(f64, f64, Point)> = None;
        for (index, line) in self.line.lines().enumerate() {
            let (start, end) = (self.cumulative[index], self.cumulative[index + 1]);
            if end < lower || start > upper {
                continue;
            }

            let span = end - start;
            let (t_min, t_max) = if span > 0.0 {
                (
                    ((lower - start) / span).clamp(0.0, 1.0),
                    ((upper - start) / span).clamp(0.0, 1.0),
                )
            } else {
                (0.0, 0.0)
            };

            let ratio = line
                .line_locate_point(point)
                .unwrap_or(t_min)
                .clamp(t_min, t_max);

            let position = line.point_at_ratio_from_start(&Haversine, ratio);
            let distance = Haversine.distance(*point, position);

            if best.is_none_or(|(closest, _, _)| distance < closest) {
                best = Some((distance, start + span * ratio, position));
            }
        }

        match best {
            Some((distance, along, position)) => Projection {
                fraction: if length > 0.0 {
                    (along / length).clamp(0.0, 1.0)
                } else {
                    0.0
                },
                position,
                distance,
            },
            None => {
                let position = self.point_at(from);
                Projection {
                    fraction: from.clamp(0.0, 1.0),
                    position,
                    distance: Haversine.distance(*point, position),
                }
            }
        }
    }

    /// The position at the given fraction along the shape.
    pub fn point_at(&self, fraction: f64) -> Point {
        let target = fraction.clamp(0.0, 1.0) * self.length();

        // Index of the first vertex strictly beyond the target.
        let next = self
            .cumulative
            .partition_point(|distance| *distance <= target)
            .clamp(1, self.cumulative.len() - 1);

        let line = Line::new(self.line.0[next - 1], self.line.0[next]);
        let span = self.cumulative[next] - self.cumulative[next - 1];
        let ratio = if span > 0.0 {
            ((target - self.cumulative[next - 1]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        line.point_at_ratio_from_start(&Haversine, ratio)
    }

    /// The sub-polyline between two fractions, including any vertices
    /// strictly between them. Reversed bounds yield the single point at `from`.
    pub fn slice(&self, from: f64, to: f64) -> Vec<Point> {
        let first = self.point_at(from);
        if to <= from {
            return vec![first];
        }

        let length = self.length();
        let (lower, upper) = (from * length, to * length);

        std::iter::once(first)
            .chain(
                self.line
                    .0
                    .iter()
                    .zip(&self.cumulative)
                    .filter(|(_, distance)| **distance > lower && **distance < upper)
                    .map(|(vertex, _)| Point(*vertex)),
            )
            .chain(std::iter::once(self.point_at(to)))
            .collect()
    }
}
