//! Cubic-Bézier knot geometry.
//!
//! Paths are stored as contours of knots. A knot is an anchor position plus
//! optional incoming/outgoing handle *deltas* relative to that anchor. The
//! edge between two consecutive knots is a straight line when the leaving
//! knot has no outgoing handle and the arriving knot has no incoming handle;
//! otherwise it is a cubic whose missing control points sit on the anchors.

use crate::matrix::{Matrix, Point, Vector};
use smallvec::SmallVec;

// ─── Knots & contours ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knot {
    pub pos: Point,
    pub handle_in: Option<Vector>,
    pub handle_out: Option<Vector>,
}

impl Knot {
    /// A sharp knot with no handles.
    pub const fn corner(x: f64, y: f64) -> Self {
        Self {
            pos: Point::new(x, y),
            handle_in: None,
            handle_out: None,
        }
    }

    pub fn with_handles(pos: Point, handle_in: Option<Vector>, handle_out: Option<Vector>) -> Self {
        Self {
            pos,
            handle_in,
            handle_out,
        }
    }

    /// Absolute position of the incoming control point.
    pub fn in_control(&self) -> Point {
        self.handle_in.map_or(self.pos, |h| self.pos + h)
    }

    /// Absolute position of the outgoing control point.
    pub fn out_control(&self) -> Point {
        self.handle_out.map_or(self.pos, |h| self.pos + h)
    }
}

/// One edge of a contour, resolved from a pair of knots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        c1: Point,
        c2: Point,
        to: Point,
    },
}

impl Segment {
    fn between(a: &Knot, b: &Knot) -> Self {
        if a.handle_out.is_none() && b.handle_in.is_none() {
            Segment::Line {
                from: a.pos,
                to: b.pos,
            }
        } else {
            Segment::Cubic {
                from: a.pos,
                c1: a.out_control(),
                c2: b.in_control(),
                to: b.pos,
            }
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { to, .. } | Segment::Cubic { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub closed: bool,
    pub knots: SmallVec<[Knot; 4]>,
}

impl Contour {
    pub fn closed(knots: impl IntoIterator<Item = Knot>) -> Self {
        Self {
            closed: true,
            knots: knots.into_iter().collect(),
        }
    }

    pub fn open(knots: impl IntoIterator<Item = Knot>) -> Self {
        Self {
            closed: false,
            knots: knots.into_iter().collect(),
        }
    }

    /// Edges in drawing order. Closed contours end with the last → first edge.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let closing = match (self.closed, self.knots.first(), self.knots.last()) {
            (true, Some(first), Some(last)) => Some(Segment::between(last, first)),
            _ => None,
        };
        self.knots
            .windows(2)
            .map(|pair| Segment::between(&pair[0], &pair[1]))
            .chain(closing)
    }
}

// ─── Path geometry ───────────────────────────────────────────────────────

/// Local (pre-transform) shape produced by a kernel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathGeometry {
    pub contours: Vec<Contour>,
}

impl PathGeometry {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    pub fn single(contour: Contour) -> Self {
        Self {
            contours: vec![contour],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(|c| c.knots.is_empty())
    }

    pub fn knots(&self) -> impl Iterator<Item = &Knot> {
        self.contours.iter().flat_map(|c| c.knots.iter())
    }

    /// Bounding box of the knot anchors. Handles are not included, so a
    /// curve bulging past its anchors is not fully enclosed.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.knots().map(|k| k.pos))
    }
}

/// Output of a kernel: local geometry plus the cumulative local-to-world
/// transform contributed by the node and its upstream modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvalResult {
    pub geom: PathGeometry,
    /// `None` means identity.
    pub transform: Option<Matrix>,
}

impl EvalResult {
    pub fn new(geom: PathGeometry) -> Self {
        Self {
            geom,
            transform: None,
        }
    }

    pub fn world_transform(&self) -> Matrix {
        self.transform.unwrap_or_default()
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(iter.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Corners clockwise (y-down) from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Axis-aligned box enclosing these bounds after mapping through `m`.
    pub fn transformed(&self, m: &Matrix) -> Bounds {
        let corners = self.corners().map(|p| m.transform_point(p));
        // Four points are always present.
        Bounds::from_points(corners).unwrap_or(*self)
    }
}
