//! Knot geometry → kurbo paths and affines.

use knot_core::geometry::{PathGeometry, Segment};
use knot_core::matrix::{Matrix, Point};
use kurbo::{Affine, BezPath};

pub fn to_kurbo_point(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

/// Same coefficient order on both sides: `[a, b, c, d, e, f]`.
pub fn to_affine(m: &Matrix) -> Affine {
    Affine::new(m.as_coeffs())
}

/// Build a fillable path. Closed contours get their closing edge (line or
/// cubic by the usual handle rule) followed by a close.
pub fn to_bez_path(geom: &PathGeometry) -> BezPath {
    let mut path = BezPath::new();
    for contour in &geom.contours {
        let Some(first) = contour.knots.first() else {
            continue;
        };
        path.move_to(to_kurbo_point(first.pos));
        for seg in contour.segments() {
            match seg {
                Segment::Line { to, .. } => path.line_to(to_kurbo_point(to)),
                Segment::Cubic { c1, c2, to, .. } => path.curve_to(
                    to_kurbo_point(c1),
                    to_kurbo_point(c2),
                    to_kurbo_point(to),
                ),
            }
        }
        if contour.closed {
            path.close_path();
        }
    }
    path
}

/// CSS pixels → raster pixels.
pub fn device_scale(dpr: f64) -> Matrix {
    Matrix::from_scale(dpr, dpr)
}

/// `device ∘ overlay ∘ node`: the overlay acts in world space, before the
/// device scale and after the node's own transform.
pub fn full_transform(dpr: f64, overlay: Option<&Matrix>, node: Option<&Matrix>) -> Matrix {
    let mut m = device_scale(dpr);
    if let Some(overlay) = overlay {
        m = m.compose(*overlay);
    }
    if let Some(node) = node {
        m = m.compose(*node);
    }
    m
}
