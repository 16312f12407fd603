//! Knot-wise normal offset.
//!
//! Each knot moves along the average of the unit right-hand normals of its
//! adjacent edges. Handles are carried over unchanged, so curved segments are
//! only approximately parallel to their source.

use crate::geometry::{Contour, Knot, PathGeometry};
use crate::matrix::Vector;

/// Edges shorter than this contribute no normal.
const EDGE_EPSILON: f64 = 1e-4;

/// Used when the adjacent edges cancel out or are all degenerate.
const FALLBACK_NORMAL: Vector = Vector::new(0.0, 1.0);

/// Displace every knot by `amount` along its estimated normal.
/// Empty contours are dropped.
pub fn offset_geometry(geom: &PathGeometry, amount: f64) -> PathGeometry {
    let contours = geom
        .contours
        .iter()
        .filter(|c| !c.knots.is_empty())
        .map(|c| offset_contour(c, amount))
        .collect();
    PathGeometry::new(contours)
}

fn offset_contour(contour: &Contour, amount: f64) -> Contour {
    let knots = (0..contour.knots.len())
        .map(|i| {
            let knot = &contour.knots[i];
            Knot {
                pos: knot.pos + knot_normal(contour, i) * amount,
                ..*knot
            }
        })
        .collect();
    Contour {
        closed: contour.closed,
        knots,
    }
}

/// Unit normal at knot `i`. Open contours have no incoming edge at the first
/// knot and no outgoing edge at the last; closed contours wrap. An index
/// outside the contour gets the fallback normal.
pub fn knot_normal(contour: &Contour, i: usize) -> Vector {
    let knots = &contour.knots;
    let n = knots.len();
    if i >= n {
        return FALLBACK_NORMAL;
    }
    let prev = &knots[(i + n - 1) % n];
    let here = &knots[i];
    let next = &knots[(i + 1) % n];

    let incoming = (contour.closed || i != 0).then(|| here.pos - prev.pos);
    let outgoing = (contour.closed || i != n - 1).then(|| next.pos - here.pos);

    let normals: Vec<Vector> = [incoming, outgoing]
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.normalized(EDGE_EPSILON))
        .map(Vector::right_normal)
        .collect();
    if normals.is_empty() {
        return FALLBACK_NORMAL;
    }
    let sum = normals.iter().fold(Vector::ZERO, |acc, v| acc + *v);
    (sum * (1.0 / normals.len() as f64))
        .normalized(EDGE_EPSILON)
        .unwrap_or(FALLBACK_NORMAL)
}
