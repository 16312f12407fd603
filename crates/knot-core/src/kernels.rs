//! Per-node-type procedures that turn params and upstream results into
//! geometry plus a cumulative transform.
//!
//! Dispatch is an exhaustive match over [`NodeKind`], so adding a node type
//! without a kernel does not compile.

use crate::error::KernelError;
use crate::geometry::{Contour, EvalResult, Knot, PathGeometry};
use crate::matrix::{Point, Vector};
use crate::model::{EllipseParams, NodeKind, NodeType, OffsetParams, Port, RectParams, TransformParams};
use crate::offset::offset_geometry;

/// Handle length factor for a quarter-ellipse cubic.
pub const KAPPA: f64 = 0.552_284_749_8;

/// Resolved upstream results, one field per declared port.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelInputs<'a> {
    pub input: Option<&'a EvalResult>,
}

impl<'a> KernelInputs<'a> {
    pub fn get(&self, port: Port) -> Option<&'a EvalResult> {
        match port {
            Port::In => self.input,
        }
    }

    fn require(&self, node_type: NodeType, port: Port) -> Result<&'a EvalResult, KernelError> {
        self.get(port)
            .ok_or(KernelError::MissingInput { node_type, port })
    }
}

pub fn run_kernel(kind: &NodeKind, inputs: KernelInputs<'_>) -> Result<EvalResult, KernelError> {
    match kind {
        NodeKind::Rect(p) => Ok(rect(p)),
        NodeKind::Ellipse(p) => Ok(ellipse(p)),
        NodeKind::Transform(p) => transform(p, inputs),
        NodeKind::Offset(p) => offset(p, inputs),
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

fn handle(dx: f64, dy: f64) -> Option<Vector> {
    (dx != 0.0 || dy != 0.0).then_some(Vector::new(dx, dy))
}

/// Four corners clockwise from `(x, y)`. Corner handles lean `rx`/`ry` along
/// the adjacent edges, which biases the corners rather than truly rounding them.
fn rect(p: &RectParams) -> EvalResult {
    let RectParams { x, y, w, h, rx, .. } = *p;
    let ry = p.ry();
    let knot = |px, py, h_in: (f64, f64), h_out: (f64, f64)| {
        Knot::with_handles(
            Point::new(px, py),
            handle(h_in.0, h_in.1),
            handle(h_out.0, h_out.1),
        )
    };
    let contour = Contour::closed([
        knot(x, y, (-rx, 0.0), (rx, 0.0)),
        knot(x + w, y, (0.0, -ry), (0.0, ry)),
        knot(x + w, y + h, (rx, 0.0), (-rx, 0.0)),
        knot(x, y + h, (0.0, ry), (0.0, -ry)),
    ]);
    EvalResult::new(PathGeometry::single(contour))
}

/// Four cardinal knots starting at the rightmost point, running through
/// +y first.
fn ellipse(p: &EllipseParams) -> EvalResult {
    let EllipseParams { cx, cy, rx, .. } = *p;
    let ry = p.ry();
    let (kx, ky) = (KAPPA * rx, KAPPA * ry);
    let knot = |px, py, h_in: Vector, h_out: Vector| {
        Knot::with_handles(Point::new(px, py), Some(h_in), Some(h_out))
    };
    let contour = Contour::closed([
        knot(cx + rx, cy, Vector::new(0.0, -ky), Vector::new(0.0, ky)),
        knot(cx, cy + ry, Vector::new(kx, 0.0), Vector::new(-kx, 0.0)),
        knot(cx - rx, cy, Vector::new(0.0, ky), Vector::new(0.0, -ky)),
        knot(cx, cy - ry, Vector::new(-kx, 0.0), Vector::new(kx, 0.0)),
    ]);
    EvalResult::new(PathGeometry::single(contour))
}

// ─── Modifiers ───────────────────────────────────────────────────────────

/// Forward geometry untouched and stack the SRT matrix after the upstream
/// transform.
fn transform(p: &TransformParams, inputs: KernelInputs<'_>) -> Result<EvalResult, KernelError> {
    let src = inputs.require(NodeType::Transform, Port::In)?;
    Ok(EvalResult {
        geom: src.geom.clone(),
        transform: Some(src.world_transform().compose(p.to_matrix())),
    })
}

fn offset(p: &OffsetParams, inputs: KernelInputs<'_>) -> Result<EvalResult, KernelError> {
    let src = inputs.require(NodeType::Offset, Port::In)?;
    Ok(EvalResult {
        geom: offset_geometry(&src.geom, p.amount),
        transform: src.transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use pretty_assertions::assert_eq;

    fn run(kind: NodeKind, input: Option<&EvalResult>) -> Result<EvalResult, KernelError> {
        run_kernel(&kind, KernelInputs { input })
    }

    #[test]
    fn rect_bounds_ignore_rounding() {
        let params = RectParams {
            x: -20.0,
            y: 7.0,
            w: 64.0,
            h: 30.0,
            rx: 12.0,
            ry: Some(4.0),
        };
        let b = run(NodeKind::Rect(params), None).unwrap().geom.bounds().unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-20.0, 7.0, 44.0, 37.0));
    }

    #[test]
    fn unrounded_rect_is_straight() {
        let res = run(NodeKind::Rect(RectParams::default()), None).unwrap();
        let contour = &res.geom.contours[0];
        assert!(contour.closed);
        assert!(contour.knots.iter().all(|k| k.handle_in.is_none() && k.handle_out.is_none()));
        assert_eq!(res.transform, None);
    }

    #[test]
    fn rounded_rect_corner_handles() {
        let res = run(
            NodeKind::Rect(RectParams {
                rx: 8.0,
                ..Default::default()
            }),
            None,
        )
        .unwrap();
        let k1 = res.geom.contours[0].knots[1];
        assert_eq!(k1.pos, Point::new(100.0, 0.0));
        assert_eq!(k1.handle_in, Some(Vector::new(0.0, -8.0)));
        assert_eq!(k1.handle_out, Some(Vector::new(0.0, 8.0)));
    }

    #[test]
    fn ellipse_bounds_match_radii() {
        let params = EllipseParams {
            cx: 10.0,
            cy: -5.0,
            rx: 40.0,
            ry: Some(25.0),
        };
        let b = run(NodeKind::Ellipse(params), None).unwrap().geom.bounds().unwrap();
        for (got, want) in [(b.min_x, -30.0), (b.max_x, 50.0), (b.min_y, -30.0), (b.max_y, 20.0)] {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn ellipse_handles_scale_with_kappa() {
        let res = run(NodeKind::Ellipse(EllipseParams::default()), None).unwrap();
        let first = res.geom.contours[0].knots[0];
        assert_eq!(first.pos, Point::new(50.0, 0.0));
        assert_eq!(first.handle_out, Some(Vector::new(0.0, KAPPA * 50.0)));
    }

    #[test]
    fn transform_composes_after_upstream() {
        let rect = run(NodeKind::Rect(RectParams::default()), None).unwrap();
        let params = TransformParams {
            tx: 100.0,
            ty: 30.0,
            r: 45.0,
            ..Default::default()
        };
        let out = run(NodeKind::Transform(params), Some(&rect)).unwrap();
        assert_eq!(out.geom, rect.geom);
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let want = Matrix::new(h, h, -h, h, 100.0, 30.0);
        assert!(out.world_transform().approx_eq(&want, 1e-6), "{:?}", out.transform);

        let twice = run(NodeKind::Transform(params), Some(&out)).unwrap();
        let want = want.compose(params.to_matrix());
        assert!(twice.world_transform().approx_eq(&want, 1e-9));
    }

    #[test]
    fn offset_forwards_transform() {
        let mut src = run(NodeKind::Rect(RectParams::default()), None).unwrap();
        src.transform = Some(Matrix::from_translation(3.0, 4.0));
        let out = run(NodeKind::Offset(OffsetParams { amount: 2.0 }), Some(&src)).unwrap();
        assert_eq!(out.transform, src.transform);
    }

    #[test]
    fn modifiers_require_input() {
        let err = run(NodeKind::Transform(TransformParams::default()), None).unwrap_err();
        assert_eq!(
            err,
            KernelError::MissingInput {
                node_type: NodeType::Transform,
                port: Port::In,
            }
        );
        assert_eq!(err.to_string(), "Modifier.Transform requires an input on `in`");
        assert!(run(NodeKind::Offset(OffsetParams::default()), None).is_err());
    }
}
