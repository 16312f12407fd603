//! Evaluated graph → surface drawing commands.
//!
//! Only the draw order is painted. Upstream nodes show up solely through the
//! sinks that consume them.

use crate::config::{RenderStyle, Viewport};
use crate::path::{full_transform, to_affine, to_bez_path};
use crate::surface::Surface;
use knot_core::{Bounds, Document, EvalResults, NodeId, Overlays};
use kurbo::{Affine, Rect, Shape, Stroke};

/// Paint one frame.
///
/// Resizes the raster only when the target size changed, clears it, then
/// fills and strokes every sink with a result. Each node is drawn under
/// `device ∘ overlay ∘ node`. Selected nodes additionally get a dashed
/// device-space box around their transformed local bounds.
pub fn draw<S: Surface>(
    surface: &mut S,
    doc: &Document,
    results: &EvalResults,
    overlays: Option<&Overlays>,
    selected: &[NodeId],
    viewport: &Viewport,
    style: &RenderStyle,
) {
    let dpr = doc.meta().dpr;
    let target = viewport.raster_size(dpr);
    if surface.size() != target {
        surface.resize(target.0, target.1);
    }
    surface.clear();

    let stroke = Stroke::new(style.stroke_width);
    for &id in doc.draw_order() {
        let Some(result) = results.get(&id) else {
            continue;
        };
        let overlay = overlays.and_then(|o| o.get(&id));
        let full = full_transform(dpr, overlay, result.transform.as_ref());
        log::trace!("paint {id}: {:?}", full.as_coeffs());

        let path = to_bez_path(&result.geom);
        surface.set_transform(to_affine(&full));
        surface.fill(&path, style.fill);
        surface.stroke(&path, &stroke, style.stroke);

        if selected.contains(&id)
            && let Some(local) = result.geom.bounds()
        {
            paint_selection(surface, &local.transformed(&full), style);
        }
    }
}

/// Always axis-aligned in device space, even for rotated nodes.
fn paint_selection<S: Surface>(surface: &mut S, device: &Bounds, style: &RenderStyle) {
    let outline = Rect::new(device.min_x, device.min_y, device.max_x, device.max_y).to_path(0.1);
    let stroke = Stroke::new(style.selection_width).with_dashes(0.0, style.selection_dashes);
    surface.set_transform(Affine::IDENTITY);
    surface.stroke(&outline, &stroke, style.selection);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};
    use knot_core::{
        Matrix, Meta, Node, NodeKind, Port, RectParams, TransformParams, evaluate,
    };
    use pretty_assertions::assert_eq;

    fn doc_with_rotated_rect(dpr: f64) -> Document {
        let mut doc = Document::new(Meta { dpr });
        doc.add_node(Node::new(
            "p_rect",
            "Rect",
            NodeKind::Rect(RectParams {
                w: 10.0,
                h: 10.0,
                ..Default::default()
            }),
        ));
        doc.add_node(
            Node::new(
                "p_spin",
                "Transform",
                NodeKind::Transform(TransformParams {
                    r: 45.0,
                    ..Default::default()
                }),
            )
            .with_input(Port::In, "p_rect"),
        );
        doc
    }

    #[test]
    fn resizes_only_when_size_changes() {
        let doc = Document::new(Meta { dpr: 1.5 });
        let results = evaluate(&doc).unwrap();
        let mut surface = RecordingSurface::new(1, 1);
        let vp = Viewport::default();
        let style = RenderStyle::default();

        draw(&mut surface, &doc, &results, None, &[], &vp, &style);
        draw(&mut surface, &doc, &results, None, &[], &vp, &style);
        let resizes: Vec<_> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Resize { width, height } => Some((*width, *height)),
                _ => None,
            })
            .collect();
        assert_eq!(resizes, vec![(1200, 900)]);
    }

    #[test]
    fn sinks_are_filled_then_stroked() {
        let doc = doc_with_rotated_rect(2.0);
        let results = evaluate(&doc).unwrap();
        let mut surface = RecordingSurface::new(1600, 1200);
        draw(
            &mut surface,
            &doc,
            &results,
            None,
            &[],
            &Viewport::default(),
            &RenderStyle::default(),
        );
        let frame = surface.frame();
        assert_eq!(frame.len(), 2);
        let DrawCall::Fill { transform, .. } = &frame[0] else {
            panic!("expected fill first, got {:?}", frame[0]);
        };
        let want = Matrix::from_scale(2.0, 2.0).compose(Matrix::from_rotation(45f64.to_radians()));
        let got = transform.as_coeffs();
        assert!(
            got.iter().zip(want.as_coeffs()).all(|(g, w)| (g - w).abs() < 1e-9),
            "{got:?}"
        );
        assert!(matches!(frame[1], DrawCall::Stroke { .. }));
    }

    #[test]
    fn overlay_shifts_only_its_node() {
        let doc = doc_with_rotated_rect(1.0);
        let results = evaluate(&doc).unwrap();
        let mut overlays = Overlays::new();
        overlays.insert(NodeId::intern("p_spin"), Matrix::from_translation(30.0, 0.0));
        overlays.insert(NodeId::intern("p_rect"), Matrix::from_translation(999.0, 0.0));
        let mut surface = RecordingSurface::new(800, 600);
        draw(
            &mut surface,
            &doc,
            &results,
            Some(&overlays),
            &[],
            &Viewport::default(),
            &RenderStyle::default(),
        );
        let DrawCall::Fill { transform, .. } = &surface.frame()[0] else {
            panic!("expected a fill");
        };
        assert!((transform.as_coeffs()[4] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn selection_box_is_axis_aligned_in_device_space() {
        let doc = doc_with_rotated_rect(2.0);
        let results = evaluate(&doc).unwrap();
        let mut surface = RecordingSurface::new(1600, 1200);
        draw(
            &mut surface,
            &doc,
            &results,
            None,
            &[NodeId::intern("p_spin")],
            &Viewport::default(),
            &RenderStyle::default(),
        );
        let frame = surface.frame();
        assert_eq!(frame.len(), 3);
        let DrawCall::Stroke {
            transform,
            bounds,
            width,
            dashes,
            ..
        } = &frame[2]
        else {
            panic!("expected selection stroke");
        };
        assert_eq!(*transform, Affine::IDENTITY);
        assert_eq!(*width, 1.0);
        assert_eq!(dashes, &vec![4.0, 6.0]);
        // A 10×10 square rotated 45° spans 10√2 on each axis, doubled by dpr.
        let span = 20.0 * std::f64::consts::SQRT_2;
        assert!((bounds.width() - span).abs() < 1e-9, "{bounds:?}");
        assert!((bounds.height() - span).abs() < 1e-9, "{bounds:?}");
    }

    #[test]
    fn nodes_without_results_are_skipped() {
        let doc = doc_with_rotated_rect(1.0);
        let mut surface = RecordingSurface::new(800, 600);
        draw(
            &mut surface,
            &doc,
            &EvalResults::new(),
            None,
            &[],
            &Viewport::default(),
            &RenderStyle::default(),
        );
        assert!(surface.frame().is_empty());
    }
}
