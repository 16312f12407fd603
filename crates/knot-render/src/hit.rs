//! Hit testing: point → node lookup.
//!
//! Reverse-walks the draw order (last painted = topmost) and tests the point
//! against each sink's committed geometry. Overlays are ignored.

use crate::config::RenderStyle;
use crate::path::{full_transform, to_affine, to_bez_path};
use crate::surface::Surface;
use knot_core::{Document, EvalResults, NodeId};
use kurbo::{Point, Stroke};

/// Find the topmost node at CSS-pixel position `(x, y)`.
/// Returns `None` if no node is hit (background).
pub fn hit_test<S: Surface>(
    surface: &mut S,
    doc: &Document,
    results: &EvalResults,
    style: &RenderStyle,
    x: f64,
    y: f64,
) -> Option<NodeId> {
    let dpr = doc.meta().dpr;
    let pt = Point::new(x * dpr, y * dpr);
    let stroke = Stroke::new(style.stroke_width);

    for &id in doc.draw_order().iter().rev() {
        let Some(result) = results.get(&id) else {
            continue;
        };
        let full = full_transform(dpr, None, result.transform.as_ref());
        let path = to_bez_path(&result.geom);
        surface.set_transform(to_affine(&full));
        let hit = surface.is_point_in_fill(&path, pt) || surface.is_point_in_stroke(&path, &stroke, pt);
        log::trace!("hit test {id} at ({x}, {y}): {hit}");
        if hit {
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use knot_core::{Meta, Node, NodeKind, Port, RectParams, TransformParams, evaluate};

    fn rect(id: &str, x: f64, y: f64, size: f64) -> Node {
        Node::new(
            id,
            "Rect",
            NodeKind::Rect(RectParams {
                x,
                y,
                w: size,
                h: size,
                ..Default::default()
            }),
        )
    }

    fn hit(doc: &Document, x: f64, y: f64) -> Option<NodeId> {
        let results = evaluate(doc).unwrap();
        let mut surface = RecordingSurface::new(800, 600);
        hit_test(&mut surface, doc, &results, &RenderStyle::default(), x, y)
    }

    #[test]
    fn hit_test_basic() {
        let mut doc = Document::default();
        doc.add_node(rect("h_a", 10.0, 10.0, 100.0));
        doc.add_node(rect("h_b", 200.0, 200.0, 50.0));
        assert_eq!(hit(&doc, 15.0, 15.0), Some(NodeId::intern("h_a")));
        assert_eq!(hit(&doc, 220.0, 220.0), Some(NodeId::intern("h_b")));
        assert_eq!(hit(&doc, 799.0, 599.0), None);
    }

    #[test]
    fn topmost_wins() {
        let mut doc = Document::default();
        doc.add_node(rect("h_under", 0.0, 0.0, 100.0));
        doc.add_node(rect("h_over", 50.0, 50.0, 100.0));
        assert_eq!(hit(&doc, 75.0, 75.0), Some(NodeId::intern("h_over")));
        doc.set_draw_order(vec![NodeId::intern("h_over"), NodeId::intern("h_under")]);
        assert_eq!(hit(&doc, 75.0, 75.0), Some(NodeId::intern("h_under")));
    }

    #[test]
    fn stroke_counts_just_outside_fill() {
        let mut doc = Document::default();
        doc.add_node(rect("h_edge", 0.0, 0.0, 10.0));
        assert_eq!(hit(&doc, 10.4, 5.0), Some(NodeId::intern("h_edge")));
        assert_eq!(hit(&doc, 10.6, 5.0), None);
    }

    #[test]
    fn follows_node_transform_and_dpr() {
        let mut doc = Document::new(Meta { dpr: 2.0 });
        doc.add_node(rect("h_src", 0.0, 0.0, 10.0));
        doc.add_node(
            Node::new(
                "h_moved",
                "Transform",
                NodeKind::Transform(TransformParams {
                    tx: 300.0,
                    ..Default::default()
                }),
            )
            .with_input(Port::In, "h_src"),
        );
        // CSS coordinates, scaled by dpr internally.
        assert_eq!(hit(&doc, 305.0, 5.0), Some(NodeId::intern("h_moved")));
        assert_eq!(hit(&doc, 5.0, 5.0), None);
    }
}
