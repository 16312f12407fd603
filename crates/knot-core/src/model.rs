//! Node model for the geometry graph.
//!
//! Every node carries a [`NodeKind`]: a closed set of type tags, each with its
//! own typed parameter record. Modifiers declare exactly one input port (`in`);
//! shapes declare none.

use crate::id::NodeId;
use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Ephemeral per-node transforms applied on top of committed geometry.
/// Never stored in a `Document`.
pub type Overlays = HashMap<NodeId, Matrix>;

// ─── Type tags & ports ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Rect,
    Ellipse,
    Transform,
    Offset,
}

impl NodeType {
    pub const fn tag(self) -> &'static str {
        match self {
            NodeType::Rect => "Shape.Rect",
            NodeType::Ellipse => "Shape.Ellipse",
            NodeType::Transform => "Modifier.Transform",
            NodeType::Offset => "Modifier.Offset",
        }
    }

    pub const fn is_modifier(self) -> bool {
        matches!(self, NodeType::Transform | NodeType::Offset)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named input slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    In,
}

impl Port {
    pub const fn name(self) -> &'static str {
        match self {
            Port::In => "in",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The source a port reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
}

// ─── Params ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectParams {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub rx: f64,
    /// Falls back to `rx` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
}

impl Default for RectParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 100.0,
            rx: 0.0,
            ry: None,
        }
    }
}

impl RectParams {
    pub fn ry(&self) -> f64 {
        self.ry.unwrap_or(self.rx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseParams {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    /// Falls back to `rx` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
}

impl Default for EllipseParams {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            rx: 50.0,
            ry: None,
        }
    }
}

impl EllipseParams {
    pub fn ry(&self) -> f64 {
        self.ry.unwrap_or(self.rx)
    }
}

/// Scale, rotation (degrees) and translation, applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    pub sx: f64,
    pub sy: f64,
    pub r: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            r: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

impl TransformParams {
    pub fn to_matrix(&self) -> Matrix {
        Matrix::IDENTITY
            .translate(self.tx, self.ty)
            .rotate(self.r.to_radians())
            .scale(self.sx, self.sy)
    }

    /// Decompose into translation, column lengths and the rotation of the
    /// first column. Shear is discarded, so this is only exact for matrices
    /// built by [`TransformParams::to_matrix`] with uniform scale, or with no
    /// rotation.
    pub fn from_matrix(m: &Matrix) -> Self {
        Self {
            sx: m.a.hypot(m.b),
            sy: m.c.hypot(m.d),
            r: m.b.atan2(m.a).to_degrees(),
            tx: m.e,
            ty: m.f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetParams {
    pub amount: f64,
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// Type tag plus typed params. Serializes as `{"type": ..., "params": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum NodeKind {
    #[serde(rename = "Shape.Rect")]
    Rect(RectParams),
    #[serde(rename = "Shape.Ellipse")]
    Ellipse(EllipseParams),
    #[serde(rename = "Modifier.Transform")]
    Transform(TransformParams),
    #[serde(rename = "Modifier.Offset")]
    Offset(OffsetParams),
}

impl NodeKind {
    pub const fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Rect(_) => NodeType::Rect,
            NodeKind::Ellipse(_) => NodeType::Ellipse,
            NodeKind::Transform(_) => NodeType::Transform,
            NodeKind::Offset(_) => NodeType::Offset,
        }
    }

    /// Declared input ports.
    pub const fn ports(&self) -> &'static [Port] {
        match self {
            NodeKind::Rect(_) | NodeKind::Ellipse(_) => &[],
            NodeKind::Transform(_) | NodeKind::Offset(_) => &[Port::In],
        }
    }

    pub fn declares(&self, port: Port) -> bool {
        self.ports().contains(&port)
    }
}

// ─── Node ────────────────────────────────────────────────────────────────

/// One vertex of the geometry graph, in the host-facing descriptor shape
/// `{id, name, type, params, inputs}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Declared port → source. `None` is an unconnected port.
    #[serde(default)]
    pub inputs: BTreeMap<Port, Option<PortRef>>,
}

impl Node {
    /// A node with every declared port present but unconnected.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        let inputs = kind.ports().iter().map(|p| (*p, None)).collect();
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            inputs,
        }
    }

    /// Builder: connect `port` to `source`.
    #[must_use]
    pub fn with_input(mut self, port: Port, source: impl Into<NodeId>) -> Self {
        self.inputs.insert(
            port,
            Some(PortRef {
                node: source.into(),
            }),
        );
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Source connected to `port`, if any.
    pub fn input(&self, port: Port) -> Option<NodeId> {
        self.inputs.get(&port).copied().flatten().map(|r| r.node)
    }

    /// Every connected source, in port order.
    pub fn dependencies(&self) -> impl Iterator<Item = (Port, NodeId)> + '_ {
        self.inputs
            .iter()
            .filter_map(|(port, src)| src.map(|r| (*port, r.node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_shape_conventions() {
        let r = RectParams::default();
        assert_eq!((r.w, r.h, r.rx, r.ry()), (100.0, 100.0, 0.0, 0.0));
        let e = EllipseParams {
            rx: 20.0,
            ..Default::default()
        };
        assert_eq!(e.ry(), 20.0);
        assert!(TransformParams::default().to_matrix().is_identity());
    }

    #[test]
    fn modifiers_declare_one_port() {
        let xf = Node::new("xf", "Transform", NodeKind::Transform(TransformParams::default()));
        assert_eq!(xf.inputs.len(), 1);
        assert_eq!(xf.input(Port::In), None);

        let rect = Node::new("r", "Rect", NodeKind::Rect(RectParams::default()));
        assert!(rect.inputs.is_empty());
        assert!(!rect.kind.declares(Port::In));
    }

    #[test]
    fn dependencies_skip_unconnected_ports() {
        let off = Node::new("o", "Offset", NodeKind::Offset(OffsetParams { amount: 4.0 }));
        assert_eq!(off.dependencies().count(), 0);
        let off = off.with_input(Port::In, "r");
        let deps: Vec<_> = off.dependencies().collect();
        assert_eq!(deps, vec![(Port::In, NodeId::intern("r"))]);
    }

    #[test]
    fn transform_params_roundtrip_without_shear() {
        let params = TransformParams {
            sx: 2.0,
            sy: 2.0,
            r: 30.0,
            tx: 15.0,
            ty: -8.0,
        };
        let back = TransformParams::from_matrix(&params.to_matrix());
        assert!((back.sx - 2.0).abs() < 1e-9);
        assert!((back.sy - 2.0).abs() < 1e-9);
        assert!((back.r - 30.0).abs() < 1e-9);
        assert_eq!((back.tx, back.ty), (15.0, -8.0));
    }

    #[test]
    fn decomposition_drops_shear() {
        // Non-uniform scale followed by rotation leaves shear in the product.
        let sheared = Matrix::from_rotation(0.5).compose(Matrix::from_scale(3.0, 1.0));
        let skewed = Matrix::from_scale(1.0, 2.0).compose(sheared);
        let rebuilt = TransformParams::from_matrix(&skewed).to_matrix();
        assert!(!rebuilt.approx_eq(&skewed, 1e-6));
    }

    #[test]
    fn type_tags_display() {
        assert_eq!(NodeType::Transform.to_string(), "Modifier.Transform");
        assert!(NodeType::Offset.is_modifier());
        assert!(!NodeType::Ellipse.is_modifier());
        assert_eq!(Port::In.to_string(), "in");
    }
}
