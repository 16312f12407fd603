//! Drawing surfaces.
//!
//! A [`Surface`] holds an active transform and a backing raster size. Paths
//! are given in local coordinates and mapped by the active transform, both
//! when painting and when testing points. Point tests default to a geometric
//! implementation, so a surface only has to paint.

use kurbo::{Affine, BezPath, ParamCurveNearest, PathEl, Point, Shape, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

/// Accuracy for nearest-point queries in stroke hit tests.
const NEAREST_ACCURACY: f64 = 1e-6;

pub trait Surface {
    /// Backing raster size in device pixels.
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);

    fn set_transform(&mut self, transform: Affine);
    fn transform(&self) -> Affine;

    fn fill(&mut self, path: &BezPath, color: Color);
    fn stroke(&mut self, path: &BezPath, style: &Stroke, color: Color);

    /// Whether the device-space `pt` lies inside `path` under the active
    /// transform (nonzero winding).
    fn is_point_in_fill(&self, path: &BezPath, pt: Point) -> bool {
        fill_contains(path, self.transform(), pt)
    }

    /// Whether the device-space `pt` lies on the stroke of `path` under the
    /// active transform.
    fn is_point_in_stroke(&self, path: &BezPath, style: &Stroke, pt: Point) -> bool {
        stroke_contains(path, self.transform(), style.width, pt)
    }
}

// ─── Geometric point tests ───────────────────────────────────────────────

fn to_local(transform: Affine, pt: Point) -> Option<Point> {
    if transform.determinant().abs() < f64::EPSILON {
        return None;
    }
    Some(transform.inverse() * pt)
}

/// Open subpaths fill as if closed.
fn close_subpaths(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut open = false;
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                if open {
                    out.close_path();
                }
                open = true;
            }
            PathEl::ClosePath => open = false,
            _ => {}
        }
        out.push(*el);
    }
    if open {
        out.close_path();
    }
    out
}

pub fn fill_contains(path: &BezPath, transform: Affine, pt: Point) -> bool {
    to_local(transform, pt).is_some_and(|local| close_subpaths(path).winding(local) != 0)
}

/// Within half the line width of some segment, measured in local space.
pub fn stroke_contains(path: &BezPath, transform: Affine, width: f64, pt: Point) -> bool {
    let Some(local) = to_local(transform, pt) else {
        return false;
    };
    let reach = (width / 2.0).powi(2);
    path.segments()
        .any(|seg| seg.nearest(local, NEAREST_ACCURACY).distance_sq <= reach)
}

// ─── Vello ───────────────────────────────────────────────────────────────

/// Records paint operations into a `vello::Scene`; the host renders and
/// presents the scene.
pub struct VelloSurface {
    scene: Scene,
    width: u32,
    height: u32,
    transform: Affine,
}

impl VelloSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scene: Scene::new(),
            width,
            height,
            transform: Affine::IDENTITY,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Surface for VelloSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("vello surface: resize {width}x{height}");
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.scene.reset();
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        self.scene
            .fill(Fill::NonZero, self.transform, color, None, path);
    }

    fn stroke(&mut self, path: &BezPath, style: &Stroke, color: Color) {
        self.scene.stroke(style, self.transform, color, None, path);
    }
}

// ─── Recording ───────────────────────────────────────────────────────────

/// One operation seen by a [`RecordingSurface`].
#[derive(Debug, Clone)]
pub enum DrawCall {
    Resize {
        width: u32,
        height: u32,
    },
    Clear,
    Fill {
        transform: Affine,
        /// Local-space bounding box of the path.
        bounds: kurbo::Rect,
        color: Color,
    },
    Stroke {
        transform: Affine,
        bounds: kurbo::Rect,
        width: f64,
        dashes: Vec<f64>,
        color: Color,
    },
}

/// Headless surface that logs every call. Useful for hosts without a GPU and
/// for asserting on paint output.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
    width: u32,
    height: u32,
    transform: Affine,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            width,
            height,
            transform: Affine::IDENTITY,
        }
    }

    /// Calls since the most recent `clear`.
    pub fn frame(&self) -> &[DrawCall] {
        let start = self
            .calls
            .iter()
            .rposition(|c| matches!(c, DrawCall::Clear))
            .map_or(0, |i| i + 1);
        &self.calls[start..]
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.calls.push(DrawCall::Resize { width, height });
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        self.calls.push(DrawCall::Fill {
            transform: self.transform,
            bounds: path.bounding_box(),
            color,
        });
    }

    fn stroke(&mut self, path: &BezPath, style: &Stroke, color: Color) {
        self.calls.push(DrawCall::Stroke {
            transform: self.transform,
            bounds: path.bounding_box(),
            width: style.width,
            dashes: style.dash_pattern.to_vec(),
            color,
        });
    }
}
