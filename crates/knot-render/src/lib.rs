pub mod config;
pub mod hit;
pub mod paint;
pub mod path;
pub mod surface;

pub use config::{RenderStyle, Viewport};
pub use surface::{DrawCall, RecordingSurface, Surface, VelloSurface};

use knot_core::{Document, EvalResults, NodeId, Overlays};

/// A surface plus the settings needed to paint and pick on it.
pub struct Renderer<S: Surface> {
    surface: S,
    viewport: Viewport,
    style: RenderStyle,
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: S, viewport: Viewport) -> Self {
        Self {
            surface,
            viewport,
            style: RenderStyle::default(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn draw(
        &mut self,
        doc: &Document,
        results: &EvalResults,
        overlays: Option<&Overlays>,
        selected: &[NodeId],
    ) {
        paint::draw(
            &mut self.surface,
            doc,
            results,
            overlays,
            selected,
            &self.viewport,
            &self.style,
        );
    }

    /// `x`, `y` are CSS pixels.
    pub fn hit_test(&mut self, doc: &Document, results: &EvalResults, x: f64, y: f64) -> Option<NodeId> {
        hit::hit_test(&mut self.surface, doc, results, &self.style, x, y)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Takes effect on the next draw.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
