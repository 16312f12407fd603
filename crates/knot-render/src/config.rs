use peniko::Color;

/// CSS-pixel size of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    /// Raster size for `dpr`: `ceil(css × dpr)` per axis, at least 1.
    pub fn raster_size(&self, dpr: f64) -> (u32, u32) {
        let px = |css: f64| (css * dpr).ceil().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

/// Placeholder paint used for every node until a real style system exists.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub fill: Color,
    pub stroke: Color,
    /// In each node's local units.
    pub stroke_width: f64,
    pub selection: Color,
    /// In device pixels.
    pub selection_width: f64,
    pub selection_dashes: [f64; 2],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            fill: Color::from_rgb8(255, 0, 0),
            stroke: Color::from_rgb8(0, 0, 255),
            stroke_width: 1.0,
            selection: Color::from_rgb8(0x03, 0x62, 0xfc),
            selection_width: 1.0,
            selection_dashes: [4.0, 6.0],
        }
    }
}
