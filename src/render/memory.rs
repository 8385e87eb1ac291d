//! In-memory render host for tests and headless pipelines.

use crate::render::{BarPrimitive, Color, RenderHost};

/// Bar primitive that retains its state for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBar {
    /// Left edge position in data units.
    pub x: f64,
    /// Bar width in data units.
    pub width: f64,
    /// Bar height in data units.
    pub height: f64,
    /// Vertical position of the bar base.
    pub base: f64,
    /// Visibility flag.
    pub visible: bool,
    /// Draw order.
    pub draw_order: i32,
    /// Outline color, if any.
    pub edge_color: Option<Color>,
    /// Fill color.
    pub fill_color: Color,
    /// Fill opacity.
    pub opacity: f32,
}

impl BarPrimitive for MemoryBar {
    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn set_base(&mut self, base: f64) {
        self.base = base;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_draw_order(&mut self, order: i32) {
        self.draw_order = order;
    }

    fn set_edge_color(&mut self, color: Option<Color>) {
        self.edge_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}

/// Render host that records creation and redraw traffic.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    create_calls: usize,
    redraw_requests: usize,
}

impl MemoryHost {
    /// Create a new host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bar-creation calls issued so far.
    pub fn create_calls(&self) -> usize {
        self.create_calls
    }

    /// Number of redraw requests issued so far.
    pub fn redraw_requests(&self) -> usize {
        self.redraw_requests
    }
}

impl RenderHost for MemoryHost {
    type Bar = MemoryBar;

    fn create_bars(&mut self, edges: &[f64], heights: &[f64], widths: &[f64]) -> Vec<MemoryBar> {
        self.create_calls += 1;
        edges
            .iter()
            .zip(heights)
            .zip(widths)
            .map(|((&x, &height), &width)| MemoryBar {
                x,
                width,
                height,
                base: 0.0,
                visible: true,
                draw_order: 0,
                edge_color: None,
                fill_color: Color::BLACK,
                opacity: 1.0,
            })
            .collect()
    }

    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
    }
}
