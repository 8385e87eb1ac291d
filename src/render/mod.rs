//! Rendering primitives and host contracts.
//!
//! These types are backend-agnostic and describe how histogram layers talk
//! to a render backend: bars are retained primitives created once per
//! computation pass and restyled in place by later stages.

mod memory;

pub use memory::{MemoryBar, MemoryHost};

/// RGBA color in linear space.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
}

/// Retained bar primitive owned by a layer.
///
/// One primitive exists per bin. The computation stage creates primitives
/// with raw-count heights; the transform stage rescales them and the visual
/// stage restyles them without touching geometry.
pub trait BarPrimitive {
    /// Set the bar height in data units.
    fn set_height(&mut self, height: f64);
    /// Set the vertical position of the bar base in data units.
    fn set_base(&mut self, base: f64);
    /// Toggle bar visibility.
    fn set_visible(&mut self, visible: bool);
    /// Set the draw order relative to other layers.
    fn set_draw_order(&mut self, order: i32);
    /// Set the outline color; `None` draws no outline.
    fn set_edge_color(&mut self, color: Option<Color>);
    /// Set the fill color.
    fn set_fill_color(&mut self, color: Color);
    /// Set the fill opacity.
    fn set_opacity(&mut self, opacity: f32);
}

/// Render backend consumed by histogram layers.
pub trait RenderHost {
    /// Retained bar primitive type.
    type Bar: BarPrimitive;

    /// Create one bar per bin.
    ///
    /// `edges` holds the left edge of each bar, `heights` the initial bar
    /// heights, and `widths` the bar widths; all three have equal length.
    fn create_bars(&mut self, edges: &[f64], heights: &[f64], widths: &[f64]) -> Vec<Self::Bar>;

    /// Request a redraw.
    ///
    /// Callers coalesce stage-level redraws and invoke this at most once
    /// per update cycle; the backend may defer further.
    fn request_redraw(&mut self);
}
