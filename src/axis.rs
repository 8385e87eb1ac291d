//! Axis scaling and bin-edge generation.

use crate::range::Range;

/// Axis scale type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    /// Linear scaling.
    Linear,
    /// Base-10 logarithmic scaling.
    Log10,
}

impl AxisScale {
    /// Map a value into axis space.
    pub fn map_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Linear => Some(value),
            Self::Log10 => {
                if value <= 0.0 {
                    None
                } else {
                    Some(value.log10())
                }
            }
        }
    }

    /// Invert a value from axis space back into data space.
    pub fn invert_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Linear => Some(value),
            Self::Log10 => Some(10_f64.powf(value)),
        }
    }

    /// Check whether a data range is usable for this scale.
    pub fn is_range_valid(self, range: Range) -> bool {
        if !range.is_finite() {
            return false;
        }
        match self {
            Self::Linear => true,
            Self::Log10 => range.min > 0.0 && range.max > 0.0,
        }
    }

    /// Generate `bins + 1` bin edges across the range.
    ///
    /// Edges are evenly spaced in mapped axis space, so `Linear` yields
    /// linearly spaced edges and `Log10` yields log-spaced edges. The first
    /// and last edges equal the range bounds exactly. Returns `None` when
    /// the range cannot be mapped (non-positive bound on a log scale) or
    /// `bins` is zero.
    pub fn edges(self, range: Range, bins: usize) -> Option<Vec<f64>> {
        if bins == 0 {
            return None;
        }
        let lo = self.map_value(range.min)?;
        let hi = self.map_value(range.max)?;
        let mut edges = Vec::with_capacity(bins + 1);
        for i in 0..=bins {
            let edge = if i == 0 {
                range.min
            } else if i == bins {
                range.max
            } else {
                let t = i as f64 / bins as f64;
                self.invert_value(lo + (hi - lo) * t)?
            };
            edges.push(edge);
        }
        Some(edges)
    }
}
