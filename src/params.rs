//! Shared viewer parameters and per-layer cosmetic parameters.

use crate::data::{AttributeId, LayerSource};
use crate::range::Range;
use crate::reconcile::SharedRange;
use crate::render::Color;
use crate::snapshot::{ParamKey, ParamValue, Snapshot};

/// Parameters shared by every layer of a viewer.
///
/// Binning parameters start unset; the pipeline treats a viewer with any
/// of them missing as not ready and runs nothing. The reconciled shared
/// y-range lives here too but has no public mutator; it is derived from
/// layer output by reconciliation only.
#[derive(Debug, Clone, Default)]
pub struct ViewerParams {
    x_attribute: Option<AttributeId>,
    x_min: Option<f64>,
    x_max: Option<f64>,
    bin_count: Option<usize>,
    x_log: bool,
    y_log: bool,
    cumulative: bool,
    normalize: bool,
    shared_y: SharedRange,
}

impl ViewerParams {
    /// Create a parameter set with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute being binned.
    pub fn x_attribute(&self) -> Option<&AttributeId> {
        self.x_attribute.as_ref()
    }

    /// Set the attribute being binned.
    pub fn set_x_attribute(&mut self, attribute: AttributeId) {
        self.x_attribute = Some(attribute);
    }

    /// Lower binning bound.
    pub fn x_min(&self) -> Option<f64> {
        self.x_min
    }

    /// Upper binning bound.
    pub fn x_max(&self) -> Option<f64> {
        self.x_max
    }

    /// Set both binning bounds.
    pub fn set_x_range(&mut self, min: f64, max: f64) {
        self.x_min = Some(min);
        self.x_max = Some(max);
    }

    /// Number of bins.
    pub fn bin_count(&self) -> Option<usize> {
        self.bin_count
    }

    /// Set the number of bins.
    pub fn set_bin_count(&mut self, bins: usize) {
        self.bin_count = Some(bins);
    }

    /// Logarithmic x axis flag.
    pub fn x_log(&self) -> bool {
        self.x_log
    }

    /// Set the logarithmic x axis flag.
    pub fn set_x_log(&mut self, x_log: bool) {
        self.x_log = x_log;
    }

    /// Logarithmic y axis flag.
    pub fn y_log(&self) -> bool {
        self.y_log
    }

    /// Set the logarithmic y axis flag.
    pub fn set_y_log(&mut self, y_log: bool) {
        self.y_log = y_log;
    }

    /// Cumulative transform flag.
    pub fn cumulative(&self) -> bool {
        self.cumulative
    }

    /// Set the cumulative transform flag.
    pub fn set_cumulative(&mut self, cumulative: bool) {
        self.cumulative = cumulative;
    }

    /// Normalize transform flag.
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Set the normalize transform flag.
    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    /// Reconciled shared y-range.
    pub fn shared_range(&self) -> Option<Range> {
        self.shared_y.get()
    }

    /// Reconcile the shared range from per-layer candidates.
    pub(crate) fn reconcile_shared<I>(&mut self, candidates: I) -> bool
    where
        I: IntoIterator<Item = Option<Range>>,
    {
        self.shared_y.reconcile(candidates)
    }

    /// Binning parameters, if every required one is configured.
    pub(crate) fn binning(&self) -> Option<BinningParams> {
        let attribute = self.x_attribute.clone()?;
        let min = self.x_min?;
        let max = self.x_max?;
        let bins = self.bin_count.filter(|bins| *bins > 0)?;
        Some(BinningParams {
            attribute,
            range: Range::new(min, max),
            bins,
            x_log: self.x_log,
        })
    }

    /// Capture the shared parameters for diffing.
    pub(crate) fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            ParamKey::XAttribute,
            self.x_attribute
                .clone()
                .map_or(ParamValue::Unset, ParamValue::Attribute),
        );
        snapshot.insert(
            ParamKey::XMin,
            self.x_min.map_or(ParamValue::Unset, ParamValue::Float),
        );
        snapshot.insert(
            ParamKey::XMax,
            self.x_max.map_or(ParamValue::Unset, ParamValue::Float),
        );
        snapshot.insert(
            ParamKey::BinCount,
            self.bin_count.map_or(ParamValue::Unset, ParamValue::Count),
        );
        snapshot.insert(ParamKey::XLog, ParamValue::Flag(self.x_log));
        snapshot.insert(ParamKey::YLog, ParamValue::Flag(self.y_log));
        snapshot.insert(ParamKey::Cumulative, ParamValue::Flag(self.cumulative));
        snapshot.insert(ParamKey::Normalize, ParamValue::Flag(self.normalize));
        let shared = self.shared_y.get();
        snapshot.insert(
            ParamKey::SharedYMin,
            shared.map_or(ParamValue::Unset, |range| ParamValue::Float(range.min)),
        );
        snapshot.insert(
            ParamKey::SharedYMax,
            shared.map_or(ParamValue::Unset, |range| ParamValue::Float(range.max)),
        );
        snapshot
    }
}

/// Fully configured binning parameters with an order-normalized range.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BinningParams {
    /// Attribute being binned.
    pub attribute: AttributeId,
    /// Order-normalized binning range.
    pub range: Range,
    /// Number of bins, at least one.
    pub bins: usize,
    /// Logarithmic x axis flag.
    pub x_log: bool,
}

/// Cosmetic parameters owned by one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    /// Fill color.
    pub color: Color,
    /// Fill opacity.
    pub opacity: f32,
    /// Draw order relative to other layers.
    pub draw_order: i32,
    /// Layer visibility.
    pub visible: bool,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 1.0,
            draw_order: 0,
            visible: true,
        }
    }
}

impl LayerParams {
    /// Capture the layer parameters for diffing.
    pub(crate) fn snapshot(&self, source: &LayerSource) -> Snapshot {
        let mut snapshot = Snapshot::new();
        let (data, filter) = source.identity();
        snapshot.insert(ParamKey::Source, ParamValue::Source(data, filter));
        snapshot.insert(ParamKey::Color, ParamValue::Color(self.color));
        snapshot.insert(ParamKey::Opacity, ParamValue::Float(f64::from(self.opacity)));
        snapshot.insert(ParamKey::DrawOrder, ParamValue::Order(self.draw_order));
        snapshot.insert(ParamKey::Visible, ParamValue::Flag(self.visible));
        snapshot
    }
}
