//! Histogram layers and the staged recomputation pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};

use crate::axis::AxisScale;
use crate::data::{AttributeId, LayerSource, ResolveError};
use crate::dispatch::{Stage, StagePlan};
use crate::params::{BinningParams, LayerParams, ViewerParams};
use crate::range::Range;
use crate::render::{BarPrimitive, RenderHost};
use crate::snapshot::SnapshotCache;

static LAYER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Baseline for bar bases when the y axis is logarithmic; zero-height bars
/// degenerate in log space.
const LOG_BASELINE: f64 = 1e-100;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        Self(LAYER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-layer pipeline output.
///
/// `edges` has one more entry than `raw`; `scaled` matches `raw` once the
/// transform stage has run. The computation stage replaces the whole set
/// at once, so readers never observe a partial overwrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinArtifacts {
    edges: Vec<f64>,
    raw: Vec<f64>,
    scaled: Vec<f64>,
}

impl BinArtifacts {
    /// Bin edges, one more than the bin count.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Raw bin counts.
    pub fn raw_counts(&self) -> &[f64] {
        &self.raw
    }

    /// Transformed bin values.
    pub fn scaled(&self) -> &[f64] {
        &self.scaled
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.raw.len()
    }

    /// Check whether no geometry has been computed.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn clear(&mut self) {
        self.edges.clear();
        self.raw.clear();
        self.scaled.clear();
    }
}

/// One renderable histogram series bound to a data source and a parameter
/// set.
///
/// A layer reruns only the pipeline stages whose inputs changed since the
/// last update, determined by diffing snapshots of the shared and layer
/// parameter sets. Attribute-resolution failures degrade the layer to
/// rendering nothing; an incompatible attribute additionally disables the
/// layer until resolution succeeds again.
#[derive(Debug)]
pub struct HistogramLayer<B> {
    id: LayerId,
    source: LayerSource,
    params: LayerParams,
    enabled: bool,
    disabled_attribute: Option<AttributeId>,
    artifacts: BinArtifacts,
    bars: Vec<B>,
    local_range: Option<Range>,
    shared_cache: SnapshotCache,
    layer_cache: SnapshotCache,
}

impl<B: BarPrimitive> HistogramLayer<B> {
    /// Create a layer over a data source.
    pub(crate) fn new(source: LayerSource) -> Self {
        Self {
            id: LayerId::next(),
            source,
            params: LayerParams::default(),
            enabled: true,
            disabled_attribute: None,
            artifacts: BinArtifacts::default(),
            bars: Vec::new(),
            local_range: None,
            shared_cache: SnapshotCache::new(),
            layer_cache: SnapshotCache::new(),
        }
    }

    /// Access the layer identifier.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Access the layer source.
    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    /// Access the cosmetic parameters.
    pub fn params(&self) -> &LayerParams {
        &self.params
    }

    /// Access the cosmetic parameters mutably.
    pub fn params_mut(&mut self) -> &mut LayerParams {
        &mut self.params
    }

    /// Check whether the layer is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Attribute the layer was disabled for, if any.
    pub fn disabled_attribute(&self) -> Option<&AttributeId> {
        self.disabled_attribute.as_ref()
    }

    /// Access the pipeline artifacts.
    pub fn artifacts(&self) -> &BinArtifacts {
        &self.artifacts
    }

    /// Access the retained bar primitives.
    pub fn bars(&self) -> &[B] {
        &self.bars
    }

    /// The layer's own y extent, input to shared-range reconciliation.
    pub fn local_range(&self) -> Option<Range> {
        self.local_range
    }

    /// Clear stored snapshots so the next update diffs against nothing.
    ///
    /// Does not itself trigger a run.
    pub fn reset_cache(&mut self) {
        self.shared_cache.reset();
        self.layer_cache.reset();
    }

    /// Clear artifacts and drop retained primitives.
    pub(crate) fn detach(&mut self) {
        self.bars.clear();
        self.artifacts.clear();
    }

    /// Candidate for shared-range reconciliation.
    ///
    /// Disabled layers contribute nothing; their stale extent must not
    /// constrain the shared range.
    pub(crate) fn range_candidate(&self) -> Option<Range> {
        if self.enabled { self.local_range } else { None }
    }

    /// Run the change-detection-gated pipeline for this layer.
    ///
    /// Returns whether a stage requested a redraw.
    pub(crate) fn update<H>(&mut self, shared: &ViewerParams, host: &mut H, force: bool) -> bool
    where
        H: RenderHost<Bar = B>,
    {
        // Not ready: required binning parameters are missing. No stage
        // runs and the snapshot caches stay untouched.
        let Some(binning) = shared.binning() else {
            trace!("livehist: layer {:?} not ready, skipping update", self.id);
            return false;
        };

        let mut changed = self.shared_cache.detect(shared.snapshot());
        changed.union(self.layer_cache.detect(self.params.snapshot(&self.source)));

        let plan = StagePlan::plan(&changed, force);
        let mut needs_redraw = false;
        if plan.runs(Stage::Computation) {
            self.run_computation(&binning, host);
        }
        if plan.runs(Stage::Transform) && self.run_transform(shared) {
            needs_redraw = true;
        }
        if plan.runs(Stage::Visual) && self.run_visual() {
            needs_redraw = true;
        }
        needs_redraw
    }

    /// Computation stage: resolve the attribute and rebuild bin geometry.
    fn run_computation<H>(&mut self, binning: &BinningParams, host: &mut H)
    where
        H: RenderHost<Bar = B>,
    {
        self.detach();

        match self.source.data().resolve(&binning.attribute) {
            Ok(_) => self.enable(),
            Err(ResolveError::NotFound(_)) => {
                // Nothing to draw yet; not an error and not a disable.
                trace!(
                    "livehist: layer {:?}: attribute {} absent, rendering nothing",
                    self.id, binning.attribute
                );
                return;
            }
            Err(ResolveError::Incompatible(attribute)) => {
                self.disable_for(attribute);
                return;
            }
        }

        let scale = if binning.x_log {
            AxisScale::Log10
        } else {
            AxisScale::Linear
        };
        let Some(edges) = scale.edges(binning.range, binning.bins) else {
            warn!(
                "livehist: layer {:?}: range {:?} unusable on a log axis",
                self.id, binning.range
            );
            return;
        };
        let counts = match self.source.data().compute_histogram(
            &binning.attribute,
            binning.range,
            binning.bins,
            scale,
            self.source.filter(),
        ) {
            Ok(counts) => counts,
            Err(_) => {
                self.disable_for(binning.attribute.clone());
                return;
            }
        };

        let widths: Vec<f64> = edges.windows(2).map(|pair| pair[1] - pair[0]).collect();
        self.bars = host.create_bars(&edges[..binning.bins], &counts, &widths);
        self.artifacts = BinArtifacts {
            edges,
            raw: counts,
            scaled: Vec::new(),
        };
    }

    /// Transform stage: scale raw counts and derive the local y extent.
    ///
    /// Returns whether a local range was emitted. Empty or zero-sum counts
    /// are a no-op that preserves the previous local range.
    fn run_transform(&mut self, shared: &ViewerParams) -> bool {
        if self.artifacts.edges.is_empty() || self.artifacts.raw.is_empty() {
            return false;
        }
        let total: f64 = self.artifacts.raw.iter().sum();
        if total == 0.0 {
            return false;
        }

        let mut scaled = self.artifacts.raw.clone();
        // First bin width stands in for every bin; exact only for linear
        // edges.
        let width = self.artifacts.edges[1] - self.artifacts.edges[0];

        if shared.cumulative() {
            let mut running = 0.0;
            for value in &mut scaled {
                running += *value;
                *value = running;
            }
            if shared.normalize() {
                for value in &mut scaled {
                    *value /= running;
                }
            }
        } else if shared.normalize() {
            let denominator = total * width;
            if denominator == 0.0 {
                return false;
            }
            for value in &mut scaled {
                *value /= denominator;
            }
        }

        let baseline = if shared.y_log() { LOG_BASELINE } else { 0.0 };
        for (bar, &value) in self.bars.iter_mut().zip(&scaled) {
            bar.set_base(baseline);
            bar.set_height(value);
        }

        let peak = scaled.iter().copied().fold(0.0_f64, f64::max);
        let max = peak * if shared.y_log() { 2.0 } else { 1.2 };
        let min = if shared.y_log() {
            let smallest_positive = scaled
                .iter()
                .copied()
                .filter(|value| *value > 0.0)
                .fold(f64::INFINITY, f64::min);
            if !smallest_positive.is_finite() {
                return false;
            }
            smallest_positive / 10.0
        } else {
            0.0
        };

        self.artifacts.scaled = scaled;
        self.local_range = Some(Range::new(min, max));
        true
    }

    /// Visual stage: apply cosmetic attributes to existing geometry.
    ///
    /// Returns whether anything was applied; disabled layers are a no-op.
    fn run_visual(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        for bar in &mut self.bars {
            bar.set_visible(self.params.visible);
            bar.set_draw_order(self.params.draw_order);
            bar.set_edge_color(None);
            bar.set_fill_color(self.params.color);
            bar.set_opacity(self.params.opacity);
        }
        true
    }

    fn enable(&mut self) {
        if !self.enabled {
            debug!("livehist: layer {:?} re-enabled", self.id);
        }
        self.enabled = true;
        self.disabled_attribute = None;
    }

    fn disable_for(&mut self, attribute: AttributeId) {
        warn!(
            "livehist: layer {:?} disabled for attribute {}",
            self.id, attribute
        );
        self.enabled = false;
        self.disabled_attribute = Some(attribute);
    }
}
