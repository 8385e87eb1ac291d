//! Viewer-level orchestration of layers, reconciliation, and redraw.

use crate::data::LayerSource;
use crate::layer::{HistogramLayer, LayerId};
use crate::params::ViewerParams;
use crate::range::Range;
use crate::render::RenderHost;

/// A set of histogram layers sharing one parameter set and render host.
///
/// All recomputation is synchronous: `update` runs one change-gated pass
/// over every layer, reconciles the shared y-range, and runs exactly one
/// more pass only when the reconciled value actually changed, so layers
/// observe the write. The second pass cannot write again (the shared-range
/// keys belong to no stage's sensitivity set), which bounds re-entrant
/// notification by construction. Redraw requests from stages are coalesced
/// into at most one host request per call.
#[derive(Debug)]
pub struct HistogramViewer<H: RenderHost> {
    params: ViewerParams,
    layers: Vec<HistogramLayer<H::Bar>>,
    host: H,
}

impl<H: RenderHost> HistogramViewer<H> {
    /// Create a viewer with no layers.
    pub fn new(host: H) -> Self {
        Self {
            params: ViewerParams::new(),
            layers: Vec::new(),
            host,
        }
    }

    /// Access the shared parameters.
    pub fn params(&self) -> &ViewerParams {
        &self.params
    }

    /// Access the shared parameters mutably.
    ///
    /// Mutations take effect on the next [`update`](Self::update) call.
    pub fn params_mut(&mut self) -> &mut ViewerParams {
        &mut self.params
    }

    /// Access the render host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Access all layers.
    pub fn layers(&self) -> &[HistogramLayer<H::Bar>] {
        &self.layers
    }

    /// Access a layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&HistogramLayer<H::Bar>> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    /// Access a layer mutably by id.
    ///
    /// Mutations take effect on the next [`update`](Self::update) call.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut HistogramLayer<H::Bar>> {
        self.layers.iter_mut().find(|layer| layer.id() == id)
    }

    /// Attach a data source as a new layer.
    ///
    /// The layer starts with empty snapshot caches, so its first update,
    /// forced or not, runs the full pipeline once parameters are ready.
    pub fn add_layer(&mut self, source: LayerSource) -> LayerId {
        let layer = HistogramLayer::new(source);
        let id = layer.id();
        self.layers.push(layer);
        id
    }

    /// Detach a layer, dropping its artifacts and primitives.
    ///
    /// The shared range is re-derived from the remaining layers, so
    /// removing the layer that held the widest extent shrinks it.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(index) = self.layers.iter().position(|layer| layer.id() == id) else {
            return false;
        };
        let mut removed = self.layers.remove(index);
        removed.detach();
        if self.reconcile() {
            for layer in &mut self.layers {
                let _ = layer.update(&self.params, &mut self.host, false);
            }
        }
        self.host.request_redraw();
        true
    }

    /// Run the pipeline across all layers.
    ///
    /// With `force` set every stage of every layer reruns; otherwise each
    /// layer reruns only the stages its changed parameters select.
    pub fn update(&mut self, force: bool) {
        let mut needs_redraw = false;
        let mut force = force;
        // One pass, plus at most one more if reconciliation wrote.
        for _ in 0..2 {
            for layer in &mut self.layers {
                needs_redraw |= layer.update(&self.params, &mut self.host, force);
            }
            if !self.reconcile() {
                break;
            }
            force = false;
        }
        if needs_redraw {
            self.host.request_redraw();
        }
    }

    /// Clear every layer's stored snapshots.
    ///
    /// Does not itself trigger a run; the next gated update diffs against
    /// nothing and therefore runs the full pipeline.
    pub fn reset_cache(&mut self) {
        for layer in &mut self.layers {
            layer.reset_cache();
        }
    }

    /// Current candidates for the shared range, enabled layers only.
    pub fn range_candidates(&self) -> impl Iterator<Item = Option<Range>> + '_ {
        self.layers.iter().map(HistogramLayer::range_candidate)
    }

    fn reconcile(&mut self) -> bool {
        let candidates: Vec<Option<Range>> = self
            .layers
            .iter()
            .map(HistogramLayer::range_candidate)
            .collect();
        self.params.reconcile_shared(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisScale;
    use crate::data::{
        AttributeId, DataId, DataSource, LayerSource, ResolveError, RowFilter, TableSource,
    };
    use crate::render::MemoryHost;
    use std::cell::Cell;
    use std::sync::Arc;

    fn table(values: Vec<f64>) -> Arc<TableSource> {
        Arc::new(TableSource::new("test").with_column(AttributeId::new("x"), values))
    }

    fn configured_viewer() -> HistogramViewer<MemoryHost> {
        let mut viewer = HistogramViewer::new(MemoryHost::new());
        viewer.params_mut().set_x_attribute(AttributeId::new("x"));
        viewer.params_mut().set_x_range(0.0, 4.0);
        viewer.params_mut().set_bin_count(4);
        viewer
    }

    #[test]
    fn forced_update_twice_is_idempotent() {
        let mut viewer = configured_viewer();
        let id = viewer.add_layer(LayerSource::Full(table(vec![0.5, 1.5, 1.5, 3.5])));
        viewer.update(true);
        let first = viewer.layer(id).unwrap().artifacts().clone();
        let first_shared = viewer.params().shared_range();
        viewer.update(true);
        let second = viewer.layer(id).unwrap().artifacts();
        assert_eq!(&first, second);
        assert_eq!(first_shared, viewer.params().shared_range());
    }

    #[test]
    fn shared_range_spans_all_layers() {
        let mut viewer = configured_viewer();
        viewer.add_layer(LayerSource::Full(table(vec![0.5; 5])));
        viewer.add_layer(LayerSource::Full(table(vec![1.5; 10])));
        viewer.update(true);
        // Peaks 5 and 10, linear headroom 1.2.
        assert_eq!(
            viewer.params().shared_range(),
            Some(Range::new(0.0, 12.0))
        );
    }

    #[test]
    fn update_coalesces_redraw_requests() {
        let mut viewer = configured_viewer();
        viewer.add_layer(LayerSource::Full(table(vec![0.5, 1.5])));
        viewer.add_layer(LayerSource::Full(table(vec![2.5, 3.5])));
        viewer.update(true);
        assert_eq!(viewer.host().redraw_requests(), 1);
    }

    #[test]
    fn clean_update_runs_and_redraws_nothing() {
        let mut viewer = configured_viewer();
        viewer.add_layer(LayerSource::Full(table(vec![0.5, 1.5])));
        viewer.update(true);
        let creates = viewer.host().create_calls();
        let redraws = viewer.host().redraw_requests();
        viewer.update(false);
        assert_eq!(viewer.host().create_calls(), creates);
        assert_eq!(viewer.host().redraw_requests(), redraws);
    }

    #[test]
    fn cosmetic_change_skips_recomputation_but_redraws() {
        let mut viewer = configured_viewer();
        let id = viewer.add_layer(LayerSource::Full(table(vec![0.5, 1.5])));
        viewer.update(true);
        let creates = viewer.host().create_calls();
        let redraws = viewer.host().redraw_requests();

        viewer.layer_mut(id).unwrap().params_mut().visible = false;
        viewer.update(false);
        assert_eq!(viewer.host().create_calls(), creates);
        assert_eq!(viewer.host().redraw_requests(), redraws + 1);
        assert!(!viewer.layer(id).unwrap().bars()[0].visible);
    }

    #[test]
    fn binning_change_rebuilds_geometry() {
        let mut viewer = configured_viewer();
        let id = viewer.add_layer(LayerSource::Full(table(vec![0.5, 1.5])));
        viewer.update(true);
        let creates = viewer.host().create_calls();

        viewer.params_mut().set_bin_count(8);
        viewer.update(false);
        assert_eq!(viewer.host().create_calls(), creates + 1);
        assert_eq!(viewer.layer(id).unwrap().artifacts().bin_count(), 8);
    }

    #[test]
    fn removing_widest_layer_shrinks_shared_range() {
        let mut viewer = configured_viewer();
        viewer.add_layer(LayerSource::Full(table(vec![0.5; 5])));
        let wide = viewer.add_layer(LayerSource::Full(table(vec![1.5; 10])));
        viewer.update(true);
        assert_eq!(
            viewer.params().shared_range(),
            Some(Range::new(0.0, 12.0))
        );

        assert!(viewer.remove_layer(wide));
        assert_eq!(viewer.params().shared_range(), Some(Range::new(0.0, 6.0)));
        assert!(viewer.layer(wide).is_none());
    }

    #[test]
    fn filtered_layer_contributes_subset_range() {
        let mut viewer = configured_viewer();
        let data = table(vec![0.5, 0.5, 0.5, 1.5, 1.5, 2.5]);
        viewer.add_layer(LayerSource::Filtered {
            data,
            filter: RowFilter::new(|_, value| value < 2.0),
        });
        viewer.update(true);
        // Filtered counts [3, 2, 0, 0], peak 3.
        let shared = viewer.params().shared_range().unwrap();
        assert_eq!(shared.min, 0.0);
        assert!((shared.max - 3.6).abs() < 1e-9);
    }

    #[test]
    fn not_ready_viewer_touches_nothing() {
        let mut viewer = HistogramViewer::new(MemoryHost::new());
        viewer.add_layer(LayerSource::Full(table(vec![0.5])));
        viewer.update(true);
        assert_eq!(viewer.host().create_calls(), 0);
        assert_eq!(viewer.host().redraw_requests(), 0);
        assert!(viewer.params().shared_range().is_none());
    }

    #[test]
    fn reset_cache_forces_full_diff_on_next_update() {
        let mut viewer = configured_viewer();
        viewer.add_layer(LayerSource::Full(table(vec![0.5, 1.5])));
        viewer.update(true);
        let creates = viewer.host().create_calls();

        viewer.reset_cache();
        assert_eq!(viewer.host().create_calls(), creates);

        viewer.update(false);
        assert_eq!(viewer.host().create_calls(), creates + 1);
    }

    /// Source whose attribute resolves only while a switch is on.
    #[derive(Debug)]
    struct SwitchedSource {
        id: DataId,
        available: Cell<bool>,
        values: Vec<f64>,
    }

    impl SwitchedSource {
        fn new(values: Vec<f64>) -> Self {
            Self {
                id: DataId::next(),
                available: Cell::new(false),
                values,
            }
        }
    }

    impl DataSource for SwitchedSource {
        fn data_id(&self) -> DataId {
            self.id
        }

        fn resolve(&self, attribute: &AttributeId) -> Result<&[f64], ResolveError> {
            if self.available.get() {
                Ok(&self.values)
            } else {
                Err(ResolveError::Incompatible(attribute.clone()))
            }
        }

        fn compute_histogram(
            &self,
            attribute: &AttributeId,
            range: Range,
            bins: usize,
            scale: AxisScale,
            filter: Option<&RowFilter>,
        ) -> Result<Vec<f64>, ResolveError> {
            let column = self.resolve(attribute)?;
            let mut counts = vec![0.0; bins];
            let (Some(lo), Some(hi)) = (scale.map_value(range.min), scale.map_value(range.max))
            else {
                return Ok(counts);
            };
            for (row, &value) in column.iter().enumerate() {
                if let Some(filter) = filter
                    && !filter.accepts(row, value)
                {
                    continue;
                }
                let Some(mapped) = scale.map_value(value) else {
                    continue;
                };
                if mapped < lo || mapped > hi {
                    continue;
                }
                let index = (((mapped - lo) / (hi - lo) * bins as f64) as usize).min(bins - 1);
                counts[index] += 1.0;
            }
            Ok(counts)
        }
    }

    #[test]
    fn layer_disables_then_re_enables_with_attribute() {
        let source = Arc::new(SwitchedSource::new(vec![0.5, 1.5, 2.5]));
        let mut viewer = configured_viewer();
        let steady = viewer.add_layer(LayerSource::Full(table(vec![0.5; 5])));
        let flaky = viewer.add_layer(LayerSource::Full(source.clone()));

        viewer.update(true);
        assert!(!viewer.layer(flaky).unwrap().is_enabled());
        assert!(viewer.layer(flaky).unwrap().artifacts().is_empty());
        // The disabled layer must not constrain the shared range.
        assert_eq!(
            viewer.params().shared_range(),
            Some(Range::new(0.0, 6.0))
        );
        assert!(viewer.layer(steady).unwrap().is_enabled());

        source.available.set(true);
        viewer.update(true);
        let restored = viewer.layer(flaky).unwrap();
        assert!(restored.is_enabled());
        assert!(restored.disabled_attribute().is_none());
        assert_eq!(restored.artifacts().bin_count(), 4);
        assert!(!restored.artifacts().is_empty());
    }
}
