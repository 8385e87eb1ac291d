//! livehist incrementally maintains histogram layers for interactive
//! viewers. Parameter changes are diffed against the last observed state
//! and only the pipeline stages whose inputs changed rerun; the display
//! range shared across layers is reconciled from per-layer extents.

#![forbid(unsafe_code)]

pub mod axis;
pub mod data;
pub mod dispatch;
pub mod layer;
pub mod params;
pub mod range;
pub mod reconcile;
pub mod render;
pub mod snapshot;
pub mod viewer;

pub use axis::AxisScale;
pub use data::{
    AttributeId, DataId, DataSource, FilterId, LayerSource, ResolveError, RowFilter, TableSource,
};
pub use dispatch::{Stage, StagePlan};
pub use layer::{BinArtifacts, HistogramLayer, LayerId};
pub use params::{LayerParams, ViewerParams};
pub use range::Range;
pub use reconcile::SharedRange;
pub use render::{BarPrimitive, Color, MemoryBar, MemoryHost, RenderHost};
pub use snapshot::{ChangeSet, ParamKey, ParamValue, Snapshot, SnapshotCache};
pub use viewer::HistogramViewer;
