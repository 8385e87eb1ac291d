//! Data sources and attribute resolution.
//!
//! A data source exposes named numeric attributes and a histogram routine
//! over them. Layers reference a source either whole or through a row
//! filter; the computation stage consumes both shapes uniformly.

mod table;

pub use table::TableSource;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::axis::AxisScale;
use crate::range::Range;

static DATA_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static FILTER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataId(u64);

impl DataId {
    /// Allocate the next data source identifier.
    pub fn next() -> Self {
        Self(DATA_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Unique identifier for a row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(u64);

impl FilterId {
    fn next() -> Self {
        Self(FILTER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Name of a numeric attribute on a data source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeId(String);

impl AttributeId {
    /// Create an attribute identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the attribute name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur when resolving an attribute against a source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The attribute has no matching component on the source.
    ///
    /// Layers treat this as "nothing to draw yet" and stay enabled.
    #[error("attribute {0} not found on data source")]
    NotFound(AttributeId),

    /// The attribute exists but cannot be used with this source.
    ///
    /// This covers shape mismatches between the attribute and the source
    /// rows. Layers are disabled for the attribute until it resolves again.
    #[error("attribute {0} is incompatible with data source")]
    Incompatible(AttributeId),
}

/// Row predicate selecting a subset of a data source.
///
/// The predicate receives the row index and the value of the binned
/// attribute for that row. Filters carry a stable identity so parameter
/// diffing can tell two filters apart.
#[derive(Clone)]
pub struct RowFilter {
    id: FilterId,
    predicate: Arc<dyn Fn(usize, f64) -> bool + Send + Sync>,
}

impl RowFilter {
    /// Create a filter from a row predicate.
    pub fn new(predicate: impl Fn(usize, f64) -> bool + Send + Sync + 'static) -> Self {
        Self {
            id: FilterId::next(),
            predicate: Arc::new(predicate),
        }
    }

    /// Access the filter identity.
    pub fn id(&self) -> FilterId {
        self.id
    }

    /// Check whether a row passes the filter.
    pub fn accepts(&self, row: usize, value: f64) -> bool {
        (self.predicate)(row, value)
    }
}

impl std::fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RowFilter").field(&self.id).finish()
    }
}

/// Source of numeric attributes for histogram layers.
pub trait DataSource: std::fmt::Debug {
    /// Stable identity of this source, used for change detection.
    fn data_id(&self) -> DataId;

    /// Resolve an attribute to its column of values.
    fn resolve(&self, attribute: &AttributeId) -> Result<&[f64], ResolveError>;

    /// Compute binned counts for an attribute over a range.
    ///
    /// Values outside the range, non-finite values, values rejected by the
    /// filter, and values the scale cannot map are all skipped. The upper
    /// range bound is inclusive and falls into the last bin.
    fn compute_histogram(
        &self,
        attribute: &AttributeId,
        range: Range,
        bins: usize,
        scale: AxisScale,
        filter: Option<&RowFilter>,
    ) -> Result<Vec<f64>, ResolveError>;
}

/// A layer's view of its data: a whole source or a filtered subset.
#[derive(Debug, Clone)]
pub enum LayerSource {
    /// Every row of the source.
    Full(Arc<dyn DataSource>),
    /// Rows of the source passing a filter.
    Filtered {
        /// The underlying source.
        data: Arc<dyn DataSource>,
        /// The row filter.
        filter: RowFilter,
    },
}

impl LayerSource {
    /// Access the underlying data source.
    pub fn data(&self) -> &Arc<dyn DataSource> {
        match self {
            Self::Full(data) => data,
            Self::Filtered { data, .. } => data,
        }
    }

    /// Access the row filter, if any.
    pub fn filter(&self) -> Option<&RowFilter> {
        match self {
            Self::Full(_) => None,
            Self::Filtered { filter, .. } => Some(filter),
        }
    }

    /// Stable identity of the source and filter pair.
    pub fn identity(&self) -> (DataId, Option<FilterId>) {
        (self.data().data_id(), self.filter().map(RowFilter::id))
    }
}
