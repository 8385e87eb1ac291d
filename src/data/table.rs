//! In-memory column-table data source.

use std::collections::BTreeMap;

use crate::axis::AxisScale;
use crate::data::{AttributeId, DataId, DataSource, ResolveError, RowFilter};
use crate::range::Range;

/// In-memory data source holding named numeric columns.
///
/// Row count is fixed by the first column added. Columns whose length does
/// not match the row count stay stored but resolve as incompatible, which
/// disables any layer binned on them until the mismatch is corrected.
#[derive(Debug, Clone)]
pub struct TableSource {
    id: DataId,
    label: String,
    rows: usize,
    columns: BTreeMap<AttributeId, Vec<f64>>,
}

impl TableSource {
    /// Create an empty table.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: DataId::next(),
            label: label.into(),
            rows: 0,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column, consuming and returning the table.
    pub fn with_column(mut self, attribute: AttributeId, values: Vec<f64>) -> Self {
        self.insert_column(attribute, values);
        self
    }

    /// Add or replace a column.
    pub fn insert_column(&mut self, attribute: AttributeId, values: Vec<f64>) {
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        self.columns.insert(attribute, values);
    }

    /// Access the table label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of rows in the table.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl DataSource for TableSource {
    fn data_id(&self) -> DataId {
        self.id
    }

    fn resolve(&self, attribute: &AttributeId) -> Result<&[f64], ResolveError> {
        let column = self
            .columns
            .get(attribute)
            .ok_or_else(|| ResolveError::NotFound(attribute.clone()))?;
        if column.len() != self.rows {
            return Err(ResolveError::Incompatible(attribute.clone()));
        }
        Ok(column)
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
        if bins == 0 {
            return Ok(counts);
        }
        let (Some(lo), Some(hi)) = (scale.map_value(range.min), scale.map_value(range.max)) else {
            return Ok(counts);
        };
        let span = hi - lo;
        for (row, &value) in column.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
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
            let index = if span > 0.0 {
                (((mapped - lo) / span * bins as f64) as usize).min(bins - 1)
            } else {
                0
            };
            counts[index] += 1.0;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TableSource {
        TableSource::new("sample").with_column(
            AttributeId::new("x"),
            vec![0.5, 1.5, 2.5, 2.5, 3.5, 9.0, -1.0, f64::NAN],
        )
    }

    #[test]
    fn counts_sum_to_in_range_observations() {
        let table = sample_table();
        let counts = table
            .compute_histogram(
                &AttributeId::new("x"),
                Range::new(0.0, 4.0),
                4,
                AxisScale::Linear,
                None,
            )
            .unwrap();
        assert_eq!(counts, vec![1.0, 1.0, 2.0, 1.0]);
        assert_eq!(counts.iter().sum::<f64>(), 5.0);
    }

    #[test]
    fn upper_bound_lands_in_last_bin() {
        let table = TableSource::new("edge").with_column(AttributeId::new("x"), vec![4.0]);
        let counts = table
            .compute_histogram(
                &AttributeId::new("x"),
                Range::new(0.0, 4.0),
                4,
                AxisScale::Linear,
                None,
            )
            .unwrap();
        assert_eq!(counts, vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn filter_restricts_rows() {
        let table = sample_table();
        let filter = RowFilter::new(|_, value| value < 2.0);
        let counts = table
            .compute_histogram(
                &AttributeId::new("x"),
                Range::new(0.0, 4.0),
                4,
                AxisScale::Linear,
                Some(&filter),
            )
            .unwrap();
        assert_eq!(counts.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn log_scale_skips_non_positive_values() {
        let table =
            TableSource::new("log").with_column(AttributeId::new("x"), vec![-1.0, 0.0, 1.0, 10.0]);
        let counts = table
            .compute_histogram(
                &AttributeId::new("x"),
                Range::new(0.1, 100.0),
                3,
                AxisScale::Log10,
                None,
            )
            .unwrap();
        assert_eq!(counts.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn missing_attribute_is_not_found() {
        let table = sample_table();
        let err = table.resolve(&AttributeId::new("y")).unwrap_err();
        assert_eq!(err, ResolveError::NotFound(AttributeId::new("y")));
    }

    #[test]
    fn mismatched_column_is_incompatible() {
        let mut table = sample_table();
        table.insert_column(AttributeId::new("short"), vec![1.0, 2.0]);
        let err = table.resolve(&AttributeId::new("short")).unwrap_err();
        assert_eq!(err, ResolveError::Incompatible(AttributeId::new("short")));
    }
}
