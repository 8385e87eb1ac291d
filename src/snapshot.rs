//! Parameter snapshots and change detection.
//!
//! Both parameter sets are captured as flat, ordered key-value snapshots
//! and diffed against the previous capture. The key set is closed: every
//! tracked parameter is named here, and stage sensitivities are expressed
//! against these keys rather than against ad-hoc attribute names.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::{AttributeId, DataId, FilterId};
use crate::render::Color;

/// Tracked parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    /// Layer data source and filter identity.
    Source,
    /// Attribute being binned.
    XAttribute,
    /// Lower binning bound.
    XMin,
    /// Upper binning bound.
    XMax,
    /// Number of bins.
    BinCount,
    /// Logarithmic x axis flag.
    XLog,
    /// Logarithmic y axis flag.
    YLog,
    /// Normalize transform flag.
    Normalize,
    /// Cumulative transform flag.
    Cumulative,
    /// Reconciled shared y minimum.
    SharedYMin,
    /// Reconciled shared y maximum.
    SharedYMax,
    /// Layer fill color.
    Color,
    /// Layer opacity.
    Opacity,
    /// Layer draw order.
    DrawOrder,
    /// Layer visibility.
    Visible,
}

/// Snapshot value for a tracked parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Unset parameter.
    Unset,
    /// Floating point value.
    Float(f64),
    /// Count value.
    Count(usize),
    /// Boolean flag.
    Flag(bool),
    /// Attribute name.
    Attribute(AttributeId),
    /// Data source and filter identity.
    Source(DataId, Option<FilterId>),
    /// Color value.
    Color(Color),
    /// Draw order value.
    Order(i32),
}

/// Flat, ordered parameter capture used for diffing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: BTreeMap<ParamKey, ParamValue>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parameter value.
    pub fn insert(&mut self, key: ParamKey, value: ParamValue) {
        self.entries.insert(key, value);
    }

    /// Access a recorded value.
    pub fn get(&self, key: ParamKey) -> Option<&ParamValue> {
        self.entries.get(&key)
    }

    /// Check if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys whose values differ from a previous snapshot.
    ///
    /// A key counts as changed when it is absent from `previous` or its
    /// value differs. Keys present only in `previous` are ignored.
    pub fn diff(&self, previous: &Self) -> ChangeSet {
        let mut changed = ChangeSet::new();
        for (key, value) in &self.entries {
            if previous.get(*key) != Some(value) {
                changed.insert(*key);
            }
        }
        changed
    }
}

/// Set of parameter keys that changed between two snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    keys: BTreeSet<ParamKey>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a changed key.
    pub fn insert(&mut self, key: ParamKey) {
        self.keys.insert(key);
    }

    /// Check whether a key changed.
    pub fn contains(&self, key: ParamKey) -> bool {
        self.keys.contains(&key)
    }

    /// Check whether any of the given keys changed.
    pub fn intersects(&self, keys: &[ParamKey]) -> bool {
        keys.iter().any(|key| self.keys.contains(key))
    }

    /// Merge another change set into this one.
    pub fn union(&mut self, other: Self) {
        self.keys.extend(other.keys);
    }

    /// Check whether no keys changed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of changed keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Iterate over changed keys in order.
    pub fn iter(&self) -> impl Iterator<Item = ParamKey> + '_ {
        self.keys.iter().copied()
    }
}

/// Cache of the previously observed snapshot.
///
/// Detection replaces the stored snapshot wholesale, so each call's
/// "previous" is exactly what the prior call observed as "current". A
/// fresh or reset cache reports every key of the next capture as changed.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    previous: Snapshot,
}

impl SnapshotCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff a capture against the stored snapshot and replace it.
    pub fn detect(&mut self, current: Snapshot) -> ChangeSet {
        let changed = current.diff(&self.previous);
        self.previous = current;
        changed
    }

    /// Clear the stored snapshot.
    pub fn reset(&mut self) {
        self.previous = Snapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(ParamKey, ParamValue)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (key, value) in pairs {
            snapshot.insert(*key, value.clone());
        }
        snapshot
    }

    #[test]
    fn diff_reports_exactly_the_changed_key() {
        let previous = snapshot(&[
            (ParamKey::XMin, ParamValue::Float(1.0)),
            (ParamKey::BinCount, ParamValue::Count(2)),
        ]);
        let current = snapshot(&[
            (ParamKey::XMin, ParamValue::Float(1.0)),
            (ParamKey::BinCount, ParamValue::Count(3)),
        ]);
        let changed = current.diff(&previous);
        assert_eq!(changed.len(), 1);
        assert!(changed.contains(ParamKey::BinCount));
    }

    #[test]
    fn absent_key_counts_as_changed() {
        let previous = snapshot(&[(ParamKey::XMin, ParamValue::Float(1.0))]);
        let current = snapshot(&[
            (ParamKey::XMin, ParamValue::Float(1.0)),
            (ParamKey::XLog, ParamValue::Flag(false)),
        ]);
        let changed = current.diff(&previous);
        assert!(changed.contains(ParamKey::XLog));
        assert!(!changed.contains(ParamKey::XMin));
    }

    #[test]
    fn keys_only_in_previous_are_ignored() {
        let previous = snapshot(&[
            (ParamKey::XMin, ParamValue::Float(1.0)),
            (ParamKey::XMax, ParamValue::Float(2.0)),
        ]);
        let current = snapshot(&[(ParamKey::XMin, ParamValue::Float(1.0))]);
        assert!(current.diff(&previous).is_empty());
    }

    #[test]
    fn cache_replaces_snapshot_wholesale() {
        let mut cache = SnapshotCache::new();
        let first = snapshot(&[(ParamKey::Visible, ParamValue::Flag(true))]);
        assert!(cache.detect(first.clone()).contains(ParamKey::Visible));
        assert!(cache.detect(first).is_empty());
    }

    #[test]
    fn reset_forces_full_detection() {
        let mut cache = SnapshotCache::new();
        let capture = snapshot(&[
            (ParamKey::Visible, ParamValue::Flag(true)),
            (ParamKey::Opacity, ParamValue::Float(0.5)),
        ]);
        let _ = cache.detect(capture.clone());
        cache.reset();
        assert_eq!(cache.detect(capture).len(), 2);
    }

    #[test]
    fn union_merges_shared_and_layer_changes() {
        let mut shared = ChangeSet::new();
        shared.insert(ParamKey::XMin);
        let mut layer = ChangeSet::new();
        layer.insert(ParamKey::Color);
        shared.union(layer);
        assert!(shared.contains(ParamKey::XMin));
        assert!(shared.contains(ParamKey::Color));
    }
}
