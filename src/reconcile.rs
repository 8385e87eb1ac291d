//! Shared-range reconciliation across layers.

use log::debug;

use crate::range::Range;

/// Reconciled y-range shared by every layer of a viewer.
///
/// The stored range is always derived from the candidate local ranges of
/// the currently enabled layers: the maximum of their maxima and the
/// minimum of their minima. Layers read it freely but never write it; the
/// single mutator below is the only write path, and it writes only when
/// the derived candidate actually differs, so re-running reconciliation
/// with unchanged inputs is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedRange {
    current: Option<Range>,
}

impl SharedRange {
    /// Create an empty shared range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the reconciled range, if any layer has contributed one.
    pub fn get(&self) -> Option<Range> {
        self.current
    }

    /// Derive the consensus range from per-layer candidates and store it.
    ///
    /// Absent candidates contribute the fold identities (0 to the maximum,
    /// +inf to the minimum) and therefore never constrain the result. With
    /// no contributing candidate at all the stored value is left untouched.
    /// Returns whether a write occurred.
    pub(crate) fn reconcile<I>(&mut self, candidates: I) -> bool
    where
        I: IntoIterator<Item = Option<Range>>,
    {
        let mut max = 0.0_f64;
        let mut min = f64::INFINITY;
        let mut contributed = false;
        for candidate in candidates {
            if let Some(range) = candidate {
                contributed = true;
                max = max.max(range.max);
                min = min.min(range.min);
            }
        }
        if !contributed {
            return false;
        }
        let candidate = Range { min, max };
        if self.current == Some(candidate) {
            return false;
        }
        debug!(
            "livehist: shared range {:?} -> {:?}",
            self.current, candidate
        );
        self.current = Some(candidate);
        true
    }
}
