//! Stage selection from observed parameter changes.
//!
//! The pipeline has three stages in a fixed dependency order. Each stage
//! declares the parameter keys it is sensitive to; a stage runs when one of
//! its keys changed, when the run is forced, or when an earlier stage ran,
//! since stage inputs are stage outputs rather than raw parameters.

use log::trace;

use crate::snapshot::{ChangeSet, ParamKey};

/// One phase of the recomputation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Raw histogram computation.
    Computation,
    /// Value scaling and local-range derivation.
    Transform,
    /// Cosmetic attribute application.
    Visual,
}

impl Stage {
    /// Stages in dependency order.
    pub const ORDER: [Self; 3] = [Self::Computation, Self::Transform, Self::Visual];

    /// Parameter keys this stage is sensitive to.
    pub fn sensitivity(self) -> &'static [ParamKey] {
        match self {
            Self::Computation => &[
                ParamKey::Source,
                ParamKey::XAttribute,
                ParamKey::XMin,
                ParamKey::XMax,
                ParamKey::BinCount,
                ParamKey::XLog,
            ],
            Self::Transform => &[ParamKey::YLog, ParamKey::Normalize, ParamKey::Cumulative],
            Self::Visual => &[
                ParamKey::Opacity,
                ParamKey::Color,
                ParamKey::DrawOrder,
                ParamKey::Visible,
            ],
        }
    }
}

/// Which stages a dispatch pass selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagePlan {
    computation: bool,
    transform: bool,
    visual: bool,
}

impl StagePlan {
    /// Select stages for a set of changed keys.
    pub fn plan(changed: &ChangeSet, force: bool) -> Self {
        let mut plan = Self::default();
        let mut carry = force;
        for stage in Stage::ORDER {
            let run = carry || changed.intersects(stage.sensitivity());
            if run {
                carry = true;
            }
            plan.set(stage, run);
        }
        if !plan.is_empty() {
            trace!("livehist: dispatch force={force} changed={changed:?} plan={plan:?}");
        }
        plan
    }

    /// Check whether a stage was selected.
    pub fn runs(&self, stage: Stage) -> bool {
        match stage {
            Stage::Computation => self.computation,
            Stage::Transform => self.transform,
            Stage::Visual => self.visual,
        }
    }

    /// Check whether no stage was selected.
    pub fn is_empty(&self) -> bool {
        !(self.computation || self.transform || self.visual)
    }

    fn set(&mut self, stage: Stage, run: bool) {
        match stage {
            Stage::Computation => self.computation = run,
            Stage::Transform => self.transform = run,
            Stage::Visual => self.visual = run,
        }
    }
}
