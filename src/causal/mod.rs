//! Causal structures: why a plan is correct.
//!
//! The producer/consumer/threat model formalises which step effect satisfies
//! which step precondition, and which interposed effects could break that
//! satisfaction. [`build_actual`] derives the single realised producer per
//! need, [`build_minimal`] every admissible one, and [`detect_threats`]
//! indexes the interference between them.

pub mod builder;
pub mod pct;
pub mod structure;
pub mod threats;

pub use builder::{build_actual, build_minimal};
pub use pct::{Consumer, PcLink, Producer, StepId, Threat};
pub use structure::CausalStructure;
pub use threats::{detect_threats, ThreatSet};

use std::sync::Arc;

use crate::plan::Plan;

/// A plan paired with one causal structure over its steps.
///
/// The plan itself carries the construction invariants (bracketing, unique
/// variable names, fully-bound substitution), checked at [`Plan::new`].
#[derive(Debug, Clone)]
pub struct PcPlan {
    plan: Arc<Plan>,
    structure: CausalStructure,
}

impl PcPlan {
    pub fn new(plan: Arc<Plan>, structure: CausalStructure) -> Self {
        Self { plan, structure }
    }

    pub fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }

    pub fn structure(&self) -> &CausalStructure {
        &self.structure
    }

    pub fn structure_mut(&mut self) -> &mut CausalStructure {
        &mut self.structure
    }

    /// Replaces the structure, keeping the plan.
    pub fn with_structure(&self, structure: CausalStructure) -> Self {
        Self { plan: self.plan.clone(), structure }
    }
}
