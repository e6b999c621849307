//! Producer, consumer, link and threat value types.
//!
//! All four are plain value types with structural equality; steps are
//! referenced by their index in the plan's step sequence.

use serde::{Deserialize, Serialize};

use crate::fol::Literal;
use crate::plan::Plan;

/// Index of a step in a plan's step sequence.
pub type StepId = usize;

/// A (step, effect literal) pair: one admissible source of truth for a need.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Producer {
    pub step: StepId,
    pub literal: Literal,
}

impl Producer {
    pub fn new(step: StepId, literal: Literal) -> Self {
        Self { step, literal }
    }
}

/// A (step, precondition literal) pair: a need to be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Consumer {
    pub step: StepId,
    pub literal: Literal,
}

impl Consumer {
    /// Builds a consumer for a declared precondition of `step`.
    ///
    /// Panics if `literal` is not one of the step's preconditions; callers
    /// constructing consumers for anything else have a logic defect.
    pub fn new(plan: &Plan, step: StepId, literal: Literal) -> Self {
        assert!(
            plan.step(step).pre.contains(&literal),
            "{literal} is not a precondition of step {}",
            plan.step(step).name
        );
        Self { step, literal }
    }
}

/// A causal link: the producer's effect is one admissible way to satisfy
/// the consumer's need.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcLink {
    pub producer: Producer,
    pub consumer: Consumer,
}

impl PcLink {
    pub fn new(producer: Producer, consumer: Consumer) -> Self {
        Self { producer, consumer }
    }
}

/// A (step, negated-need literal) pair: a step whose effect, if interposed
/// between a link's endpoints under co-designated bindings, would undo the
/// link's need.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Threat {
    pub step: StepId,
    pub literal: Literal,
}

impl Threat {
    pub fn new(step: StepId, literal: Literal) -> Self {
        Self { step, literal }
    }
}

impl std::fmt::Display for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.step, self.literal)
    }
}

impl std::fmt::Display for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.step, self.literal)
    }
}

impl std::fmt::Display for PcLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.producer, self.consumer)
    }
}
