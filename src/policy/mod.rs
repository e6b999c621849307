//! Relaxation policies: strict total orderings over candidate causal links.
//!
//! A policy ranks the candidate list once before the search starts and,
//! when its priorities depend on the evolving structure, again after every
//! accepted link. Comparators are strict: two distinct links never compare
//! equal, which is what makes the search deterministic. Ties fall through
//! to the canonical [`PlanOrder`] comparator; a tie surviving that is a
//! logic defect and panics.

pub mod decouple_tasks;
pub mod minimise_threats;
pub mod minimum_arity;
pub mod non_concurrency;
pub mod relax_producers;

pub use decouple_tasks::DecoupleTasks;
pub use minimise_threats::MinimiseThreats;
pub use minimum_arity::MinimumArity;
pub use non_concurrency::RelaxNonConcurrency;
pub use relax_producers::{RelaxProducers, RelaxProducers2};

use std::cmp::Ordering;

use crate::causal::{CausalStructure, PcLink, PcPlan};
use crate::errors::{ConfigError, PolicyError};
use crate::fol::literal;

/// A strict total ordering over candidate links.
pub trait RelaxationPolicy: Send {
    fn name(&self) -> &'static str;

    /// True when rankings must be recomputed after every accepted link.
    fn resort_each_step(&self) -> bool;

    /// Refreshes any statistics derived from the evolving working
    /// structure. Called before every sort.
    fn prepare(&mut self, _current: &CausalStructure) {}

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering;

    /// Drops candidates the policy never wants considered.
    fn filter(&self, edges: Vec<PcLink>) -> Vec<PcLink> {
        edges
    }
}

impl std::fmt::Debug for dyn RelaxationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaxationPolicy")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Filters and ranks the candidate list: best candidate first.
pub fn sort_and_filter(
    policy: &mut dyn RelaxationPolicy,
    current: &CausalStructure,
    edges: Vec<PcLink>,
) -> Vec<PcLink> {
    let mut edges = policy.filter(edges);
    policy.prepare(current);
    edges.sort_by(|a, b| policy.compare(a, b));
    edges
}

/// Canonical fallback comparator: producer step index, consumer step index,
/// then lexicographic literal comparison. Distinct links that still compare
/// equal indicate a bookkeeping defect, never a runtime condition.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanOrder;

impl PlanOrder {
    pub fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }

        let c = a
            .producer
            .step
            .cmp(&b.producer.step)
            .then_with(|| a.consumer.step.cmp(&b.consumer.step))
            .then_with(|| literal::canonical_cmp(&a.producer.literal, &b.producer.literal))
            .then_with(|| literal::canonical_cmp(&a.consumer.literal, &b.consumer.literal));

        if c == Ordering::Equal {
            panic!("indistinguishable candidate links: {a}, {b}");
        }
        c
    }
}

/// The closed policy registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    MinimumArity,
    MinimiseThreats,
    RelaxNonConcurrency,
    RelaxProducers,
    RelaxProducers2,
    DecoupleTasks,
}

impl PolicyKind {
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "minimum-arity" => Ok(PolicyKind::MinimumArity),
            "minimise-threats" => Ok(PolicyKind::MinimiseThreats),
            "relax-non-concurrency" => Ok(PolicyKind::RelaxNonConcurrency),
            "relax-producers" => Ok(PolicyKind::RelaxProducers),
            "relax-producers-2" => Ok(PolicyKind::RelaxProducers2),
            "decouple-tasks" => Ok(PolicyKind::DecoupleTasks),
            other => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::MinimumArity => "minimum-arity",
            PolicyKind::MinimiseThreats => "minimise-threats",
            PolicyKind::RelaxNonConcurrency => "relax-non-concurrency",
            PolicyKind::RelaxProducers => "relax-producers",
            PolicyKind::RelaxProducers2 => "relax-producers-2",
            PolicyKind::DecoupleTasks => "decouple-tasks",
        }
    }

    /// Instantiates the policy over the actual plan (`pc`, whose structure
    /// is the search's starting point) and the minimal option structure.
    pub fn build(
        &self,
        pc: &PcPlan,
        options: &CausalStructure,
    ) -> Result<Box<dyn RelaxationPolicy>, PolicyError> {
        Ok(match self {
            PolicyKind::MinimumArity => Box::new(MinimumArity::new()),
            PolicyKind::MinimiseThreats => Box::new(MinimiseThreats::new(pc, options)),
            PolicyKind::RelaxNonConcurrency => Box::new(RelaxNonConcurrency::new(pc, options)),
            PolicyKind::RelaxProducers => Box::new(RelaxProducers::new(pc)),
            PolicyKind::RelaxProducers2 => Box::new(RelaxProducers2::new(pc, options)),
            PolicyKind::DecoupleTasks => Box::new(DecoupleTasks::new(pc)?),
        })
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
