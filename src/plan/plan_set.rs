//! Re-instantiation of CSP solutions into concrete alternative plans.

use std::sync::Arc;

use crate::csp::{CspValue, CspVar};
use crate::errors::RelaxError;
use crate::fol::Substitution;
use crate::plan::Plan;
use crate::solve::Assignment;

/// A family of alternative plans over the same steps, one per CSP solution:
/// steps reordered by their ordinal values, parameters rebound from the
/// solution's object values.
#[derive(Debug)]
pub struct PlanSet {
    plan: Arc<Plan>,
    assignments: Vec<Assignment>,
}

impl PlanSet {
    pub fn new(plan: Arc<Plan>, assignments: Vec<Assignment>) -> Self {
        Self { plan, assignments }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Builds the concrete plan for every solution. Fails if a solution
    /// contradicts the pinned initial/goal bindings or misses a variable;
    /// either indicates a defective encoding, not a recoverable state.
    pub fn plans(&self) -> Result<Vec<Plan>, RelaxError> {
        self.assignments.iter().map(|a| self.instantiate(a)).collect()
    }

    /// Plan listing for the whole set: one `(name args...)` action per line,
    /// plans separated by `;;;` lines.
    pub fn listing(&self) -> Result<String, RelaxError> {
        let mut out = String::new();
        for (i, plan) in self.plans()?.iter().enumerate() {
            if i > 0 {
                out.push_str(";;;\n");
            }
            out.push_str(&plan.listing());
        }
        Ok(out)
    }

    fn instantiate(&self, assignment: &Assignment) -> Result<Plan, RelaxError> {
        let n = self.plan.len();

        let mut order: Vec<(usize, usize)> = Vec::with_capacity(n);
        for step_idx in 0..n {
            let pos = match assignment.get(&CspVar::Ordinal(step_idx)) {
                Some(CspValue::Pos(p)) => *p,
                _ => {
                    return Err(RelaxError::InvalidInstantiation(format!(
                        "solution assigns no position to step {}",
                        self.plan.step(step_idx).name
                    )))
                }
            };
            order.push((pos, step_idx));
        }
        order.sort();

        let mut sub = Substitution::new();
        for step in self.plan.steps() {
            let pinned = step.is_init() || step.is_goal();
            for param in step.params.iter() {
                let original = self.plan.substitution().value(param);
                let value = match assignment.get(&CspVar::Param(param.clone())) {
                    Some(CspValue::Obj(obj)) => obj,
                    Some(CspValue::Pos(_)) => {
                        return Err(RelaxError::InvalidInstantiation(format!(
                            "solution assigns a position to parameter {}",
                            param.name
                        )))
                    }
                    None => original,
                };
                if pinned && value != original {
                    return Err(RelaxError::InvalidInstantiation(format!(
                        "solution rebinds pinned variable {} of step {}",
                        param.name, step.name
                    )));
                }
                sub.bind(param.clone(), value.clone());
            }
        }

        let steps = order
            .into_iter()
            .map(|(_, idx)| self.plan.step(idx).clone())
            .collect();

        Ok(Plan::new(self.plan.problem().clone(), steps, sub)?)
    }
}
