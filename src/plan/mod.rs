//! Steps, plans and planning problems.
//!
//! A [`Plan`] is an ordered sequence of lifted steps bracketed by a synthetic
//! initial step (effects = the initial world state) and a synthetic goal step
//! (preconditions = the goal condition), plus the substitution binding every
//! free parameter to the ground object it takes in the original plan.
//!
//! [`Plan::validate`] re-checks a ground plan by forward simulation and is
//! used for the optional live validation of re-instantiated plans.

pub mod plan_set;

pub use plan_set::PlanSet;

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::errors::StructureError;
use crate::fol::{Literal, Obj, Substitution, TypeHierarchy, Var};

/// Name of the synthetic initial step.
pub const INIT_NAME: &str = "init";
/// Name of the synthetic goal step.
pub const GOAL_NAME: &str = "goal";

/// The planning problem a plan solves: the type hierarchy and the object
/// universe. Domains of free CSP parameters are drawn from here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub types: TypeHierarchy,
    pub objects: Vec<Obj>,
}

impl Problem {
    pub fn new(name: impl Into<String>, types: TypeHierarchy, objects: Vec<Obj>) -> Self {
        Self { name: name.into(), types, objects }
    }

    /// Objects whose type can stand in for `ty` (objects of `ty` or any of
    /// its subtypes).
    pub fn objects_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = &'a Obj> {
        self.objects.iter().filter(move |o| self.types.is_subtype(&o.ty, ty))
    }
}

/// One action instance of a plan: a name, an ordered parameter list of free
/// variables, precondition literals and effect literals in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub params: Vec<Var>,
    pub pre: Vec<Literal>,
    pub post: Vec<Literal>,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Var>,
        pre: Vec<Literal>,
        post: Vec<Literal>,
    ) -> Self {
        Self { name: name.into(), params, pre, post }
    }

    pub fn is_init(&self) -> bool {
        self.name == INIT_NAME
    }

    pub fn is_goal(&self) -> bool {
        self.name == GOAL_NAME
    }

    /// Declaration index of the first effect equal to `lit`.
    pub fn effect_index(&self, lit: &Literal) -> Option<usize> {
        self.post.iter().position(|p| p == lit)
    }

    /// True if the effect at `idx` is negated by a later-declared effect of
    /// this same step. Such an effect never survives the step and cannot
    /// produce or threaten anything.
    pub fn undone(&self, idx: usize) -> bool {
        let lit = &self.post[idx];
        self.post[idx + 1..].iter().any(|later| later.negates(lit))
    }

    /// True if some effect of this step is the negation of `lit`.
    pub fn has_negated_effect(&self, lit: &Literal) -> bool {
        self.post.iter().any(|p| p.negates(lit))
    }
}

/// Outcome of validating a ground plan: pass/fail plus a diagnostic message
/// identifying the first violated condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub valid: bool,
    pub message: String,
}

impl PlanResult {
    fn ok() -> Self {
        Self { valid: true, message: String::from("valid") }
    }

    fn fail(message: String) -> Self {
        Self { valid: false, message }
    }
}

/// A validated, totally-ordered plan.
#[derive(Debug, Clone)]
pub struct Plan {
    problem: Arc<Problem>,
    steps: Vec<Step>,
    substitution: Substitution,
}

impl Plan {
    /// Builds a plan, checking the construction invariants: the sequence is
    /// bracketed by exactly one init and one goal step, no two steps share a
    /// free-variable name, and every step parameter is bound by the
    /// substitution. Violations indicate an invalid upstream plan and are
    /// fatal.
    pub fn new(
        problem: Arc<Problem>,
        steps: Vec<Step>,
        substitution: Substitution,
    ) -> Result<Self, StructureError> {
        let inits = steps.iter().filter(|s| s.is_init()).count();
        let goals = steps.iter().filter(|s| s.is_goal()).count();
        if steps.len() < 2
            || inits != 1
            || goals != 1
            || !steps[0].is_init()
            || !steps[steps.len() - 1].is_goal()
        {
            return Err(StructureError::MissingEndpoints);
        }

        let mut seen = FxHashSet::default();
        for step in &steps {
            for param in &step.params {
                if !seen.insert(param.name.as_str()) {
                    return Err(StructureError::DuplicateVariable(param.name.clone()));
                }
                if substitution.get(param).is_none() {
                    return Err(StructureError::UnboundVariable(param.name.clone()));
                }
            }
        }

        Ok(Self { problem, steps, substitution })
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, i: usize) -> &Step {
        &self.steps[i]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn init(&self) -> &Step {
        &self.steps[0]
    }

    pub fn goal(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    /// The initial-step parameter bound to the same object as `var`. Needed
    /// when an equality or negated need is satisfied directly against the
    /// initial state: the need's literal is rebound onto initial-state
    /// variables.
    pub fn initial_var_for(&self, var: &Var) -> Result<&Var, StructureError> {
        let value = self.substitution.value(var);
        self.init()
            .params
            .iter()
            .find(|iv| self.substitution.value(iv) == value)
            .ok_or_else(|| StructureError::UnboundInitialValue(var.name.clone()))
    }

    /// Checks this plan by forward simulation under its substitution.
    ///
    /// The state is the set of ground positive atoms. Equality needs are
    /// decided by comparing substituted values; negative needs require the
    /// ground atom's absence. Effects apply in declaration order, so a
    /// later effect overwrites an earlier one within the same step.
    pub fn validate(&self) -> PlanResult {
        let mut state: FxHashSet<(String, Vec<String>)> = FxHashSet::default();
        self.apply_effects(self.init(), &mut state);

        for (pos, step) in self.steps.iter().enumerate().skip(1) {
            for pre in &step.pre {
                if !self.holds(pre, &state) {
                    return PlanResult::fail(format!(
                        "precondition {} of step {} not satisfied at position {}",
                        pre, step.name, pos
                    ));
                }
            }
            self.apply_effects(step, &mut state);
        }

        PlanResult::ok()
    }

    fn holds(&self, pre: &Literal, state: &FxHashSet<(String, Vec<String>)>) -> bool {
        if pre.atom.pred.is_equality() {
            let a = self.substitution.value(&pre.atom.args[0]);
            let b = self.substitution.value(&pre.atom.args[1]);
            return (a == b) == pre.positive;
        }
        state.contains(&self.ground_atom(pre)) == pre.positive
    }

    fn apply_effects(&self, step: &Step, state: &mut FxHashSet<(String, Vec<String>)>) {
        for post in &step.post {
            let atom = self.ground_atom(post);
            if post.positive {
                state.insert(atom);
            } else {
                state.remove(&atom);
            }
        }
    }

    fn ground_atom(&self, lit: &Literal) -> (String, Vec<String>) {
        let args = lit
            .atom
            .args
            .iter()
            .map(|v| self.substitution.value(v).name.clone())
            .collect();
        (lit.atom.pred.name.clone(), args)
    }

    /// Ground plan listing: one `(name args...)` action per line, synthetic
    /// steps omitted.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            if step.is_init() || step.is_goal() {
                continue;
            }
            out.push('(');
            out.push_str(&step.name);
            for param in &step.params {
                out.push(' ');
                out.push_str(&self.substitution.value(param).name);
            }
            out.push_str(")\n");
        }
        out
    }

    /// Step index keyed by step name. Step names are unique within a plan
    /// (parameter names are unique and derive from them upstream).
    pub fn index_by_name(&self) -> FxHashMap<&str, usize> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), i))
            .collect()
    }
}
