//! The CSP model a causal structure encodes into.
//!
//! Variables are one ordinal per step plus every free step parameter;
//! domains are explicit value lists; constraints are expression trees over
//! ordering, (in)equality and all-different literals. Treewidth is measured
//! on the primal constraint graph ([`primal`]); [`zinc`] exports the model
//! as MiniZinc text.

pub mod expr;
pub mod primal;
pub mod zinc;

pub use expr::{CspLit, Expr};
pub use primal::PrimalGraph;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::causal::StepId;
use crate::fol::{Obj, Var};

/// A CSP variable: a step's position in the order, or a step parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CspVar {
    Ordinal(StepId),
    Param(Var),
}

impl std::fmt::Display for CspVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CspVar::Ordinal(step) => write!(f, "ord{step}"),
            CspVar::Param(var) => f.write_str(&var.name),
        }
    }
}

/// A CSP value: a position or a plan object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CspValue {
    Pos(usize),
    Obj(Obj),
}

/// Variables, domains and constraints. Variables keep insertion order so
/// exports and the primal graph are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Csp {
    variables: Vec<CspVar>,
    domains: FxHashMap<CspVar, Vec<CspValue>>,
    constraints: Vec<Expr>,
}

impl Csp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, var: CspVar) {
        if !self.domains.contains_key(&var) {
            self.domains.insert(var.clone(), Vec::new());
            self.variables.push(var);
        }
    }

    pub fn add_domain_value(&mut self, var: &CspVar, value: CspValue) {
        let domain = self
            .domains
            .get_mut(var)
            .unwrap_or_else(|| panic!("unknown CSP variable {var}"));
        if !domain.contains(&value) {
            domain.push(value);
        }
    }

    /// Replaces a variable's domain with a single value.
    pub fn pin(&mut self, var: &CspVar, value: CspValue) {
        let domain = self
            .domains
            .get_mut(var)
            .unwrap_or_else(|| panic!("unknown CSP variable {var}"));
        domain.clear();
        domain.push(value);
    }

    pub fn add_constraint(&mut self, expr: Expr) {
        self.constraints.push(expr);
    }

    pub fn variables(&self) -> &[CspVar] {
        &self.variables
    }

    pub fn domain(&self, var: &CspVar) -> &[CspValue] {
        self.domains.get(var).map_or(&[], Vec::as_slice)
    }

    pub fn constraints(&self) -> &[Expr] {
        &self.constraints
    }

    /// True if the assignment satisfies every constraint.
    pub fn satisfied_by(&self, values: &FxHashMap<CspVar, CspValue>) -> bool {
        self.constraints.iter().all(|c| c.eval(values))
    }
}
