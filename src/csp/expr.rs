//! Constraint expressions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{CspValue, CspVar};

/// An atomic constraint over CSP variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CspLit {
    /// Strict ordering between two ordinal variables.
    Before(CspVar, CspVar),
    /// The two variables take the same value.
    Eq(CspVar, CspVar),
    /// The two variables take different values.
    Ne(CspVar, CspVar),
    /// All listed variables take pairwise distinct values.
    AllDifferent(Vec<CspVar>),
}

/// A constraint expression tree: literals combined with and/or.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Lit(CspLit),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn before(a: CspVar, b: CspVar) -> Self {
        Expr::Lit(CspLit::Before(a, b))
    }

    pub fn eq(a: CspVar, b: CspVar) -> Self {
        Expr::Lit(CspLit::Eq(a, b))
    }

    pub fn ne(a: CspVar, b: CspVar) -> Self {
        Expr::Lit(CspLit::Ne(a, b))
    }

    /// Variables in scope of this expression, in first-occurrence order,
    /// deduplicated.
    pub fn scope(&self) -> Vec<CspVar> {
        let mut vars = Vec::new();
        self.collect_scope(&mut vars);
        vars
    }

    fn collect_scope(&self, vars: &mut Vec<CspVar>) {
        match self {
            Expr::Lit(lit) => {
                let mut push = |v: &CspVar| {
                    if !vars.contains(v) {
                        vars.push(v.clone());
                    }
                };
                match lit {
                    CspLit::Before(a, b) | CspLit::Eq(a, b) | CspLit::Ne(a, b) => {
                        push(a);
                        push(b);
                    }
                    CspLit::AllDifferent(list) => list.iter().for_each(push),
                }
            }
            Expr::And(children) | Expr::Or(children) => {
                for child in children {
                    child.collect_scope(vars);
                }
            }
        }
    }

    /// Evaluates this expression under a total variable assignment.
    /// Unassigned variables and position/object mismatches evaluate false.
    pub fn eval(&self, values: &FxHashMap<CspVar, CspValue>) -> bool {
        match self {
            Expr::Lit(lit) => lit.eval(values),
            Expr::And(children) => children.iter().all(|c| c.eval(values)),
            Expr::Or(children) => children.iter().any(|c| c.eval(values)),
        }
    }
}

impl CspLit {
    fn eval(&self, values: &FxHashMap<CspVar, CspValue>) -> bool {
        match self {
            CspLit::Before(a, b) => match (values.get(a), values.get(b)) {
                (Some(CspValue::Pos(pa)), Some(CspValue::Pos(pb))) => pa < pb,
                _ => false,
            },
            CspLit::Eq(a, b) => match (values.get(a), values.get(b)) {
                (Some(va), Some(vb)) => va == vb,
                _ => false,
            },
            CspLit::Ne(a, b) => match (values.get(a), values.get(b)) {
                (Some(va), Some(vb)) => va != vb,
                _ => false,
            },
            CspLit::AllDifferent(list) => {
                for (i, a) in list.iter().enumerate() {
                    for b in &list[i + 1..] {
                        match (values.get(a), values.get(b)) {
                            (Some(va), Some(vb)) if va != vb => {}
                            _ => return false,
                        }
                    }
                }
                true
            }
        }
    }
}
