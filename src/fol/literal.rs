//! Atoms and signed literals.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::symbol::{Predicate, Var};

/// A predicate applied to an ordered list of variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub pred: Predicate,
    pub args: SmallVec<[Var; 4]>,
}

impl Atom {
    pub fn new(pred: Predicate, args: impl IntoIterator<Item = Var>) -> Self {
        Self { pred, args: args.into_iter().collect() }
    }
}

/// An atom with a truth sign.
///
/// Two literals are *compatible* for causal purposes when predicate symbol
/// and sign match; bindings are compared separately under a substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub atom: Atom,
    pub positive: bool,
}

impl Literal {
    pub fn pos(pred: Predicate, args: impl IntoIterator<Item = Var>) -> Self {
        Self { atom: Atom::new(pred, args), positive: true }
    }

    pub fn neg(pred: Predicate, args: impl IntoIterator<Item = Var>) -> Self {
        Self { atom: Atom::new(pred, args), positive: false }
    }

    /// The same atom with the opposite sign.
    pub fn negated(&self) -> Self {
        Self { atom: self.atom.clone(), positive: !self.positive }
    }

    /// The same predicate and sign over a different argument list.
    pub fn with_args(&self, args: impl IntoIterator<Item = Var>) -> Self {
        Self {
            atom: Atom::new(self.atom.pred.clone(), args),
            positive: self.positive,
        }
    }

    /// True if `other` is this literal's negation (same atom, opposite sign).
    pub fn negates(&self, other: &Literal) -> bool {
        self.positive != other.positive && self.atom == other.atom
    }

    pub fn arity(&self) -> usize {
        self.atom.pred.arity()
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.positive {
            f.write_str("!")?;
        }
        write!(f, "{}(", self.atom.pred.name)?;
        for (i, arg) in self.atom.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&arg.name)?;
        }
        f.write_str(")")
    }
}

/// Canonical ordering over literals: predicate name, then sign, then
/// argument names position by position. Used as the final tie-breaker in
/// the plan-order comparator.
pub fn canonical_cmp(a: &Literal, b: &Literal) -> Ordering {
    a.atom
        .pred
        .name
        .cmp(&b.atom.pred.name)
        .then(a.positive.cmp(&b.positive))
        .then_with(|| {
            for (va, vb) in a.atom.args.iter().zip(b.atom.args.iter()) {
                let c = va.name.cmp(&vb.name);
                if c != Ordering::Equal {
                    return c;
                }
            }
            Ordering::Equal
        })
}
