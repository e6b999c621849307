//! Variable-to-object substitutions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::symbol::{Obj, Var};

/// A mapping from free variables to the ground objects they take in the
/// original plan. Plans validate at construction that every step parameter
/// is bound, so lookups on plan variables cannot fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Substitution {
    map: FxHashMap<Var, Obj>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, var: Var, obj: Obj) {
        self.map.insert(var, obj);
    }

    pub fn get(&self, var: &Var) -> Option<&Obj> {
        self.map.get(var)
    }

    /// The bound value of a plan variable.
    ///
    /// Panics if `var` is unbound; `Plan::new` guarantees this cannot
    /// happen for any step parameter.
    pub fn value(&self, var: &Var) -> &Obj {
        self.map
            .get(var)
            .unwrap_or_else(|| panic!("unbound variable {}", var.name))
    }

    /// True if the two argument lists resolve pairwise to the same objects.
    pub fn codesignated(&self, a: &[Var], b: &[Var]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b.iter()).all(|(va, vb)| self.value(va) == self.value(vb))
    }

    pub fn vars(&self) -> impl Iterator<Item = &Var> {
        self.map.keys()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
