//! Symbols: the type hierarchy, objects, variables and predicate symbols.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Name of the built-in equality predicate.
pub const EQUALITY: &str = "=";

/// A single-parent type hierarchy over type names.
///
/// Subtyping is reflexive; `compatible` is the symmetric
/// subtype-or-supertype relation used when matching lifted literals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeHierarchy {
    parents: FxHashMap<String, Option<String>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with an optional parent type.
    pub fn insert(&mut self, name: impl Into<String>, parent: Option<&str>) {
        self.parents.insert(name.into(), parent.map(str::to_owned));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    /// True if `sub` is `sup` or a (transitive) subtype of it.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut current = Some(sub);
        while let Some(ty) = current {
            if ty == sup {
                return true;
            }
            current = self.parents.get(ty).and_then(|p| p.as_deref());
        }
        false
    }

    /// True if either type is a subtype of the other.
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        self.is_subtype(a, b) || self.is_subtype(b, a)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.parents.keys().map(String::as_str)
    }
}

/// A ground object of the planning problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Obj {
    pub name: String,
    pub ty: String,
}

impl Obj {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into() }
    }
}

impl std::fmt::Display for Obj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A typed free variable. Variable names are unique across a plan's steps,
/// so structural equality doubles as identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
    pub ty: String,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into() }
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A predicate symbol with its parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    pub name: String,
    pub param_tys: Vec<String>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, param_tys: Vec<String>) -> Self {
        Self { name: name.into(), param_tys }
    }

    /// The built-in equality predicate over the given root type.
    pub fn equality(root_ty: &str) -> Self {
        Self::new(EQUALITY, vec![root_ty.to_owned(), root_ty.to_owned()])
    }

    pub fn is_equality(&self) -> bool {
        self.name == EQUALITY
    }

    pub fn arity(&self) -> usize {
        self.param_tys.len()
    }
}
