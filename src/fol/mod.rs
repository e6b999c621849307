//! First-order layer: types, objects, variables, predicates, literals and
//! substitutions.
//!
//! Everything here is a plain value type with structural equality; the hot
//! paths key hash maps on these values directly.

pub mod literal;
pub mod substitution;
pub mod symbol;

pub use literal::{Atom, Literal};
pub use substitution::Substitution;
pub use symbol::{Obj, Predicate, TypeHierarchy, Var};
