//! Causal-structure and plan construction errors.
//!
//! All of these indicate an inconsistent input plan and are fatal: the
//! upstream plan or parse is invalid and nothing can be recovered.

/// Errors raised while constructing plans and causal structures.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// A consumer need has no producer in the actual or minimal structure.
    #[error("no producer found for precondition {literal} of step {step}")]
    NoProducer { step: String, literal: String },

    /// The step sequence is not bracketed by exactly one init and one goal.
    #[error("plan is not bracketed by a unique init and goal step")]
    MissingEndpoints,

    /// Two steps declare a free variable with the same name.
    #[error("duplicate free variable name across plan steps: {0}")]
    DuplicateVariable(String),

    /// A step parameter is not bound by the plan's substitution.
    #[error("plan substitution does not bind variable {0}")]
    UnboundVariable(String),

    /// No initial-state variable is bound to the same value as this one.
    #[error("initial state has no variable bound to the value of {0}")]
    UnboundInitialValue(String),
}
