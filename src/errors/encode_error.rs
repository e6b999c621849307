//! CSP encoding errors.

/// Errors raised while translating a causal structure into a CSP.
///
/// Both variants signal a logic defect in causal-link bookkeeping and are
/// never silently tolerated.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A consumer has no incoming causal link at encoding time.
    #[error("no producer for consumer {consumer}")]
    NoProducer { consumer: String },

    /// A non-propositional consumer produced zero disjuncts.
    #[error("no constraints generated for consumer {consumer}")]
    NoDisjuncts { consumer: String },
}
