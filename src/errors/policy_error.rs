//! Relaxation-policy construction errors.

/// Errors raised while building a relaxation policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A step name carries no task identifier (required by `decouple-tasks`).
    #[error("step {step} has no task id in its name")]
    MissingTaskId { step: String },
}
