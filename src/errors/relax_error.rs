//! Engine errors, aggregating subsystem errors via `From` conversions.

use crate::solve::Interrupted;

use super::{ConfigError, EncodeError, PolicyError, StructureError};

/// Errors surfaced by the relaxation engine.
///
/// Cooperative cancellation of the search loop itself is *not* an error: a
/// timed-out run returns the last committed structure with the `TimedOut`
/// state. [`RelaxError::Interrupted`] only appears on the post-run query
/// paths, where the caller asked a cancelled oracle directly.
#[derive(Debug, thiserror::Error)]
pub enum RelaxError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("causal structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("relaxation policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("oracle call interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    #[error("invalid instantiation found during validation: {0}")]
    InvalidInstantiation(String),

    #[error("relaxation worker terminated abnormally")]
    WorkerFailed,
}
