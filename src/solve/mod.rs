//! Collaborator contracts for the two external oracles.
//!
//! Treewidth computation and CSP solving are consumed as black boxes. Both
//! traits expose a cooperative `cancel` hook; a cancelled call must raise
//! [`Interrupted`] rather than return a stale result. Implementations are
//! invoked synchronously from the relaxation worker thread, so they must be
//! `Send + Sync`.

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::csp::{Csp, CspValue, CspVar, PrimalGraph};

/// Raised when a cancelled oracle call gives up before completing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("oracle call was cancelled before completing")]
pub struct Interrupted;

/// A result plus whether the producing call hit its own time limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome<T> {
    pub value: T,
    pub timed_out: bool,
}

impl<T> SolveOutcome<T> {
    pub fn complete(value: T) -> Self {
        Self { value, timed_out: false }
    }

    pub fn partial(value: T) -> Self {
        Self { value, timed_out: true }
    }
}

/// One CSP solution: a total assignment of values to variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: FxHashMap<CspVar, CspValue>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, var: CspVar, value: CspValue) {
        self.values.insert(var, value);
    }

    pub fn get(&self, var: &CspVar) -> Option<&CspValue> {
        self.values.get(var)
    }

    pub fn values(&self) -> &FxHashMap<CspVar, CspValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(CspVar, CspValue)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (CspVar, CspValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// Upper-bound treewidth oracle over the primal constraint graph.
pub trait TreewidthOracle: Send + Sync {
    /// An upper bound on the graph's treewidth.
    fn upper_bound(&self, graph: &PrimalGraph) -> Result<usize, Interrupted>;

    /// Whether the graph's treewidth strictly exceeds `bound`.
    fn is_greater_than(&self, graph: &PrimalGraph, bound: usize) -> Result<bool, Interrupted>;

    /// Requests cooperative cancellation of any in-flight call.
    fn cancel(&self);
}

/// Counting/enumerating CSP solver. `timeout` of `None` means no limit;
/// hitting the limit is reported through [`SolveOutcome::timed_out`], not
/// as an error.
pub trait CspSolver: Send + Sync {
    fn count_solutions(
        &self,
        csp: &Csp,
        timeout: Option<Duration>,
    ) -> Result<SolveOutcome<u64>, Interrupted>;

    fn solutions(
        &self,
        csp: &Csp,
        timeout: Option<Duration>,
    ) -> Result<SolveOutcome<Vec<Assignment>>, Interrupted>;

    /// Requests cooperative cancellation of any in-flight call.
    fn cancel(&self);
}
