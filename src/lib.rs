//! MKTR: minimal k-treewidth relaxation of totally-ordered plans.
//!
//! Takes a valid, totally-ordered plan for a symbolic planning problem and
//! searches for the least-ordered re-statement of it whose causal-constraint
//! structure still encodes as a CSP of bounded treewidth. The output is a
//! family of equally-valid alternative orderings/instantiations of the same
//! steps.
//!
//! Pipeline: plan → causal-structure builders (`causal`) → relaxation policy
//! ranking (`policy`) → the batched relaxation engine (`relax`) → CSP
//! encoding (`encode`/`csp`) → external treewidth / CSP-solver oracles
//! (`solve` traits, supplied by the caller).

pub mod causal;
pub mod config;
pub mod csp;
pub mod encode;
pub mod errors;
pub mod fol;
pub mod plan;
pub mod policy;
pub mod relax;
pub mod solve;
pub mod trace;

pub use causal::{CausalStructure, Consumer, PcLink, PcPlan, Producer, Threat, ThreatSet};
pub use config::MktrConfig;
pub use csp::{Csp, CspValue, CspVar, Expr};
pub use encode::{EncodeOptions, EncoderKind};
pub use errors::{ConfigError, EncodeError, PolicyError, RelaxError, StructureError};
pub use plan::{Plan, PlanResult, PlanSet, Problem, Step};
pub use policy::PolicyKind;
pub use relax::{EngineState, Mktr, Relaxation};
pub use solve::{Assignment, CspSolver, Interrupted, SolveOutcome, TreewidthOracle};
