//! The MKTR relaxation engine.
//!
//! Grows the actual causal structure towards the minimal one, one ranked
//! batch of candidate links at a time, keeping the encoded CSP's treewidth
//! within budget. The loop runs on a dedicated worker thread; the caller
//! blocks on a completion channel with an optional wall-clock budget and,
//! on timeout, cancels the token and both oracles, then waits unbounded
//! for the worker's acknowledgement. Edges added by an in-flight cancelled
//! attempt are rolled back before the worker exits, so a timed-out run
//! still holds the last successfully committed structure.

pub mod cancel;

pub use cancel::CancellationToken;

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::causal::{build_actual, build_minimal, PcLink, PcPlan};
use crate::config::MktrConfig;
use crate::csp::{Csp, PrimalGraph};
use crate::encode::{EncodeOptions, EncoderKind};
use crate::errors::RelaxError;
use crate::plan::{Plan, PlanSet};
use crate::policy::{sort_and_filter, PolicyKind, RelaxationPolicy};
use crate::solve::{CspSolver, Interrupted, SolveOutcome, TreewidthOracle};

/// Engine lifecycle. Failures surface as [`RelaxError`] from
/// [`Mktr::relax`]; the `Failed` state records them on the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Running,
    TimedOut,
    Completed,
    Failed,
}

/// The relaxation engine: one plan, one configuration, two oracles.
pub struct Mktr {
    plan: Arc<Plan>,
    config: MktrConfig,
    encoder: EncoderKind,
    policy_kind: PolicyKind,
    treewidth: Arc<dyn TreewidthOracle>,
    solver: Arc<dyn CspSolver>,
    token: CancellationToken,
    state: EngineState,
}

impl std::fmt::Debug for Mktr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mktr")
            .field("plan", &self.plan)
            .field("config", &self.config)
            .field("encoder", &self.encoder)
            .field("policy_kind", &self.policy_kind)
            .field("token", &self.token)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

struct RunOutcome {
    pc: PcPlan,
    links_tested: usize,
    links_added: usize,
    cancelled: bool,
}

impl Mktr {
    /// Validates the configuration up front; an unknown encoder or policy
    /// name fails here, before any plan processing.
    pub fn new(
        plan: Arc<Plan>,
        config: MktrConfig,
        treewidth: Arc<dyn TreewidthOracle>,
        solver: Arc<dyn CspSolver>,
    ) -> Result<Self, RelaxError> {
        let (encoder, policy_kind) = config.resolve()?;
        Ok(Self {
            plan,
            config,
            encoder,
            policy_kind,
            treewidth,
            solver,
            token: CancellationToken::new(),
            state: EngineState::Idle,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// A handle for cancelling the run from another thread.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs the relaxation to completion, timeout or cancellation.
    pub fn relax(&mut self) -> Result<Relaxation, RelaxError> {
        info!(
            problem = %self.plan.problem().name,
            treewidth = self.config.max_treewidth,
            encoder = %self.encoder,
            policy = %self.policy_kind,
            "starting relaxation"
        );
        self.state = EngineState::Running;

        let result = self.run_supervised();
        self.state = match &result {
            Ok(outcome) if outcome.cancelled => EngineState::TimedOut,
            Ok(_) => EngineState::Completed,
            Err(_) => EngineState::Failed,
        };
        let outcome = result?;

        info!(
            state = ?self.state,
            links_tested = outcome.links_tested,
            links_added = outcome.links_added,
            "relaxation finished"
        );

        Ok(Relaxation {
            pc_plan: outcome.pc,
            state: self.state,
            encoder: self.encoder,
            policy: self.policy_kind,
            links_tested: outcome.links_tested,
            links_added: outcome.links_added,
            solver: self.solver.clone(),
        })
    }

    /// Spawns the worker and supervises it against the wall-clock budget.
    /// The post-timeout wait is deliberately unbounded: the worker must be
    /// allowed to roll back and acknowledge before we return its structure.
    fn run_supervised(&self) -> Result<RunOutcome, RelaxError> {
        let time_limit = self.config.time_limit();
        let (tx, rx) = bounded(1);

        thread::scope(|scope| {
            let token = self.token.clone();
            scope.spawn(move || {
                let _ = tx.send(self.run_loop(&token));
            });

            match time_limit {
                None => rx.recv().unwrap_or(Err(RelaxError::WorkerFailed)),
                Some(limit) => match rx.recv_timeout(limit) {
                    Ok(result) => result,
                    Err(RecvTimeoutError::Timeout) => {
                        info!("time limit reached, waiting for the worker to stop");
                        self.token.cancel();
                        self.treewidth.cancel();
                        self.solver.cancel();
                        rx.recv().unwrap_or(Err(RelaxError::WorkerFailed))
                    }
                    Err(RecvTimeoutError::Disconnected) => Err(RelaxError::WorkerFailed),
                },
            }
        })
    }

    /// The search loop. Greedy and monotonic: a committed batch is never
    /// revisited; only within-batch bisection amortises the encode/measure
    /// cost of a failed multi-link attempt.
    fn run_loop(&self, token: &CancellationToken) -> Result<RunOutcome, RelaxError> {
        let total_order = self.encoder.is_total_order();

        debug!("building actual causal structure");
        let actual = build_actual(&self.plan, total_order)?;
        let mut pc = PcPlan::new(self.plan.clone(), actual);

        debug!("building minimal causal structure");
        let minimal = build_minimal(&self.plan, total_order)?;

        let mut policy = self.policy_kind.build(&pc, &minimal)?;

        let candidates: Vec<PcLink> = minimal
            .links()
            .filter(|link| !pc.structure().contains(link))
            .cloned()
            .collect();
        let mut options = sort_and_filter(policy.as_mut(), pc.structure(), candidates);

        debug!(
            links = pc.structure().link_count(),
            options = options.len(),
            "starting search"
        );

        let mut links_tested = 0;
        let mut links_added = 0;
        let mut prev_count: u64 = 1;

        let finish = |pc: PcPlan, cancelled: bool, links_tested, links_added| RunOutcome {
            pc,
            links_tested,
            links_added,
            cancelled,
        };

        while !options.is_empty() {
            if token.is_cancelled() {
                return Ok(finish(pc, true, links_tested, links_added));
            }

            links_tested += 1;

            let take = self.config.links_per_step.min(options.len());
            let mut batch: Vec<PcLink> = options.drain(..take).collect();
            let mut n = batch.len();

            while !batch.is_empty() {
                if token.is_cancelled() {
                    return Ok(finish(pc, true, links_tested, links_added));
                }

                let n_now = n.min(batch.len());
                let attempt: Vec<PcLink> = batch[..n_now].to_vec();

                for link in &attempt {
                    pc.structure_mut().add(link.clone());
                }

                let csp = self.encoder.encode(&pc, EncodeOptions::default())?;
                let primal = PrimalGraph::from_csp(&csp);

                let over_budget =
                    match self.treewidth.is_greater_than(&primal, self.config.max_treewidth) {
                        Ok(answer) => answer,
                        Err(Interrupted) => {
                            rollback(&mut pc, &attempt);
                            return Ok(finish(pc, true, links_tested, links_added));
                        }
                    };

                let committed = !over_budget;
                if committed {
                    links_added += attempt.len();
                    batch.drain(..n_now);

                    if policy.resort_each_step() {
                        options = sort_and_filter(policy.as_mut(), pc.structure(), options);
                    }

                    debug!(
                        links = pc.structure().link_count(),
                        options = options.len(),
                        batch = attempt.len(),
                        "committed batch"
                    );
                } else {
                    rollback(&mut pc, &attempt);
                    if n_now == 1 {
                        // a single over-budget link is discarded for good
                        batch.drain(..1);
                        debug!(link = %attempt[0], "discarded link");
                    }
                }

                if self.config.verbose {
                    match self.verbose_report(&pc, &csp, &primal, committed, &mut prev_count) {
                        Ok(()) => {}
                        Err(RelaxError::Interrupted(_)) => {
                            return Ok(finish(pc, true, links_tested, links_added));
                        }
                        Err(err) => return Err(err),
                    }
                }

                if n > 1 {
                    n /= 2;
                }
            }
        }

        Ok(finish(pc, false, links_tested, links_added))
    }

    /// Per-iteration diagnostics: treewidth estimate, instantiation count,
    /// and optional validation of every newly found instantiation. Side
    /// effects only; never part of the algorithm's correctness.
    fn verbose_report(
        &self,
        pc: &PcPlan,
        csp: &Csp,
        primal: &PrimalGraph,
        committed: bool,
        prev_count: &mut u64,
    ) -> Result<(), RelaxError> {
        let mut tw_est = self.treewidth.upper_bound(primal)?;

        if committed {
            tw_est = tw_est.min(self.config.max_treewidth);
            let count = self
                .solver
                .count_solutions(csp, self.config.query_time_limit())?;

            info!(
                links = pc.structure().link_count(),
                treewidth = tw_est,
                plans = count.value,
                timed_out = count.timed_out,
                "structure grew"
            );

            if count.value != *prev_count && self.config.validate_instantiations {
                self.validate_instantiations(pc)?;
            }
            *prev_count = count.value;
        } else {
            debug!(treewidth = tw_est, "attempt over budget");
        }

        Ok(())
    }

    /// Re-instantiates the current structure and validates every plan by
    /// forward simulation. An invalid plan is a logic defect and fatal.
    fn validate_instantiations(&self, pc: &PcPlan) -> Result<(), RelaxError> {
        let opts = EncodeOptions { all_different: true, type_order: true };
        let csp = self.encoder.encode(pc, opts)?;
        let solutions = self.solver.solutions(&csp, self.config.query_time_limit())?;

        let set = PlanSet::new(self.plan.clone(), solutions.value);
        for plan in set.plans()? {
            let result = plan.validate();
            if !result.valid {
                return Err(RelaxError::InvalidInstantiation(result.message));
            }
        }
        Ok(())
    }
}

fn rollback(pc: &mut PcPlan, attempt: &[PcLink]) {
    for link in attempt {
        pc.structure_mut().remove(link);
    }
}

/// Outcome of a relaxation run: the final relaxed plan and the queries the
/// caller can run against it.
pub struct Relaxation {
    pc_plan: PcPlan,
    state: EngineState,
    encoder: EncoderKind,
    policy: PolicyKind,
    links_tested: usize,
    links_added: usize,
    solver: Arc<dyn CspSolver>,
}

impl Relaxation {
    pub fn pc_plan(&self) -> &PcPlan {
        &self.pc_plan
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn timed_out(&self) -> bool {
        self.state == EngineState::TimedOut
    }

    pub fn links_tested(&self) -> usize {
        self.links_tested
    }

    pub fn links_added(&self) -> usize {
        self.links_added
    }

    /// The fully-encoded CSP for the final structure, with the injective
    /// ordinal constraint and same-operator ordering added to suppress
    /// symmetric duplicate solutions.
    pub fn final_csp(&self) -> Result<Csp, RelaxError> {
        let opts = EncodeOptions { all_different: true, type_order: true };
        Ok(self.encoder.encode(&self.pc_plan, opts)?)
    }

    /// Counts the re-instantiations of the final structure.
    pub fn instantiation_count(
        &self,
        timeout: Option<std::time::Duration>,
    ) -> Result<SolveOutcome<u64>, RelaxError> {
        let csp = self.final_csp()?;
        Ok(self.solver.count_solutions(&csp, timeout)?)
    }

    /// Enumerates the re-instantiations of the final structure.
    pub fn reinstantiations(
        &self,
        timeout: Option<std::time::Duration>,
    ) -> Result<SolveOutcome<PlanSet>, RelaxError> {
        let csp = self.final_csp()?;
        let solutions = self.solver.solutions(&csp, timeout)?;
        Ok(SolveOutcome {
            value: PlanSet::new(self.pc_plan.plan().clone(), solutions.value),
            timed_out: solutions.timed_out,
        })
    }

    /// Serializable summary of the run.
    pub fn report(&self) -> RelaxationReport {
        RelaxationReport {
            state: self.state,
            encoder: self.encoder.name().to_owned(),
            policy: self.policy.name().to_owned(),
            links_tested: self.links_tested,
            links_added: self.links_added,
            final_links: self.pc_plan.structure().link_count(),
            steps: self.pc_plan.plan().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationReport {
    pub state: EngineState,
    pub encoder: String,
    pub policy: String,
    pub links_tested: usize,
    pub links_added: usize,
    pub final_links: usize,
    pub steps: usize,
}
