//! Prefers links that move a consumer off the initial-state task or its own
//! task, for plans whose step names embed a task identifier.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::causal::{CausalStructure, Consumer, PcLink, PcPlan, StepId};
use crate::errors::PolicyError;

use super::{RelaxProducers, RelaxationPolicy};

/// Task identifiers are the digits after an `i` in the step name, e.g.
/// `i3-move` belongs to task 3.
static TASK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"i(\d+)").expect("valid pattern"));

const INIT_TASK: i64 = -1;
const GOAL_TASK: i64 = i64::MAX;

#[derive(Debug)]
pub struct DecoupleTasks {
    tasks: FxHashMap<StepId, i64>,
    original_producer_tasks: FxHashMap<Consumer, i64>,
    inner: RelaxProducers,
}

impl DecoupleTasks {
    /// Fails fast when a step name carries no task identifier; that is a
    /// configuration problem, not something to discover mid-search.
    pub fn new(pc: &PcPlan) -> Result<Self, PolicyError> {
        let plan = pc.plan();

        let mut tasks = FxHashMap::default();
        for (step_id, step) in plan.steps().iter().enumerate() {
            let task = if step.is_init() {
                INIT_TASK
            } else if step.is_goal() {
                GOAL_TASK
            } else {
                parse_task(&step.name)
                    .ok_or_else(|| PolicyError::MissingTaskId { step: step.name.clone() })?
            };
            tasks.insert(step_id, task);
        }

        let mut original_producer_tasks = FxHashMap::default();
        for link in pc.structure().links() {
            original_producer_tasks.insert(link.consumer.clone(), tasks[&link.producer.step]);
        }

        Ok(Self {
            tasks,
            original_producer_tasks,
            inner: RelaxProducers::new(pc),
        })
    }

    fn stays_home(&self, link: &PcLink) -> bool {
        let orig = self.original_producer_tasks[&link.consumer];
        orig == INIT_TASK || orig == self.tasks[&link.consumer.step]
    }
}

impl RelaxationPolicy for DecoupleTasks {
    fn name(&self) -> &'static str {
        "decouple-tasks"
    }

    fn resort_each_step(&self) -> bool {
        self.inner.resort_each_step()
    }

    fn prepare(&mut self, current: &CausalStructure) {
        self.inner.prepare(current);
    }

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        // consumers not originally fed by init or their own task first
        self.stays_home(a)
            .cmp(&self.stays_home(b))
            // then links from the earliest task, init before everything
            .then_with(|| self.tasks[&a.producer.step].cmp(&self.tasks[&b.producer.step]))
            .then_with(|| self.inner.compare(a, b))
    }
}

fn parse_task(name: &str) -> Option<i64> {
    TASK_PATTERN
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
