//! Producer-diversity policies: decouple the causal graph by spreading
//! links across consumers with few alternatives and producers serving few
//! consumers. Both recompute their rankings after every accepted link.

use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::causal::{detect_threats, CausalStructure, Consumer, PcLink, PcPlan, StepId};
use crate::plan::Plan;

use super::{PlanOrder, RelaxationPolicy};

/// Prefers consumers that currently have few alternative producers, then
/// producers that currently serve few consumers.
#[derive(Debug)]
pub struct RelaxProducers {
    producer_count: FxHashMap<Consumer, usize>,
    served: FxHashMap<StepId, usize>,
    plan_order: PlanOrder,
}

impl RelaxProducers {
    pub fn new(pc: &PcPlan) -> Self {
        let mut policy = Self {
            producer_count: FxHashMap::default(),
            served: FxHashMap::default(),
            plan_order: PlanOrder,
        };
        policy.prepare(pc.structure());
        policy
    }
}

impl RelaxationPolicy for RelaxProducers {
    fn name(&self) -> &'static str {
        "relax-producers"
    }

    fn resort_each_step(&self) -> bool {
        true
    }

    fn prepare(&mut self, current: &CausalStructure) {
        self.producer_count.clear();
        let mut served: FxHashMap<StepId, FxHashSet<&Consumer>> = FxHashMap::default();

        for link in current.links() {
            *self.producer_count.entry(link.consumer.clone()).or_default() += 1;
            served
                .entry(link.producer.step)
                .or_default()
                .insert(&link.consumer);
        }

        self.served = served.into_iter().map(|(s, set)| (s, set.len())).collect();
    }

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        let alternatives =
            |link: &PcLink| self.producer_count.get(&link.consumer).copied().unwrap_or(0);
        let serving = |link: &PcLink| self.served.get(&link.producer.step).copied().unwrap_or(0);

        alternatives(a)
            .cmp(&alternatives(b))
            .then_with(|| serving(a).cmp(&serving(b)))
            .then_with(|| self.plan_order.compare(a, b))
    }
}

/// A sharper variant keyed by operator name: prefers consumers whose step
/// name has the widest consumer or threat fan-out (taking the hardest
/// operators first), then producers whose step name has gained the most
/// producers since the search started.
#[derive(Debug)]
pub struct RelaxProducers2 {
    plan: Arc<Plan>,
    consumer_count: FxHashMap<String, usize>,
    max_threat_cons: FxHashMap<String, usize>,
    orig_producer_count: FxHashMap<String, usize>,
    producer_delta: FxHashMap<String, isize>,
    plan_order: PlanOrder,
}

impl RelaxProducers2 {
    pub fn new(pc: &PcPlan, _options: &CausalStructure) -> Self {
        let plan = pc.plan().clone();
        let current = pc.structure();

        // distinct consumer steps fed by each step's effects
        let mut consumer_count = FxHashMap::default();
        for (step_id, step) in plan.steps().iter().enumerate() {
            let mut fed: FxHashSet<StepId> = FxHashSet::default();
            for post in &step.post {
                let producer = crate::causal::Producer::new(step_id, post.clone());
                fed.extend(current.consumers_of(&producer).map(|c| c.step));
            }
            consumer_count.insert(step.name.clone(), fed.len());
        }

        // widest consumer fan-out among the steps threatening each step's
        // own incoming links
        let threats = detect_threats(&plan, current);
        let mut max_threat_cons = FxHashMap::default();
        for (step_id, step) in plan.steps().iter().enumerate() {
            let mut max = 0;
            for pre in &step.pre {
                let consumer = Consumer::new(&plan, step_id, pre.clone());
                for producer in current.producers_of(&consumer) {
                    let link = PcLink::new(producer.clone(), consumer.clone());
                    for threat in threats.threats_to(&link) {
                        let name = &plan.step(threat.step).name;
                        max = max.max(consumer_count[name]);
                    }
                }
            }
            max_threat_cons.insert(step.name.clone(), max);
        }

        let orig_producer_count = Self::producer_counts(&plan, current);

        let mut policy = Self {
            plan,
            consumer_count,
            max_threat_cons,
            orig_producer_count,
            producer_delta: FxHashMap::default(),
            plan_order: PlanOrder,
        };
        policy.rebuild_delta(current);
        policy
    }

    /// Distinct producer steps serving each step's preconditions.
    fn producer_counts(plan: &Plan, current: &CausalStructure) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for (step_id, step) in plan.steps().iter().enumerate() {
            let mut serving: FxHashSet<StepId> = FxHashSet::default();
            for pre in &step.pre {
                let consumer = Consumer::new(plan, step_id, pre.clone());
                serving.extend(current.producers_of(&consumer).map(|p| p.step));
            }
            counts.insert(step.name.clone(), serving.len());
        }
        counts
    }

    fn rebuild_delta(&mut self, current: &CausalStructure) {
        self.producer_delta.clear();
        for (name, count) in Self::producer_counts(&self.plan, current) {
            let orig = self.orig_producer_count[&name] as isize;
            self.producer_delta.insert(name, count as isize - orig);
        }
    }
}

impl RelaxationPolicy for RelaxProducers2 {
    fn name(&self) -> &'static str {
        "relax-producers-2"
    }

    fn resort_each_step(&self) -> bool {
        true
    }

    fn prepare(&mut self, current: &CausalStructure) {
        self.rebuild_delta(current);
    }

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        let fan = |link: &PcLink| {
            let name = &self.plan.step(link.consumer.step).name;
            self.consumer_count[name].max(self.max_threat_cons[name])
        };
        let delta = |link: &PcLink| self.producer_delta[&self.plan.step(link.producer.step).name];

        fan(b)
            .cmp(&fan(a))
            .then_with(|| delta(b).cmp(&delta(a)))
            .then_with(|| self.plan_order.compare(a, b))
    }
}
