//! Prefers links whose consumer touches the fewest necessary orderings.
//!
//! The necessary-ordering relation holds between steps that are already
//! co-designated and ordered in the original plan, either directly along a
//! link or through a threat to one. Consumers with no such orderings sort
//! last (they are already free), lightly-entangled consumers first.

use std::cmp::Ordering;

use petgraph::graphmap::DiGraphMap;
use rustc_hash::FxHashMap;

use crate::causal::{detect_threats, CausalStructure, PcLink, PcPlan, StepId};
use crate::fol::Literal;
use crate::plan::Plan;

use super::{PlanOrder, RelaxationPolicy};

#[derive(Debug)]
pub struct RelaxNonConcurrency {
    /// in-degree + out-degree per step in the necessary-ordering graph
    degree: FxHashMap<StepId, usize>,
    plan_order: PlanOrder,
}

impl RelaxNonConcurrency {
    pub fn new(pc: &PcPlan, options: &CausalStructure) -> Self {
        let plan = pc.plan();
        let threats = detect_threats(plan, options);

        let mut ncr: DiGraphMap<StepId, ()> = DiGraphMap::new();

        for link in options.links() {
            let prod = &link.producer;
            let cons = &link.consumer;

            if codesignated(plan, &prod.literal, &cons.literal) && prod.step < cons.step {
                ncr.add_edge(prod.step, cons.step, ());
            }

            for threat in threats.threats_to(link) {
                if codesignated(plan, &prod.literal, &threat.literal) && prod.step < threat.step {
                    ncr.add_edge(prod.step, threat.step, ());
                }
                if codesignated(plan, &cons.literal, &threat.literal) && cons.step < threat.step {
                    ncr.add_edge(cons.step, threat.step, ());
                }
            }
        }

        let mut degree: FxHashMap<StepId, usize> = FxHashMap::default();
        for (from, to, _) in ncr.all_edges() {
            *degree.entry(from).or_default() += 1;
            *degree.entry(to).or_default() += 1;
        }

        Self { degree, plan_order: PlanOrder }
    }

    fn consumer_degree(&self, link: &PcLink) -> usize {
        match self.degree.get(&link.consumer.step) {
            Some(&n) if n > 0 => n,
            _ => usize::MAX,
        }
    }
}

impl RelaxationPolicy for RelaxNonConcurrency {
    fn name(&self) -> &'static str {
        "relax-non-concurrency"
    }

    fn resort_each_step(&self) -> bool {
        false
    }

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        self.consumer_degree(a)
            .cmp(&self.consumer_degree(b))
            .then_with(|| self.plan_order.compare(a, b))
    }
}

fn codesignated(plan: &Plan, a: &Literal, b: &Literal) -> bool {
    plan.substitution().codesignated(&a.atom.args, &b.atom.args)
}
