//! Prefers links with the fewest threats in the minimal option structure.

use std::cmp::Ordering;

use crate::causal::{detect_threats, CausalStructure, PcLink, PcPlan, ThreatSet};

use super::{PlanOrder, RelaxationPolicy};

#[derive(Debug)]
pub struct MinimiseThreats {
    threats: ThreatSet,
    plan_order: PlanOrder,
}

impl MinimiseThreats {
    pub fn new(pc: &PcPlan, options: &CausalStructure) -> Self {
        Self {
            threats: detect_threats(pc.plan(), options),
            plan_order: PlanOrder,
        }
    }
}

impl RelaxationPolicy for MinimiseThreats {
    fn name(&self) -> &'static str {
        "minimise-threats"
    }

    fn resort_each_step(&self) -> bool {
        false
    }

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        self.threats
            .threat_count(a)
            .cmp(&self.threats.threat_count(b))
            .then_with(|| self.plan_order.compare(a, b))
    }
}
