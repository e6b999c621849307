//! Prefers producers whose literal has fewer parameters: low-arity links
//! touch fewer binding variables and grow the constraint graph least.

use std::cmp::Ordering;

use crate::causal::PcLink;

use super::{PlanOrder, RelaxationPolicy};

#[derive(Debug, Default)]
pub struct MinimumArity {
    plan_order: PlanOrder,
}

impl MinimumArity {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelaxationPolicy for MinimumArity {
    fn name(&self) -> &'static str {
        "minimum-arity"
    }

    fn resort_each_step(&self) -> bool {
        false
    }

    fn compare(&self, a: &PcLink, b: &PcLink) -> Ordering {
        a.producer
            .literal
            .arity()
            .cmp(&b.producer.literal.arity())
            .then_with(|| self.plan_order.compare(a, b))
    }
}
