//! Reduced-flexibility baseline encoder: ground domains, and only the
//! ordering constraints already implied by the original plan's order. It
//! never introduces a new ordering option, so its solution set is a lower
//! bound for every other encoder.

use crate::causal::{detect_threats, Consumer, PcLink, PcPlan, StepId};
use crate::csp::{Csp, CspVar, Expr};
use crate::errors::EncodeError;

use super::{add_variables, ground_domains, require_producers, sorted_producers, sorted_threats};

pub fn encode(pc: &PcPlan) -> Result<Csp, EncodeError> {
    let plan = pc.plan();
    let sub = plan.substitution();
    let threats = detect_threats(plan, pc.structure());

    let mut csp = Csp::new();
    add_variables(&mut csp, plan);
    ground_domains(&mut csp, plan);

    let retain = |csp: &mut Csp, a: StepId, b: StepId| {
        if a < b {
            csp.add_constraint(Expr::before(CspVar::Ordinal(a), CspVar::Ordinal(b)));
        } else if b < a {
            csp.add_constraint(Expr::before(CspVar::Ordinal(b), CspVar::Ordinal(a)));
        }
    };

    for (step_id, step) in plan.steps().iter().enumerate() {
        for pre in &step.pre {
            let consumer = Consumer::new(plan, step_id, pre.clone());
            require_producers(pc, &consumer)?;

            for producer in sorted_producers(pc, &consumer) {
                if !sub.codesignated(&consumer.literal.atom.args, &producer.literal.atom.args) {
                    continue;
                }

                retain(&mut csp, producer.step, consumer.step);

                let link = PcLink::new(producer.clone(), consumer.clone());
                for threat in sorted_threats(&threats, &link) {
                    if !sub.codesignated(&consumer.literal.atom.args, &threat.literal.atom.args) {
                        continue;
                    }
                    retain(&mut csp, producer.step, threat.step);
                    retain(&mut csp, consumer.step, threat.step);
                }
            }
        }
    }

    Ok(csp)
}
