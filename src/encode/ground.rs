//! Ground encoder: parameter bindings are pinned to the original plan's,
//! orderings are free.
//!
//! Per consumer: a disjunction over co-designated candidate producers, each
//! conjoined with "producer before consumer" and, per co-designated threat,
//! "consumer before threat" or "threat before producer".

use crate::causal::{detect_threats, Consumer, PcLink, PcPlan};
use crate::csp::{Csp, CspVar, Expr};
use crate::errors::EncodeError;

use super::{
    add_variables, ground_domains, push_options, require_producers, sorted_producers,
    sorted_threats,
};

pub fn encode(pc: &PcPlan) -> Result<Csp, EncodeError> {
    let plan = pc.plan();
    let sub = plan.substitution();
    let threats = detect_threats(plan, pc.structure());

    let mut csp = Csp::new();
    add_variables(&mut csp, plan);
    ground_domains(&mut csp, plan);

    for (step_id, step) in plan.steps().iter().enumerate() {
        for pre in &step.pre {
            let consumer = Consumer::new(plan, step_id, pre.clone());
            require_producers(pc, &consumer)?;

            let cons_ord = CspVar::Ordinal(step_id);
            let mut options = Vec::new();

            for producer in sorted_producers(pc, &consumer) {
                if !sub.codesignated(&consumer.literal.atom.args, &producer.literal.atom.args) {
                    continue;
                }

                let prod_ord = CspVar::Ordinal(producer.step);
                let mut conj =
                    vec![Expr::before(prod_ord.clone(), cons_ord.clone())];

                let link = PcLink::new(producer.clone(), consumer.clone());
                for threat in sorted_threats(&threats, &link) {
                    if !sub.codesignated(&consumer.literal.atom.args, &threat.literal.atom.args) {
                        continue;
                    }
                    let threat_ord = CspVar::Ordinal(threat.step);
                    conj.push(Expr::Or(vec![
                        Expr::before(cons_ord.clone(), threat_ord.clone()),
                        Expr::before(threat_ord, prod_ord.clone()),
                    ]));
                }

                options.push(Expr::And(conj));
            }

            push_options(&mut csp, &consumer, options)?;
        }
    }

    Ok(csp)
}
