//! Modal-truth (restricted bindings) encoder: parameters are free.
//!
//! Per candidate producer the conjunction binds the consumer's parameters
//! to the producer's, orders the producer before the consumer, and settles
//! each threat either by forcing the ordering the original plan implies or,
//! when the threat was not co-designated originally, by keeping one
//! parameter pair non-co-designated.

use crate::causal::{detect_threats, Consumer, PcLink, PcPlan};
use crate::csp::{Csp, CspVar, Expr};
use crate::errors::EncodeError;

use super::{
    add_variables, lifted_domains, push_options, require_producers, sorted_producers,
    sorted_threats,
};

pub fn encode(pc: &PcPlan) -> Result<Csp, EncodeError> {
    let plan = pc.plan();
    let sub = plan.substitution();
    let threats = detect_threats(plan, pc.structure());

    let mut csp = Csp::new();
    add_variables(&mut csp, plan);
    lifted_domains(&mut csp, plan);

    for (step_id, step) in plan.steps().iter().enumerate() {
        for pre in &step.pre {
            let consumer = Consumer::new(plan, step_id, pre.clone());
            require_producers(pc, &consumer)?;

            let cons_ord = CspVar::Ordinal(step_id);
            let mut options = Vec::new();

            for producer in sorted_producers(pc, &consumer) {
                let prod_ord = CspVar::Ordinal(producer.step);
                let mut conj = Vec::new();

                for (pv, cv) in producer
                    .literal
                    .atom
                    .args
                    .iter()
                    .zip(consumer.literal.atom.args.iter())
                {
                    conj.push(Expr::eq(CspVar::Param(pv.clone()), CspVar::Param(cv.clone())));
                }

                conj.push(Expr::before(prod_ord.clone(), cons_ord.clone()));

                let link = PcLink::new(producer.clone(), consumer.clone());
                for threat in sorted_threats(&threats, &link) {
                    let threat_ord = CspVar::Ordinal(threat.step);

                    // first originally-differing parameter pair keeps the
                    // threat non-co-designated; a fully co-designated threat
                    // keeps its original side of the link
                    let differing = consumer
                        .literal
                        .atom
                        .args
                        .iter()
                        .zip(threat.literal.atom.args.iter())
                        .find(|(cv, tv)| sub.value(cv) != sub.value(tv));

                    match differing {
                        Some((cv, tv)) => {
                            conj.push(Expr::ne(
                                CspVar::Param(cv.clone()),
                                CspVar::Param(tv.clone()),
                            ));
                        }
                        None => {
                            if threat.step < producer.step {
                                conj.push(Expr::before(threat_ord, prod_ord.clone()));
                            } else if threat.step > consumer.step {
                                conj.push(Expr::before(cons_ord.clone(), threat_ord));
                            } else {
                                conj.push(Expr::before(threat_ord, prod_ord.clone()));
                            }
                        }
                    }
                }

                options.push(Expr::And(conj));
            }

            push_options(&mut csp, &consumer, options)?;
        }
    }

    Ok(csp)
}
