//! The encoder family: translating a causal structure into CSP constraints.
//!
//! Every encoder produces the same variable set: one ordinal per step plus
//! every free step parameter. Ordinal domains pin the endpoints to the
//! first and last position and let interior steps range over the interior.
//! Parameter domains depend on the encoder: lifted encoders restrict them
//! to type-compatible plan objects (initial/goal parameters stay pinned to
//! their original values), the ground encoders pin every parameter.
//!
//! The encoders differ only in the per-consumer constraints; see each
//! submodule.

pub mod ground;
pub mod modal_truth;
pub mod prf;
pub mod total_order;

use crate::causal::{Consumer, PcLink, PcPlan, Producer, StepId, Threat, ThreatSet};
use crate::csp::{Csp, CspLit, CspValue, CspVar, Expr};
use crate::errors::{ConfigError, EncodeError};
use crate::fol::literal;
use crate::plan::Plan;

/// Extra symmetry-breaking constraints layered on a finished encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// All ordinals pairwise distinct (injective step positions).
    pub all_different: bool,
    /// Steps of the same operator kept in their original relative order.
    pub type_order: bool,
}

/// The closed encoder registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    Ground,
    ModalTruth,
    TotalOrder,
    Prf,
}

impl EncoderKind {
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ground" => Ok(EncoderKind::Ground),
            "modal-truth" => Ok(EncoderKind::ModalTruth),
            "total-order" => Ok(EncoderKind::TotalOrder),
            "prf" => Ok(EncoderKind::Prf),
            other => Err(ConfigError::UnknownEncoder(other.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EncoderKind::Ground => "ground",
            EncoderKind::ModalTruth => "modal-truth",
            EncoderKind::TotalOrder => "total-order",
            EncoderKind::Prf => "prf",
        }
    }

    /// True if the encoding keeps the original total order.
    pub fn is_total_order(&self) -> bool {
        matches!(self, EncoderKind::TotalOrder)
    }

    /// True if parameter bindings are pinned to the original plan's.
    pub fn is_ground(&self) -> bool {
        matches!(self, EncoderKind::Ground | EncoderKind::Prf)
    }

    pub fn encode(&self, pc: &PcPlan, opts: EncodeOptions) -> Result<Csp, EncodeError> {
        let mut csp = match self {
            EncoderKind::Ground => ground::encode(pc)?,
            EncoderKind::ModalTruth => modal_truth::encode(pc)?,
            EncoderKind::TotalOrder => total_order::encode(pc)?,
            EncoderKind::Prf => prf::encode(pc)?,
        };

        if opts.type_order {
            add_type_ordering(&mut csp, pc.plan());
        }
        if opts.all_different {
            add_all_different(&mut csp, pc.plan());
        }
        Ok(csp)
    }
}

impl std::fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Adds every step parameter and step ordinal as a CSP variable.
pub(crate) fn add_variables(csp: &mut Csp, plan: &Plan) {
    for step in plan.steps() {
        for param in &step.params {
            csp.add_variable(CspVar::Param(param.clone()));
        }
    }
    for step_id in 0..plan.len() {
        csp.add_variable(CspVar::Ordinal(step_id));
    }
}

/// Ordinal domains shared by every encoder: endpoints pinned, interior
/// ordinals over every interior position.
pub(crate) fn ordinal_domains(csp: &mut Csp, plan: &Plan) {
    let last = plan.len() - 1;
    for step_id in 0..plan.len() {
        let var = CspVar::Ordinal(step_id);
        csp.add_domain_value(&var, CspValue::Pos(step_id));
        if step_id != 0 && step_id != last {
            for pos in 1..last {
                csp.add_domain_value(&var, CspValue::Pos(pos));
            }
        }
    }
}

/// Lifted parameter domains: initial/goal parameters pinned to their
/// original values, everything else open to all type-compatible objects.
pub(crate) fn lifted_domains(csp: &mut Csp, plan: &Plan) {
    ordinal_domains(csp, plan);

    let sub = plan.substitution();
    for (step_id, step) in plan.steps().iter().enumerate() {
        let pinned = step_id == 0 || step_id == plan.len() - 1;
        for param in &step.params {
            let var = CspVar::Param(param.clone());
            if pinned {
                csp.add_domain_value(&var, CspValue::Obj(sub.value(param).clone()));
            } else {
                for obj in plan.problem().objects_of_type(&param.ty) {
                    csp.add_domain_value(&var, CspValue::Obj(obj.clone()));
                }
            }
        }
    }
}

/// Ground parameter domains: every parameter pinned to its original value.
pub(crate) fn ground_domains(csp: &mut Csp, plan: &Plan) {
    ordinal_domains(csp, plan);

    let sub = plan.substitution();
    for step in plan.steps() {
        for param in &step.params {
            let var = CspVar::Param(param.clone());
            csp.add_domain_value(&var, CspValue::Obj(sub.value(param).clone()));
        }
    }
}

fn add_all_different(csp: &mut Csp, plan: &Plan) {
    let ordinals = (0..plan.len()).map(CspVar::Ordinal).collect();
    csp.add_constraint(Expr::Lit(CspLit::AllDifferent(ordinals)));
}

/// Chains `Before` constraints through same-named steps in plan order, so
/// symmetric permutations of identical operators collapse to one solution.
fn add_type_ordering(csp: &mut Csp, plan: &Plan) {
    let mut by_name: Vec<(&str, Vec<StepId>)> = Vec::new();
    for (step_id, step) in plan.steps().iter().enumerate() {
        match by_name.iter_mut().find(|(name, _)| *name == step.name) {
            Some((_, ids)) => ids.push(step_id),
            None => by_name.push((&step.name, vec![step_id])),
        }
    }

    for (_, ids) in by_name {
        for pair in ids.windows(2) {
            csp.add_constraint(Expr::before(CspVar::Ordinal(pair[0]), CspVar::Ordinal(pair[1])));
        }
    }
}

/// Producers of a consumer in a deterministic order, so constraint layout
/// and exports do not depend on hash iteration.
pub(crate) fn sorted_producers<'a>(
    pc: &'a PcPlan,
    consumer: &Consumer,
) -> Vec<&'a Producer> {
    let mut producers: Vec<&Producer> = pc.structure().producers_of(consumer).collect();
    producers.sort_by(|a, b| {
        a.step
            .cmp(&b.step)
            .then_with(|| literal::canonical_cmp(&a.literal, &b.literal))
    });
    producers
}

/// Threats to a link in a deterministic order.
pub(crate) fn sorted_threats<'a>(threats: &'a ThreatSet, link: &PcLink) -> Vec<&'a Threat> {
    let mut list: Vec<&Threat> = threats.threats_to(link).collect();
    list.sort_by(|a, b| {
        a.step
            .cmp(&b.step)
            .then_with(|| literal::canonical_cmp(&a.literal, &b.literal))
    });
    list
}

/// Per-consumer disjunction wrap-up shared by the ground and modal-truth
/// encoders: a non-propositional consumer with no disjuncts means a causal
/// link went missing.
pub(crate) fn push_options(
    csp: &mut Csp,
    consumer: &Consumer,
    options: Vec<Expr>,
) -> Result<(), EncodeError> {
    if options.is_empty() {
        if consumer.literal.atom.args.is_empty() {
            return Ok(());
        }
        return Err(EncodeError::NoDisjuncts { consumer: consumer.to_string() });
    }
    csp.add_constraint(Expr::Or(options));
    Ok(())
}

pub(crate) fn require_producers(pc: &PcPlan, consumer: &Consumer) -> Result<(), EncodeError> {
    if pc.structure().producer_count(consumer) == 0 {
        return Err(EncodeError::NoProducer { consumer: consumer.to_string() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rejects_unknown_names() {
        assert!(EncoderKind::from_name("modal-truth").is_ok());
        assert!(matches!(
            EncoderKind::from_name("no-such-encoder"),
            Err(ConfigError::UnknownEncoder(_))
        ));
    }

    #[test]
    fn kind_flags() {
        assert!(EncoderKind::TotalOrder.is_total_order());
        assert!(!EncoderKind::ModalTruth.is_total_order());
        assert!(EncoderKind::Ground.is_ground());
        assert!(EncoderKind::Prf.is_ground());
        assert!(!EncoderKind::ModalTruth.is_ground());
    }
}
