//! Total-order encoder: the modal-truth constraints with every ordinal
//! collapsed back to its original position. Solving this against the
//! original bindings must reproduce the input plan, which is what makes it
//! useful as a validation baseline.

use crate::causal::PcPlan;
use crate::csp::{Csp, CspValue, CspVar};
use crate::errors::EncodeError;

use super::modal_truth;

pub fn encode(pc: &PcPlan) -> Result<Csp, EncodeError> {
    let mut csp = modal_truth::encode(pc)?;

    for step_id in 0..pc.plan().len() {
        csp.pin(&CspVar::Ordinal(step_id), CspValue::Pos(step_id));
    }

    Ok(csp)
}
