//! Construction of the actual and minimal causal structures from a plan.
//!
//! The *actual* (equivalent) structure records, for every need, the single
//! producer that satisfies it in the original total order. The *minimal*
//! (all-options) structure records every syntactically admissible producer.
//! Both are driven by the plan's step order; both treat equality and negated
//! needs specially, since the initial state can satisfy those without
//! containing an explicit literal.

use crate::errors::StructureError;
use crate::fol::{Atom, Literal, Var};
use crate::plan::Plan;

use super::pct::{Consumer, PcLink, Producer};
use super::structure::CausalStructure;

/// Builds the actual causal structure: exactly one producer per need, the
/// one realised by the plan's own order and bindings.
///
/// For each need the strictly earlier steps are scanned in order and the
/// last match wins: a later producer overwrites an earlier one, mirroring
/// state overwriting in the executed plan. A need with no producer means
/// the input plan is inconsistent.
pub fn build_actual(plan: &Plan, total_order: bool) -> Result<CausalStructure, StructureError> {
    let sub = plan.substitution();
    let mut structure = CausalStructure::new(total_order);

    for i in 1..plan.len() {
        let cons = plan.step(i);

        for pre in &cons.pre {
            let mut actual: Option<Producer> = None;

            for j in 0..i {
                let prod = plan.step(j);

                if j == 0 {
                    // equality and negated needs can link straight to the
                    // initial state, rebound onto initial-state variables
                    if pre.atom.pred.is_equality() {
                        let holds = (sub.value(&pre.atom.args[0]) == sub.value(&pre.atom.args[1]))
                            == pre.positive;
                        if holds {
                            if let Some(reset) = initial_rebind(plan, pre) {
                                actual = Some(Producer::new(0, reset));
                            }
                        }
                    } else if !pre.positive {
                        if let Some(reset) = initial_rebind(plan, pre) {
                            if !prod.has_negated_effect(&reset) {
                                actual = Some(Producer::new(0, reset));
                            }
                        }
                    }
                }

                for (post_j, post) in prod.post.iter().enumerate() {
                    if pre.atom.pred == post.atom.pred
                        && pre.positive == post.positive
                        && !prod.undone(post_j)
                        && sub.codesignated(&pre.atom.args, &post.atom.args)
                    {
                        actual = Some(Producer::new(j, post.clone()));
                    }
                }
            }

            let producer = actual.ok_or_else(|| StructureError::NoProducer {
                step: cons.name.clone(),
                literal: pre.to_string(),
            })?;

            structure.add(PcLink::new(producer, Consumer::new(plan, i, pre.clone())));
        }
    }

    Ok(structure)
}

/// Builds the minimal causal structure: every producer that matches a need
/// on predicate symbol, sign and per-position type compatibility, restricted
/// to strictly earlier steps in total-order mode. Initial-state equality and
/// negation producers are enumerated over all type-compatible bindings, not
/// just the realised one.
pub fn build_minimal(plan: &Plan, total_order: bool) -> Result<CausalStructure, StructureError> {
    let types = &plan.problem().types;
    let mut structure = CausalStructure::new(total_order);

    for i in 1..plan.len() {
        let cons = plan.step(i);

        for pre in &cons.pre {
            let consumer = Consumer::new(plan, i, pre.clone());
            let limit = if total_order { i } else { plan.len() };

            for j in 0..limit {
                if j == 0 {
                    if pre.atom.pred.is_equality() {
                        for prod in initial_equality_producers(plan, pre) {
                            structure.add(PcLink::new(prod, consumer.clone()));
                        }
                    } else if !pre.positive {
                        for prod in initial_negation_producers(plan, pre) {
                            structure.add(PcLink::new(prod, consumer.clone()));
                        }
                    }
                }

                if j == i {
                    continue;
                }
                let prod = plan.step(j);

                for (post_j, post) in prod.post.iter().enumerate() {
                    // initial-state effects are never undone
                    if pre.atom.pred == post.atom.pred
                        && pre.positive == post.positive
                        && assignable(types, &post.atom, &pre.atom)
                        && (j == 0 || !prod.undone(post_j))
                    {
                        structure.add(PcLink::new(Producer::new(j, post.clone()), consumer.clone()));
                    }
                }
            }

            if structure.producer_count(&consumer) == 0 {
                return Err(StructureError::NoProducer {
                    step: cons.name.clone(),
                    literal: pre.to_string(),
                });
            }
        }
    }

    Ok(structure)
}

/// Per-position symmetric type compatibility: each producer parameter type
/// must be a subtype or supertype of the corresponding consumer type.
fn assignable(types: &crate::fol::TypeHierarchy, prod: &Atom, cons: &Atom) -> bool {
    prod.args
        .iter()
        .zip(cons.args.iter())
        .all(|(p, c)| types.compatible(&p.ty, &c.ty))
}

/// Rebinds a literal onto initial-state variables carrying the same values.
/// Returns `None` when the initial state has no variable for some value, in
/// which case the initial step simply offers no producer for this need.
fn initial_rebind(plan: &Plan, lit: &Literal) -> Option<Literal> {
    let mut new_args = Vec::with_capacity(lit.atom.args.len());
    for var in &lit.atom.args {
        new_args.push(plan.initial_var_for(var).ok()?.clone());
    }
    Some(lit.with_args(new_args))
}

/// All initial-state producers for an equality need: every pair of
/// initial-state variables with assignable types whose value (in)equality
/// matches the need's sign.
fn initial_equality_producers(plan: &Plan, pre: &Literal) -> Vec<Producer> {
    let sub = plan.substitution();
    let types = &plan.problem().types;
    let init = plan.init();

    let ty1 = &pre.atom.args[0].ty;
    let ty2 = &pre.atom.args[1].ty;

    let mut producers = Vec::new();
    for v1 in init.params.iter().filter(|v| types.is_subtype(&v.ty, ty1)) {
        for v2 in init.params.iter().filter(|v| types.is_subtype(&v.ty, ty2)) {
            if (sub.value(v1) == sub.value(v2)) == pre.positive {
                let lit = pre.with_args([v1.clone(), v2.clone()]);
                producers.push(Producer::new(0, lit));
            }
        }
    }
    producers
}

/// All initial-state producers for a negated need: every type-compatible
/// binding of the need's predicate over initial-state variables whose
/// positive instantiation is absent from the initial effects.
fn initial_negation_producers(plan: &Plan, pre: &Literal) -> Vec<Producer> {
    let init = plan.init();

    let mut producers = Vec::new();
    for args in typed_combinations(plan, &pre.atom.pred.param_tys) {
        let lit = pre.with_args(args);
        if !init.has_negated_effect(&lit) {
            producers.push(Producer::new(0, lit));
        }
    }
    producers
}

/// Cartesian product of initial-state variables compatible with each
/// parameter type, in declaration order.
fn typed_combinations(plan: &Plan, param_tys: &[String]) -> Vec<Vec<Var>> {
    let types = &plan.problem().types;
    let init = plan.init();

    let mut combos: Vec<Vec<Var>> = vec![Vec::new()];
    for ty in param_tys {
        let candidates: Vec<&Var> = init
            .params
            .iter()
            .filter(|v| types.is_subtype(&v.ty, ty))
            .collect();
        let mut next = Vec::with_capacity(combos.len() * candidates.len());
        for combo in &combos {
            for var in &candidates {
                let mut extended = combo.clone();
                extended.push((*var).clone());
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}
