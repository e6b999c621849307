//! The encoder family: variables, domains, constraints and exports.

mod common;

use std::time::Duration;

use mktr::causal::{build_actual, build_minimal, PcPlan};
use mktr::csp::zinc::zinc_string;
use mktr::csp::{CspLit, Expr, PrimalGraph};
use mktr::fol::Var;
use mktr::solve::CspSolver;
use mktr::{CspValue, CspVar, EncodeOptions, EncoderKind};

use common::{pickup_plan, stack_plan, NaiveSolver};

fn pc_plan(encoder: EncoderKind, minimal: bool) -> PcPlan {
    let plan = pickup_plan();
    let structure = if minimal {
        build_minimal(&plan, encoder.is_total_order()).unwrap()
    } else {
        build_actual(&plan, encoder.is_total_order()).unwrap()
    };
    PcPlan::new(plan, structure)
}

fn literals(expr: &Expr, out: &mut Vec<CspLit>) {
    match expr {
        Expr::Lit(lit) => out.push(lit.clone()),
        Expr::And(children) | Expr::Or(children) => {
            children.iter().for_each(|c| literals(c, out))
        }
    }
}

fn all_literals(csp: &mktr::Csp) -> Vec<CspLit> {
    let mut out = Vec::new();
    for c in csp.constraints() {
        literals(c, &mut out);
    }
    out
}

#[test]
fn every_step_and_parameter_becomes_a_variable() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();

    for step_id in 0..pc.plan().len() {
        assert!(csp.variables().contains(&CspVar::Ordinal(step_id)));
    }
    for step in pc.plan().steps() {
        for param in &step.params {
            assert!(csp.variables().contains(&CspVar::Param(param.clone())));
        }
    }
    // i0, i1, x0, g0 plus three ordinals
    assert_eq!(csp.variables().len(), 7);
}

#[test]
fn ordinal_domains_pin_the_endpoints() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();

    assert_eq!(csp.domain(&CspVar::Ordinal(0)), &[CspValue::Pos(0)]);
    assert_eq!(csp.domain(&CspVar::Ordinal(2)), &[CspValue::Pos(2)]);
    assert_eq!(csp.domain(&CspVar::Ordinal(1)), &[CspValue::Pos(1)]);
}

#[test]
fn lifted_domains_pin_endpoints_and_open_interior_parameters() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();

    let sub = pc.plan().substitution();
    let i0 = Var::new("i0", "block");
    assert_eq!(
        csp.domain(&CspVar::Param(i0.clone())),
        &[CspValue::Obj(sub.value(&i0).clone())]
    );

    // the pick-up parameter ranges over both blocks
    let x0 = Var::new("x0", "block");
    assert_eq!(csp.domain(&CspVar::Param(x0)).len(), 2);
}

#[test]
fn ground_encoders_pin_every_parameter() {
    for kind in [EncoderKind::Ground, EncoderKind::Prf] {
        let pc = pc_plan(kind, true);
        let csp = kind.encode(&pc, EncodeOptions::default()).unwrap();
        let x0 = CspVar::Param(Var::new("x0", "block"));
        assert_eq!(csp.domain(&x0).len(), 1, "{kind}");
    }
}

#[test]
fn total_order_pins_every_ordinal() {
    let pc = pc_plan(EncoderKind::TotalOrder, true);
    let csp = EncoderKind::TotalOrder.encode(&pc, EncodeOptions::default()).unwrap();
    for step_id in 0..pc.plan().len() {
        assert_eq!(csp.domain(&CspVar::Ordinal(step_id)), &[CspValue::Pos(step_id)]);
    }
}

#[test]
fn modal_truth_restricts_bindings_with_equalities() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();

    let lits = all_literals(&csp);
    assert!(lits.iter().any(|l| matches!(l, CspLit::Eq(..))));
    assert!(lits.iter().any(|l| matches!(l, CspLit::Before(..))));
}

#[test]
fn prf_emits_only_precedence_literals() {
    let pc = pc_plan(EncoderKind::Prf, true);
    let csp = EncoderKind::Prf.encode(&pc, EncodeOptions::default()).unwrap();

    for lit in all_literals(&csp) {
        assert!(matches!(lit, CspLit::Before(..)), "unexpected literal in {lit:?}");
    }
}

#[test]
fn symmetry_options_add_their_constraints() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let plain = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();
    let full = EncoderKind::ModalTruth
        .encode(&pc, EncodeOptions { all_different: true, type_order: true })
        .unwrap();

    let has_alldiff = |csp: &mktr::Csp| {
        all_literals(csp).iter().any(|l| matches!(l, CspLit::AllDifferent(_)))
    };
    assert!(!has_alldiff(&plain));
    assert!(has_alldiff(&full));
    assert!(full.constraints().len() > plain.constraints().len());
}

#[test]
fn the_original_plan_satisfies_every_encoding() {
    // the identity assignment must stay a solution under all four encoders
    for kind in [
        EncoderKind::Ground,
        EncoderKind::ModalTruth,
        EncoderKind::TotalOrder,
        EncoderKind::Prf,
    ] {
        for plan in [pickup_plan(), stack_plan()] {
            let structure = build_minimal(&plan, kind.is_total_order()).unwrap();
            let pc = PcPlan::new(plan.clone(), structure);
            let csp = kind
                .encode(&pc, EncodeOptions { all_different: true, type_order: true })
                .unwrap();

            let mut identity = rustc_hash::FxHashMap::default();
            for step_id in 0..plan.len() {
                identity.insert(CspVar::Ordinal(step_id), CspValue::Pos(step_id));
            }
            for step in plan.steps() {
                for param in &step.params {
                    identity.insert(
                        CspVar::Param(param.clone()),
                        CspValue::Obj(plan.substitution().value(param).clone()),
                    );
                }
            }
            assert!(csp.satisfied_by(&identity), "{kind} rejects the original plan");
        }
    }
}

#[test]
fn modal_truth_pickup_has_a_unique_full_solution() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth
        .encode(&pc, EncodeOptions { all_different: true, type_order: true })
        .unwrap();

    let solver = NaiveSolver::new();
    let outcome = solver.count_solutions(&csp, Some(Duration::from_secs(10))).unwrap();
    assert!(!outcome.timed_out);
    assert_eq!(outcome.value, 1);
}

#[test]
fn gr_export_is_pace_formatted() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();
    let primal = PrimalGraph::from_csp(&csp);

    let text = primal.gr_string("pickup");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("c pickup"));

    let header = lines.next().unwrap();
    let parts: Vec<&str> = header.split_whitespace().collect();
    assert_eq!(&parts[..2], &["p", "tw"]);
    let edges: usize = parts[3].parse().unwrap();
    assert_eq!(lines.count(), edges);
}

#[test]
fn zinc_export_declares_variables_and_constraints() {
    let pc = pc_plan(EncoderKind::ModalTruth, true);
    let csp = EncoderKind::ModalTruth
        .encode(&pc, EncodeOptions { all_different: true, type_order: true })
        .unwrap();

    let text = zinc_string(&csp);
    assert!(text.contains("solve satisfy;"));
    assert!(text.contains("constraint"));
    assert!(text.contains("alldifferent"));
    assert!(text.contains("ord0"));
}

#[test]
fn primal_graph_grows_with_the_structure() {
    let plan = stack_plan();
    let actual = build_actual(&plan, false).unwrap();
    let minimal = build_minimal(&plan, false).unwrap();

    let encode = |s| {
        let pc = PcPlan::new(plan.clone(), s);
        let csp = EncoderKind::ModalTruth.encode(&pc, EncodeOptions::default()).unwrap();
        PrimalGraph::from_csp(&csp)
    };
    let small = encode(actual);
    let large = encode(minimal);

    assert_eq!(small.vertex_count(), large.vertex_count());
    assert!(small.edge_count() <= large.edge_count());
}
