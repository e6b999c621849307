//! MiniZinc export of a CSP.
//!
//! Objects are mapped to integers through a table emitted as comments, so
//! the model is self-describing; ordinals keep their positions as values.

use rustc_hash::FxHashMap;

use super::{Csp, CspLit, CspValue, CspVar, Expr};

/// Renders the CSP as a MiniZinc model. Deterministic for a given CSP.
pub fn zinc_string(csp: &Csp) -> String {
    let mut objects: Vec<&crate::fol::Obj> = Vec::new();
    for var in csp.variables() {
        for value in csp.domain(var) {
            if let CspValue::Obj(obj) = value {
                if !objects.contains(&obj) {
                    objects.push(obj);
                }
            }
        }
    }
    objects.sort();

    let object_ids: FxHashMap<&crate::fol::Obj, usize> =
        objects.iter().enumerate().map(|(i, o)| (*o, i)).collect();

    let uses_alldiff = csp
        .constraints()
        .iter()
        .any(|c| matches!(c, Expr::Lit(CspLit::AllDifferent(_))));

    let mut out = String::new();
    if uses_alldiff {
        out.push_str("include \"alldifferent.mzn\";\n");
    }
    for (i, obj) in objects.iter().enumerate() {
        out.push_str(&format!("% object {i} = {}\n", obj.name));
    }

    for var in csp.variables() {
        let values: Vec<String> = csp
            .domain(var)
            .iter()
            .map(|v| value_string(v, &object_ids))
            .collect();
        out.push_str(&format!("var {{{}}}: {};\n", values.join(","), ident(var)));
    }

    for constraint in csp.constraints() {
        out.push_str(&format!("constraint {};\n", expr_string(constraint)));
    }

    out.push_str("solve satisfy;\n");
    out
}

fn value_string(value: &CspValue, object_ids: &FxHashMap<&crate::fol::Obj, usize>) -> String {
    match value {
        CspValue::Pos(p) => p.to_string(),
        CspValue::Obj(obj) => object_ids[obj].to_string(),
    }
}

/// MiniZinc identifier for a variable; PDDL names may carry characters
/// MiniZinc rejects.
fn ident(var: &CspVar) -> String {
    var.to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn expr_string(expr: &Expr) -> String {
    match expr {
        Expr::Lit(CspLit::Before(a, b)) => format!("{} < {}", ident(a), ident(b)),
        Expr::Lit(CspLit::Eq(a, b)) => format!("{} = {}", ident(a), ident(b)),
        Expr::Lit(CspLit::Ne(a, b)) => format!("{} != {}", ident(a), ident(b)),
        Expr::Lit(CspLit::AllDifferent(vars)) => {
            let names: Vec<String> = vars.iter().map(ident).collect();
            format!("alldifferent([{}])", names.join(","))
        }
        Expr::And(children) => {
            let parts: Vec<String> = children.iter().map(expr_string).collect();
            format!("({})", parts.join(" /\\ "))
        }
        Expr::Or(children) => {
            let parts: Vec<String> = children.iter().map(expr_string).collect();
            format!("({})", parts.join(" \\/ "))
        }
    }
}
