//! Shared fixtures and oracle doubles for the integration tests.
//!
//! The fixtures are small blocksworld plans; the doubles are a brute-force
//! CSP solver and a min-degree elimination treewidth estimator, both exact
//! enough for plans this size.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};

use mktr::causal::{Consumer, PcLink, Producer};
use mktr::csp::PrimalGraph;
use mktr::fol::{Literal, Obj, Predicate, Substitution, TypeHierarchy, Var};
use mktr::plan::{GOAL_NAME, INIT_NAME};
use mktr::solve::{Assignment, CspSolver, Interrupted, SolveOutcome, TreewidthOracle};
use mktr::{Csp, CspValue, CspVar, Plan, Problem, Step};

pub fn block_types() -> TypeHierarchy {
    let mut types = TypeHierarchy::new();
    types.insert("object", None);
    types.insert("block", Some("object"));
    types
}

pub fn pred(name: &str, arity: usize) -> Predicate {
    Predicate::new(name, vec!["block".to_owned(); arity])
}

fn var(name: &str) -> Var {
    Var::new(name, "block")
}

fn pickup_step(suffix: &str) -> (Step, Var) {
    let x = var(&format!("x{suffix}"));
    let step = Step::new(
        format!("pick-up{suffix}"),
        vec![x.clone()],
        vec![
            Literal::pos(pred("clear", 1), [x.clone()]),
            Literal::pos(pred("ontable", 1), [x.clone()]),
            Literal::pos(pred("handempty", 0), []),
        ],
        vec![
            Literal::neg(pred("ontable", 1), [x.clone()]),
            Literal::neg(pred("clear", 1), [x.clone()]),
            Literal::neg(pred("handempty", 0), []),
            Literal::pos(pred("holding", 1), [x.clone()]),
        ],
    );
    (step, x)
}

fn two_block_init() -> (Step, Var, Var) {
    let i0 = var("i0");
    let i1 = var("i1");
    let step = Step::new(
        INIT_NAME,
        vec![i0.clone(), i1.clone()],
        vec![],
        vec![
            Literal::pos(pred("clear", 1), [i0.clone()]),
            Literal::pos(pred("ontable", 1), [i0.clone()]),
            Literal::pos(pred("clear", 1), [i1.clone()]),
            Literal::pos(pred("ontable", 1), [i1.clone()]),
            Literal::pos(pred("handempty", 0), []),
        ],
    );
    (step, i0, i1)
}

/// `init; pick-up(a); goal(holding a)` over blocks `a` and `b`.
pub fn pickup_plan() -> Arc<Plan> {
    let a = Obj::new("a", "block");
    let b = Obj::new("b", "block");
    let problem = Arc::new(Problem::new("pickup", block_types(), vec![a.clone(), b.clone()]));

    let (init, i0, i1) = two_block_init();
    let (pickup, x0) = pickup_step("0");
    let g0 = var("g0");
    let goal = Step::new(
        GOAL_NAME,
        vec![g0.clone()],
        vec![Literal::pos(pred("holding", 1), [g0.clone()])],
        vec![],
    );

    let mut sub = Substitution::new();
    sub.bind(i0, a.clone());
    sub.bind(i1, b);
    sub.bind(x0, a.clone());
    sub.bind(g0, a);

    Arc::new(Plan::new(problem, vec![init, pickup, goal], sub).unwrap())
}

/// `init; pick-up(a); stack(a, b); goal(on a b)`: long enough to carry
/// threats between the middle steps.
pub fn stack_plan() -> Arc<Plan> {
    let a = Obj::new("a", "block");
    let b = Obj::new("b", "block");
    let problem = Arc::new(Problem::new("stack", block_types(), vec![a.clone(), b.clone()]));

    let (init, i0, i1) = two_block_init();
    let (pickup, x0) = pickup_step("0");

    let y0 = var("y0");
    let y1 = var("y1");
    let stack = Step::new(
        "stack0",
        vec![y0.clone(), y1.clone()],
        vec![
            Literal::pos(pred("holding", 1), [y0.clone()]),
            Literal::pos(pred("clear", 1), [y1.clone()]),
        ],
        vec![
            Literal::neg(pred("holding", 1), [y0.clone()]),
            Literal::neg(pred("clear", 1), [y1.clone()]),
            Literal::pos(pred("clear", 1), [y0.clone()]),
            Literal::pos(pred("handempty", 0), []),
            Literal::pos(pred("on", 2), [y0.clone(), y1.clone()]),
        ],
    );

    let g0 = var("g0");
    let g1 = var("g1");
    let goal = Step::new(
        GOAL_NAME,
        vec![g0.clone(), g1.clone()],
        vec![Literal::pos(pred("on", 2), [g0.clone(), g1.clone()])],
        vec![],
    );

    let mut sub = Substitution::new();
    sub.bind(i0, a.clone());
    sub.bind(i1, b.clone());
    sub.bind(x0, a.clone());
    sub.bind(y0, a.clone());
    sub.bind(y1, b.clone());
    sub.bind(g0, a);
    sub.bind(g1, b);

    Arc::new(Plan::new(problem, vec![init, pickup, stack, goal], sub).unwrap())
}

pub fn link(plan: &Plan, prod_step: usize, prod_lit: Literal, cons_step: usize, cons_lit: Literal) -> PcLink {
    PcLink::new(
        Producer::new(prod_step, prod_lit),
        Consumer::new(plan, cons_step, cons_lit),
    )
}

/// Brute-force solver: enumerates the cartesian product of the domains and
/// keeps the assignments satisfying every constraint.
#[derive(Debug, Default)]
pub struct NaiveSolver {
    cancelled: AtomicBool,
}

impl NaiveSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn enumerate(
        &self,
        csp: &Csp,
        timeout: Option<Duration>,
        mut on_solution: impl FnMut(&FxHashMap<CspVar, CspValue>),
    ) -> Result<bool, Interrupted> {
        let vars = csp.variables();
        let deadline = timeout.map(|t| Instant::now() + t);

        if vars.iter().any(|v| csp.domain(v).is_empty()) {
            return Ok(false);
        }

        let mut indices = vec![0usize; vars.len()];
        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(Interrupted);
            }
            if deadline.is_some_and(|d| Instant::now() > d) {
                return Ok(true);
            }

            let values: FxHashMap<CspVar, CspValue> = vars
                .iter()
                .zip(&indices)
                .map(|(v, &i)| (v.clone(), csp.domain(v)[i].clone()))
                .collect();
            if csp.satisfied_by(&values) {
                on_solution(&values);
            }

            // odometer increment over the domain sizes
            let mut pos = 0;
            loop {
                if pos == vars.len() {
                    return Ok(false);
                }
                indices[pos] += 1;
                if indices[pos] < csp.domain(&vars[pos]).len() {
                    break;
                }
                indices[pos] = 0;
                pos += 1;
            }
        }
    }
}

impl CspSolver for NaiveSolver {
    fn count_solutions(
        &self,
        csp: &Csp,
        timeout: Option<Duration>,
    ) -> Result<SolveOutcome<u64>, Interrupted> {
        let mut count = 0u64;
        let timed_out = self.enumerate(csp, timeout, |_| count += 1)?;
        Ok(SolveOutcome { value: count, timed_out })
    }

    fn solutions(
        &self,
        csp: &Csp,
        timeout: Option<Duration>,
    ) -> Result<SolveOutcome<Vec<Assignment>>, Interrupted> {
        let mut found = Vec::new();
        let timed_out = self.enumerate(csp, timeout, |values| {
            found.push(values.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
        })?;
        Ok(SolveOutcome { value: found, timed_out })
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Min-degree elimination width of the primal graph. An upper bound on the
/// treewidth, exact on the graphs these fixtures produce.
pub fn elimination_width(graph: &PrimalGraph) -> usize {
    let g = graph.graph();

    let mut adj: FxHashMap<usize, FxHashSet<usize>> =
        g.node_indices().map(|n| (n.index(), FxHashSet::default())).collect();
    for e in g.edge_indices() {
        if let Some((a, b)) = g.edge_endpoints(e) {
            adj.get_mut(&a.index()).unwrap().insert(b.index());
            adj.get_mut(&b.index()).unwrap().insert(a.index());
        }
    }

    let mut width = 0;
    while !adj.is_empty() {
        let (&v, _) = adj
            .iter()
            .min_by_key(|(v, neighbours)| (neighbours.len(), **v))
            .unwrap();
        let neighbours: Vec<usize> = adj[&v].iter().copied().collect();
        width = width.max(neighbours.len());

        for (i, &a) in neighbours.iter().enumerate() {
            for &b in &neighbours[i + 1..] {
                adj.get_mut(&a).unwrap().insert(b);
                adj.get_mut(&b).unwrap().insert(a);
            }
        }
        for &n in &neighbours {
            adj.get_mut(&n).unwrap().remove(&v);
        }
        adj.remove(&v);
    }
    width
}

#[derive(Debug, Default)]
pub struct MinDegreeOracle {
    cancelled: AtomicBool,
}

impl MinDegreeOracle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TreewidthOracle for MinDegreeOracle {
    fn upper_bound(&self, graph: &PrimalGraph) -> Result<usize, Interrupted> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Interrupted);
        }
        Ok(elimination_width(graph))
    }

    fn is_greater_than(&self, graph: &PrimalGraph, bound: usize) -> Result<bool, Interrupted> {
        Ok(self.upper_bound(graph)? > bound)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Always answers the same way; for driving the engine to its extremes.
#[derive(Debug)]
pub struct FixedOracle {
    pub over_budget: bool,
}

impl TreewidthOracle for FixedOracle {
    fn upper_bound(&self, _graph: &PrimalGraph) -> Result<usize, Interrupted> {
        Ok(0)
    }

    fn is_greater_than(&self, _graph: &PrimalGraph, _bound: usize) -> Result<bool, Interrupted> {
        Ok(self.over_budget)
    }

    fn cancel(&self) {}
}

/// Blocks until cancelled, then reports the interruption. For exercising
/// the wall-clock timeout path.
#[derive(Debug, Default)]
pub struct BlockingOracle {
    cancelled: AtomicBool,
}

impl BlockingOracle {
    pub fn new() -> Self {
        Self::default()
    }

    fn wait(&self) -> Interrupted {
        while !self.cancelled.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(5));
        }
        Interrupted
    }
}

impl TreewidthOracle for BlockingOracle {
    fn upper_bound(&self, _graph: &PrimalGraph) -> Result<usize, Interrupted> {
        Err(self.wait())
    }

    fn is_greater_than(&self, _graph: &PrimalGraph, _bound: usize) -> Result<bool, Interrupted> {
        Err(self.wait())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
