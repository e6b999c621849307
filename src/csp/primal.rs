//! The primal constraint graph: one vertex per variable, one edge per pair
//! of variables sharing a constraint scope. Treewidth is measured here.

use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Csp, CspVar};

#[derive(Debug, Clone)]
pub struct PrimalGraph {
    graph: UnGraph<CspVar, ()>,
    index: FxHashMap<CspVar, NodeIndex>,
}

impl PrimalGraph {
    pub fn from_csp(csp: &Csp) -> Self {
        let mut graph = UnGraph::default();
        let mut index = FxHashMap::default();

        for var in csp.variables() {
            let node = graph.add_node(var.clone());
            index.insert(var.clone(), node);
        }

        let mut seen: FxHashSet<(NodeIndex, NodeIndex)> = FxHashSet::default();
        for constraint in csp.constraints() {
            let scope = constraint.scope();
            for (i, a) in scope.iter().enumerate() {
                for b in &scope[i + 1..] {
                    let (na, nb) = (index[a], index[b]);
                    let key = if na < nb { (na, nb) } else { (nb, na) };
                    if seen.insert(key) {
                        graph.add_edge(key.0, key.1, ());
                    }
                }
            }
        }

        Self { graph, index }
    }

    pub fn graph(&self) -> &UnGraph<CspVar, ()> {
        &self.graph
    }

    pub fn node(&self, var: &CspVar) -> Option<NodeIndex> {
        self.index.get(var).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// PACE `.gr` text: only vertices with at least one incident edge are
    /// numbered, 1-based, in node order.
    pub fn gr_string(&self, comment: &str) -> String {
        let mut numbered: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut next = 1;
        for node in self.graph.node_indices() {
            if self.graph.neighbors(node).next().is_some() {
                numbered.insert(node, next);
                next += 1;
            }
        }

        let mut edges: Vec<(usize, usize)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (ia, ib) = (numbered[&a], numbered[&b]);
                if ia < ib { (ia, ib) } else { (ib, ia) }
            })
            .collect();
        edges.sort_unstable();

        let mut out = String::new();
        out.push_str(&format!("c {}\n", comment.trim()));
        out.push_str(&format!("p tw {} {}\n", numbered.len(), edges.len()));
        for (a, b) in edges {
            out.push_str(&format!("{a} {b}\n"));
        }
        out
    }
}
