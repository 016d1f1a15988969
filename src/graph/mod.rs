//! Weighted undirected call graph over method identities.
//!
//! Edges accumulate co-occurrence counts of call tokens between method pairs;
//! direction is discarded. Provisional zero-weight edges are created for
//! every considered pair and pruned before clustering. Isolated nodes are
//! kept so every method surfaces as a (possibly singleton) community.

use crate::analyzers::calls::CallExtractor;
use crate::core::{all_methods, JavaFile, MethodId};
use im::{HashMap, HashSet};
use petgraph::graph::{NodeIndex, UnGraph};

/// Canonical unordered method pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    a: MethodId,
    b: MethodId,
}

impl EdgeKey {
    pub fn new(x: MethodId, y: MethodId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MethodCallGraph {
    nodes: HashSet<MethodId>,
    weights: HashMap<EdgeKey, u32>,
    adjacency: HashMap<MethodId, HashSet<MethodId>>,
}

impl MethodCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: MethodId) {
        self.nodes.insert(id);
    }

    /// Accumulate `count` observed calls between two methods. A zero count
    /// still creates the (provisional) edge, mirroring graph construction
    /// that considers every pair before pruning.
    pub fn record_calls(&mut self, from: &MethodId, to: &MethodId, count: u32) {
        self.add_node(from.clone());
        self.add_node(to.clone());
        let key = EdgeKey::new(from.clone(), to.clone());
        let weight = self.weights.get(&key).copied().unwrap_or(0);
        self.weights.insert(key, weight + count);
        self.adjacency
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.adjacency
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
    }

    /// Drop every edge that never accumulated a call.
    pub fn prune_empty_edges(&mut self) {
        let empty: Vec<EdgeKey> = self
            .weights
            .iter()
            .filter(|(_, &w)| w == 0)
            .map(|(k, _)| k.clone())
            .collect();
        for key in empty {
            self.weights.remove(&key);
            if let Some(set) = self.adjacency.get_mut(&key.a) {
                set.remove(&key.b);
            }
            if let Some(set) = self.adjacency.get_mut(&key.b) {
                set.remove(&key.a);
            }
        }
    }

    pub fn edge_weight(&self, a: &MethodId, b: &MethodId) -> Option<u32> {
        self.weights
            .get(&EdgeKey::new(a.clone(), b.clone()))
            .copied()
    }

    pub fn has_edge(&self, a: &MethodId, b: &MethodId) -> bool {
        self.edge_weight(a, b).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MethodId> {
        self.nodes.iter()
    }

    /// Convert to a petgraph graph for algorithm execution. Nodes are added
    /// in sorted order so downstream algorithms see a stable layout.
    pub fn to_petgraph(
        &self,
    ) -> (
        UnGraph<MethodId, u32>,
        std::collections::HashMap<MethodId, NodeIndex>,
    ) {
        let mut graph = UnGraph::new_undirected();
        let mut index = std::collections::HashMap::new();

        let mut sorted: Vec<MethodId> = self.nodes.iter().cloned().collect();
        sorted.sort();
        for id in sorted {
            let node = graph.add_node(id.clone());
            index.insert(id, node);
        }

        let mut edges: Vec<(&EdgeKey, u32)> =
            self.weights.iter().map(|(k, &w)| (k, w)).collect();
        edges.sort();
        for (key, weight) in edges {
            if let (Some(&a), Some(&b)) = (index.get(&key.a), index.get(&key.b)) {
                graph.add_edge(a, b, weight);
            }
        }
        (graph, index)
    }
}

/// Build the call graph for every method across `files`, using `extractor`
/// to recover call tokens from each method body. An edge's weight is the
/// number of times either endpoint's name occurs among the other's tokens.
pub fn build_call_graph(files: &[JavaFile], extractor: &dyn CallExtractor) -> MethodCallGraph {
    let mut graph = MethodCallGraph::new();
    let methods: Vec<(MethodId, &str, Vec<String>)> = all_methods(files)
        .map(|m| (m.id(), m.name.as_str(), extractor.extract_calls(&m.code)))
        .collect();

    for (id, _, _) in &methods {
        graph.add_node(id.clone());
    }
    for (caller_id, _, calls) in &methods {
        for (callee_id, callee_name, _) in &methods {
            if caller_id == callee_id {
                continue;
            }
            let count = calls.iter().filter(|c| c.as_str() == *callee_name).count() as u32;
            graph.record_calls(caller_id, callee_id, count);
        }
    }
    graph.prune_empty_edges();
    graph
}
