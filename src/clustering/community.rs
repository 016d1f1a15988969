//! Community detection for method call graphs.
//!
//! A single-level Louvain-style local-moving pass over the weighted
//! undirected graph: every node starts in its own community, and nodes are
//! repeatedly moved to the neighboring community with the best modularity
//! gain until a fixed point or the iteration cap. Nodes are visited in the
//! graph's sorted layout, so the result is deterministic for a given graph.

use crate::core::MethodId;
use crate::graph::MethodCallGraph;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};

const MAX_ITERATIONS: usize = 10;

/// Partition the graph's nodes into communities. Every node is assigned,
/// including isolated ones, which end up in singleton communities.
pub fn detect_communities(graph: &MethodCallGraph) -> BTreeMap<MethodId, usize> {
    let (pg, index) = graph.to_petgraph();
    let assignment = local_moving(&pg);
    index
        .into_iter()
        .map(|(id, node)| (id, assignment[node.index()]))
        .collect()
}

/// One community id per node index.
fn local_moving(pg: &UnGraph<MethodId, u32>) -> Vec<usize> {
    let n = pg.node_count();
    let mut community: Vec<usize> = (0..n).collect();

    let total_weight: f64 = pg.edge_references().map(|e| f64::from(*e.weight())).sum();
    if total_weight == 0.0 {
        return community;
    }
    let two_m = 2.0 * total_weight;

    let degree: Vec<f64> = (0..n)
        .map(|i| weighted_degree(pg, NodeIndex::new(i)))
        .collect();
    let mut community_total: Vec<f64> = degree.clone();

    let mut improved = true;
    let mut iterations = 0;
    while improved && iterations < MAX_ITERATIONS {
        improved = false;
        iterations += 1;

        for node in 0..n {
            let current = community[node];
            let neighbor_weights = community_neighbor_weights(pg, NodeIndex::new(node), &community);
            if neighbor_weights.is_empty() {
                continue;
            }

            // Gain is evaluated with the node lifted out of its community.
            community_total[current] -= degree[node];
            let stay_gain = move_gain(&neighbor_weights, current, &community_total, degree[node], two_m);

            let mut best = current;
            let mut best_gain = stay_gain;
            let mut candidates: Vec<usize> = neighbor_weights.keys().copied().collect();
            candidates.sort_unstable();
            for candidate in candidates {
                if candidate == current {
                    continue;
                }
                let gain = move_gain(&neighbor_weights, candidate, &community_total, degree[node], two_m);
                if gain > best_gain {
                    best_gain = gain;
                    best = candidate;
                }
            }

            community_total[best] += degree[node];
            if best != current {
                community[node] = best;
                improved = true;
            }
        }
    }
    community
}

fn weighted_degree(pg: &UnGraph<MethodId, u32>, node: NodeIndex) -> f64 {
    pg.edges(node).map(|e| f64::from(*e.weight())).sum()
}

/// Total edge weight from `node` to each adjacent community.
fn community_neighbor_weights(
    pg: &UnGraph<MethodId, u32>,
    node: NodeIndex,
    community: &[usize],
) -> HashMap<usize, f64> {
    let mut weights: HashMap<usize, f64> = HashMap::new();
    for edge in pg.edges(node) {
        let other = if edge.source() == node {
            edge.target()
        } else {
            edge.source()
        };
        *weights.entry(community[other.index()]).or_insert(0.0) += f64::from(*edge.weight());
    }
    weights
}

/// Modularity gain (up to a constant factor) of placing a node of degree
/// `k` into `candidate`, given the node is currently outside every
/// community's total.
fn move_gain(
    neighbor_weights: &HashMap<usize, f64>,
    candidate: usize,
    community_total: &[f64],
    k: f64,
    two_m: f64,
) -> f64 {
    let to_candidate = neighbor_weights.get(&candidate).copied().unwrap_or(0.0);
    to_candidate - community_total[candidate] * k / two_m
}
