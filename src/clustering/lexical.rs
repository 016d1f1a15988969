//! Clustering from the lexical call graph.

use crate::analyzers::calls::{CallExtractor, LexicalCallExtractor};
use crate::clustering::{
    clusters_from_partition, AlgorithmParams, ClusterError, ClusteringAlgorithm,
};
use crate::clustering::community::detect_communities;
use crate::core::{Cluster, JavaFile, MethodId};
use crate::graph::{build_call_graph, MethodCallGraph};
use std::collections::BTreeSet;

/// Builds the weighted call graph from lexically extracted call tokens,
/// prunes empty edges, and clusters the result by community detection. Its
/// coverage is every method in the graph, i.e. the whole universe.
pub struct LexicalCallClustering {
    extractor: Box<dyn CallExtractor>,
    graph: MethodCallGraph,
    clusters: Vec<Cluster>,
    unique_methods: BTreeSet<MethodId>,
    params: AlgorithmParams,
}

impl LexicalCallClustering {
    pub fn new() -> Self {
        Self::with_extractor(Box::new(LexicalCallExtractor::new()))
    }

    pub fn with_extractor(extractor: Box<dyn CallExtractor>) -> Self {
        Self {
            extractor,
            graph: MethodCallGraph::new(),
            clusters: Vec::new(),
            unique_methods: BTreeSet::new(),
            params: AlgorithmParams::default(),
        }
    }

    pub fn graph(&self) -> &MethodCallGraph {
        &self.graph
    }
}

impl Default for LexicalCallClustering {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusteringAlgorithm for LexicalCallClustering {
    fn name(&self) -> &'static str {
        "lexical-call-graph"
    }

    fn set_params(&mut self, params: AlgorithmParams) {
        self.params = params;
    }

    fn cluster(&mut self, files: &[JavaFile]) -> Result<(), ClusterError> {
        self.graph = build_call_graph(files, self.extractor.as_ref());
        let partition = detect_communities(&self.graph);
        self.unique_methods = self.graph.nodes().cloned().collect();
        self.clusters = clusters_from_partition(&partition);
        Ok(())
    }

    fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    fn unique_methods(&self) -> &BTreeSet<MethodId> {
        &self.unique_methods
    }
}
