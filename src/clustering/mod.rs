//! Clustering strategies and partition plumbing.
//!
//! Every algorithm implements [`ClusteringAlgorithm`]: it consumes the parsed
//! file set, privately builds its graph, and leaves behind a cluster list
//! plus the set of methods it successfully placed (its unique-method
//! coverage). The pipeline owns a list of boxed strategies and treats them
//! uniformly.

pub mod community;
pub mod consensus;
pub mod hierarchy;
pub mod lexical;

use crate::config::ConfigError;
use crate::core::{Cluster, JavaFile, MethodId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use thiserror::Error;

pub use community::detect_communities;
pub use consensus::{consensus, intersect_coverage, iterative_voting_consensus};
pub use hierarchy::{CallHierarchyProvider, HierarchyClustering, MethodRef};
pub use lexical::LexicalCallClustering;

/// Parameters passed to an algorithm at registration time.
#[derive(Clone, Debug, Default)]
pub struct AlgorithmParams {
    pub input_dir: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("call hierarchy analysis failed: {0}")]
    Hierarchy(String),
    #[error("missing required parameter `{param}`")]
    MissingParam { param: &'static str },
}

pub trait ClusteringAlgorithm {
    fn name(&self) -> &'static str;

    fn set_params(&mut self, params: AlgorithmParams);

    /// Pre-flight check run at registration; configuration errors surface
    /// here, never in the middle of a run.
    fn validate_params(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Run the algorithm over the parsed files, populating the cluster list
    /// and the unique-method coverage. Either fully succeeds or returns an
    /// error; the pipeline catches per algorithm and carries on.
    fn cluster(&mut self, files: &[JavaFile]) -> Result<(), ClusterError>;

    fn clusters(&self) -> &[Cluster];

    fn unique_methods(&self) -> &BTreeSet<MethodId>;
}

/// Convert a node-to-community mapping into disjoint clusters. Community ids
/// are compacted to 0-based cluster indices in first-seen order.
pub fn clusters_from_partition(partition: &BTreeMap<MethodId, usize>) -> Vec<Cluster> {
    let mut index_of: HashMap<usize, usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();
    for (method, community) in partition {
        let idx = *index_of.entry(*community).or_insert_with(|| {
            clusters.push(Cluster::new());
            clusters.len() - 1
        });
        clusters[idx].add_element(method.clone());
    }
    clusters
}

/// Encode a cluster list as a method-to-cluster-id mapping, assigning ids in
/// enumeration order.
pub fn partition_from_clusters(clusters: &[Cluster]) -> HashMap<MethodId, usize> {
    let mut partition = HashMap::new();
    for (cluster_id, cluster) in clusters.iter().enumerate() {
        for method in &cluster.elements {
            partition.insert(method.clone(), cluster_id);
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> MethodId {
        MethodId {
            name: name.to_string(),
            return_type: String::from("void"),
            param_types: vec![],
        }
    }

    #[test]
    fn partition_conversion_round_trips() {
        let mut partition = BTreeMap::new();
        partition.insert(id("a"), 7);
        partition.insert(id("b"), 7);
        partition.insert(id("c"), 3);

        let clusters = clusters_from_partition(&partition);
        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters.iter().map(Cluster::len).sum::<usize>(),
            partition.len()
        );

        let encoded = partition_from_clusters(&clusters);
        assert_eq!(encoded[&id("a")], encoded[&id("b")]);
        assert_ne!(encoded[&id("a")], encoded[&id("c")]);
    }
}
