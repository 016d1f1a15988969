//! Consensus over multiple noisy partitions of one method universe.
//!
//! Each contributing partition is encoded as a column of cluster ids, giving
//! a `|universe| x |partitions|` matrix whose rows are per-method label
//! vectors. Iterative voting consensus then reconciles the columns: starting
//! from a random labeling, it alternates majority-vote cluster
//! representatives with nearest-representative reassignment (Hamming
//! distance) until a fixed point. The initial labeling is random, so the
//! number of consensus clusters can differ between runs on the same matrix.

use crate::clustering::partition_from_clusters;
use crate::core::{Cluster, MethodId};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

const MAX_VOTING_ITERATIONS: usize = 100;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("method `{method}` is not covered by partition {partition}")]
    MethodNotCovered { method: MethodId, partition: usize },
}

/// The sorted intersection of the coverage sets of all contributing
/// algorithms. A method missing from any coverage is excluded entirely.
pub fn intersect_coverage<'a, I>(coverages: I) -> Vec<MethodId>
where
    I: IntoIterator<Item = &'a BTreeSet<MethodId>>,
{
    let mut iter = coverages.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut universe: BTreeSet<MethodId> = first.clone();
    for coverage in iter {
        universe = universe.intersection(coverage).cloned().collect();
    }
    universe.into_iter().collect()
}

/// Encode the partitions into the cluster-id matrix, one row per universe
/// method, one column per partition.
pub fn build_cluster_matrix(
    partitions: &[Vec<Cluster>],
    universe: &[MethodId],
) -> Result<Vec<Vec<usize>>, ConsensusError> {
    let encodings: Vec<HashMap<MethodId, usize>> =
        partitions.iter().map(|p| partition_from_clusters(p)).collect();

    universe
        .iter()
        .map(|method| {
            encodings
                .iter()
                .enumerate()
                .map(|(partition, encoding)| {
                    encoding
                        .get(method)
                        .copied()
                        .ok_or_else(|| ConsensusError::MethodNotCovered {
                            method: method.clone(),
                            partition,
                        })
                })
                .collect()
        })
        .collect()
}

/// Fold the label matrix into one consensus label vector. Returned labels
/// are compacted to 0-based ids in first-occurrence order.
pub fn iterative_voting_consensus(matrix: &[Vec<usize>]) -> Vec<usize> {
    let rows = matrix.len();
    if rows == 0 {
        return Vec::new();
    }
    let max_label = matrix.iter().flatten().max().copied().unwrap_or(0);
    let label_count = max_label + 1;

    let mut rng = rand::rng();
    let mut labels: Vec<usize> = (0..rows).map(|_| rng.random_range(0..label_count)).collect();

    for _ in 0..MAX_VOTING_ITERATIONS {
        let representatives = cluster_representatives(matrix, &labels, label_count);
        let next = reassign_rows(matrix, &representatives, &labels);
        if next == labels {
            break;
        }
        labels = next;
    }
    compact_labels(&labels)
}

/// Majority-vote representative vector per non-empty cluster.
fn cluster_representatives(
    matrix: &[Vec<usize>],
    labels: &[usize],
    label_count: usize,
) -> Vec<Option<Vec<usize>>> {
    let columns = matrix.first().map(Vec::len).unwrap_or(0);
    (0..label_count)
        .map(|cluster| {
            let members: Vec<&Vec<usize>> = matrix
                .iter()
                .zip(labels)
                .filter(|(_, &label)| label == cluster)
                .map(|(row, _)| row)
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(
                (0..columns)
                    .map(|col| majority(members.iter().map(|row| row[col])))
                    .collect(),
            )
        })
        .collect()
}

/// Most frequent value; ties break toward the smallest value.
fn majority(values: impl Iterator<Item = usize>) -> usize {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut best = 0;
    let mut best_count = 0;
    for (value, count) in counts {
        if count > best_count {
            best = value;
            best_count = count;
        }
    }
    best
}

/// Move every row to the nearest representative by Hamming distance; ties
/// break toward the lowest cluster id.
fn reassign_rows(
    matrix: &[Vec<usize>],
    representatives: &[Option<Vec<usize>>],
    labels: &[usize],
) -> Vec<usize> {
    matrix
        .iter()
        .zip(labels)
        .map(|(row, &current)| {
            let mut best = current;
            let mut best_distance = usize::MAX;
            for (cluster, representative) in representatives.iter().enumerate() {
                let Some(representative) = representative else {
                    continue;
                };
                let distance = hamming(row, representative);
                if distance < best_distance {
                    best_distance = distance;
                    best = cluster;
                }
            }
            best
        })
        .collect()
}

fn hamming(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

fn compact_labels(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let mut next = 0;
    labels
        .iter()
        .map(|&label| {
            *mapping.entry(label).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}

/// Group universe methods by consensus label into disjoint clusters.
pub fn decode_consensus(labels: &[usize], universe: &[MethodId]) -> Vec<Cluster> {
    let cluster_count = labels.iter().max().map(|&m| m + 1).unwrap_or(0);
    let mut clusters = vec![Cluster::new(); cluster_count];
    for (method, &label) in universe.iter().zip(labels) {
        clusters[label].add_element(method.clone());
    }
    clusters
}

/// Combine the partitions of all successful algorithms, restricted to their
/// common universe, into one partition.
pub fn consensus(
    partitions: &[Vec<Cluster>],
    universe: &[MethodId],
) -> Result<Vec<Cluster>, ConsensusError> {
    let matrix = build_cluster_matrix(partitions, universe)?;
    let labels = iterative_voting_consensus(&matrix);
    Ok(decode_consensus(&labels, universe))
}
