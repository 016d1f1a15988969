//! The analysis pipeline.
//!
//! Parses the source tree, attaches scan findings, runs every registered
//! clustering algorithm in order (catching failures per algorithm), folds the
//! surviving partitions into one, writes cluster back-references, enriches
//! summaries, and persists the artifacts. The run produces a best-effort
//! result from whichever algorithms succeeded and fails only when none did.

use crate::analyzers::parse_java_files;
use crate::clustering::consensus::{consensus, intersect_coverage};
use crate::config::PipelineConfig;
use crate::core::{Cluster, JavaFile, MethodId};
use crate::findings::{attach_findings, ScanReport};
use crate::io;
use crate::summarize::enrich_summaries;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("every registered clustering algorithm failed; no partition is available")]
    AllAlgorithmsFailed,
}

/// Outcome of one algorithm run, in registration order.
#[derive(Clone, Debug)]
pub enum AlgorithmOutcome {
    Success {
        name: &'static str,
        cluster_count: usize,
        coverage: usize,
    },
    Failed {
        name: &'static str,
        reason: String,
    },
}

impl AlgorithmOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, AlgorithmOutcome::Success { .. })
    }
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub files: Vec<JavaFile>,
    pub clusters: Vec<Cluster>,
    pub universe: Vec<MethodId>,
    pub outcomes: Vec<AlgorithmOutcome>,
    pub vulnerable_methods: Vec<MethodId>,
    pub report: Option<ScanReport>,
}

/// Persisted snapshot of the source model and the final partition.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub project_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub files: Vec<JavaFile>,
    pub clusters: Vec<Cluster>,
}

pub fn run_pipeline(mut config: PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    let paths = io::find_java_files(&config.root, &config.ignore_patterns)?;
    info!("parsing {} java files under {}", paths.len(), config.root.display());
    let mut files = parse_java_files(&paths);

    let mut report = None;
    let mut vulnerable_methods = Vec::new();
    if let Some(scanner) = &config.scanner {
        let mut scan = scanner.scan(&config.root)?;
        vulnerable_methods = attach_findings(&mut files, &mut scan);
        info!("{} methods carry findings", vulnerable_methods.len());
        report = Some(scan);
    }

    let mut outcomes = Vec::new();
    for (index, algorithm) in config.algorithms.iter_mut().enumerate() {
        info!("running clustering algorithm {index} ({})", algorithm.name());
        match algorithm.cluster(&files) {
            Ok(()) => outcomes.push(AlgorithmOutcome::Success {
                name: algorithm.name(),
                cluster_count: algorithm.clusters().len(),
                coverage: algorithm.unique_methods().len(),
            }),
            Err(err) => {
                warn!(
                    "clustering algorithm {index} ({}) failed: {err}",
                    algorithm.name()
                );
                outcomes.push(AlgorithmOutcome::Failed {
                    name: algorithm.name(),
                    reason: err.to_string(),
                });
            }
        }
    }

    let survivors: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| outcome.succeeded())
        .map(|(index, _)| index)
        .collect();

    let (mut clusters, universe) = match survivors.as_slice() {
        [] => return Err(PipelineError::AllAlgorithmsFailed.into()),
        [only] => {
            // A single surviving partition is adopted as-is; no voting.
            let algorithm = &config.algorithms[*only];
            (
                algorithm.clusters().to_vec(),
                algorithm.unique_methods().iter().cloned().collect(),
            )
        }
        _ => {
            let universe = intersect_coverage(
                survivors
                    .iter()
                    .map(|&index| config.algorithms[index].unique_methods()),
            );
            let partitions: Vec<Vec<Cluster>> = survivors
                .iter()
                .map(|&index| config.algorithms[index].clusters().to_vec())
                .collect();
            let clusters = consensus(&partitions, &universe)?;
            (clusters, universe)
        }
    };
    info!(
        "final partition: {} clusters over {} methods",
        clusters.len(),
        universe.len()
    );

    assign_parent_clusters(&mut files, &clusters);

    if let Some(summarizer) = &config.summarizer {
        enrich_summaries(&mut files, &mut clusters, summarizer.as_ref())?;
    }

    if let Some(output_dir) = &config.output_dir {
        persist_artifacts(output_dir, &config.root, &files, &clusters, report.as_ref())?;
    }

    Ok(PipelineOutcome {
        files,
        clusters,
        universe,
        outcomes,
        vulnerable_methods,
        report,
    })
}

/// Write each method's cluster back-reference, once.
fn assign_parent_clusters(files: &mut [JavaFile], clusters: &[Cluster]) {
    let mut label_of: HashMap<MethodId, usize> = HashMap::new();
    for (index, cluster) in clusters.iter().enumerate() {
        for id in &cluster.elements {
            label_of.insert(id.clone(), index);
        }
    }
    for file in files.iter_mut() {
        for class in &mut file.classes {
            for method in &mut class.methods {
                if method.parent_cluster.is_none() {
                    method.parent_cluster = label_of.get(&method.id()).copied();
                }
            }
        }
    }
}

fn persist_artifacts(
    output_dir: &Path,
    root: &Path,
    files: &[JavaFile],
    clusters: &[Cluster],
    report: Option<&ScanReport>,
) -> Result<()> {
    io::ensure_dir(output_dir)?;

    let artifact = ModelArtifact {
        project_path: root.to_path_buf(),
        timestamp: Utc::now(),
        files: files.to_vec(),
        clusters: clusters.to_vec(),
    };
    let encoded = serde_json::to_string_pretty(&artifact).context("serializing model artifact")?;
    io::write_file(&output_dir.join("model.json"), &encoded)?;

    if let Some(report) = report {
        let encoded = serde_json::to_string_pretty(report).context("serializing scan report")?;
        io::write_file(&output_dir.join("scan_report.json"), &encoded)?;
    }
    Ok(())
}
