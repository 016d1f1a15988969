//! Natural-language summaries via a pluggable collaborator.
//!
//! Summaries are produced once per vulnerable method, once per enclosing
//! class, and once per cluster holding a vulnerable method. The empty-summary
//! guard makes the pass idempotent: an entity that already carries a summary
//! is never re-summarized.

use crate::core::{Cluster, JavaFile, MethodId};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};

pub trait Summarizer {
    /// Produce a one-sentence summary of the given code.
    fn summarize(&self, text: &str) -> Result<String>;
}

pub fn enrich_summaries(
    files: &mut [JavaFile],
    clusters: &mut [Cluster],
    summarizer: &dyn Summarizer,
) -> Result<()> {
    let mut code_of: HashMap<MethodId, String> = HashMap::new();
    let mut vulnerable: BTreeSet<MethodId> = BTreeSet::new();
    for file in files.iter() {
        for method in file.methods() {
            code_of.entry(method.id()).or_insert_with(|| method.code.clone());
            if method.is_vulnerable {
                vulnerable.insert(method.id());
            }
        }
    }

    for file in files.iter_mut() {
        for class in &mut file.classes {
            let mut class_vulnerable = false;
            for method in &mut class.methods {
                if !method.is_vulnerable {
                    continue;
                }
                class_vulnerable = true;
                if method.summary.is_empty() {
                    method.summary = summarizer.summarize(&method.code)?;
                }
            }
            if class_vulnerable && class.summary.is_empty() {
                class.summary = summarizer.summarize(&class.code)?;
            }
        }
    }

    for cluster in clusters.iter_mut() {
        if !cluster.summary.is_empty() {
            continue;
        }
        if !cluster.elements.iter().any(|id| vulnerable.contains(id)) {
            continue;
        }
        let text = cluster
            .elements
            .iter()
            .filter_map(|id| code_of.get(id).map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n\n");
        cluster.summary = summarizer.summarize(&text)?;
    }
    Ok(())
}
