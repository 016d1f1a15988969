//! Vulnerability-scan findings: the report model, the scanner collaborator
//! boundary, and attachment of findings to the methods whose spans contain
//! them.

pub mod locator;

use crate::core::{JavaFile, MethodId};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub use locator::finding_within_method;

/// A scan report keyed by finding title.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub results: BTreeMap<String, Finding>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FindingFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FindingFile {
    pub file_path: PathBuf,
    /// 1-based column pair of the matched string.
    pub match_position: (usize, usize),
    /// 1-based line pair of the matched string.
    pub match_lines: (usize, usize),
    pub match_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<FindingLabel>,
    /// Identity of the containing method, filled in during attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<MethodId>,
}

/// Ground-truth annotation carried by labeled reports.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FindingLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_positive: Option<bool>,
}

/// Collaborator producing a scan report for a source tree.
pub trait VulnerabilityScanner {
    fn scan(&self, root: &Path) -> Result<ScanReport>;
}

/// Loads a previously produced scan report from a JSON file.
pub struct JsonReportScanner {
    report_path: PathBuf,
}

impl JsonReportScanner {
    pub fn new(report_path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: report_path.into(),
        }
    }
}

impl VulnerabilityScanner for JsonReportScanner {
    fn scan(&self, _root: &Path) -> Result<ScanReport> {
        let raw = std::fs::read_to_string(&self.report_path)
            .with_context(|| format!("cannot read scan report {}", self.report_path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed scan report {}", self.report_path.display()))
    }
}

/// Attach every finding in `report` to the methods whose spans contain it,
/// enriching both sides: the methods gain vulnerability fields, the report
/// entries gain the containing method's identity. Returns the identities of
/// all methods marked vulnerable, in discovery order.
///
/// A finding may land on zero or more methods; one that matches no span is
/// dropped from the derived data with a diagnostic.
pub fn attach_findings(files: &mut [JavaFile], report: &mut ScanReport) -> Vec<MethodId> {
    let mut vulnerable = Vec::new();
    let mut seen = BTreeSet::new();

    for (title, finding) in report.results.iter_mut() {
        let metadata = finding.metadata.clone();
        let Some(entries) = finding.files.as_mut() else {
            continue;
        };
        for entry in entries.iter_mut() {
            let reported_path = entry.file_path.clone();
            let mut matched = false;
            for file in files
                .iter_mut()
                .filter(|f| paths_match(&f.path, &reported_path))
            {
                for class in &mut file.classes {
                    for method in &mut class.methods {
                        if !finding_within_method(
                            entry.match_position,
                            entry.match_lines,
                            &method.position,
                        ) {
                            continue;
                        }
                        method.is_vulnerable = true;
                        method.vulnerability = Some(title.clone());
                        method.vulnerability_metadata = metadata.clone();
                        method.match_string = Some(entry.match_string.clone());
                        entry.method_id = Some(method.id());
                        if seen.insert(method.id()) {
                            vulnerable.push(method.id());
                        }
                        matched = true;
                    }
                }
            }
            if !matched {
                debug!(
                    "finding `{title}` at {}:{}-{} matched no method span",
                    entry.file_path.display(),
                    entry.match_lines.0,
                    entry.match_lines.1
                );
            }
        }
    }
    vulnerable
}

fn paths_match(parsed: &Path, reported: &Path) -> bool {
    parsed == reported || parsed.ends_with(reported) || reported.ends_with(parsed)
}
