//! End-to-end run: parse, attach findings, cluster, summarize, persist.

use anyhow::Result;
use methodmap::clustering::LexicalCallClustering;
use methodmap::config::PipelineConfig;
use methodmap::findings::JsonReportScanner;
use methodmap::pipeline::{run_pipeline, ModelArtifact};
use methodmap::summarize::Summarizer;
use pretty_assertions::assert_eq;
use std::fs;

struct OneLinerSummarizer;

impl Summarizer for OneLinerSummarizer {
    fn summarize(&self, _text: &str) -> Result<String> {
        Ok(String::from("Runs a database statement."))
    }
}

const DB_JAVA: &str = "class Db {\n    void query(String sql) {\n        run(sql);\n    }\n\n    void run(String sql) {\n        exec(sql);\n    }\n}\n";

const SCAN_REPORT: &str = r#"{
  "results": {
    "sql-injection": {
      "files": [
        {
          "file_path": "Db.java",
          "match_position": [9, 17],
          "match_lines": [3, 3],
          "match_string": "run(sql)",
          "label": { "false_positive": false }
        }
      ],
      "metadata": { "description": "SQL injection through string concatenation" }
    }
  }
}"#;

#[test]
fn full_pipeline_enriches_and_persists_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("Db.java"), DB_JAVA).unwrap();
    let report_path = dir.path().join("scan.json");
    fs::write(&report_path, SCAN_REPORT).unwrap();

    let mut config = PipelineConfig::new(&src)
        .with_scanner(Box::new(JsonReportScanner::new(&report_path)))
        .with_summarizer(Box::new(OneLinerSummarizer))
        .with_output_dir(&out);
    config
        .register_algorithm(Box::new(LexicalCallClustering::new()))
        .unwrap();

    let outcome = run_pipeline(config).unwrap();

    // The finding landed on `query` only.
    assert_eq!(outcome.vulnerable_methods.len(), 1);
    assert_eq!(outcome.vulnerable_methods[0].name, "query");

    let db = outcome.files[0].get_class("Db").unwrap();
    let query = db.get_method("query").unwrap();
    assert!(query.is_vulnerable);
    assert_eq!(query.vulnerability.as_deref(), Some("sql-injection"));
    assert_eq!(query.match_string.as_deref(), Some("run(sql)"));
    assert_eq!(query.summary, "Runs a database statement.");
    assert_eq!(db.summary, "Runs a database statement.");

    let run = db.get_method("run").unwrap();
    assert!(!run.is_vulnerable);
    assert_eq!(run.summary, "");

    // `query` calls `run`, so both sit in one summarized cluster.
    let cluster_index = query.parent_cluster.unwrap();
    assert_eq!(run.parent_cluster, Some(cluster_index));
    assert_eq!(
        outcome.clusters[cluster_index].summary,
        "Runs a database statement."
    );

    // Artifacts round-trip with identities intact.
    let raw = fs::read_to_string(out.join("model.json")).unwrap();
    let artifact: ModelArtifact = serde_json::from_str(&raw).unwrap();
    let persisted = artifact.files[0].get_class("Db").unwrap();
    assert_eq!(persisted.get_method("query").unwrap().id(), query.id());
    assert_eq!(
        persisted.get_method("query").unwrap().parent_cluster,
        Some(cluster_index)
    );
    assert_eq!(artifact.clusters.len(), outcome.clusters.len());

    let raw = fs::read_to_string(out.join("scan_report.json")).unwrap();
    let report: methodmap::ScanReport = serde_json::from_str(&raw).unwrap();
    let entry = &report.results["sql-injection"].files.as_ref().unwrap()[0];
    assert_eq!(entry.method_id.as_ref(), Some(&query.id()));
}
