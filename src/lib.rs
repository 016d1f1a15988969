// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod clustering;
pub mod config;
pub mod core;
pub mod findings;
pub mod graph;
pub mod io;
pub mod pipeline;
pub mod summarize;

// Re-export commonly used types
pub use crate::core::{
    all_methods, method_universe, Cluster, JavaClass, JavaFile, JavaMethod, JavaParameter,
    MethodId, Position,
};

pub use crate::analyzers::{
    extract_body, parse_java_file, parse_java_files, CallExtractor, ExtractedSpan,
    LexicalCallExtractor, SpanError,
};

pub use crate::clustering::{
    consensus, detect_communities, AlgorithmParams, CallHierarchyProvider, ClusterError,
    ClusteringAlgorithm, HierarchyClustering, LexicalCallClustering, MethodRef,
};

pub use crate::config::{ConfigError, PipelineConfig};

pub use crate::findings::{
    attach_findings, finding_within_method, JsonReportScanner, ScanReport, VulnerabilityScanner,
};

pub use crate::graph::{build_call_graph, MethodCallGraph};

pub use crate::pipeline::{run_pipeline, AlgorithmOutcome, PipelineError, PipelineOutcome};

pub use crate::summarize::{enrich_summaries, Summarizer};
