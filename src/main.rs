use anyhow::Result;
use clap::Parser;
use methodmap::cli::{Cli, Commands};
use methodmap::clustering::LexicalCallClustering;
use methodmap::config::PipelineConfig;
use methodmap::findings::JsonReportScanner;
use methodmap::pipeline::{run_pipeline, AlgorithmOutcome};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            output,
            scan_report,
            runs,
            ignore_patterns,
        } => analyze(path, output, scan_report, runs, ignore_patterns),
    }
}

fn analyze(
    path: PathBuf,
    output: Option<PathBuf>,
    scan_report: Option<PathBuf>,
    runs: usize,
    ignore_patterns: Option<Vec<String>>,
) -> Result<()> {
    let mut config = PipelineConfig::new(path);
    if let Some(patterns) = ignore_patterns {
        config = config.with_ignore_patterns(patterns);
    }
    if let Some(report) = scan_report {
        config = config.with_scanner(Box::new(JsonReportScanner::new(report)));
    }
    if let Some(output) = output {
        config = config.with_output_dir(output);
    }
    for _ in 0..runs.max(1) {
        config.register_algorithm(Box::new(LexicalCallClustering::new()))?;
    }

    let outcome = run_pipeline(config)?;

    for (index, algorithm) in outcome.outcomes.iter().enumerate() {
        match algorithm {
            AlgorithmOutcome::Success {
                name,
                cluster_count,
                coverage,
            } => println!("algorithm {index} ({name}): {cluster_count} clusters over {coverage} methods"),
            AlgorithmOutcome::Failed { name, reason } => {
                println!("algorithm {index} ({name}): failed ({reason})")
            }
        }
    }
    println!(
        "{} files, {} clusters over {} methods, {} methods with findings",
        outcome.files.len(),
        outcome.clusters.len(),
        outcome.universe.len(),
        outcome.vulnerable_methods.len()
    );
    Ok(())
}
