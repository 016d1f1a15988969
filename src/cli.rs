use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "methodmap")]
#[command(about = "Java method clustering and vulnerability context analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a Java source tree and cluster its methods
    Analyze {
        /// Path to the source tree
        path: PathBuf,

        /// Directory for the JSON artifacts (model and enriched report)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Previously produced scan-report JSON to attach to methods
        #[arg(long = "scan-report")]
        scan_report: Option<PathBuf>,

        /// Number of lexical clustering runs to register
        #[arg(long, default_value = "1")]
        runs: usize,

        /// Glob patterns for paths to skip
        #[arg(long = "ignore", value_delimiter = ',')]
        ignore_patterns: Option<Vec<String>>,
    },
}
