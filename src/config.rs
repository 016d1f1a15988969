//! Pipeline configuration.
//!
//! The caller builds an explicit [`PipelineConfig`] and hands it to
//! [`crate::pipeline::run_pipeline`]; there is no process-wide registry.
//! Algorithm registration validates required parameters immediately, so a
//! misconfigured algorithm fails before the run starts.

use crate::clustering::{AlgorithmParams, ClusteringAlgorithm};
use crate::findings::VulnerabilityScanner;
use crate::summarize::Summarizer;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("clustering algorithm `{algorithm}` requires parameter `{param}`")]
    MissingParam {
        algorithm: &'static str,
        param: &'static str,
    },
    #[error("no clustering algorithms registered")]
    NoAlgorithms,
}

pub struct PipelineConfig {
    pub root: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub(crate) algorithms: Vec<Box<dyn ClusteringAlgorithm>>,
    pub(crate) scanner: Option<Box<dyn VulnerabilityScanner>>,
    pub(crate) summarizer: Option<Box<dyn Summarizer>>,
}

impl PipelineConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_patterns: Vec::new(),
            output_dir: None,
            algorithms: Vec::new(),
            scanner: None,
            summarizer: None,
        }
    }

    /// Register an algorithm with default parameters.
    pub fn register_algorithm(
        &mut self,
        algorithm: Box<dyn ClusteringAlgorithm>,
    ) -> Result<(), ConfigError> {
        self.register_algorithm_with_params(algorithm, AlgorithmParams::default())
    }

    /// Register an algorithm, applying and validating its parameters.
    pub fn register_algorithm_with_params(
        &mut self,
        mut algorithm: Box<dyn ClusteringAlgorithm>,
        params: AlgorithmParams,
    ) -> Result<(), ConfigError> {
        algorithm.set_params(params);
        algorithm.validate_params()?;
        self.algorithms.push(algorithm);
        Ok(())
    }

    pub fn with_scanner(mut self, scanner: Box<dyn VulnerabilityScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn algorithm_count(&self) -> usize {
        self.algorithms.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{HierarchyClustering, LexicalCallClustering, MethodRef};
    use std::path::Path;

    struct EmptyProvider;

    impl crate::clustering::CallHierarchyProvider for EmptyProvider {
        fn references(
            &self,
            _input_dir: &Path,
            _output_path: &Path,
        ) -> anyhow::Result<Vec<(MethodRef, Vec<MethodRef>)>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn registration_validates_required_params() {
        let mut config = PipelineConfig::new("src");
        let result =
            config.register_algorithm(Box::new(HierarchyClustering::new(Box::new(EmptyProvider))));
        assert!(matches!(
            result,
            Err(ConfigError::MissingParam {
                algorithm: "call-hierarchy",
                param: "input_dir",
            })
        ));
        assert_eq!(config.algorithm_count(), 0);

        let result = config.register_algorithm_with_params(
            Box::new(HierarchyClustering::new(Box::new(EmptyProvider))),
            AlgorithmParams {
                input_dir: Some(PathBuf::from("src")),
                output_path: None,
            },
        );
        assert!(result.is_ok());
        assert_eq!(config.algorithm_count(), 1);
    }

    #[test]
    fn empty_config_fails_validation() {
        let mut config = PipelineConfig::new("src");
        assert!(matches!(config.validate(), Err(ConfigError::NoAlgorithms)));

        config
            .register_algorithm(Box::new(LexicalCallClustering::new()))
            .unwrap();
        assert!(config.validate().is_ok());
    }
}
