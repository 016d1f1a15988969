//! Clustering from an external static call-hierarchy analysis.
//!
//! The analyzer reports directed method references in its own shape; each
//! endpoint is resolved back to a locally parsed method by matching the
//! method name, the parameter types with generics and arrays stripped, and
//! the short name of the enclosing class. References that resolve to zero or
//! several local methods are dropped with a diagnostic.

use crate::clustering::community::detect_communities;
use crate::clustering::{
    clusters_from_partition, AlgorithmParams, ClusterError, ClusteringAlgorithm,
};
use crate::config::ConfigError;
use crate::core::{Cluster, JavaFile, MethodId};
use crate::graph::MethodCallGraph;
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// A method reference as reported by the external analyzer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub method_name: String,
    pub param_types: Vec<String>,
    pub class_name: String,
}

/// Collaborator running the external call-hierarchy analysis over a source
/// directory and returning caller-to-callees reference edges.
pub trait CallHierarchyProvider {
    fn references(
        &self,
        input_dir: &Path,
        output_path: &Path,
    ) -> Result<Vec<(MethodRef, Vec<MethodRef>)>>;
}

pub struct HierarchyClustering {
    provider: Box<dyn CallHierarchyProvider>,
    graph: MethodCallGraph,
    clusters: Vec<Cluster>,
    unique_methods: BTreeSet<MethodId>,
    params: AlgorithmParams,
}

impl HierarchyClustering {
    pub fn new(provider: Box<dyn CallHierarchyProvider>) -> Self {
        Self {
            provider,
            graph: MethodCallGraph::new(),
            clusters: Vec::new(),
            unique_methods: BTreeSet::new(),
            params: AlgorithmParams::default(),
        }
    }
}

impl ClusteringAlgorithm for HierarchyClustering {
    fn name(&self) -> &'static str {
        "call-hierarchy"
    }

    fn set_params(&mut self, params: AlgorithmParams) {
        self.params = params;
    }

    fn validate_params(&self) -> Result<(), ConfigError> {
        if self.params.input_dir.is_none() {
            return Err(ConfigError::MissingParam {
                algorithm: self.name(),
                param: "input_dir",
            });
        }
        Ok(())
    }

    fn cluster(&mut self, files: &[JavaFile]) -> Result<(), ClusterError> {
        let input_dir = self
            .params
            .input_dir
            .clone()
            .ok_or(ClusterError::MissingParam { param: "input_dir" })?;
        let output_path = self
            .params
            .output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("out/hierarchy"));

        let references = self
            .provider
            .references(&input_dir, &output_path)
            .map_err(|err| ClusterError::Hierarchy(err.to_string()))?;

        let index = ResolutionIndex::build(files);
        let mut graph = MethodCallGraph::new();
        for (from, targets) in &references {
            let Some(from_id) = index.resolve(from) else {
                continue;
            };
            graph.add_node(from_id.clone());
            for to in targets {
                let Some(to_id) = index.resolve(to) else {
                    continue;
                };
                if from_id == to_id {
                    continue;
                }
                graph.record_calls(&from_id, &to_id, 1);
            }
        }
        graph.prune_empty_edges();

        let partition = detect_communities(&graph);
        self.unique_methods = graph.nodes().cloned().collect();
        self.clusters = clusters_from_partition(&partition);
        self.graph = graph;
        Ok(())
    }

    fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    fn unique_methods(&self) -> &BTreeSet<MethodId> {
        &self.unique_methods
    }
}

type ResolutionKey = (String, Vec<String>, String);

/// Lookup from `(method name, stripped param types, class short name)` to
/// the local methods carrying that shape.
struct ResolutionIndex {
    entries: HashMap<ResolutionKey, BTreeSet<MethodId>>,
}

impl ResolutionIndex {
    fn build(files: &[JavaFile]) -> Self {
        let mut entries: HashMap<ResolutionKey, BTreeSet<MethodId>> = HashMap::new();
        for file in files {
            for class in &file.classes {
                for method in &class.methods {
                    let key = (
                        method.name.clone(),
                        method
                            .parameters
                            .iter()
                            .map(|p| strip_type_reference(&p.type_name))
                            .collect(),
                        short_class_name(&class.name).to_string(),
                    );
                    entries.entry(key).or_default().insert(method.id());
                }
            }
        }
        Self { entries }
    }

    /// Resolve a reported reference to exactly one local method, or drop it.
    fn resolve(&self, reference: &MethodRef) -> Option<MethodId> {
        let key = (
            reference.method_name.clone(),
            reference
                .param_types
                .iter()
                .map(|t| strip_type_reference(t))
                .collect(),
            short_class_name(&reference.class_name).to_string(),
        );
        match self.entries.get(&key) {
            Some(ids) if ids.len() == 1 => ids.iter().next().cloned(),
            Some(_) => {
                debug!(
                    "reference {}.{} is ambiguous, dropping",
                    reference.class_name, reference.method_name
                );
                None
            }
            None => {
                debug!(
                    "reference {}.{} has no local method, dropping",
                    reference.class_name, reference.method_name
                );
                None
            }
        }
    }
}

/// Reduce a type reference to its simple name: generics and array suffixes
/// removed, package qualifiers dropped.
pub fn strip_type_reference(type_name: &str) -> String {
    let mut base = type_name.split('<').next().unwrap_or(type_name).trim();
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
    }
    base.rsplit('.').next().unwrap_or(base).trim().to_string()
}

fn short_class_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JavaClass, JavaMethod, JavaParameter, Position};

    struct FixedProvider(Vec<(MethodRef, Vec<MethodRef>)>);

    impl CallHierarchyProvider for FixedProvider {
        fn references(
            &self,
            _input_dir: &Path,
            _output_path: &Path,
        ) -> Result<Vec<(MethodRef, Vec<MethodRef>)>> {
            Ok(self.0.clone())
        }
    }

    fn make_file(class: &str, methods: &[(&str, &[(&str, &str)])]) -> JavaFile {
        let mut java_class = JavaClass::new(class, Position::new(1, 100, 1, 1), "");
        for (i, (name, params)) in methods.iter().enumerate() {
            java_class.add_method(JavaMethod::new(
                class,
                *name,
                "void",
                params
                    .iter()
                    .map(|(t, n)| JavaParameter::new(*n, *t))
                    .collect(),
                Position::new(i * 10 + 2, i * 10 + 8, 5, 5),
                "",
            ));
        }
        JavaFile::new(format!("{class}.java"), "", vec![java_class])
    }

    fn reference(class: &str, method: &str, params: &[&str]) -> MethodRef {
        MethodRef {
            method_name: method.to_string(),
            param_types: params.iter().map(|t| t.to_string()).collect(),
            class_name: class.to_string(),
        }
    }

    #[test]
    fn strips_generics_arrays_and_qualifiers() {
        assert_eq!(strip_type_reference("java.util.List<User>"), "List");
        assert_eq!(strip_type_reference("String[]"), "String");
        assert_eq!(strip_type_reference("byte[][]"), "byte");
        assert_eq!(strip_type_reference("int"), "int");
    }

    #[test]
    fn resolved_references_build_the_graph() {
        let files = vec![
            make_file("Login", &[("check", &[("java.lang.String", "token")])]),
            make_file("Db", &[("query", &[])]),
        ];
        let provider = FixedProvider(vec![(
            reference("Login", "check", &["String"]),
            vec![reference("Db", "query", &[])],
        )]);

        let mut algorithm = HierarchyClustering::new(Box::new(provider));
        algorithm.set_params(AlgorithmParams {
            input_dir: Some(PathBuf::from("src")),
            output_path: None,
        });
        algorithm.cluster(&files).unwrap();

        assert_eq!(algorithm.unique_methods().len(), 2);
        assert_eq!(algorithm.clusters().len(), 1);
        assert_eq!(algorithm.clusters()[0].len(), 2);
    }

    #[test]
    fn unresolved_and_ambiguous_references_are_dropped() {
        // Two overloads of `save` differ only in stripped types, making the
        // reference ambiguous; `missing` resolves to nothing.
        let files = vec![make_file(
            "Store",
            &[
                ("save", &[("java.util.List<User>", "users")]),
                ("save", &[("List<Role>", "roles")]),
                ("load", &[]),
            ],
        )];
        let provider = FixedProvider(vec![
            (
                reference("Store", "load", &[]),
                vec![
                    reference("Store", "save", &["List"]),
                    reference("Store", "missing", &[]),
                ],
            ),
        ]);

        let mut algorithm = HierarchyClustering::new(Box::new(provider));
        algorithm.set_params(AlgorithmParams {
            input_dir: Some(PathBuf::from("src")),
            output_path: None,
        });
        algorithm.cluster(&files).unwrap();

        // Only `load` resolved; with no surviving edge the graph holds the
        // single resolved node.
        assert_eq!(algorithm.unique_methods().len(), 1);
        assert_eq!(algorithm.clusters().len(), 1);
    }

    #[test]
    fn missing_input_dir_is_a_preflight_error() {
        let provider = FixedProvider(Vec::new());
        let algorithm = HierarchyClustering::new(Box::new(provider));
        assert!(algorithm.validate_params().is_err());
    }
}
