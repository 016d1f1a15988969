use methodmap::analyzers::{parse_java_file, LexicalCallExtractor};
use methodmap::clustering::{ClusteringAlgorithm, LexicalCallClustering};
use methodmap::graph::build_call_graph;
use methodmap::JavaFile;
use std::path::Path;

fn parse(name: &str, source: &str) -> JavaFile {
    parse_java_file(Path::new(name), source).unwrap()
}

fn two_file_fixture() -> Vec<JavaFile> {
    let a = parse(
        "A.java",
        "class A {\n    void foo() {\n        bar();\n        bar();\n    }\n}\n",
    );
    let b = parse(
        "B.java",
        "class B {\n    void bar() {\n        int x = 1;\n    }\n}\n",
    );
    vec![a, b]
}

#[test]
fn caller_and_callee_share_a_weighted_edge() {
    let files = two_file_fixture();
    let graph = build_call_graph(&files, &LexicalCallExtractor::new());

    let foo = files[0].classes[0].methods[0].id();
    let bar = files[1].classes[0].methods[0].id();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge_weight(&foo, &bar), Some(2));
}

#[test]
fn unrelated_methods_have_no_edge_after_pruning() {
    let files = vec![
        parse(
            "A.java",
            "class A {\n    void foo() {\n        int x = 1;\n    }\n}\n",
        ),
        parse(
            "B.java",
            "class B {\n    void baz() {\n        int y = 2;\n    }\n}\n",
        ),
    ];
    let graph = build_call_graph(&files, &LexicalCallExtractor::new());

    let foo = files[0].classes[0].methods[0].id();
    let baz = files[1].classes[0].methods[0].id();

    assert!(!graph.has_edge(&foo, &baz));
    assert_eq!(graph.edge_count(), 0);
    // Both methods stay in the graph as isolated nodes.
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn a_single_connected_edge_yields_one_cluster_with_both_methods() {
    let files = two_file_fixture();

    let mut algorithm = LexicalCallClustering::new();
    algorithm.cluster(&files).unwrap();

    let foo = files[0].classes[0].methods[0].id();
    let bar = files[1].classes[0].methods[0].id();

    assert_eq!(algorithm.unique_methods().len(), 2);
    let clusters = algorithm.clusters();
    assert_eq!(clusters.len(), 1);
    assert!(clusters[0].contains(&foo));
    assert!(clusters[0].contains(&bar));
}
