//! Structural parsing of Java source files.
//!
//! Grammar parsing is delegated to tree-sitter with the Java grammar; the
//! walk keeps a stack of enclosing class declarations and runs the span
//! extractor for every class, interface, and method declaration it meets, in
//! source order. A failed file or declaration is skipped with a warning; the
//! batch never aborts.

use crate::analyzers::span::{extract_body, ExtractedSpan};
use crate::core::{JavaClass, JavaFile, JavaMethod, JavaParameter, Position};
use anyhow::{anyhow, Context, Result};
use log::warn;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

pub fn parse_java_file(path: &Path, source: &str) -> Result<JavaFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .context("failed to load the Java grammar")?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("tree-sitter returned no tree for {}", path.display()))?;
    if tree.root_node().has_error() {
        return Err(anyhow!("syntax errors in {}", path.display()));
    }

    let lines: Vec<&str> = source.lines().collect();
    let mut walker = DeclarationWalker {
        source,
        lines: &lines,
        path,
        classes: Vec::new(),
        stack: Vec::new(),
    };
    walker.visit(tree.root_node());

    Ok(JavaFile::new(path, source, walker.classes))
}

/// Parse a batch of files, skipping any that fail.
pub fn parse_java_files(paths: &[PathBuf]) -> Vec<JavaFile> {
    let mut files = Vec::new();
    for path in paths {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!("cannot read {}: {err}", path.display());
                continue;
            }
        };
        match parse_java_file(path, &source) {
            Ok(file) => files.push(file),
            Err(err) => warn!("cannot parse {}: {err}", path.display()),
        }
    }
    files
}

struct DeclarationWalker<'a> {
    source: &'a str,
    lines: &'a [&'a str],
    path: &'a Path,
    classes: Vec<JavaClass>,
    /// Indices into `classes` for the enclosing class declarations.
    stack: Vec<usize>,
}

impl<'a> DeclarationWalker<'a> {
    fn visit(&mut self, node: Node) {
        match node.kind() {
            "class_declaration" | "interface_declaration" => {
                if self.enter_class(node) {
                    self.visit_children(node);
                    self.stack.pop();
                }
            }
            "method_declaration" => {
                self.add_method(node);
                // Local and anonymous classes nest inside method bodies.
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Returns true when the class was added and pushed onto the stack.
    fn enter_class(&mut self, node: Node) -> bool {
        let Some(name) = self.field_text(node, "name") else {
            return false;
        };
        let (line, column) = node_start(node);
        let span = match extract_body(self.lines, line, column) {
            Ok(span) => span,
            Err(err) => {
                warn!("skipping class {name} in {}: {err}", self.path.display());
                return false;
            }
        };
        let position = span_position(line, column, &span);
        self.classes
            .push(JavaClass::new(name, position, span.code()));
        self.stack.push(self.classes.len() - 1);
        true
    }

    fn add_method(&mut self, node: Node) {
        let Some(&owner) = self.stack.last() else {
            warn!(
                "method outside any class in {}, skipping",
                self.path.display()
            );
            return;
        };
        let Some(name) = self.field_text(node, "name") else {
            return;
        };
        let return_type = self
            .field_text(node, "type")
            .unwrap_or_else(|| String::from("void"));
        let parameters = self.parameters_of(node);

        let (line, column) = node_start(node);
        let span = match extract_body(self.lines, line, column) {
            Ok(span) => span,
            Err(err) => {
                warn!("skipping method {name} in {}: {err}", self.path.display());
                return;
            }
        };
        let position = span_position(line, column, &span);
        let class_name = self.classes[owner].name.clone();
        self.classes[owner].add_method(JavaMethod::new(
            class_name,
            name,
            return_type,
            parameters,
            position,
            span.code(),
        ));
    }

    fn parameters_of(&self, node: Node) -> Vec<JavaParameter> {
        let Some(list) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut parameters = Vec::new();
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            match child.kind() {
                "formal_parameter" | "spread_parameter" => {
                    let type_name = self
                        .field_text(child, "type")
                        .or_else(|| self.first_child_text(child))
                        .unwrap_or_default();
                    let name = self
                        .field_text(child, "name")
                        .or_else(|| self.last_identifier_text(child))
                        .unwrap_or_default();
                    parameters.push(JavaParameter::new(name, type_name));
                }
                _ => {}
            }
        }
        parameters
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.node_text(n).to_string())
    }

    fn first_child_text(&self, node: Node) -> Option<String> {
        let mut cursor = node.walk();
        let result = node.named_children(&mut cursor)
            .next()
            .map(|n| self.node_text(n).to_string());
        result
    }

    fn last_identifier_text(&self, node: Node) -> Option<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|n| n.kind() == "identifier")
            .last()
            .map(|n| self.node_text(n).to_string())
    }

    fn node_text(&self, node: Node) -> &str {
        &self.source[node.start_byte()..node.end_byte()]
    }
}

/// 1-based start line and column of a node.
fn node_start(node: Node) -> (usize, usize) {
    let pos = node.start_position();
    (pos.row + 1, pos.column + 1)
}

fn span_position(start_line: usize, start_column: usize, span: &ExtractedSpan) -> Position {
    Position::new(start_line, span.end_line, start_column, span.end_column)
}
