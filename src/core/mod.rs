use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// A contiguous source span. Lines and columns are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl Position {
    pub fn new(start_line: usize, end_line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl JavaParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Structural identity of a method: name, return type, and the ordered
/// parameter types. Two methods produced by unrelated parses (or reported by
/// independent analysis tools) are the same graph node iff their `MethodId`s
/// are equal. Parameter names, positions, and code text never participate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId {
    pub name: String,
    pub return_type: String,
    pub param_types: Vec<String>,
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.return_type,
            self.name,
            self.param_types.join(", ")
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JavaMethod {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<JavaParameter>,
    pub position: Position,
    pub code: String,
    pub summary: String,
    /// Name of the enclosing class; a non-owning back-reference.
    pub class_name: String,
    pub is_vulnerable: bool,
    pub vulnerability: Option<String>,
    pub vulnerability_metadata: Option<serde_json::Value>,
    pub match_string: Option<String>,
    /// Index into the final cluster list; written exactly once per pipeline
    /// run by the consensus/adoption step.
    pub parent_cluster: Option<usize>,
}

impl JavaMethod {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<JavaParameter>,
        position: Position,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters,
            position,
            code: code.into(),
            summary: String::new(),
            class_name: class_name.into(),
            is_vulnerable: false,
            vulnerability: None,
            vulnerability_metadata: None,
            match_string: None,
            parent_cluster: None,
        }
    }

    pub fn id(&self) -> MethodId {
        MethodId {
            name: self.name.clone(),
            return_type: self.return_type.clone(),
            param_types: self
                .parameters
                .iter()
                .map(|p| p.type_name.clone())
                .collect(),
        }
    }

    /// Human-readable signature, e.g. `int add(int a, int b)`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.type_name, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({})", self.return_type, self.name, params)
    }
}

impl PartialEq for JavaMethod {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for JavaMethod {}

impl std::hash::Hash for JavaMethod {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JavaClass {
    pub name: String,
    pub position: Position,
    pub code: String,
    pub summary: String,
    pub methods: Vec<JavaMethod>,
}

impl JavaClass {
    pub fn new(name: impl Into<String>, position: Position, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            code: code.into(),
            summary: String::new(),
            methods: Vec::new(),
        }
    }

    pub fn add_method(&mut self, method: JavaMethod) {
        self.methods.push(method);
    }

    pub fn get_method(&self, name: &str) -> Option<&JavaMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JavaFile {
    pub path: PathBuf,
    pub code: String,
    pub classes: Vec<JavaClass>,
}

impl JavaFile {
    pub fn new(path: impl Into<PathBuf>, code: impl Into<String>, classes: Vec<JavaClass>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            classes,
        }
    }

    pub fn get_class(&self, name: &str) -> Option<&JavaClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &JavaMethod> {
        self.classes.iter().flat_map(|c| c.methods.iter())
    }
}

/// Iterate every method instance across a set of files, in source order.
pub fn all_methods(files: &[JavaFile]) -> impl Iterator<Item = &JavaMethod> {
    files.iter().flat_map(|f| f.methods())
}

/// The set of distinct method identities across a set of files.
pub fn method_universe(files: &[JavaFile]) -> BTreeSet<MethodId> {
    all_methods(files).map(|m| m.id()).collect()
}

/// A group of behaviorally related methods. Clusters own no entities; the
/// elements are structural identities resolving back into the file tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub elements: BTreeSet<MethodId>,
    pub summary: String,
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, id: MethodId) {
        self.elements.insert(id);
    }

    pub fn contains(&self, id: &MethodId) -> bool {
        self.elements.contains(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn method(name: &str, ret: &str, params: &[(&str, &str)], line: usize) -> JavaMethod {
        JavaMethod::new(
            "Widget",
            name,
            ret,
            params
                .iter()
                .map(|(t, n)| JavaParameter::new(*n, *t))
                .collect(),
            Position::new(line, line + 3, 5, 5),
            format!("{} {}() {{ }}", ret, name),
        )
    }

    #[test]
    fn methods_from_unrelated_parses_are_equal_iff_signatures_match() {
        let first = method("save", "void", &[("String", "path")], 10);
        let mut second = method("save", "void", &[("String", "target")], 40);
        second.code = String::from("void save(String target) { write(target); }");

        // Differing positions, code, and parameter names do not matter.
        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));

        let other = method("save", "void", &[("File", "path")], 10);
        assert_ne!(first, other);
    }

    #[test]
    fn method_id_ignores_parameter_names() {
        let a = method("resize", "int", &[("int", "width"), ("int", "height")], 1);
        let b = method("resize", "int", &[("int", "w"), ("int", "h")], 1);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn signature_rendering() {
        let m = method("resize", "int", &[("int", "width"), ("int", "height")], 1);
        assert_eq!(m.signature(), "int resize(int width, int height)");
        assert_eq!(m.id().to_string(), "int resize(int, int)");
    }

    #[test]
    fn universe_deduplicates_structurally_identical_methods() {
        let a = method("run", "void", &[], 1);
        let b = method("run", "void", &[], 9);
        let mut class = JavaClass::new("Widget", Position::new(1, 20, 1, 1), "");
        class.add_method(a);
        class.add_method(b);
        let file = JavaFile::new("Widget.java", "", vec![class]);

        assert_eq!(method_universe(&[file]).len(), 1);
    }
}
