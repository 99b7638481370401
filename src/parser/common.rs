use miette::Result;
use std::path::{Path, PathBuf};

/// A top-level class or struct declared by a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,

    /// Base list entries reduced to their simple type name
    pub bases: Vec<String>,

    /// Names of declared fields, in declaration order
    pub fields: Vec<String>,

    /// Names of declared properties, in declaration order
    pub properties: Vec<String>,

    /// 1-indexed line of the declaration
    pub line: usize,
}

impl TypeDecl {
    /// Exact-token check against the base list
    pub fn derives_from_any(&self, base_types: &[String]) -> bool {
        self.bases.iter().any(|base| base_types.iter().any(|b| b == base))
    }

    /// Field and property names together
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().chain(self.properties.iter()).map(String::as_str)
    }
}

/// Result of parsing a script file
#[derive(Debug, Clone, Default)]
pub struct ScriptInfo {
    pub path: PathBuf,

    /// Top-level types in declaration order
    pub types: Vec<TypeDecl>,
}

impl ScriptInfo {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            types: Vec::new(),
        }
    }

    /// The type the script is about: the first one deriving from a recognized
    /// base, else the first declared type
    pub fn primary_type(&self, base_types: &[String]) -> Option<&TypeDecl> {
        self.types
            .iter()
            .find(|t| t.derives_from_any(base_types))
            .or_else(|| self.types.first())
    }
}

/// Trait for language-specific script parsers
pub trait Parser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ScriptInfo>;
}

/// Extract text from a node
pub fn node_text<'a>(node: tree_sitter::Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Find the first child of a specific kind
pub fn child_of_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Find all children of a specific kind
pub fn children_of_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Vec<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// `global::UnityEngine.MonoBehaviour` -> `MonoBehaviour`, `Base<T>` -> `Base`
pub fn simple_type_name(text: &str) -> &str {
    let without_generics = text.split('<').next().unwrap_or(text);
    without_generics
        .rsplit(|c| c == '.' || c == ':')
        .next()
        .unwrap_or(without_generics)
        .trim()
}
