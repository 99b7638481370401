use super::common::{
    child_of_kind, children_of_kind, node_text, simple_type_name, Parser, ScriptInfo, TypeDecl,
};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tree_sitter::{Node, Parser as TsParser};
use tracing::debug;

/// C# script parser using tree-sitter
pub struct CSharpParser;

impl CSharpParser {
    pub fn new() -> Self {
        Self
    }

    /// Collect type declarations that are not nested inside another type
    fn collect_types(&self, node: Node, source: &str, types: &mut Vec<TypeDecl>) {
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "class_declaration"
                | "struct_declaration"
                | "record_declaration"
                | "record_struct_declaration" => {
                    types.push(self.extract_type(child, source));
                }
                "namespace_declaration"
                | "file_scoped_namespace_declaration"
                | "declaration_list"
                | "preproc_if"
                | "preproc_elif"
                | "preproc_else" => {
                    self.collect_types(child, source, types);
                }
                _ => {}
            }
        }
    }

    fn extract_type(&self, node: Node, source: &str) -> TypeDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let mut decl = TypeDecl {
            name,
            bases: self.extract_bases(node, source),
            fields: Vec::new(),
            properties: Vec::new(),
            line: node.start_position().row + 1,
        };

        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, "declaration_list"));

        if let Some(body) = body {
            self.extract_members(body, source, &mut decl);
        }

        decl
    }

    fn extract_bases(&self, node: Node, source: &str) -> Vec<String> {
        let Some(base_list) = child_of_kind(node, "base_list") else {
            return Vec::new();
        };

        let mut cursor = base_list.walk();
        let bases: Vec<String> = base_list
            .named_children(&mut cursor)
            .map(|base| simple_type_name(node_text(base, source)).to_string())
            .filter(|base| !base.is_empty())
            .collect();
        bases
    }

    fn extract_members(&self, body: Node, source: &str, decl: &mut TypeDecl) {
        let mut cursor = body.walk();

        for member in body.children(&mut cursor) {
            match member.kind() {
                "field_declaration" => {
                    for declaration in children_of_kind(member, "variable_declaration") {
                        for declarator in children_of_kind(declaration, "variable_declarator") {
                            if let Some(name) = self.declarator_name(declarator, source) {
                                decl.fields.push(name);
                            }
                        }
                    }
                }
                "property_declaration" => {
                    if let Some(name) = member.child_by_field_name("name") {
                        decl.properties.push(node_text(name, source).to_string());
                    }
                }
                "preproc_if" | "preproc_elif" | "preproc_else" => {
                    self.extract_members(member, source, decl);
                }
                _ => {}
            }
        }
    }

    fn declarator_name(&self, declarator: Node, source: &str) -> Option<String> {
        declarator
            .child_by_field_name("name")
            .or_else(|| child_of_kind(declarator, "identifier"))
            .map(|n| node_text(n, source).to_string())
    }
}

impl Parser for CSharpParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ScriptInfo> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_c_sharp::language())
            .into_diagnostic()?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse C# file {}", path.display()))?;

        let mut result = ScriptInfo::new(path);
        self.collect_types(tree.root_node(), contents, &mut result.types);

        debug!("Parsed {}: {} top-level types", path.display(), result.types.len());

        Ok(result)
    }
}

impl Default for CSharpParser {
    fn default() -> Self {
        Self::new()
    }
}
