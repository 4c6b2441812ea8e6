//! C# syntax provider and grammar vocabulary, using tree-sitter-c-sharp.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{SourceUnit, SyntaxProvider};

/// Node kinds of the tree-sitter-c-sharp grammar the analysis relies on.
pub mod kind {
    pub const COMPILATION_UNIT: &str = "compilation_unit";
    pub const NAMESPACE: &str = "namespace_declaration";
    pub const FILE_SCOPED_NAMESPACE: &str = "file_scoped_namespace_declaration";
    pub const CLASS: &str = "class_declaration";
    pub const STRUCT: &str = "struct_declaration";
    pub const INTERFACE: &str = "interface_declaration";
    pub const RECORD: &str = "record_declaration";
    pub const METHOD: &str = "method_declaration";
    pub const CONSTRUCTOR: &str = "constructor_declaration";
    pub const FIELD: &str = "field_declaration";
    pub const INVOCATION: &str = "invocation_expression";
    pub const MEMBER_ACCESS: &str = "member_access_expression";
    pub const IDENTIFIER: &str = "identifier";
    pub const ARGUMENT: &str = "argument";
    pub const PARAMETER: &str = "parameter";
    pub const VARIABLE_DECLARATION: &str = "variable_declaration";
    pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
    pub const OBJECT_CREATION: &str = "object_creation_expression";
    pub const NULL_LITERAL: &str = "null_literal";
    pub const INTEGER_LITERAL: &str = "integer_literal";
    pub const REAL_LITERAL: &str = "real_literal";
    pub const STRING_LITERAL: &str = "string_literal";
    pub const VERBATIM_STRING_LITERAL: &str = "verbatim_string_literal";
    pub const INTERPOLATED_STRING: &str = "interpolated_string_expression";
    pub const BOOLEAN_LITERAL: &str = "boolean_literal";
    pub const CHARACTER_LITERAL: &str = "character_literal";
    pub const MODIFIER: &str = "modifier";
    pub const COMMENT: &str = "comment";
}

pub struct CSharpSyntax {
    language: Language,
}

impl CSharpSyntax {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for CSharpSyntax {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxProvider for CSharpSyntax {
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<SourceUnit> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C# source: {}", path.display()))?;

        Ok(SourceUnit {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn language(&self) -> &str {
        "csharp"
    }
}

/// Registry factory for `.cs` files.
pub fn factory() -> Box<dyn SyntaxProvider> {
    Box::new(CSharpSyntax::new())
}

/// Text of a declaration's `name` field, or "" when the field is absent
/// (e.g. inside an ERROR subtree).
pub fn name_text<'s>(unit: &'s SourceUnit, node: Node) -> &'s str {
    node.child_by_field_name("name")
        .map(|n| unit.node_text(n))
        .unwrap_or("")
}

/// Declaration modifiers ("public static", ...) joined in source order.
pub fn modifiers_text(unit: &SourceUnit, node: Node) -> String {
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == kind::MODIFIER)
        .map(|c| unit.node_text(c))
        .collect();
    parts.join(" ")
}

/// Declared parameter type texts of a method or constructor, in order.
pub fn parameter_types(unit: &SourceUnit, decl: Node) -> Vec<String> {
    let mut types = Vec::new();
    if let Some(list) = decl.child_by_field_name("parameters") {
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            if param.kind() != kind::PARAMETER {
                continue;
            }
            if let Some(ty) = param.child_by_field_name("type") {
                types.push(unit.node_text(ty).to_string());
            }
        }
    }
    types
}

/// Raw source text of a declaration's parameter list, parentheses included.
pub fn parameter_list_text<'s>(unit: &'s SourceUnit, decl: Node) -> &'s str {
    decl.child_by_field_name("parameters")
        .map(|n| unit.node_text(n))
        .unwrap_or("()")
}

/// Argument expression nodes of an invocation, unwrapped from their
/// `argument` wrappers, in source order.
pub fn argument_expressions(invocation: Node) -> Vec<Node> {
    let mut exprs = Vec::new();
    if let Some(list) = invocation.child_by_field_name("arguments") {
        let mut cursor = list.walk();
        for arg in list.named_children(&mut cursor) {
            if arg.kind() != kind::ARGUMENT {
                continue;
            }
            let mut inner = arg.walk();
            if let Some(expr) = arg.named_children(&mut inner).last() {
                exprs.push(expr);
            }
        }
    }
    exprs
}

/// Byte ranges of all comment nodes inside `node`, in document order.
pub fn comment_spans(node: Node) -> Vec<(usize, usize)> {
    super::descendants_of_kind(node, kind::COMMENT)
        .into_iter()
        .map(|c| (c.start_byte(), c.end_byte()))
        .collect()
}

/// Whether the node is one of the type declarations the symbol index covers.
pub fn is_type_declaration(node_kind: &str) -> bool {
    matches!(
        node_kind,
        kind::CLASS | kind::STRUCT | kind::INTERFACE | kind::RECORD
    )
}
