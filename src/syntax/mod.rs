//! Parsing interface between the analysis core and the concrete grammar.
//!
//! This module provides:
//! - `SourceUnit`: a parsed file (tree + source + path), the unit of batch work
//! - `SyntaxProvider` trait: abstract "source text -> syntax tree" capability
//! - A factory-based provider lookup by file extension

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

pub mod csharp;

/// A parsed source file.
///
/// Owns the syntax tree together with the bytes it was parsed from, so
/// node text can be extracted for the lifetime of the batch. Immutable
/// after construction.
pub struct SourceUnit {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source bytes (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path as given on the command line / collected from disk.
    pub path: String,
}

impl SourceUnit {
    /// Get the source as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// The root node of the parse tree.
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }
}

/// Abstract parser capability.
///
/// The analysis core never constructs a tree-sitter parser directly; it
/// receives `SourceUnit`s produced through this trait, so the grammar is
/// swappable and the provider can be faked in tests.
pub trait SyntaxProvider: Send + Sync {
    /// Parse a source file into a syntax tree.
    ///
    /// Returns an error if parsing fails completely. Partial parse errors
    /// still yield a valid tree containing ERROR nodes; analysis proceeds
    /// on such trees.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<SourceUnit>;

    /// The language this provider handles (e.g., "csharp").
    fn language(&self) -> &str;
}

/// Factory function type for creating provider instances.
pub type ProviderFactory = fn() -> Box<dyn SyntaxProvider>;

lazy_static::lazy_static! {
    /// Global provider registry mapping file extensions to factories.
    static ref REGISTRY: RwLock<HashMap<String, ProviderFactory>> = RwLock::new(HashMap::new());
}

/// Register a provider factory for a file extension.
/// Extension should include the dot (e.g., ".cs").
pub fn register(ext: &str, factory: ProviderFactory) {
    let mut registry = REGISTRY.write().unwrap();
    registry.insert(ext.to_string(), factory);
}

/// Get a provider for the given file extension.
/// Returns None if no provider is registered for the extension.
pub fn for_extension(ext: &str) -> Option<Box<dyn SyntaxProvider>> {
    let registry = REGISTRY.read().unwrap();
    registry.get(ext).map(|factory| factory())
}

/// Initialize the provider registry.
/// Call this once at startup before parsing.
pub fn init() {
    register(".cs", csharp::factory);
}

/// Collect all descendants of `root` with the given node kind, in document
/// (pre-order) position. The root itself is excluded, matching the
/// "descendant" rather than "self-or-descendant" relation the walkers rely
/// on; matching nodes' own subtrees are still entered, so nested matches
/// are found too.
pub fn descendants_of_kind<'t>(
    root: tree_sitter::Node<'t>,
    kind: &str,
) -> Vec<tree_sitter::Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == kind && node.id() != root.id() {
            found.push(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_csharp() {
        init();

        let provider = for_extension(".cs");
        assert!(provider.is_some());
        assert_eq!(provider.unwrap().language(), "csharp");
    }

    #[test]
    fn unregistered_extension() {
        init();

        assert!(for_extension(".vb").is_none());
    }

    #[test]
    fn descendants_are_in_document_order() {
        init();
        let provider = for_extension(".cs").unwrap();
        let source = b"class A { void One() {} void Two() {} class B { void Three() {} } }";
        let unit = provider.parse(Path::new("A.cs"), source).unwrap();

        let methods = descendants_of_kind(unit.root(), "method_declaration");
        let names: Vec<&str> = methods
            .iter()
            .map(|m| unit.node_text(m.child_by_field_name("name").unwrap()))
            .collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);

        let classes = descendants_of_kind(unit.root(), "class_declaration");
        assert_eq!(classes.len(), 2);
    }
}
