//! The shared cross-file resolution context.
//!
//! All parsed units of a batch plus the reference metadata are bound into
//! one `CompilationContext`, built once per run, so a call from file A to a
//! declaration in file B resolves even though files are analyzed one at a
//! time. The context is never mutated after construction; every per-file
//! analysis sees the same, complete symbol universe.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::references::ReferenceSet;
use crate::syntax::csharp::{self, kind};
use crate::syntax::SourceUnit;

/// Sentinel used where a declaration has no enclosing namespace.
pub const NO_NAMESPACE: &str = "(no namespace)";

/// A method or constructor known to the symbol index.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: String,
    pub parameter_types: Vec<String>,
    pub return_type: String,
    pub is_constructor: bool,
}

/// A type (class, struct, interface, record) known to the symbol index.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub simple_name: String,
    /// The pure enclosing namespace chain, or the no-namespace sentinel.
    pub namespace: String,
    /// Namespace (or sentinel) plus the nested type chain plus the simple name.
    pub qualified_name: String,
    pub methods: Vec<MethodEntry>,
}

impl TypeEntry {
    /// Methods matching a name and argument count.
    pub fn methods_matching(&self, name: &str, arity: usize) -> Vec<&MethodEntry> {
        self.methods
            .iter()
            .filter(|m| m.name == name && m.parameter_types.len() == arity)
            .collect()
    }
}

/// Index of every type declared anywhere in the batch.
#[derive(Debug, Default)]
struct SymbolIndex {
    entries: Vec<TypeEntry>,
    by_simple: HashMap<String, Vec<usize>>,
    by_qualified: HashMap<String, usize>,
}

impl SymbolIndex {
    fn insert(&mut self, entry: TypeEntry) {
        let idx = self.entries.len();
        self.by_simple
            .entry(entry.simple_name.clone())
            .or_default()
            .push(idx);
        self.by_qualified.insert(entry.qualified_name.clone(), idx);
        self.entries.push(entry);
    }
}

/// All source units of the batch plus reference metadata, read-only.
pub struct CompilationContext {
    units: Vec<SourceUnit>,
    references: ReferenceSet,
    index: SymbolIndex,
}

impl CompilationContext {
    /// Bind all units of the batch and the reference metadata together and
    /// derive the symbol index. Includes struct/interface/record types so
    /// calls into them resolve, even though the report only walks classes.
    pub fn build(units: Vec<SourceUnit>, references: ReferenceSet) -> Self {
        let mut index = SymbolIndex::default();
        for unit in &units {
            // A file-scoped namespace declaration sits beside the
            // declarations it scopes, so its name applies to the whole unit.
            let mut namespace_parts = file_scoped_namespace_parts(unit);
            let mut type_chain = Vec::new();
            index_node(
                unit,
                unit.root(),
                &mut namespace_parts,
                &mut type_chain,
                &mut index,
            );
        }
        Self {
            units,
            references,
            index,
        }
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Every indexed type with the given simple name.
    pub fn types_named(&self, simple_name: &str) -> Vec<&TypeEntry> {
        self.index
            .by_simple
            .get(simple_name)
            .map(|ids| ids.iter().map(|&i| &self.index.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Exact lookup by fully qualified name.
    pub fn type_by_qualified(&self, qualified: &str) -> Option<&TypeEntry> {
        self.index
            .by_qualified
            .get(qualified)
            .map(|&i| &self.index.entries[i])
    }
}

fn index_node(
    unit: &SourceUnit,
    node: Node,
    namespace_parts: &mut Vec<String>,
    type_chain: &mut Vec<String>,
    index: &mut SymbolIndex,
) {
    match node.kind() {
        kind::NAMESPACE => {
            let name = csharp::name_text(unit, node);
            if name.is_empty() {
                index_children(unit, node, namespace_parts, type_chain, index);
                return;
            }
            let added: Vec<String> = name.split('.').map(str::to_string).collect();
            let added_len = added.len();
            namespace_parts.extend(added);
            index_children(unit, node, namespace_parts, type_chain, index);
            namespace_parts.truncate(namespace_parts.len() - added_len);
        }
        // The name was already applied unit-wide by the pre-scan; any
        // declarations nested here still get indexed.
        kind::FILE_SCOPED_NAMESPACE => {
            index_children(unit, node, namespace_parts, type_chain, index);
        }
        k if csharp::is_type_declaration(k) => {
            let simple = csharp::name_text(unit, node).to_string();
            if simple.is_empty() {
                return;
            }
            type_chain.push(simple.clone());

            let namespace = if namespace_parts.is_empty() {
                NO_NAMESPACE.to_string()
            } else {
                namespace_parts.join(".")
            };
            let qualified = format!("{}.{}", namespace, type_chain.join("."));
            index.insert(TypeEntry {
                simple_name: simple.clone(),
                namespace,
                qualified_name: qualified,
                methods: direct_members(unit, node, &simple),
            });

            index_children(unit, node, namespace_parts, type_chain, index);
            type_chain.pop();
        }
        _ => index_children(unit, node, namespace_parts, type_chain, index),
    }
}

fn file_scoped_namespace_parts(unit: &SourceUnit) -> Vec<String> {
    let root = unit.root();
    let mut cursor = root.walk();
    let parts = root
        .named_children(&mut cursor)
        .find(|child| child.kind() == kind::FILE_SCOPED_NAMESPACE)
        .map(|ns| csharp::name_text(unit, ns))
        .filter(|name| !name.is_empty())
        .map(|name| name.split('.').map(str::to_string).collect())
        .unwrap_or_default();
    parts
}

fn index_children(
    unit: &SourceUnit,
    node: Node,
    namespace_parts: &mut Vec<String>,
    type_chain: &mut Vec<String>,
    index: &mut SymbolIndex,
) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    for child in children {
        index_node(unit, child, namespace_parts, type_chain, index);
    }
}

/// Methods and constructors declared directly in the type's body. Members
/// of nested types belong to their own entry.
fn direct_members(unit: &SourceUnit, type_node: Node, type_name: &str) -> Vec<MethodEntry> {
    let mut members = Vec::new();
    let Some(body) = type_node.child_by_field_name("body") else {
        return members;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            kind::METHOD => {
                let return_type = member
                    .child_by_field_name("type")
                    .map(|n| unit.node_text(n).to_string())
                    .unwrap_or_default();
                members.push(MethodEntry {
                    name: csharp::name_text(unit, member).to_string(),
                    parameter_types: csharp::parameter_types(unit, member),
                    return_type,
                    is_constructor: false,
                });
            }
            kind::CONSTRUCTOR => {
                members.push(MethodEntry {
                    name: csharp::name_text(unit, member).to_string(),
                    parameter_types: csharp::parameter_types(unit, member),
                    return_type: type_name.to_string(),
                    is_constructor: true,
                });
            }
            _ => {}
        }
    }
    members
}
