//! The injected semantic capability.
//!
//! The classifier never inspects the symbol universe directly; it asks a
//! `Resolver`. The production implementation (`IndexResolver`) answers from
//! the batch-wide symbol index plus the core-runtime reference table, with
//! deliberately conservative rules: it identifies a callee only when the
//! receiver maps to exactly one known type, exactly one method matches by
//! name and arity, and no argument is a null literal (overload choice would
//! be a guess). Tests script their own `Resolver` implementations.

use tree_sitter::Node;

use crate::analysis::context::{CompilationContext, MethodEntry, TypeEntry};
use crate::analysis::walker;
use crate::syntax::csharp::{self, kind};
use crate::syntax::SourceUnit;

/// A type as the resolver reports it: containing namespace + simple name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub namespace: String,
    pub simple_name: String,
}

/// A confidently identified callee.
#[derive(Debug, Clone)]
pub struct ResolvedCallee {
    /// The callee's containing namespace (pure namespace chain).
    pub namespace: String,
    pub type_name: String,
    pub method_name: String,
    /// Declared return type, where known.
    pub return_type: Option<String>,
    /// Fully qualified original-definition display, e.g. `N.B.Bar(int)`.
    pub display: String,
}

/// Semantic queries the call classifier depends on.
pub trait Resolver {
    /// Identify the callee of an invocation expression, if it can be done
    /// with confidence.
    fn resolve_invocation(&self, unit: &SourceUnit, invocation: Node) -> Option<ResolvedCallee>;

    /// Static type of an arbitrary expression (typically a call receiver).
    fn static_type_of(&self, unit: &SourceUnit, expr: Node) -> Option<TypeRef>;

    /// Context-converted type of an argument expression.
    fn converted_type_of(&self, unit: &SourceUnit, expr: Node) -> Option<String>;
}

/// Production resolver over the shared compilation context.
pub struct IndexResolver<'c> {
    ctx: &'c CompilationContext,
}

impl<'c> IndexResolver<'c> {
    pub fn new(ctx: &'c CompilationContext) -> Self {
        Self { ctx }
    }

    /// The unique indexed type a type-text refers to, or None when unknown
    /// or ambiguous across the batch.
    fn entry_for_type_text(&self, text: &str) -> Option<&'c TypeEntry> {
        let text = normalize_type_text(text);
        if text.contains('.') {
            if let Some(entry) = self.ctx.type_by_qualified(&text) {
                return Some(entry);
            }
        }
        let simple = text.rsplit('.').next().unwrap_or_default();
        let candidates = self.ctx.types_named(simple);
        match candidates.len() {
            1 => Some(candidates[0]),
            _ => None,
        }
    }

    /// The declared type text of an identifier, found by scanning the
    /// enclosing declaration for parameters and local declarations, then
    /// the enclosing type for fields.
    fn declared_type_text(&self, unit: &SourceUnit, identifier: Node) -> Option<String> {
        let name = unit.node_text(identifier);

        let mut ancestor = identifier.parent();
        let mut enclosing_callable = None;
        let mut enclosing_type = None;
        while let Some(node) = ancestor {
            match node.kind() {
                kind::METHOD | kind::CONSTRUCTOR if enclosing_callable.is_none() => {
                    enclosing_callable = Some(node);
                }
                k if csharp::is_type_declaration(k) => {
                    enclosing_type = Some(node);
                    break;
                }
                _ => {}
            }
            ancestor = node.parent();
        }

        if let Some(callable) = enclosing_callable {
            if let Some(ty) = parameter_type_named(unit, callable, name) {
                return Some(ty);
            }
            if let Some(ty) = self.local_type_named(unit, callable, name) {
                return Some(ty);
            }
        }
        if let Some(type_node) = enclosing_type {
            if let Some(ty) = self.field_type_named(unit, type_node, name) {
                return Some(ty);
            }
        }
        None
    }

    fn local_type_named(&self, unit: &SourceUnit, scope: Node, name: &str) -> Option<String> {
        for decl in crate::syntax::descendants_of_kind(scope, kind::VARIABLE_DECLARATION) {
            let Some(ty) = variable_declaration_type(unit, decl) else {
                continue;
            };
            let mut cursor = decl.walk();
            for declarator in decl.named_children(&mut cursor) {
                if declarator.kind() != kind::VARIABLE_DECLARATOR {
                    continue;
                }
                if csharp::name_text(unit, declarator) != name {
                    continue;
                }
                if ty == "var" {
                    return self.inferred_initializer_type(unit, declarator);
                }
                return Some(ty);
            }
        }
        None
    }

    fn field_type_named(&self, unit: &SourceUnit, type_node: Node, name: &str) -> Option<String> {
        let body = type_node.child_by_field_name("body")?;
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() != kind::FIELD {
                continue;
            }
            let mut inner = member.walk();
            for decl in member.named_children(&mut inner) {
                if decl.kind() != kind::VARIABLE_DECLARATION {
                    continue;
                }
                let Some(ty) = variable_declaration_type(unit, decl) else {
                    continue;
                };
                let mut decls = decl.walk();
                for declarator in decl.named_children(&mut decls) {
                    if declarator.kind() == kind::VARIABLE_DECLARATOR
                        && csharp::name_text(unit, declarator) == name
                    {
                        return Some(ty);
                    }
                }
            }
        }
        None
    }

    /// Infer a `var` declarator's type from its initializer.
    fn inferred_initializer_type(&self, unit: &SourceUnit, declarator: Node) -> Option<String> {
        for created in crate::syntax::descendants_of_kind(declarator, kind::OBJECT_CREATION) {
            if let Some(ty) = created.child_by_field_name("type") {
                return Some(unit.node_text(ty).to_string());
            }
        }
        let name_id = declarator.child_by_field_name("name").map(|c| c.id());
        let mut cursor = declarator.walk();
        let initializer = declarator.named_children(&mut cursor).last()?;
        if Some(initializer.id()) == name_id {
            return None;
        }
        literal_type_text(initializer.kind()).map(str::to_string)
    }

    /// The type entry a call receiver denotes: a local/parameter/field's
    /// declared type, a type name used for a static call, or a
    /// namespace-qualified type name.
    fn receiver_entry(&self, unit: &SourceUnit, receiver: Node) -> Option<&'c TypeEntry> {
        match receiver.kind() {
            kind::IDENTIFIER => {
                if let Some(declared) = self.declared_type_text(unit, receiver) {
                    return self.entry_for_type_text(&declared);
                }
                self.entry_for_type_text(unit.node_text(receiver))
            }
            kind::MEMBER_ACCESS => self.entry_for_type_text(unit.node_text(receiver)),
            kind::OBJECT_CREATION => {
                let ty = receiver.child_by_field_name("type")?;
                self.entry_for_type_text(unit.node_text(ty))
            }
            "this_expression" => {
                let type_node = enclosing_type_node(receiver)?;
                let qualified = walker::qualified_type_name(unit, type_node);
                self.ctx.type_by_qualified(&qualified)
            }
            _ => None,
        }
    }

    fn callee_from(entry: &TypeEntry, method: &MethodEntry) -> ResolvedCallee {
        ResolvedCallee {
            namespace: entry.namespace.clone(),
            type_name: entry.simple_name.clone(),
            method_name: method.name.clone(),
            return_type: Some(method.return_type.clone()),
            display: format!(
                "{}.{}({})",
                entry.qualified_name,
                method.name,
                method.parameter_types.join(", ")
            ),
        }
    }

    /// Resolve against the embedded core-runtime table (e.g. `Console`).
    fn core_callee(
        &self,
        unit: &SourceUnit,
        receiver: Node,
        method_name: &str,
        invocation: Node,
    ) -> Option<ResolvedCallee> {
        if receiver.kind() != kind::IDENTIFIER {
            return None;
        }
        let type_name = unit.node_text(receiver);
        let namespace = self.ctx.references().core_namespace_of(type_name)?;
        let args: Vec<String> = csharp::argument_expressions(invocation)
            .into_iter()
            .map(|arg| {
                self.converted_type_of(unit, arg)
                    .unwrap_or_else(|| "?".to_string())
            })
            .collect();
        Some(ResolvedCallee {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            method_name: method_name.to_string(),
            return_type: None,
            display: format!(
                "{}.{}.{}({})",
                namespace,
                type_name,
                method_name,
                args.join(", ")
            ),
        })
    }
}

impl Resolver for IndexResolver<'_> {
    fn resolve_invocation(&self, unit: &SourceUnit, invocation: Node) -> Option<ResolvedCallee> {
        let function = invocation.child_by_field_name("function")?;
        let args = csharp::argument_expressions(invocation);
        // A null argument leaves the overload ambiguous; decline.
        if args.iter().any(|a| a.kind() == kind::NULL_LITERAL) {
            return None;
        }
        let arity = args.len();

        match function.kind() {
            kind::IDENTIFIER => {
                let method_name = unit.node_text(function);
                let class_node = enclosing_type_node(invocation)?;
                let qualified = walker::qualified_type_name(unit, class_node);
                let entry = self.ctx.type_by_qualified(&qualified)?;
                unique_method(entry, method_name, arity)
                    .map(|m| Self::callee_from(entry, m))
            }
            kind::MEMBER_ACCESS => {
                let receiver = function.child_by_field_name("expression")?;
                let name_node = function.child_by_field_name("name")?;
                let method_name = base_name(unit.node_text(name_node));

                if let Some(entry) = self.receiver_entry(unit, receiver) {
                    return unique_method(entry, &method_name, arity)
                        .map(|m| Self::callee_from(entry, m));
                }
                self.core_callee(unit, receiver, &method_name, invocation)
            }
            _ => None,
        }
    }

    fn static_type_of(&self, unit: &SourceUnit, expr: Node) -> Option<TypeRef> {
        match expr.kind() {
            kind::IDENTIFIER => {
                if let Some(declared) = self.declared_type_text(unit, expr) {
                    return self.type_ref_for_text(&declared);
                }
                self.type_ref_for_text(unit.node_text(expr))
            }
            kind::MEMBER_ACCESS => self.type_ref_for_text(unit.node_text(expr)),
            kind::OBJECT_CREATION => {
                let ty = expr.child_by_field_name("type")?;
                self.type_ref_for_text(unit.node_text(ty))
            }
            k => literal_type_text(k).map(|t| TypeRef {
                namespace: "System".to_string(),
                simple_name: t.to_string(),
            }),
        }
    }

    fn converted_type_of(&self, unit: &SourceUnit, expr: Node) -> Option<String> {
        if let Some(literal) = literal_type_text(expr.kind()) {
            return Some(literal.to_string());
        }
        match expr.kind() {
            kind::IDENTIFIER => self.declared_type_text(unit, expr),
            kind::OBJECT_CREATION => expr
                .child_by_field_name("type")
                .map(|ty| unit.node_text(ty).to_string()),
            kind::INVOCATION => self
                .resolve_invocation(unit, expr)
                .and_then(|callee| callee.return_type)
                .filter(|t| !t.is_empty()),
            _ => None,
        }
    }
}

impl IndexResolver<'_> {
    fn type_ref_for_text(&self, text: &str) -> Option<TypeRef> {
        if let Some(entry) = self.entry_for_type_text(text) {
            return Some(TypeRef {
                namespace: entry.namespace.clone(),
                simple_name: entry.simple_name.clone(),
            });
        }
        let simple = normalize_type_text(text);
        let simple = simple.rsplit('.').next().unwrap_or_default();
        if let Some(namespace) = self.ctx.references().core_namespace_of(simple) {
            return Some(TypeRef {
                namespace: namespace.to_string(),
                simple_name: simple.to_string(),
            });
        }
        if is_predefined_type(simple) {
            return Some(TypeRef {
                namespace: "System".to_string(),
                simple_name: simple.to_string(),
            });
        }
        None
    }
}

/// Strip generic arguments and array suffixes from a declared type text.
fn normalize_type_text(text: &str) -> String {
    let text = text.split('<').next().unwrap_or(text);
    text.trim_end_matches("[]").trim().to_string()
}

/// A method name with any generic argument list removed.
fn base_name(text: &str) -> String {
    text.split('<').next().unwrap_or(text).to_string()
}

fn unique_method<'e>(entry: &'e TypeEntry, name: &str, arity: usize) -> Option<&'e MethodEntry> {
    let matches: Vec<&MethodEntry> = entry
        .methods_matching(name, arity)
        .into_iter()
        .filter(|m| !m.is_constructor)
        .collect();
    match matches.len() {
        1 => Some(matches[0]),
        _ => None,
    }
}

fn parameter_type_named(unit: &SourceUnit, callable: Node, name: &str) -> Option<String> {
    let list = callable.child_by_field_name("parameters")?;
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if param.kind() != kind::PARAMETER {
            continue;
        }
        if csharp::name_text(unit, param) == name {
            return param
                .child_by_field_name("type")
                .map(|ty| unit.node_text(ty).to_string());
        }
    }
    None
}

fn variable_declaration_type(unit: &SourceUnit, decl: Node) -> Option<String> {
    if let Some(ty) = decl.child_by_field_name("type") {
        return Some(unit.node_text(ty).to_string());
    }
    let mut cursor = decl.walk();
    let ty = decl
        .named_children(&mut cursor)
        .find(|n| n.kind() != kind::VARIABLE_DECLARATOR)
        .map(|n| unit.node_text(n).to_string());
    ty
}

fn literal_type_text(node_kind: &str) -> Option<&'static str> {
    match node_kind {
        kind::INTEGER_LITERAL => Some("int"),
        kind::REAL_LITERAL => Some("double"),
        kind::STRING_LITERAL | kind::VERBATIM_STRING_LITERAL | kind::INTERPOLATED_STRING => {
            Some("string")
        }
        kind::BOOLEAN_LITERAL => Some("bool"),
        kind::CHARACTER_LITERAL => Some("char"),
        _ => None,
    }
}

fn is_predefined_type(text: &str) -> bool {
    matches!(
        text,
        "bool"
            | "byte"
            | "char"
            | "decimal"
            | "double"
            | "float"
            | "int"
            | "long"
            | "object"
            | "sbyte"
            | "short"
            | "string"
            | "uint"
            | "ulong"
            | "ushort"
    )
}

/// Innermost type declaration enclosing a node.
fn enclosing_type_node(node: Node) -> Option<Node> {
    let mut ancestor = node.parent();
    while let Some(current) = ancestor {
        if csharp::is_type_declaration(current.kind()) {
            return Some(current);
        }
        ancestor = current.parent();
    }
    None
}
