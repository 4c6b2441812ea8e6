//! Declaration walking and qualified-name resolution.
//!
//! For one unit at a time: every class declaration reachable from the
//! root (nested classes included), and within each class every
//! constructor and method declaration anywhere inside its span. Records
//! stream to the report writer as they are produced; class- and
//! declaration-level fault boundaries keep one bad unit from stopping
//! its siblings.

use std::io;

use tree_sitter::Node;

use crate::analysis::calls::{self, CallSite};
use crate::analysis::context::NO_NAMESPACE;
use crate::analysis::hierarchy::CallHierarchyNode;
use crate::analysis::lines;
use crate::analysis::resolver::Resolver;
use crate::config::AnalyzerConfig;
use crate::fault::{self, Breadcrumbs, FaultLog};
use crate::report::ReportWriter;
use crate::syntax::csharp::{self, kind};
use crate::syntax::SourceUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Constructor,
    Method,
}

impl DeclarationKind {
    /// The report label, trailing separator included.
    pub fn label(&self) -> &'static str {
        match self {
            DeclarationKind::Constructor => "Constructor Declaration: ",
            DeclarationKind::Method => "Method Declaration: ",
        }
    }
}

/// One constructor or method, fully analyzed.
#[derive(Debug, Clone)]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,
    pub name: String,
    /// Constructors carry the comma-joined parameter type names; methods
    /// carry the raw parameter-list source text. Parentheses included.
    pub parameter_signature: String,
    pub modifiers: String,
    pub line_count: usize,
    pub containing_class: String,
    pub calls: Vec<CallSite>,
}

impl DeclarationRecord {
    /// A caller node for this declaration with its callees attached in
    /// discovery order.
    pub fn call_hierarchy(&self) -> CallHierarchyNode {
        let mut node = CallHierarchyNode::new(
            self.containing_class.clone(),
            self.name.clone(),
            self.line_count,
        );
        for site in &self.calls {
            node.attach(CallHierarchyNode::new(
                site.callee_class(),
                site.callee_method(),
                0,
            ));
        }
        node
    }
}

/// One class with its analyzed declarations.
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub qualified_name: String,
    pub simple_name: String,
    pub constructors: Vec<DeclarationRecord>,
    pub methods: Vec<DeclarationRecord>,
}

/// Fully qualified name of a type declaration: the enclosing namespace
/// (or the no-namespace sentinel) followed by the nested type chain,
/// outer to inner, ending with the type's own simple name.
pub fn qualified_type_name(unit: &SourceUnit, type_node: Node) -> String {
    let mut chain = vec![csharp::name_text(unit, type_node).to_string()];
    let mut namespace = None;

    let mut ancestor = type_node.parent();
    while let Some(node) = ancestor {
        match node.kind() {
            k if csharp::is_type_declaration(k) => {
                chain.insert(0, csharp::name_text(unit, node).to_string());
            }
            kind::NAMESPACE | kind::FILE_SCOPED_NAMESPACE => {
                namespace = Some(csharp::name_text(unit, node).to_string());
                break;
            }
            _ => {}
        }
        ancestor = node.parent();
    }

    // A file-scoped namespace may sit beside the declarations rather than
    // above them, depending on grammar version.
    if namespace.is_none() {
        namespace = file_scoped_namespace(unit);
    }

    format!(
        "{}.{}",
        namespace.unwrap_or_else(|| NO_NAMESPACE.to_string()),
        chain.join(".")
    )
}

fn file_scoped_namespace(unit: &SourceUnit) -> Option<String> {
    let root = unit.root();
    let mut cursor = root.walk();
    let ns = root
        .named_children(&mut cursor)
        .find(|child| child.kind() == kind::FILE_SCOPED_NAMESPACE)
        .map(|ns| csharp::name_text(unit, ns).to_string())
        .filter(|name| !name.is_empty());
    ns
}

/// Analyze one unit: walk its classes and stream the report.
///
/// The source header is written first; each class runs inside its own
/// fault boundary, each declaration inside a nested one. Returns the
/// per-file class records (they do not outlive the file's section).
pub fn analyze_unit<W: io::Write>(
    unit: &SourceUnit,
    resolver: &dyn Resolver,
    config: &AnalyzerConfig,
    writer: &mut ReportWriter<W>,
    faults: &FaultLog,
    crumbs: &Breadcrumbs,
) -> anyhow::Result<Vec<ClassRecord>> {
    writer.source_header(&unit.path)?;

    let mut records = Vec::new();
    for class_node in crate::syntax::descendants_of_kind(unit.root(), kind::CLASS) {
        let qualified = qualified_type_name(unit, class_node);
        let simple = csharp::name_text(unit, class_node).to_string();
        let namespace = containing_namespace(&qualified, &simple);

        let class_crumbs = crumbs
            .clone()
            .with_namespace(namespace.clone())
            .with_class(simple.clone());

        let record = fault::guard(faults, &class_crumbs, || {
            analyze_class(
                unit,
                class_node,
                &qualified,
                &simple,
                &namespace,
                resolver,
                config,
                writer,
                faults,
                &class_crumbs,
            )
        });
        if let Some(record) = record {
            records.push(record);
        }
    }
    Ok(records)
}

/// The namespace chain of a declaration inside a class: its qualified
/// name minus the class's own simple name.
fn containing_namespace(qualified: &str, simple: &str) -> String {
    qualified
        .strip_suffix(simple)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .unwrap_or(qualified)
        .to_string()
}

#[allow(clippy::too_many_arguments)]
fn analyze_class<W: io::Write>(
    unit: &SourceUnit,
    class_node: Node,
    qualified: &str,
    simple: &str,
    namespace: &str,
    resolver: &dyn Resolver,
    config: &AnalyzerConfig,
    writer: &mut ReportWriter<W>,
    faults: &FaultLog,
    crumbs: &Breadcrumbs,
) -> anyhow::Result<ClassRecord> {
    writer.class_line(qualified)?;

    let mut record = ClassRecord {
        qualified_name: qualified.to_string(),
        simple_name: simple.to_string(),
        constructors: Vec::new(),
        methods: Vec::new(),
    };

    // Descendant rather than direct-child relation, so members of nested
    // classes also appear under their enclosing classes.
    for ctor in crate::syntax::descendants_of_kind(class_node, kind::CONSTRUCTOR) {
        let name = csharp::name_text(unit, ctor).to_string();
        let decl_crumbs = crumbs.clone().with_method(name.clone());
        let declaration = fault::guard(faults, &decl_crumbs, || {
            analyze_declaration(
                unit,
                ctor,
                DeclarationKind::Constructor,
                qualified,
                simple,
                namespace,
                resolver,
                config,
                writer,
            )
        });
        if let Some(declaration) = declaration {
            record.constructors.push(declaration);
        }
    }

    for method in crate::syntax::descendants_of_kind(class_node, kind::METHOD) {
        let name = csharp::name_text(unit, method).to_string();
        let decl_crumbs = crumbs.clone().with_method(name.clone());
        let declaration = fault::guard(faults, &decl_crumbs, || {
            analyze_declaration(
                unit,
                method,
                DeclarationKind::Method,
                qualified,
                simple,
                namespace,
                resolver,
                config,
                writer,
            )
        });
        if let Some(declaration) = declaration {
            record.methods.push(declaration);
        }
    }

    Ok(record)
}

#[allow(clippy::too_many_arguments)]
fn analyze_declaration<W: io::Write>(
    unit: &SourceUnit,
    decl: Node,
    decl_kind: DeclarationKind,
    qualified: &str,
    simple: &str,
    namespace: &str,
    resolver: &dyn Resolver,
    config: &AnalyzerConfig,
    writer: &mut ReportWriter<W>,
) -> anyhow::Result<DeclarationRecord> {
    let parameter_signature = match decl_kind {
        DeclarationKind::Constructor => {
            format!("({})", csharp::parameter_types(unit, decl).join(","))
        }
        DeclarationKind::Method => csharp::parameter_list_text(unit, decl).to_string(),
    };

    let mut record = DeclarationRecord {
        kind: decl_kind,
        name: csharp::name_text(unit, decl).to_string(),
        parameter_signature,
        modifiers: csharp::modifiers_text(unit, decl),
        line_count: lines::logical_line_count(unit, decl),
        containing_class: qualified.to_string(),
        calls: Vec::new(),
    };

    writer.declaration_line(&record)?;

    record.calls = calls::classify_calls(unit, decl, resolver, config, namespace, simple)?;
    for site in &record.calls {
        writer.call_line(site)?;
    }

    Ok(record)
}
