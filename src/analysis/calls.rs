//! Call-site classification.
//!
//! Every invocation expression inside a declaration body is either
//! resolved through the semantic capability ("Specified"), reconstructed
//! from its syntactic shape ("Non-specified"), filtered out as
//! framework noise, or silently skipped when the target shape supports no
//! decomposition. Calls are emitted in document order; nothing is sorted
//! or deduplicated here.

use anyhow::Context;
use tree_sitter::Node;

use crate::analysis::resolver::{ResolvedCallee, Resolver};
use crate::config::AnalyzerConfig;
use crate::syntax::csharp::{self, kind};
use crate::syntax::SourceUnit;

/// Namespace marker for member-access calls whose receiver type could not
/// be determined. Best-effort reporting: such calls are still emitted.
pub const UNRESOLVED: &str = "(unresolved)";

/// Argument placeholder for a literal `null`.
pub const ARG_WILDCARD: &str = "*";
/// Argument placeholder for a type the resolver could not determine.
pub const ARG_UNKNOWN: &str = "?";

/// One classified outward call.
#[derive(Debug, Clone)]
pub enum CallSite {
    /// The resolver identified the callee.
    Specified { callee: ResolvedCallee },
    /// Reconstructed from the syntactic shape of the invocation target.
    NonSpecified {
        namespace: String,
        type_name: String,
        method_name: String,
        argument_types: Vec<String>,
    },
}

impl CallSite {
    /// The report label for this classification.
    pub fn label(&self) -> &'static str {
        match self {
            CallSite::Specified { .. } => "Specified Syntax MethodCall: ",
            CallSite::NonSpecified { .. } => "Non-specified Syntax MethodCall: ",
        }
    }

    /// The identity text following the label.
    pub fn identity(&self) -> String {
        match self {
            CallSite::Specified { callee } => callee.display.clone(),
            CallSite::NonSpecified {
                namespace,
                type_name,
                method_name,
                argument_types,
            } => format!(
                "{}.{}.{}({})",
                namespace,
                type_name,
                method_name,
                argument_types.join(", ")
            ),
        }
    }

    /// The callee's class identity (namespace-qualified), for hierarchy nodes.
    pub fn callee_class(&self) -> String {
        match self {
            CallSite::Specified { callee } => format!("{}.{}", callee.namespace, callee.type_name),
            CallSite::NonSpecified {
                namespace,
                type_name,
                ..
            } => format!("{}.{}", namespace, type_name),
        }
    }

    /// The callee's method name, for hierarchy nodes.
    pub fn callee_method(&self) -> &str {
        match self {
            CallSite::Specified { callee } => &callee.method_name,
            CallSite::NonSpecified { method_name, .. } => method_name,
        }
    }
}

/// Classify every invocation inside `decl`, in document order.
///
/// `caller_namespace` and `caller_class` name the containing declaration
/// (namespace chain including enclosing classes, and the class simple
/// name); bare-identifier calls are attributed to them. A failure while
/// classifying one invocation aborts the remaining calls of this
/// declaration and carries the call breadcrumb outward.
pub fn classify_calls(
    unit: &SourceUnit,
    decl: Node,
    resolver: &dyn Resolver,
    config: &AnalyzerConfig,
    caller_namespace: &str,
    caller_class: &str,
) -> anyhow::Result<Vec<CallSite>> {
    let mut sites = Vec::new();
    for invocation in crate::syntax::descendants_of_kind(decl, kind::INVOCATION) {
        let target = invocation
            .child_by_field_name("function")
            .map(|f| unit.node_text(f).to_string())
            .unwrap_or_default();
        let site = classify_one(unit, invocation, resolver, config, caller_namespace, caller_class)
            .with_context(|| {
                format!(
                    "[AnalyzingNamespace: {},AnalyzingClass: {},AnalyzingMethod: {}]",
                    caller_namespace, caller_class, target
                )
            })?;
        if let Some(site) = site {
            sites.push(site);
        }
    }
    Ok(sites)
}

/// Classify a single invocation. `Ok(None)` means the call was filtered or
/// its target shape supports no decomposition; both are non-events.
fn classify_one(
    unit: &SourceUnit,
    invocation: Node,
    resolver: &dyn Resolver,
    config: &AnalyzerConfig,
    caller_namespace: &str,
    caller_class: &str,
) -> anyhow::Result<Option<CallSite>> {
    if let Some(callee) = resolver.resolve_invocation(unit, invocation) {
        if config.is_namespace_excluded(&callee.namespace) {
            return Ok(None);
        }
        return Ok(Some(CallSite::Specified { callee }));
    }

    let Some(function) = invocation.child_by_field_name("function") else {
        return Ok(None);
    };

    let decomposed = match function.kind() {
        kind::IDENTIFIER => Some((
            caller_namespace.to_string(),
            caller_class.to_string(),
            unit.node_text(function).to_string(),
        )),
        kind::MEMBER_ACCESS => {
            let receiver = function.child_by_field_name("expression");
            let name = function
                .child_by_field_name("name")
                .map(|n| unit.node_text(n).to_string())
                .unwrap_or_default();
            let (namespace, type_name) = match receiver
                .and_then(|r| resolver.static_type_of(unit, r))
            {
                Some(ty) => (ty.namespace, ty.simple_name),
                None => (
                    UNRESOLVED.to_string(),
                    receiver
                        .map(|r| unit.node_text(r).to_string())
                        .unwrap_or_default(),
                ),
            };
            Some((namespace, type_name, name))
        }
        // No decomposition for other target shapes; not an error.
        _ => None,
    };

    let Some((namespace, type_name, method_name)) = decomposed else {
        return Ok(None);
    };

    if config.is_namespace_excluded(&namespace) {
        return Ok(None);
    }

    let argument_types = csharp::argument_expressions(invocation)
        .into_iter()
        .map(|arg| {
            if arg.kind() == kind::NULL_LITERAL {
                ARG_WILDCARD.to_string()
            } else {
                resolver
                    .converted_type_of(unit, arg)
                    .unwrap_or_else(|| ARG_UNKNOWN.to_string())
            }
        })
        .collect();

    Ok(Some(CallSite::NonSpecified {
        namespace,
        type_name,
        method_name,
        argument_types,
    }))
}
