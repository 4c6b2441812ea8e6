//! Callscan - batch call-site report generator for C# sources.
//!
//! Callscan walks every class declaration of a source batch, reports each
//! constructor and method with an approximate logical line count, and
//! lists every outward method call made from each declaration body,
//! classified by how confidently the callee could be identified:
//! "Specified" when the semantic resolver pins it down, "Non-specified"
//! when the call is reconstructed from its syntactic shape.
//!
//! # Architecture
//!
//! All files of a batch are parsed up front and bound into one shared
//! `CompilationContext`, so a call from one file into a declaration in a
//! sibling file resolves correctly:
//!
//! - `syntax`: tree-sitter parsing behind a provider trait
//! - `analysis`: the context, walker, resolver seam, and call classifier
//! - `references`: bin-directory libraries and the core-runtime table
//! - `report`: flat indented text output
//! - `fault`: nested file/class/declaration fault boundaries and the log
//! - `config`: YAML-configurable namespace and path filtering
//!
//! The semantic side is an injected `Resolver` capability, so the engine
//! is testable against scripted resolvers.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod fault;
pub mod references;
pub mod report;
pub mod syntax;

pub use analysis::{
    analyze_unit, classify_calls, qualified_type_name, CallHierarchyNode, CallSite, ClassRecord,
    CompilationContext, DeclarationKind, DeclarationRecord, IndexResolver, ResolvedCallee,
    Resolver, TypeRef, NO_NAMESPACE,
};
pub use config::AnalyzerConfig;
pub use fault::{guard, Breadcrumbs, FaultLog};
pub use references::ReferenceSet;
pub use report::ReportWriter;
pub use syntax::{for_extension, init as init_syntax, SourceUnit, SyntaxProvider};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    init_syntax();
}
