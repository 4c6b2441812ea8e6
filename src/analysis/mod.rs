//! The call-site classification and declaration-walking engine.
//!
//! One shared `CompilationContext` binds every parsed unit of the batch to
//! the reference metadata; the walker then processes units one at a time:
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌───────────────┐
//! │ SourceUnits  │────▶│ CompilationContext │────▶│ IndexResolver │
//! └──────────────┘     │ (all trees + refs) │     └───────┬───────┘
//!                      └────────────────────┘             │
//!                      ┌────────────────────┐     ┌───────▼───────┐
//!                      │ ReportWriter       │◀────│ Walker +      │
//!                      │ (flat indented     │     │ Call          │
//!                      │  text stream)      │     │ Classifier    │
//!                      └────────────────────┘     └───────────────┘
//! ```
//!
//! The semantic side is reached only through the `Resolver` trait, so the
//! engine runs against scripted resolvers in tests.

pub mod calls;
pub mod context;
pub mod hierarchy;
pub mod lines;
pub mod resolver;
pub mod walker;

pub use calls::{classify_calls, CallSite};
pub use context::{CompilationContext, MethodEntry, TypeEntry, NO_NAMESPACE};
pub use hierarchy::CallHierarchyNode;
pub use lines::logical_line_count;
pub use resolver::{IndexResolver, ResolvedCallee, Resolver, TypeRef};
pub use walker::{
    analyze_unit, qualified_type_name, ClassRecord, DeclarationKind, DeclarationRecord,
};
