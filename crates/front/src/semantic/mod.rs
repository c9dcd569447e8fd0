//! Semantic analysis: scope-aware validation and usage warnings.

pub mod analyzer;
pub mod scope;
pub mod structs;
pub mod usage;

pub use analyzer::{ErrorPass, MAX_DEPTH};
pub use scope::{Scope, ScopeChain, Symbol, SymbolKind};
pub use structs::{StructDef, StructField, StructRegistry};
pub use usage::UsagePass;

use crate::ast::Program;
use crate::session::CompilationSession;

/// Analyze `program` against `session`, returning `(errors, warnings)`.
///
/// Two independent full-tree traversals: the first surfaces every
/// correctness error in one pass, the second collects unused-variable
/// warnings after the whole tree has been walked. Any error count above
/// zero is fatal to the pipeline; warnings never are.
pub fn analyze(session: &mut CompilationSession, program: &Program) -> (usize, usize) {
    ErrorPass::new(session).run(program);
    UsagePass::new(session).run(program);
    (
        session.diagnostics.error_count(),
        session.diagnostics.warning_count(),
    )
}
