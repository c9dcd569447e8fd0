//! Front end of the Reef compiler.
//!
//! This crate owns everything between "parsed tree" and "ready to lower":
//! the AST data model with constant-folding constructors, cross-module
//! import inlining, scope-aware semantic analysis, and flow-insensitive
//! type inference. Lexing and parsing live outside; the front end consumes
//! a finished [`ast::Program`] and hands backends three artifacts — the
//! validated tree, the [`types::TypeContext`], and (via `reef_codegen`) the
//! instruction stream.
//!
//! All per-compilation state lives in a [`session::CompilationSession`];
//! compiling several units in one process never shares state.

pub mod ast;
pub mod error;
pub mod imports;
pub mod parse;
pub mod semantic;
pub mod session;
pub mod span;
pub mod types;

pub use error::{Diagnostic, DiagnosticCollector, FrontError, FrontResult};
pub use session::CompilationSession;
pub use span::Span;
pub use types::{InferredType, TypeContext};
