//! # Reef Code Generation
//!
//! Lowers the validated, type-annotated AST from `reef_front` into a
//! linear, register-addressed bytecode stream that the backends consume
//! unchanged.
//!
//! ## Architecture
//!
//! 1. **Input**: AST plus the `TypeContext` produced by inference
//! 2. **Lowering**: one forward pass, one emission path per node kind
//! 3. **Backpatching**: jump targets are resolved after the jumped-over
//!    region has been emitted
//! 4. **Output**: `Vec<Instruction>`, optionally rendered as text via
//!    [`bytecode::disassemble`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reef_codegen::lower;
//!
//! let instructions = lower(&program, &session.types)?;
//! println!("{}", reef_codegen::bytecode::disassemble(&instructions));
//! ```

pub mod bytecode;
pub mod compiler;
pub mod error;

pub use bytecode::{disassemble, Constant, Instruction};
pub use compiler::{ExprCompiler, LoweringContext, ProgramCompiler, StmtCompiler};
pub use error::{CodegenError, CodegenResult};

use reef_front::ast::Program;
use reef_front::TypeContext;

/// Lower a program to bytecode.
pub fn lower(program: &Program, types: &TypeContext) -> CodegenResult<Vec<Instruction>> {
    ProgramCompiler::compile(program, types)
}
