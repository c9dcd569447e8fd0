//! AST-to-bytecode lowering.
//!
//! One forward pass over the program, one emission path per node kind.
//! Jump targets are backpatched once the jumped-over region exists.

pub mod context;
pub mod expr;
pub mod stmt;

pub use context::LoweringContext;
pub use expr::ExprCompiler;
pub use stmt::StmtCompiler;

use crate::bytecode::Instruction;
use crate::error::CodegenResult;
use reef_front::ast::Program;
use reef_front::TypeContext;

pub struct ProgramCompiler;

impl ProgramCompiler {
    /// Lower a whole program into a linear instruction stream.
    ///
    /// A trailing bare `RETURN` terminates the stream so every patched
    /// jump target, including "after the last loop", lands on a real
    /// instruction.
    pub fn compile(program: &Program, types: &TypeContext) -> CodegenResult<Vec<Instruction>> {
        let mut ctx = LoweringContext::new(types);
        for stmt in &program.body {
            StmtCompiler::compile(&mut ctx, stmt)?;
        }
        ctx.emit(Instruction::Return { src: None });
        ctx.check_jumps()?;
        Ok(ctx.instructions)
    }
}
