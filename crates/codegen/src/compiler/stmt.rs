//! Statement lowering to bytecode.

use crate::bytecode::{Constant, Instruction};
use crate::compiler::context::{LoweringContext, MAX_DEPTH};
use crate::compiler::expr::ExprCompiler;
use crate::error::{CodegenError, CodegenResult};
use reef_front::ast::{
    AssignStmt, Expr, ForKind, ForStmt, FuncDefStmt, IfStmt, Stmt, UnaryOp, WhileStmt,
};

pub struct StmtCompiler;

impl StmtCompiler {
    pub fn compile(ctx: &mut LoweringContext, stmt: &Stmt) -> CodegenResult<()> {
        if ctx.depth >= MAX_DEPTH {
            return Err(CodegenError::CompilationError(
                "statement nesting exceeds maximum depth".to_string(),
            ));
        }
        ctx.depth += 1;
        let result = Self::compile_inner(ctx, stmt);
        ctx.depth -= 1;
        result
    }

    fn compile_inner(ctx: &mut LoweringContext, stmt: &Stmt) -> CodegenResult<()> {
        match stmt {
            Stmt::Print(s) => {
                let src = ExprCompiler::compile(ctx, &s.value)?;
                ctx.emit(Instruction::Print { src });
                Ok(())
            }
            Stmt::Assign(s) => Self::compile_assign(ctx, s),
            Stmt::Const(s) => Self::store_name(ctx, &s.name, &s.value),
            Stmt::Global(s) => Self::store_name(ctx, &s.name, &s.value),
            Stmt::If(s) => Self::compile_if(ctx, s),
            Stmt::While(s) => Self::compile_while(ctx, s),
            Stmt::For(s) => Self::compile_for(ctx, s),
            Stmt::Break(_) => {
                let idx = ctx.emit_jump_placeholder();
                ctx.add_break(idx)
            }
            Stmt::Continue(_) => {
                let idx = ctx.emit_jump_placeholder();
                ctx.add_continue(idx)
            }
            Stmt::Return(s) => {
                let src = match &s.value {
                    Some(value) => Some(ExprCompiler::compile(ctx, value)?),
                    None => None,
                };
                ctx.emit(Instruction::Return { src });
                Ok(())
            }
            Stmt::FuncDef(s) => Self::compile_funcdef(ctx, s),
            // Structs exist only in the registry; imports were inlined away.
            Stmt::StructDef(_) | Stmt::Import(_) => Ok(()),
            Stmt::Expr(s) => {
                ExprCompiler::compile(ctx, &s.value)?;
                Ok(())
            }
        }
    }

    fn store_name(ctx: &mut LoweringContext, name: &str, value: &Expr) -> CodegenResult<()> {
        let src = ExprCompiler::compile(ctx, value)?;
        let slot = ctx.slot_of(name);
        ctx.emit(Instruction::StoreName {
            slot,
            name: name.to_string(),
            src,
        });
        Ok(())
    }

    fn compile_assign(ctx: &mut LoweringContext, stmt: &AssignStmt) -> CodegenResult<()> {
        match &stmt.target {
            Expr::Name(name) => Self::store_name(ctx, &name.id, &stmt.value),
            Expr::Index(index) => {
                let src = ExprCompiler::compile(ctx, &stmt.value)?;
                let object = ExprCompiler::compile(ctx, &index.object)?;
                let idx = ExprCompiler::compile(ctx, &index.index)?;
                ctx.emit(Instruction::SetIndex {
                    object,
                    index: idx,
                    src,
                });
                Ok(())
            }
            Expr::Member(member) => {
                let src = ExprCompiler::compile(ctx, &stmt.value)?;
                let object = ExprCompiler::compile(ctx, &member.object)?;
                ctx.emit(Instruction::SetField {
                    object,
                    field: member.field.clone(),
                    src,
                });
                Ok(())
            }
            Expr::Unary(unary) if unary.op == UnaryOp::Deref => {
                let src = ExprCompiler::compile(ctx, &stmt.value)?;
                let ptr = ExprCompiler::compile(ctx, &unary.operand)?;
                ctx.emit(Instruction::SetDeref { ptr, src });
                Ok(())
            }
            _ => Err(CodegenError::CompilationError(
                "Invalid assignment target".to_string(),
            )),
        }
    }

    /// `if`: condition, conditional jump over the then-branch, optional
    /// unconditional jump over the else-branch. Both targets are patched to
    /// the first instruction after the construct.
    fn compile_if(ctx: &mut LoweringContext, stmt: &IfStmt) -> CodegenResult<()> {
        let cond = ExprCompiler::compile(ctx, &stmt.test)?;
        let jif = ctx.emit_jump_if_false_placeholder(cond);

        for stmt in &stmt.body {
            Self::compile(ctx, stmt)?;
        }

        if stmt.orelse.is_empty() {
            let after = ctx.here();
            ctx.patch_jump(jif, after)?;
        } else {
            let skip_else = ctx.emit_jump_placeholder();
            let else_start = ctx.here();
            ctx.patch_jump(jif, else_start)?;
            for stmt in &stmt.orelse {
                Self::compile(ctx, stmt)?;
            }
            let after = ctx.here();
            ctx.patch_jump(skip_else, after)?;
        }
        Ok(())
    }

    fn compile_while(ctx: &mut LoweringContext, stmt: &WhileStmt) -> CodegenResult<()> {
        let loop_start = ctx.here();
        let cond = ExprCompiler::compile(ctx, &stmt.test)?;
        let jif = ctx.emit_jump_if_false_placeholder(cond);

        ctx.enter_loop();
        for stmt in &stmt.body {
            Self::compile(ctx, stmt)?;
        }
        ctx.emit(Instruction::Jump { target: loop_start });

        let after = ctx.here();
        ctx.patch_jump(jif, after)?;
        ctx.exit_loop(loop_start, after)
    }

    fn compile_for(ctx: &mut LoweringContext, stmt: &ForStmt) -> CodegenResult<()> {
        match &stmt.kind {
            ForKind::Range { start, end } => Self::compile_for_range(ctx, stmt, start, end),
            ForKind::Chars { string } => Self::compile_for_chars(ctx, stmt, string),
        }
    }

    /// `for i = start to end`: store start, compare `i <= end` before each
    /// iteration, auto-increment after the body. The bound is re-evaluated
    /// every iteration.
    fn compile_for_range(
        ctx: &mut LoweringContext,
        stmt: &ForStmt,
        start: &Expr,
        end: &Expr,
    ) -> CodegenResult<()> {
        Self::store_name(ctx, &stmt.var, start)?;
        let var_slot = ctx.slot_of(&stmt.var);

        let loop_start = ctx.here();
        ctx.emit(Instruction::LoadName {
            dst: var_slot,
            name: stmt.var.clone(),
        });
        let bound = ExprCompiler::compile(ctx, end)?;
        let cmp = ctx.alloc_register();
        ctx.emit(Instruction::LtEq {
            dst: cmp,
            lhs: var_slot,
            rhs: bound,
        });
        let jif = ctx.emit_jump_if_false_placeholder(cmp);

        ctx.enter_loop();
        for stmt in &stmt.body {
            Self::compile(ctx, stmt)?;
        }

        let increment = ctx.here();
        Self::emit_increment(ctx, var_slot, &stmt.var);
        ctx.emit(Instruction::Jump { target: loop_start });

        let after = ctx.here();
        ctx.patch_jump(jif, after)?;
        ctx.exit_loop(increment, after)
    }

    /// `for c = char, s`: iterate a string's characters by index. The
    /// string and the cursor live in synthetic slots derived from the loop
    /// variable's name.
    fn compile_for_chars(
        ctx: &mut LoweringContext,
        stmt: &ForStmt,
        string: &Expr,
    ) -> CodegenResult<()> {
        let str_name = format!("{}#str", stmt.var);
        let idx_name = format!("{}#idx", stmt.var);

        Self::store_name(ctx, &str_name, string)?;
        let str_slot = ctx.slot_of(&str_name);
        let idx_slot = ctx.slot_of(&idx_name);
        let zero = ctx.alloc_register();
        ctx.emit(Instruction::LoadConst {
            dst: zero,
            value: Constant::Int(0),
        });
        ctx.emit(Instruction::StoreName {
            slot: idx_slot,
            name: idx_name.clone(),
            src: zero,
        });

        let loop_start = ctx.here();
        let len = ctx.alloc_register();
        ctx.emit(Instruction::StrLen {
            dst: len,
            src: str_slot,
        });
        let cmp = ctx.alloc_register();
        ctx.emit(Instruction::Lt {
            dst: cmp,
            lhs: idx_slot,
            rhs: len,
        });
        let jif = ctx.emit_jump_if_false_placeholder(cmp);

        let var_slot = ctx.slot_of(&stmt.var);
        let ch = ctx.alloc_register();
        ctx.emit(Instruction::Index {
            dst: ch,
            object: str_slot,
            index: idx_slot,
        });
        ctx.emit(Instruction::StoreName {
            slot: var_slot,
            name: stmt.var.clone(),
            src: ch,
        });

        ctx.enter_loop();
        for stmt in &stmt.body {
            Self::compile(ctx, stmt)?;
        }

        let increment = ctx.here();
        Self::emit_increment(ctx, idx_slot, &idx_name);
        ctx.emit(Instruction::Jump { target: loop_start });

        let after = ctx.here();
        ctx.patch_jump(jif, after)?;
        ctx.exit_loop(increment, after)
    }

    fn emit_increment(ctx: &mut LoweringContext, slot: u32, name: &str) {
        let one = ctx.alloc_register();
        ctx.emit(Instruction::LoadConst {
            dst: one,
            value: Constant::Int(1),
        });
        let sum = ctx.alloc_register();
        ctx.emit(Instruction::Add {
            dst: sum,
            lhs: slot,
            rhs: one,
        });
        ctx.emit(Instruction::StoreName {
            slot,
            name: name.to_string(),
            src: sum,
        });
    }

    /// The definition instruction records the entry offset (the index right
    /// after itself) before the body is lowered. A bare return is appended
    /// so every body has a terminator.
    fn compile_funcdef(ctx: &mut LoweringContext, stmt: &FuncDefStmt) -> CodegenResult<()> {
        let entry = ctx.here() + 1;
        ctx.emit(Instruction::FuncDef {
            name: stmt.name.clone(),
            params: stmt.params.iter().map(|p| p.name.clone()).collect(),
            entry,
        });
        for param in &stmt.params {
            ctx.slot_of(&param.name);
        }
        for stmt in &stmt.body {
            Self::compile(ctx, stmt)?;
        }
        ctx.emit(Instruction::Return { src: None });
        Ok(())
    }
}
