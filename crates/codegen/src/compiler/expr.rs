//! Expression lowering to bytecode.

use crate::bytecode::{Constant, Instruction};
use crate::compiler::context::{LoweringContext, MAX_DEPTH};
use crate::error::{CodegenError, CodegenResult};
use reef_front::ast::{BinOp, CallExpr, Expr, StructLitExpr, UnaryOp};
use reef_front::InferredType;

pub struct ExprCompiler;

impl ExprCompiler {
    /// Lower one expression, returning the register or slot holding its
    /// value.
    pub fn compile(ctx: &mut LoweringContext, expr: &Expr) -> CodegenResult<u32> {
        if ctx.depth >= MAX_DEPTH {
            return Err(CodegenError::CompilationError(
                "expression nesting exceeds maximum depth".to_string(),
            ));
        }
        ctx.depth += 1;
        let result = Self::compile_inner(ctx, expr);
        ctx.depth -= 1;
        result
    }

    fn compile_inner(ctx: &mut LoweringContext, expr: &Expr) -> CodegenResult<u32> {
        match expr {
            Expr::Int(e) => Self::load_const(ctx, Constant::Int(e.value)),
            // Characters are ints carrying their code point.
            Expr::Char(e) => Self::load_const(ctx, Constant::Int(e.value as i64)),
            Expr::Float(e) => Self::load_const(ctx, Constant::Float(e.value)),
            Expr::Str(e) => Self::load_const(ctx, Constant::Str(e.value.clone())),
            Expr::Nil(_) => Self::load_const(ctx, Constant::Nil),
            Expr::Name(e) => {
                let dst = ctx.slot_of(&e.id);
                ctx.emit(Instruction::LoadName {
                    dst,
                    name: e.id.clone(),
                });
                ctx.result_of_last()
            }
            Expr::Binary(e) => Self::compile_binary(ctx, e),
            Expr::Unary(e) => Self::compile_unary(ctx, e),
            Expr::Index(e) => {
                let object = Self::compile(ctx, &e.object)?;
                let index = Self::compile(ctx, &e.index)?;
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::Index { dst, object, index });
                ctx.result_of_last()
            }
            Expr::Member(e) => {
                let object = Self::compile(ctx, &e.object)?;
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::GetField {
                    dst,
                    object,
                    field: e.field.clone(),
                });
                ctx.result_of_last()
            }
            Expr::Call(e) => Self::compile_call(ctx, e),
            Expr::StructLit(e) => Self::compile_struct_lit(ctx, e),
            Expr::List(e) => {
                let mut elems = Vec::with_capacity(e.elts.len());
                for elt in &e.elts {
                    elems.push(Self::compile(ctx, elt)?);
                }
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::MakeList { dst, elems });
                ctx.result_of_last()
            }
        }
    }

    fn load_const(ctx: &mut LoweringContext, value: Constant) -> CodegenResult<u32> {
        let dst = ctx.alloc_register();
        ctx.emit(Instruction::LoadConst { dst, value });
        ctx.result_of_last()
    }

    fn compile_binary(
        ctx: &mut LoweringContext,
        e: &reef_front::ast::BinaryExpr,
    ) -> CodegenResult<u32> {
        let lhs = Self::compile(ctx, &e.left)?;
        let rhs = Self::compile(ctx, &e.right)?;
        let dst = ctx.alloc_register();

        // `+` and `*` change meaning on strings; the type table decides.
        let stringy = Self::static_type(ctx, &e.left) == InferredType::Str
            || Self::static_type(ctx, &e.right) == InferredType::Str;

        let instr = match e.op {
            BinOp::Add if stringy => Instruction::Concat { dst, lhs, rhs },
            BinOp::Mul if Self::static_type(ctx, &e.left) == InferredType::Str => {
                Instruction::Repeat { dst, lhs, rhs }
            }
            BinOp::Add => Instruction::Add { dst, lhs, rhs },
            BinOp::Sub => Instruction::Sub { dst, lhs, rhs },
            BinOp::Mul => Instruction::Mul { dst, lhs, rhs },
            BinOp::Div => Instruction::Div { dst, lhs, rhs },
            BinOp::Mod => Instruction::Mod { dst, lhs, rhs },
            BinOp::Concat => Instruction::Concat { dst, lhs, rhs },
            BinOp::Repeat => Instruction::Repeat { dst, lhs, rhs },
            BinOp::Eq => Instruction::Eq { dst, lhs, rhs },
            BinOp::NotEq => Instruction::NotEq { dst, lhs, rhs },
            BinOp::Lt => Instruction::Lt { dst, lhs, rhs },
            BinOp::LtEq => Instruction::LtEq { dst, lhs, rhs },
            BinOp::Gt => Instruction::Gt { dst, lhs, rhs },
            BinOp::GtEq => Instruction::GtEq { dst, lhs, rhs },
            BinOp::And => Instruction::And { dst, lhs, rhs },
            BinOp::Or => Instruction::Or { dst, lhs, rhs },
        };
        ctx.emit(instr);
        ctx.result_of_last()
    }

    fn compile_unary(
        ctx: &mut LoweringContext,
        e: &reef_front::ast::UnaryExpr,
    ) -> CodegenResult<u32> {
        match e.op {
            UnaryOp::Neg => {
                let operand = Self::compile(ctx, &e.operand)?;
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::Neg { dst, operand });
            }
            UnaryOp::Not => {
                let operand = Self::compile(ctx, &e.operand)?;
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::Not { dst, operand });
            }
            UnaryOp::AddrOf => {
                let Expr::Name(name) = e.operand.as_ref() else {
                    return Err(CodegenError::CompilationError(
                        "can only take the address of a variable".to_string(),
                    ));
                };
                let slot = ctx.slot_of(&name.id);
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::AddrOf {
                    dst,
                    slot,
                    name: name.id.clone(),
                });
            }
            UnaryOp::Deref => {
                let src = Self::compile(ctx, &e.operand)?;
                let dst = ctx.alloc_register();
                ctx.emit(Instruction::Deref { dst, src });
            }
        }
        ctx.result_of_last()
    }

    /// Calls lower their arguments left to right and record the slots the
    /// arguments landed in. Method calls pass the receiver as the first
    /// argument.
    fn compile_call(ctx: &mut LoweringContext, e: &CallExpr) -> CodegenResult<u32> {
        let (name, mut args) = match e.func.as_ref() {
            Expr::Name(name) => (name.id.clone(), Vec::new()),
            Expr::Member(member) => {
                let receiver = Self::compile(ctx, &member.object)?;
                (member.field.clone(), vec![receiver])
            }
            _ => {
                return Err(CodegenError::CompilationError(
                    "call target must be a function name".to_string(),
                ))
            }
        };
        for arg in &e.args {
            args.push(Self::compile(ctx, arg)?);
        }
        let dst = ctx.alloc_register();
        ctx.emit(Instruction::Call { name, dst, args });
        ctx.result_of_last()
    }

    fn compile_struct_lit(ctx: &mut LoweringContext, e: &StructLitExpr) -> CodegenResult<u32> {
        let dst = ctx.alloc_register();
        ctx.emit(Instruction::NewStruct {
            dst,
            name: e.name.clone(),
        });
        for (field, value) in &e.fields {
            let src = Self::compile(ctx, value)?;
            ctx.emit(Instruction::SetField {
                object: dst,
                field: field.clone(),
                src,
            });
        }
        Ok(dst)
    }

    /// The static type of an expression as lowering sees it, combining
    /// literal shapes with the inference table. Mirrors the promotion rules
    /// of the front end so the two stages agree.
    pub fn static_type(ctx: &LoweringContext, expr: &Expr) -> InferredType {
        match expr {
            Expr::Int(_) | Expr::Char(_) => InferredType::Int,
            Expr::Float(_) => InferredType::Float,
            Expr::Str(_) => InferredType::Str,
            Expr::List(_) => InferredType::List,
            Expr::Nil(_) => InferredType::Unknown,
            Expr::Name(name) => ctx.types.type_of(&name.id),
            Expr::Binary(binary) => {
                if binary.op.is_comparison() || matches!(binary.op, BinOp::And | BinOp::Or) {
                    return InferredType::Int;
                }
                if matches!(binary.op, BinOp::Concat | BinOp::Repeat) {
                    return InferredType::Str;
                }
                let left = Self::static_type(ctx, &binary.left);
                let right = Self::static_type(ctx, &binary.right);
                if left == InferredType::Str || right == InferredType::Str {
                    InferredType::Str
                } else if binary.op == BinOp::Div
                    && left == InferredType::Int
                    && right == InferredType::Int
                {
                    InferredType::Float
                } else if left == InferredType::Float || right == InferredType::Float {
                    InferredType::Float
                } else if left == InferredType::Int || right == InferredType::Int {
                    InferredType::Int
                } else {
                    InferredType::Unknown
                }
            }
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Neg => Self::static_type(ctx, &unary.operand),
                UnaryOp::Not => InferredType::Int,
                UnaryOp::AddrOf => InferredType::Pointer,
                UnaryOp::Deref => match unary.operand.as_ref() {
                    Expr::Name(name) => ctx
                        .types
                        .get(&name.id)
                        .map(|info| info.pointee)
                        .unwrap_or_default(),
                    _ => InferredType::Unknown,
                },
            },
            Expr::Index(index) => match index.object.as_ref() {
                Expr::Name(name) => match ctx.types.get(&name.id) {
                    Some(info) if info.ty == InferredType::Str => InferredType::Int,
                    Some(info) if info.ty == InferredType::List => info.elem,
                    _ => InferredType::Unknown,
                },
                Expr::Str(_) => InferredType::Int,
                _ => InferredType::Unknown,
            },
            Expr::Member(_) | Expr::Call(_) => InferredType::Unknown,
            Expr::StructLit(_) => InferredType::Struct,
        }
    }
}
