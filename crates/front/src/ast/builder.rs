//! Node construction with constant folding.
//!
//! Binary nodes are folded at construction time when both operands are
//! literals of a foldable shape; the folded literal replaces the operands,
//! which are consumed by value. Division by a literal zero is the one
//! arithmetic case that is deliberately left unfolded and falls through to a
//! runtime binop node.

use super::nodes::*;
use super::ops::{BinOp, UnaryOp};
use crate::span::Span;

/// Build a binary node, folding literal operands where possible.
pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().merge(right.span());

    match (op, left, right) {
        // String concatenation.
        (BinOp::Add | BinOp::Concat, Expr::Str(a), Expr::Str(b)) => Expr::Str(StrLit {
            value: a.value + &b.value,
            span,
        }),
        // String repetition; a negative count clamps to zero.
        (BinOp::Mul | BinOp::Repeat, Expr::Str(s), Expr::Int(n)) => {
            Expr::Str(fold_repeat(s.value, n.value, span))
        }
        (BinOp::Mul | BinOp::Repeat, Expr::Str(s), Expr::Float(n)) => {
            Expr::Str(fold_repeat(s.value, n.value as i64, span))
        }
        // Integer arithmetic. Integer division promotes to float, matching
        // the inference rule, so the fold and the runtime result agree.
        (BinOp::Add, Expr::Int(a), Expr::Int(b)) => int(a.value.wrapping_add(b.value), span),
        (BinOp::Sub, Expr::Int(a), Expr::Int(b)) => int(a.value.wrapping_sub(b.value), span),
        (BinOp::Mul, Expr::Int(a), Expr::Int(b)) => int(a.value.wrapping_mul(b.value), span),
        (BinOp::Mod, Expr::Int(a), Expr::Int(b)) if b.value != 0 => {
            int(a.value.wrapping_rem(b.value), span)
        }
        (BinOp::Div, Expr::Int(a), Expr::Int(b)) if b.value != 0 => {
            float(a.value as f64 / b.value as f64, span)
        }
        // Mixed and float arithmetic folds to a float literal.
        (BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div, l, r)
            if numeric_pair(&l, &r) && !divides_by_literal_zero(op, &r) =>
        {
            let a = as_f64(&l);
            let b = as_f64(&r);
            let value = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                _ => unreachable!(),
            };
            float(value, span)
        }
        // Anything else stays a runtime binop holding the original children.
        (op, left, right) => Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }),
    }
}

/// Build a unary node. Negation of a numeric literal folds.
pub fn unary(op: UnaryOp, operand: Expr, mutability: Mutability, span: Span) -> Expr {
    let span = span.merge(operand.span());
    match (op, operand) {
        (UnaryOp::Neg, Expr::Int(a)) => int(a.value.wrapping_neg(), span),
        (UnaryOp::Neg, Expr::Float(a)) => float(-a.value, span),
        (op, operand) => Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            mutability,
            span,
        }),
    }
}

fn fold_repeat(value: String, count: i64, span: Span) -> StrLit {
    let count = count.max(0) as usize;
    StrLit {
        value: value.repeat(count),
        span,
    }
}

fn numeric_pair(l: &Expr, r: &Expr) -> bool {
    let is_num = |e: &Expr| matches!(e, Expr::Int(_) | Expr::Float(_));
    // (int,int) is handled by the integer arms above; here at least one side
    // must be a float.
    is_num(l) && is_num(r) && (matches!(l, Expr::Float(_)) || matches!(r, Expr::Float(_)))
}

fn divides_by_literal_zero(op: BinOp, rhs: &Expr) -> bool {
    op == BinOp::Div
        && match rhs {
            Expr::Int(n) => n.value == 0,
            Expr::Float(n) => n.value == 0.0,
            _ => false,
        }
}

fn as_f64(e: &Expr) -> f64 {
    match e {
        Expr::Int(n) => n.value as f64,
        Expr::Float(n) => n.value,
        _ => 0.0,
    }
}

pub fn int(value: i64, span: Span) -> Expr {
    Expr::Int(IntLit {
        value,
        width: IntWidth::default(),
        span,
    })
}

pub fn float(value: f64, span: Span) -> Expr {
    Expr::Float(FloatLit {
        value,
        width: FloatWidth::default(),
        span,
    })
}

pub fn string(value: impl Into<String>, span: Span) -> Expr {
    Expr::Str(StrLit {
        value: value.into(),
        span,
    })
}

pub fn name(id: impl Into<String>, span: Span) -> Expr {
    Expr::Name(NameExpr {
        id: id.into(),
        span,
    })
}
