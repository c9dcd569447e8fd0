//! Core AST node definitions (program, statements, expressions).

use super::ops::{BinOp, UnaryOp};
use crate::span::Span;

/// A parsed translation unit (root AST node).
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Mutability tag carried by address-of nodes.
///
/// Everything is immutable unless explicitly marked; the analyzer rejects
/// assignment through a pointer that was not taken with `&mut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mutability {
    #[default]
    Immutable,
    Mutable,
}

/// Statement types.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Print(PrintStmt),
    Assign(AssignStmt),
    Const(ConstStmt),
    Global(GlobalStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Break(Span),
    Continue(Span),
    Return(ReturnStmt),
    FuncDef(FuncDefStmt),
    StructDef(StructDefStmt),
    Import(ImportStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Print(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Const(s) => s.span,
            Stmt::Global(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => *s,
            Stmt::Return(s) => s.span,
            Stmt::FuncDef(s) => s.span,
            Stmt::StructDef(s) => s.span,
            Stmt::Import(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub value: Expr,
    pub span: Span,
}

/// Assignment, which doubles as declaration on first sight of the target
/// name (declaration-on-assign).
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// `Name`, `Index`, `Member` or `Unary(Deref)` target.
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// The two surface forms of `for`.
#[derive(Debug, Clone, PartialEq)]
pub enum ForKind {
    /// `for i = start to end` — inclusive upper bound.
    Range { start: Expr, end: Expr },
    /// `for c = char, s` — iterate the characters of a string by index.
    Chars { string: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub var: String,
    pub kind: ForKind,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeMark>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDefStmt {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_pub: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Option<TypeMark>,
    /// Optional field initializer; its literal kind drives field type
    /// inference when no type mark is present.
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDefStmt {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    /// Module path as written, relative to the importing file's directory.
    pub module: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub value: Expr,
    pub span: Span,
}

/// Expression types.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(IntLit),
    Float(FloatLit),
    Str(StrLit),
    Char(CharLit),
    Nil(Span),
    Name(NameExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Index(IndexExpr),
    Member(MemberExpr),
    Call(CallExpr),
    StructLit(StructLitExpr),
    List(ListExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(e) => e.span,
            Expr::Float(e) => e.span,
            Expr::Str(e) => e.span,
            Expr::Char(e) => e.span,
            Expr::Nil(s) => *s,
            Expr::Name(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::StructLit(e) => e.span,
            Expr::List(e) => e.span,
        }
    }

    /// True for literal leaves (the inputs to constant folding).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Char(_) | Expr::Nil(_)
        )
    }
}

/// Integer literal widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntWidth {
    I8,
    I32,
    #[default]
    I64,
}

/// Float literal widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatWidth {
    F32,
    #[default]
    F64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLit {
    pub value: i64,
    pub width: IntWidth,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLit {
    pub value: f64,
    pub width: FloatWidth,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharLit {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameExpr {
    pub id: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    /// Meaningful for `AddrOf`: whether the pointer may be written through.
    pub mutability: Mutability,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub field: String,
    pub span: Span,
}

/// A call. `func` is a `Name` for plain calls or a `Member` for method
/// calls (`xs.push!(1)`).
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub func: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructLitExpr {
    pub name: String,
    pub fields: Vec<(String, Expr)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub elts: Vec<Expr>,
    pub span: Span,
}

/// Type markers: the written type annotations of the surface language.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeMark {
    I8,
    I32,
    I64,
    F32,
    F64,
    Str,
    Void,
    Pointer(Box<TypeMark>),
    List(Box<TypeMark>),
    FixedList(Box<TypeMark>, usize),
}
