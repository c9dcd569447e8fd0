//! Flow-insensitive type inference.
//!
//! One bottom-up walk that assigns every variable a minimal static type and
//! records list/pointer/struct shapes in the session's [`TypeContext`].
//! Inference is lenient: a lookup miss reports a diagnostic and yields
//! `Unknown`, and the walk always continues. Re-running over an
//! already-populated context reproduces the same answers.

use crate::ast::*;
use crate::error::{Category, Diagnostic};
use crate::semantic::analyzer::MAX_DEPTH;
use crate::semantic::structs::mark_type;
use crate::session::CompilationSession;
use crate::types::InferredType;

/// Method names that mutate a list in place and yield no value.
const LIST_MUTATORS: &[&str] = &["add!", "push!", "replace!", "insert!", "remove!", "pop!"];

/// Method names that take an element out of a list and return it.
const LIST_TAKERS: &[&str] = &["remove", "pop"];

pub struct InferenceEngine<'s> {
    session: &'s mut CompilationSession,
    depth: u32,
}

impl<'s> InferenceEngine<'s> {
    pub fn new(session: &'s mut CompilationSession) -> Self {
        Self { session, depth: 0 }
    }

    pub fn infer_program(&mut self, program: &Program) {
        for stmt in &program.body {
            self.infer_stmt(stmt);
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match &self.session.file {
            Some(file) => diagnostic.with_file(file.display().to_string()),
            None => diagnostic,
        };
        self.session.diagnostics.report(diagnostic);
    }

    fn infer_stmt(&mut self, stmt: &Stmt) {
        // Past the ceiling the walk stops; the analyzer owns the diagnostic.
        if self.depth >= MAX_DEPTH {
            return;
        }
        self.depth += 1;
        self.infer_stmt_inner(stmt);
        self.depth -= 1;
    }

    fn infer_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Print(s) => {
                self.infer_expr(&s.value);
            }
            Stmt::Assign(s) => {
                if let Expr::Name(name) = &s.target {
                    let id = name.id.clone();
                    self.infer_binding(&id, &s.value);
                } else {
                    self.infer_expr(&s.target);
                    self.infer_expr(&s.value);
                }
            }
            Stmt::Const(s) => {
                let name = s.name.clone();
                self.infer_binding(&name, &s.value);
            }
            Stmt::Global(s) => {
                let name = s.name.clone();
                self.infer_binding(&name, &s.value);
            }
            Stmt::If(s) => {
                self.infer_expr(&s.test);
                for stmt in &s.body {
                    self.infer_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.infer_stmt(stmt);
                }
            }
            Stmt::While(s) => {
                self.infer_expr(&s.test);
                for stmt in &s.body {
                    self.infer_stmt(stmt);
                }
            }
            Stmt::For(s) => {
                match &s.kind {
                    ForKind::Range { start, end } => {
                        self.infer_expr(start);
                        self.infer_expr(end);
                    }
                    ForKind::Chars { string } => {
                        self.infer_expr(string);
                    }
                }
                // The induction variable is an int in both forms: a range
                // counter, or a character (characters are ints).
                self.session.types.get_or_insert(&s.var).ty = InferredType::Int;
                for stmt in &s.body {
                    self.infer_stmt(stmt);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Import(_) => {}
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.infer_expr(value);
                }
            }
            Stmt::FuncDef(s) => {
                // Seed parameter entries so body lookups resolve; annotated
                // parameters get their written type, the rest stay Unknown.
                for param in &s.params {
                    let ty = param.ty.as_ref().map(mark_type).unwrap_or_default();
                    self.session.types.get_or_insert(&param.name).ty = ty;
                }
                for stmt in &s.body {
                    self.infer_stmt(stmt);
                }
            }
            Stmt::StructDef(s) => self.session.structs.register(s),
            Stmt::Expr(s) => {
                self.infer_expr(&s.value);
            }
        }
    }

    /// Record the type and shape of `name` from its right-hand side.
    fn infer_binding(&mut self, name: &str, value: &Expr) {
        match value {
            Expr::List(list) => {
                let elem = list
                    .elts
                    .first()
                    .map(|first| self.infer_expr(first))
                    .unwrap_or_default();
                for elt in list.elts.iter().skip(1) {
                    self.infer_expr(elt);
                }
                let info = self.session.types.get_or_insert(name);
                info.ty = InferredType::List;
                info.elem = elem;
                info.array_len = list.elts.len() as i64;
            }
            Expr::Unary(unary) if unary.op == UnaryOp::AddrOf => {
                let pointee = self.infer_expr(&unary.operand);
                let info = self.session.types.get_or_insert(name);
                info.ty = InferredType::Pointer;
                info.pointee = pointee;
            }
            Expr::StructLit(lit) => {
                self.infer_expr(value);
                let struct_name = lit.name.clone();
                let info = self.session.types.get_or_insert(name);
                info.ty = InferredType::Struct;
                info.struct_name = Some(struct_name.clone());
                self.session
                    .var_structs
                    .insert(name.to_string(), struct_name);
            }
            // Copying a variable copies its recorded shape too.
            Expr::Name(src_name) if self.session.types.get(&src_name.id).is_some() => {
                let Some(src) = self.session.types.get(&src_name.id).cloned() else {
                    return;
                };
                let info = self.session.types.get_or_insert(name);
                info.ty = src.ty;
                info.elem = src.elem;
                info.pointee = src.pointee;
                info.struct_name = src.struct_name.clone();
                info.array_len = src.array_len;
                if let Some(struct_name) = src.struct_name {
                    self.session
                        .var_structs
                        .insert(name.to_string(), struct_name);
                }
            }
            _ => {
                let ty = self.infer_expr(value);
                self.session.types.get_or_insert(name).ty = ty;
            }
        }
    }

    /// Infer the type of one expression, populating the context on the way.
    pub fn infer_expr(&mut self, expr: &Expr) -> InferredType {
        if self.depth >= MAX_DEPTH {
            return InferredType::Unknown;
        }
        self.depth += 1;
        let ty = self.infer_expr_inner(expr);
        self.depth -= 1;
        ty
    }

    fn infer_expr_inner(&mut self, expr: &Expr) -> InferredType {
        match expr {
            Expr::Int(_) | Expr::Char(_) => InferredType::Int,
            Expr::Float(_) => InferredType::Float,
            Expr::Str(_) => InferredType::Str,
            Expr::Nil(_) => InferredType::Unknown,
            Expr::Name(name) => match self.session.types.get(&name.id) {
                Some(info) => info.ty,
                None => {
                    self.report(Diagnostic::error(
                        Category::UndefinedIdentifier,
                        name.span,
                        format!("Undefined variable '{}'", name.id),
                    ));
                    InferredType::Unknown
                }
            },
            Expr::Binary(binary) => self.infer_binary(binary),
            Expr::Unary(unary) => self.infer_unary(unary),
            Expr::Index(index) => self.infer_index(index),
            Expr::Member(member) => self.infer_member(member),
            Expr::Call(call) => self.infer_call(call),
            Expr::StructLit(lit) => {
                for (_, value) in &lit.fields {
                    self.infer_expr(value);
                }
                InferredType::Struct
            }
            Expr::List(list) => {
                for elt in &list.elts {
                    self.infer_expr(elt);
                }
                InferredType::List
            }
        }
    }

    /// Promotion: string beats float beats int; comparisons and logical
    /// operators yield int; integer division promotes to float.
    fn infer_binary(&mut self, binary: &BinaryExpr) -> InferredType {
        let left = self.infer_expr(&binary.left);
        let right = self.infer_expr(&binary.right);

        if binary.op.is_comparison() || matches!(binary.op, BinOp::And | BinOp::Or) {
            return InferredType::Int;
        }
        match binary.op {
            BinOp::Concat | BinOp::Repeat => InferredType::Str,
            _ if left == InferredType::Str || right == InferredType::Str => InferredType::Str,
            BinOp::Div if left == InferredType::Int && right == InferredType::Int => {
                InferredType::Float
            }
            _ if left == InferredType::Float || right == InferredType::Float => {
                InferredType::Float
            }
            _ if left == InferredType::Int || right == InferredType::Int => InferredType::Int,
            _ => InferredType::Unknown,
        }
    }

    fn infer_unary(&mut self, unary: &UnaryExpr) -> InferredType {
        let operand = self.infer_expr(&unary.operand);
        match unary.op {
            UnaryOp::Neg => operand,
            UnaryOp::Not => InferredType::Int,
            UnaryOp::AddrOf => InferredType::Pointer,
            UnaryOp::Deref => match unary.operand.as_ref() {
                Expr::Name(name) => self
                    .session
                    .types
                    .get(&name.id)
                    .map(|info| info.pointee)
                    .unwrap_or_default(),
                _ => InferredType::Unknown,
            },
        }
    }

    fn infer_index(&mut self, index: &IndexExpr) -> InferredType {
        let object = self.infer_expr(&index.object);
        self.infer_expr(&index.index);
        match object {
            // Indexing a string yields a character, which is an int.
            InferredType::Str => InferredType::Int,
            InferredType::List => match index.object.as_ref() {
                Expr::Name(name) => self
                    .session
                    .types
                    .get(&name.id)
                    .map(|info| info.elem)
                    .unwrap_or_default(),
                Expr::List(list) => list
                    .elts
                    .first()
                    .map(|first| self.infer_expr(first))
                    .unwrap_or_default(),
                _ => InferredType::Unknown,
            },
            _ => InferredType::Unknown,
        }
    }

    fn infer_member(&mut self, member: &MemberExpr) -> InferredType {
        self.infer_expr(&member.object);
        let Expr::Name(name) = member.object.as_ref() else {
            return InferredType::Unknown;
        };
        let Some(struct_name) = self.session.var_structs.get(&name.id) else {
            return InferredType::Unknown;
        };
        self.session
            .structs
            .get(struct_name)
            .and_then(|def| def.field(&member.field))
            .map(|field| field.ty)
            .unwrap_or_default()
    }

    /// Plain calls evaluate to `Unknown` (return types are not tracked).
    /// Method calls on lists dispatch by name: taker methods return the
    /// list's element type, mutator methods return nothing.
    fn infer_call(&mut self, call: &CallExpr) -> InferredType {
        for arg in &call.args {
            self.infer_expr(arg);
        }
        let Expr::Member(member) = call.func.as_ref() else {
            return InferredType::Unknown;
        };

        self.infer_expr(&member.object);
        if LIST_MUTATORS.contains(&member.field.as_str()) {
            return InferredType::Void;
        }
        if LIST_TAKERS.contains(&member.field.as_str()) {
            if let Expr::Name(name) = member.object.as_ref() {
                return self
                    .session
                    .types
                    .get(&name.id)
                    .map(|info| info.elem)
                    .unwrap_or_default();
            }
        }
        InferredType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder;
    use crate::span::Span;

    fn sp() -> Span {
        Span::point(1, 0)
    }

    fn assign(name: &str, value: Expr) -> Stmt {
        Stmt::Assign(AssignStmt {
            target: builder::name(name, sp()),
            value,
            span: sp(),
        })
    }

    fn program(body: Vec<Stmt>) -> Program {
        Program { body, span: sp() }
    }

    #[test]
    fn test_int_division_promotes_to_float() {
        let mut session = CompilationSession::new();
        let prog = program(vec![
            assign("a", builder::int(7, sp())),
            assign("b", builder::name("a", sp())),
            assign(
                "q",
                builder::binary(
                    BinOp::Div,
                    builder::name("a", sp()),
                    builder::name("b", sp()),
                ),
            ),
        ]);
        InferenceEngine::new(&mut session).infer_program(&prog);
        assert_eq!(session.types.type_of("q"), InferredType::Float);
    }

    #[test]
    fn test_list_literal_records_element_type_and_length() {
        let mut session = CompilationSession::new();
        let prog = program(vec![assign(
            "xs",
            Expr::List(ListExpr {
                elts: vec![builder::int(1, sp()), builder::int(2, sp())],
                span: sp(),
            }),
        )]);
        InferenceEngine::new(&mut session).infer_program(&prog);

        let info = session.types.get("xs").unwrap();
        assert_eq!(info.ty, InferredType::List);
        assert_eq!(info.elem, InferredType::Int);
        assert_eq!(info.array_len, 2);
    }

    #[test]
    fn test_address_of_records_pointee() {
        let mut session = CompilationSession::new();
        let prog = program(vec![
            assign("x", builder::float(1.5, sp())),
            assign(
                "p",
                Expr::Unary(UnaryExpr {
                    op: UnaryOp::AddrOf,
                    operand: Box::new(builder::name("x", sp())),
                    mutability: Mutability::Mutable,
                    span: sp(),
                }),
            ),
        ]);
        InferenceEngine::new(&mut session).infer_program(&prog);

        let info = session.types.get("p").unwrap();
        assert_eq!(info.ty, InferredType::Pointer);
        assert_eq!(info.pointee, InferredType::Float);
    }

    #[test]
    fn test_list_method_dispatch() {
        let mut session = CompilationSession::new();
        let pop = Expr::Call(CallExpr {
            func: Box::new(Expr::Member(MemberExpr {
                object: Box::new(builder::name("xs", sp())),
                field: "pop".to_string(),
                span: sp(),
            })),
            args: vec![],
            span: sp(),
        });
        let push = Expr::Call(CallExpr {
            func: Box::new(Expr::Member(MemberExpr {
                object: Box::new(builder::name("xs", sp())),
                field: "push!".to_string(),
                span: sp(),
            })),
            args: vec![builder::int(4, sp())],
            span: sp(),
        });
        let prog = program(vec![assign(
            "xs",
            Expr::List(ListExpr {
                elts: vec![builder::string("a", sp())],
                span: sp(),
            }),
        )]);
        InferenceEngine::new(&mut session).infer_program(&prog);

        let mut engine = InferenceEngine::new(&mut session);
        assert_eq!(engine.infer_expr(&pop), InferredType::Str);
        assert_eq!(engine.infer_expr(&push), InferredType::Void);
    }

    #[test]
    fn test_undefined_name_reports_and_returns_unknown() {
        let mut session = CompilationSession::new();
        let ty = InferenceEngine::new(&mut session).infer_expr(&builder::name("ghost", sp()));
        assert_eq!(ty, InferredType::Unknown);
        assert_eq!(session.diagnostics.error_count(), 1);
    }

    #[test]
    fn test_deep_statement_nesting_stops_at_the_ceiling() {
        let mut stmt = assign("x", builder::int(1, sp()));
        for _ in 0..2000 {
            stmt = Stmt::If(IfStmt {
                test: builder::int(1, sp()),
                body: vec![stmt],
                orelse: vec![],
                span: sp(),
            });
        }
        let mut session = CompilationSession::new();
        InferenceEngine::new(&mut session).infer_program(&program(vec![stmt]));
        // The binding below the ceiling is never reached.
        assert_eq!(session.types.type_of("x"), InferredType::Unknown);
    }

    #[test]
    fn test_inference_is_idempotent() {
        let mut session = CompilationSession::new();
        let prog = program(vec![
            assign("x", builder::int(1, sp())),
            assign(
                "y",
                builder::binary(
                    BinOp::Add,
                    builder::name("x", sp()),
                    builder::float(0.5, sp()),
                ),
            ),
        ]);
        InferenceEngine::new(&mut session).infer_program(&prog);
        let first: Vec<_> = session.types.iter().map(|v| (v.name.clone(), v.ty)).collect();

        InferenceEngine::new(&mut session).infer_program(&prog);
        let second: Vec<_> = session.types.iter().map(|v| (v.name.clone(), v.ty)).collect();
        assert_eq!(first, second);
    }
}
