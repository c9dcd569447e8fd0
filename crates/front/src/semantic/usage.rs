//! The unused-variable pass of semantic analysis.
//!
//! A second, independent traversal: declare every binding, mark reads, then
//! report a warning for each variable, constant or parameter that was never
//! read. Findings are collected after the full walk and are never fatal.

use crate::ast::*;
use crate::error::Diagnostic;
use crate::semantic::analyzer::MAX_DEPTH;
use crate::semantic::scope::{ScopeChain, Symbol, SymbolKind};
use crate::session::CompilationSession;

pub struct UsagePass<'s> {
    session: &'s mut CompilationSession,
    scopes: ScopeChain,
    /// Nodes on the current traversal path, scoped to this pass.
    visited: Vec<usize>,
    depth: u32,
}

impl<'s> UsagePass<'s> {
    pub fn new(session: &'s mut CompilationSession) -> Self {
        Self {
            session,
            scopes: ScopeChain::new(),
            visited: Vec::new(),
            depth: 0,
        }
    }

    pub fn run(&mut self, program: &Program) {
        for stmt in &program.body {
            self.visit_stmt(stmt);
        }
        self.report_unused();
    }

    fn report_unused(&mut self) {
        let mut findings = Vec::new();
        for sym in self.scopes.all_symbols() {
            if sym.used {
                continue;
            }
            let noun = match sym.kind {
                SymbolKind::Variable => "Variable",
                SymbolKind::Constant => "Constant",
                SymbolKind::Parameter => "Parameter",
                SymbolKind::Function => continue,
            };
            findings.push(Diagnostic::warning(
                sym.span,
                format!("{} '{}' is never used", noun, sym.name),
            ));
        }
        for finding in findings {
            let finding = match &self.session.file {
                Some(file) => finding.with_file(file.display().to_string()),
                None => finding,
            };
            self.session.diagnostics.report(finding);
        }
    }

    fn declare(&mut self, name: &str, kind: SymbolKind, span: crate::span::Span) {
        if self.scopes.lookup_local(name).is_none() {
            self.scopes.define(Symbol::new(name, kind, span));
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        // The error pass diagnoses the overflow; this pass just stops.
        if self.depth >= MAX_DEPTH {
            return;
        }
        self.depth += 1;
        self.visit_stmt_inner(stmt);
        self.depth -= 1;
    }

    fn visit_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Print(s) => self.visit_expr(&s.value),
            Stmt::Assign(s) => {
                self.visit_expr(&s.value);
                match &s.target {
                    // A write alone is not a use.
                    Expr::Name(name) => self.declare(&name.id, SymbolKind::Variable, s.span),
                    other => self.visit_expr(other),
                }
            }
            Stmt::Const(s) => {
                self.visit_expr(&s.value);
                self.declare(&s.name, SymbolKind::Constant, s.span);
            }
            Stmt::Global(s) => {
                self.visit_expr(&s.value);
                self.declare(&s.name, SymbolKind::Variable, s.span);
            }
            Stmt::If(s) => {
                self.visit_expr(&s.test);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::While(s) => {
                self.visit_expr(&s.test);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::For(s) => {
                match &s.kind {
                    ForKind::Range { start, end } => {
                        self.visit_expr(start);
                        self.visit_expr(end);
                    }
                    ForKind::Chars { string } => self.visit_expr(string),
                }
                self.declare(&s.var, SymbolKind::Variable, s.span);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Import(_) | Stmt::StructDef(_) => {}
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.visit_expr(value);
                }
            }
            Stmt::FuncDef(s) => {
                self.declare(&s.name, SymbolKind::Function, s.span);
                self.scopes.push_scope();
                for param in &s.params {
                    self.declare(&param.name, SymbolKind::Parameter, param.span);
                }
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                self.scopes.pop_scope();
            }
            Stmt::Expr(s) => self.visit_expr(&s.value),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        let key = expr as *const Expr as usize;
        if self.visited.contains(&key) || self.depth >= MAX_DEPTH {
            return;
        }
        self.visited.push(key);
        self.depth += 1;
        self.visit_expr_inner(expr);
        self.depth -= 1;
        self.visited.pop();
    }

    fn visit_expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => {
                self.scopes.mark_used(&name.id);
            }
            Expr::Binary(binary) => {
                self.visit_expr(&binary.left);
                self.visit_expr(&binary.right);
            }
            Expr::Unary(unary) => self.visit_expr(&unary.operand),
            Expr::Index(index) => {
                self.visit_expr(&index.object);
                self.visit_expr(&index.index);
            }
            Expr::Member(member) => self.visit_expr(&member.object),
            Expr::Call(call) => {
                self.visit_expr(&call.func);
                for arg in &call.args {
                    self.visit_expr(arg);
                }
            }
            Expr::StructLit(lit) => {
                for (_, value) in &lit.fields {
                    self.visit_expr(value);
                }
            }
            Expr::List(list) => {
                for elt in &list.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Char(_) | Expr::Nil(_) => {}
        }
    }
}
