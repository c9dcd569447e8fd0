//! The correctness pass of semantic analysis.
//!
//! One full traversal that reports undefined identifiers and functions,
//! constant redefinition, writes through immutable pointers, literal index
//! bounds violations, and struct field mismatches. Errors never stop the
//! walk; the whole tree is surfaced in one run.

use crate::ast::*;
use crate::error::{suggestions, Category, Diagnostic};
use crate::imports::resolve_module_path;
use crate::semantic::scope::{ScopeChain, Symbol, SymbolKind};
use crate::session::CompilationSession;
use crate::span::Span;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Recursion ceiling shared by all tree walks. Deep enough for any
/// realistic input, shallow enough to never overflow the call stack.
pub const MAX_DEPTH: u32 = 1000;

const PUB_FN_PATTERN: &str = r"pub\s+fn\s+([A-Za-z_][A-Za-z0-9_]*)";

pub struct ErrorPass<'s> {
    session: &'s mut CompilationSession,
    scopes: ScopeChain,
    /// Literal lengths of list-initialized variables, for bounds checks.
    list_lens: HashMap<String, usize>,
    /// Nodes on the current traversal path; bounds cost on pathological
    /// node reuse. Scoped to this pass, not global.
    visited: Vec<usize>,
    depth: u32,
    depth_reported: bool,
    base_dir: PathBuf,
    pub_fn_re: Regex,
}

impl<'s> ErrorPass<'s> {
    pub fn new(session: &'s mut CompilationSession) -> Self {
        let base_dir = session.base_dir();
        Self {
            session,
            scopes: ScopeChain::new(),
            list_lens: HashMap::new(),
            visited: Vec::new(),
            depth: 0,
            depth_reported: false,
            base_dir,
            pub_fn_re: Regex::new(PUB_FN_PATTERN).expect("static pattern compiles"),
        }
    }

    pub fn run(&mut self, program: &Program) {
        self.collect_toplevel(program);
        for stmt in &program.body {
            self.visit_stmt(stmt);
        }
    }

    /// Register structs, function names and globals before any body is
    /// walked, so forward references and mutual recursion resolve.
    fn collect_toplevel(&mut self, program: &Program) {
        for stmt in &program.body {
            match stmt {
                Stmt::StructDef(def) => self.session.structs.register(def),
                Stmt::FuncDef(func) => {
                    self.scopes
                        .define(Symbol::new(&func.name, SymbolKind::Function, func.span));
                }
                Stmt::Global(global) => {
                    if self.scopes.lookup_local(&global.name).is_some() {
                        self.report_redefinition(&global.name, global.span);
                    } else {
                        self.scopes.define_global(Symbol::new(
                            &global.name,
                            SymbolKind::Variable,
                            global.span,
                        ));
                    }
                }
                _ => {}
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match &self.session.file {
            Some(file) => diagnostic.with_file(file.display().to_string()),
            None => diagnostic,
        };
        self.session.diagnostics.report(diagnostic);
    }

    fn report_redefinition(&mut self, name: &str, span: Span) {
        self.report(Diagnostic::error(
            Category::Redefinition,
            span,
            format!("Name '{}' is already defined", name),
        ));
    }

    fn report_depth_exceeded(&mut self, span: Span) {
        if self.depth_reported {
            return;
        }
        self.depth_reported = true;
        self.report(Diagnostic::error(
            Category::Semantic,
            span,
            "Nesting exceeds the maximum depth".to_string(),
        ));
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.depth >= MAX_DEPTH {
            self.report_depth_exceeded(stmt.span());
            return;
        }
        self.depth += 1;
        self.visit_stmt_inner(stmt);
        self.depth -= 1;
    }

    fn visit_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Print(s) => self.visit_expr(&s.value),
            Stmt::Assign(s) => self.visit_assign(s),
            Stmt::Const(s) => self.visit_const(s),
            Stmt::Global(s) => self.visit_expr(&s.value),
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
            Stmt::For(s) => self.visit_for(s),
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.visit_expr(value);
                }
            }
            Stmt::FuncDef(s) => self.visit_func_def(s),
            // Top-level definitions register twice; first-definition-wins
            // makes that a no-op. Function-local definitions register here.
            Stmt::StructDef(def) => self.session.structs.register(def),
            Stmt::Import(s) => self.visit_import(s),
            Stmt::Expr(s) => self.visit_expr(&s.value),
        }
    }

    fn visit_assign(&mut self, assign: &AssignStmt) {
        self.visit_expr(&assign.value);

        match &assign.target {
            Expr::Name(name) => {
                let existing = self.scopes.lookup(&name.id).map(|sym| sym.kind);
                match existing {
                    Some(SymbolKind::Constant) => {
                        self.report(Diagnostic::error(
                            Category::Redefinition,
                            assign.span,
                            format!("Cannot assign to constant '{}'", name.id),
                        ));
                    }
                    Some(_) => {}
                    // Declaration-on-assign: the left-hand side is a
                    // definition, never an undefined-name error.
                    None => self
                        .scopes
                        .define(Symbol::new(&name.id, SymbolKind::Variable, assign.span)),
                }
                self.track_shape(&name.id, &assign.value);
            }
            Expr::Index(index) => {
                self.visit_expr(&index.object);
                self.visit_expr(&index.index);
                self.check_index(index);
            }
            Expr::Member(member) => {
                self.visit_expr(&member.object);
                self.check_member(member);
            }
            Expr::Unary(unary) if unary.op == UnaryOp::Deref => {
                self.visit_expr(&unary.operand);
                if let Expr::Name(name) = unary.operand.as_ref() {
                    let immutable = self
                        .scopes
                        .lookup(&name.id)
                        .map(|sym| !sym.mutable_pointer)
                        .unwrap_or(false);
                    if immutable {
                        self.report(Diagnostic::error(
                            Category::Semantic,
                            assign.span,
                            format!("Cannot assign through immutable pointer '{}'", name.id),
                        ));
                    }
                }
            }
            other => {
                self.visit_expr(other);
                self.report(Diagnostic::error(
                    Category::Semantic,
                    assign.span,
                    "Invalid assignment target".to_string(),
                ));
            }
        }
    }

    /// Remember shapes needed by later checks: literal list lengths, the
    /// struct a variable came from, and pointer mutability.
    fn track_shape(&mut self, name: &str, value: &Expr) {
        match value {
            Expr::List(list) => {
                self.list_lens.insert(name.to_string(), list.elts.len());
            }
            Expr::StructLit(lit) => {
                self.session
                    .var_structs
                    .insert(name.to_string(), lit.name.clone());
            }
            Expr::Unary(unary) if unary.op == UnaryOp::AddrOf => {
                self.scopes
                    .set_mutable_pointer(name, unary.mutability == Mutability::Mutable);
            }
            _ => {}
        }
    }

    fn visit_const(&mut self, konst: &ConstStmt) {
        self.visit_expr(&konst.value);
        if self.scopes.lookup(&konst.name).is_some() {
            self.report_redefinition(&konst.name, konst.span);
        } else {
            self.scopes
                .define(Symbol::new(&konst.name, SymbolKind::Constant, konst.span));
        }
        self.track_shape(&konst.name, &konst.value);
    }

    fn visit_for(&mut self, for_stmt: &ForStmt) {
        match &for_stmt.kind {
            ForKind::Range { start, end } => {
                self.visit_expr(start);
                self.visit_expr(end);
            }
            ForKind::Chars { string } => self.visit_expr(string),
        }
        if self.scopes.lookup_local(&for_stmt.var).is_none() {
            self.scopes.define(Symbol::new(
                &for_stmt.var,
                SymbolKind::Variable,
                for_stmt.span,
            ));
        }
        for stmt in &for_stmt.body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_func_def(&mut self, func: &FuncDefStmt) {
        // The name itself was registered in the top-level collection pass;
        // nested function definitions register here.
        if self.scopes.lookup_local(&func.name).is_none() {
            self.scopes
                .define(Symbol::new(&func.name, SymbolKind::Function, func.span));
        }

        self.scopes.push_scope();
        for param in &func.params {
            self.scopes
                .define(Symbol::new(&param.name, SymbolKind::Parameter, param.span));
        }
        for stmt in &func.body {
            self.visit_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    /// Imports reached during analysis are resolved with a cheap text scan:
    /// the target file is read as raw text and `pub fn` names are
    /// registered without re-parsing. Unlike the AST-level inliner, a
    /// missing module is an error here.
    fn visit_import(&mut self, import: &ImportStmt) {
        let path = resolve_module_path(&self.base_dir, &import.module);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let names: Vec<String> = self
                    .pub_fn_re
                    .captures_iter(&text)
                    .map(|cap| cap[1].to_string())
                    .collect();
                for name in names {
                    if self.scopes.lookup_local(&name).is_none() {
                        self.scopes
                            .define(Symbol::new(&name, SymbolKind::Function, import.span));
                    }
                }
            }
            Err(_) => {
                self.report(Diagnostic::error(
                    Category::Semantic,
                    import.span,
                    format!("Module '{}' not found", import.module),
                ));
            }
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        let key = expr as *const Expr as usize;
        if self.visited.contains(&key) {
            return;
        }
        if self.depth >= MAX_DEPTH {
            self.report_depth_exceeded(expr.span());
            return;
        }
        self.visited.push(key);
        self.depth += 1;

        match expr {
            Expr::Name(name) => {
                if !self.scopes.mark_used(&name.id) {
                    self.report(Diagnostic::error(
                        Category::UndefinedIdentifier,
                        name.span,
                        format!("Undefined variable '{}'", name.id),
                    ));
                }
            }
            Expr::Binary(binary) => {
                self.visit_expr(&binary.left);
                self.visit_expr(&binary.right);
            }
            Expr::Unary(unary) => self.visit_expr(&unary.operand),
            Expr::Index(index) => {
                self.visit_expr(&index.object);
                self.visit_expr(&index.index);
                self.check_index(index);
            }
            Expr::Member(member) => {
                self.visit_expr(&member.object);
                self.check_member(member);
            }
            Expr::Call(call) => self.visit_call(call),
            Expr::StructLit(lit) => {
                for (field, value) in &lit.fields {
                    self.visit_expr(value);
                    self.check_struct_field(&lit.name, field, lit.span);
                }
            }
            Expr::List(list) => {
                for elt in &list.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Char(_) | Expr::Nil(_) => {}
        }

        self.depth -= 1;
        self.visited.pop();
    }

    fn visit_call(&mut self, call: &CallExpr) {
        match call.func.as_ref() {
            Expr::Name(name) => {
                if !self.scopes.mark_used(&name.id) {
                    self.report(Diagnostic::error(
                        Category::UndefinedFunction,
                        name.span,
                        format!("Undefined function '{}'", name.id),
                    ));
                }
            }
            // Method call: only the receiver resolves as a name.
            other => self.visit_expr(other),
        }
        for arg in &call.args {
            self.visit_expr(arg);
        }
    }

    /// Bounds-check a literal index against a statically known list length.
    fn check_index(&mut self, index: &IndexExpr) {
        let len = match index.object.as_ref() {
            Expr::List(list) => Some(list.elts.len()),
            Expr::Name(name) => self.list_lens.get(&name.id).copied(),
            _ => None,
        };
        let (Some(len), Expr::Int(idx)) = (len, index.index.as_ref()) else {
            return;
        };

        if idx.value < 0 || idx.value >= len as i64 {
            let range = if len == 0 {
                "empty".to_string()
            } else {
                format!("valid range 0..{}", len - 1)
            };
            self.report(Diagnostic::error(
                Category::ArrayBounds,
                index.span,
                format!(
                    "Index {} out of bounds for list of size {} ({})",
                    idx.value, len, range
                ),
            ));
        }
    }

    /// Validate a member access against the struct the object came from.
    fn check_member(&mut self, member: &MemberExpr) {
        let Expr::Name(name) = member.object.as_ref() else {
            return;
        };
        let Some(struct_name) = self.session.var_structs.get(&name.id).cloned() else {
            return;
        };
        self.check_struct_field(&struct_name, &member.field, member.span);
    }

    fn check_struct_field(&mut self, struct_name: &str, field: &str, span: Span) {
        let Some(def) = self.session.structs.get(struct_name) else {
            return;
        };
        if def.field(field).is_some() {
            return;
        }

        let suggestion = suggestions::suggest_field(field, def.field_names());
        let mut diagnostic = Diagnostic::error(
            Category::Semantic,
            span,
            format!(
                "Field '{}' does not exist in struct '{}'",
                field, struct_name
            ),
        );
        if let Some(suggestion) = suggestion {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
        self.report(diagnostic);
    }
}
