//! Lexical scope tracking.

use crate::span::Span;

/// The kind of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function,
    Parameter,
}

/// A declared name in a scope.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Where the symbol was declared.
    pub span: Span,
    /// True for pointers taken with `&mut`; assignment through the pointer
    /// is only legal when set.
    pub mutable_pointer: bool,
    /// Whether the symbol has been read at least once.
    pub used: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
            mutable_pointer: false,
            used: false,
        }
    }
}

/// One lexical scope: an append-only list of symbols.
#[derive(Debug, Default)]
pub struct Scope {
    pub symbols: Vec<Symbol>,
    pub parent: Option<usize>,
}

/// The scope chain for one analysis run. A scope is created per program
/// root and per function body and never outlives the run.
#[derive(Debug)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
}

impl ScopeChain {
    /// Create a chain holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            stack: vec![0],
        }
    }

    pub fn current(&self) -> usize {
        *self.stack.last().expect("scope stack is never empty")
    }

    /// Enter a fresh child scope of the current one.
    pub fn push_scope(&mut self) -> usize {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            symbols: Vec::new(),
            parent: Some(self.current()),
        });
        self.stack.push(id);
        id
    }

    pub fn pop_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Append a symbol to the current scope.
    pub fn define(&mut self, symbol: Symbol) {
        let id = self.current();
        self.scopes[id].symbols.push(symbol);
    }

    /// Append a symbol to the root scope (for globals).
    pub fn define_global(&mut self, symbol: Symbol) {
        self.scopes[0].symbols.push(symbol);
    }

    /// Find `name` in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current()]
            .symbols
            .iter()
            .rev()
            .find(|s| s.name == name)
    }

    /// Find `name` walking the current scope then its parent chain.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut id = self.current();
        loop {
            let scope = &self.scopes[id];
            if let Some(sym) = scope.symbols.iter().rev().find(|s| s.name == name) {
                return Some(sym);
            }
            match scope.parent {
                Some(parent) => id = parent,
                None => return None,
            }
        }
    }

    /// Find `name` like [`lookup`](Self::lookup) and mark it used.
    pub fn mark_used(&mut self, name: &str) -> bool {
        let mut id = self.current();
        loop {
            if let Some(sym) = self.scopes[id]
                .symbols
                .iter_mut()
                .rev()
                .find(|s| s.name == name)
            {
                sym.used = true;
                return true;
            }
            match self.scopes[id].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Set the mutable-pointer flag on the nearest binding of `name`.
    pub fn set_mutable_pointer(&mut self, name: &str, mutable: bool) {
        let mut id = self.current();
        loop {
            if let Some(sym) = self.scopes[id]
                .symbols
                .iter_mut()
                .rev()
                .find(|s| s.name == name)
            {
                sym.mutable_pointer = mutable;
                return;
            }
            match self.scopes[id].parent {
                Some(parent) => id = parent,
                None => return,
            }
        }
    }

    /// All symbols of every scope, for post-walk usage checks.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes.iter().flat_map(|s| s.symbols.iter())
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}
