//! Inferred types and the per-compilation type context.

pub mod infer;

pub use infer::InferenceEngine;

use std::fmt;

/// The minimal static type inferred for an expression or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferredType {
    #[default]
    Unknown,
    Int,
    Float,
    Str,
    List,
    Pointer,
    Struct,
    /// Produced by in-place mutator methods, which yield no value.
    Void,
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InferredType::Unknown => "unknown",
            InferredType::Int => "int",
            InferredType::Float => "float",
            InferredType::Str => "string",
            InferredType::List => "list",
            InferredType::Pointer => "pointer",
            InferredType::Struct => "struct",
            InferredType::Void => "void",
        };
        write!(f, "{}", s)
    }
}

/// Everything the pipeline knows about one variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub ty: InferredType,
    /// Element type, for lists.
    pub elem: InferredType,
    /// Pointee type, for pointers.
    pub pointee: InferredType,
    /// Struct name, for struct-typed variables.
    pub struct_name: Option<String>,
    /// Literal list length; -1 when unknown.
    pub array_len: i64,
}

impl VariableInfo {
    fn new(name: String) -> Self {
        Self {
            name,
            ty: InferredType::Unknown,
            elem: InferredType::Unknown,
            pointee: InferredType::Unknown,
            struct_name: None,
            array_len: -1,
        }
    }
}

/// The flat variable→type table handed to backends.
///
/// Entries are keyed by name only, not by scope: a name reused in two
/// different scopes aliases one entry, and redefinition mutates it in place.
/// This matches the observed behavior of the reference pipeline and is
/// pinned by tests; backends query it by name.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    vars: Vec<VariableInfo>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&VariableInfo> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// Fetch the entry for `name`, creating an `Unknown` one lazily.
    pub fn get_or_insert(&mut self, name: &str) -> &mut VariableInfo {
        let idx = match self.vars.iter().position(|v| v.name == name) {
            Some(idx) => idx,
            None => {
                self.vars.push(VariableInfo::new(name.to_string()));
                self.vars.len() - 1
            }
        };
        &mut self.vars[idx]
    }

    /// The inferred type for a name, `Unknown` when absent.
    pub fn type_of(&self, name: &str) -> InferredType {
        self.get(name).map(|v| v.ty).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableInfo> {
        self.vars.iter()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_created_lazily() {
        let mut ctx = TypeContext::new();
        assert!(ctx.get("x").is_none());

        ctx.get_or_insert("x").ty = InferredType::Int;
        assert_eq!(ctx.type_of("x"), InferredType::Int);
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_name_keyed_entries_alias() {
        // The table is scope-blind: writing "x" twice mutates one entry.
        let mut ctx = TypeContext::new();
        ctx.get_or_insert("x").ty = InferredType::Int;
        ctx.get_or_insert("x").ty = InferredType::Str;

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.type_of("x"), InferredType::Str);
    }
}
