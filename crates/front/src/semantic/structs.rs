//! The per-compilation struct registry.

use crate::ast::{StructDefStmt, TypeMark};
use crate::types::InferredType;
use indexmap::IndexMap;

/// One field of a registered struct. The byte offset is a placeholder until
/// a backend decides layout; field access instructions carry names, not
/// offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: InferredType,
    pub offset: i64,
}

/// A registered struct definition with its ordered field list.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: IndexMap<String, StructField>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// All struct definitions seen in one compilation.
#[derive(Debug, Clone, Default)]
pub struct StructRegistry {
    defs: IndexMap<String, StructDef>,
}

impl StructRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct definition. Redefinition is silently ignored: the
    /// first definition of a name wins.
    pub fn register(&mut self, def: &StructDefStmt) {
        if self.defs.contains_key(&def.name) {
            return;
        }

        let mut fields = IndexMap::new();
        for field in &def.fields {
            let ty = field
                .ty
                .as_ref()
                .map(mark_type)
                .or_else(|| field.default.as_ref().map(literal_type))
                .unwrap_or_default();
            fields.insert(
                field.name.clone(),
                StructField {
                    name: field.name.clone(),
                    ty,
                    offset: -1,
                },
            );
        }

        self.defs.insert(
            def.name.clone(),
            StructDef {
                name: def.name.clone(),
                fields,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn clear(&mut self) {
        self.defs.clear();
    }
}

/// The inferred type corresponding to a written type mark.
pub fn mark_type(mark: &TypeMark) -> InferredType {
    match mark {
        TypeMark::I8 | TypeMark::I32 | TypeMark::I64 => InferredType::Int,
        TypeMark::F32 | TypeMark::F64 => InferredType::Float,
        TypeMark::Str => InferredType::Str,
        TypeMark::Void => InferredType::Void,
        TypeMark::Pointer(_) => InferredType::Pointer,
        TypeMark::List(_) | TypeMark::FixedList(_, _) => InferredType::List,
    }
}

/// The inferred type of a field initializer's literal kind.
fn literal_type(expr: &crate::ast::Expr) -> InferredType {
    use crate::ast::Expr;
    match expr {
        Expr::Int(_) | Expr::Char(_) => InferredType::Int,
        Expr::Float(_) => InferredType::Float,
        Expr::Str(_) => InferredType::Str,
        Expr::List(_) => InferredType::List,
        Expr::StructLit(_) => InferredType::Struct,
        _ => InferredType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldDef, StructDefStmt};
    use crate::span::Span;

    fn point_struct(field_ty: TypeMark) -> StructDefStmt {
        StructDefStmt {
            name: "Point".to_string(),
            fields: vec![FieldDef {
                name: "x".to_string(),
                ty: Some(field_ty),
                default: None,
                span: Span::point(1, 0),
            }],
            span: Span::point(1, 0),
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let mut registry = StructRegistry::new();
        registry.register(&point_struct(TypeMark::I32));
        registry.register(&point_struct(TypeMark::F64));

        let def = registry.get("Point").unwrap();
        assert_eq!(def.field("x").unwrap().ty, InferredType::Int);
        assert_eq!(registry.len(), 1);
    }
}
