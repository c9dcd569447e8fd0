//! Severity levels and diagnostic categories.

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning that doesn't stop the pipeline
    Warning,
    /// Error that stops later pipeline stages
    Error,
    /// Fatal error that stops analysis immediately
    Fatal,
}

/// Diagnostic categories, one per error family the front end can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lexical,
    Syntax,
    Type,
    UndefinedIdentifier,
    UndefinedFunction,
    Redefinition,
    Semantic,
    Runtime,
    ArrayBounds,
    Warning,
}

impl Category {
    /// Human-readable label used when rendering diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Lexical => "LexicalError",
            Category::Syntax => "SyntaxError",
            Category::Type => "TypeError",
            Category::UndefinedIdentifier => "UndefinedIdentifier",
            Category::UndefinedFunction => "UndefinedFunction",
            Category::Redefinition => "RedefinitionError",
            Category::Semantic => "SemanticError",
            Category::Runtime => "RuntimeError",
            Category::ArrayBounds => "ArrayOutOfBounds",
            Category::Warning => "Warning",
        }
    }

    /// The default severity for this category.
    pub fn default_severity(&self) -> Severity {
        match self {
            Category::Warning => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
