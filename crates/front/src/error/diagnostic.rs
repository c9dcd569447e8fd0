//! Diagnostic reporting for analysis errors and warnings.

use super::codes::{Category, Severity};
use crate::span::Span;
use std::fmt;

/// A structured diagnostic: the user-facing side channel of the pipeline.
/// Backends never consume these.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity of the finding
    pub severity: Severity,
    /// Error category
    pub category: Category,
    /// File the finding belongs to, when known
    pub file: Option<String>,
    /// Source location
    pub span: Span,
    /// Primary message
    pub message: String,
    /// Optional one-line fix suggestion
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the category's default severity.
    pub fn new(category: Category, span: Span, message: String) -> Self {
        Diagnostic {
            severity: category.default_severity(),
            category,
            file: None,
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(category: Category, span: Span, message: String) -> Self {
        Self::new(category, span, message).with_severity(Severity::Error)
    }

    /// Create a warning diagnostic.
    pub fn warning(span: Span, message: String) -> Self {
        Self::new(Category::Warning, span, message)
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach the file name.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        write!(
            f,
            "{}:{}: {}: {}",
            self.span.line,
            self.span.column,
            self.category.label(),
            self.message
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  help: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Diagnostic collector for batch reporting.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error | Severity::Fatal => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => {}
        }
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Get all diagnostics in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Clear all diagnostics and counters.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}
