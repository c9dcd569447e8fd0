//! Source locations as reported by the external parser.

/// A source span in line/column form (1-based lines, 0-based columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// A single-point span.
    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    /// The span covering both `self` and `other`.
    ///
    /// Used for synthesized nodes: the result spans from the leftmost to the
    /// rightmost child.
    pub fn merge(self, other: Span) -> Span {
        let (line, column) = if (other.line, other.column) < (self.line, self.column) {
            (other.line, other.column)
        } else {
            (self.line, self.column)
        };
        let (end_line, end_column) =
            if (other.end_line, other.end_column) > (self.end_line, self.end_column) {
                (other.end_line, other.end_column)
            } else {
                (self.end_line, self.end_column)
            };
        Span::new(line, column, end_line, end_column)
    }
}
