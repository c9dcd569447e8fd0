//! The seam to the external parser.
//!
//! Lexing and parsing are not part of this crate: the front end consumes a
//! finished [`Program`](crate::ast::Program). Import inlining still needs to
//! parse other files, so it goes through this trait.

use crate::ast::Program;
use std::path::Path;

/// Anything that can turn a source file into a [`Program`].
pub trait ModuleParser {
    /// Parse the file at `path`. Errors carry a human-readable reason; the
    /// import inliner treats any error as "skip this import".
    fn parse_module(&mut self, path: &Path) -> Result<Program, String>;
}

/// Blanket impl so closures can act as parsers in tests and embeddings.
impl<F> ModuleParser for F
where
    F: FnMut(&Path) -> Result<Program, String>,
{
    fn parse_module(&mut self, path: &Path) -> Result<Program, String> {
        self(path)
    }
}
