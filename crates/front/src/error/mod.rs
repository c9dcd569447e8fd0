//! Error handling for the Reef front end.

pub mod codes;
pub mod diagnostic;
pub mod suggestions;

pub use codes::{Category, Severity};
pub use diagnostic::{Diagnostic, DiagnosticCollector};

use thiserror::Error;

/// Top-level front-end error, returned by the pipeline entry points.
#[derive(Debug, Error)]
pub enum FrontError {
    #[error("analysis reported {0} error(s)")]
    Analysis(usize),
}

pub type FrontResult<T> = Result<T, FrontError>;
