//! Codegen error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Compilation error: {0}")]
    CompilationError(String),

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
