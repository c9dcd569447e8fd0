//! Per-compilation state and the front-end pipeline.

use crate::ast::Program;
use crate::error::{DiagnosticCollector, FrontError, FrontResult};
use crate::imports::inline_imports;
use crate::parse::ModuleParser;
use crate::semantic::analyze;
use crate::semantic::structs::StructRegistry;
use crate::types::{InferenceEngine, TypeContext};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything one compilation owns: the struct registry, the
/// variable→struct map, the type context and the diagnostics. Nothing here
/// is global, so compiling several units in one process cannot leak state —
/// each unit gets a fresh session.
#[derive(Debug, Default)]
pub struct CompilationSession {
    /// Path of the unit being compiled, used for diagnostics and for
    /// resolving imports.
    pub file: Option<PathBuf>,
    pub structs: StructRegistry,
    /// Which struct literal a variable/constant was initialized from.
    pub var_structs: HashMap<String, String>,
    pub types: TypeContext,
    pub diagnostics: DiagnosticCollector,
}

impl CompilationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Reset all per-unit state, keeping the session reusable.
    pub fn reset(&mut self) {
        self.structs.clear();
        self.var_structs.clear();
        self.types.clear();
        self.diagnostics.clear();
    }

    /// The directory imports resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.file
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Run the front-end pipeline over `program` in place:
    /// import inlining → semantic analysis → type inference.
    ///
    /// Each stage only runs when the previous one reported zero errors;
    /// warnings never stop the pipeline. On success the session's
    /// [`TypeContext`] is populated for the lowering stage.
    pub fn check(
        &mut self,
        program: &mut Program,
        parser: &mut dyn ModuleParser,
    ) -> FrontResult<()> {
        inline_imports(program, &self.base_dir(), parser);

        let (errors, _warnings) = analyze(self, program);
        if errors > 0 {
            return Err(FrontError::Analysis(errors));
        }

        InferenceEngine::new(self).infer_program(program);
        if self.diagnostics.has_errors() {
            return Err(FrontError::Analysis(self.diagnostics.error_count()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_all_registries() {
        let mut session = CompilationSession::new();
        session.types.get_or_insert("x");
        session
            .var_structs
            .insert("p".to_string(), "Point".to_string());

        session.reset();
        assert!(session.types.is_empty());
        assert!(session.var_structs.is_empty());
        assert!(!session.diagnostics.has_errors());
    }
}
