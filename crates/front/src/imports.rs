//! Cross-module import inlining.
//!
//! Each `import` statement at the top level of a program is replaced by the
//! public functions of the imported module: one statement becomes N. The
//! imported module is parsed with the caller-provided [`ModuleParser`]; a
//! module that cannot be opened, fails to parse, or has no `pub fn`
//! declarations makes the import disappear silently. The analyzer reports
//! the missing-module case on its own independent walk, so the two passes
//! intentionally disagree about severity.

use crate::ast::{Program, Stmt};
use crate::parse::ModuleParser;
use std::path::{Path, PathBuf};

/// Default source file extension appended to extension-less module paths.
pub const SOURCE_EXTENSION: &str = "reef";

/// Resolve a module path as written against the importing file's directory.
pub fn resolve_module_path(base_dir: &Path, module: &str) -> PathBuf {
    let mut path = base_dir.join(module);
    if path.extension().is_none() {
        path.set_extension(SOURCE_EXTENSION);
    }
    path
}

/// Splice every import's public functions into `program` in place.
///
/// `base_dir` is the directory of the importing file; module paths resolve
/// relative to it.
pub fn inline_imports(program: &mut Program, base_dir: &Path, parser: &mut dyn ModuleParser) {
    let mut i = 0;
    while i < program.body.len() {
        let module = match &program.body[i] {
            Stmt::Import(import) => import.module.clone(),
            _ => {
                i += 1;
                continue;
            }
        };

        let path = resolve_module_path(base_dir, &module);
        let functions = match parser.parse_module(&path) {
            Ok(parsed) => take_public_functions(parsed),
            // Unparseable or missing module: the import is dropped silently.
            Err(_) => Vec::new(),
        };

        let count = functions.len();
        program.body.splice(i..=i, functions);
        i += count;
    }
}

/// Move the top-level `pub fn` nodes out of a parsed module. The rest of the
/// module drops here.
fn take_public_functions(module: Program) -> Vec<Stmt> {
    module
        .body
        .into_iter()
        .filter(|stmt| matches!(stmt, Stmt::FuncDef(f) if f.is_pub))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::span::Span;

    fn import_stmt(module: &str) -> Stmt {
        Stmt::Import(ImportStmt {
            module: module.to_string(),
            span: Span::point(1, 0),
        })
    }

    fn func(name: &str, is_pub: bool) -> Stmt {
        Stmt::FuncDef(FuncDefStmt {
            name: name.to_string(),
            params: Vec::new(),
            body: Vec::new(),
            is_pub,
            span: Span::point(1, 0),
        })
    }

    fn program(body: Vec<Stmt>) -> Program {
        Program {
            body,
            span: Span::point(1, 0),
        }
    }

    #[test]
    fn test_import_splices_public_functions() {
        let mut importer = program(vec![import_stmt("util"), func("main", false)]);
        let mut parser = |_path: &Path| {
            Ok(program(vec![
                func("helper", true),
                func("private", false),
                func("other", true),
            ]))
        };

        inline_imports(&mut importer, Path::new("."), &mut parser);

        assert_eq!(importer.body.len(), 3);
        assert!(matches!(&importer.body[0], Stmt::FuncDef(f) if f.name == "helper"));
        assert!(matches!(&importer.body[1], Stmt::FuncDef(f) if f.name == "other"));
        assert!(matches!(&importer.body[2], Stmt::FuncDef(f) if f.name == "main"));
    }

    #[test]
    fn test_import_with_no_public_functions_vanishes() {
        let mut importer = program(vec![import_stmt("empty"), func("main", false)]);
        let mut parser = |_path: &Path| Ok(program(vec![func("private", false)]));

        inline_imports(&mut importer, Path::new("."), &mut parser);

        // The import is gone and nothing replaced it.
        assert_eq!(importer.body.len(), 1);
        assert!(matches!(&importer.body[0], Stmt::FuncDef(f) if f.name == "main"));
    }

    #[test]
    fn test_unparseable_module_is_skipped_silently() {
        let mut importer = program(vec![import_stmt("broken")]);
        let mut parser = |_path: &Path| Err("syntax error".to_string());

        inline_imports(&mut importer, Path::new("."), &mut parser);
        assert!(importer.body.is_empty());
    }

    #[test]
    fn test_module_path_resolution() {
        let path = resolve_module_path(Path::new("/src"), "util");
        assert_eq!(path, PathBuf::from("/src/util.reef"));

        let path = resolve_module_path(Path::new("/src"), "lib/strings.reef");
        assert_eq!(path, PathBuf::from("/src/lib/strings.reef"));
    }
}
