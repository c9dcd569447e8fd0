//! Analyzer scenarios: error reporting, suggestions, usage warnings.

use reef_front::ast::builder;
use reef_front::ast::*;
use reef_front::error::Category;
use reef_front::semantic::analyze;
use reef_front::{CompilationSession, Span};

fn sp() -> Span {
    Span::point(1, 0)
}

fn program(body: Vec<Stmt>) -> Program {
    Program { body, span: sp() }
}

fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: builder::name(name, sp()),
        value,
        span: sp(),
    })
}

fn konst(name: &str, value: Expr) -> Stmt {
    Stmt::Const(ConstStmt {
        name: name.to_string(),
        value,
        span: sp(),
    })
}

fn expr_stmt(value: Expr) -> Stmt {
    Stmt::Expr(ExprStmt { value, span: sp() })
}

fn struct_def(name: &str, fields: &[&str]) -> Stmt {
    Stmt::StructDef(StructDefStmt {
        name: name.to_string(),
        fields: fields
            .iter()
            .map(|f| FieldDef {
                name: f.to_string(),
                ty: Some(TypeMark::I32),
                default: None,
                span: sp(),
            })
            .collect(),
        span: sp(),
    })
}

fn struct_lit(name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::StructLit(StructLitExpr {
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(f, e)| (f.to_string(), e))
            .collect(),
        span: sp(),
    })
}

fn member(object: &str, field: &str) -> Expr {
    Expr::Member(MemberExpr {
        object: Box::new(builder::name(object, sp())),
        field: field.to_string(),
        span: sp(),
    })
}

#[test]
fn undeclared_rhs_reports_exactly_one_error() {
    // y = y + 1: the left-hand side is a declaration-on-assign, so only
    // the right-hand y is undefined.
    let prog = program(vec![assign(
        "y",
        builder::binary(BinOp::Add, builder::name("y", sp()), builder::int(1, sp())),
    )]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    let diag = &session.diagnostics.diagnostics()[0];
    assert_eq!(diag.category, Category::UndefinedIdentifier);
    assert_eq!(diag.message, "Undefined variable 'y'");
}

#[test]
fn constant_cannot_be_redefined_or_reassigned() {
    let prog = program(vec![
        konst("x", builder::int(1, sp())),
        konst("x", builder::int(2, sp())),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);
    assert_eq!(errors, 1);
    assert_eq!(
        session.diagnostics.diagnostics()[0].category,
        Category::Redefinition
    );

    let prog = program(vec![
        konst("x", builder::int(1, sp())),
        assign("x", builder::int(2, sp())),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);
    assert_eq!(errors, 1);
    assert_eq!(
        session.diagnostics.diagnostics()[0].message,
        "Cannot assign to constant 'x'"
    );
}

#[test]
fn missing_struct_field_without_close_candidate_has_no_suggestion() {
    let prog = program(vec![
        struct_def("P", &["x"]),
        assign("p", struct_lit("P", vec![("x", builder::int(1, sp()))])),
        expr_stmt(member("p", "y")),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    let diag = &session.diagnostics.diagnostics()[0];
    assert_eq!(diag.category, Category::Semantic);
    assert_eq!(diag.message, "Field 'y' does not exist in struct 'P'");
    assert!(diag.suggestion.is_none());
}

#[test]
fn misspelled_struct_field_gets_a_suggestion() {
    let prog = program(vec![
        struct_def("Rect", &["width", "height"]),
        assign(
            "r",
            struct_lit(
                "Rect",
                vec![
                    ("width", builder::int(2, sp())),
                    ("height", builder::int(3, sp())),
                ],
            ),
        ),
        expr_stmt(member("r", "heigth")),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    assert_eq!(
        session.diagnostics.diagnostics()[0].suggestion.as_deref(),
        Some("Did you mean 'height'?")
    );
}

#[test]
fn literal_index_out_of_bounds_is_reported() {
    let prog = program(vec![
        assign(
            "xs",
            Expr::List(ListExpr {
                elts: vec![
                    builder::int(1, sp()),
                    builder::int(2, sp()),
                    builder::int(3, sp()),
                ],
                span: sp(),
            }),
        ),
        expr_stmt(Expr::Index(IndexExpr {
            object: Box::new(builder::name("xs", sp())),
            index: Box::new(builder::int(5, sp())),
            span: sp(),
        })),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    let diag = &session.diagnostics.diagnostics()[0];
    assert_eq!(diag.category, Category::ArrayBounds);
    assert!(diag.message.contains("size 3"));
    assert!(diag.message.contains("0..2"));
}

#[test]
fn unused_variable_is_a_warning_not_an_error() {
    let prog = program(vec![
        assign("a", builder::int(1, sp())),
        assign("b", builder::name("a", sp())),
    ]);
    let mut session = CompilationSession::new();
    let (errors, warnings) = analyze(&mut session, &prog);

    assert_eq!(errors, 0);
    assert_eq!(warnings, 1);
    let warning = session
        .diagnostics
        .diagnostics()
        .iter()
        .find(|d| d.category == Category::Warning)
        .unwrap();
    assert_eq!(warning.message, "Variable 'b' is never used");
}

#[test]
fn assignment_through_immutable_pointer_is_rejected() {
    let deref_assign = |ptr: &str, value: Expr| {
        Stmt::Assign(AssignStmt {
            target: builder::unary(
                UnaryOp::Deref,
                builder::name(ptr, sp()),
                Mutability::Immutable,
                sp(),
            ),
            value,
            span: sp(),
        })
    };

    let prog = program(vec![
        assign("x", builder::int(1, sp())),
        assign(
            "p",
            builder::unary(
                UnaryOp::AddrOf,
                builder::name("x", sp()),
                Mutability::Immutable,
                sp(),
            ),
        ),
        deref_assign("p", builder::int(2, sp())),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);
    assert_eq!(errors, 1);
    assert_eq!(
        session.diagnostics.diagnostics()[0].message,
        "Cannot assign through immutable pointer 'p'"
    );

    // The same write through an &mut pointer is fine.
    let prog = program(vec![
        assign("x", builder::int(1, sp())),
        assign(
            "p",
            builder::unary(
                UnaryOp::AddrOf,
                builder::name("x", sp()),
                Mutability::Mutable,
                sp(),
            ),
        ),
        deref_assign("p", builder::int(2, sp())),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);
    assert_eq!(errors, 0);
}

#[test]
fn functions_resolve_forward_and_mutually_recursive_calls() {
    let call = |name: &str| {
        Expr::Call(CallExpr {
            func: Box::new(builder::name(name, sp())),
            args: vec![],
            span: sp(),
        })
    };
    let func = |name: &str, body: Vec<Stmt>| {
        Stmt::FuncDef(FuncDefStmt {
            name: name.to_string(),
            params: vec![],
            body,
            is_pub: false,
            span: sp(),
        })
    };

    let prog = program(vec![
        func("ping", vec![expr_stmt(call("pong"))]),
        func("pong", vec![expr_stmt(call("ping"))]),
        expr_stmt(call("ping")),
    ]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);
    assert_eq!(errors, 0);
}

#[test]
fn struct_defined_inside_a_function_validates_field_access() {
    let body = vec![
        struct_def("P", &["x"]),
        assign("p", struct_lit("P", vec![("x", builder::int(1, sp()))])),
        expr_stmt(member("p", "y")),
    ];
    let prog = program(vec![Stmt::FuncDef(FuncDefStmt {
        name: "make".to_string(),
        params: vec![],
        body,
        is_pub: false,
        span: sp(),
    })]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    assert_eq!(
        session.diagnostics.diagnostics()[0].message,
        "Field 'y' does not exist in struct 'P'"
    );
}

#[test]
fn deeply_nested_statements_degrade_to_one_diagnostic() {
    // Twice the traversal ceiling; the walk must stop instead of blowing
    // the stack, and report the overflow exactly once.
    let mut stmt = expr_stmt(builder::int(1, sp()));
    for _ in 0..2000 {
        stmt = Stmt::If(IfStmt {
            test: builder::int(1, sp()),
            body: vec![stmt],
            orelse: vec![],
            span: sp(),
        });
    }
    let prog = program(vec![stmt]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    assert!(session.diagnostics.diagnostics()[0]
        .message
        .contains("maximum depth"));
}

#[test]
fn undefined_function_call_is_its_own_category() {
    let prog = program(vec![expr_stmt(Expr::Call(CallExpr {
        func: Box::new(builder::name("ghost", sp())),
        args: vec![],
        span: sp(),
    }))]);
    let mut session = CompilationSession::new();
    let (errors, _) = analyze(&mut session, &prog);

    assert_eq!(errors, 1);
    assert_eq!(
        session.diagnostics.diagnostics()[0].category,
        Category::UndefinedFunction
    );
}
