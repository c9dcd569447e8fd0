//! Lowering scenarios: folding, jump patching, text output.

use reef_codegen::{disassemble, lower, Constant, Instruction};
use reef_front::ast::builder;
use reef_front::ast::*;
use reef_front::{InferredType, Span, TypeContext};

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

fn expr_stmt(value: Expr) -> Stmt {
    Stmt::Expr(ExprStmt { value, span: sp() })
}

fn assert_jumps_resolved(instructions: &[Instruction]) {
    for (idx, instr) in instructions.iter().enumerate() {
        if let Some(target) = instr.jump_target() {
            assert!(
                target < instructions.len(),
                "jump at {} targets {} outside the stream of {}",
                idx,
                target,
                instructions.len()
            );
        }
    }
}

#[test]
fn folded_constant_emits_no_add() {
    // const x = 1 + 2 folds at construction; lowering sees a literal.
    let prog = program(vec![Stmt::Const(ConstStmt {
        name: "x".to_string(),
        value: builder::binary(BinOp::Add, builder::int(1, sp()), builder::int(2, sp())),
        span: sp(),
    })]);
    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();

    assert!(!stream
        .iter()
        .any(|i| matches!(i, Instruction::Add { .. })));
    assert!(stream
        .iter()
        .any(|i| matches!(i, Instruction::LoadConst { value: Constant::Int(3), .. })));
    assert!(stream
        .iter()
        .any(|i| matches!(i, Instruction::StoreName { name, .. } if name == "x")));
}

#[test]
fn nested_control_flow_has_valid_jump_targets() {
    // i = 0
    // while i < 3 { if i == 1 { break } else { continue } }
    // for j = 0 to 5 { if j > 2 { continue } }
    let while_body = vec![Stmt::If(IfStmt {
        test: builder::binary(BinOp::Eq, builder::name("i", sp()), builder::int(1, sp())),
        body: vec![Stmt::Break(sp())],
        orelse: vec![Stmt::Continue(sp())],
        span: sp(),
    })];
    let for_body = vec![Stmt::If(IfStmt {
        test: builder::binary(BinOp::Gt, builder::name("j", sp()), builder::int(2, sp())),
        body: vec![Stmt::Continue(sp())],
        orelse: vec![],
        span: sp(),
    })];
    let prog = program(vec![
        assign("i", builder::int(0, sp())),
        Stmt::While(WhileStmt {
            test: builder::binary(BinOp::Lt, builder::name("i", sp()), builder::int(3, sp())),
            body: while_body,
            span: sp(),
        }),
        Stmt::For(ForStmt {
            var: "j".to_string(),
            kind: ForKind::Range {
                start: builder::int(0, sp()),
                end: builder::int(5, sp()),
            },
            body: for_body,
            span: sp(),
        }),
    ]);

    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();
    assert_jumps_resolved(&stream);
    // Both loops produced conditional exits.
    assert!(
        stream
            .iter()
            .filter(|i| matches!(i, Instruction::JumpIfFalse { .. }))
            .count()
            >= 2
    );
}

#[test]
fn string_typed_operands_lower_to_concat() {
    let mut types = TypeContext::new();
    types.get_or_insert("s").ty = InferredType::Str;

    let prog = program(vec![assign(
        "t",
        builder::binary(BinOp::Add, builder::name("s", sp()), builder::name("s", sp())),
    )]);
    let stream = lower(&prog, &types).unwrap();

    assert!(stream
        .iter()
        .any(|i| matches!(i, Instruction::Concat { .. })));
    assert!(!stream.iter().any(|i| matches!(i, Instruction::Add { .. })));
}

#[test]
fn call_records_argument_slots_left_to_right() {
    let prog = program(vec![expr_stmt(Expr::Call(CallExpr {
        func: Box::new(builder::name("foo", sp())),
        args: vec![builder::int(10, sp()), builder::int(20, sp())],
        span: sp(),
    }))]);
    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();

    let call = stream
        .iter()
        .find_map(|i| match i {
            Instruction::Call { name, args, .. } => Some((name.clone(), args.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(call.0, "foo");
    assert_eq!(call.1.len(), 2);

    // Each argument slot is the dst of the matching constant load.
    let loads: Vec<u32> = stream
        .iter()
        .filter_map(|i| match i {
            Instruction::LoadConst { dst, .. } => Some(*dst),
            _ => None,
        })
        .collect();
    assert_eq!(call.1, loads);
}

#[test]
fn funcdef_entry_points_at_first_body_instruction() {
    let prog = program(vec![Stmt::FuncDef(FuncDefStmt {
        name: "double".to_string(),
        params: vec![Param {
            name: "n".to_string(),
            ty: None,
            span: sp(),
        }],
        body: vec![Stmt::Return(ReturnStmt {
            value: Some(builder::binary(
                BinOp::Mul,
                builder::name("n", sp()),
                builder::int(2, sp()),
            )),
            span: sp(),
        })],
        is_pub: false,
        span: sp(),
    })]);
    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();

    let (idx, entry) = stream
        .iter()
        .enumerate()
        .find_map(|(idx, i)| match i {
            Instruction::FuncDef { entry, .. } => Some((idx, *entry)),
            _ => None,
        })
        .unwrap();
    assert_eq!(entry, idx + 1);
    assert!(entry < stream.len());
}

#[test]
fn break_outside_loop_is_an_error() {
    let prog = program(vec![Stmt::Break(sp())]);
    let types = TypeContext::new();
    let err = lower(&prog, &types).unwrap_err();
    assert!(err.to_string().contains("Break outside loop"));
}

#[test]
fn deeply_nested_statements_error_instead_of_overflowing() {
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
    let types = TypeContext::new();
    let err = lower(&prog, &types).unwrap_err();
    assert!(err.to_string().contains("maximum depth"));
}

#[test]
fn string_iteration_lowers_by_index() {
    let prog = program(vec![
        assign("s", builder::string("ab", sp())),
        Stmt::For(ForStmt {
            var: "c".to_string(),
            kind: ForKind::Chars {
                string: builder::name("s", sp()),
            },
            body: vec![Stmt::Print(PrintStmt {
                value: builder::name("c", sp()),
                span: sp(),
            })],
            span: sp(),
        }),
    ]);
    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();

    assert_jumps_resolved(&stream);
    assert!(stream.iter().any(|i| matches!(i, Instruction::StrLen { .. })));
    assert!(stream.iter().any(|i| matches!(i, Instruction::Index { .. })));
}

#[test]
fn disassembly_uses_documented_text_format() {
    let prog = program(vec![
        assign("x", builder::int(1, sp())),
        assign("y", builder::int(2, sp())),
        Stmt::If(IfStmt {
            test: builder::binary(BinOp::Lt, builder::name("x", sp()), builder::name("y", sp())),
            body: vec![expr_stmt(builder::binary(
                BinOp::Add,
                builder::name("x", sp()),
                builder::name("y", sp()),
            ))],
            orelse: vec![],
            span: sp(),
        }),
    ]);
    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();
    let text = disassemble(&stream);

    assert!(text.contains("ADD %r"));
    assert!(text.contains("JUMP_IF_FALSE "));
    assert!(text.contains("STORE_NAME x"));
}

#[test]
fn struct_access_carries_field_names() {
    let prog = program(vec![
        assign(
            "p",
            Expr::StructLit(StructLitExpr {
                name: "Point".to_string(),
                fields: vec![("x".to_string(), builder::int(1, sp()))],
                span: sp(),
            }),
        ),
        expr_stmt(Expr::Member(MemberExpr {
            object: Box::new(builder::name("p", sp())),
            field: "x".to_string(),
            span: sp(),
        })),
    ]);
    let types = TypeContext::new();
    let stream = lower(&prog, &types).unwrap();

    assert!(stream
        .iter()
        .any(|i| matches!(i, Instruction::NewStruct { name, .. } if name == "Point")));
    assert!(stream
        .iter()
        .any(|i| matches!(i, Instruction::SetField { field, .. } if field == "x")));
    assert!(stream
        .iter()
        .any(|i| matches!(i, Instruction::GetField { field, .. } if field == "x")));
}
