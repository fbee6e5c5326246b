use super::*;
use crate::ast::{AssignOp, DeclKind, ExprKind, LiteralKind, MatchPattern, StmtKind, TypeExprKind, VarDeclKind};
use crate::intern::Interner;
use crate::lexer::Lexer;

fn parse(source: &str) -> (ParseOutcome<'static>, Interner) {
    // Leaking the arena is fine in tests: it just needs to outlive the
    // returned borrows for the duration of the test.
    let arena: &'static AstArena<'static> = Box::leak(Box::new(AstArena::new()));
    let mut interner = Interner::new();
    let tokens = Lexer::new(source, &mut interner).tokenize().expect("lex should succeed");
    let mut parser = Parser::new(source, tokens, arena, &mut interner);
    (parser.parse_program(), interner)
}

#[test]
fn parses_empty_function() {
    let (outcome, _) = parse("fn main() { }");
    assert!(outcome.success());
    assert_eq!(outcome.declarations.len(), 1);
    match outcome.declarations[0].kind {
        DeclKind::Function(f) => {
            assert_eq!(f.params.len(), 0);
            assert!(!f.is_variadic);
        }
        _ => panic!("expected function decl"),
    }
}

#[test]
fn parses_function_with_params_and_return_type() {
    let (outcome, interner) = parse("fn add(a: i32, b: i32): i32 { return a + b; }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    assert_eq!(f.params.len(), 2);
    assert_eq!(interner.resolve(f.params[0].name.name), "a");
    match f.return_type.kind {
        TypeExprKind::Primitive(crate::ast::PrimitiveKind::I32) => {}
        _ => panic!("expected i32 return type"),
    }
}

#[test]
fn pointer_to_array_and_array_of_pointer_parse_distinctly() {
    let (outcome, _) = parse("fn f(a: *[3]i32, b: [3]*i32) { }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    match f.params[0].ty.kind {
        TypeExprKind::Pointer(inner) => match inner.kind {
            TypeExprKind::Array { size: Some(3), .. } => {}
            _ => panic!("expected pointer to sized array"),
        },
        _ => panic!("expected pointer type"),
    }
    match f.params[1].ty.kind {
        TypeExprKind::Array { element, size: Some(3) } => match element.kind {
            TypeExprKind::Pointer(_) => {}
            _ => panic!("expected array of pointers"),
        },
        _ => panic!("expected array type"),
    }
}

#[test]
fn map_generic_args_become_map_type() {
    let (outcome, _) = parse("var counts: Map[string, i32];");
    assert!(outcome.success());
    let DeclKind::Var(v) = outcome.declarations[0].kind else {
        panic!("expected var decl");
    };
    match v.ty.unwrap().kind {
        TypeExprKind::Map { .. } => {}
        _ => panic!("expected Map type"),
    }
}

#[test]
fn const_without_initializer_is_an_error() {
    let (outcome, _) = parse("const limit: i32;");
    assert!(!outcome.success());
    assert_eq!(outcome.errors[0].to_string(), "'const' requires an initializer");
}

#[test]
fn if_condition_is_not_misread_as_struct_literal() {
    let (outcome, _) = parse("fn f(flag: bool) { if flag { } }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected block body");
    };
    match stmts[0].kind {
        StmtKind::If { condition, .. } => match condition.kind {
            ExprKind::Identifier(_) => {}
            _ => panic!("condition should parse as a bare identifier, not a struct literal"),
        },
        _ => panic!("expected if statement"),
    }
}

#[test]
fn struct_literal_parses_in_non_condition_position() {
    let (outcome, interner) = parse("struct Point { x: i32, y: i32 } fn f() { let p = Point{x: 1, y: 2}; }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[1].kind else {
        panic!("expected function decl");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected block body");
    };
    match stmts[0].kind {
        StmtKind::VarDecl { init: Some(expr), .. } => match expr.kind {
            ExprKind::StructLiteral { name, fields, .. } => {
                assert_eq!(interner.resolve(name.name), "Point");
                assert_eq!(fields.len(), 2);
            }
            _ => panic!("expected struct literal"),
        },
        _ => panic!("expected var decl"),
    }
}

#[test]
fn match_statement_parses_enum_variant_and_wildcard_patterns() {
    let source = r#"
        enum Color { Red, Green, Blue }
        fn describe(c: Color): i32 {
            match c {
                Color::Red => return 1;
                _ => return 0;
            }
        }
    "#;
    let (outcome, _) = parse(source);
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[1].kind else {
        panic!("expected function decl");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected block body");
    };
    match stmts[0].kind {
        StmtKind::Match { cases, .. } => {
            assert_eq!(cases.len(), 2);
            match cases[0].pattern {
                MatchPattern::EnumVariant { enum_name: Some(_), .. } => {}
                _ => panic!("expected enum variant pattern"),
            }
            match cases[1].pattern {
                MatchPattern::Wildcard => {}
                _ => panic!("expected wildcard pattern"),
            }
        }
        _ => panic!("expected match statement"),
    }
}

#[test]
fn let_destructure_parses_names_list() {
    let (outcome, interner) = parse("fn f() { let (a, b) = pair; }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected block body");
    };
    match stmts[0].kind {
        StmtKind::LetDestructure { names, .. } => {
            assert_eq!(names.len(), 2);
            assert_eq!(interner.resolve(names[0].name), "a");
            assert_eq!(interner.resolve(names[1].name), "b");
        }
        _ => panic!("expected let destructure"),
    }
}

#[test]
fn compound_assignment_parses_target_op_value() {
    let (outcome, _) = parse("fn f() { var total: i32 = 0; total += 1; }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected block body");
    };
    match stmts[1].kind {
        StmtKind::Assignment { op, .. } => assert_eq!(op, AssignOp::Add),
        _ => panic!("expected assignment statement"),
    }
}

#[test]
fn integer_literal_values_are_computed_for_each_radix() {
    let (outcome, _) = parse("fn f() { var a: i32 = 0xFF; var b: i32 = 0b101; var c: i32 = 0o17; }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected block body");
    };
    let value_of = |idx: usize| match stmts[idx].kind {
        StmtKind::VarDecl { init: Some(expr), .. } => match expr.kind {
            ExprKind::Literal(LiteralKind::Integer { value, .. }) => value,
            _ => panic!("expected integer literal"),
        },
        _ => panic!("expected var decl"),
    };
    assert_eq!(value_of(0), 255);
    assert_eq!(value_of(1), 5);
    assert_eq!(value_of(2), 15);
}

#[test]
fn missing_semicolon_reports_error_and_recovers_at_next_declaration() {
    let source = "fn a() { var x: i32 = 1 } fn b() { }";
    let (outcome, _) = parse(source);
    assert!(!outcome.success());
    assert_eq!(outcome.errors[0].to_string(), "Expected ';'");
    // Recovery should still surface the next top-level declaration.
    assert!(outcome
        .declarations
        .iter()
        .any(|d| matches!(d.kind, DeclKind::Function(f) if f.params.is_empty()) ));
}

#[test]
fn variadic_function_params_parse() {
    let (outcome, _) = parse("fn sum(first: i32, ...) { }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    assert!(f.is_variadic);
    assert_eq!(f.params.len(), 1);
}

#[test]
fn shard_and_import_declarations_parse() {
    let (outcome, interner) = parse("shard geometry; import std_math; cimport stdio;");
    assert!(outcome.success());
    assert_eq!(outcome.declarations.len(), 3);
    match outcome.declarations[0].kind {
        DeclKind::Shard(s) => assert_eq!(interner.resolve(s.name.name), "geometry"),
        _ => panic!("expected shard decl"),
    }
    match outcome.declarations[1].kind {
        DeclKind::Import(i) => assert_eq!(interner.resolve(i.path.name), "std_math"),
        _ => panic!("expected import decl"),
    }
    match outcome.declarations[2].kind {
        DeclKind::CImport(c) => assert_eq!(interner.resolve(c.header.name), "stdio"),
        _ => panic!("expected cimport decl"),
    }
}

#[test]
fn private_names_starting_with_underscore_are_flagged() {
    let (outcome, _) = parse("fn _helper() { }");
    assert!(outcome.success());
    let DeclKind::Function(f) = outcome.declarations[0].kind else {
        panic!("expected function decl");
    };
    assert!(f.is_private);
}
