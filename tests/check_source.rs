//! End-to-end scenarios, run through the public `truclang::check_source`
//! entry point rather than any one internal stage.

use truclang::ast::{AstArena, BinaryOpKind, DeclKind, ExprKind, StmtKind};
use truclang::check_source;

fn run(source: &str) -> (bool, Vec<String>) {
    let arena = AstArena::new();
    let result = check_source(source, "test.truk", &arena);
    (result.ok, result.errors.iter().map(|d| d.message.clone()).collect())
}

#[test]
fn empty_main_parses_and_checks_clean() {
    let arena = AstArena::new();
    let result = check_source("fn main() {}", "test.truk", &arena);
    assert!(result.ok);
    assert_eq!(result.declarations.len(), 1);
    let DeclKind::Function(f) = result.declarations[0].kind else {
        panic!("expected a function declaration");
    };
    assert_eq!(f.params.len(), 0);
    assert!(matches!(f.body.kind, StmtKind::Block(stmts) if stmts.is_empty()));
}

#[test]
fn self_referential_struct_pointer_field_is_legal_but_dot_access_is_flagged() {
    let source = "
        struct Node { value: i32, next: *Node }
        fn sum(head: *Node): i32 {
            var s: i32 = 0;
            var c: *Node = head;
            while c != nil {
                s = s + c.value;
                c = c.next;
            }
            return s;
        }
    ";
    let (ok, errors) = run(source);
    assert!(!ok);
    assert!(errors.iter().any(|m| m.contains("Cannot use '.' on pointer type, use '->' instead")));
}

#[test]
fn float_literal_assigned_to_integer_variable_is_a_type_mismatch() {
    let (ok, errors) = run("fn test() { var x: i32 = 3.14; }");
    assert!(!ok);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Type mismatch"));
}

#[test]
fn break_inside_a_c_style_for_loop_is_legal_and_its_init_binding_does_not_leak() {
    let source = "fn f() { for i = 0; i < 10; i = i + 1 { if i == 5 { break; } } }";
    let (ok, errors) = run(source);
    assert!(ok, "unexpected errors: {:?}", errors);
}

#[test]
fn for_loop_init_binding_is_not_visible_after_the_loop() {
    let (ok, errors) = run("fn f(): i32 { for i = 0; i < 10; i = i + 1 { } return i; }");
    assert!(!ok);
    assert!(errors.iter().any(|m| m.contains("Undefined identifier")));
}

#[test]
fn bare_for_loop_with_no_clauses_is_an_infinite_loop_shell() {
    let (ok, errors) = run("fn f() { for { break; } }");
    assert!(ok, "unexpected errors: {:?}", errors);
}

#[test]
fn lambda_capturing_an_enclosing_local_is_rejected() {
    let source = "fn outer() { var x: i32 = 1; var l: fn(): i32 = fn(): i32 { return x; }; }";
    let (ok, errors) = run(source);
    assert!(!ok);
    assert!(errors
        .iter()
        .any(|m| m == "Lambda cannot capture variable 'x' from enclosing scope. Use context parameter instead."));
}

#[test]
fn defer_containing_return_is_rejected() {
    let (ok, errors) = run("fn test() { defer { return; } }");
    assert!(!ok);
    assert!(errors.iter().any(|m| m.contains("Defer cannot contain return, break, or continue statements")));
}

#[test]
fn function_with_non_void_return_type_must_return_a_value() {
    let (ok, errors) = run("fn test(): i32 { return; }");
    assert!(!ok);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Function must return a value"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let arena = AstArena::new();
    let source = "fn f(a: i32, b: i32, c: i32): i32 { return a + b * c; }";
    let result = check_source(source, "test.truk", &arena);
    assert!(result.ok);
    let DeclKind::Function(f) = result.declarations[0].kind else {
        panic!("expected a function declaration");
    };
    let StmtKind::Block(stmts) = f.body.kind else {
        panic!("expected a block body");
    };
    let StmtKind::Return(values) = stmts[0].kind else {
        panic!("expected a return statement");
    };
    let ExprKind::Binary { op, right, .. } = values[0].kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOpKind::Add);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOpKind::Mul, .. }));
}

#[test]
fn undefined_identifier_is_reported_through_the_public_api() {
    let (ok, errors) = run("fn f(): i32 { return missing_name; }");
    assert!(!ok);
    assert!(errors.iter().any(|m| m.contains("Undefined identifier")));
}

#[test]
fn parse_error_in_one_declaration_does_not_suppress_the_rest() {
    let (ok, errors) = run("fn broken() { var x: i32 = ; } fn fine(): i32 { return 1; }");
    assert!(!ok);
    assert!(!errors.is_empty());
}
