//! Read-only control-flow shape checks, run over a `defer` or lambda
//! body before the real type-checking visit.
//!
//! A `break`/`continue` nested inside a `while`/`for` that itself lives
//! inside the checked subtree is absorbed by that loop — it is not a
//! violation, since it never escapes the subtree. A `return` is never
//! absorbed by a loop. Both searches stop at a nested lambda literal:
//! its body is a separate scope.

use crate::ast::{Stmt, StmtKind};

/// True if `stmt` contains a `return` anywhere, or a `break`/`continue`
/// not absorbed by a loop nested within `stmt` itself.
pub fn contains_control_flow(stmt: &Stmt) -> bool {
    contains_return(stmt) || contains_unabsorbed_break_or_continue(stmt)
}

/// True if `stmt` contains a `break`/`continue` not absorbed by a loop
/// nested within `stmt` itself.
pub fn contains_break_or_continue(stmt: &Stmt) -> bool {
    contains_unabsorbed_break_or_continue(stmt)
}

fn contains_return(stmt: &Stmt) -> bool {
    match stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Block(stmts) => stmts.iter().any(|stmt| contains_return(stmt)),
        StmtKind::If {
            then_branch, else_branch, ..
        } => contains_return(then_branch) || else_branch.is_some_and(contains_return),
        StmtKind::While { body, .. } | StmtKind::For { body, .. } => contains_return(body),
        StmtKind::Defer(body) => contains_return(body),
        StmtKind::Match { cases, .. } => cases.iter().any(|c| contains_return(c.body)),
        StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Assignment { .. }
        | StmtKind::VarDecl { .. }
        | StmtKind::LetDestructure { .. }
        | StmtKind::Expr(_) => false,
    }
}

fn contains_unabsorbed_break_or_continue(stmt: &Stmt) -> bool {
    match stmt.kind {
        StmtKind::Break | StmtKind::Continue => true,
        StmtKind::Block(stmts) => stmts.iter().any(|stmt| contains_unabsorbed_break_or_continue(stmt)),
        StmtKind::If {
            then_branch, else_branch, ..
        } => contains_unabsorbed_break_or_continue(then_branch) || else_branch.is_some_and(contains_unabsorbed_break_or_continue),
        // A break/continue inside a nested loop belongs to that loop.
        StmtKind::While { .. } | StmtKind::For { .. } => false,
        StmtKind::Defer(body) => contains_unabsorbed_break_or_continue(body),
        StmtKind::Match { cases, .. } => cases.iter().any(|c| contains_unabsorbed_break_or_continue(c.body)),
        StmtKind::Return(_) | StmtKind::Assignment { .. } | StmtKind::VarDecl { .. } | StmtKind::LetDestructure { .. } | StmtKind::Expr(_) => {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstArena, DeclKind};
    use crate::intern::Interner;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn parse_body(source: &str) -> &'static Stmt<'static> {
        let arena: &'static AstArena<'static> = Box::leak(Box::new(AstArena::new()));
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, &mut interner).tokenize().expect("lex ok");
        let mut parser = Parser::new(source, tokens, arena, &mut interner);
        let outcome = parser.parse_program();
        assert!(outcome.success());
        let DeclKind::Function(f) = outcome.declarations[0].kind else {
            panic!("expected function decl");
        };
        f.body
    }

    #[test]
    fn block_with_plain_statements_has_no_control_flow() {
        let body = parse_body("fn f() { var x: i32 = 1; x = x + 1; }");
        assert!(!contains_control_flow(body));
    }

    #[test]
    fn nested_return_is_detected() {
        let body = parse_body("fn f() { if true { return; } }");
        assert!(contains_control_flow(body));
    }

    #[test]
    fn break_inside_nested_loop_is_absorbed_and_not_flagged() {
        let body = parse_body("fn f() { while true { break; } }");
        assert!(!contains_control_flow(body));
        assert!(!contains_break_or_continue(body));
    }

    #[test]
    fn bare_break_not_inside_any_nested_loop_is_flagged() {
        let body = parse_body("fn f() { break; }");
        assert!(contains_control_flow(body));
        assert!(contains_break_or_continue(body));
    }

    #[test]
    fn return_inside_nested_loop_still_counts() {
        let body = parse_body("fn f() { while true { return; } }");
        assert!(contains_control_flow(body));
    }
}
