//! Semantic analysis: collect scopes, resolve and check types, then
//! validate lambda captures. Type resolution and type checking are one
//! pass here (`checker` both resolves and checks), not a separate
//! resolution stage followed by a checking visit.

pub mod builtins;
pub mod capture;
pub mod checker;
pub mod collector;
pub mod control_flow;
pub mod types;

use crate::ast::Decl;
use crate::diagnostics::DiagnosticChannel;
use crate::intern::Interner;

/// Runs the full semantic analysis pipeline over one file's declarations
/// and returns every diagnostic gathered along the way. Each stage runs
/// regardless of whether an earlier one reported anything — diagnostics
/// accumulate, they never abort the walk, across stages as much as
/// within one.
pub fn check_source(declarations: &[&Decl], interner: &Interner, file: &str) -> DiagnosticChannel {
    let mut diagnostics = DiagnosticChannel::new();

    let table = collector::collect(declarations, interner, file, &mut diagnostics);

    let type_diagnostics = checker::check(declarations, interner, file);
    for d in type_diagnostics.iter() {
        diagnostics.report(d.message.clone(), d.file.clone(), crate::token::Span::new(d.offset, d.offset));
    }

    capture::validate(declarations, &table, interner, file, &mut diagnostics);

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstArena;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn check(source: &str) -> DiagnosticChannel {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, &mut interner).tokenize().expect("lex ok");
        let mut parser = Parser::new(source, tokens, &arena, &mut interner);
        let outcome = parser.parse_program();
        assert!(outcome.success());
        check_source(&outcome.declarations, &interner, "test.truk")
    }

    #[test]
    fn well_formed_program_has_no_diagnostics() {
        let diagnostics = check("fn add(a: i32, b: i32): i32 { return a + b; }");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn duplicate_declarations_and_type_errors_both_surface() {
        let source = "var x: i32 = 1; var x: i32 = 2; fn f(): i32 { return true; }";
        let diagnostics = check(source);
        assert!(diagnostics.iter().any(|d| d.message.contains("Duplicate declaration")));
        assert!(diagnostics.iter().any(|d| d.message.contains("Return type mismatch")));
    }

    #[test]
    fn capture_violation_surfaces_alongside_type_diagnostics() {
        let source = "fn f() { var x: i32 = 1; var cb: fn(): i32 = fn(): i32 { return x; }; }";
        let diagnostics = check(source);
        assert!(diagnostics.iter().any(|d| d.message.contains("cannot capture variable 'x'")));
    }
}
