//! truclang: lexer, parser, and semantic analyzer for the source
//! language's front end. This crate owns everything up to
//! "is this program well-formed" — lexical scanning, recursive-descent
//! parsing into an arena-allocated AST, scope/symbol collection, type
//! checking, control-flow shape checks, and lambda capture validation.
//! Code generation, the runtime, and the package manager are out of
//! scope; [`collaborators`] documents the seams where they attach.

pub mod arena;
pub mod ast;
pub mod collaborators;
pub mod diagnostics;
pub mod error;
pub mod intern;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod semantics;
pub mod style;
pub mod token;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{AstArena, Decl};
pub use diagnostics::{Diagnostic, DiagnosticChannel};
pub use error::{ParseError, ParseErrorKind};
pub use intern::Interner;

use lexer::Lexer;
use parser::Parser;

/// Outcome of running the full pipeline over one file. `ok` is
/// `false` whenever any diagnostic was raised, whether by the lexer, the
/// parser, or semantic analysis — there is no partial-success state,
/// only `ok` or a non-empty `errors`.
#[derive(Debug, serde::Serialize)]
pub struct CompileResult<'a> {
    pub ok: bool,
    #[serde(skip)]
    pub declarations: Vec<&'a Decl<'a>>,
    pub errors: Vec<Diagnostic>,
}

/// Runs lexing, parsing, and semantic analysis over `source` and reports
/// every diagnostic gathered along the way. The caller owns `arena`
/// (and so the returned declarations) since the AST is arena-allocated
/// and this function has nowhere else to put it.
pub fn check_source<'a>(source: &str, file: &str, arena: &'a AstArena<'a>) -> CompileResult<'a> {
    let mut interner = Interner::new();

    let tokens = match Lexer::new(source, &mut interner).tokenize() {
        Ok(tokens) => tokens,
        Err(err) => {
            return CompileResult {
                ok: false,
                declarations: Vec::new(),
                errors: vec![Diagnostic::new(err.to_string(), file.to_string(), err.span.start)],
            };
        }
    };

    let mut parser = Parser::new(source, tokens, arena, &mut interner);
    let outcome = parser.parse_program();

    let mut errors: Vec<Diagnostic> = outcome
        .errors
        .iter()
        .map(|e| Diagnostic::new(e.to_string(), file.to_string(), e.span.start))
        .collect();

    let semantic_diagnostics = semantics::check_source(&outcome.declarations, &interner, file);
    errors.extend(semantic_diagnostics.into_vec());

    CompileResult {
        ok: errors.is_empty(),
        declarations: outcome.declarations,
        errors,
    }
}
