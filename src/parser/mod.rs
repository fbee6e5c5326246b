//! Recursive-descent parser: turns a token stream into the
//! arena-allocated AST. Parse errors are fatal to the current top-level
//! declaration only — `parse_program` resynchronizes at the next
//! declaration keyword and keeps collecting diagnostics instead of
//! aborting on the first one.

mod decl;
mod expr;
mod stmt;
mod types;

#[cfg(test)]
mod tests;

use crate::ast::{AstArena, Decl, Identifier};
use crate::error::{ParseError, ParseErrorKind};
use crate::intern::Interner;
use crate::token::{Span, Token, TokenKind};

pub(crate) type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'s, 'a, 'i> {
    tokens: Vec<Token>,
    current: usize,
    arena: &'a AstArena<'a>,
    interner: &'i mut Interner,
    _source: &'s str,
    /// Suppressed while parsing `if`/`while`/`for`/`match` conditions so
    /// `if cond { ... }` never misreads the block as a struct literal.
    allow_struct_literal: bool,
}

/// Result of parsing a whole file: the declarations that were recovered
/// plus every diagnostic raised along the way. `success` only when
/// `errors` is empty.
pub struct ParseOutcome<'a> {
    pub declarations: Vec<&'a Decl<'a>>,
    pub errors: Vec<ParseError>,
}

impl<'a> ParseOutcome<'a> {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

const TOP_LEVEL_KEYWORDS: &[TokenKind] = &[
    TokenKind::Fn,
    TokenKind::Struct,
    TokenKind::Var,
    TokenKind::Const,
    TokenKind::Enum,
    TokenKind::Import,
    TokenKind::CImport,
    TokenKind::Shard,
];

impl<'s, 'a, 'i> Parser<'s, 'a, 'i> {
    pub fn new(source: &'s str, tokens: Vec<Token>, arena: &'a AstArena<'a>, interner: &'i mut Interner) -> Self {
        Parser {
            tokens,
            current: 0,
            arena,
            interner,
            _source: source,
            allow_struct_literal: true,
        }
    }

    /// Runs `f` with struct-literal parsing suppressed, restoring the
    /// previous setting afterward (handles nested conditions correctly).
    pub(super) fn without_struct_literals<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = self.allow_struct_literal;
        self.allow_struct_literal = false;
        let result = f(self);
        self.allow_struct_literal = saved;
        result
    }

    pub fn parse_program(&mut self) -> ParseOutcome<'a> {
        let mut declarations = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_declaration() {
                Ok(decl) => declarations.push(decl),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        ParseOutcome { declarations, errors }
    }

    /// Skips tokens until the next top-level keyword (or EOF), so one bad
    /// declaration doesn't swallow the rest of the file.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if TOP_LEVEL_KEYWORDS
                .iter()
                .any(|k| std::mem::discriminant(k) == std::mem::discriminant(&self.peek().kind))
            {
                return;
            }
            self.advance();
        }
    }

    // ---- token navigation ---------------------------------------------

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, err: ParseErrorKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(err, self.peek().span))
        }
    }

    pub(crate) fn consume_identifier(&mut self, err: ParseErrorKind) -> ParseResult<Identifier> {
        if let TokenKind::Identifier(name) = self.peek().kind {
            let span = self.peek().span;
            self.advance();
            Ok(Identifier::new(name, span))
        } else {
            Err(ParseError::new(err, self.peek().span))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.peek().kind.describe().to_string(),
            },
            self.peek().span,
        )
    }

    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous().span)
    }
}
