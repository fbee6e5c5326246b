//! Parse-error taxonomy. Parse errors are fatal for the
//! *current declaration* only — the parser resynchronizes at the next
//! top-level keyword and keeps going, so one bad file can still yield
//! several diagnostics.

use std::fmt;

use crate::token::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: String, found: String },
    ExpectedFunctionName,
    ExpectedStructName,
    ExpectedEnumName,
    ExpectedIdentifier,
    ExpectedTypeAnnotation,
    ExpectedSemicolon,
    ExpectedClosingParen,
    ExpectedClosingBrace,
    ExpectedClosingBracket,
    ExpectedColon,
    UnterminatedString,
    InvalidNumberLiteral(String),
    MissingInitializer,
    MissingTypeAnnotation,
    Custom(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseErrorKind::*;
        match self {
            UnexpectedToken { expected, found } => {
                write!(f, "Expected {} but found {}", expected, found)
            }
            ExpectedFunctionName => write!(f, "Expected function name"),
            ExpectedStructName => write!(f, "Expected struct name"),
            ExpectedEnumName => write!(f, "Expected enum name"),
            ExpectedIdentifier => write!(f, "Expected identifier"),
            ExpectedTypeAnnotation => write!(f, "Expected ':' in type annotation"),
            ExpectedSemicolon => write!(f, "Expected ';'"),
            ExpectedClosingParen => write!(f, "Expected ')'"),
            ExpectedClosingBrace => write!(f, "Expected '}}'"),
            ExpectedClosingBracket => write!(f, "Expected ']'"),
            ExpectedColon => write!(f, "Expected ':'"),
            UnterminatedString => write!(f, "Unterminated string literal"),
            InvalidNumberLiteral(text) => write!(f, "Invalid number literal: {}", text),
            MissingInitializer => write!(f, "'const' requires an initializer"),
            MissingTypeAnnotation => write!(f, "Expected explicit type annotation"),
            Custom(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_semicolon_message_is_stable() {
        let e = ParseError::new(ParseErrorKind::ExpectedSemicolon, Span::new(3, 4));
        assert_eq!(e.to_string(), "Expected ';'");
    }

    #[test]
    fn expected_type_annotation_message_is_stable() {
        let e = ParseError::new(ParseErrorKind::ExpectedTypeAnnotation, Span::new(0, 1));
        assert_eq!(e.to_string(), "Expected ':' in type annotation");
    }

    #[test]
    fn unexpected_token_includes_both_names() {
        let e = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "')'".into(),
                found: "';'".into(),
            },
            Span::new(0, 1),
        );
        assert!(e.to_string().contains("')'"));
        assert!(e.to_string().contains("';'"));
    }
}
