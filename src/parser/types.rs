//! Type-expression grammar. `*T`/`**T` prefix to pointer,
//! `[N]T`/`[]T` prefix to array, so `*[N]T` and `[N]*T` fall out of plain
//! recursive descent without any lookahead tricks — each prefix just wraps
//! whatever the recursive call for the remainder produces.

use super::{ParseResult, Parser};
use crate::ast::{Identifier, PrimitiveKind, TypeExpr, TypeExprKind};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::{Span, TokenKind};

impl<'s, 'a, 'i> Parser<'s, 'a, 'i> {
    pub(super) fn parse_type(&mut self) -> ParseResult<&'a TypeExpr<'a>> {
        let start = self.peek().span;

        if self.match_kind(&TokenKind::Star) {
            let pointee = self.parse_type()?;
            let span = start.merge(pointee.span);
            return Ok(self.arena.alloc_type(TypeExprKind::Pointer(pointee), span));
        }

        if self.match_kind(&TokenKind::LBracket) {
            let size = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_array_size()?)
            };
            self.consume(TokenKind::RBracket, ParseErrorKind::ExpectedClosingBracket)?;
            let element = self.parse_type()?;
            let span = start.merge(element.span);
            return Ok(self.arena.alloc_type(TypeExprKind::Array { element, size }, span));
        }

        if self.check(&TokenKind::Fn) {
            return self.parse_function_type();
        }

        if self.match_kind(&TokenKind::LParen) {
            return self.parse_tuple_or_grouped_type(start);
        }

        if let Some(prim) = self.primitive_keyword() {
            self.advance();
            return Ok(self.arena.alloc_type(TypeExprKind::Primitive(prim), start));
        }

        let name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        if self.match_kind(&TokenKind::LBracket) {
            return self.parse_generic_args(name, start);
        }
        Ok(self.arena.alloc_type(TypeExprKind::Named(name), start))
    }

    fn parse_array_size(&mut self) -> ParseResult<u64> {
        let token = self.advance().clone();
        match &token.kind {
            TokenKind::Integer { text, .. } => {
                let raw = self.interner.resolve(*text).replace('_', "");
                raw.parse::<u64>().map_err(|_| {
                    ParseError::new(ParseErrorKind::InvalidNumberLiteral(raw), token.span)
                })
            }
            _ => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: "array size".into(),
                    found: token.kind.describe().into(),
                },
                token.span,
            )),
        }
    }

    fn parse_function_type(&mut self) -> ParseResult<&'a TypeExpr<'a>> {
        let start = self.advance().span; // 'fn'
        self.consume(TokenKind::LParen, ParseErrorKind::ExpectedIdentifier)?;
        let mut params = Vec::new();
        let mut is_variadic = false;
        if !self.check(&TokenKind::RParen) {
            loop {
                if self.match_kind(&TokenKind::Ellipsis) {
                    is_variadic = true;
                    break;
                }
                params.push(self.parse_type()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let rparen = self.consume(TokenKind::RParen, ParseErrorKind::ExpectedClosingParen)?.span;
        let return_type = if self.match_kind(&TokenKind::Colon) {
            self.parse_type()?
        } else {
            self.arena.alloc_type(TypeExprKind::Primitive(PrimitiveKind::Void), rparen)
        };
        let span = start.merge(return_type.span);
        Ok(self.arena.alloc_type(
            TypeExprKind::Function {
                params: self.arena.alloc_slice(params),
                return_type,
                is_variadic,
            },
            span,
        ))
    }

    fn parse_tuple_or_grouped_type(&mut self, start: Span) -> ParseResult<&'a TypeExpr<'a>> {
        let mut elements = vec![self.parse_type()?];
        while self.match_kind(&TokenKind::Comma) {
            elements.push(self.parse_type()?);
        }
        let end = self.consume(TokenKind::RParen, ParseErrorKind::ExpectedClosingParen)?.span;
        let span = start.merge(end);
        if elements.len() == 1 {
            return Ok(elements.pop().expect("just checked len == 1"));
        }
        Ok(self.arena.alloc_type(TypeExprKind::Tuple(self.arena.alloc_slice(elements)), span))
    }

    /// `base` was already consumed; `[` has just been consumed too. Builds a
    /// `Map` node for the two-argument `Map[K, V]` spelling, falling back to
    /// a generic instantiation for everything else.
    fn parse_generic_args(&mut self, base: Identifier, start: Span) -> ParseResult<&'a TypeExpr<'a>> {
        let mut args = vec![self.parse_type()?];
        while self.match_kind(&TokenKind::Comma) {
            args.push(self.parse_type()?);
        }
        let end = self.consume(TokenKind::RBracket, ParseErrorKind::ExpectedClosingBracket)?.span;
        let span = start.merge(end);

        if self.interner.resolve(base.name) == "Map" && args.len() == 2 {
            let value = args.pop().expect("checked len == 2");
            let key = args.pop().expect("checked len == 2");
            return Ok(self.arena.alloc_type(TypeExprKind::Map { key, value }, span));
        }

        Ok(self.arena.alloc_type(
            TypeExprKind::GenericInstantiation {
                base,
                args: self.arena.alloc_slice(args),
            },
            span,
        ))
    }

    fn primitive_keyword(&self) -> Option<PrimitiveKind> {
        use PrimitiveKind::*;
        Some(match self.peek().kind {
            TokenKind::I8 => I8,
            TokenKind::I16 => I16,
            TokenKind::I32 => I32,
            TokenKind::I64 => I64,
            TokenKind::U8 => U8,
            TokenKind::U16 => U16,
            TokenKind::U32 => U32,
            TokenKind::U64 => U64,
            TokenKind::F32 => F32,
            TokenKind::F64 => F64,
            TokenKind::Bool => Bool,
            TokenKind::Void => Void,
            _ => return None,
        })
    }
}
