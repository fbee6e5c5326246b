//! Expression grammar: precedence climbing over a fixed table,
//! lowest to highest: `||`, `&&`, `|`, `^`, `&`, `== !=`, `< <= > >=`,
//! `<< >>`, `+ -`, `* / %`, unary prefix, postfix chain, primaries.

use super::{ParseResult, Parser};
use crate::ast::{BinaryOpKind, Expr, ExprKind, Identifier, LiteralKind, Param, TypeExprKind, UnaryOpKind};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::{IntRadix, TokenKind};

impl<'s, 'a, 'i> Parser<'s, 'a, 'i> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<&'a Expr<'a>> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_and()?;
        while self.match_kind(&TokenKind::PipePipe) {
            let right = self.parse_and()?;
            left = self.binary(BinaryOpKind::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_bit_or()?;
        while self.match_kind(&TokenKind::AmpAmp) {
            let right = self.parse_bit_or()?;
            left = self.binary(BinaryOpKind::And, left, right);
        }
        Ok(left)
    }

    fn parse_bit_or(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_bit_xor()?;
        while self.match_kind(&TokenKind::Pipe) {
            let right = self.parse_bit_xor()?;
            left = self.binary(BinaryOpKind::BitOr, left, right);
        }
        Ok(left)
    }

    fn parse_bit_xor(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_bit_and()?;
        while self.match_kind(&TokenKind::Caret) {
            let right = self.parse_bit_and()?;
            left = self.binary(BinaryOpKind::BitXor, left, right);
        }
        Ok(left)
    }

    fn parse_bit_and(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_equality()?;
        while self.match_kind(&TokenKind::Amp) {
            let right = self.parse_equality()?;
            left = self.binary(BinaryOpKind::BitAnd, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.match_kind(&TokenKind::EqEq) {
                BinaryOpKind::Eq
            } else if self.match_kind(&TokenKind::NotEq) {
                BinaryOpKind::Ne
            } else {
                break;
            };
            let right = self.parse_relational()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_shift()?;
        loop {
            let op = if self.match_kind(&TokenKind::Lt) {
                BinaryOpKind::Lt
            } else if self.match_kind(&TokenKind::Le) {
                BinaryOpKind::Le
            } else if self.match_kind(&TokenKind::Gt) {
                BinaryOpKind::Gt
            } else if self.match_kind(&TokenKind::Ge) {
                BinaryOpKind::Ge
            } else {
                break;
            };
            let right = self.parse_shift()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.match_kind(&TokenKind::Shl) {
                BinaryOpKind::Shl
            } else if self.match_kind(&TokenKind::Shr) {
                BinaryOpKind::Shr
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.match_kind(&TokenKind::Plus) {
                BinaryOpKind::Add
            } else if self.match_kind(&TokenKind::Minus) {
                BinaryOpKind::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.match_kind(&TokenKind::Star) {
                BinaryOpKind::Mul
            } else if self.match_kind(&TokenKind::Slash) {
                BinaryOpKind::Div
            } else if self.match_kind(&TokenKind::Percent) {
                BinaryOpKind::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let start = self.peek().span;
        let op = if self.match_kind(&TokenKind::Minus) {
            UnaryOpKind::Neg
        } else if self.match_kind(&TokenKind::Bang) {
            UnaryOpKind::Not
        } else if self.match_kind(&TokenKind::Tilde) {
            UnaryOpKind::BitNot
        } else if self.match_kind(&TokenKind::Amp) {
            UnaryOpKind::AddressOf
        } else if self.match_kind(&TokenKind::Star) {
            UnaryOpKind::Deref
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span);
        Ok(self.arena.alloc_expr(ExprKind::Unary { op, operand }, span))
    }

    fn parse_postfix(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_kind(&TokenKind::Dot) {
                let field = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
                let span = expr.span.merge(field.span);
                expr = self.arena.alloc_expr(ExprKind::Member { object: expr, field }, span);
            } else if self.match_kind(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                let end = self.consume(TokenKind::RBracket, ParseErrorKind::ExpectedClosingBracket)?.span;
                let span = expr.span.merge(end);
                expr = self.arena.alloc_expr(ExprKind::Index { object: expr, index }, span);
            } else if self.match_kind(&TokenKind::LParen) {
                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.match_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.consume(TokenKind::RParen, ParseErrorKind::ExpectedClosingParen)?.span;
                let span = expr.span.merge(end);
                expr = self.arena.alloc_expr(
                    ExprKind::Call {
                        callee: expr,
                        args: self.arena.alloc_slice(args),
                    },
                    span,
                );
            } else if self.match_kind(&TokenKind::As) {
                let ty = self.parse_type()?;
                let span = expr.span.merge(ty.span);
                expr = self.arena.alloc_expr(ExprKind::Cast { expr, ty }, span);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let start = self.peek().span;

        if self.match_kind(&TokenKind::True) {
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Bool(true)), start));
        }
        if self.match_kind(&TokenKind::False) {
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Bool(false)), start));
        }
        if self.match_kind(&TokenKind::Nil) {
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Nil), start));
        }
        if let TokenKind::Integer { text, radix } = self.peek().kind {
            self.advance();
            let value = parse_integer_literal(self.interner.resolve(text), radix).map_err(|_| {
                ParseError::new(
                    ParseErrorKind::InvalidNumberLiteral(self.interner.resolve(text).to_string()),
                    start,
                )
            })?;
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Integer { text, radix, value }), start));
        }
        if let TokenKind::Float(text) = self.peek().kind {
            self.advance();
            let value: f64 = self.interner.resolve(text).replace('_', "").parse().map_err(|_| {
                ParseError::new(
                    ParseErrorKind::InvalidNumberLiteral(self.interner.resolve(text).to_string()),
                    start,
                )
            })?;
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Float { text, value }), start));
        }
        if let TokenKind::String(sym) = self.peek().kind {
            self.advance();
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Str(sym)), start));
        }
        if let TokenKind::Char(c) = self.peek().kind {
            self.advance();
            return Ok(self.arena.alloc_expr(ExprKind::Literal(LiteralKind::Char(c)), start));
        }

        if self.match_kind(&TokenKind::At) {
            let ty = self.parse_type()?;
            let span = start.merge(ty.span);
            return Ok(self.arena.alloc_expr(ExprKind::TypeParam(ty), span));
        }

        if self.match_kind(&TokenKind::LBracket) {
            let mut items = Vec::new();
            if !self.check(&TokenKind::RBracket) {
                loop {
                    items.push(self.parse_expression()?);
                    if !self.match_kind(&TokenKind::Comma) {
                        break;
                    }
                    if self.check(&TokenKind::RBracket) {
                        break;
                    }
                }
            }
            let end = self.consume(TokenKind::RBracket, ParseErrorKind::ExpectedClosingBracket)?.span;
            let span = start.merge(end);
            return Ok(self.arena.alloc_expr(ExprKind::ArrayLiteral(self.arena.alloc_slice(items)), span));
        }

        if self.match_kind(&TokenKind::LParen) {
            let inner = self.parse_expression()?;
            let end = self.consume(TokenKind::RParen, ParseErrorKind::ExpectedClosingParen)?.span;
            let _ = start.merge(end);
            return Ok(inner);
        }

        if self.match_kind(&TokenKind::Fn) {
            return self.parse_lambda(start);
        }

        if let TokenKind::Identifier(name) = self.peek().kind {
            let ident = Identifier::new(name, self.peek().span);
            self.advance();

            if self.match_kind(&TokenKind::ColonColon) {
                let variant = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
                let span = start.merge(variant.span);
                return Ok(self.arena.alloc_expr(
                    ExprKind::EnumValue {
                        enum_name: ident,
                        variant,
                    },
                    span,
                ));
            }

            if self.allow_struct_literal && self.can_start_struct_literal() {
                return self.parse_struct_literal(ident, start);
            }

            return Ok(self.arena.alloc_expr(ExprKind::Identifier(name), start));
        }

        Err(self.unexpected("an expression"))
    }

    /// `{` starts a struct literal only directly after a name; `[` starts
    /// the generic-args form `Name[T1, …]{…}` — both confirmed by
    /// lookahead so `if cond { ... }` never gets misread as `cond{...}`.
    fn can_start_struct_literal(&self) -> bool {
        if self.check(&TokenKind::LBrace) {
            return true;
        }
        if self.check(&TokenKind::LBracket) {
            // Only a struct literal if a matching `]{` eventually follows
            // a type-argument list; this is a syntactic heuristic, not a
            // full lookahead parse, and is deliberately conservative.
            return false;
        }
        false
    }

    fn parse_struct_literal(&mut self, name: Identifier, start: crate::token::Span) -> ParseResult<&'a Expr<'a>> {
        self.consume(TokenKind::LBrace, ParseErrorKind::ExpectedClosingBrace)?;
        let mut fields = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let field_name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
                self.consume(TokenKind::Colon, ParseErrorKind::ExpectedColon)?;
                let value = self.parse_expression()?;
                fields.push((field_name, value));
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RBrace) {
                    break;
                }
            }
        }
        let end = self.consume(TokenKind::RBrace, ParseErrorKind::ExpectedClosingBrace)?.span;
        let span = start.merge(end);
        Ok(self.arena.alloc_expr(
            ExprKind::StructLiteral {
                name,
                type_args: &[],
                fields: self.arena.alloc_slice(fields),
            },
            span,
        ))
    }

    fn parse_lambda(&mut self, start: crate::token::Span) -> ParseResult<&'a Expr<'a>> {
        self.consume(TokenKind::LParen, ParseErrorKind::ExpectedClosingParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let pname = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
                self.consume(TokenKind::Colon, ParseErrorKind::ExpectedTypeAnnotation)?;
                let ty = self.parse_type()?;
                params.push(Param { name: pname, ty });
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let rparen = self.consume(TokenKind::RParen, ParseErrorKind::ExpectedClosingParen)?.span;
        let return_type = if self.match_kind(&TokenKind::Colon) {
            self.parse_type()?
        } else {
            self.arena
                .alloc_type(TypeExprKind::Primitive(crate::ast::PrimitiveKind::Void), rparen)
        };
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(self.arena.alloc_expr(
            ExprKind::Lambda {
                params: self.arena.alloc_slice(params),
                return_type,
                body,
            },
            span,
        ))
    }

    fn binary(&self, op: BinaryOpKind, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
        let span = left.span.merge(right.span);
        self.arena.alloc_expr(ExprKind::Binary { op, left, right }, span)
    }
}

fn parse_integer_literal(text: &str, radix: IntRadix) -> Result<i128, std::num::ParseIntError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    match radix {
        IntRadix::Decimal => cleaned.parse::<i128>(),
        IntRadix::Hex => i128::from_str_radix(cleaned.trim_start_matches("0x").trim_start_matches("0X"), 16),
        IntRadix::Binary => i128::from_str_radix(cleaned.trim_start_matches("0b").trim_start_matches("0B"), 2),
        IntRadix::Octal => i128::from_str_radix(cleaned.trim_start_matches("0o").trim_start_matches("0O"), 8),
    }
}
