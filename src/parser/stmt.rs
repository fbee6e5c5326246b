//! Statement grammar. Simple statements end in `;`; block-like
//! constructs (`if`, `while`, `for`, `match`, `defer`, blocks, and
//! declarations) are not semicolon-terminated.

use super::{ParseResult, Parser};
use crate::ast::{AssignOp, ExprKind, MatchCase, MatchPattern, Stmt, StmtKind, VarDeclKind};
use crate::error::ParseErrorKind;
use crate::token::TokenKind;

impl<'s, 'a, 'i> Parser<'s, 'a, 'i> {
    pub(super) fn parse_block(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.consume(TokenKind::LBrace, ParseErrorKind::ExpectedClosingBrace)?.span;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        let end = self.consume(TokenKind::RBrace, ParseErrorKind::ExpectedClosingBrace)?.span;
        let span = start.merge(end);
        Ok(self.arena.alloc_stmt(StmtKind::Block(self.arena.alloc_slice(statements)), span))
    }

    fn parse_statement(&mut self) -> ParseResult<&'a Stmt<'a>> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::Defer => self.parse_defer(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Var | TokenKind::Const => self.parse_local_var_decl(),
            TokenKind::Let => self.parse_let_decl(),
            _ => self.parse_assignment_or_expr_statement(),
        }
    }

    fn parse_if(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'if'
        let condition = self.without_struct_literals(|p| p.parse_expression())?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.match_kind(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'while'
        let condition = self.without_struct_literals(|p| p.parse_expression())?;
        let body = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(StmtKind::While { condition, body }, span))
    }

    /// `for init? ';' cond? ';' post? block`. A bare `for { ... }` (all
    /// three clauses omitted, no semicolons at all) is also legal.
    fn parse_for(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'for'

        if self.check(&TokenKind::LBrace) {
            let body = self.parse_block()?;
            let span = self.span_from(start);
            return Ok(self.arena.alloc_stmt(
                StmtKind::For {
                    init: None,
                    condition: None,
                    post: None,
                    body,
                },
                span,
            ));
        }

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_for_init()?)
        };
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.without_struct_literals(|p| p.parse_expression())?)
        };
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;

        let post = if self.check(&TokenKind::LBrace) {
            None
        } else {
            Some(self.without_struct_literals(|p| p.parse_for_post())?)
        };

        let body = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(
            StmtKind::For {
                init,
                condition,
                post,
                body,
            },
            span,
        ))
    }

    /// `var`/`const i: T = expr`, or a bare `i = expr` — the bare form
    /// declares a fresh binding scoped to the loop rather than assigning
    /// to an outer one, matching the language's idiom of a self-contained
    /// loop counter. A bare `i op= expr` (no declaration keyword, a
    /// compound operator) instead assigns into an existing binding.
    fn parse_for_init(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.peek().span;

        if self.check(&TokenKind::Var) || self.check(&TokenKind::Const) {
            let kind = if self.match_kind(&TokenKind::Var) {
                VarDeclKind::Var
            } else {
                self.advance(); // 'const'
                VarDeclKind::Const
            };
            let name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
            let ty = if self.match_kind(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.consume(TokenKind::Eq, ParseErrorKind::Custom("Expected '=' in for-loop initializer".into()))?;
            let init = Some(self.parse_expression()?);
            let span = self.span_from(start);
            return Ok(self.arena.alloc_stmt(StmtKind::VarDecl { kind, name, ty, init }, span));
        }

        let name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        match self.match_assign_op() {
            Some(AssignOp::Assign) => {
                let value = self.parse_expression()?;
                let span = self.span_from(start);
                Ok(self.arena.alloc_stmt(
                    StmtKind::VarDecl {
                        kind: VarDeclKind::Var,
                        name,
                        ty: None,
                        init: Some(value),
                    },
                    span,
                ))
            }
            Some(op) => {
                let target = self.arena.alloc_expr(ExprKind::Identifier(name.name), name.span);
                let value = self.parse_expression()?;
                let span = self.span_from(start);
                Ok(self.arena.alloc_stmt(StmtKind::Assignment { target, op, value }, span))
            }
            None => Err(self.unexpected("'=' in for-loop initializer")),
        }
    }

    /// The post clause is an ordinary assignment against a binding the
    /// loop already has in scope — no declaration form here.
    fn parse_for_post(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.peek().span;
        let target = self.parse_expression()?;
        let op = self
            .match_assign_op()
            .ok_or_else(|| self.unexpected("an assignment in for-loop post clause"))?;
        let value = self.parse_expression()?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(StmtKind::Assignment { target, op, value }, span))
    }

    fn match_assign_op(&mut self) -> Option<AssignOp> {
        if self.match_kind(&TokenKind::Eq) {
            Some(AssignOp::Assign)
        } else if self.match_kind(&TokenKind::PlusEq) {
            Some(AssignOp::Add)
        } else if self.match_kind(&TokenKind::MinusEq) {
            Some(AssignOp::Sub)
        } else if self.match_kind(&TokenKind::StarEq) {
            Some(AssignOp::Mul)
        } else if self.match_kind(&TokenKind::SlashEq) {
            Some(AssignOp::Div)
        } else if self.match_kind(&TokenKind::PercentEq) {
            Some(AssignOp::Mod)
        } else {
            None
        }
    }

    fn parse_return(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'return'
        let mut values = Vec::new();
        if !self.check(&TokenKind::Semicolon) {
            loop {
                values.push(self.parse_expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(StmtKind::Return(self.arena.alloc_slice(values)), span))
    }

    fn parse_break(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'break'
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        Ok(self.arena.alloc_stmt(StmtKind::Break, self.span_from(start)))
    }

    fn parse_continue(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'continue'
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        Ok(self.arena.alloc_stmt(StmtKind::Continue, self.span_from(start)))
    }

    fn parse_defer(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'defer'
        let body = self.parse_statement()?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(StmtKind::Defer(body), span))
    }

    fn parse_match(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'match'
        let scrutinee = self.without_struct_literals(|p| p.parse_expression())?;
        self.consume(TokenKind::LBrace, ParseErrorKind::ExpectedClosingBrace)?;
        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let pattern = self.parse_match_pattern()?;
            self.consume(TokenKind::FatArrow, ParseErrorKind::Custom("Expected '=>'".into()))?;
            let body = self.parse_statement()?;
            cases.push(MatchCase { pattern, body });
        }
        self.consume(TokenKind::RBrace, ParseErrorKind::ExpectedClosingBrace)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(
            StmtKind::Match {
                scrutinee,
                cases: self.arena.alloc_slice(cases),
            },
            span,
        ))
    }

    fn parse_match_pattern(&mut self) -> ParseResult<MatchPattern> {
        if let TokenKind::Identifier(_) = self.peek().kind {
            let enum_name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
            if self.match_kind(&TokenKind::ColonColon) {
                let variant = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
                return Ok(MatchPattern::EnumVariant {
                    enum_name: Some(enum_name),
                    variant,
                });
            }
            if self.interner.resolve(enum_name.name) == "_" {
                return Ok(MatchPattern::Wildcard);
            }
            return Ok(MatchPattern::Binding(enum_name));
        }
        if self.match_kind(&TokenKind::Dot) {
            let variant = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
            return Ok(MatchPattern::EnumVariant {
                enum_name: None,
                variant,
            });
        }
        let expr = self.parse_expression()?;
        if let crate::ast::ExprKind::Literal(lit) = expr.kind {
            return Ok(MatchPattern::Literal(lit));
        }
        Err(self.unexpected("a match pattern"))
    }

    fn parse_local_var_decl(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.peek().span;
        let kind = if self.match_kind(&TokenKind::Var) {
            VarDeclKind::Var
        } else {
            self.advance(); // 'const'
            VarDeclKind::Const
        };
        let name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        self.consume(TokenKind::Colon, ParseErrorKind::ExpectedTypeAnnotation)?;
        let ty = Some(self.parse_type()?);
        let init = if self.match_kind(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        if kind == VarDeclKind::Const && init.is_none() {
            return Err(crate::error::ParseError::new(ParseErrorKind::MissingInitializer, self.peek().span));
        }
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(StmtKind::VarDecl { kind, name, ty, init }, span))
    }

    fn parse_let_decl(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.advance().span; // 'let'

        if self.match_kind(&TokenKind::LParen) {
            let mut names = Vec::new();
            loop {
                names.push(self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RParen, ParseErrorKind::ExpectedClosingParen)?;
            self.consume(TokenKind::Eq, ParseErrorKind::Custom("Expected '=' in let binding".into()))?;
            let value = self.parse_expression()?;
            self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
            let span = self.span_from(start);
            return Ok(self.arena.alloc_stmt(
                StmtKind::LetDestructure {
                    names: self.arena.alloc_slice(names),
                    value,
                },
                span,
            ));
        }

        let name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        let ty = if self.match_kind(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.consume(TokenKind::Eq, ParseErrorKind::Custom("Expected '=' in let binding".into()))?;
        let init = Some(self.parse_expression()?);
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(
            StmtKind::VarDecl {
                kind: VarDeclKind::Let,
                name,
                ty,
                init,
            },
            span,
        ))
    }

    fn parse_assignment_or_expr_statement(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.peek().span;
        let target = self.parse_expression()?;

        if let Some(op) = self.match_assign_op() {
            let value = self.parse_expression()?;
            self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
            let span = self.span_from(start);
            return Ok(self.arena.alloc_stmt(StmtKind::Assignment { target, op, value }, span));
        }

        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_stmt(StmtKind::Expr(target), span))
    }
}
