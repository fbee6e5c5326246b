//! Top-level declaration grammar.

use super::{ParseResult, Parser};
use crate::ast::{
    CImportDecl, Decl, DeclKind, EnumDecl, FieldDecl, FunctionDecl, GlobalVarDecl, ImportDecl,
    Param, PrimitiveKind, ShardDecl, StructDecl, TypeExprKind, VarDeclKind,
};
use crate::error::ParseErrorKind;
use crate::token::TokenKind;

impl<'s, 'a, 'i> Parser<'s, 'a, 'i> {
    pub(super) fn parse_declaration(&mut self) -> ParseResult<&'a Decl<'a>> {
        match self.peek().kind {
            TokenKind::Fn => self.parse_function_decl(),
            TokenKind::Struct => self.parse_struct_decl(),
            TokenKind::Enum => self.parse_enum_decl(),
            TokenKind::Var | TokenKind::Const => self.parse_global_var_decl(),
            TokenKind::Import => self.parse_import_decl(),
            TokenKind::CImport => self.parse_cimport_decl(),
            TokenKind::Shard => self.parse_shard_decl(),
            _ => Err(self.unexpected("a top-level declaration")),
        }
    }

    fn parse_function_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
        let start = self.advance().span; // 'fn'
        let name = self.consume_identifier(ParseErrorKind::ExpectedFunctionName)?;
        self.consume(TokenKind::LParen, ParseErrorKind::ExpectedClosingParen)?;

        let mut params = Vec::new();
        let mut is_variadic = false;
        if !self.check(&TokenKind::RParen) {
            loop {
                if self.match_kind(&TokenKind::Ellipsis) {
                    is_variadic = true;
                    break;
                }
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
            self.arena.alloc_type(TypeExprKind::Primitive(PrimitiveKind::Void), rparen)
        };

        let body = self.parse_block()?;
        let span = self.span_from(start);
        let is_private = self.interner.resolve(name.name).starts_with('_');

        Ok(self.arena.alloc_decl(
            DeclKind::Function(FunctionDecl {
                name,
                params: self.arena.alloc_slice(params),
                return_type,
                is_variadic,
                body,
                is_private,
            }),
            span,
        ))
    }

    fn parse_struct_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
        let start = self.advance().span; // 'struct'
        let name = self.consume_identifier(ParseErrorKind::ExpectedStructName)?;

        let mut type_params = Vec::new();
        if self.match_kind(&TokenKind::LBracket) {
            loop {
                type_params.push(self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RBracket, ParseErrorKind::ExpectedClosingBracket)?;
        }

        self.consume(TokenKind::LBrace, ParseErrorKind::ExpectedClosingBrace)?;
        let mut fields = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let fname = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
                self.consume(TokenKind::Colon, ParseErrorKind::ExpectedTypeAnnotation)?;
                let ty = self.parse_type()?;
                fields.push(FieldDecl { name: fname, ty });
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RBrace) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RBrace, ParseErrorKind::ExpectedClosingBrace)?;

        let span = self.span_from(start);
        let is_private = self.interner.resolve(name.name).starts_with('_');
        Ok(self.arena.alloc_decl(
            DeclKind::Struct(StructDecl {
                name,
                type_params: self.arena.alloc_slice(type_params),
                fields: self.arena.alloc_slice(fields),
                is_private,
            }),
            span,
        ))
    }

    fn parse_enum_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
        let start = self.advance().span; // 'enum'
        let name = self.consume_identifier(ParseErrorKind::ExpectedEnumName)?;
        self.consume(TokenKind::LBrace, ParseErrorKind::ExpectedClosingBrace)?;

        let mut variants = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                variants.push(self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RBrace) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RBrace, ParseErrorKind::ExpectedClosingBrace)?;

        let span = self.span_from(start);
        let is_private = self.interner.resolve(name.name).starts_with('_');
        Ok(self.arena.alloc_decl(
            DeclKind::Enum(EnumDecl {
                name,
                variants: self.arena.alloc_slice(variants),
                is_private,
            }),
            span,
        ))
    }

    fn parse_global_var_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
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
            return Err(crate::error::ParseError::new(
                ParseErrorKind::MissingInitializer,
                self.peek().span,
            ));
        }
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;

        let span = self.span_from(start);
        let is_private = self.interner.resolve(name.name).starts_with('_');
        Ok(self.arena.alloc_decl(
            DeclKind::Var(GlobalVarDecl {
                kind,
                name,
                ty,
                init,
                is_private,
            }),
            span,
        ))
    }

    fn parse_import_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
        let start = self.advance().span; // 'import'
        let path = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_decl(DeclKind::Import(ImportDecl { path }), span))
    }

    fn parse_cimport_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
        let start = self.advance().span; // 'cimport'
        let header = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_decl(DeclKind::CImport(CImportDecl { header }), span))
    }

    fn parse_shard_decl(&mut self) -> ParseResult<&'a Decl<'a>> {
        let start = self.advance().span; // 'shard'
        let name = self.consume_identifier(ParseErrorKind::ExpectedIdentifier)?;
        self.consume(TokenKind::Semicolon, ParseErrorKind::ExpectedSemicolon)?;
        let span = self.span_from(start);
        Ok(self.arena.alloc_decl(DeclKind::Shard(ShardDecl { name }), span))
    }
}
