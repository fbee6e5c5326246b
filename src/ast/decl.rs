//! Declaration AST nodes: the top-level items a file is made of.

use super::{Expr, Identifier, NodeId, Param, Stmt, TypeExpr, VarDeclKind};
use crate::token::Span;

#[derive(Debug, Clone, Copy)]
pub struct Decl<'a> {
    pub id: NodeId,
    pub span: Span,
    pub kind: DeclKind<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct FunctionDecl<'a> {
    pub name: Identifier,
    pub params: &'a [Param<'a>],
    pub return_type: &'a TypeExpr<'a>,
    pub is_variadic: bool,
    pub body: &'a Stmt<'a>,
    /// Names starting with `_` are private to the declaring shard.
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDecl<'a> {
    pub name: Identifier,
    pub ty: &'a TypeExpr<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct StructDecl<'a> {
    pub name: Identifier,
    pub type_params: &'a [Identifier],
    pub fields: &'a [FieldDecl<'a>],
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EnumDecl<'a> {
    pub name: Identifier,
    pub variants: &'a [Identifier],
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct GlobalVarDecl<'a> {
    pub kind: VarDeclKind,
    pub name: Identifier,
    pub ty: Option<&'a TypeExpr<'a>>,
    pub init: Option<&'a Expr<'a>>,
    pub is_private: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportDecl {
    pub path: Identifier,
}

#[derive(Debug, Clone, Copy)]
pub struct CImportDecl {
    pub header: Identifier,
}

/// Marks every top-level declaration in the file as belonging to a named
/// shard, granting cross-file access to the shard's private members.
#[derive(Debug, Clone, Copy)]
pub struct ShardDecl {
    pub name: Identifier,
}

#[derive(Debug, Clone, Copy)]
pub enum DeclKind<'a> {
    Function(FunctionDecl<'a>),
    Struct(StructDecl<'a>),
    Enum(EnumDecl<'a>),
    Var(GlobalVarDecl<'a>),
    Import(ImportDecl),
    CImport(CImportDecl),
    Shard(ShardDecl),
}
