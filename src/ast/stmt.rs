//! Statement AST nodes.

use super::{Expr, Identifier, NodeId, TypeExpr};
use crate::token::Span;

#[derive(Debug, Clone, Copy)]
pub struct Stmt<'a> {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclKind {
    Var,
    Const,
    Let,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy)]
pub enum MatchPattern {
    /// `EnumName::Variant` or a bare `.Variant` inferred from the scrutinee's type.
    EnumVariant {
        enum_name: Option<Identifier>,
        variant: Identifier,
    },
    Literal(super::LiteralKind),
    Binding(Identifier),
    Wildcard,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchCase<'a> {
    pub pattern: MatchPattern,
    pub body: &'a Stmt<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum StmtKind<'a> {
    Block(&'a [&'a Stmt<'a>]),
    Expr(&'a Expr<'a>),
    If {
        condition: &'a Expr<'a>,
        then_branch: &'a Stmt<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    },
    While {
        condition: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    /// C-style triple `for init? ';' cond? ';' post? block`. All three
    /// clauses are optional; `for { ... }` is a bare infinite loop.
    For {
        init: Option<&'a Stmt<'a>>,
        condition: Option<&'a Expr<'a>>,
        post: Option<&'a Stmt<'a>>,
        body: &'a Stmt<'a>,
    },
    /// The source language allows `return a, b;` — multiple comma-separated values.
    Return(&'a [&'a Expr<'a>]),
    Break,
    Continue,
    Defer(&'a Stmt<'a>),
    Match {
        scrutinee: &'a Expr<'a>,
        cases: &'a [MatchCase<'a>],
    },
    Assignment {
        target: &'a Expr<'a>,
        op: AssignOp,
        value: &'a Expr<'a>,
    },
    VarDecl {
        kind: VarDeclKind,
        name: Identifier,
        ty: Option<&'a TypeExpr<'a>>,
        init: Option<&'a Expr<'a>>,
    },
    /// `let (a, b) = pair;` tuple/struct destructuring.
    LetDestructure {
        names: &'a [Identifier],
        value: &'a Expr<'a>,
    },
}
