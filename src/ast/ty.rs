//! Type-expression AST nodes. The grammar that produces these
//! is the one place the parser needs real lookahead
//! discipline: `*[N]T` (pointer-to-array) and `[N]*T` (array-of-pointer)
//! must come out as different trees.

use super::{Identifier, NodeId, PrimitiveKind};
use crate::token::Span;

#[derive(Debug, Clone, Copy)]
pub struct TypeExpr<'a> {
    pub id: NodeId,
    pub span: Span,
    pub kind: TypeExprKind<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum TypeExprKind<'a> {
    Primitive(PrimitiveKind),
    Named(Identifier),
    GenericInstantiation {
        base: Identifier,
        args: &'a [&'a TypeExpr<'a>],
    },
    Pointer(&'a TypeExpr<'a>),
    /// `size: None` means an unsized slice (`[]T`); `Some(n)` a sized
    /// array (`[N]T`).
    Array {
        element: &'a TypeExpr<'a>,
        size: Option<u64>,
    },
    Function {
        params: &'a [&'a TypeExpr<'a>],
        return_type: &'a TypeExpr<'a>,
        is_variadic: bool,
    },
    Map {
        key: &'a TypeExpr<'a>,
        value: &'a TypeExpr<'a>,
    },
    Tuple(&'a [&'a TypeExpr<'a>]),
}
