//! One bump region per AST node kind.
//!
//! `AstArena` keeps four of these side by side — one each for `Decl`,
//! `Expr`, `Stmt`, `TypeExpr` — so allocating a node of one kind never
//! has to share a typed region with another. Slices (call arguments,
//! block statements, struct fields) don't go through `Arena<T>` at all:
//! they're homogeneous runs of already-allocated references, so
//! `AstArena` fills them straight out of its own untyped `bumpalo::Bump`
//! instead of round-tripping through a typed arena for a single bulk
//! write. A node handed back is valid for the arena's lifetime, which in
//! practice is "for the duration of one compilation unit" — everything
//! drops together once the checker has produced its diagnostics.

use bumpalo::Bump;
use std::marker::PhantomData;

pub struct Arena<T> {
    bump: Bump,
    _marker: PhantomData<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            bump: Bump::new(),
            _marker: PhantomData,
        }
    }

    pub fn alloc(&self, value: T) -> &T {
        self.bump.alloc(value)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    #[test]
    fn alloc_returns_stable_reference() {
        let arena: Arena<i32> = Arena::new();
        let r1 = arena.alloc(42);
        let r2 = arena.alloc(7);
        assert_eq!(*r1, 42);
        assert_eq!(*r2, 7);
    }

    #[test]
    fn references_remain_valid_after_many_allocations() {
        let arena: Arena<i32> = Arena::new();
        let refs: Vec<&i32> = (0..5000).map(|i| arena.alloc(i)).collect();
        for (i, r) in refs.iter().enumerate() {
            assert_eq!(**r, i as i32);
        }
    }

    #[test]
    fn two_node_kind_arenas_interleave_without_interfering() {
        // Mirrors AstArena's real shape: the parser allocates a Stmt and
        // then a nested Expr and back to a Stmt, never in one typed
        // arena at a time. Each arena must keep its own references
        // stable regardless of what the other one is doing.
        let spans: Arena<Span> = Arena::new();
        let ints: Arena<i32> = Arena::new();
        let mut span_refs = Vec::new();
        for i in 0..256usize {
            span_refs.push(spans.alloc(Span::new(i, i + 1)));
            ints.alloc(i as i32);
        }
        for (i, r) in span_refs.iter().enumerate() {
            assert_eq!(r.start, i);
        }
    }
}
