//! Scope/symbol collection: walks the tree once, pushing a scope frame
//! per function/lambda/for-header and recording a parallel scope tree so
//! the lambda capture validator can later ask "where was this name
//! declared, and does that live inside the current lambda?" This module
//! answers exactly that question and nothing about types; type
//! resolution happens in `checker.rs`.

use std::collections::HashMap;

use crate::ast::{Decl, DeclKind, Expr, ExprKind, NodeId, Stmt, StmtKind};
use crate::diagnostics::DiagnosticChannel;
use crate::intern::{Interner, Symbol};
use crate::scope::Memory;
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Global,
    Parameter,
    FunctionLocal,
    LambdaLocal,
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub binding_kind: BindingKind,
    pub is_mutable: bool,
    pub declaring_node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Lambda,
    Block,
}

#[derive(Debug)]
pub struct ScopeInfo {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub symbols: HashMap<Symbol, SymbolEntry>,
}

/// Everything the checker and the capture validator need from the
/// collection pass: the scope tree, a lookup from AST node to the scope it
/// opens, and the set of lambda body nodes (so the capture validator knows
/// which scopes are lambda scopes without re-walking the tree).
pub struct SymbolTable {
    pub scopes: Vec<ScopeInfo>,
    pub scope_of: HashMap<NodeId, ScopeId>,
    pub global_scope: ScopeId,
}

impl SymbolTable {
    pub fn scope(&self, id: ScopeId) -> &ScopeInfo {
        &self.scopes[id.0 as usize]
    }
}

struct Collector<'i, 'd> {
    interner: &'i Interner,
    diagnostics: &'d mut DiagnosticChannel,
    file: String,
    memory: Memory<()>,
    scopes: Vec<ScopeInfo>,
    scope_of: HashMap<NodeId, ScopeId>,
    scope_stack: Vec<ScopeId>,
}

pub fn collect<'a>(
    declarations: &[&'a Decl<'a>],
    interner: &Interner,
    file: &str,
    diagnostics: &mut DiagnosticChannel,
) -> SymbolTable {
    let mut collector = Collector {
        interner,
        diagnostics,
        file: file.to_string(),
        memory: Memory::new(),
        scopes: vec![ScopeInfo {
            kind: ScopeKind::Global,
            parent: None,
            symbols: HashMap::new(),
        }],
        scope_of: HashMap::new(),
        scope_stack: vec![ScopeId(0)],
    };

    for decl in declarations {
        collector.visit_decl(decl);
    }

    SymbolTable {
        scopes: collector.scopes,
        scope_of: collector.scope_of,
        global_scope: ScopeId(0),
    }
}

impl<'i, 'd> Collector<'i, 'd> {
    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().expect("global scope is never popped")
    }

    fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let parent = self.current_scope();
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeInfo {
            kind,
            parent: Some(parent),
            symbols: HashMap::new(),
        });
        self.scope_stack.push(id);
        self.memory.push();
        id
    }

    fn pop_scope(&mut self) {
        self.scope_stack.pop();
        self.memory.pop();
    }

    fn declare(&mut self, name: Symbol, binding_kind: BindingKind, is_mutable: bool, node: NodeId, span: Span) {
        let scope_id = self.current_scope();
        let scope = &mut self.scopes[scope_id.0 as usize];
        if scope.symbols.contains_key(&name) {
            self.diagnostics.report(
                format!("Duplicate declaration of '{}'", self.interner.resolve(name)),
                self.file.clone(),
                span,
            );
        }
        scope.symbols.insert(
            name,
            SymbolEntry {
                name,
                binding_kind,
                is_mutable,
                declaring_node: node,
            },
        );
        self.memory.set(self.interner.resolve(name), ());
    }

    fn visit_decl(&mut self, decl: &Decl) {
        match decl.kind {
            DeclKind::Function(f) => {
                self.declare(f.name.name, BindingKind::Global, false, decl.id, f.name.span);
                let scope = self.push_scope(ScopeKind::Function);
                self.scope_of.insert(decl.id, scope);
                for param in f.params {
                    self.declare(param.name.name, BindingKind::Parameter, true, decl.id, param.name.span);
                }
                self.visit_stmt(f.body);
                self.pop_scope();
            }
            DeclKind::Struct(s) => {
                self.declare(s.name.name, BindingKind::Global, false, decl.id, s.name.span);
            }
            DeclKind::Enum(e) => {
                self.declare(e.name.name, BindingKind::Global, false, decl.id, e.name.span);
            }
            DeclKind::Var(v) => {
                if let Some(init) = v.init {
                    self.visit_expr(init);
                }
                self.declare(v.name.name, BindingKind::Global, v.kind != crate::ast::VarDeclKind::Const, decl.id, v.name.span);
            }
            DeclKind::Import(_) | DeclKind::CImport(_) | DeclKind::Shard(_) => {}
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt.kind {
            StmtKind::Block(stmts) => {
                let scope = self.push_scope(ScopeKind::Block);
                self.scope_of.insert(stmt.id, scope);
                for s in stmts {
                    self.visit_stmt(s);
                }
                self.pop_scope();
            }
            StmtKind::Expr(e) => self.visit_expr(e),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(condition);
                self.visit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.visit_expr(condition);
                self.visit_stmt(body);
            }
            StmtKind::For { init, condition, post, body } => {
                let scope = self.push_scope(ScopeKind::Block);
                self.scope_of.insert(stmt.id, scope);
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(condition) = condition {
                    self.visit_expr(condition);
                }
                self.visit_stmt(body);
                if let Some(post) = post {
                    self.visit_stmt(post);
                }
                self.pop_scope();
            }
            StmtKind::Return(values) => {
                for v in values {
                    self.visit_expr(v);
                }
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Defer(body) => self.visit_stmt(body),
            StmtKind::Match { scrutinee, cases } => {
                self.visit_expr(scrutinee);
                for case in cases {
                    self.visit_stmt(case.body);
                }
            }
            StmtKind::Assignment { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            StmtKind::VarDecl { kind, name, init, .. } => {
                if let Some(init) = init {
                    self.visit_expr(init);
                }
                let binding_kind = self.local_binding_kind();
                self.declare(name.name, binding_kind, kind != crate::ast::VarDeclKind::Const, stmt.id, name.span);
            }
            StmtKind::LetDestructure { names, value } => {
                self.visit_expr(value);
                let binding_kind = self.local_binding_kind();
                for name in names {
                    self.declare(name.name, binding_kind, true, stmt.id, name.span);
                }
            }
        }
    }

    /// Locals declared directly inside a lambda body (or the lambda's own
    /// parameter scope) are `LambdaLocal`; everything else nested under a
    /// function is `FunctionLocal`.
    fn local_binding_kind(&self) -> BindingKind {
        for &scope_id in self.scope_stack.iter().rev() {
            match self.scopes[scope_id.0 as usize].kind {
                ScopeKind::Lambda => return BindingKind::LambdaLocal,
                ScopeKind::Function => return BindingKind::FunctionLocal,
                ScopeKind::Global | ScopeKind::Block => continue,
            }
        }
        BindingKind::FunctionLocal
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::EnumValue { .. } | ExprKind::TypeParam(_) => {}
            ExprKind::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand),
            ExprKind::Cast { expr, .. } => self.visit_expr(expr),
            ExprKind::Call { callee, args } => {
                self.visit_expr(callee);
                for a in args {
                    self.visit_expr(a);
                }
            }
            ExprKind::Index { object, index } => {
                self.visit_expr(object);
                self.visit_expr(index);
            }
            ExprKind::Member { object, .. } => self.visit_expr(object),
            ExprKind::ArrayLiteral(elements) => {
                for e in elements {
                    self.visit_expr(e);
                }
            }
            ExprKind::StructLiteral { fields, .. } => {
                for (_, value) in fields {
                    self.visit_expr(value);
                }
            }
            ExprKind::Lambda { params, body, .. } => {
                let scope = self.push_scope(ScopeKind::Lambda);
                self.scope_of.insert(expr.id, scope);
                for param in params {
                    self.declare(param.name.name, BindingKind::Parameter, true, expr.id, param.name.span);
                }
                self.visit_stmt(body);
                self.pop_scope();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstArena;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn collect_source(source: &str) -> (SymbolTable, DiagnosticChannel) {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, &mut interner).tokenize().expect("lex ok");
        let mut parser = Parser::new(source, tokens, &arena, &mut interner);
        let outcome = parser.parse_program();
        assert!(outcome.success(), "parse should succeed for this test source");
        let mut diagnostics = DiagnosticChannel::new();
        let table = collect(&outcome.declarations, &interner, "test.truk", &mut diagnostics);
        (table, diagnostics)
    }

    #[test]
    fn function_params_live_in_a_child_scope_of_global() {
        let (table, diagnostics) = collect_source("fn add(a: i32, b: i32): i32 { return a + b; }");
        assert!(diagnostics.is_empty());
        let global = table.scope(table.global_scope);
        assert_eq!(global.symbols.len(), 1);
        let func_scope_id = *table.scope_of.values().next().unwrap();
        let func_scope = table.scope(func_scope_id);
        assert_eq!(func_scope.kind, ScopeKind::Function);
        assert_eq!(func_scope.symbols.len(), 2);
    }

    #[test]
    fn duplicate_global_declaration_is_a_diagnostic_not_a_halt() {
        let (_table, diagnostics) = collect_source("var x: i32 = 1; var x: i32 = 2;");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.iter().next().unwrap().message.contains("Duplicate declaration"));
    }

    #[test]
    fn lambda_body_locals_are_lambda_local() {
        let source = "fn f() { var cb: fn(i32): i32 = fn(x: i32): i32 { var y: i32 = x; return y; }; }";
        let (table, diagnostics) = collect_source(source);
        assert!(diagnostics.is_empty());
        let lambda_scope = table
            .scopes
            .iter()
            .find(|s| s.kind == ScopeKind::Lambda)
            .expect("lambda scope should exist");
        let y = lambda_scope
            .symbols
            .values()
            .find(|s| s.binding_kind == BindingKind::LambdaLocal);
        assert!(y.is_some());
    }
}
