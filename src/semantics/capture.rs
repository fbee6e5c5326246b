//! Lambda capture validation. Lambdas in this
//! language compile down to plain function pointers — they cannot close
//! over an enclosing function's locals, only over their own
//! parameters/locals and global declarations. This pass re-walks the
//! tree the collector already scoped, and for every identifier used
//! inside a lambda body, asks: did lexical lookup find this name inside
//! the lambda itself (or a scope nested in it), or at global scope? If
//! neither, the lambda is reaching into a frame it won't exist in.

use crate::ast::{Decl, DeclKind, Expr, ExprKind, Stmt, StmtKind};
use crate::diagnostics::DiagnosticChannel;
use crate::intern::Interner;

use super::collector::{ScopeId, ScopeKind, SymbolTable};

struct Validator<'i, 't, 'd> {
    interner: &'i Interner,
    table: &'t SymbolTable,
    diagnostics: &'d mut DiagnosticChannel,
    file: String,
    scope_stack: Vec<ScopeId>,
}

pub fn validate(declarations: &[&Decl], table: &SymbolTable, interner: &Interner, file: &str, diagnostics: &mut DiagnosticChannel) {
    let mut validator = Validator {
        interner,
        table,
        diagnostics,
        file: file.to_string(),
        scope_stack: vec![table.global_scope],
    };
    for decl in declarations {
        validator.visit_decl(decl);
    }
}

impl<'i, 't, 'd> Validator<'i, 't, 'd> {
    fn scope_for(&self, node: crate::ast::NodeId) -> Option<ScopeId> {
        self.table.scope_of.get(&node).copied()
    }

    /// The innermost lambda scope on the current path, if any; its index
    /// into `scope_stack` marks the boundary between "local to this
    /// lambda" and "captured from an enclosing function".
    fn lambda_boundary(&self) -> Option<usize> {
        self.scope_stack
            .iter()
            .rposition(|id| self.table.scope(*id).kind == ScopeKind::Lambda)
    }

    fn visit_decl(&mut self, decl: &Decl) {
        match decl.kind {
            DeclKind::Function(f) => {
                if let Some(id) = self.scope_for(decl.id) {
                    self.scope_stack.push(id);
                    self.visit_stmt(f.body);
                    self.scope_stack.pop();
                }
            }
            DeclKind::Var(v) => {
                if let Some(init) = v.init {
                    self.visit_expr(init);
                }
            }
            DeclKind::Struct(_) | DeclKind::Enum(_) | DeclKind::Import(_) | DeclKind::CImport(_) | DeclKind::Shard(_) => {}
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt.kind {
            StmtKind::Block(stmts) => {
                if let Some(id) = self.scope_for(stmt.id) {
                    self.scope_stack.push(id);
                    for s in stmts {
                        self.visit_stmt(s);
                    }
                    self.scope_stack.pop();
                }
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
                if let Some(id) = self.scope_for(stmt.id) {
                    self.scope_stack.push(id);
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
                    self.scope_stack.pop();
                }
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
            StmtKind::VarDecl { init, .. } => {
                if let Some(init) = init {
                    self.visit_expr(init);
                }
            }
            StmtKind::LetDestructure { value, .. } => self.visit_expr(value),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr.kind {
            ExprKind::Literal(_) | ExprKind::EnumValue { .. } | ExprKind::TypeParam(_) => {}
            ExprKind::Identifier(name) => self.check_capture(name, expr),
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
                let _ = params;
                if let Some(id) = self.scope_for(expr.id) {
                    self.scope_stack.push(id);
                    self.visit_stmt(body);
                    self.scope_stack.pop();
                }
            }
        }
    }

    fn check_capture(&mut self, name: crate::intern::Symbol, expr: &Expr) {
        let Some(boundary) = self.lambda_boundary() else {
            return;
        };
        // Walk outward from the current scope; the first frame that
        // declares `name` tells us where it lives.
        for (i, &scope_id) in self.scope_stack.iter().enumerate().rev() {
            if self.table.scope(scope_id).symbols.contains_key(&name) {
                let is_local_to_lambda = i >= boundary;
                let is_global = i == 0;
                if !is_local_to_lambda && !is_global {
                    self.diagnostics.report(
                        format!(
                            "Lambda cannot capture variable '{}' from enclosing scope. Use context parameter instead.",
                            self.interner.resolve(name)
                        ),
                        self.file.clone(),
                        expr.span,
                    );
                }
                return;
            }
        }
        // Undefined identifiers are reported separately by the checker.
    }
}
