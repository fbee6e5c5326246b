//! Type checking: every check function returns its resolved `Ty`
//! directly rather than stashing "the type of the expression just
//! visited" in a mutable field for the caller to read back out, so a
//! stale read is a borrow-checker error instead of a runtime bug.

use std::collections::HashMap;

use crate::ast::*;
use crate::diagnostics::DiagnosticChannel;
use crate::intern::{Interner, Symbol};
use crate::scope::Memory;
use crate::token::Span;

use super::builtins;
use super::types::{
    display_type, is_boolean_type, is_comparable_type, is_compatible_for_assignment, is_integer_type, is_numeric_type,
    is_valid_map_key_type, resolve_untyped_literal, types_equal, Ty,
};

struct StructType {
    fields: Vec<(Symbol, Ty)>,
    is_private: bool,
    defining_file: String,
    shard: Option<Symbol>,
}

struct EnumType {
    variants: Vec<Symbol>,
    is_private: bool,
}

/// Where a function or global was declared, for the private-name rule: a
/// name starting with `_` is reachable only from its defining file, or
/// from a file tagged with the same `shard`.
struct Origin {
    is_private: bool,
    defining_file: String,
    shard: Option<Symbol>,
}

pub struct Checker<'i> {
    interner: &'i Interner,
    file: String,
    shard: Option<Symbol>,
    diagnostics: DiagnosticChannel,
    vars: Memory<Ty>,
    structs: HashMap<Symbol, StructType>,
    enums: HashMap<Symbol, EnumType>,
    functions: HashMap<Symbol, Origin>,
    globals: HashMap<Symbol, Origin>,
    current_return_type: Option<Ty>,
    in_loop: bool,
}

pub fn check<'a>(declarations: &[&'a Decl<'a>], interner: &Interner, file: &str) -> DiagnosticChannel {
    check_units(&[(file, declarations)], interner)
}

/// Checks several files' declarations as one program: every struct,
/// enum, function, and global is visible across unit boundaries (as if
/// resolved through imports), and the private-name rule is enforced
/// against each declaration's own defining file and shard rather than
/// whichever unit happens to be checked last.
pub fn check_units<'a>(units: &[(&str, &[&'a Decl<'a>])], interner: &Interner) -> DiagnosticChannel {
    let mut checker = Checker {
        interner,
        file: String::new(),
        shard: None,
        diagnostics: DiagnosticChannel::new(),
        vars: Memory::new(),
        structs: HashMap::new(),
        enums: HashMap::new(),
        functions: HashMap::new(),
        globals: HashMap::new(),
        current_return_type: None,
        in_loop: false,
    };
    checker.run(units);
    checker.diagnostics
}

impl<'i> Checker<'i> {
    fn run(&mut self, units: &[(&str, &[&Decl])]) {
        let shards: Vec<Option<Symbol>> = units
            .iter()
            .map(|(_, decls)| {
                decls.iter().find_map(|d| match d.kind {
                    DeclKind::Shard(s) => Some(s.name.name),
                    _ => None,
                })
            })
            .collect();

        // Pass 1: register every struct/enum name so forward references in
        // field/parameter/return types resolve regardless of declaration
        // order, within a file or across files.
        for (unit, (file, declarations)) in units.iter().enumerate() {
            self.file = file.to_string();
            self.shard = shards[unit];
            for decl in *declarations {
                match decl.kind {
                    DeclKind::Struct(s) => self.declare_type_name(
                        s.name,
                        StructType {
                            fields: Vec::new(),
                            is_private: s.is_private,
                            defining_file: self.file.clone(),
                            shard: self.shard,
                        },
                        decl.span,
                    ),
                    DeclKind::Enum(e) => self.declare_enum_name(
                        e.name,
                        EnumType {
                            variants: e.variants.iter().map(|v| v.name).collect(),
                            is_private: e.is_private,
                        },
                        decl.span,
                    ),
                    _ => {}
                }
            }
        }

        // Pass 2: resolve struct fields, function/global signatures.
        for (unit, (file, declarations)) in units.iter().enumerate() {
            self.file = file.to_string();
            self.shard = shards[unit];
            for decl in *declarations {
                match decl.kind {
                    DeclKind::Struct(s) => self.resolve_struct_fields(s),
                    DeclKind::Function(f) => self.register_function_signature(f, decl.span),
                    DeclKind::Var(v) => self.register_global(v, decl.span),
                    DeclKind::Enum(_) | DeclKind::Import(_) | DeclKind::CImport(_) | DeclKind::Shard(_) => {}
                }
            }
        }

        // Pass 3: check function bodies against the fully-resolved registry,
        // with `self.file`/`self.shard` set to the body's own unit so the
        // private-name rule sees the right caller context.
        for (unit, (file, declarations)) in units.iter().enumerate() {
            self.file = file.to_string();
            self.shard = shards[unit];
            for decl in *declarations {
                if let DeclKind::Function(f) = decl.kind {
                    self.check_function_body(f);
                }
            }
        }
    }

    /// True unless `name` is private and the caller's file is neither the
    /// defining file nor shares a shard tag with it.
    fn is_accessible(&self, origin: &Origin) -> bool {
        if !origin.is_private {
            return true;
        }
        if origin.defining_file == self.file {
            return true;
        }
        matches!((origin.shard, self.shard), (Some(a), Some(b)) if a == b)
    }

    fn declare_type_name(&mut self, name: Identifier, ty: StructType, span: Span) {
        if self.structs.contains_key(&name.name) || self.enums.contains_key(&name.name) {
            self.report(format!("Duplicate declaration of '{}'", self.name_of(name.name)), span);
        }
        self.structs.insert(name.name, ty);
    }

    fn declare_enum_name(&mut self, name: Identifier, ty: EnumType, span: Span) {
        if self.structs.contains_key(&name.name) || self.enums.contains_key(&name.name) {
            self.report(format!("Duplicate declaration of '{}'", self.name_of(name.name)), span);
        }
        self.enums.insert(name.name, ty);
    }

    fn resolve_struct_fields(&mut self, s: StructDecl) {
        let mut fields = Vec::new();
        for field in s.fields {
            match self.resolve_type_expr(field.ty) {
                Some(ty) => fields.push((field.name.name, ty)),
                None => self.report(
                    format!("Unknown field type: {}", self.describe_type_expr(field.ty)),
                    field.ty.span,
                ),
            }
        }
        if let Some(entry) = self.structs.get_mut(&s.name.name) {
            entry.fields = fields;
        }
    }

    fn register_function_signature(&mut self, f: FunctionDecl, _span: Span) {
        let return_type = match self.resolve_type_expr(f.return_type) {
            Some(ty) => ty,
            None => {
                self.report(
                    format!("Unknown return type: {}", self.describe_type_expr(f.return_type)),
                    f.return_type.span,
                );
                return;
            }
        };
        let mut params = Vec::new();
        for param in f.params {
            match self.resolve_type_expr(param.ty) {
                Some(ty) => params.push(ty),
                None => self.report(
                    format!("Unknown parameter type: {}", self.describe_type_expr(param.ty)),
                    param.ty.span,
                ),
            }
        }
        let func_ty = Ty::Function {
            params,
            return_type: Box::new(return_type),
            is_variadic: f.is_variadic,
        };
        let name = self.name_of(f.name.name).to_string();
        self.vars.set(&name, func_ty);
        self.functions.insert(
            f.name.name,
            Origin {
                is_private: f.is_private,
                defining_file: self.file.clone(),
                shard: self.shard,
            },
        );
    }

    fn register_global(&mut self, v: GlobalVarDecl, span: Span) {
        let declared = v.ty.and_then(|te| self.resolve_type_expr(te));
        if v.ty.is_some() && declared.is_none() {
            self.report(
                format!("Unknown variable type: {}", self.describe_type_expr(v.ty.unwrap())),
                v.ty.unwrap().span,
            );
            return;
        }
        let init_ty = v.init.and_then(|e| self.check_expr(e));
        let resolved = match (declared, init_ty) {
            (Some(target), Some(actual)) => {
                let actual = resolve_untyped_literal(&actual, Some(&target));
                let msg = if v.kind == VarDeclKind::Const {
                    "Type mismatch in constant initialization"
                } else {
                    "Type mismatch in variable initialization"
                };
                if !is_compatible_for_assignment(&target, &actual) {
                    self.report(msg.to_string(), span);
                }
                target
            }
            (Some(target), None) => target,
            (None, Some(actual)) => resolve_untyped_literal(&actual, None),
            (None, None) => return,
        };
        let name = self.name_of(v.name.name).to_string();
        self.vars.set(&name, resolved);
        self.globals.insert(
            v.name.name,
            Origin {
                is_private: v.is_private,
                defining_file: self.file.clone(),
                shard: self.shard,
            },
        );
    }

    fn check_function_body(&mut self, f: FunctionDecl) {
        let return_type = self.resolve_type_expr(f.return_type);
        self.vars.push();
        let prev_return = self.current_return_type.take();
        self.current_return_type = return_type;
        for param in f.params {
            if let Some(ty) = self.resolve_type_expr(param.ty) {
                let name = self.name_of(param.name.name).to_string();
                self.vars.set(&name, ty);
            }
        }
        self.check_stmt(f.body);
        self.current_return_type = prev_return;
        self.vars.pop();
    }

    // ---- type-expression resolution ------------------------------------

    fn resolve_type_expr(&mut self, te: &TypeExpr) -> Option<Ty> {
        match te.kind {
            TypeExprKind::Primitive(p) => Some(Ty::Primitive(p)),
            TypeExprKind::Named(id) => self.resolve_named_type(id.name),
            TypeExprKind::GenericInstantiation { base, .. } => self.resolve_named_type(base.name),
            TypeExprKind::Pointer(inner) => self.resolve_type_expr(inner).map(|t| Ty::Pointer(Box::new(t))),
            TypeExprKind::Array { element, size } => self
                .resolve_type_expr(element)
                .map(|t| Ty::Array {
                    element: Box::new(t),
                    size,
                }),
            TypeExprKind::Function {
                params,
                return_type,
                is_variadic,
            } => {
                let mut resolved = Vec::with_capacity(params.len());
                for p in params {
                    resolved.push(self.resolve_type_expr(p)?);
                }
                let ret = self.resolve_type_expr(return_type)?;
                Some(Ty::Function {
                    params: resolved,
                    return_type: Box::new(ret),
                    is_variadic,
                })
            }
            TypeExprKind::Map { key, value } => {
                let k = self.resolve_type_expr(key)?;
                let v = self.resolve_type_expr(value)?;
                if !is_valid_map_key_type(&k) {
                    self.report(
                        format!(
                            "Invalid map key type: {}. Keys must be primitives (numeric or bool) or string pointers (*u8, *i8)",
                            display_type(&k, self.interner)
                        ),
                        key.span,
                    );
                }
                Some(Ty::Map {
                    key: Box::new(k),
                    value: Box::new(v),
                })
            }
            TypeExprKind::Tuple(elems) => {
                let mut resolved = Vec::with_capacity(elems.len());
                for e in elems {
                    resolved.push(self.resolve_type_expr(e)?);
                }
                Some(Ty::Tuple(resolved))
            }
        }
    }

    /// Generic type arguments are structurally erased: a struct declared
    /// with type parameters resolves to the same `Ty::Struct` regardless
    /// of what it was instantiated with (full monomorphization is out of
    /// scope — see DESIGN.md).
    fn resolve_named_type(&self, name: Symbol) -> Option<Ty> {
        if self.structs.contains_key(&name) {
            Some(Ty::Struct(name))
        } else if self.enums.contains_key(&name) {
            Some(Ty::Named(name))
        } else {
            None
        }
    }

    fn describe_type_expr(&self, te: &TypeExpr) -> String {
        match te.kind {
            TypeExprKind::Primitive(p) => p.name().to_string(),
            TypeExprKind::Named(id) => self.name_of(id.name).to_string(),
            TypeExprKind::GenericInstantiation { base, .. } => self.name_of(base.name).to_string(),
            TypeExprKind::Pointer(inner) => format!("*{}", self.describe_type_expr(inner)),
            TypeExprKind::Array { element, size: Some(n) } => format!("[{}]{}", n, self.describe_type_expr(element)),
            TypeExprKind::Array { element, size: None } => format!("[]{}", self.describe_type_expr(element)),
            TypeExprKind::Function { .. } => "fn".to_string(),
            TypeExprKind::Map { key, value } => {
                format!("map[{}, {}]", self.describe_type_expr(key), self.describe_type_expr(value))
            }
            TypeExprKind::Tuple(elems) => {
                let parts: Vec<String> = elems.iter().map(|e| self.describe_type_expr(e)).collect();
                format!("({})", parts.join(", "))
            }
        }
    }

    // ---- statements -----------------------------------------------------

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt.kind {
            StmtKind::Block(stmts) => {
                self.vars.push();
                for s in stmts {
                    self.check_stmt(s);
                }
                self.vars.pop();
            }
            StmtKind::Expr(e) => {
                self.check_expr(e);
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if let Some(ty) = self.check_expr(condition) {
                    if !is_boolean_type(&ty) {
                        self.report("If condition must be boolean type".to_string(), condition.span);
                    }
                }
                self.check_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                if let Some(ty) = self.check_expr(condition) {
                    if !is_boolean_type(&ty) {
                        self.report("While condition must be boolean type".to_string(), condition.span);
                    }
                }
                let prev = self.in_loop;
                self.in_loop = true;
                self.check_stmt(body);
                self.in_loop = prev;
            }
            StmtKind::For {
                init,
                condition,
                post,
                body,
            } => {
                self.vars.push();
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(condition) = condition {
                    if let Some(ty) = self.check_expr(condition) {
                        if !is_boolean_type(&ty) {
                            self.report("For condition must be boolean type".to_string(), condition.span);
                        }
                    }
                }
                let prev = self.in_loop;
                self.in_loop = true;
                self.check_stmt(body);
                if let Some(post) = post {
                    self.check_stmt(post);
                }
                self.in_loop = prev;
                self.vars.pop();
            }
            StmtKind::Return(values) => self.check_return(stmt.span, values),
            StmtKind::Break => {
                if !self.in_loop {
                    self.report("Break statement outside of loop".to_string(), stmt.span);
                }
            }
            StmtKind::Continue => {
                if !self.in_loop {
                    self.report("Continue statement outside of loop".to_string(), stmt.span);
                }
            }
            StmtKind::Defer(body) => {
                if super::control_flow::contains_control_flow(body) {
                    self.report(
                        "Defer cannot contain return, break, or continue statements".to_string(),
                        stmt.span,
                    );
                }
                self.check_stmt(body);
            }
            StmtKind::Match { scrutinee, cases } => {
                self.check_expr(scrutinee);
                for case in cases {
                    self.check_stmt(case.body);
                }
            }
            StmtKind::Assignment { target, op: _, value } => self.check_assignment(stmt.span, target, value),
            StmtKind::VarDecl { kind, name, ty, init } => self.check_local_decl(stmt.span, kind, name, ty, init),
            StmtKind::LetDestructure { names, value } => {
                self.check_expr(value);
                for name in names {
                    let name = self.name_of(name.name).to_string();
                    self.vars.set(&name, Ty::Primitive(PrimitiveKind::Void));
                }
            }
        }
    }

    fn check_return(&mut self, span: Span, values: &[&Expr]) {
        let Some(expected) = self.current_return_type.clone() else {
            return;
        };
        match values.first() {
            Some(expr) => {
                let Some(actual) = self.check_expr(expr) else {
                    self.report("Return expression has no type".to_string(), expr.span);
                    return;
                };
                let actual = resolve_untyped_literal(&actual, Some(&expected));
                if !is_compatible_for_assignment(&expected, &actual) {
                    self.report("Return type mismatch".to_string(), expr.span);
                }
            }
            None => {
                if !matches!(expected, Ty::Primitive(PrimitiveKind::Void)) {
                    self.report("Function must return a value".to_string(), span);
                }
            }
        }
    }

    fn check_local_decl(&mut self, span: Span, kind: VarDeclKind, name: Identifier, ty: Option<&TypeExpr>, init: Option<&Expr>) {
        let declared = ty.and_then(|te| self.resolve_type_expr(te));
        if ty.is_some() && declared.is_none() {
            self.report(
                format!("Unknown variable type: {}", self.describe_type_expr(ty.unwrap())),
                ty.unwrap().span,
            );
            return;
        }
        let init_ty = init.and_then(|e| self.check_expr(e));
        let resolved = match (declared, init_ty) {
            (Some(target), Some(actual)) => {
                let actual = resolve_untyped_literal(&actual, Some(&target));
                let msg = if kind == VarDeclKind::Const {
                    "Type mismatch in constant initialization"
                } else {
                    "Type mismatch in variable initialization"
                };
                if !is_compatible_for_assignment(&target, &actual) {
                    self.report(msg.to_string(), span);
                }
                target
            }
            (Some(target), None) => target,
            (None, Some(actual)) => resolve_untyped_literal(&actual, None),
            (None, None) => return,
        };
        let name = self.name_of(name.name).to_string();
        self.vars.set(&name, resolved);
    }

    fn check_assignment(&mut self, span: Span, target: &Expr, value: &Expr) {
        if let ExprKind::Index { object, index } = target.kind {
            if let Some(Ty::Map { key, value: map_value }) = self.check_expr(object) {
                let Some(index_ty) = self.check_expr(index) else {
                    self.report("Map index has invalid type".to_string(), index.span);
                    return;
                };
                let index_ty = resolve_untyped_literal(&index_ty, Some(&key));
                if !types_equal(&index_ty, &key) && !i8_u8_pointer_swap(&index_ty, &key) {
                    self.report(
                        format!(
                            "Map key type mismatch: expected {} but got {}",
                            display_type(&key, self.interner),
                            display_type(&index_ty, self.interner)
                        ),
                        index.span,
                    );
                    return;
                }
                let Some(value_ty) = self.check_expr(value) else {
                    self.report("Assignment with invalid types".to_string(), span);
                    return;
                };
                let value_ty = resolve_untyped_literal(&value_ty, Some(&map_value));
                if !is_compatible_for_assignment(&map_value, &value_ty) {
                    self.report("Assignment type mismatch".to_string(), span);
                }
                return;
            }
        }

        let target_ty = self.check_expr(target);
        let value_ty = self.check_expr(value);
        let (Some(target_ty), Some(value_ty)) = (target_ty, value_ty) else {
            self.report("Assignment with invalid types".to_string(), span);
            return;
        };
        let value_ty = resolve_untyped_literal(&value_ty, Some(&target_ty));
        if !is_compatible_for_assignment(&target_ty, &value_ty) {
            self.report("Assignment type mismatch".to_string(), span);
        }
    }

    // ---- expressions ------------------------------------------------------

    fn check_expr(&mut self, expr: &Expr) -> Option<Ty> {
        match expr.kind {
            ExprKind::Literal(lit) => Some(self.check_literal(lit)),
            ExprKind::Identifier(name) => self.check_identifier(name, expr.span),
            ExprKind::Binary { op, left, right } => self.check_binary(expr.span, op, left, right),
            ExprKind::Unary { op, operand } => self.check_unary(expr.span, op, operand),
            ExprKind::Cast { expr: inner, ty } => self.check_cast(inner, ty),
            ExprKind::Call { callee, args } => self.check_call(expr.span, callee, args),
            ExprKind::Index { object, index } => self.check_index(expr.span, object, index),
            ExprKind::Member { object, field } => self.check_member(expr.span, object, field),
            ExprKind::EnumValue { enum_name, variant } => self.check_enum_value(expr.span, enum_name, variant),
            ExprKind::ArrayLiteral(elements) => self.check_array_literal(expr.span, elements),
            ExprKind::StructLiteral { name, fields, .. } => self.check_struct_literal(expr.span, name, fields),
            ExprKind::TypeParam(_) => None,
            ExprKind::Lambda {
                params,
                return_type,
                body,
            } => self.check_lambda(expr.span, params, return_type, body),
        }
    }

    fn check_literal(&mut self, lit: LiteralKind) -> Ty {
        match lit {
            LiteralKind::Integer { .. } => Ty::UntypedInteger,
            LiteralKind::Float { .. } => Ty::UntypedFloat,
            LiteralKind::Str(_) => Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::U8))),
            LiteralKind::Char(_) => Ty::Primitive(PrimitiveKind::U8),
            LiteralKind::Bool(_) => Ty::Primitive(PrimitiveKind::Bool),
            LiteralKind::Nil => Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::Void))),
        }
    }

    fn check_identifier(&mut self, name: Symbol, span: Span) -> Option<Ty> {
        let inaccessible_global = self.globals.get(&name).is_some_and(|origin| !self.is_accessible(origin));
        if inaccessible_global {
            self.report(
                format!(
                    "Cannot access private global variable '{}' from outside its defining file or shard",
                    self.name_of(name)
                ),
                span,
            );
        }
        match self.vars.get(self.name_of(name), true) {
            Some(ty) => Some(ty.clone()),
            None => {
                self.report(format!("Undefined identifier: {}", self.name_of(name)), span);
                None
            }
        }
    }

    fn check_binary(&mut self, span: Span, op: BinaryOpKind, left: &Expr, right: &Expr) -> Option<Ty> {
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);
        let (Some(left_ty), Some(right_ty)) = (left_ty, right_ty) else {
            self.report("Binary operation on invalid types".to_string(), span);
            return None;
        };
        let left_ty = resolve_untyped_literal(&left_ty, Some(&right_ty));
        let right_ty = resolve_untyped_literal(&right_ty, Some(&left_ty));

        if op.is_arithmetic() {
            if !is_numeric_type(&left_ty) || !is_numeric_type(&right_ty) {
                self.report("Arithmetic operation requires numeric types".to_string(), span);
                return None;
            }
            if !types_equal(&left_ty, &right_ty) {
                self.report(
                    format!(
                        "Cannot perform arithmetic on {} and {} (hint: use explicit cast)",
                        display_type(&left_ty, self.interner),
                        display_type(&right_ty, self.interner)
                    ),
                    span,
                );
                return None;
            }
            return Some(left_ty);
        }

        if op.is_comparison() {
            if !is_comparable_type(&left_ty) || !is_comparable_type(&right_ty) {
                self.report(
                    "Comparison operation requires comparable types (numeric, bool, or pointer)".to_string(),
                    span,
                );
                return None;
            }
            let pointer_void = matches!((&left_ty, &right_ty), (Ty::Pointer(a), _) if matches!(**a, Ty::Primitive(PrimitiveKind::Void)))
                || matches!((&left_ty, &right_ty), (_, Ty::Pointer(b)) if matches!(**b, Ty::Primitive(PrimitiveKind::Void)));
            if !types_equal(&left_ty, &right_ty) && !(matches!((&left_ty, &right_ty), (Ty::Pointer(_), Ty::Pointer(_))) && pointer_void) {
                self.report(
                    format!(
                        "Cannot compare {} with {}",
                        display_type(&left_ty, self.interner),
                        display_type(&right_ty, self.interner)
                    ),
                    span,
                );
                return None;
            }
            return Some(Ty::Primitive(PrimitiveKind::Bool));
        }

        if op.is_logical() {
            if !is_boolean_type(&left_ty) || !is_boolean_type(&right_ty) {
                self.report("Logical operation requires boolean types".to_string(), span);
                return None;
            }
            return Some(Ty::Primitive(PrimitiveKind::Bool));
        }

        // bitwise
        if !is_integer_type(&left_ty) || !is_integer_type(&right_ty) {
            self.report("Bitwise operation requires integer types".to_string(), span);
            return None;
        }
        if !types_equal(&left_ty, &right_ty) {
            self.report("Bitwise operation type mismatch".to_string(), span);
            return None;
        }
        Some(left_ty)
    }

    fn check_unary(&mut self, span: Span, op: UnaryOpKind, operand: &Expr) -> Option<Ty> {
        let ty = self.check_expr(operand)?;
        let ty = resolve_untyped_literal(&ty, None);
        match op {
            UnaryOpKind::Neg => {
                if !is_numeric_type(&ty) {
                    self.report("Negation requires numeric type".to_string(), span);
                }
                Some(ty)
            }
            UnaryOpKind::Not => {
                if !is_boolean_type(&ty) {
                    self.report("Logical NOT requires boolean type".to_string(), span);
                }
                Some(Ty::Primitive(PrimitiveKind::Bool))
            }
            UnaryOpKind::BitNot => {
                if !is_integer_type(&ty) {
                    self.report("Bitwise NOT requires integer type".to_string(), span);
                }
                Some(ty)
            }
            UnaryOpKind::AddressOf => {
                if matches!(ty, Ty::Function { .. }) {
                    self.report(
                        "Cannot take address of function/lambda (functions are already function pointers)".to_string(),
                        span,
                    );
                    return None;
                }
                Some(Ty::Pointer(Box::new(ty)))
            }
            UnaryOpKind::Deref => match ty {
                Ty::Pointer(inner) => Some(*inner),
                _ => {
                    self.report("Dereference requires pointer type".to_string(), span);
                    None
                }
            },
        }
    }

    fn check_cast(&mut self, inner: &Expr, ty: &TypeExpr) -> Option<Ty> {
        if self.check_expr(inner).is_none() {
            self.report("Cast expression has invalid type".to_string(), inner.span);
            return None;
        }
        match self.resolve_type_expr(ty) {
            Some(resolved) => Some(resolved),
            None => {
                self.report("Cast to unknown type".to_string(), ty.span);
                None
            }
        }
    }

    fn check_call(&mut self, span: Span, callee: &Expr, args: &[&Expr]) -> Option<Ty> {
        if let ExprKind::Identifier(name) = callee.kind {
            if let Some(kind) = builtins::lookup(self.name_of(name)) {
                return self.check_builtin_call(kind, span, args);
            }
            let inaccessible = self.functions.get(&name).is_some_and(|origin| !self.is_accessible(origin));
            if inaccessible {
                self.report(
                    format!(
                        "Cannot call private function '{}' from outside its defining file or shard",
                        self.name_of(name)
                    ),
                    span,
                );
            }
        }

        let func_ty = self.check_expr(callee)?;
        let Ty::Function {
            params,
            return_type,
            is_variadic,
        } = func_ty
        else {
            self.report("Call target is not a function".to_string(), span);
            return None;
        };

        if is_variadic {
            if args.len() < params.len() {
                self.report("Too few arguments for variadic function".to_string(), span);
                return Some(*return_type);
            }
        } else if args.len() != params.len() {
            self.report("Argument count mismatch".to_string(), span);
            return Some(*return_type);
        }

        for (i, arg) in args.iter().enumerate() {
            let Some(arg_ty) = self.check_expr(arg) else { continue };
            if i < params.len() {
                let arg_ty = resolve_untyped_literal(&arg_ty, Some(&params[i]));
                if !is_compatible_for_assignment(&params[i], &arg_ty) {
                    self.report("Argument type mismatch".to_string(), span);
                }
            }
        }

        Some(*return_type)
    }

    fn check_builtin_call(&mut self, kind: builtins::BuiltinKind, span: Span, args: &[&Expr]) -> Option<Ty> {
        use builtins::BuiltinKind::*;
        match kind {
            Make => {
                let Some(ExprKind::TypeParam(type_expr)) = args.first().map(|a| a.kind) else {
                    self.report("make requires a type argument".to_string(), span);
                    return None;
                };
                let Some(element_ty) = self.resolve_type_expr(type_expr) else {
                    self.report(format!("Unknown type: {}", self.describe_type_expr(type_expr)), span);
                    return None;
                };
                match args.get(1) {
                    Some(count_expr) => {
                        let Some(count_ty) = self.check_expr(count_expr) else {
                            self.report("make count argument has invalid type".to_string(), span);
                            return None;
                        };
                        let count_ty = resolve_untyped_literal(&count_ty, Some(&Ty::Primitive(PrimitiveKind::U64)));
                        if !is_integer_type(&count_ty) {
                            self.report("make count argument must be an integer type".to_string(), span);
                        }
                        Some(Ty::Array {
                            element: Box::new(element_ty),
                            size: None,
                        })
                    }
                    None => match element_ty {
                        Ty::Map { .. } => Some(element_ty),
                        other => Some(Ty::Pointer(Box::new(other))),
                    },
                }
            }
            Delete => {
                let Some(arg) = args.first() else {
                    self.report("delete requires one argument".to_string(), span);
                    return None;
                };
                let Some(ty) = self.check_expr(arg) else {
                    self.report("delete argument has invalid type".to_string(), span);
                    return None;
                };
                if !matches!(ty, Ty::Pointer(_) | Ty::Array { .. } | Ty::Map { .. }) {
                    self.report("delete requires a pointer, array, or map type".to_string(), span);
                }
                Some(Ty::Primitive(PrimitiveKind::Void))
            }
            Len => {
                let Some(arg) = args.first() else {
                    self.report("len requires one argument".to_string(), span);
                    return None;
                };
                let Some(ty) = self.check_expr(arg) else {
                    self.report("len argument has invalid type".to_string(), span);
                    return None;
                };
                if !matches!(ty, Ty::Array { .. } | Ty::Map { .. } | Ty::Pointer(_)) {
                    self.report("len requires an array, map, or pointer type".to_string(), span);
                }
                Some(Ty::Primitive(PrimitiveKind::U64))
            }
            Sizeof => {
                match args.first().map(|a| a.kind) {
                    Some(ExprKind::TypeParam(type_expr)) => {
                        if self.resolve_type_expr(type_expr).is_none() {
                            self.report(format!("Unknown type: {}", self.describe_type_expr(type_expr)), span);
                        }
                    }
                    Some(_) => {
                        self.check_expr(args[0]);
                    }
                    None => self.report("sizeof requires an argument".to_string(), span),
                }
                Some(Ty::Primitive(PrimitiveKind::U64))
            }
            Panic => {
                if let Some(arg) = args.first() {
                    self.check_expr(arg);
                }
                Some(Ty::Primitive(PrimitiveKind::Void))
            }
            Each => {
                let [collection, context, callback] = args else {
                    self.report("each requires a collection, a context, and a callback".to_string(), span);
                    return None;
                };
                let collection_ty = self.check_expr(collection);
                let context_ty = self.check_expr(context);
                let callback_ty = self.check_expr(callback);

                let is_map = matches!(collection_ty, Some(Ty::Map { .. }));
                let is_slice = matches!(collection_ty, Some(Ty::Array { size: None, .. }));
                if !is_map && !is_slice {
                    self.report("First argument to 'each' must be a map or unsized slice".to_string(), span);
                    return Some(Ty::Primitive(PrimitiveKind::Void));
                }

                let Some(Ty::Function {
                    params,
                    return_type,
                    ..
                }) = &callback_ty
                else {
                    self.report("Third argument to 'each' must be a function".to_string(), span);
                    return Some(Ty::Primitive(PrimitiveKind::Void));
                };

                if !matches!(**return_type, Ty::Primitive(PrimitiveKind::Bool)) {
                    self.report("Callback to 'each' must return bool".to_string(), span);
                    return Some(Ty::Primitive(PrimitiveKind::Void));
                }

                if is_map {
                    let Some(Ty::Map { key, value }) = &collection_ty else {
                        unreachable!()
                    };
                    if params.len() != 3 {
                        self.report(
                            "Callback to 'each' for map must take 3 parameters (key, value pointer, and context)"
                                .to_string(),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    }
                    if !types_equal(&params[0], key) {
                        self.report(
                            format!(
                                "First parameter of 'each' callback must match map key type: {} but got {}",
                                display_type(key, self.interner),
                                display_type(&params[0], self.interner)
                            ),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    }
                    let Ty::Pointer(value_pointee) = &params[1] else {
                        self.report(
                            "Second parameter of 'each' callback for map must be a pointer (value)".to_string(),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    };
                    if !types_equal(value_pointee, value) {
                        self.report(
                            "Second parameter of 'each' callback must match map value type".to_string(),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    }
                    if let Some(ctx_ty) = &context_ty {
                        if !types_equal(&params[2], ctx_ty) {
                            self.report(
                                "Last parameter of 'each' callback must match context type".to_string(),
                                span,
                            );
                        }
                    }
                } else {
                    let Some(Ty::Array { element, .. }) = &collection_ty else {
                        unreachable!()
                    };
                    if params.len() != 2 {
                        self.report(
                            "Callback to 'each' for slice must take 2 parameters (element pointer and context)"
                                .to_string(),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    }
                    let Ty::Pointer(element_pointee) = &params[0] else {
                        self.report(
                            "First parameter of 'each' callback for slice must be a pointer (element)".to_string(),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    };
                    if !types_equal(element_pointee, element) {
                        self.report(
                            "First parameter of 'each' callback must match slice element type".to_string(),
                            span,
                        );
                        return Some(Ty::Primitive(PrimitiveKind::Void));
                    }
                    if let Some(ctx_ty) = &context_ty {
                        if !types_equal(&params[1], ctx_ty) {
                            self.report(
                                "Last parameter of 'each' callback must match context type".to_string(),
                                span,
                            );
                        }
                    }
                }

                Some(Ty::Primitive(PrimitiveKind::Void))
            }
            VaArgI32 | VaArgI64 | VaArgF64 | VaArgPtr => {
                let Some(arg) = args.first() else {
                    self.report("variadic argument accessor requires a pointer argument".to_string(), span);
                    return None;
                };
                let Some(ty) = self.check_expr(arg) else { return None };
                if !matches!(ty, Ty::Pointer(_)) {
                    self.report("variadic argument accessor requires a pointer argument".to_string(), span);
                }
                Some(match kind {
                    VaArgI32 => Ty::Primitive(PrimitiveKind::I32),
                    VaArgI64 => Ty::Primitive(PrimitiveKind::I64),
                    VaArgF64 => Ty::Primitive(PrimitiveKind::F64),
                    VaArgPtr => Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::Void))),
                    _ => unreachable!(),
                })
            }
        }
    }

    fn check_index(&mut self, span: Span, object: &Expr, index: &Expr) -> Option<Ty> {
        let object_ty = self.check_expr(object);
        let index_ty = self.check_expr(index);
        let Some(object_ty) = object_ty else {
            self.report("Index operation on invalid type".to_string(), span);
            return None;
        };

        if let Ty::Map { key, value } = &object_ty {
            let Some(index_ty) = index_ty else {
                self.report("Map index has invalid type".to_string(), span);
                return None;
            };
            let index_ty = resolve_untyped_literal(&index_ty, Some(key));
            if !types_equal(&index_ty, key) && !i8_u8_pointer_swap(&index_ty, key) {
                self.report(
                    format!(
                        "Map key type mismatch: expected {} but got {}",
                        display_type(key, self.interner),
                        display_type(&index_ty, self.interner)
                    ),
                    span,
                );
                return None;
            }
            return Some(Ty::Pointer(Box::new((**value).clone())));
        }

        let index_ty = index_ty.map(|t| resolve_untyped_literal(&t, Some(&Ty::Primitive(PrimitiveKind::U64))));
        let Some(index_ty) = index_ty else {
            self.report("Index must be integer type".to_string(), span);
            return None;
        };
        if !is_integer_type(&index_ty) {
            self.report("Index must be integer type".to_string(), span);
            return None;
        }

        match object_ty {
            Ty::Array { element, .. } => Some(*element),
            Ty::Pointer(inner) => Some(*inner),
            _ => {
                self.report("Index operation requires array, pointer, or map type".to_string(), span);
                None
            }
        }
    }

    fn check_member(&mut self, span: Span, object: &Expr, field: Identifier) -> Option<Ty> {
        let object_ty = self.check_expr(object)?;
        if let Ty::Pointer(_) = object_ty {
            self.report("Cannot use '.' on pointer type, use '->' instead".to_string(), span);
            return None;
        }
        let Ty::Struct(struct_name) = object_ty else {
            self.report("Member access requires struct type".to_string(), span);
            return None;
        };
        let Some(struct_ty) = self.structs.get(&struct_name) else {
            return None;
        };
        let field_ty = match struct_ty.fields.iter().find(|(name, _)| *name == field.name) {
            Some((_, ty)) => ty.clone(),
            None => {
                self.report(format!("Struct has no field: {}", self.name_of(field.name)), span);
                return None;
            }
        };
        if self.name_of(field.name).starts_with('_') {
            let origin = Origin {
                is_private: true,
                defining_file: struct_ty.defining_file.clone(),
                shard: struct_ty.shard,
            };
            if !self.is_accessible(&origin) {
                self.report(
                    format!(
                        "Cannot access private field '{}' of struct '{}' from outside its defining file or shard",
                        self.name_of(field.name),
                        self.name_of(struct_name)
                    ),
                    span,
                );
            }
        }
        Some(field_ty)
    }

    fn check_enum_value(&mut self, span: Span, enum_name: Identifier, variant: Identifier) -> Option<Ty> {
        let Some(def) = self.enums.get(&enum_name.name) else {
            self.report(format!("Unknown type: {}", self.name_of(enum_name.name)), span);
            return None;
        };
        if !def.variants.contains(&variant.name) {
            self.report(
                format!(
                    "Enum '{}' has no variant '{}'",
                    self.name_of(enum_name.name),
                    self.name_of(variant.name)
                ),
                span,
            );
            return None;
        }
        Some(Ty::Named(enum_name.name))
    }

    fn check_array_literal(&mut self, span: Span, elements: &[&Expr]) -> Option<Ty> {
        let Some((first, rest)) = elements.split_first() else {
            self.report("Cannot infer type of empty array literal".to_string(), span);
            return None;
        };
        let element_ty = self.check_expr(first)?;
        let element_ty = resolve_untyped_literal(&element_ty, None);
        for e in rest {
            let Some(ty) = self.check_expr(e) else { continue };
            let ty = resolve_untyped_literal(&ty, Some(&element_ty));
            if !types_equal(&element_ty, &ty) {
                self.report("Array literal elements have inconsistent types".to_string(), span);
                return None;
            }
        }
        Some(Ty::Array {
            element: Box::new(element_ty),
            size: Some(elements.len() as u64),
        })
    }

    fn check_struct_literal(&mut self, span: Span, name: Identifier, fields: &[(Identifier, &Expr)]) -> Option<Ty> {
        if !self.structs.contains_key(&name.name) {
            self.report(format!("Unknown struct type: {}", self.name_of(name.name)), span);
            return None;
        }
        for (field_name, value) in fields {
            let field_ty = self
                .structs
                .get(&name.name)
                .and_then(|s| s.fields.iter().find(|(n, _)| n == &field_name.name).map(|(_, t)| t.clone()));
            let Some(field_ty) = field_ty else {
                self.report(format!("Struct has no field: {}", self.name_of(field_name.name)), span);
                continue;
            };
            let Some(value_ty) = self.check_expr(value) else { continue };
            let value_ty = resolve_untyped_literal(&value_ty, Some(&field_ty));
            if !is_compatible_for_assignment(&field_ty, &value_ty) {
                self.report(
                    format!("Field initializer type mismatch for: {}", self.name_of(field_name.name)),
                    span,
                );
            }
        }
        Some(Ty::Struct(name.name))
    }

    fn check_lambda(&mut self, span: Span, params: &[Param], return_type: &TypeExpr, body: &Stmt) -> Option<Ty> {
        let Some(ret_ty) = self.resolve_type_expr(return_type) else {
            self.report(
                format!("Unknown return type in lambda: {}", self.describe_type_expr(return_type)),
                return_type.span,
            );
            return None;
        };
        let mut param_tys = Vec::with_capacity(params.len());
        for param in params {
            match self.resolve_type_expr(param.ty) {
                Some(ty) => param_tys.push(ty),
                None => self.report(
                    format!("Unknown parameter type in lambda: {}", self.describe_type_expr(param.ty)),
                    param.ty.span,
                ),
            }
        }

        self.vars.push();
        let prev_return = self.current_return_type.replace(ret_ty.clone());
        for (param, ty) in params.iter().zip(param_tys.iter()) {
            let name = self.name_of(param.name.name).to_string();
            self.vars.set(&name, ty.clone());
        }
        if super::control_flow::contains_break_or_continue(body) {
            self.report("Lambda cannot contain break or continue statements".to_string(), span);
        }
        self.check_stmt(body);
        self.current_return_type = prev_return;
        self.vars.pop();

        Some(Ty::Function {
            params: param_tys,
            return_type: Box::new(ret_ty),
            is_variadic: false,
        })
    }

    // ---- helpers ---------------------------------------------------------

    fn name_of(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    fn report(&mut self, message: String, span: Span) {
        self.diagnostics.report(message, self.file.clone(), span);
    }
}

fn i8_u8_pointer_swap(a: &Ty, b: &Ty) -> bool {
    matches!(
        (a, b),
        (Ty::Pointer(x), Ty::Pointer(y))
            if matches!((&**x, &**y),
                (Ty::Primitive(PrimitiveKind::I8), Ty::Primitive(PrimitiveKind::U8))
                    | (Ty::Primitive(PrimitiveKind::U8), Ty::Primitive(PrimitiveKind::I8)))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstArena;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn check_source(source: &str) -> DiagnosticChannel {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, &mut interner).tokenize().expect("lex ok");
        let mut parser = Parser::new(source, tokens, &arena, &mut interner);
        let outcome = parser.parse_program();
        assert!(outcome.success());
        check(&outcome.declarations, &interner, "test.truk")
    }

    fn check_two_files(file_a: &str, source_a: &str, file_b: &str, source_b: &str) -> DiagnosticChannel {
        let arena_a = AstArena::new();
        let arena_b = AstArena::new();
        let mut interner = Interner::new();
        let tokens_a = Lexer::new(source_a, &mut interner).tokenize().expect("lex ok");
        let mut parser_a = Parser::new(source_a, tokens_a, &arena_a, &mut interner);
        let outcome_a = parser_a.parse_program();
        assert!(outcome_a.success());
        let tokens_b = Lexer::new(source_b, &mut interner).tokenize().expect("lex ok");
        let mut parser_b = Parser::new(source_b, tokens_b, &arena_b, &mut interner);
        let outcome_b = parser_b.parse_program();
        assert!(outcome_b.success());
        check_units(
            &[(file_a, outcome_a.declarations.as_slice()), (file_b, outcome_b.declarations.as_slice())],
            &interner,
        )
    }

    #[test]
    fn well_typed_function_has_no_diagnostics() {
        let diagnostics = check_source("fn add(a: i32, b: i32): i32 { return a + b; }");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn arithmetic_across_mismatched_types_is_rejected() {
        let diagnostics = check_source("fn f() { var a: i32 = 1; var b: i64 = 2; var c: i32 = a + b; }");
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn comparing_differently_sized_integers_is_rejected() {
        let diagnostics = check_source("fn f(): bool { var a: i32 = 1; var b: i64 = 2; return a < b; }");
        assert!(diagnostics.iter().any(|d| d.message.contains("Cannot compare i32 with i64")));
    }

    #[test]
    fn comparing_a_pointer_with_a_void_pointer_is_allowed() {
        let source = "fn f(): bool { var a: *i32 = make(@i32); var b: *void = a as *void; return a == b; }";
        let diagnostics = check_source(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics.iter().collect::<Vec<_>>());
    }

    #[test]
    fn if_condition_must_be_boolean() {
        let diagnostics = check_source("fn f() { if 1 { } }");
        assert!(diagnostics.iter().any(|d| d.message.contains("If condition must be boolean")));
    }

    #[test]
    fn undefined_identifier_is_reported() {
        let diagnostics = check_source("fn f(): i32 { return missing; }");
        assert!(diagnostics.iter().any(|d| d.message.contains("Undefined identifier")));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let diagnostics = check_source("fn f() { break; }");
        assert!(diagnostics.iter().any(|d| d.message.contains("Break statement outside of loop")));
    }

    #[test]
    fn struct_field_access_resolves_field_type() {
        let source = "struct Point { x: i32, y: i32 } fn f() { var p: Point = Point{x: 1, y: 2}; var x: i32 = p.x; }";
        let diagnostics = check_source(source);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn forward_referenced_struct_field_resolves() {
        let source = "struct A { b: B } struct B { value: i32 }";
        let diagnostics = check_source(source);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn return_type_mismatch_is_reported() {
        let diagnostics = check_source("fn f(): i32 { return true; }");
        assert!(diagnostics.iter().any(|d| d.message.contains("Return type mismatch")));
    }

    #[test]
    fn assignment_type_mismatch_is_reported() {
        let diagnostics = check_source("fn f() { var a: i32 = 1; var flag: bool = true; a = flag; }");
        assert!(diagnostics.iter().any(|d| d.message.contains("Assignment type mismatch")));
    }

    #[test]
    fn calling_a_private_function_from_its_own_defining_file_is_allowed() {
        let diagnostics = check_source("fn _hidden() {} fn b() { _hidden(); }");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn calling_a_private_function_from_another_file_with_no_shared_shard_is_rejected() {
        let diagnostics = check_two_files("a.truk", "fn _hidden() {}", "b.truk", "fn b() { _hidden(); }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Cannot call private function '_hidden' from outside its defining file or shard"));
    }

    #[test]
    fn calling_a_private_function_from_a_file_sharing_its_shard_is_allowed() {
        let diagnostics =
            check_two_files("a.truk", "shard lib; fn _hidden() {}", "b.truk", "shard lib; fn b() { _hidden(); }");
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics.iter().collect::<Vec<_>>());
    }

    #[test]
    fn accessing_a_private_field_from_another_file_with_no_shared_shard_is_rejected() {
        let diagnostics = check_two_files(
            "a.truk",
            "struct Point { _x: i32 }",
            "b.truk",
            "fn f(p: Point): i32 { return p._x; }",
        );
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("Cannot access private field '_x' of struct 'Point'")));
    }

    #[test]
    fn accessing_a_private_global_from_another_file_with_no_shared_shard_is_rejected() {
        let diagnostics = check_two_files("a.truk", "var _count: i32 = 0;", "b.truk", "fn f(): i32 { return _count; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Cannot access private global variable '_count' from outside its defining file or shard"));
    }
}
