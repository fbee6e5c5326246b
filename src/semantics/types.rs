//! The resolved-type model the checker compares against: a plain sum
//! type rather than one flat struct with a `kind` tag and a dozen
//! optional fields, so `types_equal` falls out of `PartialEq` rather
//! than a dozen manually-compared fields.

use crate::ast::PrimitiveKind;
use crate::intern::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    /// Includes `PrimitiveKind::Void` — there is no separate void variant,
    /// the AST already models `void` as a primitive.
    Primitive(PrimitiveKind),
    /// A user enum, resolved by name. Enums carry no further structure the
    /// checker needs to compare against — variant membership is checked
    /// against the enum registry, not against this type.
    Named(Symbol),
    /// A user struct, resolved by name; field lookup goes through the
    /// struct registry built by the collector, not through this type.
    Struct(Symbol),
    Pointer(Box<Ty>),
    /// `size: None` is an unsized slice; `Some(n)` a sized array.
    Array { element: Box<Ty>, size: Option<u64> },
    Function {
        params: Vec<Ty>,
        return_type: Box<Ty>,
        is_variadic: bool,
    },
    Map { key: Box<Ty>, value: Box<Ty> },
    Tuple(Vec<Ty>),
    /// Literal types before bidirectional inference resolves them. Never
    /// equal to anything, including each other — they must resolve first.
    UntypedInteger,
    UntypedFloat,
}

impl Ty {
    pub fn pointer_depth(&self) -> u32 {
        match self {
            Ty::Pointer(inner) => 1 + inner.pointer_depth(),
            _ => 0,
        }
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Ty::UntypedInteger | Ty::UntypedFloat)
    }
}

/// Two resolved types are equal iff every field matches, and untyped
/// literal types are never equal to anything.
pub fn types_equal(a: &Ty, b: &Ty) -> bool {
    if a.is_untyped() || b.is_untyped() {
        return false;
    }
    a == b
}

pub fn is_numeric_type(ty: &Ty) -> bool {
    use PrimitiveKind::*;
    matches!(
        ty,
        Ty::Primitive(I8 | I16 | I32 | I64 | U8 | U16 | U32 | U64 | F32 | F64)
    )
}

pub fn is_integer_type(ty: &Ty) -> bool {
    use PrimitiveKind::*;
    matches!(ty, Ty::Primitive(I8 | I16 | I32 | I64 | U8 | U16 | U32 | U64))
}

pub fn is_boolean_type(ty: &Ty) -> bool {
    matches!(ty, Ty::Primitive(PrimitiveKind::Bool))
}

pub fn is_comparable_type(ty: &Ty) -> bool {
    is_numeric_type(ty) || is_boolean_type(ty) || matches!(ty, Ty::Pointer(_))
}

/// Primitives, or a single-level pointer to `u8`/`i8` (C-string convention).
pub fn is_valid_map_key_type(ty: &Ty) -> bool {
    if is_numeric_type(ty) || is_boolean_type(ty) {
        return true;
    }
    matches!(
        ty,
        Ty::Pointer(inner) if matches!(**inner, Ty::Primitive(PrimitiveKind::U8 | PrimitiveKind::I8))
    )
}

/// `target <- source` legality.
pub fn is_compatible_for_assignment(target: &Ty, source: &Ty) -> bool {
    if types_equal(target, source) {
        return true;
    }
    if is_numeric_type(target) && is_numeric_type(source) {
        return true;
    }
    if let (Ty::Pointer(t_inner), Ty::Pointer(s_inner)) = (target, source) {
        if matches!(**t_inner, Ty::Primitive(PrimitiveKind::Void)) || matches!(**s_inner, Ty::Primitive(PrimitiveKind::Void)) {
            return true;
        }
        let i8_u8_swap = matches!(
            (&**t_inner, &**s_inner),
            (Ty::Primitive(PrimitiveKind::I8), Ty::Primitive(PrimitiveKind::U8))
                | (Ty::Primitive(PrimitiveKind::U8), Ty::Primitive(PrimitiveKind::I8))
        );
        if i8_u8_swap {
            return true;
        }
    }
    if let (
        Ty::Function {
            params: t_params,
            return_type: t_ret,
            is_variadic: t_var,
        },
        Ty::Function {
            params: s_params,
            return_type: s_ret,
            is_variadic: s_var,
        },
    ) = (target, source)
    {
        return t_params.len() == s_params.len()
            && t_params.iter().zip(s_params).all(|(a, b)| types_equal(a, b))
            && types_equal(t_ret, s_ret)
            && t_var == s_var;
    }
    false
}

/// Coerces an untyped literal against an (optional) target type. Returns
/// the literal's type unchanged if it is already resolved.
pub fn resolve_untyped_literal(literal: &Ty, target: Option<&Ty>) -> Ty {
    if !literal.is_untyped() {
        return literal.clone();
    }
    let default = || match literal {
        Ty::UntypedInteger => Ty::Primitive(PrimitiveKind::I32),
        _ => Ty::Primitive(PrimitiveKind::F64),
    };
    let Some(target) = target else {
        return default();
    };
    match literal {
        Ty::UntypedInteger if is_numeric_type(target) || is_integer_type(target) => target.clone(),
        Ty::UntypedFloat if is_numeric_type(target) => target.clone(),
        _ => default(),
    }
}

/// Human-readable rendering for diagnostics.
pub fn display_type(ty: &Ty, interner: &crate::intern::Interner) -> String {
    match ty {
        Ty::Primitive(p) => p.name().to_string(),
        Ty::Named(sym) | Ty::Struct(sym) => interner.resolve(*sym).to_string(),
        Ty::Pointer(inner) => format!("*{}", display_type(inner, interner)),
        Ty::Array { element, size: Some(n) } => format!("[{}]{}", n, display_type(element, interner)),
        Ty::Array { element, size: None } => format!("[]{}", display_type(element, interner)),
        Ty::Function {
            params,
            return_type,
            is_variadic,
        } => {
            let mut parts: Vec<String> = params.iter().map(|p| display_type(p, interner)).collect();
            if *is_variadic {
                parts.push("...".to_string());
            }
            format!("fn({}): {}", parts.join(", "), display_type(return_type, interner))
        }
        Ty::Map { key, value } => format!("map[{}, {}]", display_type(key, interner), display_type(value, interner)),
        Ty::Tuple(elems) => {
            let parts: Vec<String> = elems.iter().map(|e| display_type(e, interner)).collect();
            format!("({})", parts.join(", "))
        }
        Ty::UntypedInteger => "untyped integer".to_string(),
        Ty::UntypedFloat => "untyped float".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i32_ty() -> Ty {
        Ty::Primitive(PrimitiveKind::I32)
    }
    fn i64_ty() -> Ty {
        Ty::Primitive(PrimitiveKind::I64)
    }

    #[test]
    fn untyped_types_are_never_equal() {
        assert!(!types_equal(&Ty::UntypedInteger, &Ty::UntypedInteger));
        assert!(!types_equal(&Ty::UntypedInteger, &i32_ty()));
    }

    #[test]
    fn identical_primitives_are_equal() {
        assert!(types_equal(&i32_ty(), &i32_ty()));
        assert!(!types_equal(&i32_ty(), &i64_ty()));
    }

    #[test]
    fn pointer_depth_counts_nesting() {
        let pp = Ty::Pointer(Box::new(Ty::Pointer(Box::new(i32_ty()))));
        assert_eq!(pp.pointer_depth(), 2);
    }

    #[test]
    fn numeric_cross_width_assignment_is_allowed_but_not_arithmetic_equal() {
        assert!(is_compatible_for_assignment(&i32_ty(), &i64_ty()));
        assert!(!types_equal(&i32_ty(), &i64_ty()));
    }

    #[test]
    fn void_pointer_is_compatible_with_any_pointer() {
        let void_ptr = Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::Void)));
        let i32_ptr = Ty::Pointer(Box::new(i32_ty()));
        assert!(is_compatible_for_assignment(&void_ptr, &i32_ptr));
        assert!(is_compatible_for_assignment(&i32_ptr, &void_ptr));
    }

    #[test]
    fn i8_u8_pointer_swap_is_compatible() {
        let i8_ptr = Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::I8)));
        let u8_ptr = Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::U8)));
        assert!(is_compatible_for_assignment(&i8_ptr, &u8_ptr));
        assert!(is_compatible_for_assignment(&u8_ptr, &i8_ptr));
    }

    #[test]
    fn mismatched_pointee_pointers_are_incompatible() {
        let i32_ptr = Ty::Pointer(Box::new(i32_ty()));
        let i64_ptr = Ty::Pointer(Box::new(i64_ty()));
        assert!(!is_compatible_for_assignment(&i32_ptr, &i64_ptr));
    }

    #[test]
    fn map_key_accepts_primitives_and_byte_string_pointers() {
        assert!(is_valid_map_key_type(&i32_ty()));
        assert!(is_valid_map_key_type(&Ty::Primitive(PrimitiveKind::Bool)));
        assert!(is_valid_map_key_type(&Ty::Pointer(Box::new(Ty::Primitive(PrimitiveKind::U8)))));
        assert!(!is_valid_map_key_type(&Ty::Pointer(Box::new(i32_ty()))));
        assert!(!is_valid_map_key_type(&Ty::Primitive(PrimitiveKind::Void)));
    }

    #[test]
    fn resolve_untyped_integer_prefers_target_numeric_type() {
        let resolved = resolve_untyped_literal(&Ty::UntypedInteger, Some(&i64_ty()));
        assert_eq!(resolved, i64_ty());
    }

    #[test]
    fn resolve_untyped_integer_defaults_to_i32_without_target() {
        assert_eq!(resolve_untyped_literal(&Ty::UntypedInteger, None), i32_ty());
    }

    #[test]
    fn resolve_untyped_float_defaults_to_f64_without_target() {
        assert_eq!(
            resolve_untyped_literal(&Ty::UntypedFloat, None),
            Ty::Primitive(PrimitiveKind::F64)
        );
    }

    #[test]
    fn resolve_untyped_float_rejects_non_numeric_target_and_falls_back() {
        let resolved = resolve_untyped_literal(&Ty::UntypedFloat, Some(&Ty::Primitive(PrimitiveKind::Void)));
        assert_eq!(resolved, Ty::Primitive(PrimitiveKind::F64));
    }

    #[test]
    fn function_types_compare_params_return_and_variadic_flag() {
        let f1 = Ty::Function {
            params: vec![i32_ty()],
            return_type: Box::new(Ty::Primitive(PrimitiveKind::Void)),
            is_variadic: false,
        };
        let f2 = f1.clone();
        let f3 = Ty::Function {
            params: vec![i64_ty()],
            return_type: Box::new(Ty::Primitive(PrimitiveKind::Void)),
            is_variadic: false,
        };
        assert!(is_compatible_for_assignment(&f1, &f2));
        assert!(!is_compatible_for_assignment(&f1, &f3));
    }
}
