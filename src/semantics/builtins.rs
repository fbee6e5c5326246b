//! Builtin call recognition. A builtin is recognized purely by name at
//! the call site (`check_call` in `checker.rs`) since these names are
//! never declared as ordinary functions or variables, so there is
//! nothing to register ahead of time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// `make(@T)` allocates one `T` (or unwraps to the map type itself for
    /// `make(@Map[K, V])`); `make(@T, count)` allocates an unsized slice.
    Make,
    /// `delete(x)` releases a pointer, array, or map allocation.
    Delete,
    /// `len(x)` returns the element/entry count of an array, map, or
    /// pointer-to-array allocation.
    Len,
    /// `sizeof(@T)` or `sizeof(x)` returns a type's size in bytes.
    Sizeof,
    /// `panic(message)` aborts the program with a diagnostic message.
    Panic,
    /// `each(collection, context, callback)` iterates a collection,
    /// invoking `callback` with the context and each element/entry.
    Each,
    VaArgI32,
    VaArgI64,
    VaArgF64,
    VaArgPtr,
}

pub fn lookup(name: &str) -> Option<BuiltinKind> {
    use BuiltinKind::*;
    Some(match name {
        "make" => Make,
        "delete" => Delete,
        "len" => Len,
        "sizeof" => Sizeof,
        "panic" => Panic,
        "each" => Each,
        "__TRUK_VA_ARG_I32" => VaArgI32,
        "__TRUK_VA_ARG_I64" => VaArgI64,
        "__TRUK_VA_ARG_F64" => VaArgF64,
        "__TRUK_VA_ARG_PTR" => VaArgPtr,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_builtin_names_resolve() {
        assert_eq!(lookup("make"), Some(BuiltinKind::Make));
        assert_eq!(lookup("each"), Some(BuiltinKind::Each));
        assert_eq!(lookup("__TRUK_VA_ARG_I32"), Some(BuiltinKind::VaArgI32));
    }

    #[test]
    fn ordinary_identifiers_are_not_builtins() {
        assert_eq!(lookup("make_widget"), None);
        assert_eq!(lookup("user_function"), None);
    }
}
