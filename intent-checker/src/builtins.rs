//! Built-in functions available in every body without declaration

use crate::types::Type;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Signature of a built-in function
#[derive(Debug, Clone, PartialEq)]
pub struct Builtin {
    pub name: &'static str,
    pub params: Vec<Type>,
    /// Leading parameters that must be supplied
    pub required: usize,
    pub ret: Type,
}

/// Names of every built-in, in table order
pub const NAMES: [&str; 4] = ["assert", "assertEq", "len", "toString"];

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let builtins = [
        Builtin {
            name: "assert",
            params: vec![Type::Bool, Type::String],
            required: 1,
            ret: Type::Unit,
        },
        Builtin {
            name: "assertEq",
            params: vec![Type::Unknown, Type::Unknown],
            required: 2,
            ret: Type::Unit,
        },
        Builtin {
            name: "len",
            params: vec![Type::Unknown],
            required: 1,
            ret: Type::Int,
        },
        Builtin {
            name: "toString",
            params: vec![Type::Unknown],
            required: 1,
            ret: Type::String,
        },
    ];

    builtins.into_iter().map(|b| (b.name, b)).collect()
});

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}
