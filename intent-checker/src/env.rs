//! Program-level symbol tables and lexical scopes

use crate::builtins;
use crate::types::{Type, TypeTable};
use im::OrdMap;
use intent_parser::Span;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Func,
    Effect,
    Builtin,
}

/// A resolved function, effect or built-in signature
#[derive(Debug, Clone, PartialEq)]
pub struct Callable {
    pub name: String,
    pub kind: CallableKind,
    pub params: Vec<Type>,
    pub required: usize,
    pub ret: Type,
    pub span: Option<Span>,
}

impl Callable {
    pub fn ty(&self) -> Type {
        Type::function(self.params.clone(), self.ret.clone())
    }

    /// `"2"` or `"1 to 2"` when trailing parameters are optional
    pub fn arity_label(&self) -> String {
        if self.required == self.params.len() {
            self.params.len().to_string()
        } else {
            format!("{} to {}", self.required, self.params.len())
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        self.required <= count && count <= self.params.len()
    }
}

/// A capability binding from the `uses` section
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityInfo {
    pub name: String,
    pub capability: String,
    pub span: Span,
}

/// Everything declared at program scope
#[derive(Debug, Clone, Default)]
pub struct GlobalEnv {
    pub types: TypeTable,
    /// Constructor tag to the unions declaring it, in declaration order
    ctor_index: HashMap<String, Vec<String>>,
    callables: HashMap<String, Callable>,
    capabilities: HashMap<String, CapabilityInfo>,
}

impl GlobalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the capability name is already declared
    pub fn declare_capability(&mut self, info: CapabilityInfo) -> bool {
        if self.capabilities.contains_key(&info.name) {
            return false;
        }
        self.capabilities.insert(info.name.clone(), info);
        true
    }

    pub fn capability(&self, name: &str) -> Option<&CapabilityInfo> {
        self.capabilities.get(name)
    }

    pub fn is_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    /// Returns false if the name is already declared
    pub fn declare_callable(&mut self, callable: Callable) -> bool {
        if self.callables.contains_key(&callable.name) {
            return false;
        }
        self.callables.insert(callable.name.clone(), callable);
        true
    }

    /// User declarations shadow built-ins
    pub fn callable(&self, name: &str) -> Option<Callable> {
        if let Some(callable) = self.callables.get(name) {
            return Some(callable.clone());
        }
        builtins::lookup(name).map(|builtin| Callable {
            name: builtin.name.to_string(),
            kind: CallableKind::Builtin,
            params: builtin.params.clone(),
            required: builtin.required,
            ret: builtin.ret.clone(),
            span: None,
        })
    }

    pub fn callable_names(&self) -> impl Iterator<Item = &str> {
        self.callables.keys().map(String::as_str).chain(builtins::NAMES)
    }

    pub fn index_ctor(&mut self, tag: &str, union: &str) {
        self.ctor_index
            .entry(tag.to_string())
            .or_default()
            .push(union.to_string());
    }

    pub fn ctor_owners(&self, tag: &str) -> &[String] {
        self.ctor_index.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ctor_names(&self) -> impl Iterator<Item = &str> {
        self.ctor_index.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    Let,
    Const,
    Param,
    Pattern,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub ty: Type,
    pub kind: LocalKind,
    pub span: Span,
}

/// Lexical bindings visible at one point of a body.
///
/// Backed by a persistent map, so saving a scope before entering a block and
/// restoring it afterwards is a cheap clone.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    locals: OrdMap<String, Local>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later bindings shadow earlier ones
    pub fn bind(&mut self, name: &str, ty: Type, kind: LocalKind, span: Span) {
        self.locals.insert(name.to_string(), Local { ty, kind, span });
    }

    pub fn lookup(&self, name: &str) -> Option<&Local> {
        self.locals.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locals.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restore_drops_inner_bindings() {
        let mut scope = Scope::new();
        scope.bind("x", Type::Int, LocalKind::Param, Span::default());

        let saved = scope.clone();
        scope.bind("y", Type::Bool, LocalKind::Let, Span::default());
        scope.bind("x", Type::String, LocalKind::Let, Span::default());
        assert_eq!(scope.lookup("x").unwrap().ty, Type::String);

        scope = saved;
        assert!(scope.lookup("y").is_none());
        assert_eq!(scope.lookup("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn test_user_callables_shadow_builtins() {
        let mut env = GlobalEnv::new();
        assert_eq!(env.callable("len").unwrap().kind, CallableKind::Builtin);

        env.declare_callable(Callable {
            name: "len".to_string(),
            kind: CallableKind::Func,
            params: vec![Type::String],
            required: 1,
            ret: Type::Int,
            span: None,
        });
        assert_eq!(env.callable("len").unwrap().kind, CallableKind::Func);
    }

    #[test]
    fn test_arity_label() {
        let env = GlobalEnv::new();
        let assert = env.callable("assert").unwrap();
        assert_eq!(assert.arity_label(), "1 to 2");
        assert!(assert.accepts_arity(1));
        assert!(!assert.accepts_arity(3));
    }
}
