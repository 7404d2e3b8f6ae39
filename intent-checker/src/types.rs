//! Semantic type representation for the Intent language
//!
//! Type expressions from the AST are lowered into [`Type`] by the checker.
//! [`TypeTable`] owns the declared types and answers the two questions the
//! rest of the checker asks: is `actual` assignable to `expected`, and what
//! is the common type of two branches.

use intent_parser::{Literal, Primitive, Span};
use std::collections::HashMap;
use std::fmt;

/// Alias chains longer than this are treated as cyclic
const MAX_DEPTH: usize = 32;

/// Semantic types
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    String,
    Bool,
    Unit,
    /// Error recovery; compatible with everything
    Unknown,
    Literal(Literal),
    /// Reference to a declared type
    Named(String),
    Record(Vec<(String, Type)>),
    Union(Vec<Ctor>),
    Brand {
        brand: String,
        base: Box<Type>,
    },
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Result(Box<Type>, Box<Type>),
    Option(Box<Type>),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// The type of a capability binding, named by its capability type
    Capability(String),
}

/// One alternative of a union type
#[derive(Debug, Clone, PartialEq)]
pub enum Ctor {
    Literal(Literal),
    Tag {
        name: String,
        fields: Option<Vec<(String, Type)>>,
    },
}

impl Ctor {
    /// Tag name, or the literal's value key
    pub fn key(&self) -> String {
        match self {
            Ctor::Literal(literal) => literal.key(),
            Ctor::Tag { name, .. } => name.clone(),
        }
    }

    pub fn fields(&self) -> Option<&[(String, Type)]> {
        match self {
            Ctor::Tag { fields: Some(fields), .. } => Some(fields),
            _ => None,
        }
    }
}

impl From<Primitive> for Type {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Int => Type::Int,
            Primitive::Float => Type::Float,
            Primitive::String => Type::String,
            Primitive::Bool => Type::Bool,
            Primitive::Unit => Type::Unit,
        }
    }
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn option(inner: Type) -> Self {
        Type::Option(Box::new(inner))
    }

    pub fn result(ok: Type, err: Type) -> Self {
        Type::Result(Box::new(ok), Box::new(err))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// The primitive a literal belongs to
    pub fn primitive_of(literal: &Literal) -> Type {
        match literal {
            Literal::Int(_) => Type::Int,
            Literal::Float(_) => Type::Float,
            Literal::String(_) => Type::String,
            Literal::Bool(_) => Type::Bool,
        }
    }

    /// Widen literal types to their primitive, as `let` bindings do
    pub fn widen(&self) -> Type {
        match self {
            Type::Literal(literal) => Type::primitive_of(literal),
            Type::Union(ctors) => {
                let mut primitives = ctors.iter().map(|ctor| match ctor {
                    Ctor::Literal(literal) => Some(Type::primitive_of(literal)),
                    Ctor::Tag { .. } => None,
                });
                let first = match primitives.next() {
                    Some(Some(first)) => first,
                    _ => return self.clone(),
                };
                if primitives.all(|p| p.as_ref() == Some(&first)) {
                    first
                } else {
                    self.clone()
                }
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::String => write!(f, "String"),
            Type::Bool => write!(f, "Bool"),
            Type::Unit => write!(f, "Unit"),
            Type::Unknown => write!(f, "unknown"),
            Type::Literal(literal) => write!(f, "{}", literal),
            Type::Named(name) => write!(f, "{}", name),
            Type::Record(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .collect();
                write!(f, "{{ {} }}", fields.join(", "))
            }
            Type::Union(ctors) => {
                let keys: Vec<String> = ctors.iter().map(Ctor::key).collect();
                write!(f, "{}", keys.join(" | "))
            }
            Type::Brand { brand, base } => write!(f, "{} brand \"{}\"", base, brand),
            Type::List(element) => write!(f, "List<{}>", element),
            Type::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            Type::Result(ok, err) => write!(f, "Result<{}, {}>", ok, err),
            Type::Option(inner) => write!(f, "Option<{}>", inner),
            Type::Function { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                write!(f, "({}) -> {}", params.join(", "), ret)
            }
            Type::Capability(name) => write!(f, "{}", name),
        }
    }
}

/// A declared type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

impl TypeDef {
    /// Unions and brands are compared by name, everything else by shape
    pub fn is_nominal(&self) -> bool {
        matches!(self.ty, Type::Union(_) | Type::Brand { .. })
    }
}

/// Declared types, in declaration order
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    defs: HashMap<String, TypeDef>,
    order: Vec<String>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the name is already taken
    pub fn insert(&mut self, def: TypeDef) -> bool {
        if self.defs.contains_key(&def.name) {
            return false;
        }
        self.order.push(def.name.clone());
        self.defs.insert(def.name.clone(), def);
        true
    }

    /// Replace the definition of an already registered name
    pub fn define(&mut self, name: &str, ty: Type) {
        if let Some(def) = self.defs.get_mut(name) {
            def.ty = ty;
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn defs(&self) -> impl Iterator<Item = &TypeDef> {
        self.order.iter().filter_map(move |name| self.defs.get(name))
    }

    /// Expand structural aliases; nominal names stay as they are
    pub fn expand(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        for _ in 0..MAX_DEPTH {
            match &current {
                Type::Named(name) => match self.defs.get(name) {
                    Some(def) if !def.is_nominal() => current = def.ty.clone(),
                    _ => return current,
                },
                _ => return current,
            }
        }
        Type::Unknown
    }

    /// Expand every declared name, nominal ones included
    pub fn resolve(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        for _ in 0..MAX_DEPTH {
            match &current {
                Type::Named(name) => match self.defs.get(name) {
                    Some(def) => current = def.ty.clone(),
                    None => return Type::Unknown,
                },
                _ => return current,
            }
        }
        Type::Unknown
    }

    /// Strip brands down to the structural base
    pub fn underlying(&self, ty: &Type) -> Type {
        let mut current = self.resolve(ty);
        for _ in 0..MAX_DEPTH {
            match current {
                Type::Brand { base, .. } => current = self.resolve(&base),
                other => return other,
            }
        }
        Type::Unknown
    }

    /// Constructors of a declared or inline union
    pub fn union_ctors(&self, ty: &Type) -> Option<Vec<Ctor>> {
        match self.resolve(ty) {
            Type::Union(ctors) => Some(ctors),
            _ => None,
        }
    }

    /// Whether a value of type `actual` may be used where `expected` is required
    pub fn is_assignable(&self, actual: &Type, expected: &Type) -> bool {
        self.assignable(actual, expected, 0)
    }

    fn assignable(&self, actual: &Type, expected: &Type, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return true;
        }
        if actual.is_unknown() || expected.is_unknown() {
            return true;
        }
        if let (Type::Named(a), Type::Named(b)) = (actual, expected) {
            if a == b {
                return true;
            }
        }

        let actual = self.expand(actual);
        let expected = self.expand(expected);
        let depth = depth + 1;

        match (&actual, &expected) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Int, Type::Int)
            | (Type::Float, Type::Float)
            | (Type::String, Type::String)
            | (Type::Bool, Type::Bool)
            | (Type::Unit, Type::Unit)
            | (Type::Int, Type::Float) => true,

            (Type::Literal(a), Type::Literal(b)) => a.key() == b.key(),
            (Type::Literal(literal), _) => match self.expected_ctors(&expected) {
                Some(ctors) => ctors
                    .iter()
                    .any(|ctor| matches!(ctor, Ctor::Literal(l) if l.key() == literal.key())),
                None => self.assignable(&Type::primitive_of(literal), &expected, depth),
            },

            (Type::Named(a), Type::Named(b)) if a == b => true,
            (Type::Named(name), _) => match self.get(name).map(|def| &def.ty) {
                Some(Type::Brand { base, .. }) => self.assignable(base, &expected, depth),
                // Declared unions only match themselves
                Some(Type::Union(_)) => false,
                Some(other) => self.assignable(other, &expected, depth),
                None => false,
            },

            (Type::Brand { brand: a, base: base_a }, Type::Brand { brand: b, base: base_b }) => {
                (a == b && self.assignable(base_a, base_b, depth)) || self.assignable(base_a, &expected, depth)
            }
            (Type::Brand { base, .. }, _) => self.assignable(base, &expected, depth),

            (Type::Union(ctors), _) => match self.expected_ctors(&expected) {
                Some(expected_ctors) => ctors
                    .iter()
                    .all(|ctor| expected_ctors.iter().any(|e| e.key() == ctor.key())),
                None => ctors.iter().all(|ctor| match ctor {
                    Ctor::Literal(literal) => self.assignable(&Type::Literal(literal.clone()), &expected, depth),
                    Ctor::Tag { .. } => false,
                }),
            },

            (Type::Record(actual_fields), Type::Record(expected_fields)) => {
                expected_fields.iter().all(|(name, expected_ty)| {
                    actual_fields
                        .iter()
                        .find(|(field, _)| field == name)
                        .map(|(_, actual_ty)| self.assignable(actual_ty, expected_ty, depth))
                        .unwrap_or(false)
                })
            }

            (Type::List(a), Type::List(b)) | (Type::Option(a), Type::Option(b)) => {
                self.assignable(a, b, depth)
            }
            (Type::Map(ka, va), Type::Map(kb, vb)) | (Type::Result(ka, va), Type::Result(kb, vb)) => {
                self.assignable(ka, kb, depth) && self.assignable(va, vb, depth)
            }

            (
                Type::Function { params: pa, ret: ra },
                Type::Function { params: pb, ret: rb },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(a, b)| self.assignable(b, a, depth))
                    && self.assignable(ra, rb, depth)
            }

            (Type::Capability(a), Type::Capability(b)) => a == b,

            _ => false,
        }
    }

    /// Union constructors when `expected` is a union, declared or inline
    fn expected_ctors(&self, expected: &Type) -> Option<Vec<Ctor>> {
        match expected {
            Type::Union(ctors) => Some(ctors.clone()),
            Type::Named(name) => match self.get(name).map(|def| &def.ty) {
                Some(Type::Union(ctors)) => Some(ctors.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Common type of two branches, or `None` when they are unrelated
    pub fn join(&self, a: &Type, b: &Type) -> Option<Type> {
        if a.is_unknown() {
            return Some(b.clone());
        }
        if b.is_unknown() || a == b {
            return Some(a.clone());
        }

        if let (Some(mut left), Some(right)) = (literal_ctors(a), literal_ctors(b)) {
            if a.widen() == b.widen() {
                for ctor in right {
                    if !left.contains(&ctor) {
                        left.push(ctor);
                    }
                }
                return Some(Type::Union(left));
            }
        }

        if self.is_assignable(a, b) {
            Some(b.clone())
        } else if self.is_assignable(b, a) {
            Some(a.clone())
        } else {
            None
        }
    }
}

/// Literal alternatives of a literal type or an all-literal inline union
fn literal_ctors(ty: &Type) -> Option<Vec<Ctor>> {
    match ty {
        Type::Literal(literal) => Some(vec![Ctor::Literal(literal.clone())]),
        Type::Union(ctors) if ctors.iter().all(|c| matches!(c, Ctor::Literal(_))) => Some(ctors.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(value: &str) -> Type {
        Type::Literal(Literal::String(value.to_string()))
    }

    fn table() -> TypeTable {
        let mut table = TypeTable::new();
        let span = Span::default();
        table.insert(TypeDef {
            name: "Status".to_string(),
            ty: Type::Union(vec![
                Ctor::Literal(Literal::String("active".to_string())),
                Ctor::Literal(Literal::String("inactive".to_string())),
            ]),
            span,
        });
        table.insert(TypeDef {
            name: "UserId".to_string(),
            ty: Type::Brand {
                brand: "UserId".to_string(),
                base: Box::new(Type::String),
            },
            span,
        });
        table.insert(TypeDef {
            name: "User".to_string(),
            ty: Type::Record(vec![
                ("id".to_string(), Type::Named("UserId".to_string())),
                ("name".to_string(), Type::String),
            ]),
            span,
        });
        table.insert(TypeDef {
            name: "Names".to_string(),
            ty: Type::list(Type::String),
            span,
        });
        table
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::result(Type::Int, Type::String).to_string(), "Result<Int, String>");
        assert_eq!(Type::function(vec![Type::Int], Type::Bool).to_string(), "(Int) -> Bool");
        assert_eq!(Type::Unknown.to_string(), "unknown");
        assert_eq!(string("active").to_string(), "\"active\"");
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut table = table();
        let again = table.get("Status").unwrap().clone();
        assert!(!table.insert(again));
    }

    #[test]
    fn test_primitives_and_widening() {
        let table = table();
        assert!(table.is_assignable(&Type::Int, &Type::Float));
        assert!(!table.is_assignable(&Type::Float, &Type::Int));
        assert!(table.is_assignable(&Type::Literal(Literal::Int(1)), &Type::Float));
        assert!(table.is_assignable(&Type::Unknown, &Type::Bool));
        assert!(!table.is_assignable(&Type::String, &Type::Bool));
    }

    #[test]
    fn test_literal_unions() {
        let table = table();
        let status = Type::Named("Status".to_string());
        assert!(table.is_assignable(&string("active"), &status));
        assert!(!table.is_assignable(&string("paused"), &status));
        assert!(!table.is_assignable(&Type::String, &status));
        assert!(table.is_assignable(&status, &status));
    }

    #[test]
    fn test_brands_are_nominal() {
        let table = table();
        let user_id = Type::Named("UserId".to_string());
        assert!(table.is_assignable(&user_id, &Type::String));
        assert!(!table.is_assignable(&Type::String, &user_id));
        assert!(!table.is_assignable(&string("u-1"), &user_id));
    }

    #[test]
    fn test_records_use_width_subtyping() {
        let table = table();
        let user = Type::Named("User".to_string());
        let wider = Type::Record(vec![
            ("id".to_string(), Type::Named("UserId".to_string())),
            ("name".to_string(), Type::String),
            ("age".to_string(), Type::Int),
        ]);
        let narrower = Type::Record(vec![("name".to_string(), Type::String)]);
        assert!(table.is_assignable(&wider, &user));
        assert!(!table.is_assignable(&narrower, &user));
    }

    #[test]
    fn test_aliases_expand_structurally() {
        let table = table();
        assert!(table.is_assignable(&Type::list(Type::String), &Type::Named("Names".to_string())));
        assert!(!table.is_assignable(&Type::list(Type::Int), &Type::Named("Names".to_string())));
    }

    #[test]
    fn test_join() {
        let table = table();
        assert_eq!(table.join(&Type::Int, &Type::Float), Some(Type::Float));
        assert_eq!(table.join(&Type::Unknown, &Type::Bool), Some(Type::Bool));
        assert_eq!(table.join(&Type::String, &Type::Bool), None);

        let joined = table.join(&string("a"), &string("b")).unwrap();
        assert_eq!(joined.to_string(), "\"a\" | \"b\"");
        assert_eq!(joined.widen(), Type::String);
        assert_eq!(table.join(&string("a"), &Type::Literal(Literal::Int(1))), None);
    }

    #[test]
    fn test_cyclic_aliases_resolve_to_unknown() {
        let mut table = TypeTable::new();
        let span = Span::default();
        table.insert(TypeDef { name: "A".to_string(), ty: Type::Named("B".to_string()), span });
        table.insert(TypeDef { name: "B".to_string(), ty: Type::Named("A".to_string()), span });
        assert_eq!(table.expand(&Type::Named("A".to_string())), Type::Unknown);
    }
}
