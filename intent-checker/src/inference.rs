//! Expression typing
//!
//! Types are computed bottom-up in a single pass; there are no type
//! variables. Anything that cannot be typed becomes [`Type::Unknown`] after
//! its diagnostic is reported, which keeps follow-up errors from cascading.

use crate::{
    checker::Checker,
    diagnostics::DiagnosticCode,
    env::{CallableKind, LocalKind},
    types::{Ctor, Type},
};
use intent_parser::{
    BinaryOp, Expr, HasSpan, Ident, LambdaBody, ObjectField, Span, UnaryOp,
};
use std::collections::HashSet;

impl Checker {
    pub(crate) fn infer_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Literal { value, .. } => Type::Literal(value.clone()),
            Expr::Ident(ident) => self.resolve_ident(ident),
            Expr::Object { fields, .. } => Type::Record(self.infer_fields(fields, "object literal")),
            Expr::Array { elements, .. } => {
                let mut element = Type::Unknown;
                for item in elements {
                    let ty = self.infer_expr(item);
                    element = self.join_or_report(&element, &ty, item.span());
                }
                Type::list(element)
            }
            Expr::Map { entries, .. } => {
                let mut key = Type::Unknown;
                let mut value = Type::Unknown;
                for entry in entries {
                    let key_ty = self.infer_expr(&entry.key);
                    key = self.join_or_report(&key, &key_ty, entry.key.span());
                    let value_ty = self.infer_expr(&entry.value);
                    value = self.join_or_report(&value, &value_ty, entry.value.span());
                }
                Type::Map(Box::new(key), Box::new(value))
            }
            Expr::Call { callee, args, span } => self.infer_call(callee, args, *span),
            Expr::Member { object, property, .. } => {
                let object_ty = self.infer_expr(object);
                self.member_type(&object_ty, property)
            }
            Expr::Index { object, index, span } => {
                let object_ty = self.infer_expr(object);
                let index_ty = self.infer_expr(index);
                self.index_type(&object_ty, &index_ty, *span)
            }
            Expr::Unary { op, operand, span } => {
                let operand_ty = self.infer_expr(operand);
                self.unary_type(*op, &operand_ty, *span)
            }
            Expr::Update { op, target, .. } => self.check_update(target, *op),
            Expr::Binary { op, left, right, span } => {
                let left_ty = self.infer_expr(left);
                let right_ty = self.infer_expr(right);
                self.binary_result(*op, &left_ty, &right_ty, *span)
            }
            Expr::Assign { op, target, value, span } => self.check_assignment(target, *op, value, *span),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(condition);
                let then_ty = self.infer_expr(then_branch);
                let else_ty = self.infer_expr(else_branch);
                self.join_or_report(&then_ty, &else_ty, else_branch.span())
            }
            Expr::Ok { value, .. } => Type::result(self.infer_expr(value), Type::Unknown),
            Expr::Err { value, .. } => Type::result(Type::Unknown, self.infer_expr(value)),
            Expr::Some { value, .. } => Type::option(self.infer_expr(value)),
            Expr::None { .. } => Type::option(Type::Unknown),
            Expr::BrandCast { brand, value, .. } => {
                let value_ty = self.infer_expr(value);
                self.brand_cast(brand, &value_ty, value.span())
            }
            Expr::Variant { tag, fields, span } => self.check_variant(tag, fields, *span),
            Expr::Match(m) => self.check_match(m, true),
            Expr::Lambda { params, body, .. } => self.scoped(|checker| {
                let mut param_types = Vec::with_capacity(params.len());
                for param in params {
                    let ty = match &param.ty {
                        Some(annotation) => {
                            let ty = checker.lower_type(annotation, param.name.as_str());
                            checker.flush_refinements();
                            ty
                        }
                        None => Type::Unknown,
                    };
                    checker
                        .scope
                        .bind(param.name.as_str(), ty.clone(), LocalKind::Param, param.name.span);
                    param_types.push(ty);
                }

                let outer_return = checker.return_type.take();
                let ret = match body {
                    LambdaBody::Expr(expr) => checker.infer_expr(expr),
                    LambdaBody::Block(block) => {
                        checker.check_block(block);
                        Type::Unknown
                    }
                };
                checker.return_type = outer_return;

                Type::function(param_types, ret)
            }),
        }
    }

    /// Resolution order: locals, capabilities, functions and effects,
    /// constructors of declared unions.
    fn resolve_ident(&mut self, ident: &Ident) -> Type {
        let name = ident.as_str();

        if let Some(local) = self.scope.lookup(name) {
            return local.ty.clone();
        }

        if let Some(capability) = self.env.capability(name) {
            let ty = Type::Capability(capability.capability.clone());
            self.check_capability_reference(name, ident.span);
            return ty;
        }

        if let Some(callable) = self.env.callable(name) {
            if callable.kind == CallableKind::Effect {
                self.check_effect_reference(name, ident.span);
            }
            return callable.ty();
        }

        if !self.env.ctor_owners(name).is_empty() {
            return self.check_variant(ident, &[], ident.span);
        }

        // An undeclared `uses` entry was already reported by the effect's header
        if !self.decl.lists_capability(name) {
            self.report_unknown_identifier(ident);
        }
        Type::Unknown
    }

    fn infer_fields(&mut self, fields: &[ObjectField], owner: &str) -> Vec<(String, Type)> {
        let mut seen = HashSet::new();
        let mut typed = Vec::with_capacity(fields.len());

        for field in fields {
            let ty = self.infer_expr(&field.value);
            if seen.insert(field.name.as_str()) {
                typed.push((field.name.name.clone(), ty));
            } else {
                self.reporter.emit(
                    DiagnosticCode::DuplicateField,
                    &[("field", field.name.as_str()), ("owner", owner)],
                    field.name.span,
                );
            }
        }

        typed
    }

    fn infer_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        if let Expr::Ident(ident) = callee {
            let name = ident.as_str();
            let shadowed = self.scope.lookup(name).is_some()
                || self.env.is_capability(name)
                || self.decl.lists_capability(name);

            if !shadowed {
                if let Some(callable) = self.env.callable(name) {
                    if callable.kind == CallableKind::Effect {
                        self.check_effect_reference(name, ident.span);
                    }

                    let arg_types: Vec<Type> = args.iter().map(|arg| self.infer_expr(arg)).collect();
                    if !callable.accepts_arity(args.len()) {
                        self.reporter.emit(
                            DiagnosticCode::ArityMismatch,
                            &[
                                ("name", name),
                                ("expected", &callable.arity_label()),
                                ("found", &args.len().to_string()),
                            ],
                            span,
                        );
                    }
                    self.check_arguments(name, &callable.params, args, &arg_types);
                    return callable.ret;
                }

                if self.env.ctor_owners(name).is_empty() {
                    for arg in args {
                        self.infer_expr(arg);
                    }
                    let candidates: Vec<String> = self
                        .env
                        .callable_names()
                        .chain(self.scope.names())
                        .map(str::to_string)
                        .collect();
                    let suggestion = self.suggest(name, candidates.iter().map(String::as_str));
                    self.reporter.emit_with_suggestion(
                        DiagnosticCode::UnresolvedCallTarget,
                        &[("name", name)],
                        ident.span,
                        suggestion.as_deref(),
                    );
                    return Type::Unknown;
                }
            }
        }

        let callee_ty = self.infer_expr(callee);
        let arg_types: Vec<Type> = args.iter().map(|arg| self.infer_expr(arg)).collect();

        match self.env.types.expand(&callee_ty) {
            Type::Function { params, ret } => {
                let name = callee_name(callee);
                if params.len() != args.len() {
                    self.reporter.emit(
                        DiagnosticCode::ArityMismatch,
                        &[
                            ("name", &name),
                            ("expected", &params.len().to_string()),
                            ("found", &args.len().to_string()),
                        ],
                        span,
                    );
                }
                self.check_arguments(&name, &params, args, &arg_types);
                *ret
            }
            // Capability operations are opaque
            Type::Unknown | Type::Capability(_) => Type::Unknown,
            other => {
                self.reporter.emit(
                    DiagnosticCode::NotCallable,
                    &[("type", &other.to_string())],
                    callee.span(),
                );
                Type::Unknown
            }
        }
    }

    fn check_arguments(&mut self, name: &str, params: &[Type], args: &[Expr], arg_types: &[Type]) {
        for (index, ((param, arg), found)) in params.iter().zip(args).zip(arg_types).enumerate() {
            if !self.env.types.is_assignable(found, param) {
                self.reporter.emit(
                    DiagnosticCode::ArgumentMismatch,
                    &[
                        ("index", &(index + 1).to_string()),
                        ("name", name),
                        ("expected", &param.to_string()),
                        ("found", &found.to_string()),
                    ],
                    arg.span(),
                );
            }
        }
    }

    fn member_type(&mut self, object_ty: &Type, property: &Ident) -> Type {
        let field = property.as_str();
        let fields = match self.env.types.underlying(object_ty) {
            Type::Unknown | Type::Capability(_) => return Type::Unknown,
            Type::List(_) | Type::String | Type::Map(..) if field == "length" => return Type::Int,
            Type::Literal(literal) if field == "length" && Type::primitive_of(&literal) == Type::String => {
                return Type::Int;
            }
            Type::Record(fields) => fields,
            _ => Vec::new(),
        };

        if let Some((_, ty)) = fields.iter().find(|(name, _)| name == field) {
            return ty.clone();
        }

        let suggestion = self.suggest(field, fields.iter().map(|(name, _)| name.as_str()));
        self.reporter.emit_with_suggestion(
            DiagnosticCode::UnknownField,
            &[("type", &object_ty.to_string()), ("field", field)],
            property.span,
            suggestion.as_deref(),
        );
        Type::Unknown
    }

    fn index_type(&mut self, object_ty: &Type, index_ty: &Type, span: Span) -> Type {
        let index_ok = |checker: &Self, expected: &Type| checker.env.types.is_assignable(index_ty, expected);

        let (ok, element) = match self.env.types.underlying(object_ty).widen() {
            Type::Unknown => (true, Type::Unknown),
            Type::List(element) => (index_ok(self, &Type::Int), *element),
            Type::Map(key, value) => (index_ok(self, &key), *value),
            Type::String => (index_ok(self, &Type::Int), Type::String),
            _ => (false, Type::Unknown),
        };

        if !ok {
            self.reporter.emit(
                DiagnosticCode::InvalidBinaryOperands,
                &[("op", "[]"), ("left", &object_ty.to_string()), ("right", &index_ty.to_string())],
                span,
            );
        }
        element
    }

    fn unary_type(&mut self, op: UnaryOp, operand: &Type, span: Span) -> Type {
        let (ok, result) = match op {
            UnaryOp::Not => (self.env.types.is_assignable(operand, &Type::Bool), Type::Bool),
            UnaryOp::Neg => {
                let base = self.env.types.underlying(operand).widen();
                (self.is_numeric(operand), base)
            }
        };

        if ok {
            return result;
        }
        self.reporter.emit(
            DiagnosticCode::InvalidUnaryOperand,
            &[("op", &op.to_string()), ("operand", &operand.to_string())],
            span,
        );
        Type::Unknown
    }

    /// Structural base with brands stripped and literals widened
    fn base_of(&self, ty: &Type) -> Type {
        self.env.types.underlying(ty).widen()
    }

    pub(crate) fn is_numeric(&self, ty: &Type) -> bool {
        matches!(self.base_of(ty), Type::Int | Type::Float | Type::Unknown)
    }

    /// Result type of `left op right`, reporting ILC0211 on invalid operands
    pub(crate) fn binary_result(&mut self, op: BinaryOp, left: &Type, right: &Type, span: Span) -> Type {
        let l = self.base_of(left);
        let r = self.base_of(right);
        let types = &self.env.types;

        let result = if op.is_arithmetic() {
            match (&l, &r) {
                (Type::String, _) | (_, Type::String) if op == BinaryOp::Add => {
                    let concatenable = |t: &Type| {
                        matches!(t, Type::String | Type::Int | Type::Float | Type::Bool | Type::Unknown)
                    };
                    (concatenable(&l) && concatenable(&r)).then_some(Type::String)
                }
                (Type::Int, Type::Int) => Some(Type::Int),
                (Type::Int | Type::Float, Type::Int | Type::Float) => Some(Type::Float),
                (Type::Unknown, Type::Int | Type::Float | Type::Unknown)
                | (Type::Int | Type::Float, Type::Unknown) => Some(Type::Unknown),
                _ => None,
            }
        } else if op.is_relational() {
            let comparable = matches!(
                (&l, &r),
                (Type::Int | Type::Float | Type::Unknown, Type::Int | Type::Float | Type::Unknown)
                    | (Type::String | Type::Unknown, Type::String | Type::Unknown)
            );
            comparable.then_some(Type::Bool)
        } else if op.is_equality() {
            (types.is_assignable(left, right) || types.is_assignable(right, left)).then_some(Type::Bool)
        } else if op.is_logical() {
            (types.is_assignable(left, &Type::Bool) && types.is_assignable(right, &Type::Bool))
                .then_some(Type::Bool)
        } else {
            let integral = |t: &Type| matches!(t, Type::Int | Type::Unknown);
            (integral(&l) && integral(&r)).then_some(Type::Int)
        };

        match result {
            Some(ty) => ty,
            None => {
                self.reporter.emit(
                    DiagnosticCode::InvalidBinaryOperands,
                    &[
                        ("op", op.symbol()),
                        ("left", &left.to_string()),
                        ("right", &right.to_string()),
                    ],
                    span,
                );
                if op.is_arithmetic() || op.is_bitwise() {
                    Type::Unknown
                } else {
                    Type::Bool
                }
            }
        }
    }

    /// Common type of two branches; ILC0204 when they are unrelated
    pub(crate) fn join_or_report(&mut self, expected: &Type, found: &Type, span: Span) -> Type {
        match self.env.types.join(expected, found) {
            Some(ty) => ty,
            None => {
                self.reporter.emit(
                    DiagnosticCode::TypeMismatch,
                    &[("expected", &expected.to_string()), ("found", &found.to_string())],
                    span,
                );
                Type::Unknown
            }
        }
    }

    /// `brand<T>(value)`
    fn brand_cast(&mut self, brand: &Ident, value_ty: &Type, value_span: Span) -> Type {
        let name = brand.as_str();
        let base = match self.env.types.get(name).map(|def| &def.ty) {
            Some(Type::Brand { base, .. }) => (**base).clone(),
            Some(_) => {
                self.reporter
                    .emit(DiagnosticCode::NotABrand, &[("type", name)], brand.span);
                return Type::Unknown;
            }
            None => {
                let candidates: Vec<String> = self.env.types.names().map(str::to_string).collect();
                let suggestion = self.suggest(name, candidates.iter().map(String::as_str));
                self.reporter.emit_with_suggestion(
                    DiagnosticCode::UnknownType,
                    &[("type", name)],
                    brand.span,
                    suggestion.as_deref(),
                );
                return Type::Unknown;
            }
        };

        self.expect_type(value_ty, &base, value_span);
        Type::Named(name.to_string())
    }

    /// `Tag { field: value, ... }` or a bare `Tag`
    pub(crate) fn check_variant(&mut self, tag: &Ident, fields: &[ObjectField], span: Span) -> Type {
        let values = self.infer_fields(fields, tag.as_str());
        let name = tag.as_str();
        let owners = self.env.ctor_owners(name).to_vec();

        let Some(owner) = owners.first() else {
            let candidates: Vec<String> = self.env.ctor_names().map(str::to_string).collect();
            let suggestion = self.suggest(name, candidates.iter().map(String::as_str));
            self.reporter.emit_with_suggestion(
                DiagnosticCode::UnknownConstructor,
                &[("ctor", name)],
                tag.span,
                suggestion.as_deref(),
            );
            return Type::Unknown;
        };

        let declared = self
            .env
            .types
            .union_ctors(&Type::Named(owner.clone()))
            .and_then(|ctors| {
                ctors.into_iter().find_map(|ctor| match ctor {
                    Ctor::Tag { name: tag_name, fields } if tag_name == name => Some(fields.unwrap_or_default()),
                    _ => None,
                })
            })
            .unwrap_or_default();

        for (field, expected) in &declared {
            match values.iter().find(|(name, _)| name == field) {
                Some((_, found)) => {
                    let value_span = fields
                        .iter()
                        .find(|f| f.name.as_str() == field)
                        .map(|f| f.value.span())
                        .unwrap_or(span);
                    self.expect_type(found, expected, value_span);
                }
                None => self.reporter.emit(
                    DiagnosticCode::MissingConstructorField,
                    &[("ctor", name), ("field", field)],
                    span,
                ),
            }
        }

        for field in fields {
            if !declared.iter().any(|(name, _)| name == field.name.as_str()) {
                self.reporter.emit(
                    DiagnosticCode::UnknownConstructorField,
                    &[("ctor", name), ("field", field.name.as_str())],
                    field.name.span,
                );
            }
        }

        // A tag shared by several unions has no single type
        if owners.len() == 1 {
            Type::Named(owner.clone())
        } else {
            Type::Unknown
        }
    }
}

/// Name used in call diagnostics for non-identifier callees
fn callee_name(callee: &Expr) -> String {
    match callee {
        Expr::Ident(ident) => ident.name.clone(),
        Expr::Member { property, .. } => property.name.clone(),
        _ => "function".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{check, Diagnostic, DiagnosticCode};
    use intent_parser::parse;

    fn check_source(source: &str) -> Vec<Diagnostic> {
        check(&parse(source).unwrap())
    }

    fn codes(source: &str) -> Vec<DiagnosticCode> {
        check_source(source).into_iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_unknown_identifier_suggestion() {
        let diagnostics = check_source("func f(user: Int): Int { return usr }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Unknown identifier 'usr' Did you mean 'user'?");
    }

    #[test]
    fn test_call_checks() {
        let source = r#"
            func add(a: Int, b: Int): Int { return a + b }
            func f(): Int {
                add(1)
                add(1, "two")
                ad(1, 2)
                let n = 3
                n(1)
                assert(true)
                assert(true, "message")
                return add(1, 2)
            }
        "#;
        assert_eq!(
            codes(source),
            vec![
                DiagnosticCode::ArityMismatch,
                DiagnosticCode::ArgumentMismatch,
                DiagnosticCode::UnresolvedCallTarget,
                DiagnosticCode::NotCallable,
            ]
        );
    }

    #[test]
    fn test_argument_mismatch_message() {
        let diagnostics = check_source(
            r#"func add(a: Int, b: Int): Int { return a + b } func f(): Int { return add(1, "two") }"#,
        );
        assert_eq!(
            diagnostics[0].message,
            "Argument 2 of 'add': expected 'Int', found '\"two\"'"
        );
    }

    #[test]
    fn test_operator_rules() {
        let source = r#"
            func f(s: String, n: Int, x: Float, b: Bool): Bool {
                let label = s + n
                let total = n + x
                let bad = b - n
                let bits = n & x
                let cmp = s < n
                return b && n
            }
        "#;
        assert_eq!(
            codes(source),
            vec![
                DiagnosticCode::InvalidBinaryOperands,
                DiagnosticCode::InvalidBinaryOperands,
                DiagnosticCode::InvalidBinaryOperands,
                DiagnosticCode::InvalidBinaryOperands,
            ]
        );
    }

    #[test]
    fn test_members_and_indexing() {
        let source = r#"
            types { type User = { name: String, tags: List<String> }; }
            func f(u: User): Int {
                let first = u.tags[0]
                let n = u.tags.length + first.length
                let missing = u.nmae
                let bad = u.tags["x"]
                return n
            }
        "#;
        let diagnostics = check_source(source);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].message,
            "Type 'User' has no field 'nmae' Did you mean 'name'?"
        );
        assert_eq!(diagnostics[1].code, DiagnosticCode::InvalidBinaryOperands);
    }

    #[test]
    fn test_brand_casts() {
        let source = r#"
            types {
                type UserId = String brand "UserId";
                type Name = String;
            }
            func lookup(id: UserId): String { return id }
            func f(raw: String): String {
                lookup(raw)
                lookup(brand<UserId>(raw))
                brand<Name>(raw)
                brand<UserId>(42)
                return lookup(brand<UsrId>(raw))
            }
        "#;
        assert_eq!(
            codes(source),
            vec![
                DiagnosticCode::ArgumentMismatch,
                DiagnosticCode::NotABrand,
                DiagnosticCode::TypeMismatch,
                DiagnosticCode::UnknownType,
            ]
        );
    }

    #[test]
    fn test_variant_construction() {
        let source = r#"
            types { type Event = Created { id: String } | Deleted { id: String, reason: String } | Ping; }
            func f(): Event {
                let a = Created { id: "1" }
                let b = Deleted { id: "2" }
                let c = Created { id: "3", extra: 1 }
                let d = Crated { id: "4" }
                let e = Created { id: 5 }
                return Ping
            }
        "#;
        assert_eq!(
            codes(source),
            vec![
                DiagnosticCode::MissingConstructorField,
                DiagnosticCode::UnknownConstructorField,
                DiagnosticCode::UnknownConstructor,
                DiagnosticCode::TypeMismatch,
            ]
        );
    }

    #[test]
    fn test_result_and_option_constructors() {
        let source = r#"
            func parse(s: String): Result<Int, String> {
                if (s == "") { return Err("empty") }
                return Ok(1)
            }
            func first(xs: List<Int>): Option<Int> {
                if (xs.length == 0) { return None }
                return Some(xs[0])
            }
            func wrong(): Option<Int> { return Some("x") }
        "#;
        assert_eq!(codes(source), vec![DiagnosticCode::ReturnTypeMismatch]);
    }

    #[test]
    fn test_conditional_branches_must_join() {
        let source = r#"
            func f(flag: Bool): String {
                let ok = flag ? "a" : "b"
                let bad = flag ? "a" : 1
                return ok
            }
        "#;
        assert_eq!(codes(source), vec![DiagnosticCode::TypeMismatch]);
    }

    #[test]
    fn test_lambdas() {
        let source = r#"
            func f(): Int {
                let inc = fn (x: Int) => x + 1
                let y = inc(1)
                inc("a")
                return y
            }
        "#;
        assert_eq!(codes(source), vec![DiagnosticCode::ArgumentMismatch]);
    }
}
