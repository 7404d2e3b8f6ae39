//! Lowering of type expressions and declared types

use crate::{
    checker::{Checker, PendingRefinement},
    diagnostics::DiagnosticCode,
    env::{LocalKind, Scope},
    effect_checker::DeclContext,
    types::{Ctor, Type, TypeDef},
};
use intent_parser::{
    Constructor, GenericType, HasSpan, Primitive, Program, RecordType, TypeExpr, UnionType,
};
use std::collections::HashSet;

/// Type names that exist without a declaration
const BUILTIN_TYPE_NAMES: [&str; 10] = [
    "Int", "Float", "String", "Bool", "Unit", "Result", "Option", "List", "Array", "Map",
];

fn is_builtin_type_name(name: &str) -> bool {
    BUILTIN_TYPE_NAMES.contains(&name) || Primitive::from_name(name).is_some()
}

impl Checker {
    /// Register every declared name first so declarations may refer to each
    /// other in any order, then lower the definitions.
    pub(crate) fn collect_types(&mut self, program: &Program) {
        let mut accepted = Vec::new();

        for decl in program.type_decls() {
            // Builtin names always resolve to the builtin, so redeclaring one is a duplicate
            let registered = !is_builtin_type_name(decl.name.as_str())
                && self.env.types.insert(TypeDef {
                    name: decl.name.name.clone(),
                    ty: Type::Unknown,
                    span: decl.span,
                });
            if registered {
                accepted.push(decl);
            } else {
                self.reporter.emit(
                    DiagnosticCode::DuplicateType,
                    &[("type", decl.name.as_str())],
                    decl.name.span,
                );
            }
        }

        for decl in accepted {
            let name = decl.name.as_str();
            let ty = self.lower_type(&decl.ty, name);
            if let Type::Union(ctors) = &ty {
                for ctor in ctors {
                    if let Ctor::Tag { name: tag, .. } = ctor {
                        self.env.index_ctor(tag, name);
                    }
                }
            }
            self.env.types.define(name, ty);
        }
    }

    /// Lower a type expression; `owner` names the declaration it belongs to
    pub(crate) fn lower_type(&mut self, expr: &TypeExpr, owner: &str) -> Type {
        match expr {
            TypeExpr::Basic(basic) => basic.primitive.into(),
            TypeExpr::Literal(literal) => Type::Literal(literal.value.clone()),
            TypeExpr::Brand(brand) => {
                let base = self.lower_type(&brand.base, owner);
                if let Some(refinement) = &brand.refinement {
                    self.pending_refinements.push(PendingRefinement {
                        owner: owner.to_string(),
                        base: base.clone(),
                        refinement: refinement.clone(),
                    });
                }
                Type::Brand {
                    brand: brand.brand.clone(),
                    base: Box::new(base),
                }
            }
            TypeExpr::Record(record) => Type::Record(self.lower_record(record, owner)),
            TypeExpr::Union(union) => self.lower_union(union, owner),
            TypeExpr::Generic(generic) => self.lower_generic(generic, owner),
        }
    }

    fn lower_record(&mut self, record: &RecordType, owner: &str) -> Vec<(String, Type)> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(record.fields.len());

        for field in &record.fields {
            let name = field.name.as_str();
            if !seen.insert(name) {
                self.reporter.emit(
                    DiagnosticCode::DuplicateField,
                    &[("field", name), ("owner", owner)],
                    field.name.span,
                );
                continue;
            }

            let ty = self.lower_type(&field.ty, owner);
            if let Some(refinement) = &field.refinement {
                self.pending_refinements.push(PendingRefinement {
                    owner: format!("{}.{}", owner, name),
                    base: ty.clone(),
                    refinement: refinement.clone(),
                });
            }
            fields.push((name.to_string(), ty));
        }

        fields
    }

    fn lower_union(&mut self, union: &UnionType, owner: &str) -> Type {
        if union.has_literal_ctors() && union.has_named_ctors() {
            self.reporter
                .emit(DiagnosticCode::MixedUnion, &[("type", owner)], union.span);
        }

        let mut seen = HashSet::new();
        let mut ctors = Vec::with_capacity(union.ctors.len());

        for ctor in &union.ctors {
            let key = ctor.key();
            if !seen.insert(key.clone()) {
                self.reporter.emit(
                    DiagnosticCode::DuplicateConstructor,
                    &[("ctor", &key), ("type", owner)],
                    ctor.span(),
                );
                continue;
            }

            ctors.push(match ctor {
                Constructor::Literal(literal) => Ctor::Literal(literal.value.clone()),
                Constructor::Named(named) => Ctor::Tag {
                    name: named.name.name.clone(),
                    fields: named
                        .fields
                        .as_ref()
                        .map(|record| self.lower_record(record, named.name.as_str())),
                },
            });
        }

        Type::Union(ctors)
    }

    fn lower_generic(&mut self, generic: &GenericType, owner: &str) -> Type {
        let name = generic.name.as_str();
        let arity = match name {
            "Result" | "Map" => Some(2),
            "Option" | "List" | "Array" => Some(1),
            _ => None,
        };

        if let Some(expected) = arity {
            if generic.args.len() != expected {
                self.report_type_argument_count(generic, expected);
                return Type::Unknown;
            }
            let mut args = generic
                .args
                .iter()
                .map(|arg| self.lower_type(arg, owner))
                .collect::<Vec<_>>()
                .into_iter();
            let mut next = || args.next().unwrap_or(Type::Unknown);

            return match name {
                "Result" => {
                    let ok = next();
                    Type::result(ok, next())
                }
                "Map" => {
                    let key = next();
                    Type::Map(Box::new(key), Box::new(next()))
                }
                "Option" => Type::option(next()),
                _ => Type::list(next()),
            };
        }

        let known = if let Some(primitive) = Primitive::from_name(name) {
            Some(Type::from(primitive))
        } else if self.env.types.contains(name) {
            Some(Type::Named(name.to_string()))
        } else {
            None
        };

        match known {
            Some(_) if !generic.args.is_empty() => {
                self.report_type_argument_count(generic, 0);
                Type::Unknown
            }
            Some(ty) => ty,
            None => {
                let candidates: Vec<String> = self
                    .env
                    .types
                    .names()
                    .chain(BUILTIN_TYPE_NAMES)
                    .map(str::to_string)
                    .collect();
                let suggestion = self.suggest(name, candidates.iter().map(String::as_str));
                self.reporter.emit_with_suggestion(
                    DiagnosticCode::UnknownType,
                    &[("type", name)],
                    generic.name.span,
                    suggestion.as_deref(),
                );
                Type::Unknown
            }
        }
    }

    fn report_type_argument_count(&mut self, generic: &GenericType, expected: usize) {
        self.reporter.emit(
            DiagnosticCode::TypeArgumentCount,
            &[
                ("type", generic.name.as_str()),
                ("expected", &expected.to_string()),
                ("found", &generic.args.len().to_string()),
            ],
            generic.span,
        );
    }

    /// Check queued `where` clauses: `value` is bound to the refined base type
    pub(crate) fn flush_refinements(&mut self) {
        let pending = std::mem::take(&mut self.pending_refinements);
        if pending.is_empty() {
            return;
        }

        let outer_decl = std::mem::replace(&mut self.decl, DeclContext::TopLevel);
        let outer_scope = std::mem::take(&mut self.scope);

        for PendingRefinement { owner, base, refinement } in pending {
            self.scope = Scope::new();
            self.scope.bind("value", base, LocalKind::Const, refinement.span);
            let found = self.infer_expr(&refinement.predicate);
            if !self.env.types.is_assignable(&found, &Type::Bool) {
                self.reporter.emit(
                    DiagnosticCode::RefinementNotBool,
                    &[("type", &owner), ("found", &found.to_string())],
                    refinement.predicate.span(),
                );
            }
        }
        self.scope = outer_scope;
        self.decl = outer_decl;
    }
}
