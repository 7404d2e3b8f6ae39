//! Pattern checking and match exhaustiveness
//!
//! Exhaustiveness is tracked by constructor key: the tag name for named
//! constructors, the value key of the literal for literal ones, so `1` covers
//! a declared `1.0`. Diagnostics name constructors as declared. Cases are
//! walked in source order. Only unguarded cases record coverage, and
//! everything after an unguarded wildcard is unreachable.

use crate::{
    checker::Checker,
    diagnostics::DiagnosticCode,
    env::LocalKind,
    types::{Ctor, Type},
};
use intent_parser::{CaseBody, FieldBinding, HasSpan, Ident, MatchCase, MatchExpr, Pattern, Span};
use std::collections::HashSet;

/// One constructor a match over the subject must cover
#[derive(Debug, Clone)]
struct CaseShape {
    key: String,
    /// Constructor as declared
    label: String,
    /// Positional payload of `Ok`, `Err` and `Some`
    payload: Option<Type>,
    fields: Option<Vec<(String, Type)>>,
}

impl Checker {
    /// Check a match; in expression position the result is the join of its arms
    pub(crate) fn check_match(&mut self, m: &MatchExpr, in_expression: bool) -> Type {
        let subject = self.infer_expr(&m.subject);
        let shapes = self.case_shapes(&subject);
        let label = subject.to_string();

        let mut covered = HashSet::new();
        let mut wildcard_seen = false;
        let mut result = Type::Unknown;

        for case in &m.cases {
            let unreachable = wildcard_seen;
            if unreachable {
                self.reporter.emit(
                    DiagnosticCode::UnreachableCase,
                    &[("pattern", &case.pattern.to_string())],
                    case.pattern.span(),
                );
            }

            let (shape, arm) = self.scoped(|checker| {
                let shape = checker.check_pattern(&case.pattern, &subject, shapes.as_deref(), &label);
                checker.check_guard(case);
                let arm = match &case.body {
                    CaseBody::Expr(expr) => Some((checker.infer_expr(expr), expr.span())),
                    CaseBody::Block(block) => {
                        checker.check_block(block);
                        None
                    }
                };
                (shape, arm)
            });

            if let Some((ty, span)) = arm {
                if in_expression {
                    result = self.join_or_report(&result, &ty, span);
                }
            }

            if unreachable || case.guard.is_some() {
                continue;
            }
            if case.pattern.is_wildcard() {
                wildcard_seen = true;
            } else if let (Some(shape), Some(_)) = (shape, &shapes) {
                if !covered.insert(shape.key) {
                    self.reporter.emit(
                        DiagnosticCode::DuplicateCase,
                        &[("ctor", &shape.label), ("type", &label)],
                        case.pattern.span(),
                    );
                }
            }
        }

        match &shapes {
            Some(shapes) if !wildcard_seen => {
                let missing: Vec<&str> = shapes
                    .iter()
                    .filter(|shape| !covered.contains(&shape.key))
                    .map(|shape| shape.label.as_str())
                    .collect();
                if !missing.is_empty() {
                    self.reporter.emit(
                        DiagnosticCode::NonExhaustiveMatch,
                        &[("type", &label), ("missing", &missing.join(", "))],
                        m.span,
                    );
                }
            }
            None if !wildcard_seen && !subject.is_unknown() => {
                self.reporter.emit(
                    DiagnosticCode::NonUnionMatch,
                    &[("type", &label)],
                    m.subject.span(),
                );
            }
            _ => {}
        }

        if in_expression {
            result
        } else {
            Type::Unit
        }
    }

    /// Constructors of the subject, or `None` when it is not a union
    fn case_shapes(&self, subject: &Type) -> Option<Vec<CaseShape>> {
        match self.env.types.resolve(subject) {
            Type::Union(ctors) => Some(
                ctors
                    .into_iter()
                    .map(|ctor| match ctor {
                        Ctor::Literal(literal) => CaseShape {
                            key: literal.key(),
                            label: literal.to_string(),
                            payload: None,
                            fields: None,
                        },
                        Ctor::Tag { name, fields } => CaseShape {
                            key: name.clone(),
                            label: name,
                            payload: None,
                            fields,
                        },
                    })
                    .collect(),
            ),
            Type::Result(ok, err) => Some(vec![
                payload_shape("Ok", Some(*ok)),
                payload_shape("Err", Some(*err)),
            ]),
            Type::Option(inner) => Some(vec![
                payload_shape("Some", Some(*inner)),
                payload_shape("None", None),
            ]),
            _ => None,
        }
    }

    /// Bind the pattern's variables and return the constructor it covers
    fn check_pattern(
        &mut self,
        pattern: &Pattern,
        subject: &Type,
        shapes: Option<&[CaseShape]>,
        label: &str,
    ) -> Option<CaseShape> {
        match pattern {
            Pattern::Wildcard { .. } => None,
            Pattern::Literal { value, span } => {
                let key = value.key();
                match shapes {
                    Some(shapes) => match shapes.iter().find(|shape| shape.key == key) {
                        Some(shape) => Some(shape.clone()),
                        None => {
                            self.report_unknown_case(&value.to_string(), shapes, label, *span);
                            None
                        }
                    },
                    None => {
                        if !self.env.types.is_assignable(&Type::Literal(value.clone()), subject) {
                            self.reporter.emit(
                                DiagnosticCode::PatternTypeMismatch,
                                &[("pattern", &value.to_string()), ("type", label)],
                                *span,
                            );
                        }
                        None
                    }
                }
            }
            Pattern::Variant {
                tag,
                payload,
                bindings,
                span,
            } => {
                let shape = match shapes {
                    Some(shapes) => match shapes.iter().find(|shape| shape.key == tag.name) {
                        Some(shape) => Some(shape.clone()),
                        None => {
                            self.report_unknown_case(tag.as_str(), shapes, label, tag.span);
                            None
                        }
                    },
                    None => {
                        if !subject.is_unknown() {
                            self.reporter.emit(
                                DiagnosticCode::PatternTypeMismatch,
                                &[("pattern", &pattern.to_string()), ("type", label)],
                                *span,
                            );
                        }
                        None
                    }
                };

                let Some(shape) = shape else {
                    self.bind_unknown(payload.as_ref(), bindings.as_deref());
                    return None;
                };

                if let Some(binding) = payload {
                    let ty = match &shape.payload {
                        Some(ty) => ty.clone(),
                        None => {
                            self.reporter.emit(
                                DiagnosticCode::PatternTypeMismatch,
                                &[("pattern", &pattern.to_string()), ("type", label)],
                                *span,
                            );
                            Type::Unknown
                        }
                    };
                    self.scope.bind(binding.as_str(), ty, LocalKind::Pattern, binding.span);
                }

                for binding in bindings.iter().flatten() {
                    let field = binding.field.as_str();
                    let ty = match shape
                        .fields
                        .as_ref()
                        .and_then(|fields| fields.iter().find(|(name, _)| name == field))
                    {
                        Some((_, ty)) => ty.clone(),
                        None => {
                            self.reporter.emit(
                                DiagnosticCode::UnknownConstructorField,
                                &[("ctor", tag.as_str()), ("field", field)],
                                binding.field.span,
                            );
                            Type::Unknown
                        }
                    };
                    let local = binding.binding();
                    self.scope.bind(local.as_str(), ty, LocalKind::Pattern, local.span);
                }

                Some(shape)
            }
        }
    }

    fn check_guard(&mut self, case: &MatchCase) {
        let Some(guard) = &case.guard else {
            return;
        };
        let found = self.infer_expr(guard);
        if !self.env.types.is_assignable(&found, &Type::Bool) {
            self.reporter.emit(
                DiagnosticCode::GuardNotBool,
                &[("found", &found.to_string())],
                guard.span(),
            );
        }
    }

    fn report_unknown_case(&mut self, ctor: &str, shapes: &[CaseShape], label: &str, span: Span) {
        let suggestion = self.suggest(ctor, shapes.iter().map(|shape| shape.label.as_str()));
        self.reporter.emit_with_suggestion(
            DiagnosticCode::UnknownCase,
            &[("ctor", ctor), ("type", label)],
            span,
            suggestion.as_deref(),
        );
    }

    /// Keep bindings of an unresolvable pattern in scope so the arm body
    /// does not report them again
    fn bind_unknown(&mut self, payload: Option<&Ident>, bindings: Option<&[FieldBinding]>) {
        if let Some(binding) = payload {
            self.scope
                .bind(binding.as_str(), Type::Unknown, LocalKind::Pattern, binding.span);
        }
        for binding in bindings.into_iter().flatten() {
            let local = binding.binding();
            self.scope
                .bind(local.as_str(), Type::Unknown, LocalKind::Pattern, local.span);
        }
    }
}

fn payload_shape(key: &str, payload: Option<Type>) -> CaseShape {
    CaseShape {
        key: key.to_string(),
        label: key.to_string(),
        payload,
        fields: None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{check, Diagnostic, DiagnosticCode, Level};
    use intent_parser::parse;

    fn check_source(source: &str) -> Vec<Diagnostic> {
        check(&parse(source).unwrap())
    }

    fn codes(source: &str) -> Vec<DiagnosticCode> {
        check_source(source).into_iter().map(|d| d.code).collect()
    }

    const EVENTS: &str = r#"
        types {
            type Event = Created { id: String } | Deleted { id: String, reason: String } | Ping;
            type Status = "active" | "inactive" | "banned";
        }
    "#;

    fn with_events(body: &str) -> String {
        format!("{}\n{}", EVENTS, body)
    }

    #[test]
    fn test_complete_match_is_clean() {
        let source = with_events(
            r#"func f(e: Event): String {
                return match (e) {
                    case Created { id } => id
                    case Deleted { reason: why } => why
                    case Ping => "ping"
                }
            }"#,
        );
        assert!(check_source(&source).is_empty());
    }

    #[test]
    fn test_missing_constructors_listed_in_declaration_order() {
        let source = with_events(
            r#"func f(s: Status): Int {
                return match (s) { case "inactive" => 1 }
            }"#,
        );
        let diagnostics = check_source(&source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            r#"Non-exhaustive match on 'Status': missing "active", "banned""#
        );
    }

    #[test]
    fn test_guarded_cases_do_not_cover() {
        let source = with_events(
            r#"func f(e: Event, n: Int): Int {
                return match (e) {
                    case Created { id } if id == "x" => 1
                    case Deleted { id } => 2
                    case Ping => 3
                }
            }"#,
        );
        let diagnostics = check_source(&source);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.ends_with("missing Created"));
    }

    #[test]
    fn test_guarded_then_unguarded_is_not_duplicate() {
        let source = with_events(
            r#"func f(e: Event): Int {
                return match (e) {
                    case Created { id } if id == "x" => 1
                    case Created { id } => 2
                    case _ => 3
                }
            }"#,
        );
        assert!(check_source(&source).is_empty());
    }

    #[test]
    fn test_guard_must_be_bool() {
        let source = with_events(
            r#"func f(e: Event): Int {
                return match (e) {
                    case Created { id } if id => 1
                    case _ => 2
                }
            }"#,
        );
        assert_eq!(codes(&source), vec![DiagnosticCode::GuardNotBool]);
    }

    #[test]
    fn test_unknown_case_and_fields() {
        let source = with_events(
            r#"func f(e: Event): Int {
                return match (e) {
                    case Craeted { id } => 1
                    case Deleted { id, cause } => 2
                    case Ping { x } => 3
                    case _ => 4
                }
            }"#,
        );
        let diagnostics = check_source(&source);
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::UnknownCase,
                DiagnosticCode::UnknownConstructorField,
                DiagnosticCode::UnknownConstructorField,
            ]
        );
        assert!(diagnostics[0].message.ends_with("Did you mean 'Created'?"));
    }

    #[test]
    fn test_cases_after_wildcard_are_unreachable() {
        let source = with_events(
            r#"func f(e: Event): Int {
                return match (e) {
                    case Ping => 1
                    case _ => 2
                    case Created { id } => 3
                }
            }"#,
        );
        let diagnostics = check_source(&source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnreachableCase);
        assert_eq!(diagnostics[0].level, Level::Warning);
    }

    #[test]
    fn test_non_union_subject() {
        let warned = r#"func f(n: Int): Int { return match (n) { case 1 => 10 case 2 => 20 } }"#;
        assert_eq!(codes(warned), vec![DiagnosticCode::NonUnionMatch]);

        let defaulted = r#"func f(n: Int): Int { return match (n) { case 1 => 10 case _ => 0 } }"#;
        assert!(codes(defaulted).is_empty());

        let mismatched = r#"func f(n: Int): Int { return match (n) { case "one" => 1 case _ => 0 } }"#;
        assert_eq!(codes(mismatched), vec![DiagnosticCode::PatternTypeMismatch]);
    }

    #[test]
    fn test_result_and_option_are_unions() {
        let source = r#"
            func f(r: Result<Int, String>, o: Option<Int>): Int {
                let a = match (r) { case Ok(n) => n case Err(msg) => len(msg) }
                let b = match (o) { case Some(n) => n }
                return a + b
            }
        "#;
        let diagnostics = check_source(source);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.ends_with("missing None"));
    }

    #[test]
    fn test_numeric_cases_compare_by_value() {
        let ratio = "types { type Ratio = 1.0 | 2.5; }";
        let complete = format!(
            "{}\nfunc f(r: Ratio): Int {{ return match (r) {{ case 1 => 1 case 2.5 => 2 }} }}",
            ratio
        );
        assert!(check_source(&complete).is_empty());

        let duplicate = format!(
            "{}\nfunc f(r: Ratio): Int {{ return match (r) {{ case 1.0 => 1 case 1 => 1 case 2.5 => 2 }} }}",
            ratio
        );
        assert_eq!(codes(&duplicate), vec![DiagnosticCode::DuplicateCase]);

        let partial = format!(
            "{}\nfunc f(r: Ratio): Int {{ return match (r) {{ case 2.5 => 2 }} }}",
            ratio
        );
        let diagnostics = check_source(&partial);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Non-exhaustive match on 'Ratio': missing 1.0");
    }

    #[test]
    fn test_arm_types_must_join() {
        let source = with_events(
            r#"func f(s: Status): String {
                return match (s) {
                    case "active" => "on"
                    case "inactive" => 0
                    case "banned" => "off"
                }
            }"#,
        );
        assert_eq!(codes(&source), vec![DiagnosticCode::TypeMismatch]);
    }
}
