//! `requires` / `ensures` clauses
//!
//! Clauses are type checked only. `ensures` additionally sees `result`,
//! bound to the declared return type or `Unit` when none is declared.

use crate::{checker::Checker, diagnostics::DiagnosticCode, env::LocalKind, types::Type};
use intent_parser::{Contract, Expr, HasSpan, Ident};

/// Name bound to the return value inside `ensures`
pub const RESULT_BINDING: &str = "result";

impl Checker {
    pub(crate) fn check_contract(&mut self, owner: &Ident, contract: &Contract, ret: Option<&Type>) {
        if let Some(requires) = &contract.requires {
            self.scoped(|checker| checker.check_clause("requires", owner, requires));
        }

        if let Some(ensures) = &contract.ensures {
            let result = ret.cloned().unwrap_or(Type::Unit);
            self.scoped(|checker| {
                checker
                    .scope
                    .bind(RESULT_BINDING, result, LocalKind::Const, ensures.span());
                checker.check_clause("ensures", owner, ensures);
            });
        }
    }

    fn check_clause(&mut self, clause: &str, owner: &Ident, expr: &Expr) {
        let found = self.infer_expr(expr);
        if !self.env.types.is_assignable(&found, &Type::Bool) {
            self.reporter.emit(
                DiagnosticCode::ContractNotBool,
                &[("clause", clause), ("name", owner.as_str()), ("found", &found.to_string())],
                expr.span(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{check, Diagnostic, DiagnosticCode};
    use intent_parser::parse;

    fn check_source(source: &str) -> Vec<Diagnostic> {
        check(&parse(source).unwrap())
    }

    #[test]
    fn test_contracts_see_params_and_result() {
        let source = r#"
            func clamp(n: Int, max: Int): Int requires max >= 0 ensures result <= max {
                return n > max ? max : n
            }
        "#;
        assert!(check_source(source).is_empty());
    }

    #[test]
    fn test_unknown_identifier_in_contract() {
        let source = "func f(x: Int): Int requires y > 0 ensures reslt > 0 { return x }";
        let diagnostics = check_source(source);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == DiagnosticCode::UnknownIdentifier));
        assert!(diagnostics[1].message.ends_with("Did you mean 'result'?"));
    }

    #[test]
    fn test_result_not_visible_in_requires() {
        let diagnostics = check_source("func f(): Int requires result > 0 { return 1 }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnknownIdentifier);
    }

    #[test]
    fn test_clause_must_be_bool() {
        let diagnostics = check_source("func f(x: Int): Int requires x + 1 { return x }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "'requires' clause of 'f' must be 'Bool', found 'Int'"
        );
    }

    #[test]
    fn test_result_defaults_to_unit() {
        let diagnostics = check_source("effect e() ensures result > 0 { }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidBinaryOperands);
    }
}
