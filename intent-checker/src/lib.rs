//! Intent Language Checker
//!
//! This crate provides semantic analysis for the Intent language: name and
//! type resolution, match exhaustiveness, the capability/effect discipline
//! and contract checking. Checking never fails; every problem becomes a
//! coded [`Diagnostic`], reported in the order it was found.

pub mod builtins;
pub mod checker;
pub mod config;
pub mod contracts;
pub mod diagnostics;
pub mod effect_checker;
pub mod env;
pub mod exhaustiveness;
pub mod inference;
pub mod lowering;
pub mod suggest;
pub mod types;

// Re-export core types
pub use checker::Checker;
pub use config::{CheckOptions, ConfigError};
pub use diagnostics::{to_json, Diagnostic, DiagnosticCode, DiagnosticReporter, Level};
pub use effect_checker::DeclContext;
pub use types::{Ctor, Type, TypeTable};

use intent_parser::Program;

/// Check a program with default options
pub fn check(program: &Program) -> Vec<Diagnostic> {
    check_with_options(program, &CheckOptions::default())
}

/// Check a program
#[tracing::instrument(skip_all)]
pub fn check_with_options(program: &Program, options: &CheckOptions) -> Vec<Diagnostic> {
    let mut checker = Checker::new(options);
    checker.check_program(program);
    let diagnostics = checker.into_diagnostics();

    tracing::debug!(
        errors = diagnostics.iter().filter(|d| d.is_error()).count(),
        warnings = diagnostics.iter().filter(|d| d.is_warning()).count(),
        "check finished"
    );

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_parser::parse;

    #[test]
    fn test_file_is_attached_to_diagnostics() {
        let program = parse("func f(): Int { return missing }").unwrap();
        let options = CheckOptions::default().with_file("main.intent");
        let diagnostics = check_with_options(&program, &options);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].file.as_deref(), Some("main.intent"));
    }

    #[test]
    fn test_suggestions_can_be_disabled() {
        let program = parse("func f(user: Int): Int { return usr }").unwrap();
        let options = CheckOptions {
            suggestions: false,
            ..CheckOptions::default()
        };
        let diagnostics = check_with_options(&program, &options);
        assert_eq!(diagnostics[0].message, "Unknown identifier 'usr'");
    }

    #[test]
    fn test_empty_program_is_clean() {
        let program = parse("").unwrap();
        assert!(check(&program).is_empty());
    }
}
