//! Intent Language
//!
//! Front-end facade over [`intent_parser`] and [`intent_checker`]: parse a
//! source text, check it, and hand the program together with its diagnostics
//! to whatever runs next (an emitter, a CLI, an editor).

pub use intent_checker::{
    check, check_with_options, to_json, CheckOptions, ConfigError, Diagnostic, DiagnosticCode,
    Level,
};
pub use intent_parser::{parse, ParseError, Program};

use tracing::debug;

/// Program and diagnostics produced from one source text
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// `None` when the source failed to parse
    pub program: Option<Program>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Errors always block emission; warnings block only under `strict`
    pub fn blocks_emission(&self, strict: bool) -> bool {
        self.program.is_none() || self.diagnostics.iter().any(|d| d.is_blocking(strict))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        to_json(&self.diagnostics)
    }
}

/// Parse and check a source text
///
/// A parse failure is reported as a single `ILC0100` diagnostic and leaves
/// `program` empty; the checker does not run in that case.
#[tracing::instrument(skip_all)]
pub fn check_source(source: &str, options: &CheckOptions) -> CheckOutcome {
    match parse(source) {
        Ok(program) => {
            debug!(items = program.items.len(), "parsed");
            let diagnostics = check_with_options(&program, options);
            CheckOutcome {
                program: Some(program),
                diagnostics,
            }
        }
        Err(error) => {
            debug!(%error, "parse failed");
            CheckOutcome {
                program: None,
                diagnostics: vec![syntax_diagnostic(&error, options)],
            }
        }
    }
}

fn syntax_diagnostic(error: &ParseError, options: &CheckOptions) -> Diagnostic {
    let message = error.message();
    Diagnostic::new(DiagnosticCode::Syntax, &[("message", &message)], Some(error.span()))
        .with_file(options.file.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_becomes_diagnostic() {
        let outcome = check_source("func f( {", &CheckOptions::default());
        assert!(outcome.program.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, DiagnosticCode::Syntax);
        assert!(outcome.has_errors());
        assert!(outcome.blocks_emission(false));
    }

    #[test]
    fn test_clean_program_does_not_block() {
        let outcome = check_source("func id(x: Int): Int { return x }", &CheckOptions::default());
        assert!(outcome.program.is_some());
        assert!(outcome.diagnostics.is_empty());
        assert!(!outcome.blocks_emission(true));
    }
}
