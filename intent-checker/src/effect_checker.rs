//! Capability and effect discipline
//!
//! Rules are name based and local to one declaration:
//! a `func` never references a capability or calls an effect, and an
//! `effect` only references capabilities listed in its own `uses` clause,
//! each of which must be declared in the program's `uses` section.
//! Capability use is not followed through calls from one effect into another.

use crate::{checker::Checker, diagnostics::DiagnosticCode};
use intent_parser::{EffectDecl, Span};
use std::collections::HashSet;

/// The declaration whose body is being checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclContext {
    /// Type declarations and refinements
    TopLevel,
    Func { name: String },
    Effect { name: String, uses: HashSet<String> },
    /// Tests may use any capability and call any effect
    Test { name: String },
}

impl DeclContext {
    pub fn name(&self) -> Option<&str> {
        match self {
            DeclContext::TopLevel => None,
            DeclContext::Func { name } | DeclContext::Effect { name, .. } | DeclContext::Test { name } => {
                Some(name)
            }
        }
    }

    /// Listed in the current effect's `uses` clause, declared or not
    pub fn lists_capability(&self, capability: &str) -> bool {
        matches!(self, DeclContext::Effect { uses, .. } if uses.contains(capability))
    }
}

impl Checker {
    /// A capability name was referenced from the current body
    pub(crate) fn check_capability_reference(&mut self, capability: &str, span: Span) {
        let (code, owner_key, owner) = match &self.decl {
            DeclContext::Func { name } => (DiagnosticCode::CapabilityInPureFunction, "func", name.clone()),
            DeclContext::Effect { name, uses } if !uses.contains(capability) => {
                (DiagnosticCode::CapabilityNotInUses, "effect", name.clone())
            }
            _ => return,
        };

        if self.reported.insert((code, capability.to_string())) {
            self.reporter.emit(
                code,
                &[(owner_key, &owner), ("capability", capability)],
                span,
            );
        }
    }

    /// An effect was referenced or called from the current body
    pub(crate) fn check_effect_reference(&mut self, effect: &str, span: Span) {
        let DeclContext::Func { name } = &self.decl else {
            return;
        };
        let func = name.clone();

        if self
            .reported
            .insert((DiagnosticCode::EffectCallInPureFunction, effect.to_string()))
        {
            self.reporter.emit(
                DiagnosticCode::EffectCallInPureFunction,
                &[("func", &func), ("effect", effect)],
                span,
            );
        }
    }

    /// Every `uses` entry must be declared, and listed once
    pub(crate) fn check_uses_list(&mut self, effect: &EffectDecl) {
        let mut listed = HashSet::new();

        for capability in &effect.uses {
            let name = capability.as_str();

            if !listed.insert(name) {
                if self
                    .reported
                    .insert((DiagnosticCode::DuplicateUsesEntry, name.to_string()))
                {
                    self.reporter.emit(
                        DiagnosticCode::DuplicateUsesEntry,
                        &[("capability", name), ("effect", effect.name.as_str())],
                        capability.span,
                    );
                }
                continue;
            }

            if !self.env.is_capability(name) {
                self.reporter.emit(
                    DiagnosticCode::UndeclaredCapability,
                    &[("effect", effect.name.as_str()), ("capability", name)],
                    capability.span,
                );
            }
        }
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

    const USES: &str = "uses { http: HttpClient, db: Database }";

    #[test]
    fn test_func_cannot_touch_capabilities() {
        let source = format!(
            "{}\nfunc f(): Int {{ http.get(\"/a\"); http.get(\"/b\"); db.query(); return 1 }}",
            USES
        );
        let diagnostics = check_source(&source);
        assert_eq!(diagnostics.len(), 2, "one report per capability: {:?}", diagnostics);
        assert!(diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::CapabilityInPureFunction));
        assert_eq!(diagnostics[0].message, "Pure function 'f' cannot use capability 'http'");
    }

    #[test]
    fn test_effect_must_list_capability() {
        let source = format!(
            "{}\neffect e(): Int uses http {{ http.get(\"/a\"); db.query(); return 1 }}",
            USES
        );
        let diagnostics = check_source(&source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::CapabilityNotInUses);
        assert!(diagnostics[0].message.contains("'db'"));
    }

    #[test]
    fn test_effect_with_declared_uses_is_clean() {
        let source = format!(
            "{}\neffect e(): Int uses http, db {{ http.get(\"/a\"); db.query(); return 1 }}",
            USES
        );
        assert!(check_source(&source).is_empty());
    }

    #[test]
    fn test_uses_entries_must_be_declared_once() {
        let source = format!("{}\neffect e() uses http, http, cache {{ }}", USES);
        let diagnostics = check_source(&source);
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::DuplicateUsesEntry, DiagnosticCode::UndeclaredCapability]
        );
        assert_eq!(diagnostics[0].level, Level::Warning);
    }

    #[test]
    fn test_undeclared_uses_entry_is_reported_once() {
        let source = "uses {}\neffect boom(): Int uses http { http.get(\"/\"); http(); return http.status }";
        assert_eq!(codes(source), vec![DiagnosticCode::UndeclaredCapability]);

        let unlisted = "uses {}\neffect boom(): Int uses http { return cache.size }";
        assert_eq!(
            codes(unlisted),
            vec![DiagnosticCode::UndeclaredCapability, DiagnosticCode::UnknownIdentifier]
        );
    }

    #[test]
    fn test_func_cannot_call_effect() {
        let source = format!(
            "{}\neffect load(): Int uses db {{ return db.count() }}\nfunc f(): Int {{ return load() }}",
            USES
        );
        assert_eq!(codes(&source), vec![DiagnosticCode::EffectCallInPureFunction]);
    }

    #[test]
    fn test_effect_to_effect_calls_are_not_followed() {
        let source = format!(
            "{}\neffect load(): Int uses db {{ return db.count() }}\neffect outer(): Int {{ return load() }}",
            USES
        );
        assert!(codes(&source).is_empty());
    }

    #[test]
    fn test_tests_may_use_anything() {
        let source = format!(
            "{}\neffect load(): Int uses db {{ return db.count() }}\ntest \"io\" {{ http.get(\"/\"); assertEq(load(), 1) }}",
            USES
        );
        assert!(codes(&source).is_empty());
    }
}
