//! Diagnostic registry and reporting
//!
//! Every diagnostic the checker can emit is a [`DiagnosticCode`]. The code
//! fixes the stable `ILCxxxx` identifier, the severity and the message
//! template, so emission sites cannot drift from the published table.

use intent_parser::Span;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // ILC01xx: syntax
    Syntax,

    // ILC02xx: names, types and matching
    UnknownIdentifier,
    UnresolvedCallTarget,
    UnknownType,
    TypeMismatch,
    ReturnTypeMismatch,
    NotCallable,
    ArityMismatch,
    ArgumentMismatch,
    TypeArgumentCount,
    ConditionNotBool,
    InvalidBinaryOperands,
    InvalidUnaryOperand,
    UnknownField,
    AssignToConstant,
    InvalidAssignmentTarget,
    NotIterable,
    NotABrand,
    UnknownConstructor,
    MissingConstructorField,
    NonExhaustiveMatch,
    UnknownCase,
    PatternTypeMismatch,
    DuplicateCase,
    UnreachableCase,
    NonUnionMatch,
    UnknownConstructorField,
    GuardNotBool,

    // ILC023x: declarations
    DuplicateType,
    DuplicateConstructor,
    MixedUnion,
    DuplicateDeclaration,
    DuplicateParameter,
    DuplicateField,
    RefinementNotBool,

    // ILC024x: contracts
    ContractNotBool,

    // ILC03xx: capabilities and effects
    CapabilityInPureFunction,
    UndeclaredCapability,
    CapabilityNotInUses,
    EffectCallInPureFunction,
    DuplicateUsesEntry,
    DuplicateCapability,
}

/// One row of the registry
struct RegistryEntry {
    code: &'static str,
    level: Level,
    template: &'static str,
}

const fn entry(code: &'static str, level: Level, template: &'static str) -> RegistryEntry {
    RegistryEntry { code, level, template }
}

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 42] = [
        DiagnosticCode::Syntax,
        DiagnosticCode::UnknownIdentifier,
        DiagnosticCode::UnresolvedCallTarget,
        DiagnosticCode::UnknownType,
        DiagnosticCode::TypeMismatch,
        DiagnosticCode::ReturnTypeMismatch,
        DiagnosticCode::NotCallable,
        DiagnosticCode::ArityMismatch,
        DiagnosticCode::ArgumentMismatch,
        DiagnosticCode::TypeArgumentCount,
        DiagnosticCode::ConditionNotBool,
        DiagnosticCode::InvalidBinaryOperands,
        DiagnosticCode::InvalidUnaryOperand,
        DiagnosticCode::UnknownField,
        DiagnosticCode::AssignToConstant,
        DiagnosticCode::InvalidAssignmentTarget,
        DiagnosticCode::NotIterable,
        DiagnosticCode::NotABrand,
        DiagnosticCode::UnknownConstructor,
        DiagnosticCode::MissingConstructorField,
        DiagnosticCode::NonExhaustiveMatch,
        DiagnosticCode::UnknownCase,
        DiagnosticCode::PatternTypeMismatch,
        DiagnosticCode::DuplicateCase,
        DiagnosticCode::UnreachableCase,
        DiagnosticCode::NonUnionMatch,
        DiagnosticCode::UnknownConstructorField,
        DiagnosticCode::GuardNotBool,
        DiagnosticCode::DuplicateType,
        DiagnosticCode::DuplicateConstructor,
        DiagnosticCode::MixedUnion,
        DiagnosticCode::DuplicateDeclaration,
        DiagnosticCode::DuplicateParameter,
        DiagnosticCode::DuplicateField,
        DiagnosticCode::RefinementNotBool,
        DiagnosticCode::ContractNotBool,
        DiagnosticCode::CapabilityInPureFunction,
        DiagnosticCode::UndeclaredCapability,
        DiagnosticCode::CapabilityNotInUses,
        DiagnosticCode::EffectCallInPureFunction,
        DiagnosticCode::DuplicateUsesEntry,
        DiagnosticCode::DuplicateCapability,
    ];

    fn entry(self) -> RegistryEntry {
        use DiagnosticCode::*;
        use Level::{Error as E, Warning as W};

        match self {
            Syntax => entry("ILC0100", E, "{message}"),
            UnknownIdentifier => entry("ILC0201", E, "Unknown identifier '{name}'"),
            UnresolvedCallTarget => entry("ILC0202", E, "Cannot resolve call target '{name}'"),
            UnknownType => entry("ILC0203", E, "Unknown type '{type}'"),
            TypeMismatch => entry("ILC0204", E, "Type mismatch: expected '{expected}', found '{found}'"),
            ReturnTypeMismatch => entry(
                "ILC0205",
                E,
                "Return type mismatch in '{name}': expected '{expected}', found '{found}'",
            ),
            NotCallable => entry("ILC0206", E, "Expression of type '{type}' is not callable"),
            ArityMismatch => entry("ILC0207", E, "'{name}' expects {expected} argument(s), found {found}"),
            ArgumentMismatch => entry(
                "ILC0208",
                E,
                "Argument {index} of '{name}': expected '{expected}', found '{found}'",
            ),
            TypeArgumentCount => entry(
                "ILC0209",
                E,
                "Type '{type}' expects {expected} type argument(s), found {found}",
            ),
            ConditionNotBool => entry("ILC0210", E, "Condition must be 'Bool', found '{found}'"),
            InvalidBinaryOperands => entry(
                "ILC0211",
                E,
                "Operator '{op}' cannot be applied to '{left}' and '{right}'",
            ),
            InvalidUnaryOperand => entry("ILC0212", E, "Operator '{op}' cannot be applied to '{operand}'"),
            UnknownField => entry("ILC0213", E, "Type '{type}' has no field '{field}'"),
            AssignToConstant => entry("ILC0214", E, "Cannot assign to constant '{name}'"),
            InvalidAssignmentTarget => entry("ILC0215", E, "Invalid assignment target"),
            NotIterable => entry("ILC0216", E, "Type '{type}' is not iterable"),
            NotABrand => entry("ILC0217", E, "Type '{type}' is not a brand type"),
            UnknownConstructor => entry("ILC0218", E, "Unknown constructor '{ctor}'"),
            MissingConstructorField => entry("ILC0219", E, "Constructor '{ctor}' is missing field '{field}'"),
            NonExhaustiveMatch => entry("ILC0220", E, "Non-exhaustive match on '{type}': missing {missing}"),
            UnknownCase => entry("ILC0221", E, "Unknown case '{ctor}' for type '{type}'"),
            PatternTypeMismatch => entry("ILC0222", E, "Pattern '{pattern}' cannot match type '{type}'"),
            DuplicateCase => entry("ILC0223", W, "Duplicate case '{ctor}' in match on '{type}'"),
            UnreachableCase => entry("ILC0224", W, "Unreachable case '{pattern}' after wildcard"),
            NonUnionMatch => entry(
                "ILC0225",
                W,
                "Match on non-union type '{type}' is not checked for exhaustiveness",
            ),
            UnknownConstructorField => entry("ILC0226", E, "Constructor '{ctor}' has no field '{field}'"),
            GuardNotBool => entry("ILC0227", E, "Match guard must be 'Bool', found '{found}'"),
            DuplicateType => entry("ILC0230", E, "Duplicate type '{type}'"),
            DuplicateConstructor => entry("ILC0231", E, "Duplicate constructor '{ctor}' in type '{type}'"),
            MixedUnion => entry("ILC0232", W, "Union type '{type}' mixes literal and named constructors"),
            DuplicateDeclaration => entry("ILC0233", E, "Duplicate declaration '{name}'"),
            DuplicateParameter => entry("ILC0234", E, "Duplicate parameter '{name}' in '{owner}'"),
            DuplicateField => entry("ILC0235", E, "Duplicate field '{field}' in '{owner}'"),
            RefinementNotBool => entry(
                "ILC0236",
                E,
                "Refinement predicate on '{type}' must be 'Bool', found '{found}'",
            ),
            ContractNotBool => entry("ILC0240", E, "'{clause}' clause of '{name}' must be 'Bool', found '{found}'"),
            CapabilityInPureFunction => entry(
                "ILC0301",
                E,
                "Pure function '{func}' cannot use capability '{capability}'",
            ),
            UndeclaredCapability => entry(
                "ILC0302",
                E,
                "Effect '{effect}' uses undeclared capability '{capability}'",
            ),
            CapabilityNotInUses => entry(
                "ILC0303",
                E,
                "Effect '{effect}' references capability '{capability}' missing from its uses list",
            ),
            EffectCallInPureFunction => entry("ILC0304", E, "Pure function '{func}' cannot call effect '{effect}'"),
            DuplicateUsesEntry => entry(
                "ILC0305",
                W,
                "Capability '{capability}' is listed more than once in effect '{effect}'",
            ),
            DuplicateCapability => entry("ILC0306", E, "Duplicate capability '{capability}'"),
        }
    }

    /// The stable `ILCxxxx` identifier
    pub fn as_str(self) -> &'static str {
        self.entry().code
    }

    pub fn level(self) -> Level {
        self.entry().level
    }

    pub fn template(self) -> &'static str {
        self.entry().template
    }

    /// Look a code up by its `ILCxxxx` identifier
    pub fn from_code(code: &str) -> Option<Self> {
        static BY_CODE: Lazy<HashMap<&'static str, DiagnosticCode>> = Lazy::new(|| {
            DiagnosticCode::ALL
                .iter()
                .map(|code| (code.as_str(), *code))
                .collect()
        });

        BY_CODE.get(code).copied()
    }

    /// Fill the template's `{placeholders}` from `args`; unknown names are left as written
    pub fn render(self, args: &[(&str, &str)]) -> String {
        let template = self.template();
        let mut message = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match args.iter().find(|(key, _)| *key == name) {
                        Some((_, value)) => message.push_str(value),
                        None => {
                            message.push('{');
                            message.push_str(name);
                            message.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    message.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        message.push_str(rest);

        message
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiagnosticCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        DiagnosticCode::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown diagnostic code '{}'", code)))
    }
}

/// A coded report of a parse or check failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, args: &[(&str, &str)], span: Option<Span>) -> Self {
        Diagnostic {
            code,
            level: code.level(),
            message: code.render(args),
            span,
            file: None,
        }
    }

    /// Append the nearest-name hint
    pub fn with_suggestion(mut self, suggestion: Option<&str>) -> Self {
        if let Some(name) = suggestion {
            self.message.push_str(&format!(" Did you mean '{}'?", name));
        }
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == Level::Warning
    }

    /// Errors always block emission; warnings only under a strict policy.
    /// The diagnostic's own level is never changed.
    pub fn is_blocking(&self, strict: bool) -> bool {
        match self.level {
            Level::Error => true,
            Level::Warning => strict,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        if let Some(span) = &self.span {
            write!(f, "{}: ", span.start)?;
        }
        write!(f, "{}[{}]: {}", self.level, self.code, self.message)
    }
}

/// Render diagnostics in the published JSON shape
pub fn to_json(diagnostics: &[Diagnostic]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(diagnostics)
}

/// Collects diagnostics in emission order
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    file: Option<String>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `file` to every diagnostic reported from now on
    pub fn with_file(file: Option<String>) -> Self {
        DiagnosticReporter {
            diagnostics: Vec::new(),
            file,
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(code = %diagnostic.code, message = %diagnostic.message, "diagnostic");
        self.diagnostics.push(diagnostic.with_file(self.file.clone()));
    }

    pub fn emit(&mut self, code: DiagnosticCode, args: &[(&str, &str)], span: Span) {
        self.report(Diagnostic::new(code, args, Some(span)));
    }

    pub fn emit_with_suggestion(
        &mut self,
        code: DiagnosticCode,
        args: &[(&str, &str)],
        span: Span,
        suggestion: Option<&str>,
    ) {
        self.report(Diagnostic::new(code, args, Some(span)).with_suggestion(suggestion));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique_and_round_trip() {
        let mut seen = HashSet::new();
        for code in DiagnosticCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate code {}", code);
            assert!(code.as_str().starts_with("ILC"));
            assert_eq!(DiagnosticCode::from_code(code.as_str()), Some(code));
        }
        assert_eq!(DiagnosticCode::from_code("ILC9999"), None);
    }

    #[test]
    fn test_code_ranges_follow_subsystems() {
        assert_eq!(DiagnosticCode::Syntax.as_str(), "ILC0100");
        assert!(DiagnosticCode::NonExhaustiveMatch.as_str().starts_with("ILC02"));
        assert!(DiagnosticCode::UndeclaredCapability.as_str().starts_with("ILC03"));
    }

    #[test]
    fn test_render_fills_placeholders() {
        let message = DiagnosticCode::TypeMismatch.render(&[("expected", "Int"), ("found", "String")]);
        assert_eq!(message, "Type mismatch: expected 'Int', found 'String'");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let message = DiagnosticCode::UnknownIdentifier.render(&[]);
        assert_eq!(message, "Unknown identifier '{name}'");
    }

    #[test]
    fn test_suggestion_suffix() {
        let diagnostic = Diagnostic::new(DiagnosticCode::UnknownIdentifier, &[("name", "usr")], None)
            .with_suggestion(Some("user"));
        assert_eq!(diagnostic.message, "Unknown identifier 'usr' Did you mean 'user'?");
    }

    #[test]
    fn test_levels_are_intrinsic() {
        assert_eq!(DiagnosticCode::DuplicateCase.level(), Level::Warning);
        assert_eq!(DiagnosticCode::NonExhaustiveMatch.level(), Level::Error);
        assert_eq!(DiagnosticCode::NonUnionMatch.level(), Level::Warning);
    }

    #[test]
    fn test_blocking_policy() {
        let warning = Diagnostic::new(DiagnosticCode::MixedUnion, &[("type", "T")], None);
        assert!(!warning.is_blocking(false));
        assert!(warning.is_blocking(true));
        assert_eq!(warning.level, Level::Warning);

        let error = Diagnostic::new(DiagnosticCode::UnknownType, &[("type", "T")], None);
        assert!(error.is_blocking(false));
    }

    #[test]
    fn test_json_shape() {
        let diagnostic = Diagnostic::new(DiagnosticCode::DuplicateType, &[("type", "User")], None);
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "ILC0230",
                "level": "error",
                "message": "Duplicate type 'User'"
            })
        );

        let restored: Diagnostic = serde_json::from_value(json).unwrap();
        assert_eq!(restored, diagnostic);
    }

    #[test]
    fn test_reporter_attaches_file_and_counts() {
        let mut reporter = DiagnosticReporter::with_file(Some("main.intent".to_string()));
        reporter.emit(DiagnosticCode::UnknownType, &[("type", "Usr")], Span::default());
        reporter.emit(DiagnosticCode::MixedUnion, &[("type", "T")], Span::default());

        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.warning_count(), 1);
        assert!(reporter
            .diagnostics()
            .iter()
            .all(|d| d.file.as_deref() == Some("main.intent")));
    }
}
