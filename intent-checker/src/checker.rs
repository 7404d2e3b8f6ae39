//! Main checker: program phases and statements
//!
//! A check is one full pass in fixed phases: capabilities, types,
//! signatures, refinements, then every item body in source order. Each phase
//! reports into the same [`DiagnosticReporter`] and never stops early.

use crate::{
    config::CheckOptions,
    diagnostics::{Diagnostic, DiagnosticCode, DiagnosticReporter},
    effect_checker::DeclContext,
    env::{CapabilityInfo, Callable, CallableKind, GlobalEnv, LocalKind, Scope},
    suggest,
    types::Type,
};
use intent_parser::{
    AssignOp, BindingKind, Block, ElseBranch, Expr, HasSpan, Ident, IfStmt, Item, Param, Program,
    Refinement, Span, Stmt, TypeExpr, UpdateOp,
};
use std::collections::HashSet;

/// Lowered signature of one item, aligned with `Program::items`
#[derive(Debug, Clone, Default)]
pub(crate) struct Signature {
    pub params: Vec<(Ident, Type)>,
    pub ret: Option<Type>,
}

/// A `where` clause waiting for the type table to be complete
#[derive(Debug, Clone)]
pub(crate) struct PendingRefinement {
    pub owner: String,
    pub base: Type,
    pub refinement: Refinement,
}

pub struct Checker {
    pub(crate) options: CheckOptions,
    pub(crate) env: GlobalEnv,
    pub(crate) scope: Scope,
    pub(crate) reporter: DiagnosticReporter,
    pub(crate) decl: DeclContext,
    /// Declared return type of the body being checked
    pub(crate) return_type: Option<Type>,
    /// (code, subject) pairs already reported for the current declaration
    pub(crate) reported: HashSet<(DiagnosticCode, String)>,
    pub(crate) pending_refinements: Vec<PendingRefinement>,
}

impl Checker {
    pub fn new(options: &CheckOptions) -> Self {
        Self {
            options: options.clone(),
            env: GlobalEnv::new(),
            scope: Scope::new(),
            reporter: DiagnosticReporter::with_file(options.file.clone()),
            decl: DeclContext::TopLevel,
            return_type: None,
            reported: HashSet::new(),
            pending_refinements: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.reporter.diagnostics()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.reporter.into_diagnostics()
    }

    /// Check a whole program
    pub fn check_program(&mut self, program: &Program) {
        self.collect_capabilities(program);
        self.collect_types(program);
        let signatures = self.collect_signatures(program);
        self.flush_refinements();

        tracing::trace!(
            types = program.type_decls().len(),
            items = program.items.len(),
            "declarations collected"
        );

        for (item, signature) in program.items.iter().zip(&signatures) {
            self.check_item(item, signature);
        }
    }

    fn collect_capabilities(&mut self, program: &Program) {
        for decl in program.capabilities() {
            let declared = self.env.declare_capability(CapabilityInfo {
                name: decl.name.name.clone(),
                capability: decl.capability.name.clone(),
                span: decl.span,
            });
            if !declared {
                self.reporter.emit(
                    DiagnosticCode::DuplicateCapability,
                    &[("capability", decl.name.as_str())],
                    decl.name.span,
                );
            }
        }
    }

    fn collect_signatures(&mut self, program: &Program) -> Vec<Signature> {
        let mut test_names = HashSet::new();
        let mut signatures = Vec::with_capacity(program.items.len());

        for item in &program.items {
            let (name, params, return_type, kind) = match item {
                Item::Func(func) => (&func.name, &func.params, &func.return_type, CallableKind::Func),
                Item::Effect(effect) => {
                    (&effect.name, &effect.params, &effect.return_type, CallableKind::Effect)
                }
                Item::Test(test) => {
                    if !test_names.insert(test.name.as_str()) {
                        self.reporter.emit(
                            DiagnosticCode::DuplicateDeclaration,
                            &[("name", test.name.as_str())],
                            test.span,
                        );
                    }
                    signatures.push(Signature::default());
                    continue;
                }
            };

            let signature = self.lower_signature(name, params, return_type.as_ref());
            let declared = self.env.declare_callable(Callable {
                name: name.name.clone(),
                kind,
                params: signature.params.iter().map(|(_, ty)| ty.clone()).collect(),
                required: signature.params.len(),
                ret: signature.ret.clone().unwrap_or(Type::Unknown),
                span: Some(name.span),
            });
            if !declared {
                self.reporter.emit(
                    DiagnosticCode::DuplicateDeclaration,
                    &[("name", name.as_str())],
                    name.span,
                );
            }
            signatures.push(signature);
        }

        signatures
    }

    fn lower_signature(&mut self, name: &Ident, params: &[Param], return_type: Option<&TypeExpr>) -> Signature {
        let mut seen = HashSet::new();
        let mut lowered = Vec::with_capacity(params.len());

        for param in params {
            if !seen.insert(param.name.as_str()) {
                self.reporter.emit(
                    DiagnosticCode::DuplicateParameter,
                    &[("name", param.name.as_str()), ("owner", name.as_str())],
                    param.name.span,
                );
            }
            let ty = self.lower_type(&param.ty, name.as_str());
            lowered.push((param.name.clone(), ty));
        }

        Signature {
            params: lowered,
            ret: return_type.map(|ty| self.lower_type(ty, name.as_str())),
        }
    }

    fn check_item(&mut self, item: &Item, signature: &Signature) {
        self.scope = Scope::new();
        self.reported.clear();
        self.return_type = signature.ret.clone();

        for (name, ty) in &signature.params {
            self.scope.bind(name.as_str(), ty.clone(), LocalKind::Param, name.span);
        }

        match item {
            Item::Func(func) => {
                self.decl = DeclContext::Func {
                    name: func.name.name.clone(),
                };
                self.check_contract(&func.name, &func.contract, signature.ret.as_ref());
                self.check_block(&func.body);
            }
            Item::Effect(effect) => {
                self.check_uses_list(effect);
                self.decl = DeclContext::Effect {
                    name: effect.name.name.clone(),
                    uses: effect.uses.iter().map(|u| u.name.clone()).collect(),
                };
                self.check_contract(&effect.name, &effect.contract, signature.ret.as_ref());
                self.check_block(&effect.body);
            }
            Item::Test(test) => {
                self.decl = DeclContext::Test {
                    name: test.name.clone(),
                };
                self.check_block(&test.body);
            }
        }

        self.decl = DeclContext::TopLevel;
        self.return_type = None;
    }

    /// Run `f` in a nested scope; bindings made inside are dropped afterwards
    pub(crate) fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.scope.clone();
        let result = f(self);
        self.scope = saved;
        result
    }

    pub(crate) fn check_block(&mut self, block: &Block) {
        self.scoped(|checker| {
            for stmt in &block.stmts {
                checker.check_stmt(stmt);
            }
        });
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(binding) => {
                let value_ty = self.infer_expr(&binding.value);
                let ty = match &binding.ty {
                    Some(annotation) => {
                        let declared = self.lower_type(annotation, binding.name.as_str());
                        self.flush_refinements();
                        self.expect_type(&value_ty, &declared, binding.value.span());
                        declared
                    }
                    None if binding.kind == BindingKind::Let => value_ty.widen(),
                    None => value_ty,
                };
                let kind = match binding.kind {
                    BindingKind::Let => LocalKind::Let,
                    BindingKind::Const => LocalKind::Const,
                };
                self.scope.bind(binding.name.as_str(), ty, kind, binding.name.span);
            }
            Stmt::Assign(assign) => {
                self.check_assignment(&assign.target, assign.op, &assign.value, assign.span);
            }
            Stmt::Update(update) => {
                self.check_update(&update.target, update.op);
            }
            Stmt::Return(ret) => {
                let found = match &ret.value {
                    Some(value) => self.infer_expr(value),
                    None => Type::Unit,
                };
                if let Some(expected) = self.return_type.clone() {
                    if !self.env.types.is_assignable(&found, &expected) {
                        let name = self.decl.name().unwrap_or_default().to_string();
                        let span = ret.value.as_ref().map(|v| v.span()).unwrap_or(ret.span);
                        self.reporter.emit(
                            DiagnosticCode::ReturnTypeMismatch,
                            &[
                                ("name", &name),
                                ("expected", &expected.to_string()),
                                ("found", &found.to_string()),
                            ],
                            span,
                        );
                    }
                }
            }
            Stmt::If(stmt) => self.check_if(stmt),
            Stmt::Match(m) => {
                self.check_match(m, false);
            }
            Stmt::For(stmt) => {
                let iterable = self.infer_expr(&stmt.iterable);
                let element = self.element_type(&iterable, stmt.iterable.span());
                self.scoped(|checker| {
                    checker
                        .scope
                        .bind(stmt.binding.as_str(), element, LocalKind::Let, stmt.binding.span);
                    checker.check_block(&stmt.body);
                });
            }
            Stmt::While(stmt) => {
                self.check_condition(&stmt.condition);
                self.check_block(&stmt.body);
            }
            Stmt::Try(stmt) => {
                self.check_block(&stmt.body);
                self.scoped(|checker| {
                    if let Some(binding) = &stmt.catch_binding {
                        checker
                            .scope
                            .bind(binding.as_str(), Type::Unknown, LocalKind::Let, binding.span);
                    }
                    checker.check_block(&stmt.handler);
                });
            }
            Stmt::Expr(stmt) => {
                self.infer_expr(&stmt.expr);
            }
        }
    }

    fn check_if(&mut self, stmt: &IfStmt) {
        self.check_condition(&stmt.condition);
        self.check_block(&stmt.then_block);
        match &stmt.else_branch {
            Some(ElseBranch::If(inner)) => self.check_if(inner),
            Some(ElseBranch::Block(block)) => self.check_block(block),
            None => {}
        }
    }

    pub(crate) fn check_condition(&mut self, condition: &Expr) {
        let found = self.infer_expr(condition);
        if !self.env.types.is_assignable(&found, &Type::Bool) {
            self.reporter.emit(
                DiagnosticCode::ConditionNotBool,
                &[("found", &found.to_string())],
                condition.span(),
            );
        }
    }

    /// Element type produced by iterating over `iterable`
    fn element_type(&mut self, iterable: &Type, span: Span) -> Type {
        match self.env.types.underlying(iterable).widen() {
            Type::List(element) => *element,
            Type::Map(key, _) => *key,
            Type::String => Type::String,
            Type::Unknown => Type::Unknown,
            _ => {
                self.reporter.emit(
                    DiagnosticCode::NotIterable,
                    &[("type", &iterable.to_string())],
                    span,
                );
                Type::Unknown
            }
        }
    }

    /// Type of an assignable place, or `None` when the target is not one
    fn check_place(&mut self, target: &Expr) -> Option<Type> {
        match target {
            Expr::Ident(ident) => {
                if let Some(local) = self.scope.lookup(ident.as_str()) {
                    let ty = local.ty.clone();
                    if local.kind == LocalKind::Const {
                        self.reporter.emit(
                            DiagnosticCode::AssignToConstant,
                            &[("name", ident.as_str())],
                            ident.span,
                        );
                    }
                    return Some(ty);
                }
                if self.env.is_capability(ident.as_str())
                    || self.env.callable(ident.as_str()).is_some()
                    || !self.env.ctor_owners(ident.as_str()).is_empty()
                {
                    self.reporter
                        .emit(DiagnosticCode::InvalidAssignmentTarget, &[], target.span());
                } else {
                    self.report_unknown_identifier(ident);
                }
                None
            }
            Expr::Member { .. } | Expr::Index { .. } => Some(self.infer_expr(target)),
            _ => {
                self.reporter
                    .emit(DiagnosticCode::InvalidAssignmentTarget, &[], target.span());
                None
            }
        }
    }

    /// `target = value` or `target op= value`; yields the target's type
    pub(crate) fn check_assignment(&mut self, target: &Expr, op: AssignOp, value: &Expr, span: Span) -> Type {
        let target_ty = self.check_place(target);
        let value_ty = self.infer_expr(value);

        let Some(target_ty) = target_ty else {
            return Type::Unknown;
        };

        let assigned = match op {
            AssignOp::Assign => value_ty,
            AssignOp::Compound(op) => self.binary_result(op, &target_ty, &value_ty, span),
        };
        self.expect_type(&assigned, &target_ty, value.span());
        target_ty
    }

    /// `++` / `--` on a numeric place
    pub(crate) fn check_update(&mut self, target: &Expr, op: UpdateOp) -> Type {
        let Some(ty) = self.check_place(target) else {
            return Type::Unknown;
        };
        if !self.is_numeric(&ty) {
            self.reporter.emit(
                DiagnosticCode::InvalidUnaryOperand,
                &[("op", &op.to_string()), ("operand", &ty.to_string())],
                target.span(),
            );
        }
        ty
    }

    /// Report ILC0204 unless `found` is assignable to `expected`
    pub(crate) fn expect_type(&mut self, found: &Type, expected: &Type, span: Span) -> bool {
        if self.env.types.is_assignable(found, expected) {
            return true;
        }
        self.reporter.emit(
            DiagnosticCode::TypeMismatch,
            &[("expected", &expected.to_string()), ("found", &found.to_string())],
            span,
        );
        false
    }

    pub(crate) fn report_unknown_identifier(&mut self, ident: &Ident) {
        let candidates: Vec<String> = self
            .scope
            .names()
            .chain(self.env.capability_names())
            .chain(self.env.callable_names())
            .chain(self.env.ctor_names())
            .map(str::to_string)
            .collect();
        let suggestion = self.suggest(ident.as_str(), candidates.iter().map(String::as_str));
        self.reporter.emit_with_suggestion(
            DiagnosticCode::UnknownIdentifier,
            &[("name", ident.as_str())],
            ident.span,
            suggestion.as_deref(),
        );
    }

    /// Nearest candidate name, when suggestions are enabled
    pub(crate) fn suggest<'n>(&self, name: &str, candidates: impl IntoIterator<Item = &'n str>) -> Option<String> {
        let max = self.options.suggestion_bound()?;
        suggest::closest(name, candidates, max).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_parser::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        let program = parse(source).unwrap();
        let mut checker = Checker::new(&CheckOptions::default());
        checker.check_program(&program);
        checker.into_diagnostics()
    }

    fn codes(source: &str) -> Vec<&'static str> {
        check(source).iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn test_clean_program() {
        let source = r#"
            func add(a: Int, b: Int): Int { return a + b }
            func twice(x: Int): Int { const y = add(x, x); return y }
        "#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_duplicate_declarations() {
        let source = r#"
            uses { http: HttpClient, http: HttpClient }
            func f(a: Int, a: Int): Int { return a }
            func f(): Int { return 1 }
            test "t" { }
            test "t" { }
        "#;
        assert_eq!(codes(source), vec!["ILC0306", "ILC0234", "ILC0233", "ILC0233"]);
    }

    #[test]
    fn test_let_widens_and_const_keeps_literal() {
        let source = r#"
            types { type Status = "active" | "inactive"; }
            func f(s: Status): Bool { return true }
            func g(): Bool {
                const a = "active"
                let b = "active"
                f(a)
                return f(b)
            }
        "#;
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ArgumentMismatch);
        assert!(diagnostics[0].message.contains("found 'String'"));
    }

    #[test]
    fn test_annotation_mismatch() {
        let diagnostics = check(r#"func f(): Int { let x: Int = "one"; return x }"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Type mismatch: expected 'Int', found '\"one\"'"
        );
    }

    #[test]
    fn test_return_checked_only_when_declared() {
        assert_eq!(codes(r#"func f(): Int { return "x" }"#), vec!["ILC0205"]);
        assert!(codes(r#"func f() { return "x" }"#).is_empty());
    }

    #[test]
    fn test_assignment_rules() {
        let source = r#"
            func f(): Int {
                const c: Int = 1
                c = 2
                let s = "a"
                s++
                1 = 2
                return c
            }
        "#;
        assert_eq!(codes(source), vec!["ILC0214", "ILC0212", "ILC0215"]);
    }

    #[test]
    fn test_conditions_and_loops() {
        let source = r#"
            func f(xs: List<Int>, n: Int): Int {
                let total = 0
                for (x in xs) { total += x }
                for (y in n) { }
                if (n) { }
                while (total > 0) { total-- }
                return total
            }
        "#;
        assert_eq!(codes(source), vec!["ILC0216", "ILC0210"]);
    }

    #[test]
    fn test_block_scopes_end() {
        let source = r#"
            func f(flag: Bool): Int {
                if (flag) { let inner = 1 }
                return inner
            }
        "#;
        assert_eq!(codes(source), vec!["ILC0201"]);
    }

    #[test]
    fn test_catch_binding_is_in_scope() {
        let source = r#"
            func f(): Int {
                try { assert(true) } catch (e) { toString(e) }
                return 0
            }
        "#;
        assert!(check(source).is_empty());
    }
}
