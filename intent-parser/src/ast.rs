//! Abstract Syntax Tree definitions for the Intent language
//!
//! Every node carries a [`Span`]. Nodes are built bottom-up by the parser and
//! never mutated afterwards; the checker only reads them.

use crate::span::{HasSpan, Span};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Top-level program (one source file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub intent: Option<IntentSection>,
    pub uses: Option<UsesSection>,
    pub types: Option<TypesSection>,
    pub items: Vec<Item>,
    pub span: Span,
}

impl Program {
    /// Capability declarations of the `uses` section (empty when absent)
    pub fn capabilities(&self) -> &[UseDecl] {
        self.uses.as_ref().map(|u| u.decls.as_slice()).unwrap_or(&[])
    }

    /// Type declarations of the `types` section (empty when absent)
    pub fn type_decls(&self) -> &[TypeDecl] {
        self.types.as_ref().map(|t| t.decls.as_slice()).unwrap_or(&[])
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Func(func) => Some(func),
            _ => None,
        })
    }

    pub fn effects(&self) -> impl Iterator<Item = &EffectDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Effect(effect) => Some(effect),
            _ => None,
        })
    }

    pub fn tests(&self) -> impl Iterator<Item = &TestDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Test(test) => Some(test),
            _ => None,
        })
    }
}

/// An identifier together with where it was written
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident { name: name.into(), span }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------

/// `intent "description" tags ["a", "b"]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSection {
    pub description: String,
    pub tags: Vec<String>,
    pub span: Span,
}

/// `uses { name: Capability { key: literal, ... }, ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsesSection {
    pub decls: Vec<UseDecl>,
    pub span: Span,
}

/// One capability binding of the `uses` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseDecl {
    pub name: Ident,
    pub capability: Ident,
    pub config: Vec<ConfigEntry>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: Ident,
    pub value: ConfigValue,
    pub span: Span,
}

/// Literal configuration parameter of a capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypesSection {
    pub decls: Vec<TypeDecl>,
    pub span: Span,
}

/// `type Name = <type expression>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    Basic(BasicType),
    Brand(BrandType),
    Record(RecordType),
    Union(UnionType),
    Generic(GenericType),
    Literal(LiteralType),
}

impl HasSpan for TypeExpr {
    fn span(&self) -> Span {
        match self {
            TypeExpr::Basic(t) => t.span,
            TypeExpr::Brand(t) => t.span,
            TypeExpr::Record(t) => t.span,
            TypeExpr::Union(t) => t.span,
            TypeExpr::Generic(t) => t.span,
            TypeExpr::Literal(t) => t.span,
        }
    }
}

/// Primitive type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Int,
    Float,
    String,
    Bool,
    Unit,
}

impl Primitive {
    /// Accepts both the capitalised and the lowercase spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Int" | "int" => Some(Primitive::Int),
            "Float" | "float" => Some(Primitive::Float),
            "String" | "string" => Some(Primitive::String),
            "Bool" | "bool" | "boolean" => Some(Primitive::Bool),
            "Unit" | "void" => Some(Primitive::Unit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "Int",
            Primitive::Float => "Float",
            Primitive::String => "String",
            Primitive::Bool => "Bool",
            Primitive::Unit => "Unit",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicType {
    pub primitive: Primitive,
    pub span: Span,
}

/// `Base brand "Tag" [where predicate]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandType {
    pub base: Box<TypeExpr>,
    pub brand: String,
    pub refinement: Option<Refinement>,
    pub span: Span,
}

/// A `where` clause; `value` is bound to the refined value inside `predicate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    pub predicate: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub refinement: Option<Refinement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionType {
    pub ctors: Vec<Constructor>,
    pub span: Span,
}

impl UnionType {
    pub fn has_literal_ctors(&self) -> bool {
        self.ctors.iter().any(|c| matches!(c, Constructor::Literal(_)))
    }

    pub fn has_named_ctors(&self) -> bool {
        self.ctors.iter().any(|c| matches!(c, Constructor::Named(_)))
    }
}

/// One alternative of a union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constructor {
    Literal(LiteralCtor),
    Named(NamedCtor),
}

impl Constructor {
    /// The key used for uniqueness and exhaustiveness: the tag name, or the
    /// literal's [`Literal::key`]
    pub fn key(&self) -> String {
        match self {
            Constructor::Literal(ctor) => ctor.value.key(),
            Constructor::Named(ctor) => ctor.name.name.clone(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Constructor::Literal(ctor) => ctor.span,
            Constructor::Named(ctor) => ctor.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralCtor {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCtor {
    pub name: Ident,
    pub fields: Option<RecordType>,
    pub span: Span,
}

/// `Name<Arg, ...>`; a bare reference to a declared type has no arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericType {
    pub name: Ident,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralType {
    pub value: Literal,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Func(FuncDecl),
    Effect(EffectDecl),
    Test(TestDecl),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Func(def) => def.span,
            Item::Effect(def) => def.span,
            Item::Test(def) => def.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// `requires` / `ensures` clauses of a signature
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contract {
    pub requires: Option<Expr>,
    pub ensures: Option<Expr>,
}

impl Contract {
    pub fn is_empty(&self) -> bool {
        self.requires.is_none() && self.ensures.is_none()
    }
}

/// Pure function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub contract: Contract,
    pub body: Block,
    pub span: Span,
}

/// Effectful operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub uses: Vec<Ident>,
    pub contract: Contract,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDecl {
    pub name: String,
    pub body: Block,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
    Update(UpdateStmt),
    Return(ReturnStmt),
    If(IfStmt),
    Match(MatchExpr),
    For(ForStmt),
    While(WhileStmt),
    Try(TryStmt),
    Expr(ExprStmt),
}

impl HasSpan for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Update(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::Match(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingKind {
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStmt {
    pub kind: BindingKind,
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStmt {
    pub target: Expr,
    pub op: UpdateOp,
    pub prefix: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub binding: Ident,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub body: Block,
    pub catch_binding: Option<Ident>,
    pub handler: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Literal {
    /// Discriminant key: numbers compare by value, so `1` and `1.0` share a key
    pub fn key(&self) -> String {
        match self {
            Literal::Float(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_FLOAT => {
                format!("{}", *n as i64)
            }
            other => other.to_string(),
        }
    }
}

/// Integral floats below this magnitude convert to `i64` exactly
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::String(s) => {
                // Escapes mirror the ones the lexer reads
                f.write_char('"')?;
                for ch in s.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        '\0' => f.write_str("\\0")?,
                        other => f.write_char(other)?,
                    }
                }
                f.write_char('"')
            }
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
            UnaryOp::Neg => f.write_str("-"),
        }
    }
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOp::Increment => f.write_str("++"),
            UpdateOp::Decrement => f.write_str("--"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `=` or one of the compound forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Assign => f.write_str("="),
            AssignOp::Compound(op) => write!(f, "{}=", op),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaParam {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

/// `match (subject) { case ... }`, shared by the statement and expression forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchExpr {
    pub subject: Box<Expr>,
    pub cases: Vec<MatchCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: CaseBody,
    pub span: Span,
}

/// Block bodies only occur in statement-position matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseBody {
    Expr(Expr),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal {
        value: Literal,
        span: Span,
    },
    Ident(Ident),
    Object {
        fields: Vec<ObjectField>,
        span: Span,
    },
    Array {
        elements: Vec<Expr>,
        span: Span,
    },
    Map {
        entries: Vec<MapEntry>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        property: Ident,
        span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    Ok {
        value: Box<Expr>,
        span: Span,
    },
    Err {
        value: Box<Expr>,
        span: Span,
    },
    Some {
        value: Box<Expr>,
        span: Span,
    },
    None {
        span: Span,
    },
    BrandCast {
        brand: Ident,
        value: Box<Expr>,
        span: Span,
    },
    Variant {
        tag: Ident,
        fields: Vec<ObjectField>,
        span: Span,
    },
    Match(MatchExpr),
    Lambda {
        params: Vec<LambdaParam>,
        body: LambdaBody,
        span: Span,
    },
}

impl HasSpan for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Object { span, .. }
            | Expr::Array { span, .. }
            | Expr::Map { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Update { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Ok { span, .. }
            | Expr::Err { span, .. }
            | Expr::Some { span, .. }
            | Expr::None { span }
            | Expr::BrandCast { span, .. }
            | Expr::Variant { span, .. }
            | Expr::Lambda { span, .. } => *span,
            Expr::Ident(ident) => ident.span,
            Expr::Match(m) => m.span,
        }
    }
}

// ---------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Literal {
        value: Literal,
        span: Span,
    },
    /// `Tag`, `Tag { field, field: alias }` or the payload form `Ok(x)`
    Variant {
        tag: Ident,
        payload: Option<Ident>,
        bindings: Option<Vec<FieldBinding>>,
        span: Span,
    },
    Wildcard {
        span: Span,
    },
}

impl Pattern {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Pattern::Wildcard { .. })
    }
}

impl HasSpan for Pattern {
    fn span(&self) -> Span {
        match self {
            Pattern::Literal { span, .. } | Pattern::Variant { span, .. } | Pattern::Wildcard { span } => {
                *span
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal { value, .. } => write!(f, "{}", value),
            Pattern::Variant { tag, payload, bindings, .. } => {
                write!(f, "{}", tag)?;
                if let Some(payload) = payload {
                    write!(f, "({})", payload)?;
                }
                if let Some(bindings) = bindings {
                    let fields: Vec<String> = bindings
                        .iter()
                        .map(|b| match &b.alias {
                            Some(alias) => format!("{}: {}", b.field, alias),
                            None => b.field.name.clone(),
                        })
                        .collect();
                    write!(f, " {{ {} }}", fields.join(", "))?;
                }
                Ok(())
            }
            Pattern::Wildcard { .. } => f.write_str("_"),
        }
    }
}

/// `field` or `field: alias` inside a variant pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub field: Ident,
    pub alias: Option<Ident>,
    pub span: Span,
}

impl FieldBinding {
    /// The local name this binding introduces
    pub fn binding(&self) -> &Ident {
        self.alias.as_ref().unwrap_or(&self.field)
    }
}
