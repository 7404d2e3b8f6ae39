//! Type expressions, records, unions, brands and refinements

use super::Parser;
use crate::{
    ast::*,
    error::{ParseError as Error, Result},
    span::{HasSpan, Span},
    token::TokenKind,
};

/// One alternative while a union is being collected
enum UnionMember {
    Type(TypeExpr),
    Ctor(NamedCtor),
}

impl UnionMember {
    fn span(&self) -> Span {
        match self {
            UnionMember::Type(ty) => ty.span(),
            UnionMember::Ctor(ctor) => ctor.span,
        }
    }
}

/// Refinement operands bind at shift level, below every comparison
const REFINEMENT_OPERAND_PRECEDENCE: u8 = 8;

impl Parser {
    /// Type annotation (parameters, returns, bindings, fields)
    pub(super) fn parse_type_expr(&mut self) -> Result<TypeExpr> {
        self.nested(|parser| parser.parse_union(false))
    }

    /// Right-hand side of `type Name = ...`; constructors may carry records
    pub(super) fn parse_type_definition(&mut self) -> Result<TypeExpr> {
        self.parse_union(true)
    }

    fn parse_union(&mut self, allow_records: bool) -> Result<TypeExpr> {
        let start_span = self.current_span();
        let leading_pipe = self.match_token(&TokenKind::Pipe);

        let first = self.parse_union_member(allow_records)?;

        if !leading_pipe && !self.check(&TokenKind::Pipe) {
            return Ok(match first {
                UnionMember::Type(ty) => ty,
                UnionMember::Ctor(ctor) => TypeExpr::Union(UnionType {
                    span: ctor.span,
                    ctors: vec![Constructor::Named(ctor)],
                }),
            });
        }

        let mut ctors = vec![self.into_constructor(first)?];
        while self.match_token(&TokenKind::Pipe) {
            let member = self.parse_union_member(allow_records)?;
            ctors.push(self.into_constructor(member)?);
        }

        Ok(TypeExpr::Union(UnionType {
            ctors,
            span: self.span_from(start_span),
        }))
    }

    fn parse_union_member(&mut self, allow_records: bool) -> Result<UnionMember> {
        if allow_records {
            if let TokenKind::Ident(name) = &self.current_token().kind {
                if self.peek_kind(1) == &TokenKind::LeftBrace && !is_builtin_type_name(name) {
                    let start_span = self.current_span();
                    let name = self.expect_ident("constructor name")?;
                    let fields = self.parse_record_type()?;
                    return Ok(UnionMember::Ctor(NamedCtor {
                        name,
                        fields: Some(fields),
                        span: self.span_from(start_span),
                    }));
                }
            }
        }

        Ok(UnionMember::Type(self.parse_branded_type()?))
    }

    fn into_constructor(&self, member: UnionMember) -> Result<Constructor> {
        let span = member.span();
        match member {
            UnionMember::Ctor(ctor) => Ok(Constructor::Named(ctor)),
            UnionMember::Type(TypeExpr::Literal(lit)) => Ok(Constructor::Literal(LiteralCtor {
                value: lit.value,
                span: lit.span,
            })),
            UnionMember::Type(TypeExpr::Generic(generic))
                if generic.args.is_empty() && !is_builtin_type_name(&generic.name.name) =>
            {
                Ok(Constructor::Named(NamedCtor {
                    name: generic.name,
                    fields: None,
                    span: generic.span,
                }))
            }
            UnionMember::Type(_) => Err(Error::syntax(
                "union alternatives must be literals or constructor names",
                span,
            )),
        }
    }

    /// `T [brand "B" [where refinement]]`
    fn parse_branded_type(&mut self) -> Result<TypeExpr> {
        let start_span = self.current_span();
        let base = self.parse_postfix_type()?;

        if !self.match_token(&TokenKind::Brand) {
            return Ok(base);
        }

        let brand = self.expect_string("brand name string")?;
        let refinement = if self.check(&TokenKind::Where) {
            Some(self.parse_refinement()?)
        } else {
            None
        };

        Ok(TypeExpr::Brand(BrandType {
            base: Box::new(base),
            brand,
            refinement,
            span: self.span_from(start_span),
        }))
    }

    /// Primary type followed by any number of `[]` suffixes
    fn parse_postfix_type(&mut self) -> Result<TypeExpr> {
        let start_span = self.current_span();
        let mut ty = self.parse_primary_type()?;

        while self.check(&TokenKind::LeftBracket) && self.peek_kind(1) == &TokenKind::RightBracket {
            let suffix_span = self.current_span();
            self.advance();
            self.advance();
            let suffix_span = self.span_from(suffix_span);
            ty = TypeExpr::Generic(GenericType {
                name: Ident::new("List", suffix_span),
                args: vec![ty],
                span: self.span_from(start_span),
            });
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeExpr> {
        let start_span = self.current_span();

        match &self.current_token().kind {
            TokenKind::String(_) | TokenKind::Number(_) | TokenKind::Bool(_) | TokenKind::Minus => {
                let value = self.parse_literal_value()?;
                Ok(TypeExpr::Literal(LiteralType {
                    value,
                    span: self.span_from(start_span),
                }))
            }
            TokenKind::LeftBrace => Ok(TypeExpr::Record(self.parse_record_type()?)),
            TokenKind::LeftParen => {
                self.advance();
                let ty = self.parse_type_expr()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(ty)
            }
            TokenKind::Ident(name) => {
                if let Some(primitive) = Primitive::from_name(name) {
                    self.advance();
                    return Ok(TypeExpr::Basic(BasicType {
                        primitive,
                        span: start_span,
                    }));
                }

                let name = self.expect_ident("type name")?;
                let mut args = Vec::new();
                if self.match_token(&TokenKind::Less) {
                    loop {
                        args.push(self.parse_type_expr()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect_closing_angle()?;
                }

                Ok(TypeExpr::Generic(GenericType {
                    name,
                    args,
                    span: self.span_from(start_span),
                }))
            }
            _ => Err(self.error_expected("type")),
        }
    }

    /// `{ name: T [where refinement], ... }`
    pub(super) fn parse_record_type(&mut self) -> Result<RecordType> {
        let start_span = self.current_span();
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let field_start = self.current_span();
            let name = self.expect_ident("field name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let ty = self.parse_type_expr()?;
            let refinement = if self.check(&TokenKind::Where) {
                Some(self.parse_refinement()?)
            } else {
                None
            };

            fields.push(FieldDecl {
                name,
                ty,
                refinement,
                span: self.span_from(field_start),
            });

            if !self.match_token(&TokenKind::Comma) {
                self.match_token(&TokenKind::Semicolon);
            }
        }

        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(RecordType {
            fields,
            span: self.span_from(start_span),
        })
    }

    /// `where operand [cmp operand]`
    ///
    /// Operands are shift-level expressions; boolean composition is rejected,
    /// also inside parentheses.
    fn parse_refinement(&mut self) -> Result<Refinement> {
        let start_span = self.current_span();
        self.expect(TokenKind::Where, "'where'")?;

        let outer = std::mem::replace(&mut self.restricted, true);
        let predicate = self.parse_refinement_predicate();
        self.restricted = outer;

        Ok(Refinement {
            predicate: predicate?,
            span: self.span_from(start_span),
        })
    }

    fn parse_refinement_predicate(&mut self) -> Result<Expr> {
        let left = self.parse_binary(REFINEMENT_OPERAND_PRECEDENCE)?;

        let predicate = match comparison_op(&self.current_token().kind) {
            Some(op) => {
                self.advance();
                let right = self.parse_binary(REFINEMENT_OPERAND_PRECEDENCE)?;
                let span = left.span().merge(right.span());
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }
            }
            None => left,
        };

        self.reject_compound_refinement()?;
        Ok(predicate)
    }

    /// Parenthesised operand inside a refinement
    pub(super) fn parse_refinement_operand(&mut self) -> Result<Expr> {
        let operand = self.parse_binary(REFINEMENT_OPERAND_PRECEDENCE)?;
        self.reject_compound_refinement()?;
        Ok(operand)
    }

    fn reject_compound_refinement(&self) -> Result<()> {
        if self.current_token().kind.precedence().is_some() {
            return Err(Error::syntax(
                "compound refinement predicates are not supported",
                self.current_span(),
            ));
        }
        Ok(())
    }

    /// Literal value, with an optional leading minus on numbers
    pub(super) fn parse_literal_value(&mut self) -> Result<Literal> {
        let start_span = self.current_span();
        let negative = self.match_token(&TokenKind::Minus);
        let token = self.current_token().clone();

        let value = match &token.kind {
            TokenKind::Number(text) => {
                let literal = parse_number(text, token.span)?;
                match (negative, literal) {
                    (true, Literal::Int(n)) => Literal::Int(-n),
                    (true, Literal::Float(n)) => Literal::Float(-n),
                    (_, literal) => literal,
                }
            }
            TokenKind::String(s) if !negative => Literal::String(s.clone()),
            TokenKind::Bool(b) if !negative => Literal::Bool(*b),
            kind if negative => {
                return Err(Error::unexpected_token(
                    "number",
                    format!("'{}'", kind),
                    token.span.merge(start_span),
                ))
            }
            _ => return Err(self.error_expected("literal")),
        };

        self.advance();
        Ok(value)
    }
}

/// Names with a fixed meaning in type position
fn is_builtin_type_name(name: &str) -> bool {
    Primitive::from_name(name).is_some()
        || matches!(name, "Result" | "Option" | "List" | "Array" | "Map")
}

fn comparison_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqualEqual => Some(BinaryOp::Eq),
        TokenKind::NotEqual => Some(BinaryOp::NotEq),
        TokenKind::Less => Some(BinaryOp::Lt),
        TokenKind::LessEqual => Some(BinaryOp::LtEq),
        TokenKind::Greater => Some(BinaryOp::Gt),
        TokenKind::GreaterEqual => Some(BinaryOp::GtEq),
        _ => None,
    }
}

/// Convert raw number text into an integer or float literal
pub(super) fn parse_number(text: &str, span: Span) -> Result<Literal> {
    if text.contains('.') {
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| Error::invalid_literal(text, span))
    } else {
        text.parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| Error::invalid_literal(text, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_type(source: &str) -> TypeExpr {
        Parser::new(source).parse_type_public().unwrap()
    }

    fn parse_type_err(source: &str) -> Error {
        Parser::new(source).parse_type_public().unwrap_err()
    }

    #[test]
    fn test_primitive_spellings() {
        for (source, expected) in [
            ("Int", Primitive::Int),
            ("int", Primitive::Int),
            ("boolean", Primitive::Bool),
            ("void", Primitive::Unit),
            ("string", Primitive::String),
        ] {
            match parse_type(source) {
                TypeExpr::Basic(basic) => assert_eq!(basic.primitive, expected),
                other => panic!("expected basic type for {}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_literal_union() {
        match parse_type(r#""active" | "inactive""#) {
            TypeExpr::Union(union) => {
                let keys: Vec<String> = union.ctors.iter().map(|c| c.key()).collect();
                assert_eq!(keys, vec!["\"active\"", "\"inactive\""]);
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_named_union_with_leading_pipe_and_records() {
        match parse_type("| Created { id: String } | Deleted { id: String, reason: String } | Ping") {
            TypeExpr::Union(union) => {
                assert_eq!(union.ctors.len(), 3);
                match &union.ctors[1] {
                    Constructor::Named(ctor) => {
                        assert_eq!(ctor.name.name, "Deleted");
                        assert_eq!(ctor.fields.as_ref().map(|f| f.fields.len()), Some(2));
                    }
                    other => panic!("expected named constructor, got {:?}", other),
                }
                assert!(matches!(&union.ctors[2], Constructor::Named(c) if c.fields.is_none()));
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_single_constructor_with_record_is_a_union() {
        match parse_type("Point { x: Int, y: Int }") {
            TypeExpr::Union(union) => assert_eq!(union.ctors.len(), 1),
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_brand_with_refinement() {
        match parse_type(r#"Int brand "Age" where value >= 0"#) {
            TypeExpr::Brand(brand) => {
                assert_eq!(brand.brand, "Age");
                assert!(matches!(*brand.base, TypeExpr::Basic(_)));
                let refinement = brand.refinement.unwrap();
                assert!(matches!(
                    refinement.predicate,
                    Expr::Binary { op: BinaryOp::GtEq, .. }
                ));
            }
            other => panic!("expected brand, got {:?}", other),
        }
    }

    #[test]
    fn test_refinement_operands_allow_arithmetic() {
        match parse_type("{ n: Int where value % 2 == 0 }") {
            TypeExpr::Record(record) => {
                let refinement = record.fields[0].refinement.as_ref().unwrap();
                match &refinement.predicate {
                    Expr::Binary { op, left, .. } => {
                        assert_eq!(*op, BinaryOp::Eq);
                        assert!(matches!(**left, Expr::Binary { op: BinaryOp::Rem, .. }));
                    }
                    other => panic!("expected comparison, got {:?}", other),
                }
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_refinement_is_rejected() {
        for source in [
            r#"Int brand "Age" where value >= 0 && value < 150"#,
            r#"Int brand "Age" where value >= 0 || value < 150"#,
            "{ n: Int where value > 0 & value < 9 }",
            "{ n: Int where 0 < value < 9 }",
            r#"Int brand "Age" where (value >= 0 && value < 150)"#,
            "{ n: Int where (value < 0 || value > 9) }",
            "{ n: Int where ((value > 0) & value < 9) }",
            "{ n: Int where (value) > 0 && (value) < 9 }",
        ] {
            let err = parse_type_err(source);
            assert_eq!(
                err.message(),
                "compound refinement predicates are not supported",
                "source: {}",
                source
            );
        }
    }

    #[test]
    fn test_parenthesised_refinement_operands() {
        match parse_type("{ n: Int where (value + 1) * 2 > 0 }") {
            TypeExpr::Record(record) => {
                let refinement = record.fields[0].refinement.as_ref().unwrap();
                match &refinement.predicate {
                    Expr::Binary { op, left, .. } => {
                        assert_eq!(*op, BinaryOp::Gt);
                        assert!(matches!(**left, Expr::Binary { op: BinaryOp::Mul, .. }));
                    }
                    other => panic!("expected comparison, got {:?}", other),
                }
            }
            other => panic!("expected record, got {:?}", other),
        }

        // Parentheses group operands, never a whole comparison
        let err = parse_type_err("{ n: Int where (value > 0) }");
        assert_eq!(err.message(), "compound refinement predicates are not supported");
    }

    #[test]
    fn test_generics_and_array_suffix() {
        match parse_type("Map<String, Int[]>") {
            TypeExpr::Generic(map) => {
                assert_eq!(map.name.name, "Map");
                assert_eq!(map.args.len(), 2);
                assert!(matches!(&map.args[1], TypeExpr::Generic(list) if list.name.name == "List"));
            }
            other => panic!("expected generic, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_union_alternative() {
        let err = parse_type_err(r#""a" | Int"#);
        assert!(err.message().contains("union alternatives"));
    }

    #[test]
    fn test_negative_literal_type() {
        assert!(matches!(
            parse_type("-1 | 0 | 1"),
            TypeExpr::Union(union) if union.ctors[0].key() == "-1"
        ));
    }
}
