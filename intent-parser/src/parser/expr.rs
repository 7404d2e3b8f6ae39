//! Expression parsing: assignment, conditional, precedence climbing for
//! binary operators, unary/postfix operators and primaries

use super::{types::parse_number, Parser};
use crate::{
    ast::*,
    error::{ParseError as Error, Result},
    span::HasSpan,
    token::TokenKind,
};

impl Parser {
    /// Parse expression
    pub(super) fn parse_expression(&mut self) -> Result<Expr> {
        self.nested(Self::parse_assignment)
    }

    /// Right-associative; any expression is accepted as target and validated later
    fn parse_assignment(&mut self) -> Result<Expr> {
        let target = self.parse_conditional()?;

        let op = match &self.current_token().kind {
            TokenKind::Equal => AssignOp::Assign,
            TokenKind::PlusEqual => AssignOp::Compound(BinaryOp::Add),
            TokenKind::MinusEqual => AssignOp::Compound(BinaryOp::Sub),
            TokenKind::StarEqual => AssignOp::Compound(BinaryOp::Mul),
            TokenKind::SlashEqual => AssignOp::Compound(BinaryOp::Div),
            TokenKind::PercentEqual => AssignOp::Compound(BinaryOp::Rem),
            _ => return Ok(target),
        };
        self.advance();

        let value = self.nested(Self::parse_assignment)?;
        let span = target.span().merge(value.span());

        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            span,
        })
    }

    /// `cond ? a : b`
    fn parse_conditional(&mut self) -> Result<Expr> {
        let condition = self.parse_binary(1)?;

        if !self.match_token(&TokenKind::Question) {
            return Ok(condition);
        }

        let then_branch = self.parse_assignment()?;
        self.expect(TokenKind::Colon, "':'")?;
        let else_branch = self.nested(Self::parse_conditional)?;
        let span = condition.span().merge(else_branch.span());

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span,
        })
    }

    /// Parse binary expression with precedence climbing
    pub(super) fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let saved = self.depth;
        let mut left = self.parse_unary()?;

        while let Some(precedence) = self.current_token().kind.precedence() {
            if precedence < min_precedence {
                break;
            }

            let op = match binary_op(&self.current_token().kind) {
                Some(op) => op,
                None => break,
            };
            self.advance();
            self.descend()?;

            let right = self.parse_binary(precedence + 1)?;
            let span = left.span().merge(right.span());

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        self.depth = saved;
        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> Result<Expr> {
        let start_span = self.current_span();

        let unary = match &self.current_token().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = unary {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span: self.span_from(start_span),
            });
        }

        let update = match &self.current_token().kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let target = self.nested(Self::parse_unary)?;
            return Ok(Expr::Update {
                op,
                prefix: true,
                target: Box::new(target),
                span: self.span_from(start_span),
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix expression (call, member, index, `++`/`--`)
    fn parse_postfix(&mut self) -> Result<Expr> {
        let start_span = self.current_span();
        let saved = self.depth;
        let mut expr = self.parse_primary()?;

        loop {
            if matches!(
                self.current_token().kind,
                TokenKind::LeftParen
                    | TokenKind::Dot
                    | TokenKind::LeftBracket
                    | TokenKind::PlusPlus
                    | TokenKind::MinusMinus
            ) {
                self.descend()?;
            }

            match &self.current_token().kind {
                TokenKind::LeftParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span: self.span_from(start_span),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_ident("property name")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        span: self.span_from(start_span),
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RightBracket, "']'")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        span: self.span_from(start_span),
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(&TokenKind::PlusPlus) {
                        UpdateOp::Increment
                    } else {
                        UpdateOp::Decrement
                    };
                    self.advance();
                    expr = Expr::Update {
                        op,
                        prefix: false,
                        target: Box::new(expr),
                        span: self.span_from(start_span),
                    };
                }
                _ => break,
            }
        }

        self.depth = saved;
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokenKind::LeftParen, "'('")?;

        let mut args = Vec::new();
        while !self.check(&TokenKind::RightParen) && !self.is_at_end() {
            args.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightParen, "')'")?;
        Ok(args)
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expr> {
        let start_span = self.current_span();

        match &self.current_token().kind {
            TokenKind::Number(text) => {
                let value = parse_number(text, start_span)?;
                self.advance();
                Ok(Expr::Literal {
                    value,
                    span: start_span,
                })
            }
            TokenKind::String(s) => {
                let value = Literal::String(s.clone());
                self.advance();
                Ok(Expr::Literal {
                    value,
                    span: start_span,
                })
            }
            TokenKind::Bool(b) => {
                let value = Literal::Bool(*b);
                self.advance();
                Ok(Expr::Literal {
                    value,
                    span: start_span,
                })
            }

            TokenKind::Ident(name) => {
                let starts_upper = name.chars().next().is_some_and(char::is_uppercase);
                let ident = self.expect_ident("identifier")?;

                if starts_upper && self.check(&TokenKind::LeftBrace) {
                    let fields = self.parse_object_fields()?;
                    return Ok(Expr::Variant {
                        tag: ident,
                        fields,
                        span: self.span_from(start_span),
                    });
                }

                Ok(Expr::Ident(ident))
            }

            TokenKind::LeftParen => {
                self.advance();
                let expr = if self.restricted {
                    self.nested(Self::parse_refinement_operand)?
                } else {
                    self.parse_expression()?
                };
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }

            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RightBracket) && !self.is_at_end() {
                    elements.push(self.parse_expression()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RightBracket, "']'")?;
                Ok(Expr::Array {
                    elements,
                    span: self.span_from(start_span),
                })
            }

            TokenKind::LeftBrace => {
                let fields = self.parse_object_fields()?;
                Ok(Expr::Object {
                    fields,
                    span: self.span_from(start_span),
                })
            }

            TokenKind::Hash => self.parse_map_literal(),

            TokenKind::Ok | TokenKind::Err | TokenKind::Some => {
                let kind = self.current_token().kind.clone();
                self.advance();
                self.expect(TokenKind::LeftParen, "'('")?;
                let value = Box::new(self.parse_expression()?);
                self.expect(TokenKind::RightParen, "')'")?;
                let span = self.span_from(start_span);
                Ok(match kind {
                    TokenKind::Ok => Expr::Ok { value, span },
                    TokenKind::Err => Expr::Err { value, span },
                    _ => Expr::Some { value, span },
                })
            }

            TokenKind::None => {
                self.advance();
                Ok(Expr::None { span: start_span })
            }

            TokenKind::Brand => {
                self.advance();
                self.expect(TokenKind::Less, "'<'")?;
                let brand = self.expect_ident("brand type name")?;
                self.expect_closing_angle()?;
                self.expect(TokenKind::LeftParen, "'('")?;
                let value = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(Expr::BrandCast {
                    brand,
                    value: Box::new(value),
                    span: self.span_from(start_span),
                })
            }

            TokenKind::Match => Ok(Expr::Match(self.parse_match(true)?)),

            TokenKind::Fn => self.parse_lambda(),

            _ => Err(self.error_expected("expression")),
        }
    }

    /// `{ name: expr, ... }` shared by object literals and variant construction
    fn parse_object_fields(&mut self) -> Result<Vec<ObjectField>> {
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let field_start = self.current_span();
            let name = match &self.current_token().kind {
                TokenKind::String(s) => {
                    let ident = Ident::new(s.clone(), field_start);
                    self.advance();
                    ident
                }
                _ => self.expect_ident("field name")?,
            };
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expression()?;

            fields.push(ObjectField {
                name,
                value,
                span: self.span_from(field_start),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBrace, "'}'")?;
        Ok(fields)
    }

    /// `#{ key: value, ... }`
    fn parse_map_literal(&mut self) -> Result<Expr> {
        let start_span = self.current_span();
        self.expect(TokenKind::Hash, "'#'")?;
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut entries = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let entry_start = self.current_span();
            let key = self.parse_expression()?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expression()?;

            entries.push(MapEntry {
                key,
                value,
                span: self.span_from(entry_start),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(Expr::Map {
            entries,
            span: self.span_from(start_span),
        })
    }

    /// `fn (x: T, y) => expr` or `fn (x) { ... }`
    fn parse_lambda(&mut self) -> Result<Expr> {
        let start_span = self.current_span();
        self.expect(TokenKind::Fn, "'fn'")?;
        self.expect(TokenKind::LeftParen, "'('")?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RightParen) && !self.is_at_end() {
            let param_start = self.current_span();
            let name = self.expect_ident("parameter name")?;
            let ty = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type_expr()?)
            } else {
                None
            };
            params.push(LambdaParam {
                name,
                ty,
                span: self.span_from(param_start),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;

        let body = if self.match_token(&TokenKind::FatArrow) {
            LambdaBody::Expr(Box::new(self.parse_expression()?))
        } else if self.check(&TokenKind::LeftBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            return Err(self.error_expected("'=>' or '{'"));
        };

        Ok(Expr::Lambda {
            params,
            body,
            span: self.span_from(start_span),
        })
    }

    /// `match (subject) { case P [if guard] => body ... }`
    ///
    /// In expression position case bodies must be expressions; a `{` that
    /// does not open an object literal is rejected.
    pub(super) fn parse_match(&mut self, in_expression: bool) -> Result<MatchExpr> {
        let start_span = self.current_span();
        self.expect(TokenKind::Match, "'match'")?;
        self.expect(TokenKind::LeftParen, "'('")?;
        let subject = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut cases = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let case_start = self.current_span();
            self.expect(TokenKind::Case, "'case'")?;
            let pattern = self.parse_pattern()?;
            let guard = if self.match_token(&TokenKind::If) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.expect(TokenKind::FatArrow, "'=>'")?;

            let body = if self.check(&TokenKind::LeftBrace) {
                if in_expression {
                    if !self.looks_like_object_literal() {
                        return Err(Error::syntax(
                            "block bodies are not allowed in match expressions",
                            self.current_span(),
                        ));
                    }
                    CaseBody::Expr(self.parse_expression()?)
                } else if self.looks_like_object_field() {
                    CaseBody::Expr(self.parse_expression()?)
                } else {
                    CaseBody::Block(self.parse_block()?)
                }
            } else {
                CaseBody::Expr(self.parse_expression()?)
            };

            if !self.match_token(&TokenKind::Semicolon) {
                self.match_token(&TokenKind::Comma);
            }

            cases.push(MatchCase {
                pattern,
                guard,
                body,
                span: self.span_from(case_start),
            });
        }

        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(MatchExpr {
            subject: Box::new(subject),
            cases,
            span: self.span_from(start_span),
        })
    }

    /// `{}` or `{ name: ...`
    fn looks_like_object_literal(&self) -> bool {
        self.peek_kind(1) == &TokenKind::RightBrace || self.looks_like_object_field()
    }

    fn looks_like_object_field(&self) -> bool {
        matches!(self.peek_kind(1), TokenKind::Ident(_) | TokenKind::String(_))
            && self.peek_kind(2) == &TokenKind::Colon
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Rem),
        TokenKind::EqualEqual => Some(BinaryOp::Eq),
        TokenKind::NotEqual => Some(BinaryOp::NotEq),
        TokenKind::Less => Some(BinaryOp::Lt),
        TokenKind::LessEqual => Some(BinaryOp::LtEq),
        TokenKind::Greater => Some(BinaryOp::Gt),
        TokenKind::GreaterEqual => Some(BinaryOp::GtEq),
        TokenKind::AndAnd => Some(BinaryOp::And),
        TokenKind::OrOr => Some(BinaryOp::Or),
        TokenKind::Ampersand => Some(BinaryOp::BitAnd),
        TokenKind::Pipe => Some(BinaryOp::BitOr),
        TokenKind::Caret => Some(BinaryOp::BitXor),
        TokenKind::ShiftLeft => Some(BinaryOp::Shl),
        TokenKind::ShiftRight => Some(BinaryOp::Shr),
        _ => None,
    }
}
