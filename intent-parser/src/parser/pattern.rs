//! Match patterns

use super::Parser;
use crate::{ast::*, error::Result, token::TokenKind};

impl Parser {
    /// Parse a case pattern
    pub(super) fn parse_pattern(&mut self) -> Result<Pattern> {
        let start_span = self.current_span();

        match &self.current_token().kind {
            TokenKind::Underscore => {
                self.advance();
                Ok(Pattern::Wildcard { span: start_span })
            }

            TokenKind::String(_) | TokenKind::Number(_) | TokenKind::Bool(_) | TokenKind::Minus => {
                let value = self.parse_literal_value()?;
                Ok(Pattern::Literal {
                    value,
                    span: self.span_from(start_span),
                })
            }

            // Built-in constructors are keywords; their tag is the keyword text
            TokenKind::Ok | TokenKind::Err | TokenKind::Some | TokenKind::None => {
                let tag = Ident::new(self.current_token().kind.to_string(), start_span);
                self.advance();
                let payload = if self.check(&TokenKind::LeftParen) {
                    self.parse_payload_binding()?
                } else {
                    None
                };
                Ok(Pattern::Variant {
                    tag,
                    payload,
                    bindings: None,
                    span: self.span_from(start_span),
                })
            }

            TokenKind::Ident(_) => {
                let tag = self.expect_ident("constructor name")?;

                let mut payload = None;
                let mut bindings = None;
                if self.check(&TokenKind::LeftBrace) {
                    bindings = Some(self.parse_field_bindings()?);
                } else if self.check(&TokenKind::LeftParen) {
                    payload = self.parse_payload_binding()?;
                }

                Ok(Pattern::Variant {
                    tag,
                    payload,
                    bindings,
                    span: self.span_from(start_span),
                })
            }

            _ => Err(self.error_expected("pattern")),
        }
    }

    /// `(name)` or `(_)`; the wildcard binds nothing
    fn parse_payload_binding(&mut self) -> Result<Option<Ident>> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let binding = if self.match_token(&TokenKind::Underscore) {
            None
        } else {
            Some(self.expect_ident("binding name")?)
        };
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(binding)
    }

    /// `{ field, field: alias, ... }`
    fn parse_field_bindings(&mut self) -> Result<Vec<FieldBinding>> {
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut bindings = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let start_span = self.current_span();
            let field = self.expect_ident("field name")?;
            let alias = if self.match_token(&TokenKind::Colon) {
                Some(self.expect_ident("binding name")?)
            } else {
                None
            };

            bindings.push(FieldBinding {
                field,
                alias,
                span: self.span_from(start_span),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBrace, "'}'")?;
        Ok(bindings)
    }
}
