//! Parser for the Intent language
//!
//! Hand-written recursive descent parser with precedence climbing for
//! expressions. It produces immutable AST nodes bottom-up and assembles the
//! [`Program`] once at the end; the first structural violation aborts the
//! parse.

mod expr;
mod pattern;
mod stmt;
mod types;

use crate::{
    ast::*,
    error::{ParseError as Error, Result},
    lexer::tokenize,
    span::{Position, Span},
    token::{Token, TokenKind},
};

/// Deepest nesting of expressions, blocks and types the parser accepts
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Current nesting of expressions, blocks and types
    depth: usize,
    /// Inside a `where` refinement; parentheses group operands only
    restricted: bool,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(input: &str) -> Self {
        Self::from_tokens(tokenize(input))
    }

    /// Create a parser over an existing token stream
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token::eof(Span::new(end, end)));
        }
        Parser {
            tokens,
            current: 0,
            depth: 0,
            restricted: false,
        }
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> Result<Program> {
        self.parse_program()
    }

    /// Parse a single expression (public for testing)
    pub fn parse_expression_public(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse a single type expression (public for testing)
    pub fn parse_type_public(&mut self) -> Result<TypeExpr> {
        let ty = self.parse_type_definition()?;
        self.expect_end()?;
        Ok(ty)
    }

    fn expect_end(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error_expected("end of input"))
        }
    }

    // -----------------------------------------------------------------
    // Program and sections
    // -----------------------------------------------------------------

    fn parse_program(&mut self) -> Result<Program> {
        let start_span = self.current_span();

        let intent = if self.check(&TokenKind::Intent) {
            Some(self.parse_intent_section()?)
        } else {
            None
        };

        let uses = if self.check(&TokenKind::Uses) {
            Some(self.parse_uses_section()?)
        } else {
            None
        };

        let types = if self.check(&TokenKind::Types) {
            Some(self.parse_types_section()?)
        } else {
            None
        };

        let mut items = Vec::new();
        while !self.is_at_end() {
            items.push(self.parse_item()?);
        }

        let span = if self.current == 0 {
            start_span
        } else {
            self.span_from(start_span)
        };

        tracing::debug!(items = items.len(), "parsed program");

        Ok(Program {
            intent,
            uses,
            types,
            items,
            span,
        })
    }

    /// `intent "description" [tags ["a", "b"]]`
    fn parse_intent_section(&mut self) -> Result<IntentSection> {
        let start_span = self.current_span();
        self.expect(TokenKind::Intent, "'intent'")?;
        let description = self.expect_string("intent description")?;

        let mut tags = Vec::new();
        if self.check_ident("tags") {
            self.advance();
            self.expect(TokenKind::LeftBracket, "'['")?;
            while !self.check(&TokenKind::RightBracket) {
                tags.push(self.expect_string("tag string")?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightBracket, "']'")?;
        }

        Ok(IntentSection {
            description,
            tags,
            span: self.span_from(start_span),
        })
    }

    /// `uses { name: Capability { key: literal }, ... }`
    fn parse_uses_section(&mut self) -> Result<UsesSection> {
        let start_span = self.current_span();
        self.expect(TokenKind::Uses, "'uses'")?;
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut decls = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            decls.push(self.parse_use_decl()?);
            if !self.match_token(&TokenKind::Comma) {
                self.match_token(&TokenKind::Semicolon);
            }
        }
        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(UsesSection {
            decls,
            span: self.span_from(start_span),
        })
    }

    fn parse_use_decl(&mut self) -> Result<UseDecl> {
        let start_span = self.current_span();
        let name = self.expect_ident("capability name")?;
        self.expect(TokenKind::Colon, "':'")?;
        let capability = self.expect_ident("capability type")?;

        let mut config = Vec::new();
        if self.match_token(&TokenKind::LeftBrace) {
            while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
                let entry_start = self.current_span();
                let key = self.expect_ident("configuration key")?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_config_value()?;
                config.push(ConfigEntry {
                    key,
                    value,
                    span: self.span_from(entry_start),
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightBrace, "'}'")?;
        }

        Ok(UseDecl {
            name,
            capability,
            config,
            span: self.span_from(start_span),
        })
    }

    fn parse_config_value(&mut self) -> Result<ConfigValue> {
        let negative = self.match_token(&TokenKind::Minus);
        let token = self.current_token().clone();
        let value = match token.kind {
            TokenKind::Number(text) => {
                let number: f64 = text
                    .parse()
                    .map_err(|_| Error::invalid_literal(text.as_str(), token.span))?;
                ConfigValue::Number(if negative { -number } else { number })
            }
            TokenKind::String(s) if !negative => ConfigValue::String(s),
            TokenKind::Bool(b) if !negative => ConfigValue::Bool(b),
            _ => return Err(self.error_expected("string, number or boolean literal")),
        };
        self.advance();
        Ok(value)
    }

    /// `types { type Name = T; ... }`
    fn parse_types_section(&mut self) -> Result<TypesSection> {
        let start_span = self.current_span();
        self.expect(TokenKind::Types, "'types'")?;
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut decls = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            decls.push(self.parse_type_decl()?);
        }
        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(TypesSection {
            decls,
            span: self.span_from(start_span),
        })
    }

    fn parse_type_decl(&mut self) -> Result<TypeDecl> {
        let start_span = self.current_span();
        self.expect(TokenKind::Type, "'type'")?;
        let name = self.expect_ident("type name")?;
        self.expect(TokenKind::Equal, "'='")?;
        let ty = self.parse_type_definition()?;
        self.match_token(&TokenKind::Semicolon);

        Ok(TypeDecl {
            name,
            ty,
            span: self.span_from(start_span),
        })
    }

    // -----------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------

    fn parse_item(&mut self) -> Result<Item> {
        match &self.current_token().kind {
            TokenKind::Func => Ok(Item::Func(self.parse_func()?)),
            TokenKind::Effect => Ok(Item::Effect(self.parse_effect()?)),
            TokenKind::Test => Ok(Item::Test(self.parse_test()?)),
            _ => Err(self.error_expected("'func', 'effect' or 'test'")),
        }
    }

    fn parse_func(&mut self) -> Result<FuncDecl> {
        let start_span = self.current_span();
        self.expect(TokenKind::Func, "'func'")?;
        let name = self.expect_ident("function name")?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let contract = self.parse_contract()?;
        let body = self.parse_block()?;

        Ok(FuncDecl {
            name,
            params,
            return_type,
            contract,
            body,
            span: self.span_from(start_span),
        })
    }

    fn parse_effect(&mut self) -> Result<EffectDecl> {
        let start_span = self.current_span();
        self.expect(TokenKind::Effect, "'effect'")?;
        let name = self.expect_ident("effect name")?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;

        let mut uses = Vec::new();
        if self.match_token(&TokenKind::Uses) {
            loop {
                uses.push(self.expect_ident("capability name")?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let contract = self.parse_contract()?;
        let body = self.parse_block()?;

        Ok(EffectDecl {
            name,
            params,
            return_type,
            uses,
            contract,
            body,
            span: self.span_from(start_span),
        })
    }

    fn parse_test(&mut self) -> Result<TestDecl> {
        let start_span = self.current_span();
        self.expect(TokenKind::Test, "'test'")?;

        let name = match &self.current_token().kind {
            TokenKind::String(s) => s.clone(),
            TokenKind::Ident(s) => s.clone(),
            _ => return Err(self.error_expected("test name")),
        };
        self.advance();

        let body = self.parse_block()?;

        Ok(TestDecl {
            name,
            body,
            span: self.span_from(start_span),
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.expect(TokenKind::LeftParen, "'('")?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RightParen) && !self.is_at_end() {
            let start_span = self.current_span();
            let name = self.expect_ident("parameter name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let ty = self.parse_type_expr()?;
            params.push(Param {
                name,
                ty,
                span: self.span_from(start_span),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightParen, "')'")?;
        Ok(params)
    }

    fn parse_return_type(&mut self) -> Result<Option<TypeExpr>> {
        if self.match_token(&TokenKind::Colon) {
            Ok(Some(self.parse_type_expr()?))
        } else {
            Ok(None)
        }
    }

    /// `requires` and `ensures`, each at most once, in either order
    fn parse_contract(&mut self) -> Result<Contract> {
        let mut contract = Contract::default();

        loop {
            if self.check(&TokenKind::Requires) {
                if contract.requires.is_some() {
                    return Err(Error::syntax("duplicate 'requires' clause", self.current_span()));
                }
                self.advance();
                contract.requires = Some(self.parse_expression()?);
            } else if self.check(&TokenKind::Ensures) {
                if contract.ensures.is_some() {
                    return Err(Error::syntax("duplicate 'ensures' clause", self.current_span()));
                }
                self.advance();
                contract.ensures = Some(self.parse_expression()?);
            } else {
                break;
            }
        }

        Ok(contract)
    }

    // -----------------------------------------------------------------
    // Helper methods
    // -----------------------------------------------------------------

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.depth;
        let result = self.descend().and_then(|()| parse(self));
        self.depth = saved;
        result
    }

    /// Count one more nesting level; left-deep chains call this per link
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(Error::syntax("expression nesting too deep", self.current_span()));
        }
        Ok(())
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Kind of the token `offset` positions ahead; sticks at `Eof`
    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn current_span(&self) -> Span {
        self.current_token().span
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous().span)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token().kind, TokenKind::Eof)
    }

    fn check(&self, token_kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current_token().kind) == std::mem::discriminant(token_kind)
    }

    fn check_ident(&self, name: &str) -> bool {
        matches!(&self.current_token().kind, TokenKind::Ident(n) if n == name)
    }

    fn match_token(&mut self, token_kind: &TokenKind) -> bool {
        if self.check(token_kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_kind: TokenKind, expected: &str) -> Result<Token> {
        if self.check(&token_kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error_expected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<Ident> {
        match &self.current_token().kind {
            TokenKind::Ident(name) => {
                let ident = Ident::new(name.clone(), self.current_span());
                self.advance();
                Ok(ident)
            }
            _ => Err(self.error_expected(expected)),
        }
    }

    fn expect_string(&mut self, expected: &str) -> Result<String> {
        match &self.current_token().kind {
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.error_expected(expected)),
        }
    }

    /// Consume a closing `>` of a type argument list, splitting `>>` if needed
    fn expect_closing_angle(&mut self) -> Result<()> {
        match &self.current_token().kind {
            TokenKind::Greater => {
                self.advance();
                Ok(())
            }
            TokenKind::ShiftRight => {
                let span = self.current_span();
                let rest = Position::new(span.start.line, span.start.column + 1, span.start.index + 1);
                self.tokens[self.current] = Token::new(TokenKind::Greater, Span::new(rest, span.end));
                Ok(())
            }
            _ => Err(self.error_expected("'>'")),
        }
    }

    /// Build the error for "expected X here", distinguishing end of input
    fn error_expected(&self, expected: &str) -> Error {
        let token = self.current_token();
        match &token.kind {
            TokenKind::Eof => Error::unexpected_eof(expected, token.span),
            TokenKind::UnterminatedString(_) => {
                Error::syntax("unterminated string literal", token.span)
            }
            TokenKind::Punct(ch) => Error::syntax(format!("unexpected character '{}'", ch), token.span),
            kind => Error::unexpected_token(expected, format!("'{}'", kind), token.span),
        }
    }
}

/// Parse a complete source text into a [`Program`]
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source).parse()
}
