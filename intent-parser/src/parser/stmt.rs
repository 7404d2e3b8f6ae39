//! Blocks and statements. Semicolons are optional terminators.

use super::Parser;
use crate::{
    ast::*,
    error::Result,
    span::HasSpan,
    token::TokenKind,
};

impl Parser {
    /// Parse block
    pub(super) fn parse_block(&mut self) -> Result<Block> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> Result<Block> {
        let start_span = self.current_span();
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        self.expect(TokenKind::RightBrace, "'}'")?;

        Ok(Block {
            stmts,
            span: self.span_from(start_span),
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let stmt = match &self.current_token().kind {
            TokenKind::Let | TokenKind::Const => Stmt::Let(self.parse_let()?),
            TokenKind::Return => Stmt::Return(self.parse_return()?),
            TokenKind::If => Stmt::If(self.parse_if()?),
            TokenKind::Match => Stmt::Match(self.parse_match(false)?),
            TokenKind::For => Stmt::For(self.parse_for()?),
            TokenKind::While => Stmt::While(self.parse_while()?),
            TokenKind::Try => Stmt::Try(self.parse_try()?),
            _ => self.parse_expression_statement()?,
        };

        self.match_token(&TokenKind::Semicolon);
        Ok(stmt)
    }

    fn parse_let(&mut self) -> Result<LetStmt> {
        let start_span = self.current_span();
        let kind = if self.match_token(&TokenKind::Const) {
            BindingKind::Const
        } else {
            self.expect(TokenKind::Let, "'let'")?;
            BindingKind::Let
        };

        let name = self.expect_ident("binding name")?;
        let ty = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Equal, "'='")?;
        let value = self.parse_expression()?;

        Ok(LetStmt {
            kind,
            name,
            ty,
            value,
            span: self.span_from(start_span),
        })
    }

    fn parse_return(&mut self) -> Result<ReturnStmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::Return, "'return'")?;

        let value = if self.check(&TokenKind::RightBrace)
            || self.check(&TokenKind::Semicolon)
            || self.is_at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        Ok(ReturnStmt {
            value,
            span: self.span_from(start_span),
        })
    }

    fn parse_condition(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<IfStmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::If, "'if'")?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::If(Box::new(self.nested(Self::parse_if)?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then_block,
            else_branch,
            span: self.span_from(start_span),
        })
    }

    /// `for (x in items) { ... }`
    fn parse_for(&mut self) -> Result<ForStmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::For, "'for'")?;
        self.expect(TokenKind::LeftParen, "'('")?;
        let binding = self.expect_ident("loop variable")?;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        let body = self.parse_block()?;

        Ok(ForStmt {
            binding,
            iterable,
            body,
            span: self.span_from(start_span),
        })
    }

    fn parse_while(&mut self) -> Result<WhileStmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::While, "'while'")?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;

        Ok(WhileStmt {
            condition,
            body,
            span: self.span_from(start_span),
        })
    }

    /// `try { ... } catch [(e)] { ... }`
    fn parse_try(&mut self) -> Result<TryStmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::Try, "'try'")?;
        let body = self.parse_block()?;
        self.expect(TokenKind::Catch, "'catch'")?;

        let catch_binding = if self.match_token(&TokenKind::LeftParen) {
            let binding = self.expect_ident("error binding")?;
            self.expect(TokenKind::RightParen, "')'")?;
            Some(binding)
        } else {
            None
        };
        let handler = self.parse_block()?;

        Ok(TryStmt {
            body,
            catch_binding,
            handler,
            span: self.span_from(start_span),
        })
    }

    /// Assignments and `++`/`--` at statement level get their own statement kinds
    fn parse_expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.parse_expression()?;
        let span = expr.span();

        Ok(match expr {
            Expr::Assign { op, target, value, span } => Stmt::Assign(AssignStmt {
                target: *target,
                op,
                value: *value,
                span,
            }),
            Expr::Update { op, prefix, target, span } => Stmt::Update(UpdateStmt {
                target: *target,
                op,
                prefix,
                span,
            }),
            expr => Stmt::Expr(ExprStmt { expr, span }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(source: &str) -> Vec<Stmt> {
        let mut parser = Parser::new(source);
        parser.parse_block().unwrap().stmts
    }

    #[test]
    fn test_optional_semicolons() {
        let stmts = parse_body("{ let a = 1; const b: Int = 2 let c = a + b; }");
        assert_eq!(stmts.len(), 3);
        assert!(matches!(&stmts[1], Stmt::Let(l) if l.kind == BindingKind::Const && l.ty.is_some()));
    }

    #[test]
    fn test_assignment_and_update_statements() {
        let stmts = parse_body("{ x = 1; total += x; i++; --j; f(x) }");
        assert!(matches!(&stmts[0], Stmt::Assign(a) if a.op == AssignOp::Assign));
        assert!(matches!(&stmts[1], Stmt::Assign(a) if a.op == AssignOp::Compound(BinaryOp::Add)));
        assert!(matches!(&stmts[2], Stmt::Update(u) if !u.prefix && u.op == UpdateOp::Increment));
        assert!(matches!(&stmts[3], Stmt::Update(u) if u.prefix && u.op == UpdateOp::Decrement));
        assert!(matches!(&stmts[4], Stmt::Expr(_)));
    }

    #[test]
    fn test_if_else_if_chain() {
        let stmts = parse_body("{ if (a) { return 1 } else if (b) { return 2 } else { return } }");
        match &stmts[0] {
            Stmt::If(stmt) => match &stmt.else_branch {
                Some(ElseBranch::If(inner)) => {
                    assert!(matches!(inner.else_branch, Some(ElseBranch::Block(_))));
                }
                other => panic!("expected else-if, got {:?}", other),
            },
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_loops_and_try() {
        let stmts = parse_body(
            "{ for (item in items) { total += item } while (n > 0) { n-- } try { risky() } catch (e) { log(e) } }",
        );
        assert!(matches!(&stmts[0], Stmt::For(f) if f.binding.name == "item"));
        assert!(matches!(&stmts[1], Stmt::While(_)));
        assert!(matches!(&stmts[2], Stmt::Try(t) if t.catch_binding.is_some()));
    }

    #[test]
    fn test_match_statement_allows_block_bodies() {
        let stmts = parse_body("{ match (e) { case Created { id } => { log(id) } case _ => {} } }");
        match &stmts[0] {
            Stmt::Match(m) => {
                assert!(matches!(m.cases[0].body, CaseBody::Block(_)));
                assert!(matches!(m.cases[1].body, CaseBody::Block(_)));
            }
            other => panic!("expected match statement, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let stmts = parse_body("{ return; }");
        assert!(matches!(&stmts[0], Stmt::Return(r) if r.value.is_none()));
    }
}
