//! Intent Language Parser
//!
//! This crate provides lexical analysis and parsing for the Intent language
//! and defines the AST shared by every downstream stage. Parsing is pure and
//! holds no global state, so independent sources can be parsed concurrently.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

// Re-export core types
pub use ast::*;
pub use error::{ParseError, Result};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, Parser};
pub use span::{HasSpan, Position, Span};
pub use token::{Token, TokenKind};

/// Parse result containing AST and metadata
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub token_count: usize,
    pub parse_time: std::time::Duration,
}

/// Parse source with detailed result information
pub fn parse_with_metadata(source: &str) -> Result<ParseResult> {
    let start_time = std::time::Instant::now();
    let tokens = tokenize(source);
    let token_count = tokens.len();
    let program = Parser::from_tokens(tokens).parse()?;
    let parse_time = start_time.elapsed();

    Ok(ParseResult {
        program,
        token_count,
        parse_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_metadata() {
        let result = parse_with_metadata("func id(x: Int): Int { return x }").unwrap();
        assert_eq!(result.program.items.len(), 1);
        // func id ( x : Int ) : Int { return x } <eof>
        assert_eq!(result.token_count, 14);
    }
}
