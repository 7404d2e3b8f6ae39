//! Lexer for the Intent language
//!
//! Tokenizes source code into a flat stream of tokens. Lexing never fails:
//! characters the lexer does not recognise become single-character
//! [`TokenKind::Punct`] tokens so the parser can report a precise syntax error.

use crate::{
    span::{Position, Span},
    token::{keyword_to_token, operator_to_token, Token, TokenKind},
};

/// Lexical analyzer
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    /// Byte offset of `chars[position]`
    index: u32,
    line: u32,
    column: u32,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            position: 0,
            index: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        tracing::trace!(count = tokens.len(), "tokenized source");
        tokens
    }

    /// Get current character
    fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Peek at next character
    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    /// Advance to next character, keeping line/column/byte bookkeeping in step
    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            self.index += ch.len_utf8() as u32;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column, self.index)
    }

    fn make_span(&self, start: Position) -> Span {
        Span::new(start, self.here())
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.here();

        match self.current_char() {
            None => Token::eof(self.make_span(start)),

            // String literals
            Some('"') => self.read_string(start),

            // Numbers
            Some(ch) if ch.is_ascii_digit() => self.read_number(start),

            // Identifiers and keywords
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.read_identifier(start),

            Some(ch) => self.read_operator(ch, start),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_char() == Some('/') => {
                    self.skip_line_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Longest match first: try the two-character operator before the single one
    fn read_operator(&mut self, ch: char, start: Position) -> Token {
        if let Some(next) = self.peek_char() {
            let pair: String = [ch, next].iter().collect();
            if let Some(kind) = operator_to_token(&pair) {
                self.advance();
                self.advance();
                return Token::new(kind, self.make_span(start));
            }
        }

        self.advance();
        let kind = operator_to_token(ch.encode_utf8(&mut [0; 4])).unwrap_or(TokenKind::Punct(ch));
        Token::new(kind, self.make_span(start))
    }

    fn read_string(&mut self, start: Position) -> Token {
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char() {
            if ch == '"' {
                self.advance(); // Skip closing quote
                return Token::new(TokenKind::String(value), self.make_span(start));
            } else if ch == '\\' {
                self.advance();
                match self.current_char() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(c) => value.push(c),
                    None => break,
                }
                self.advance();
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(TokenKind::UnterminatedString(value), self.make_span(start))
    }

    fn read_number(&mut self, start: Position) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        // A fractional part needs a digit after the dot, so `1.length` stays member access
        if self.current_char() == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            value.push('.');
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    value.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Token::new(TokenKind::Number(value), self.make_span(start))
    }

    fn read_identifier(&mut self, start: Position) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let span = self.make_span(start);

        if value == "_" {
            return Token::new(TokenKind::Underscore, span);
        }

        // Check if it's a keyword
        match keyword_to_token(&value) {
            Some(keyword) => Token::new(keyword, span),
            None => Token::new(TokenKind::Ident(value), span),
        }
    }
}

/// Tokenize a complete source text
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
