//! Token definitions for lexical analysis

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token types in the Intent language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    Number(String), // Raw number text, converted by the parser
    String(String),
    Bool(bool),
    /// A string literal that reached end of input before its closing quote
    UnterminatedString(String),

    // Identifiers
    Ident(String),

    // Section keywords
    Intent,
    Uses,
    Types,

    // Declaration keywords
    Type,
    Func,
    Effect,
    Test,
    Requires,
    Ensures,
    Brand,
    Where,

    // Statement keywords
    Let,
    Const,
    Return,
    If,
    Else,
    Match,
    Case,
    For,
    In,
    While,
    Try,
    Catch,
    Fn,

    // Built-in constructors
    Ok,
    Err,
    Some,
    None,

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    Equal,        // =
    EqualEqual,   // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    AndAnd,       // &&
    OrOr,         // ||
    Bang,         // !
    Ampersand,    // &
    Pipe,         // |
    Caret,        // ^
    ShiftLeft,    // <<
    ShiftRight,   // >>
    PlusEqual,    // +=
    MinusEqual,   // -=
    StarEqual,    // *=
    SlashEqual,   // /=
    PercentEqual, // %=
    PlusPlus,     // ++
    MinusMinus,   // --
    FatArrow,     // =>
    Question,     // ?

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]

    // Punctuation
    Comma,      // ,
    Semicolon,  // ;
    Colon,      // :
    Dot,        // .
    Hash,       // #
    Underscore, // _

    /// Any character the lexer does not recognise
    Punct(char),

    // End of file
    Eof,
}

impl TokenKind {
    /// Returns true if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Intent
                | TokenKind::Uses
                | TokenKind::Types
                | TokenKind::Type
                | TokenKind::Func
                | TokenKind::Effect
                | TokenKind::Test
                | TokenKind::Requires
                | TokenKind::Ensures
                | TokenKind::Brand
                | TokenKind::Where
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Match
                | TokenKind::Case
                | TokenKind::For
                | TokenKind::In
                | TokenKind::While
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Fn
                | TokenKind::Ok
                | TokenKind::Err
                | TokenKind::Some
                | TokenKind::None
        )
    }

    /// Returns true if this token is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, TokenKind::Number(_) | TokenKind::String(_) | TokenKind::Bool(_))
    }

    /// Returns true for the compound assignment family (`+=`, `-=`, ...)
    pub fn is_compound_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
        )
    }

    /// Get the binary precedence of this operator token (higher number = binds tighter)
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::OrOr => Some(1),
            TokenKind::AndAnd => Some(2),
            TokenKind::Pipe => Some(3),
            TokenKind::Caret => Some(4),
            TokenKind::Ampersand => Some(5),
            TokenKind::EqualEqual | TokenKind::NotEqual => Some(6),
            TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual => {
                Some(7)
            }
            TokenKind::ShiftLeft | TokenKind::ShiftRight => Some(8),
            TokenKind::Plus | TokenKind::Minus => Some(9),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(10),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Bool(b) => write!(f, "{}", b),
            TokenKind::UnterminatedString(s) => write!(f, "\"{}", s),
            TokenKind::Ident(name) => write!(f, "{}", name),

            TokenKind::Intent => write!(f, "intent"),
            TokenKind::Uses => write!(f, "uses"),
            TokenKind::Types => write!(f, "types"),
            TokenKind::Type => write!(f, "type"),
            TokenKind::Func => write!(f, "func"),
            TokenKind::Effect => write!(f, "effect"),
            TokenKind::Test => write!(f, "test"),
            TokenKind::Requires => write!(f, "requires"),
            TokenKind::Ensures => write!(f, "ensures"),
            TokenKind::Brand => write!(f, "brand"),
            TokenKind::Where => write!(f, "where"),
            TokenKind::Let => write!(f, "let"),
            TokenKind::Const => write!(f, "const"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::Match => write!(f, "match"),
            TokenKind::Case => write!(f, "case"),
            TokenKind::For => write!(f, "for"),
            TokenKind::In => write!(f, "in"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Try => write!(f, "try"),
            TokenKind::Catch => write!(f, "catch"),
            TokenKind::Fn => write!(f, "fn"),
            TokenKind::Ok => write!(f, "Ok"),
            TokenKind::Err => write!(f, "Err"),
            TokenKind::Some => write!(f, "Some"),
            TokenKind::None => write!(f, "None"),

            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::AndAnd => write!(f, "&&"),
            TokenKind::OrOr => write!(f, "||"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Ampersand => write!(f, "&"),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::ShiftLeft => write!(f, "<<"),
            TokenKind::ShiftRight => write!(f, ">>"),
            TokenKind::PlusEqual => write!(f, "+="),
            TokenKind::MinusEqual => write!(f, "-="),
            TokenKind::StarEqual => write!(f, "*="),
            TokenKind::SlashEqual => write!(f, "/="),
            TokenKind::PercentEqual => write!(f, "%="),
            TokenKind::PlusPlus => write!(f, "++"),
            TokenKind::MinusMinus => write!(f, "--"),
            TokenKind::FatArrow => write!(f, "=>"),
            TokenKind::Question => write!(f, "?"),

            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),

            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Hash => write!(f, "#"),
            TokenKind::Underscore => write!(f, "_"),

            TokenKind::Punct(ch) => write!(f, "{}", ch),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Token::new(TokenKind::Eof, span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.kind, self.span)
    }
}

/// Convert string keywords to token kinds
pub fn keyword_to_token(s: &str) -> Option<TokenKind> {
    match s {
        "intent" => Some(TokenKind::Intent),
        "uses" => Some(TokenKind::Uses),
        "types" => Some(TokenKind::Types),
        "type" => Some(TokenKind::Type),
        "func" => Some(TokenKind::Func),
        "effect" => Some(TokenKind::Effect),
        "test" => Some(TokenKind::Test),
        "requires" => Some(TokenKind::Requires),
        "ensures" => Some(TokenKind::Ensures),
        "brand" => Some(TokenKind::Brand),
        "where" => Some(TokenKind::Where),
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "return" => Some(TokenKind::Return),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "match" => Some(TokenKind::Match),
        "case" => Some(TokenKind::Case),
        "for" => Some(TokenKind::For),
        "in" => Some(TokenKind::In),
        "while" => Some(TokenKind::While),
        "try" => Some(TokenKind::Try),
        "catch" => Some(TokenKind::Catch),
        "fn" => Some(TokenKind::Fn),
        "Ok" => Some(TokenKind::Ok),
        "Err" => Some(TokenKind::Err),
        "Some" => Some(TokenKind::Some),
        "None" => Some(TokenKind::None),
        "true" => Some(TokenKind::Bool(true)),
        "false" => Some(TokenKind::Bool(false)),
        _ => None,
    }
}

/// Operator lookup for one- and two-character punctuation
pub(crate) fn operator_to_token(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "==" => TokenKind::EqualEqual,
        "!=" => TokenKind::NotEqual,
        "<=" => TokenKind::LessEqual,
        ">=" => TokenKind::GreaterEqual,
        "&&" => TokenKind::AndAnd,
        "||" => TokenKind::OrOr,
        "<<" => TokenKind::ShiftLeft,
        ">>" => TokenKind::ShiftRight,
        "+=" => TokenKind::PlusEqual,
        "-=" => TokenKind::MinusEqual,
        "*=" => TokenKind::StarEqual,
        "/=" => TokenKind::SlashEqual,
        "%=" => TokenKind::PercentEqual,
        "++" => TokenKind::PlusPlus,
        "--" => TokenKind::MinusMinus,
        "=>" => TokenKind::FatArrow,
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "*" => TokenKind::Star,
        "/" => TokenKind::Slash,
        "%" => TokenKind::Percent,
        "=" => TokenKind::Equal,
        "<" => TokenKind::Less,
        ">" => TokenKind::Greater,
        "!" => TokenKind::Bang,
        "&" => TokenKind::Ampersand,
        "|" => TokenKind::Pipe,
        "^" => TokenKind::Caret,
        "?" => TokenKind::Question,
        "(" => TokenKind::LeftParen,
        ")" => TokenKind::RightParen,
        "{" => TokenKind::LeftBrace,
        "}" => TokenKind::RightBrace,
        "[" => TokenKind::LeftBracket,
        "]" => TokenKind::RightBracket,
        "," => TokenKind::Comma,
        ";" => TokenKind::Semicolon,
        ":" => TokenKind::Colon,
        "." => TokenKind::Dot,
        "#" => TokenKind::Hash,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_precedence() {
        assert_eq!(TokenKind::Plus.precedence(), Some(9));
        assert_eq!(TokenKind::Star.precedence(), Some(10));
        assert_eq!(TokenKind::AndAnd.precedence(), Some(2));
        assert!(TokenKind::Star.precedence() > TokenKind::Plus.precedence());
        assert!(TokenKind::EqualEqual.precedence() > TokenKind::Ampersand.precedence());
        assert!(TokenKind::Pipe.precedence() < TokenKind::Caret.precedence());
        assert_eq!(TokenKind::Equal.precedence(), None);
    }

    #[test]
    fn test_keyword_recognition() {
        assert_eq!(keyword_to_token("func"), Some(TokenKind::Func));
        assert_eq!(keyword_to_token("effect"), Some(TokenKind::Effect));
        assert_eq!(keyword_to_token("true"), Some(TokenKind::Bool(true)));
        assert_eq!(keyword_to_token("None"), Some(TokenKind::None));
        // `tags` is contextual and stays an identifier
        assert_eq!(keyword_to_token("tags"), None);
        assert_eq!(keyword_to_token("Types"), None);
    }

    #[test]
    fn test_operator_lookup() {
        assert_eq!(operator_to_token("+="), Some(TokenKind::PlusEqual));
        assert_eq!(operator_to_token("=>"), Some(TokenKind::FatArrow));
        assert_eq!(operator_to_token("@"), None);
    }

    #[test]
    fn test_token_properties() {
        assert!(TokenKind::Let.is_keyword());
        assert!(TokenKind::Number("1".to_string()).is_literal());
        assert!(TokenKind::SlashEqual.is_compound_assignment());
        assert!(!TokenKind::Ident("x".to_string()).is_keyword());
    }
}
