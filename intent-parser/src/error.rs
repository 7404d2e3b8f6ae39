//! Parser error types
//!
//! Parsing is not error-recovering: the first structural violation aborts the
//! parse with exactly one [`ParseError`].

use crate::span::Span;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {span}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input at {span}: expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("Syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    #[error("Invalid literal '{literal}' at {span}")]
    InvalidLiteral { literal: String, span: Span },
}

impl ParseError {
    pub fn unexpected_token(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn invalid_literal(literal: impl Into<String>, span: Span) -> Self {
        Self::InvalidLiteral {
            literal: literal.into(),
            span,
        }
    }

    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEof { span, .. }
            | Self::Syntax { span, .. }
            | Self::InvalidLiteral { span, .. } => *span,
        }
    }

    /// The message without the location prefix, as surfaced in diagnostics
    pub fn message(&self) -> String {
        match self {
            Self::UnexpectedToken { expected, found, .. } => {
                format!("Unexpected token: expected {}, found {}", expected, found)
            }
            Self::UnexpectedEof { expected, .. } => {
                format!("Unexpected end of input: expected {}", expected)
            }
            Self::Syntax { message, .. } => message.clone(),
            Self::InvalidLiteral { literal, .. } => format!("Invalid literal '{}'", literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    #[test]
    fn test_error_creation() {
        let span = Span::new(Position::new(2, 5, 14), Position::new(2, 8, 17));
        let error = ParseError::unexpected_token("')'", "'{'", span);

        assert_eq!(error.span(), span);
        assert_eq!(error.message(), "Unexpected token: expected ')', found '{'");
        assert_eq!(
            error.to_string(),
            "Unexpected token at 2:5-2:8: expected ')', found '{'"
        );
    }

    #[test]
    fn test_syntax_message_is_passed_through() {
        let error = ParseError::syntax("compound refinement predicates are not supported", Span::default());
        assert_eq!(error.message(), "compound refinement predicates are not supported");
    }
}
