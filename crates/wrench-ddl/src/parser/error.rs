//! Parser error type.

use crate::lexer::{Span, TokenKind};

/// A parse error with its source location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Where it went wrong (byte offsets).
    pub span: Span,
    /// The token that was found, when applicable.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            found: None,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected = expected.into();
        Self {
            message: format!("expected {expected}, found {found:?}"),
            span,
            found: Some(found),
        }
    }
}
