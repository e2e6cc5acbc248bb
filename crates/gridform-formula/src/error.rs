//! Formula error types

use crate::lexer::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, ParseError>;

/// A location in formula text (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The start of the input
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An error raised while lexing or parsing a formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error at {pos}: {message}")]
pub struct ParseError {
    pub pos: Position,
    pub message: String,
}

impl ParseError {
    pub fn new<S: Into<String>>(pos: Position, message: S) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }

    /// The canonical error for a token other than what the grammar allows
    /// at this point.
    pub fn unexpected_token(tok: &Token, expected: &[TokenKind]) -> Self {
        let expected = expected
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self::new(
            tok.pos,
            format!(
                "expected one of [{}]: found '{}' ({})",
                expected, tok.value, tok.kind
            ),
        )
    }
}
