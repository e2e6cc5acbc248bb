//! Error types for gridform-core

use crate::address::Pos;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridform-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell position format
    #[error("invalid position: expected A23, found '{0}'")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("invalid range: expected A23:B54, found '{0}'")]
    InvalidRange(String),

    /// String does not match any supported date/time layout
    #[error("'{0}' cannot be parsed as a date or time")]
    InvalidTime(String),

    /// Position outside the bounds of a sheet
    #[error("position '{0}' outside of bounds")]
    PosOutOfBounds(Pos),

    /// Retrieval was cancelled through the caller's [`Context`](crate::sheet::Context)
    #[error("operation cancelled")]
    Cancelled,
}
