//! Parser error types

use thiserror::Error;

/// Parse error with source position
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty expression")]
    Empty,

    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("Unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid number literal '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("Invalid date/time literal '{text}' at position {position}")]
    InvalidTemporal { text: String, position: usize },

    #[error("Expected {expected} but found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("Unexpected trailing input at position {position}")]
    TrailingInput { position: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;
