//! Parse errors.
//!
//! A syntax error aborts compilation of the whole script — there is no
//! partial compilation. Every error carries a source location so a bot
//! author can find the offending line.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}
