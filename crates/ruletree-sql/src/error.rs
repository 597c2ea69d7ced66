//! SQL compilation error types

use thiserror::Error;

/// SQL compilation error
#[derive(Error, Debug)]
pub enum SqlError {
    /// A condition references an attribute with no column mapping; the
    /// fragment would reference a nonexistent column, so compilation is
    /// fatal rather than the clause being skipped.
    #[error("no column mapping for attribute: {0}")]
    UnmappedAttribute(String),

    /// A value shape the quoting primitive cannot render
    #[error("cannot quote value: {0}")]
    UnsupportedValue(String),
}

pub type Result<T> = std::result::Result<T, SqlError>;
