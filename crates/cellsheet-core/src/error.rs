//! Error types for cellsheet-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors raised when reading or mutating a spreadsheet.
///
/// Every one of these leaves the spreadsheet exactly as it was before the
/// failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Cell name fails the grammar or the caller's validator
    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    /// Formula text is not a well-formed infix expression
    #[error("Formula syntax error: {0}")]
    FormulaSyntax(String),

    /// The proposed contents would make a cell depend on itself
    #[error("Circular dependency detected involving cell {cell}")]
    CircularDependency { cell: String },
}

impl Error {
    /// Create an invalid-name error for the given (raw) name
    pub fn invalid_name<S: Into<String>>(name: S) -> Self {
        Error::InvalidName(name.into())
    }

    /// Whether this error reports a circular dependency
    pub fn is_circular(&self) -> bool {
        matches!(self, Error::CircularDependency { .. })
    }
}
