//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Grammar violations detected while constructing a [`Formula`](crate::Formula).
///
/// Each variant names the rule that was broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// No tokens at all
    #[error("formula must contain at least one token")]
    Empty,

    /// First token is not a number, variable, or `(`
    #[error("formula must start with a number, variable, or '(' but starts with '{0}'")]
    InvalidStart(String),

    /// Last token is not a number, variable, or `)`
    #[error("formula must end with a number, variable, or ')' but ends with '{0}'")]
    InvalidEnd(String),

    /// `(` or an operator followed by something other than an operand
    #[error("'{after}' must be followed by a number, variable, or '(' but found '{found}'")]
    ExpectedOperand { after: String, found: String },

    /// Operand or `)` followed by something other than an operator or `)`
    #[error("'{after}' must be followed by an operator or ')' but found '{found}'")]
    ExpectedOperator { after: String, found: String },

    /// A `)` with no matching `(`
    #[error("unmatched ')' at token {0}")]
    UnbalancedClose(usize),

    /// More `(` than `)`
    #[error("{0} unclosed '('")]
    UnbalancedOpen(usize),

    /// Text that is not a legal token
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    /// A variable whose normalized form is not a legal variable
    #[error("variable '{variable}' normalizes to '{normalized}', which is not a legal variable")]
    IllegalNormalizedVariable {
        variable: String,
        normalized: String,
    },

    /// A variable rejected by the caller's validator
    #[error("variable '{variable}' (normalized '{normalized}') was rejected by the validator")]
    RejectedVariable {
        variable: String,
        normalized: String,
    },
}

impl From<FormulaError> for cellsheet_core::Error {
    fn from(err: FormulaError) -> Self {
        cellsheet_core::Error::FormulaSyntax(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let err: cellsheet_core::Error = FormulaError::UnbalancedOpen(2).into();
        assert_eq!(
            err,
            cellsheet_core::Error::FormulaSyntax("2 unclosed '('".into())
        );
    }
}
