//! Cell value types

use std::fmt;

/// The derived value of a cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Numeric value
    Number(f64),

    /// Text value (an empty cell reads as empty text)
    Text(String),

    /// A formula that could not be evaluated
    Error(EvaluationError),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// The value of a cell with no contents
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Check if the value is empty text
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Check if the value is an evaluation error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the evaluation error, if any
    pub fn as_error(&self) -> Option<&EvaluationError> {
        match self {
            CellValue::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Error(_) => "error",
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<EvaluationError> for CellValue {
    fn from(e: EvaluationError) -> Self {
        CellValue::Error(e)
    }
}

/// Why a formula could not produce a number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationErrorKind {
    /// The right operand of `/` was zero
    DivisionByZero,
    /// A variable had no numeric value
    UnresolvedVariable(String),
    /// The operand/operator stacks ended in an unexpected state
    Malformed,
}

/// A formula evaluation failure, carried as data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationError {
    kind: EvaluationErrorKind,
    reason: String,
}

impl EvaluationError {
    /// Create an error with an explicit reason
    pub fn new<S: Into<String>>(kind: EvaluationErrorKind, reason: S) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Division by zero
    pub fn division_by_zero() -> Self {
        Self::new(EvaluationErrorKind::DivisionByZero, "division by zero")
    }

    /// A variable that the lookup could not resolve to a number
    pub fn unresolved<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        let reason = format!("variable {} has no numeric value", name);
        Self::new(EvaluationErrorKind::UnresolvedVariable(name), reason)
    }

    /// Evaluation finished in a state that does not describe a single value
    pub fn malformed() -> Self {
        Self::new(
            EvaluationErrorKind::Malformed,
            "formula did not reduce to a single value",
        )
    }

    /// What went wrong
    pub fn kind(&self) -> &EvaluationErrorKind {
        &self.kind
    }

    /// Human-readable explanation
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#ERROR: {}", self.reason)
    }
}
