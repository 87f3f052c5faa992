//! Cell contents

use cellsheet_core::CellValue;
use cellsheet_formula::Formula;
use std::fmt;

/// What a user put into a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContents {
    /// Numeric literal
    Number(f64),
    /// Anything that is neither a number nor a formula
    Text(String),
    /// A formula (entered with a leading `=`)
    Formula(Formula),
}

impl CellContents {
    /// Contents of a cell that was never set
    pub fn empty() -> Self {
        CellContents::Text(String::new())
    }

    /// Check if the contents are empty text
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Text(s) if s.is_empty())
    }

    /// Check if the contents are a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContents::Formula(_))
    }

    /// Get the formula if this is a formula cell
    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContents::Formula(f) => Some(f),
            _ => None,
        }
    }

    /// Get the type name for log messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellContents::Number(_) => "number",
            CellContents::Text(_) => "text",
            CellContents::Formula(_) => "formula",
        }
    }

    /// The literal string that reproduces these contents when passed back to
    /// [`Spreadsheet::set_contents_of_cell`](crate::Spreadsheet::set_contents_of_cell).
    /// Formulas are prefixed with `=`.
    pub fn to_raw_string(&self) -> String {
        self.to_string()
    }

    /// The value of a non-formula cell
    pub(crate) fn literal_value(&self) -> Option<CellValue> {
        match self {
            CellContents::Number(n) => Some(CellValue::Number(*n)),
            CellContents::Text(s) => Some(CellValue::Text(s.clone())),
            CellContents::Formula(_) => None,
        }
    }
}

impl Default for CellContents {
    fn default() -> Self {
        CellContents::empty()
    }
}

impl fmt::Display for CellContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellContents::Number(n) => write!(f, "{}", n),
            CellContents::Text(s) => write!(f, "{}", s),
            CellContents::Formula(formula) => write!(f, "={}", formula),
        }
    }
}

impl From<Formula> for CellContents {
    fn from(f: Formula) -> Self {
        CellContents::Formula(f)
    }
}
