//! # cellsheet
//!
//! A spreadsheet of named cells with formulas and automatic recalculation.
//!
//! ## Features
//!
//! - Cells hold numbers, text, or infix formulas over other cells
//! - Values are recalculated in dependency order whenever a cell changes
//! - Circular references are rejected before anything is modified
//! - Caller-supplied normalization and validation of cell names
//!
//! ## Example
//!
//! ```rust
//! use cellsheet::prelude::*;
//!
//! // Cell names are case-insensitive under the upper-case policy
//! let options = SpreadsheetOptions::default().with_policy(NamePolicy::uppercase());
//! let mut sheet = Spreadsheet::with_options(options);
//!
//! sheet.set_contents_of_cell("a1", "10").unwrap();
//! sheet.set_contents_of_cell("A2", "=a1 * 2").unwrap();
//! assert_eq!(sheet.cell_value("A2").unwrap(), CellValue::Number(20.0));
//! assert_eq!(sheet.cell_contents("a2").unwrap().to_raw_string(), "=A1*2");
//!
//! // Division by zero is a value, not an error
//! sheet.set_contents_of_cell("A3", "=A2/0").unwrap();
//! assert!(sheet.cell_value("A3").unwrap().is_error());
//! ```

pub mod contents;
pub mod options;
pub mod prelude;
mod recalc;
pub mod spreadsheet;

pub use contents::CellContents;
pub use options::{SpreadsheetOptions, DEFAULT_VERSION};
pub use spreadsheet::{CellRecord, Spreadsheet};

// Re-export core types
pub use cellsheet_core::{
    is_cell_name, is_variable, CellValue, Error, EvaluationError, EvaluationErrorKind, NamePolicy,
    Result,
};

// Re-export formula types
pub use cellsheet_formula::{tokenize, DependencyGraph, Formula, FormulaError, Operator, Token};
