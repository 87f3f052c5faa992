//! Prelude module - common imports for cellsheet users
//!
//! ```rust
//! use cellsheet::prelude::*;
//! ```

pub use crate::{
    CellContents,
    CellValue,
    Error,
    EvaluationError,
    Formula,
    NamePolicy,
    Result,
    Spreadsheet,
    SpreadsheetOptions,
};
