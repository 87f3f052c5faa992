//! # cellsheet-core
//!
//! Core data structures for the cellsheet spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout cellsheet:
//! - [`CellValue`] - The derived value of a cell (number, text, or evaluation error)
//! - [`NamePolicy`] - The caller-supplied normalizer and validator for cell names
//! - [`Error`] - Structural errors raised at the mutation boundary
//!
//! ## Example
//!
//! ```rust
//! use cellsheet_core::{is_cell_name, NamePolicy};
//!
//! let policy = NamePolicy::uppercase();
//! assert_eq!(policy.normalize("a1"), "A1");
//! assert!(is_cell_name("XY032"));
//! assert!(!is_cell_name("X_"));
//! ```

pub mod error;
pub mod name;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use name::{is_cell_name, is_variable, NamePolicy};
pub use value::{CellValue, EvaluationError, EvaluationErrorKind};
