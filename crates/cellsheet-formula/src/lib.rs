//! # cellsheet-formula
//!
//! Formula tokenizer, evaluator, and dependency graph for cellsheet.
//!
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Grammar validation and formula identity ([`Formula`])
//! - Formula evaluation (tokens → number or [`EvaluationError`](cellsheet_core::EvaluationError))
//! - Dependency tracking for recalculation ([`DependencyGraph`])
//!
//! ## Example
//!
//! ```rust
//! use cellsheet_formula::Formula;
//!
//! let formula = Formula::new("(a1 + 2) * 3").unwrap();
//! let value = formula.evaluate(|name| (name == "a1").then_some(4.0));
//! assert_eq!(value, Ok(18.0));
//! ```

pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod token;

pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::evaluate;
pub use formula::Formula;
pub use token::{tokenize, Operator, Token};
