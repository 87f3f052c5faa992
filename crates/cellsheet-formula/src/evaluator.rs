//! Formula evaluator
//!
//! Two-stack operator-precedence evaluation over a validated token
//! sequence. `*` and `/` are applied as soon as their right operand is
//! available; `+` and `-` wait until a `+`, `-`, `)`, or the end of input
//! forces them.

use crate::formula::Formula;
use crate::token::{Operator, Token};
use cellsheet_core::{CellValue, EvaluationError};

/// Entries of the operator stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Op(Operator),
    LeftParen,
}

/// Evaluate a token sequence, resolving variables through `lookup`.
///
/// `lookup` receives the variable name exactly as stored in the token
/// (normalized, for tokens coming from a [`Formula`]) and returns `None`
/// when the variable has no numeric value.
///
/// Never panics: division by zero, unresolved variables, and malformed
/// token sequences all come back as an [`EvaluationError`].
pub fn evaluate<L>(tokens: &[Token], mut lookup: L) -> Result<f64, EvaluationError>
where
    L: FnMut(&str) -> Option<f64>,
{
    let mut values: Vec<f64> = Vec::new();
    let mut operators: Vec<Pending> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(n) => {
                values.push(*n);
                apply_multiplicative(&mut values, &mut operators)?;
            }
            Token::Variable(name) => {
                let value = lookup(name.as_str())
                    .ok_or_else(|| EvaluationError::unresolved(name.as_str()))?;
                values.push(value);
                apply_multiplicative(&mut values, &mut operators)?;
            }
            Token::Operator(op) if op.is_additive() => {
                apply_additive(&mut values, &mut operators)?;
                operators.push(Pending::Op(*op));
            }
            Token::Operator(op) => operators.push(Pending::Op(*op)),
            Token::LeftParen => operators.push(Pending::LeftParen),
            Token::RightParen => {
                apply_additive(&mut values, &mut operators)?;
                match operators.pop() {
                    Some(Pending::LeftParen) => {}
                    _ => return Err(EvaluationError::malformed()),
                }
                apply_multiplicative(&mut values, &mut operators)?;
            }
            Token::Invalid(_) => return Err(EvaluationError::malformed()),
        }
    }

    match (operators.as_slice(), values.as_slice()) {
        ([], [result]) => Ok(*result),
        ([Pending::Op(op)], [lhs, rhs]) if op.is_additive() => apply(*op, *lhs, *rhs),
        _ => Err(EvaluationError::malformed()),
    }
}

/// Apply a pending `*` or `/` on top of the operator stack
fn apply_multiplicative(
    values: &mut Vec<f64>,
    operators: &mut Vec<Pending>,
) -> Result<(), EvaluationError> {
    match operators.last() {
        Some(Pending::Op(op)) if !op.is_additive() => reduce(values, operators),
        _ => Ok(()),
    }
}

/// Apply a pending `+` or `-` on top of the operator stack
fn apply_additive(
    values: &mut Vec<f64>,
    operators: &mut Vec<Pending>,
) -> Result<(), EvaluationError> {
    match operators.last() {
        Some(Pending::Op(op)) if op.is_additive() => reduce(values, operators),
        _ => Ok(()),
    }
}

/// Pop one operator and two operands, push the result
fn reduce(values: &mut Vec<f64>, operators: &mut Vec<Pending>) -> Result<(), EvaluationError> {
    let op = match operators.pop() {
        Some(Pending::Op(op)) => op,
        _ => return Err(EvaluationError::malformed()),
    };
    let rhs = values.pop().ok_or_else(EvaluationError::malformed)?;
    let lhs = values.pop().ok_or_else(EvaluationError::malformed)?;
    values.push(apply(op, lhs, rhs)?);
    Ok(())
}

fn apply(op: Operator, lhs: f64, rhs: f64) -> Result<f64, EvaluationError> {
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Subtract => Ok(lhs - rhs),
        Operator::Multiply => Ok(lhs * rhs),
        Operator::Divide if rhs == 0.0 => Err(EvaluationError::division_by_zero()),
        Operator::Divide => Ok(lhs / rhs),
    }
}

impl Formula {
    /// Evaluate this formula, resolving each variable with `lookup`.
    ///
    /// # Example
    /// ```rust
    /// use cellsheet_core::NamePolicy;
    /// use cellsheet_formula::Formula;
    ///
    /// let lookup = |name: &str| match name {
    ///     "x" => Some(2.0),
    ///     "X" => Some(4.0),
    ///     _ => None,
    /// };
    /// let upper = Formula::with_policy("x+7", NamePolicy::uppercase()).unwrap();
    /// assert_eq!(upper.evaluate(lookup), Ok(11.0));
    /// assert_eq!(Formula::new("x+7").unwrap().evaluate(lookup), Ok(9.0));
    /// ```
    pub fn evaluate<L>(&self, lookup: L) -> Result<f64, EvaluationError>
    where
        L: FnMut(&str) -> Option<f64>,
    {
        evaluate(self.tokens(), lookup)
    }

    /// Evaluate into a [`CellValue`] (a number or an evaluation error)
    pub fn evaluate_value<L>(&self, lookup: L) -> CellValue
    where
        L: FnMut(&str) -> Option<f64>,
    {
        match self.evaluate(lookup) {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}
