//! Validated infix formulas
//!
//! A [`Formula`] is built from text once, checked against the grammar, and
//! never changes afterwards. Variables are stored in normalized form.

use crate::error::{FormulaError, FormulaResult};
use crate::token::{tokenize, Token};
use cellsheet_core::{is_variable, NamePolicy};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An infix arithmetic formula over numbers and variables.
///
/// # Example
/// ```rust
/// use cellsheet_core::NamePolicy;
/// use cellsheet_formula::Formula;
///
/// let f = Formula::with_policy("x + y*2", NamePolicy::uppercase()).unwrap();
/// assert_eq!(f.to_string(), "X+Y*2");
/// assert!(f.variables().contains("Y"));
/// ```
#[derive(Clone)]
pub struct Formula {
    tokens: Vec<Token>,
    policy: NamePolicy,
}

impl Formula {
    /// Parse a formula with the identity normalizer and a validator that
    /// accepts every variable.
    pub fn new(text: &str) -> FormulaResult<Self> {
        Self::with_policy(text, NamePolicy::identity())
    }

    /// Parse a formula, normalizing and validating every variable with
    /// `policy`.
    pub fn with_policy(text: &str, policy: NamePolicy) -> FormulaResult<Self> {
        let raw = tokenize(text);
        check_structure(&raw)?;

        let tokens = raw
            .into_iter()
            .map(|token| match token {
                Token::Variable(variable) => {
                    let normalized = policy.normalize(&variable);
                    if !is_variable(&normalized) {
                        return Err(FormulaError::IllegalNormalizedVariable {
                            variable,
                            normalized,
                        });
                    }
                    if !policy.is_valid(&normalized) {
                        return Err(FormulaError::RejectedVariable {
                            variable,
                            normalized,
                        });
                    }
                    Ok(Token::Variable(normalized))
                }
                other => Ok(other),
            })
            .collect::<FormulaResult<Vec<_>>>()?;

        Ok(Self { tokens, policy })
    }

    /// The validated token sequence (variables normalized)
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The policy this formula was built under
    pub fn policy(&self) -> &NamePolicy {
        &self.policy
    }

    /// Distinct normalized variable names referenced by this formula
    pub fn variables(&self) -> BTreeSet<String> {
        self.tokens
            .iter()
            .filter_map(|token| match token {
                Token::Variable(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Enforce token-order and parenthesis rules on a raw token stream.
fn check_structure(tokens: &[Token]) -> FormulaResult<()> {
    let (first, last) = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(FormulaError::Empty),
    };
    if let Some(text) = tokens.iter().find_map(|token| match token {
        Token::Invalid(text) => Some(text),
        _ => None,
    }) {
        return Err(FormulaError::UnexpectedToken(text.clone()));
    }
    if !first.opens_operand() {
        return Err(FormulaError::InvalidStart(first.to_string()));
    }
    if !last.closes_operand() {
        return Err(FormulaError::InvalidEnd(last.to_string()));
    }

    let mut open = 0usize;
    let mut close = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1);
        match token {
            // rejected above
            Token::Invalid(_) => {}
            Token::LeftParen | Token::Operator(_) => {
                if let Token::LeftParen = token {
                    open += 1;
                }
                match next {
                    Some(n) if n.opens_operand() => {}
                    Some(n) => {
                        return Err(FormulaError::ExpectedOperand {
                            after: token.to_string(),
                            found: n.to_string(),
                        })
                    }
                    // unreachable: the last token closes an operand
                    None => return Err(FormulaError::InvalidEnd(token.to_string())),
                }
            }
            Token::Number(_) | Token::Variable(_) | Token::RightParen => {
                if let Token::RightParen = token {
                    close += 1;
                    if close > open {
                        return Err(FormulaError::UnbalancedClose(i));
                    }
                }
                if let Some(n) = next {
                    if !matches!(n, Token::Operator(_) | Token::RightParen) {
                        return Err(FormulaError::ExpectedOperator {
                            after: token.to_string(),
                            found: n.to_string(),
                        });
                    }
                }
            }
        }
    }

    if open != close {
        return Err(FormulaError::UnbalancedOpen(open - close));
    }
    Ok(())
}

/// Canonical text of a token for equality and hashing.
///
/// Numbers go through a parse-then-format round trip, so `2.0` and `2.00`
/// compare equal.
fn canonical(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("{}", n),
        other => other.to_string(),
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.tokens.len() == other.tokens.len()
            && self
                .tokens
                .iter()
                .zip(&other.tokens)
                .all(|(a, b)| match (a, b) {
                    (Token::Number(_), Token::Number(_)) => canonical(a) == canonical(b),
                    _ => a == b,
                })
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.len().hash(state);
        for token in &self.tokens {
            std::mem::discriminant(token).hash(state);
            canonical(token).hash(state);
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Formula").field(&self.to_string()).finish()
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Formula::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHasher;
    use pretty_assertions::assert_eq;

    fn upper_cell_policy() -> NamePolicy {
        // one letter followed by one digit
        NamePolicy::new(
            |s| s.to_ascii_uppercase(),
            |s| {
                let b = s.as_bytes();
                b.len() == 2 && b[0].is_ascii_alphabetic() && b[1].is_ascii_digit()
            },
        )
    }

    fn hash_of(f: &Formula) -> u64 {
        let mut hasher = AHasher::default();
        f.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_policy_accepts_and_rejects() {
        assert!(Formula::with_policy("x2+y3", upper_cell_policy()).is_ok());
        assert_eq!(
            Formula::with_policy("x+y3", upper_cell_policy()).unwrap_err(),
            FormulaError::RejectedVariable {
                variable: "x".into(),
                normalized: "X".into()
            }
        );
        assert!(matches!(
            Formula::with_policy("2x+y3", upper_cell_policy()),
            Err(FormulaError::ExpectedOperator { .. })
        ));
    }

    #[test]
    fn test_normalizer_must_produce_variable() {
        let policy = NamePolicy::new(|s| format!("{}!", s), |_| true);
        assert!(matches!(
            Formula::with_policy("a+1", policy),
            Err(FormulaError::IllegalNormalizedVariable { .. })
        ));
    }

    #[test]
    fn test_grammar_violations() {
        assert_eq!(Formula::new("").unwrap_err(), FormulaError::Empty);
        assert_eq!(Formula::new("   ").unwrap_err(), FormulaError::Empty);
        assert!(matches!(Formula::new("+1"), Err(FormulaError::InvalidStart(_))));
        assert!(matches!(Formula::new(")"), Err(FormulaError::InvalidStart(_))));
        assert!(matches!(Formula::new("1+"), Err(FormulaError::InvalidEnd(_))));
        assert!(matches!(Formula::new("(1"), Err(FormulaError::UnbalancedOpen(1))));
        assert!(matches!(Formula::new("1)+(2"), Err(FormulaError::UnbalancedClose(1))));
        assert!(matches!(
            Formula::new("1+*2"),
            Err(FormulaError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            Formula::new("()"),
            Err(FormulaError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            Formula::new("1 2"),
            Err(FormulaError::ExpectedOperator { .. })
        ));
        assert!(matches!(
            Formula::new("(1)(2)"),
            Err(FormulaError::ExpectedOperator { .. })
        ));
        assert_eq!(
            Formula::new("1 + $ + 2").unwrap_err(),
            FormulaError::UnexpectedToken("$".into())
        );
        assert_eq!(
            Formula::new("$").unwrap_err(),
            FormulaError::UnexpectedToken("$".into())
        );
    }

    #[test]
    fn test_variables_are_distinct_and_normalized() {
        let f = Formula::with_policy("x+X*z", NamePolicy::uppercase()).unwrap();
        let vars: Vec<String> = f.variables().into_iter().collect();
        assert_eq!(vars, vec!["X".to_string(), "Z".to_string()]);

        let f = Formula::new("x+X*z").unwrap();
        assert_eq!(f.variables().len(), 3);
    }

    #[test]
    fn test_to_string_has_no_spaces() {
        let f = Formula::with_policy("x + y", NamePolicy::uppercase()).unwrap();
        assert_eq!(f.to_string(), "X+Y");
        assert_eq!(Formula::new("x + Y").unwrap().to_string(), "x+Y");
        assert_eq!(Formula::new("( 2.50 ) / b_1").unwrap().to_string(), "(2.5)/b_1");
    }

    #[test]
    fn test_to_string_round_trips() {
        let f = Formula::new("(1e-3 + a1) * 4.000 - _q").unwrap();
        let again = Formula::new(&f.to_string()).unwrap();
        assert_eq!(f, again);
    }

    #[test]
    fn test_overflowing_literal_rejected() {
        assert_eq!(
            Formula::new("1e999").unwrap_err(),
            FormulaError::UnexpectedToken("1e999".into())
        );
        assert_eq!(
            Formula::new("A1 + 1e999").unwrap_err(),
            FormulaError::UnexpectedToken("1e999".into())
        );
        let f = Formula::new("1e300 * 2").unwrap();
        assert_eq!(Formula::new(&f.to_string()).unwrap(), f);
    }

    #[test]
    fn test_numeric_equality() {
        let a = Formula::new("2.0+9.0-A1").unwrap();
        let b = Formula::new("2 + 9 - A1").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(
            Formula::new("2.0 + x7").unwrap(),
            Formula::new("2.000 + x7").unwrap()
        );
        assert_ne!(
            Formula::new("2.01+9-A1").unwrap(),
            Formula::new("2+9-A1").unwrap()
        );
    }

    #[test]
    fn test_equality_uses_normalized_variables() {
        let a = Formula::with_policy("x1+y2", NamePolicy::uppercase()).unwrap();
        let b = Formula::new("X1  +  Y2").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(Formula::new("x1+y2").unwrap(), Formula::new("X1+Y2").unwrap());
        assert_ne!(Formula::new("x1+y2").unwrap(), Formula::new("y2+x1").unwrap());
    }

    #[test]
    fn test_from_str() {
        let f: Formula = "1+1".parse().unwrap();
        assert_eq!(f.tokens().len(), 3);
        assert!("1+".parse::<Formula>().is_err());
    }
}
