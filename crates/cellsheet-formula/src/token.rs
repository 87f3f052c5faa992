//! Formula tokenizer
//!
//! Splits raw formula text into a flat sequence of tokens. Lexing never
//! fails: text that matches no token pattern comes back as
//! [`Token::Invalid`] and is rejected later by grammar validation.

use std::fmt;

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// The operator's symbol
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// `+` and `-`
    pub fn is_additive(&self) -> bool {
        matches!(self, Operator::Add | Operator::Subtract)
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Non-negative numeric literal
    Number(f64),
    /// Variable name, as written
    Variable(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    /// Any substring that matches no other pattern
    Invalid(String),
}

impl Token {
    /// Number or variable
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_))
    }

    /// Tokens that may begin an operand position: number, variable, `(`
    pub fn opens_operand(&self) -> bool {
        self.is_operand() || matches!(self, Token::LeftParen)
    }

    /// Tokens that may end an operand position: number, variable, `)`
    pub fn closes_operand(&self) -> bool {
        self.is_operand() || matches!(self, Token::RightParen)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(v) => write!(f, "{}", v),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Invalid(s) => write!(f, "{}", s),
        }
    }
}

/// Split a formula into tokens.
///
/// Recognized, in priority order: `(`, `)`, `+ - * /`, variables (letter or
/// underscore, then letters, digits, or underscores), unsigned numeric
/// literals with optional fraction and exponent. Whitespace separates tokens
/// and is dropped.
///
/// # Example
/// ```rust
/// use cellsheet_formula::token::{tokenize, Operator, Token};
///
/// let tokens = tokenize("x1 * (2.5e1)");
/// assert_eq!(tokens, vec![
///     Token::Variable("x1".into()),
///     Token::Operator(Operator::Multiply),
///     Token::LeftParen,
///     Token::Number(25.0),
///     Token::RightParen,
/// ]);
/// ```
pub fn tokenize(formula: &str) -> Vec<Token> {
    Lexer::new(formula).collect()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn scan_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let c = self.peek_char()?;

        match c {
            '(' => {
                self.advance();
                return Some(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Some(Token::RightParen);
            }
            _ => {}
        }

        if let Some(op) = Operator::from_char(c) {
            self.advance();
            return Some(Token::Operator(op));
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Some(self.scan_variable());
        }

        if self.at_number_start() {
            return Some(self.scan_number());
        }

        Some(self.scan_invalid())
    }

    fn scan_variable(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token::Variable(self.input[start..self.pos].to_string())
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        self.skip_digits();

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent part, only when digits follow
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let sign = self
                .peek_char_at(1)
                .map_or(false, |c| c == '+' || c == '-');
            let digit_offset = if sign { 2 } else { 1 };
            if self
                .peek_char_at(digit_offset)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..digit_offset {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let text = &self.input[start..self.pos];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Token::Number(n),
            _ => Token::Invalid(text.to_string()),
        }
    }

    /// Consume a run of characters that start no other token
    fn scan_invalid(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace()
                || c == '('
                || c == ')'
                || Operator::from_char(c).is_some()
                || c.is_ascii_alphabetic()
                || c == '_'
                || self.at_number_start()
            {
                break;
            }
            self.advance();
        }
        Token::Invalid(self.input[start..self.pos].to_string())
    }

    fn at_number_start(&self) -> bool {
        match self.peek_char() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()),
            _ => false,
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.scan_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(s: &str) -> Token {
        Token::Variable(s.into())
    }

    #[test]
    fn test_tokenize_simple_expression() {
        assert_eq!(
            tokenize("a1+2"),
            vec![var("a1"), Token::Operator(Operator::Add), Token::Number(2.0)]
        );
    }

    #[test]
    fn test_whitespace_separates_tokens() {
        assert_eq!(tokenize("xy"), vec![var("xy")]);
        assert_eq!(tokenize("x y"), vec![var("x"), var("y")]);
        assert_eq!(tokenize("x 23"), vec![var("x"), Token::Number(23.0)]);
        assert_eq!(tokenize("  \t\n "), vec![]);
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(tokenize("3."), vec![Token::Number(3.0)]);
        assert_eq!(tokenize(".5"), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("1e3"), vec![Token::Number(1000.0)]);
        assert_eq!(tokenize("2.5E-1"), vec![Token::Number(0.25)]);
    }

    #[test]
    fn test_overflowing_number_is_invalid() {
        assert_eq!(tokenize("1e999"), vec![Token::Invalid("1e999".into())]);
    }

    #[test]
    fn test_sign_is_never_part_of_number() {
        assert_eq!(
            tokenize("-5"),
            vec![Token::Operator(Operator::Subtract), Token::Number(5.0)]
        );
    }

    #[test]
    fn test_dangling_exponent_is_a_variable() {
        // "2e" is the number 2 followed by the variable "e"
        assert_eq!(tokenize("2e"), vec![Token::Number(2.0), var("e")]);
    }

    #[test]
    fn test_unknown_characters_become_invalid_tokens() {
        assert_eq!(
            tokenize("2 $% 3"),
            vec![
                Token::Number(2.0),
                Token::Invalid("$%".into()),
                Token::Number(3.0)
            ]
        );
        assert_eq!(tokenize("."), vec![Token::Invalid(".".into())]);
    }

    #[test]
    fn test_number_then_letters() {
        assert_eq!(tokenize("2x"), vec![Token::Number(2.0), var("x")]);
    }
}
