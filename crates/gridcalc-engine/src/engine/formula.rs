//! Infix formula parsing and evaluation.
//!
//! A [`Formula`] is an immutable, validated token sequence over number
//! literals, variables, `+ - * /` and parentheses. Parsing checks the token
//! ordering rules in one pass; evaluation runs the classic operand/operator
//! two-stack algorithm against a caller-supplied variable lookup.
//!
//! Formulas never hold a reference to the spreadsheet: variables are
//! resolved through the lookup passed to [`Formula::evaluate`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use super::tokenizer::{Lexeme, Operator, tokenize};

/// Rewrites each variable before it is validated and stored.
pub trait Normalizer {
    fn normalize(&self, variable: &str) -> String;
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> String,
{
    fn normalize(&self, variable: &str) -> String {
        self(variable)
    }
}

/// Decides whether a normalized variable is allowed.
pub trait Validator {
    fn is_valid(&self, variable: &str) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool,
{
    fn is_valid(&self, variable: &str) -> bool {
        self(variable)
    }
}

/// Leaves variables unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn normalize(&self, variable: &str) -> String {
        variable.to_string()
    }
}

/// Accepts every variable.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn is_valid(&self, _variable: &str) -> bool {
        true
    }
}

/// Why formula text was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaFormatError {
    #[error("formula contains no tokens")]
    Empty,

    #[error("unrecognized token '{0}'")]
    UnknownToken(String),

    #[error("number '{0}' is out of range")]
    NumberOutOfRange(String),

    #[error(
        "'{0}' must follow an operator, an opening parenthesis or the start of the formula"
    )]
    MisplacedOperand(String),

    #[error("operator '{0}' must follow a number, a variable or a closing parenthesis")]
    MisplacedOperator(char),

    #[error(
        "opening parenthesis must follow an operator, an opening parenthesis or the start of the formula"
    )]
    MisplacedLeftParen,

    #[error("closing parenthesis must follow a number, a variable or a closing parenthesis")]
    MisplacedRightParen,

    #[error("closing parenthesis has no matching opening parenthesis")]
    UnbalancedRightParen,

    #[error("{0} opening parenthesis left unclosed")]
    UnclosedParen(usize),

    #[error("formula cannot end with '{0}'")]
    TrailingToken(String),

    #[error("variable '{0}' is not valid")]
    InvalidVariable(String),
}

/// An evaluation failure. Stored as a cell value rather than propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{reason}")]
pub struct FormulaError {
    reason: String,
}

impl FormulaError {
    pub fn new(reason: impl Into<String>) -> Self {
        FormulaError {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    LeftParen,
    RightParen,
    Operator(Operator),
    Variable(String),
    Number(f64),
}

impl Token {
    fn is_operand(&self) -> bool {
        matches!(self, Token::Variable(_) | Token::Number(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Variable(name) => f.write_str(name),
            Token::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A parsed infix formula.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Vec<Token>,
}

impl Formula {
    /// Parse formula text, leaving variables as written.
    pub fn parse(text: &str) -> Result<Formula, FormulaFormatError> {
        Self::parse_with(text, &Identity, &AcceptAll)
    }

    /// Parse formula text, normalizing every variable and then checking it
    /// with `validator`.
    pub fn parse_with<N, V>(
        text: &str,
        normalizer: &N,
        validator: &V,
    ) -> Result<Formula, FormulaFormatError>
    where
        N: Normalizer + ?Sized,
        V: Validator + ?Sized,
    {
        let mut tokens: Vec<Token> = Vec::new();
        let mut open = 0usize;
        let mut closed = 0usize;

        for lexeme in tokenize(text) {
            let token = match lexeme {
                Lexeme::Other(text) => return Err(FormulaFormatError::UnknownToken(text)),
                Lexeme::Number { value, text } => {
                    if !value.is_finite() {
                        return Err(FormulaFormatError::NumberOutOfRange(text));
                    }
                    Token::Number(value)
                }
                Lexeme::Variable(name) => Token::Variable(name),
                Lexeme::Operator(op) => Token::Operator(op),
                Lexeme::LeftParen => Token::LeftParen,
                Lexeme::RightParen => Token::RightParen,
            };

            let previous = tokens.last();
            let follows_opener =
                matches!(previous, None | Some(Token::Operator(_) | Token::LeftParen));
            let follows_operand =
                matches!(previous, Some(Token::RightParen)) || previous.is_some_and(Token::is_operand);

            let token = match token {
                Token::Number(_) | Token::Variable(_) if !follows_opener => {
                    return Err(FormulaFormatError::MisplacedOperand(token.to_string()));
                }
                Token::Operator(op) if !follows_operand => {
                    return Err(FormulaFormatError::MisplacedOperator(op.symbol()));
                }
                Token::LeftParen => {
                    if !follows_opener {
                        return Err(FormulaFormatError::MisplacedLeftParen);
                    }
                    open += 1;
                    token
                }
                Token::RightParen => {
                    if !follows_operand {
                        return Err(FormulaFormatError::MisplacedRightParen);
                    }
                    closed += 1;
                    if closed > open {
                        return Err(FormulaFormatError::UnbalancedRightParen);
                    }
                    token
                }
                Token::Variable(name) => {
                    let normalized = normalizer.normalize(&name);
                    if !validator.is_valid(&normalized) {
                        return Err(FormulaFormatError::InvalidVariable(normalized));
                    }
                    Token::Variable(normalized)
                }
                other => other,
            };
            tokens.push(token);
        }

        match tokens.last() {
            None => return Err(FormulaFormatError::Empty),
            Some(last @ (Token::Operator(_) | Token::LeftParen)) => {
                return Err(FormulaFormatError::TrailingToken(last.to_string()));
            }
            Some(_) => {}
        }
        if open != closed {
            return Err(FormulaFormatError::UnclosedParen(open - closed));
        }

        Ok(Formula { tokens })
    }

    /// The distinct variables this formula references, in order of first use.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.tokens
            .iter()
            .filter_map(|token| match token {
                Token::Variable(name) if seen.insert(name.as_str()) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Evaluate the formula. `lookup` returns None for undefined variables.
    ///
    /// Division by zero, undefined variables and non-finite results are
    /// reported as a [`FormulaError`].
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, FormulaError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut operands: Vec<f64> = Vec::new();
        let mut operators: Vec<Pending> = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Number(n) => push_operand(*n, &mut operands, &mut operators)?,
                Token::Variable(name) => {
                    let value = lookup(name).ok_or_else(|| {
                        FormulaError::new(format!("undefined variable '{}'", name))
                    })?;
                    push_operand(value, &mut operands, &mut operators)?;
                }
                Token::Operator(op) if op.is_multiplicative() => {
                    operators.push(Pending::Operator(*op));
                }
                Token::Operator(op) => {
                    apply_pending(&mut operands, &mut operators, |op| !op.is_multiplicative())?;
                    operators.push(Pending::Operator(*op));
                }
                Token::LeftParen => operators.push(Pending::LeftParen),
                Token::RightParen => {
                    apply_pending(&mut operands, &mut operators, |op| !op.is_multiplicative())?;
                    if operators.pop() != Some(Pending::LeftParen) {
                        return Err(malformed());
                    }
                    apply_pending(&mut operands, &mut operators, Operator::is_multiplicative)?;
                }
            }
        }

        apply_pending(&mut operands, &mut operators, |op| !op.is_multiplicative())?;
        let result = operands.pop().ok_or_else(malformed)?;
        if !operands.is_empty() || !operators.is_empty() {
            return Err(malformed());
        }
        if !result.is_finite() {
            return Err(FormulaError::new("result is not a finite number"));
        }
        Ok(result)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pending {
    Operator(Operator),
    LeftParen,
}

fn malformed() -> FormulaError {
    FormulaError::new("malformed expression")
}

fn apply(op: Operator, lhs: f64, rhs: f64) -> Result<f64, FormulaError> {
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Subtract => Ok(lhs - rhs),
        Operator::Multiply => Ok(lhs * rhs),
        Operator::Divide if rhs == 0.0 => Err(FormulaError::new("division by zero")),
        Operator::Divide => Ok(lhs / rhs),
    }
}

/// Push an operand, first folding it into a pending `*` or `/`.
fn push_operand(
    value: f64,
    operands: &mut Vec<f64>,
    operators: &mut Vec<Pending>,
) -> Result<(), FormulaError> {
    match operators.last() {
        Some(Pending::Operator(op)) if op.is_multiplicative() => {
            let op = *op;
            operators.pop();
            let lhs = operands.pop().ok_or_else(malformed)?;
            operands.push(apply(op, lhs, value)?);
        }
        _ => operands.push(value),
    }
    Ok(())
}

/// If the top operator satisfies `select`, pop it with two operands and push
/// the result.
fn apply_pending(
    operands: &mut Vec<f64>,
    operators: &mut Vec<Pending>,
    select: impl Fn(Operator) -> bool,
) -> Result<(), FormulaError> {
    let Some(Pending::Operator(op)) = operators.last().copied() else {
        return Ok(());
    };
    if !select(op) {
        return Ok(());
    }
    operators.pop();
    let rhs = operands.pop().ok_or_else(malformed)?;
    let lhs = operands.pop().ok_or_else(malformed)?;
    operands.push(apply(op, lhs, rhs)?);
    Ok(())
}

impl FromStr for Formula {
    type Err = FormulaFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
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

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

// Number tokens are always finite, so token equality is reflexive.
impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn eval(text: &str) -> Result<f64, FormulaError> {
        Formula::parse(text).unwrap().evaluate(|_| None)
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("2+3*4").unwrap(), 14.0);
        assert_eq!(eval("(2+3)*4").unwrap(), 20.0);
        assert_eq!(eval("10-4-3").unwrap(), 3.0);
        assert_eq!(eval("100/10/5").unwrap(), 2.0);
        assert_eq!(eval("2*(3+4)*5").unwrap(), 70.0);
        assert_eq!(eval("((7))").unwrap(), 7.0);
        assert_eq!(eval("1-(2-(3-4))").unwrap(), -2.0);
        assert_eq!(eval("8/(2*2)+1").unwrap(), 3.0);
    }

    #[test]
    fn test_variables_resolved_through_lookup() {
        let values: HashMap<&str, f64> = [("X1", 3.0), ("Y2", 4.0)].into_iter().collect();
        let formula = Formula::parse("X1*X1 + Y2*Y2").unwrap();
        assert_eq!(formula.evaluate(|name| values.get(name).copied()).unwrap(), 25.0);
    }

    #[test]
    fn test_undefined_variable_is_error() {
        let err = Formula::parse("A1+1").unwrap().evaluate(|_| None).unwrap_err();
        assert!(err.reason().contains("A1"));
    }

    #[test]
    fn test_division_by_zero_is_error() {
        assert_eq!(eval("5/0").unwrap_err().reason(), "division by zero");
        assert!(eval("1/(3-3)").is_err());
    }

    #[test]
    fn test_overflow_is_error() {
        assert!(eval("1e308*10").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Formula::parse(""), Err(FormulaFormatError::Empty));
        assert_eq!(Formula::parse("  "), Err(FormulaFormatError::Empty));
        assert_eq!(
            Formula::parse("1 $ 2"),
            Err(FormulaFormatError::UnknownToken("$".to_string()))
        );
        assert_eq!(
            Formula::parse("1 2"),
            Err(FormulaFormatError::MisplacedOperand("2".to_string()))
        );
        assert_eq!(
            Formula::parse("(1)x"),
            Err(FormulaFormatError::MisplacedOperand("x".to_string()))
        );
        assert_eq!(
            Formula::parse("-1"),
            Err(FormulaFormatError::MisplacedOperator('-'))
        );
        assert_eq!(
            Formula::parse("1+*2"),
            Err(FormulaFormatError::MisplacedOperator('*'))
        );
        assert_eq!(Formula::parse("2(3)"), Err(FormulaFormatError::MisplacedLeftParen));
        assert_eq!(Formula::parse("(+)"), Err(FormulaFormatError::MisplacedOperator('+')));
        assert_eq!(Formula::parse("()"), Err(FormulaFormatError::MisplacedRightParen));
        assert_eq!(Formula::parse("1)"), Err(FormulaFormatError::UnbalancedRightParen));
        assert_eq!(Formula::parse("((1)"), Err(FormulaFormatError::UnclosedParen(1)));
        assert_eq!(
            Formula::parse("1+"),
            Err(FormulaFormatError::TrailingToken("+".to_string()))
        );
        assert_eq!(
            Formula::parse("1e999"),
            Err(FormulaFormatError::NumberOutOfRange("1e999".to_string()))
        );
    }

    #[test]
    fn test_normalizer_and_validator() {
        let upper = |v: &str| v.to_ascii_uppercase();
        let short = |v: &str| v.len() <= 2;
        let formula = Formula::parse_with("a1 + b2", &upper, &short).unwrap();
        assert_eq!(formula.variables(), vec!["A1", "B2"]);
        assert_eq!(formula.to_string(), "A1+B2");

        assert_eq!(
            Formula::parse_with("abc + 1", &upper, &short),
            Err(FormulaFormatError::InvalidVariable("ABC".to_string()))
        );
    }

    #[test]
    fn test_variables_are_distinct() {
        let formula = Formula::parse("x + y * x / (z - y)").unwrap();
        assert_eq!(formula.variables(), vec!["x", "y", "z"]);
        assert!(Formula::parse("1 + 2").unwrap().variables().is_empty());
    }

    #[test]
    fn test_equality_ignores_spacing_and_number_spelling() {
        let a: Formula = "x1 + 2.0".parse().unwrap();
        let b: Formula = "x1+2".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "x1+2");
        assert_ne!(a, "x1 + 3".parse::<Formula>().unwrap());

        let mut hashes = std::collections::HashSet::new();
        hashes.insert(a);
        assert!(hashes.contains(&b));
    }

    #[test]
    fn test_display_round_trips() {
        let formula = Formula::parse("(a + .5) * 1e3").unwrap();
        let reparsed = Formula::parse(&formula.to_string()).unwrap();
        assert_eq!(formula, reparsed);
    }
}
