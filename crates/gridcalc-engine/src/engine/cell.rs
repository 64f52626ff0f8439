//! Cell data structures.
//!
//! A cell stores its [`Content`] verbatim and caches the [`Value`] computed
//! from it. Formula values are derived by evaluating against the values of
//! other cells; text and number contents evaluate to themselves.

use std::fmt;

use super::formula::{Formula, FormulaError};

/// What a cell stores.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Text(String),
    Number(f64),
    Formula(Formula),
}

impl Content {
    /// The content reported for cells that were never set.
    pub fn empty() -> Self {
        Content::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Text(s) if s.is_empty())
    }

    pub fn formula(&self) -> Option<&Formula> {
        match self {
            Content::Formula(formula) => Some(formula),
            _ => None,
        }
    }

    /// Compute the value of this content. `lookup` resolves formula variables.
    pub fn evaluate<F>(&self, lookup: F) -> Value
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Content::Text(s) => Value::Text(s.clone()),
            Content::Number(n) => Value::Number(*n),
            Content::Formula(formula) => match formula.evaluate(lookup) {
                Ok(n) => Value::Number(n),
                Err(err) => Value::Error(err),
            },
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::empty()
    }
}

/// The text a user would type to recreate this content: numbers in shortest
/// round-trip form, formulas with a leading `=`.
impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(s) => f.write_str(s),
            Content::Number(n) => write!(f, "{}", n),
            Content::Formula(formula) => write!(f, "={}", formula),
        }
    }
}

/// What a cell computes to.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Error(FormulaError),
}

impl Value {
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Error(err) => write!(f, "#ERROR({})", err),
        }
    }
}

/// A stored cell: its content and the value last computed from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub content: Content,
    pub value: Value,
}

impl Cell {
    /// A cell whose value has not been computed yet.
    pub fn new(content: Content) -> Self {
        Cell {
            content,
            value: Value::empty(),
        }
    }
}
