//! Formula tokenizer.
//!
//! Splits formula text into lexemes: parentheses, the four arithmetic
//! operators, variables (`x`, `A1`, `total2`) and non-negative number
//! literals (`3`, `2.`, `.5`, `1.5e-3`). Whitespace is dropped. Anything
//! else is collected into [`Lexeme::Other`] runs so the parser can report it.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Multiply | Operator::Divide)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A lexeme of formula text.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    LeftParen,
    RightParen,
    Operator(Operator),
    Variable(String),
    /// A number literal with its source text.
    Number { value: f64, text: String },
    /// A run of characters no pattern accepts.
    Other(String),
}

fn lexeme_re() -> &'static Regex {
    static LEXEME_RE: OnceLock<Regex> = OnceLock::new();
    LEXEME_RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?<ws>\s+)|(?<lparen>\()|(?<rparen>\))|(?<op>[+\-*/])|(?<var>[A-Za-z][A-Za-z0-9]*)|(?<num>(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))",
        )
        .expect("lexeme regex must compile")
    })
}

/// Split formula text into lexemes.
pub fn tokenize(text: &str) -> Vec<Lexeme> {
    let re = lexeme_re();
    let mut lexemes = Vec::new();
    let mut other = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(caps) = re.captures(rest) else {
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                other.push(ch);
            }
            rest = chars.as_str();
            continue;
        };

        if !other.is_empty() {
            lexemes.push(Lexeme::Other(std::mem::take(&mut other)));
        }

        let matched = caps.get(0).map_or("", |m| m.as_str());
        if caps.name("lparen").is_some() {
            lexemes.push(Lexeme::LeftParen);
        } else if caps.name("rparen").is_some() {
            lexemes.push(Lexeme::RightParen);
        } else if let Some(op) = caps.name("op").and_then(|m| Operator::from_symbol(m.as_str())) {
            lexemes.push(Lexeme::Operator(op));
        } else if let Some(var) = caps.name("var") {
            lexemes.push(Lexeme::Variable(var.as_str().to_string()));
        } else if let Some(num) = caps.name("num") {
            match num.as_str().parse::<f64>() {
                Ok(value) => lexemes.push(Lexeme::Number {
                    value,
                    text: num.as_str().to_string(),
                }),
                Err(_) => lexemes.push(Lexeme::Other(num.as_str().to_string())),
            }
        }

        rest = &rest[matched.len()..];
    }

    if !other.is_empty() {
        lexemes.push(Lexeme::Other(other));
    }

    lexemes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64, text: &str) -> Lexeme {
        Lexeme::Number {
            value,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_tokenize_drops_whitespace() {
        let lexemes = tokenize(" ( x1 +\t2 ) ");
        assert_eq!(
            lexemes,
            vec![
                Lexeme::LeftParen,
                Lexeme::Variable("x1".to_string()),
                Lexeme::Operator(Operator::Add),
                number(2.0, "2"),
                Lexeme::RightParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_number_forms() {
        assert_eq!(tokenize("2."), vec![number(2.0, "2.")]);
        assert_eq!(tokenize(".5"), vec![number(0.5, ".5")]);
        assert_eq!(tokenize("1.5e-3"), vec![number(0.0015, "1.5e-3")]);
        assert_eq!(tokenize("3E2"), vec![number(300.0, "3E2")]);
    }

    #[test]
    fn test_tokenize_sign_is_not_part_of_number() {
        assert_eq!(
            tokenize("-3"),
            vec![Lexeme::Operator(Operator::Subtract), number(3.0, "3")]
        );
    }

    #[test]
    fn test_tokenize_groups_unknown_runs() {
        assert_eq!(
            tokenize("A1 $$% 2"),
            vec![
                Lexeme::Variable("A1".to_string()),
                Lexeme::Other("$$%".to_string()),
                number(2.0, "2"),
            ]
        );
        assert_eq!(tokenize("é"), vec![Lexeme::Other("é".to_string())]);
    }

    #[test]
    fn test_tokenize_operators() {
        let ops: Vec<_> = tokenize("+-*/")
            .into_iter()
            .map(|lexeme| match lexeme {
                Lexeme::Operator(op) => op.symbol(),
                other => panic!("unexpected lexeme {:?}", other),
            })
            .collect();
        assert_eq!(ops, vec!['+', '-', '*', '/']);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
