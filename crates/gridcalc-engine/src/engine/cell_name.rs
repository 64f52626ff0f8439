//! Cell name parsing and validity patterns.
//!
//! A cell name is one or more letters followed by a row number that does not
//! start with zero ("A1", "BC12"). Names are stored upper case so that "a1"
//! and "A1" address the same cell.
//!
//! # Examples
//!
//! ```ignore
//! let name = CellName::parse("bc12").unwrap();
//! assert_eq!(name.as_str(), "BC12");
//! assert!(CellName::parse("A0").is_none());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::OnceLock;

use super::formula::Validator;

/// A canonical (upper case) cell name.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellName(String);

impl CellName {
    /// Parse a cell name, folding it to upper case.
    /// Returns None if the input does not follow the cell name grammar.
    pub fn parse(name: &str) -> Option<CellName> {
        if !cell_name_re().is_match(name) {
            return None;
        }
        Some(CellName(name.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn cell_name_re() -> &'static Regex {
    static CELL_NAME_RE: OnceLock<Regex> = OnceLock::new();
    CELL_NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]+[1-9][0-9]*$").expect("cell name regex must compile")
    })
}

impl std::str::FromStr for CellName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell name: {}", s))
    }
}

impl TryFrom<String> for CellName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellName> for String {
    fn from(name: CellName) -> String {
        name.0
    }
}

impl Borrow<str> for CellName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CellName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The validity pattern a spreadsheet applies on top of the cell name grammar.
///
/// Patterns are matched against the canonical (upper case) name. The empty
/// pattern accepts every grammatical name. The source string is kept so the
/// pattern can be written into saved files.
#[derive(Clone, Debug)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Result<NamePattern, regex::Error> {
        Ok(NamePattern {
            regex: Regex::new(pattern)?,
        })
    }

    /// A pattern that accepts every grammatical cell name.
    pub fn accept_all() -> NamePattern {
        static ACCEPT_ALL: OnceLock<Regex> = OnceLock::new();
        let regex = ACCEPT_ALL
            .get_or_init(|| Regex::new("").expect("empty regex must compile"))
            .clone();
        NamePattern { regex }
    }

    /// The pattern source, as recorded in saved files.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, name: &CellName) -> bool {
        self.regex.is_match(name.as_str())
    }

    /// Parse `name` and check it against this pattern.
    pub fn check(&self, name: &str) -> Option<CellName> {
        CellName::parse(name).filter(|name| self.matches(name))
    }
}

impl Default for NamePattern {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for NamePattern {}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formula variables are valid when they name a cell this pattern accepts.
impl Validator for NamePattern {
    fn is_valid(&self, variable: &str) -> bool {
        self.check(variable).is_some()
    }
}
