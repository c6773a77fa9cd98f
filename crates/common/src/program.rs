//! Program text format.
//!
//! A program is a single line of comma-separated signed decimal integers.
//! Loading copies the cells verbatim into memory starting at address 0.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// An Intcode program: the initial contents of memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// Memory cells, starting at address 0.
    pub cells: Vec<i64>,
}

impl Program {
    /// Create a program from raw cells.
    pub fn new(cells: Vec<i64>) -> Self {
        Self { cells }
    }

    /// Parse the comma-separated text form.
    ///
    /// Whitespace around fields and a trailing newline are tolerated.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        let cells = text
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| ParseError::InvalidInteger {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cells })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the program has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}

impl FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<i64>> for Program {
    fn from(cells: Vec<i64>) -> Self {
        Self { cells }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}
