use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    A,
    B,
    C,
    D,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [Symbol::A, Symbol::B, Symbol::C, Symbol::D];

    pub fn to_index(self) -> u8 {
        match self {
            Symbol::A => 0,
            Symbol::B => 1,
            Symbol::C => 2,
            Symbol::D => 3,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::C => 'C',
            Symbol::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Symbol::A),
            'B' => Some(Symbol::B),
            'C' => Some(Symbol::C),
            'D' => Some(Symbol::D),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Symbol {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c)
                .ok_or_else(|| SlotError::invalid(format!("unknown symbol {s:?}"))),
            _ => Err(SlotError::invalid(format!("unknown symbol {s:?}"))),
        }
    }
}

/// One spin outcome: `cols` columns (reels), each holding `rows` symbols from
/// top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    columns: Vec<Vec<Symbol>>,
}

impl Grid {
    /// Build a grid from explicit columns, e.g. to evaluate a known layout.
    /// Columns must be non-empty and all of the same height.
    pub fn from_columns(columns: Vec<Vec<Symbol>>) -> SlotResult<Self> {
        let rows = match columns.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(SlotError::invalid("grid needs at least one row and one column")),
        };
        if let Some(bad) = columns.iter().position(|c| c.len() != rows) {
            return Err(SlotError::invalid(format!(
                "column {} has {} symbols, expected {rows}",
                bad,
                columns[bad].len()
            )));
        }
        Ok(Self { columns })
    }

    pub(crate) fn from_generated(columns: Vec<Vec<Symbol>>) -> Self {
        Self { columns }
    }

    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Vec<Symbol>] {
        &self.columns
    }

    /// Symbols of horizontal row `row`, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = Symbol> + '_ {
        self.columns.iter().filter_map(move |c| c.get(row).copied())
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.columns.iter().flatten().copied()
    }

    /// Column-major symbol indices, the form published for verification.
    pub fn to_indices(&self) -> Vec<Vec<u8>> {
        self.columns
            .iter()
            .map(|col| col.iter().map(|s| s.to_index()).collect())
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            for (i, symbol) in self.row(row).enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
