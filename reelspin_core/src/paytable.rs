use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::Symbol;

/// Pool weight per symbol: how many instances of it each reel draws from.
pub type SymbolCounts = BTreeMap<Symbol, u32>;

/// Payout multiplier per symbol, applied to the bet on a matched line.
pub type SymbolValues = BTreeMap<Symbol, u64>;

#[derive(Debug, Clone, Deserialize)]
struct RawSymbolTable {
    counts: SymbolCounts,
    values: SymbolValues,
}

/// Counts for generation and values for payout, keyed by the same symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSymbolTable")]
pub struct SymbolTable {
    counts: SymbolCounts,
    values: SymbolValues,
}

impl SymbolTable {
    /// Validates that both tables are non-empty, share the same keys and hold
    /// only positive entries.
    pub fn new(counts: SymbolCounts, values: SymbolValues) -> SlotResult<Self> {
        if counts.is_empty() {
            return Err(SlotError::config("symbol table is empty"));
        }
        if let Some(s) = counts.keys().find(|s| !values.contains_key(s)) {
            return Err(SlotError::config(format!("symbol {s} has a count but no value")));
        }
        if let Some(s) = values.keys().find(|s| !counts.contains_key(s)) {
            return Err(SlotError::config(format!("symbol {s} has a value but no count")));
        }
        if let Some((s, _)) = counts.iter().find(|(_, &c)| c == 0) {
            return Err(SlotError::config(format!("symbol {s} has a zero count")));
        }
        if let Some((s, _)) = values.iter().find(|(_, &v)| v == 0) {
            return Err(SlotError::config(format!("symbol {s} has a zero value")));
        }
        Ok(Self { counts, values })
    }

    /// The classic table: rare `A` pays most, common `D` pays least.
    pub fn reference() -> Self {
        Self {
            counts: BTreeMap::from([
                (Symbol::A, 2),
                (Symbol::B, 4),
                (Symbol::C, 6),
                (Symbol::D, 8),
            ]),
            values: BTreeMap::from([
                (Symbol::A, 5),
                (Symbol::B, 4),
                (Symbol::C, 3),
                (Symbol::D, 2),
            ]),
        }
    }

    pub fn counts(&self) -> &SymbolCounts {
        &self.counts
    }

    pub fn values(&self) -> &SymbolValues {
        &self.values
    }

    pub fn count(&self, symbol: Symbol) -> Option<u32> {
        self.counts.get(&symbol).copied()
    }

    pub fn value(&self, symbol: Symbol) -> Option<u64> {
        self.values.get(&symbol).copied()
    }

    /// Number of instances in a freshly built reel pool.
    pub fn pool_size(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.counts.keys().copied()
    }
}

impl TryFrom<RawSymbolTable> for SymbolTable {
    type Error = SlotError;

    fn try_from(raw: RawSymbolTable) -> Result<Self, Self::Error> {
        Self::new(raw.counts, raw.values)
    }
}
