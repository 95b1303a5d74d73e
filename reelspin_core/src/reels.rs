//! Reel generation: each column draws `rows` symbols without replacement
//! from its own full copy of the symbol pool.

use rand::Rng;
use tracing::warn;

use crate::error::{SlotError, SlotResult};
use crate::paytable::SymbolCounts;
use crate::symbols::{Grid, Symbol};

/// Remaining symbol instances for one column.
#[derive(Debug, Clone)]
pub struct SpinPool {
    remaining: Vec<(Symbol, u64)>,
    total: u64,
}

impl SpinPool {
    pub fn new(counts: &SymbolCounts) -> Self {
        let remaining: Vec<(Symbol, u64)> =
            counts.iter().map(|(&s, &c)| (s, u64::from(c))).collect();
        let total = remaining.iter().map(|(_, c)| c).sum();
        Self { remaining, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn remaining_of(&self, symbol: Symbol) -> u64 {
        self.remaining
            .iter()
            .find(|(s, _)| *s == symbol)
            .map_or(0, |(_, c)| *c)
    }

    /// Picks one instance uniformly among everything left and removes it.
    /// Returns `None` once the pool is exhausted.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Symbol> {
        if self.total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..self.total);
        for (symbol, left) in self.remaining.iter_mut() {
            if pick < *left {
                *left -= 1;
                self.total -= 1;
                return Some(*symbol);
            }
            pick -= *left;
        }
        None
    }
}

/// Produces a `cols` x `rows` grid. Fails before drawing anything if the
/// shape is empty or a column's pool cannot cover `rows` draws.
pub fn generate<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    counts: &SymbolCounts,
    rng: &mut R,
) -> SlotResult<Grid> {
    if rows == 0 || cols == 0 {
        return Err(SlotError::config(format!(
            "grid must be at least 1x1, got {cols} columns of {rows} rows"
        )));
    }
    let pool_size: u64 = counts.values().map(|&c| u64::from(c)).sum();
    if pool_size < rows as u64 {
        warn!(pool_size, rows, "symbol pool too small for reel height");
        return Err(SlotError::config(format!(
            "symbol pool holds {pool_size} instances but each column needs {rows}"
        )));
    }

    let mut columns = Vec::with_capacity(cols);
    for col in 0..cols {
        let mut pool = SpinPool::new(counts);
        let column = (0..rows)
            .map(|_| {
                pool.draw(rng)
                    .ok_or_else(|| SlotError::config(format!("pool ran dry on column {col}")))
            })
            .collect::<SlotResult<Vec<Symbol>>>()?;
        columns.push(column);
    }
    Ok(Grid::from_generated(columns))
}
