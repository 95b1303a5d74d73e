use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SlotError, SlotResult};
use crate::paytable::SymbolTable;

pub const ROWS: usize = 3;
pub const COLS: usize = 3;
pub const MAX_LINES: u32 = 3;
pub const MIN_BET: u64 = 1;
pub const MAX_BET: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
}

/// Limits a front end enforces on player input before spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub max_lines: u32,
    pub min_bet: u64,
    pub max_bet: u64,
}

impl BetLimits {
    pub fn allows_lines(&self, lines: u32) -> bool {
        (1..=self.max_lines).contains(&lines)
    }

    pub fn allows_bet(&self, bet_per_line: u64) -> bool {
        (self.min_bet..=self.max_bet).contains(&bet_per_line)
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            max_lines: MAX_LINES,
            min_bet: MIN_BET,
            max_bet: MAX_BET,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawGameConfig {
    grid: GridSpec,
    table: SymbolTable,
    #[serde(default)]
    limits: BetLimits,
}

/// Everything needed to run spins: grid shape, symbol table and bet limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    grid: GridSpec,
    table: SymbolTable,
    limits: BetLimits,
}

impl GameConfig {
    pub fn new(grid: GridSpec, table: SymbolTable, limits: BetLimits) -> SlotResult<Self> {
        if grid.rows == 0 || grid.cols == 0 {
            return Err(SlotError::config("grid must be at least 1x1"));
        }
        if table.pool_size() < grid.rows as u64 {
            return Err(SlotError::config(format!(
                "symbol pool holds {} instances but reels show {} rows",
                table.pool_size(),
                grid.rows
            )));
        }
        if limits.max_lines == 0 || limits.max_lines as usize > grid.rows {
            return Err(SlotError::config(format!(
                "max_lines must be in 1..={}, got {}",
                grid.rows, limits.max_lines
            )));
        }
        if limits.min_bet == 0 || limits.min_bet > limits.max_bet {
            return Err(SlotError::config(format!(
                "bet range {}..={} is empty or starts at zero",
                limits.min_bet, limits.max_bet
            )));
        }
        Ok(Self {
            grid,
            table,
            limits,
        })
    }

    /// Three reels of three rows over the classic A-D table.
    pub fn reference() -> Self {
        Self {
            grid: GridSpec {
                rows: ROWS,
                cols: COLS,
            },
            table: SymbolTable::reference(),
            limits: BetLimits::default(),
        }
    }

    pub fn from_json_str(s: &str) -> SlotResult<Self> {
        serde_json::from_str(s).map_err(|e| SlotError::config(format!("invalid game config: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SlotError::config(format!("reading {}: {e}", path.display())))?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), rows = config.grid.rows, cols = config.grid.cols, "loaded game config");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> SlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SlotError::config(format!("serializing game config: {e}")))
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn limits(&self) -> BetLimits {
        self.limits
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = SlotError;

    fn try_from(raw: RawGameConfig) -> Result<Self, Self::Error> {
        Self::new(raw.grid, raw.table, raw.limits)
    }
}
