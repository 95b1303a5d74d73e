use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::GameConfig,
    error::{SlotError, SlotResult},
    paytable::SymbolValues,
    reels::generate,
    rng::ProvablyFairRng,
    symbols::{Grid, Symbol},
};

/// Lines played and the stake on each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetContext {
    pub lines: u32,
    pub bet_per_line: u64,
}

impl BetContext {
    pub fn new(lines: u32, bet_per_line: u64) -> Self {
        Self {
            lines,
            bet_per_line,
        }
    }

    /// `lines * bet_per_line`, or `None` on overflow.
    pub fn total_bet(&self) -> Option<u64> {
        u64::from(self.lines).checked_mul(self.bet_per_line)
    }
}

/// A fully matched payline. `line` is 1-based, top row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    pub line: u32,
    pub symbol: Symbol,
    pub winnings: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutResult {
    pub total_winnings: u64,
    pub line_wins: Vec<LineWin>,
}

impl PayoutResult {
    pub fn is_win(&self) -> bool {
        !self.line_wins.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpinOutcome {
    pub grid: Grid,
    pub payout: PayoutResult,
}

/// Pays every horizontal line among the top `lines` rows whose symbols are
/// identical across all columns. There is no partial-match tier.
pub fn evaluate(
    grid: &Grid,
    lines: u32,
    bet_per_line: u64,
    values: &SymbolValues,
) -> SlotResult<PayoutResult> {
    let rows = grid.rows();
    if lines == 0 || lines as usize > rows {
        return Err(SlotError::invalid(format!(
            "lines must be in 1..={rows}, got {lines}"
        )));
    }
    if bet_per_line == 0 {
        return Err(SlotError::invalid("bet per line must be positive"));
    }
    if let Some(missing) = grid.symbols().find(|s| !values.contains_key(s)) {
        return Err(SlotError::config(format!("symbol {missing} has no payout value")));
    }

    let mut result = PayoutResult::default();
    for row in 0..lines as usize {
        let mut symbols = grid.row(row);
        let Some(first) = symbols.next() else {
            continue;
        };
        if !symbols.all(|s| s == first) {
            continue;
        }
        let value = values[&first];
        let winnings = value.checked_mul(bet_per_line).ok_or_else(|| {
            SlotError::invalid(format!("payout {value} x {bet_per_line} overflows"))
        })?;
        result.total_winnings = result
            .total_winnings
            .checked_add(winnings)
            .ok_or_else(|| SlotError::invalid("total payout overflows"))?;
        result.line_wins.push(LineWin {
            line: row as u32 + 1,
            symbol: first,
            winnings,
        });
    }
    Ok(result)
}

pub fn compute_reel_window<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig) -> SlotResult<Grid> {
    let shape = config.grid();
    generate(shape.rows, shape.cols, config.table().counts(), rng)
}

pub fn spin_once<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GameConfig,
    bet: &BetContext,
) -> SlotResult<SpinOutcome> {
    let grid = compute_reel_window(rng, config)?;
    let payout = evaluate(&grid, bet.lines, bet.bet_per_line, config.table().values())?;
    debug!(
        lines = bet.lines,
        bet_per_line = bet.bet_per_line,
        winnings = payout.total_winnings,
        "spin evaluated"
    );
    Ok(SpinOutcome { grid, payout })
}

/// Convenience: perform a spin creating the RNG from seeds.
pub fn spin_with_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &GameConfig,
    bet: &BetContext,
) -> SlotResult<SpinOutcome> {
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    spin_once(&mut rng, config, bet)
}

/// Verify that a given reel window matches what the RNG would produce for the seeds.
/// `expected_indices` is column-major, as produced by [`Grid::to_indices`].
pub fn verify_reels(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &GameConfig,
    expected_indices: &[Vec<u8>],
) -> SlotResult<bool> {
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    let window = compute_reel_window(&mut rng, config)?;
    Ok(window.to_indices() == expected_indices)
}
