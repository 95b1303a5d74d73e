//! Return-to-player figures for a configuration, computed exactly and by
//! running spins.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    config::GameConfig,
    engine::{spin_once, BetContext},
    error::{SlotError, SlotResult},
    paytable::SymbolTable,
    symbols::Symbol,
};

/// Expected return per unit staked on one line.
///
/// Every position's marginal is `count / pool_size` no matter how many draws
/// came before it in the column, and columns are independent, so a line
/// completes with symbol `s` with probability `(count_s / pool_size)^cols`.
pub fn theoretical_rtp(table: &SymbolTable, cols: usize) -> f64 {
    let pool = table.pool_size() as f64;
    if pool == 0.0 {
        return 0.0;
    }
    table
        .symbols()
        .map(|s| {
            let p = f64::from(table.count(s).unwrap_or(0)) / pool;
            let value = table.value(s).unwrap_or(0) as f64;
            p.powi(cols as i32) * value
        })
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub spins: u64,
    pub total_wagered: u64,
    pub total_paid: u64,
    /// Spins with at least one winning line.
    pub winning_spins: u64,
    pub line_hits: BTreeMap<Symbol, u64>,
}

impl SimulationReport {
    pub fn rtp(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        self.total_paid as f64 / self.total_wagered as f64
    }

    pub fn hit_frequency(&self) -> f64 {
        if self.spins == 0 {
            return 0.0;
        }
        self.winning_spins as f64 / self.spins as f64
    }
}

pub fn simulate<R: Rng + ?Sized>(
    config: &GameConfig,
    bet: &BetContext,
    spins: u64,
    rng: &mut R,
) -> SlotResult<SimulationReport> {
    let stake = bet
        .total_bet()
        .ok_or_else(|| SlotError::invalid("total bet overflows"))?;
    let mut report = SimulationReport::default();
    for _ in 0..spins {
        let outcome = spin_once(rng, config, bet)?;
        report.spins += 1;
        report.total_wagered = report.total_wagered.saturating_add(stake);
        report.total_paid = report
            .total_paid
            .saturating_add(outcome.payout.total_winnings);
        if outcome.payout.is_win() {
            report.winning_spins += 1;
        }
        for win in &outcome.payout.line_wins {
            *report.line_hits.entry(win.symbol).or_default() += 1;
        }
    }
    Ok(report)
}
