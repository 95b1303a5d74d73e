//! Player-facing session on top of `reelspin_core`: bet validation against
//! the configured limits, an in-memory balance and a log of settled spins.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use reelspin_core::{spin_once, BetContext, GameConfig, LineWin, SlotError, SpinOutcome};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("total bet {total_bet} exceeds balance {balance}")]
    InsufficientBalance { balance: u64, total_bet: u64 },
    #[error(transparent)]
    Slot(#[from] SlotError),
}

impl SessionError {
    /// Errors a prompt loop should answer by asking again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::Invalid(_) | SessionError::InsufficientBalance { .. }
        )
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpinRequest {
    pub lines: u32,
    pub bet_per_line: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpinResponse {
    pub reels: Vec<Vec<u8>>, // column-major symbol indices
    pub rows: Vec<String>,   // rendered left to right, top row first
    pub line_wins: Vec<LineWin>,
    pub total_bet: u64,
    pub winnings: u64,
    pub balance: u64,
}

impl SpinResponse {
    fn from_outcome(outcome: &SpinOutcome, total_bet: u64, balance: u64) -> Self {
        let grid = &outcome.grid;
        let rows = (0..grid.rows())
            .map(|r| {
                grid.row(r)
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect();
        Self {
            reels: grid.to_indices(),
            rows,
            line_wins: outcome.payout.line_wins.clone(),
            total_bet,
            winnings: outcome.payout.total_winnings,
            balance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpinLogEntry {
    pub id: u64,
    pub ts: DateTime<Utc>,
    pub lines: u32,
    pub bet_per_line: u64,
    pub total_bet: u64,
    pub result_reels: Vec<Vec<u8>>,
    pub winnings: u64,
    pub balance_after: u64,
}

/// One player's balance for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    balance: u64,
    history: Vec<SpinLogEntry>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            balance: 0,
            history: Vec::new(),
        }
    }

    pub fn with_balance(config: GameConfig, balance: u64) -> Self {
        Self {
            balance,
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn history(&self) -> &[SpinLogEntry] {
        &self.history
    }

    pub fn deposit(&mut self, amount: u64) -> SessionResult<u64> {
        if amount == 0 {
            return Err(SessionError::Invalid("amount must be greater than 0".into()));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| SessionError::Invalid("deposit too large".into()))?;
        debug!(amount, balance = self.balance, "deposit");
        Ok(self.balance)
    }

    /// Checks a bet against the configured limits and the current balance.
    pub fn validate_bet(&self, lines: u32, bet_per_line: u64) -> SessionResult<BetContext> {
        let limits = self.config.limits();
        if !limits.allows_lines(lines) {
            return Err(SessionError::Invalid(format!(
                "lines must be between 1 and {}",
                limits.max_lines
            )));
        }
        if !limits.allows_bet(bet_per_line) {
            return Err(SessionError::Invalid(format!(
                "bet must be between ${} and ${}",
                limits.min_bet, limits.max_bet
            )));
        }
        let bet = BetContext::new(lines, bet_per_line);
        let total_bet = bet
            .total_bet()
            .ok_or_else(|| SessionError::Invalid("total bet too large".into()))?;
        if total_bet > self.balance {
            return Err(SessionError::InsufficientBalance {
                balance: self.balance,
                total_bet,
            });
        }
        Ok(bet)
    }

    /// Spins once and settles the balance. Nothing is deducted unless the
    /// spin completes; the new balance is written in a single step.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        request: &SpinRequest,
        rng: &mut R,
    ) -> SessionResult<SpinResponse> {
        let bet = self.validate_bet(request.lines, request.bet_per_line)?;
        let total_bet = bet
            .total_bet()
            .ok_or_else(|| SessionError::Invalid("total bet too large".into()))?;
        let outcome = spin_once(rng, &self.config, &bet)?;
        let winnings = outcome.payout.total_winnings;
        let balance_after = (self.balance - total_bet)
            .checked_add(winnings)
            .ok_or_else(|| SessionError::Invalid("balance overflow".into()))?;

        self.balance = balance_after;
        let response = SpinResponse::from_outcome(&outcome, total_bet, balance_after);
        self.history.push(SpinLogEntry {
            id: self.history.len() as u64 + 1,
            ts: Utc::now(),
            lines: bet.lines,
            bet_per_line: bet.bet_per_line,
            total_bet,
            result_reels: response.reels.clone(),
            winnings,
            balance_after,
        });
        debug!(total_bet, winnings, balance = balance_after, "spin settled");
        Ok(response)
    }

    pub fn total_wagered(&self) -> u64 {
        self.history.iter().map(|e| e.total_bet).sum()
    }

    pub fn total_won(&self) -> u64 {
        self.history.iter().map(|e| e.winnings).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn request(lines: u32, bet_per_line: u64) -> SpinRequest {
        SpinRequest {
            lines,
            bet_per_line,
        }
    }

    #[test]
    fn test_deposit() {
        let mut session = Session::new(GameConfig::reference());
        assert!(matches!(session.deposit(0), Err(SessionError::Invalid(_))));
        assert_eq!(session.deposit(50).unwrap(), 50);
        assert_eq!(session.deposit(25).unwrap(), 75);
        assert_eq!(session.balance(), 75);
    }

    #[test]
    fn test_limits_enforced() {
        let session = Session::with_balance(GameConfig::reference(), 1_000);
        assert!(matches!(session.validate_bet(0, 10), Err(SessionError::Invalid(_))));
        assert!(matches!(session.validate_bet(4, 10), Err(SessionError::Invalid(_))));
        assert!(matches!(session.validate_bet(1, 0), Err(SessionError::Invalid(_))));
        assert!(matches!(session.validate_bet(1, 101), Err(SessionError::Invalid(_))));
        assert_eq!(session.validate_bet(3, 100).unwrap(), BetContext::new(3, 100));
    }

    #[test]
    fn test_unaffordable_spin_leaves_balance() {
        let mut session = Session::with_balance(GameConfig::reference(), 20);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let err = session.play(&request(3, 10), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InsufficientBalance {
                balance: 20,
                total_bet: 30
            }
        ));
        assert!(err.is_recoverable());
        assert_eq!(session.balance(), 20);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_balance_settles_per_spin() {
        let mut session = Session::with_balance(GameConfig::reference(), 500);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..20 {
            let before = session.balance();
            if before < 6 {
                break;
            }
            let resp = session.play(&request(3, 2), &mut rng).unwrap();
            assert_eq!(resp.total_bet, 6);
            assert_eq!(resp.balance, before - 6 + resp.winnings);
            assert_eq!(session.balance(), resp.balance);
            assert_eq!(resp.rows.len(), 3);
        }
        let n = session.history().len() as u64;
        assert_eq!(session.total_wagered(), n * 6);
        assert_eq!(
            session.balance(),
            500 - session.total_wagered() + session.total_won()
        );
        let ids: Vec<u64> = session.history().iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=n).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = Session::with_balance(GameConfig::reference(), 100);
        let mut b = Session::with_balance(GameConfig::reference(), 100);
        let ra = a.play(&request(2, 5), &mut ChaCha20Rng::seed_from_u64(3)).unwrap();
        let rb = b.play(&request(2, 5), &mut ChaCha20Rng::seed_from_u64(3)).unwrap();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_response_json_shape() {
        let mut session = Session::with_balance(GameConfig::reference(), 10);
        let resp = session
            .play(&request(1, 1), &mut ChaCha20Rng::seed_from_u64(9))
            .unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["total_bet"], 1);
        assert_eq!(json["reels"].as_array().unwrap().len(), 3);
        let back: SpinResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, resp);
    }
}
