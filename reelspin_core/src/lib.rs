pub mod config;
pub mod engine;
pub mod error;
pub mod paytable;
pub mod reels;
pub mod rng;
pub mod simulate;
pub mod symbols;

pub use crate::config::{BetLimits, GameConfig, GridSpec, COLS, MAX_BET, MAX_LINES, MIN_BET, ROWS};
pub use crate::engine::{
    compute_reel_window, evaluate, spin_once, spin_with_seeds, verify_reels, BetContext, LineWin,
    PayoutResult, SpinOutcome,
};
pub use crate::error::{SlotError, SlotResult};
pub use crate::paytable::{SymbolCounts, SymbolTable, SymbolValues};
pub use crate::reels::{generate, SpinPool};
pub use crate::rng::{derive_hash_hex, seeded_rng, ProvablyFairRng};
pub use crate::simulate::{simulate, theoretical_rtp, SimulationReport};
pub use crate::symbols::{Grid, Symbol};
