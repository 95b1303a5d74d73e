use reelspin_core::{spin_once, BetContext, GameConfig, ProvablyFairRng};

fn main() -> Result<(), reelspin_core::SlotError> {
    // Example end-to-end spin
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let nonce = 1u64;
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    let config = GameConfig::reference();
    let outcome = spin_once(&mut rng, &config, &BetContext::new(3, 1))?;
    println!(
        "server_seed_hash={} winnings={}\n{}",
        rng.server_seed_hash_hex(),
        outcome.payout.total_winnings,
        outcome.grid
    );
    Ok(())
}
