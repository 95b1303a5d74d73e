use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use reelspin_core::{
    derive_hash_hex, simulate, theoretical_rtp, verify_reels, BetContext, GameConfig,
    ProvablyFairRng, Symbol,
};
use reelspin_session::{Session, SpinRequest, SpinResponse};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reelspin", about = "Three-reel slot machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// JSON game config; the built-in 3x3 machine when omitted
    #[arg(long, value_parser, env = "REELSPIN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deposit, pick lines and bets, and spin until you quit
    Play {
        /// Seed for reproducible play
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Spin once with the given stake
    Spin {
        #[arg(long)]
        balance: u64,
        #[arg(long)]
        lines: u32,
        #[arg(long)]
        bet: u64,
        #[arg(long, conflicts_with_all = ["server_seed", "client_seed"])]
        seed: Option<u64>,
        /// Provably-fair server seed; requires --client-seed
        #[arg(long, requires = "client_seed")]
        server_seed: Option<String>,
        /// Provably-fair client seed; requires --server-seed
        #[arg(long, requires = "server_seed")]
        client_seed: Option<String>,
        #[arg(long, default_value_t = 0)]
        nonce: u64,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run many spins and compare the observed return with the exact one
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        #[arg(long, default_value_t = 3)]
        lines: u32,
        #[arg(long, default_value_t = 1)]
        bet: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Check a provably-fair grid, columns as letters, e.g. ABD,CCA,DDB
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        reels: String,
    },
    /// Print the SHA-256 commitment for a server seed
    SeedHash { server_seed: String },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_path(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(GameConfig::reference()),
    }
}

fn parse_reels(s: &str) -> anyhow::Result<Vec<Vec<u8>>> {
    s.split(',')
        .map(|col| {
            col.trim()
                .chars()
                .map(|c| {
                    let sym = c
                        .to_string()
                        .parse::<Symbol>()
                        .with_context(|| format!("in reel {col:?}"))?;
                    Ok::<u8, anyhow::Error>(sym.to_index())
                })
                .collect()
        })
        .collect()
}

fn print_spin<W: Write>(out: &mut W, resp: &SpinResponse) -> io::Result<()> {
    for row in &resp.rows {
        writeln!(out, "{row}")?;
    }
    if resp.line_wins.is_empty() {
        writeln!(out, "No winning lines.")?;
    } else {
        for win in &resp.line_wins {
            writeln!(out, "Line {}: {} pays ${}", win.line, win.symbol, win.winnings)?;
        }
    }
    writeln!(
        out,
        "Bet ${}, won ${}. Balance ${}.",
        resp.total_bet, resp.winnings, resp.balance
    )
}

/// Reads a non-negative integer, asking again until one arrives.
/// `None` on end of input.
fn prompt_number<B: BufRead, W: Write>(
    input: &mut B,
    out: &mut W,
    prompt: &str,
) -> anyhow::Result<Option<u64>> {
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<u64>() {
            Ok(n) => return Ok(Some(n)),
            Err(_) => writeln!(out, "Please enter a number.")?,
        }
    }
}

fn play<R: Rng, B: BufRead, W: Write>(
    config: GameConfig,
    rng: &mut R,
    input: &mut B,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let limits = session.config().limits();

    loop {
        let Some(amount) = prompt_number(input, out, "What would you like to deposit? $")? else {
            return Ok(());
        };
        match session.deposit(amount) {
            Ok(_) => break,
            Err(e) => writeln!(out, "{e}")?,
        }
    }

    loop {
        writeln!(out, "Current balance is ${}", session.balance())?;
        let lines_prompt = format!("Enter the number of lines to bet on (1-{})? ", limits.max_lines);
        let Some(lines) = prompt_number(input, out, &lines_prompt)? else {
            break;
        };
        let Some(bet) = prompt_number(input, out, "What would you like to bet on each line? $")?
        else {
            break;
        };
        let lines = u32::try_from(lines).unwrap_or(u32::MAX);
        let total_bet = match session.validate_bet(lines, bet) {
            Ok(ctx) => ctx.total_bet().unwrap_or(u64::MAX),
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        writeln!(out, "You are betting ${bet} on {lines} lines. Total bet is ${total_bet}.")?;
        let request = SpinRequest {
            lines,
            bet_per_line: bet,
        };
        match session.play(&request, rng) {
            Ok(resp) => print_spin(out, &resp)?,
            Err(e) if e.is_recoverable() => {
                writeln!(out, "{e}")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        if session.balance() < limits.min_bet {
            writeln!(out, "You are out of funds.")?;
            break;
        }
        write!(out, "Press enter to spin again (q to quit). ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 || line.trim().eq_ignore_ascii_case("q") {
            break;
        }
    }

    writeln!(
        out,
        "You left with ${} after {} spins (wagered ${}, won ${}).",
        session.balance(),
        session.history().len(),
        session.total_wagered(),
        session.total_won()
    )?;
    Ok(())
}

fn spin_once_cli<R: Rng>(
    config: GameConfig,
    balance: u64,
    request: SpinRequest,
    rng: &mut R,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = Session::with_balance(config, balance);
    let resp = match session.play(&request, rng) {
        Ok(resp) => resp,
        Err(e) => {
            if e.is_recoverable() {
                warn!("spin rejected: {e}");
            }
            return Err(e.into());
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        print_spin(&mut io::stdout().lock(), &resp)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Play { seed } => {
            let mut rng = match seed {
                Some(seed) => ChaCha20Rng::seed_from_u64(seed),
                None => ChaCha20Rng::from_entropy(),
            };
            play(config, &mut rng, &mut io::stdin().lock(), &mut io::stdout().lock())?;
        }
        Commands::Spin {
            balance,
            lines,
            bet,
            seed,
            server_seed,
            client_seed,
            nonce,
            json,
        } => {
            let request = SpinRequest {
                lines,
                bet_per_line: bet,
            };
            match (server_seed, client_seed) {
                (Some(server_seed), Some(client_seed)) => {
                    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
                    info!(
                        server_seed_hash = %rng.server_seed_hash_hex(),
                        client_seed = rng.client_seed(),
                        nonce = rng.nonce(),
                        "provably-fair spin"
                    );
                    spin_once_cli(config, balance, request, &mut rng, json)?;
                }
                _ => {
                    let mut rng = match seed {
                        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
                        None => ChaCha20Rng::from_entropy(),
                    };
                    spin_once_cli(config, balance, request, &mut rng, json)?;
                }
            }
        }
        Commands::Simulate {
            spins,
            lines,
            bet,
            seed,
        } => {
            let bet = BetContext::new(lines, bet);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let report = simulate(&config, &bet, spins, &mut rng)?;
            let exact = theoretical_rtp(config.table(), config.grid().cols);
            println!("spins          {}", report.spins);
            println!("wagered        {}", report.total_wagered);
            println!("paid           {}", report.total_paid);
            println!("hit frequency  {:.4}", report.hit_frequency());
            println!("rtp            {:.4} (exact {:.4})", report.rtp(), exact);
            for (symbol, hits) in &report.line_hits {
                println!("line hits {symbol}    {hits}");
            }
        }
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            reels,
        } => {
            let expected = parse_reels(&reels)?;
            if verify_reels(&server_seed, &client_seed, nonce, &config, &expected)? {
                println!("OK: reels match seed hash {}", derive_hash_hex(server_seed.as_bytes()));
            } else {
                bail!("reels do not match the given seeds");
            }
        }
        Commands::SeedHash { server_seed } => {
            println!("{}", derive_hash_hex(server_seed.as_bytes()));
        }
    }

    Ok(())
}
