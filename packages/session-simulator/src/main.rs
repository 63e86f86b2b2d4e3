//! Session Simulator CLI - runs a complete hashtag session in memory.
//!
//! Simulated players answer their prompts after a random delay, agreeing on
//! the trial's tag with a configurable probability. Rounds are exported to a
//! CSV log in the output directory and the leaderboard is printed at the end.

mod channel;
mod output;
mod players;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use channel::SimulatedChannel;
use clap::Parser;
use hashtag_backend::domain::{ChannelId, PlayerId};
use hashtag_backend::services::StartReport;
use hashtag_backend::{build_state, GameConfig};
use output::TallySink;
use players::Behavior;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "session-simulator")]
#[command(about = "In-memory hashtag session with simulated players")]
struct Args {
    /// Number of simulated players (must be even)
    #[arg(short, long, default_value = "20")]
    players: usize,

    /// Number of trials
    #[arg(short, long, default_value = "5")]
    trials: u32,

    /// Neighborhood size on the ring
    #[arg(short = 'k', long, default_value = "4")]
    neighbor_size: usize,

    /// Pairing seed
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Seed for player behavior (defaults to the pairing seed)
    #[arg(long)]
    player_seed: Option<u64>,

    /// Round timeout in milliseconds
    #[arg(long, default_value = "500")]
    timeout_ms: u64,

    /// Upper bound of a player's reply delay in milliseconds
    #[arg(long, default_value = "200")]
    think_ms: u64,

    /// Probability a player answers with the trial's shared tag
    #[arg(long, default_value = "0.6")]
    agree_rate: f64,

    /// Probability a player never answers
    #[arg(long, default_value = "0.1")]
    silence_rate: f64,

    /// Directory for the round log
    #[arg(long, default_value = "./simulation-results")]
    output_dir: PathBuf,

    /// Also write the full leaderboard as JSON to this file
    #[arg(long)]
    leaderboard_json: Option<PathBuf>,

    /// Number of leaderboard entries to print
    #[arg(long, default_value = "3")]
    top: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Silent by default; RUST_LOG wins when set
    let default_filter = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    for (name, rate) in [("agree-rate", args.agree_rate), ("silence-rate", args.silence_rate)] {
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!("--{name} must be between 0 and 1, got {rate}").into());
        }
    }

    let channel = ChannelId::from("C-SIM");
    let roster: Vec<PlayerId> = (1..=args.players)
        .map(|i| PlayerId::new(format!("sim-{i:03}")))
        .collect();

    let config = GameConfig {
        min_players: args.players,
        trials: args.trials,
        neighbor_size: args.neighbor_size,
        round_timeout: Duration::from_millis(args.timeout_ms),
        seed: args.seed,
        game_channel: Some(channel.clone()),
        export_dir: args.output_dir.clone(),
        ..GameConfig::default()
    };

    let (messenger, prompts) = SimulatedChannel::new(channel.clone(), roster);
    let messenger = Arc::new(messenger);
    let sink = Arc::new(TallySink::new(&args.output_dir));
    let state = build_state()
        .with_config(config)
        .with_messenger(messenger.clone())
        .with_record_sink(sink.clone())
        .build()?;
    let coordinator = Arc::clone(state.coordinator());

    let behavior = Behavior {
        agree_rate: args.agree_rate,
        silence_rate: args.silence_rate,
        max_think: Duration::from_millis(args.think_ms),
    };
    let driver = tokio::spawn(players::run(
        Arc::clone(&coordinator),
        prompts,
        behavior,
        args.player_seed.unwrap_or(args.seed),
    ));

    let start = Instant::now();
    let mut progress = coordinator.subscribe();
    match state.bot().handle_member_joined(&channel).await? {
        StartReport::Started(_) => {}
        StartReport::Failed(code) => {
            return Err(format!("session failed to start ({code})").into());
        }
        other => return Err(format!("session did not start: {other:?}").into()),
    }
    info!(players = args.players, trials = args.trials, "Session running");

    progress.wait_for(|p| p.finished).await?;
    driver.abort();
    let elapsed = start.elapsed();

    if let Some(path) = sink.csv_path() {
        println!("Round log written to: {}", path.display());
    }
    if let Some(path) = &args.leaderboard_json {
        output::write_leaderboard_json(path, &coordinator.standings())?;
        println!("Leaderboard written to: {}", path.display());
    }

    output::print_summary(
        &sink.outcomes(),
        &messenger.stats(),
        &coordinator.top(args.top),
        elapsed,
    );

    Ok(())
}
