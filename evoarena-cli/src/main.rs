//! EvoArena CLI - Command-line interface
//!
//! Commands:
//! - games: List configured games and payoff matrices
//! - strategies: List registered strategies
//! - match: Play one repeated match
//! - tournament: Run a round-robin tournament
//! - evolve: Evolve a population of strategies

mod catalog;
mod evolve;
mod match_cmd;
mod settings;
mod tournament_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evolve::EvolveArgs;
use match_cmd::MatchArgs;
use settings::Settings;
use tournament_cmd::TournamentArgs;

#[derive(Parser)]
#[command(name = "evoarena")]
#[command(about = "EvoArena repeated-game tournaments and strategy evolution")]
struct Cli {
    /// JSON file with games, strategy roster and default rounds
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List games and their payoff matrices
    Games,
    /// List available strategies
    Strategies,
    /// Play one repeated match between two strategies
    Match(MatchArgs),
    /// Run a round-robin tournament
    Tournament(TournamentArgs),
    /// Evolve a population of strategies
    Evolve(EvolveArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Games => catalog::run_games(&settings),
        Commands::Strategies => catalog::run_strategies(&settings),
        Commands::Match(args) => match_cmd::run(args, &settings, cli.seed),
        Commands::Tournament(args) => tournament_cmd::run(args, &settings, cli.seed),
        Commands::Evolve(args) => evolve::run(args, &settings, cli.seed),
    }
}
