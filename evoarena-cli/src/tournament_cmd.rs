//! Tournament command - round-robin leaderboard
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), report_results()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;

use evoarena_tournament::{run_tournament, TournamentConfig, TournamentResult};

use crate::settings::{check_noise, create_rng, Settings};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TournamentArgs {
    /// Game name or abbreviation (pd, hd, sh, ...)
    #[arg(long, default_value = "PD")]
    pub game: String,

    /// Comma-separated strategy names (defaults to the configured roster)
    #[arg(long, value_delimiter = ',')]
    pub strategies: Vec<String>,

    /// Rounds per match (defaults to the config's default_rounds)
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Matches per pairing
    #[arg(long, default_value = "1")]
    pub repeats: u32,

    /// Probability of flipping each intended action (0.0-0.2)
    #[arg(long, default_value = "0.0")]
    pub noise: f64,

    /// Run pairings in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
pub fn run(args: TournamentArgs, settings: &Settings, seed: Option<u64>) -> Result<()> {
    check_noise(args.noise)?;
    let game = settings.game(&args.game)?;
    let roster = settings.roster(&args.strategies)?;
    let config = build_config(&args, settings);
    let mut rng = create_rng(seed);

    let result = run_tournament(&roster, game, &config, &mut rng)
        .with_context(|| format!("Tournament in {} failed", game.name()))?;

    report_results(&result, game.name(), &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &TournamentArgs, settings: &Settings) -> TournamentConfig {
    TournamentConfig::new(settings.rounds_or_default(args.rounds))
        .with_repeats(args.repeats)
        .with_noise(args.noise)
        .with_parallel(args.parallel)
}

fn report_results(result: &TournamentResult, game: &str, args: &TournamentArgs) -> Result<()> {
    if args.json {
        print_json_results(result, game)
    } else {
        print_leaderboard(result, game);
        Ok(())
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn print_leaderboard(result: &TournamentResult, game: &str) {
    println!(
        "=== Tournament: {} ({} strategies, {} pairings, {} rounds x {}) ===",
        game,
        result.entries.len(),
        result.pairing_count(),
        result.config.rounds_per_match,
        result.config.repeats
    );
    println!("{:>4}  {:<22} {:>10} {:>12} {:>8}", "rank", "strategy", "total", "per opponent", "matches");

    for (i, entry) in result.entries.iter().enumerate() {
        println!(
            "{:>4}  {:<22} {:>10.2} {:>12.2} {:>8}",
            i + 1,
            entry.name,
            entry.total_score,
            entry.average_per_opponent(),
            entry.matches_played
        );
    }

    if let Some(winner) = result.winner() {
        println!("\nWinner: {} ({:.2})", winner.name, winner.total_score);
    }
}

fn print_json_results(result: &TournamentResult, game: &str) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonEntry<'a> {
        rank: usize,
        name: &'a str,
        total_score: f64,
        matches_played: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        game: &'a str,
        config: &'a TournamentConfig,
        pairings: usize,
        ranking: Vec<JsonEntry<'a>>,
    }

    let output = JsonOutput {
        game,
        config: &result.config,
        pairings: result.pairing_count(),
        ranking: result
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| JsonEntry {
                rank: i + 1,
                name: &e.name,
                total_score: e.total_score,
                matches_played: e.matches_played,
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output)?;
    println!("{}", json);

    Ok(())
}
