//! Match command - play one repeated match between two strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play(), report_results()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;

use evoarena_core::GameDefinition;
use evoarena_tournament::{run_match, MatchResult};

use crate::settings::{check_noise, create_rng, Settings};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Game name or abbreviation (pd, hd, sh, ...)
    #[arg(long, default_value = "PD")]
    pub game: String,

    /// First strategy
    #[arg(long, value_name = "NAME")]
    pub a: String,

    /// Second strategy
    #[arg(long, value_name = "NAME")]
    pub b: String,

    /// Rounds in the match (defaults to the config's default_rounds)
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Probability of flipping each intended action (0.0-0.2)
    #[arg(long, default_value = "0.0")]
    pub noise: f64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
pub fn run(args: MatchArgs, settings: &Settings, seed: Option<u64>) -> Result<()> {
    check_noise(args.noise)?;
    let game = settings.game(&args.game)?;
    let rounds = settings.rounds_or_default(args.rounds);

    tracing::info!(
        "Starting match: {} vs {} in {} ({} rounds, noise={})",
        args.a,
        args.b,
        game.name(),
        rounds,
        args.noise
    );

    let result = play(&args, settings, game, rounds, seed)?;
    report_results(&result, game, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play(
    args: &MatchArgs,
    settings: &Settings,
    game: &GameDefinition,
    rounds: u32,
    seed: Option<u64>,
) -> Result<MatchResult> {
    let players = settings.roster(&[args.a.clone(), args.b.clone()])?;
    let mut rng = create_rng(seed);

    run_match(&players[0], &players[1], game, rounds, args.noise, &mut rng)
        .with_context(|| format!("Match {} vs {} failed", args.a, args.b))
}

fn report_results(result: &MatchResult, game: &GameDefinition, args: &MatchArgs) -> Result<()> {
    if args.json {
        print_json_results(result, game)
    } else {
        print_text_results(result, game)
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn print_text_results(result: &MatchResult, game: &GameDefinition) -> Result<()> {
    println!("=== {} vs {} ({}) ===", result.player_a, result.player_b, game.name());
    println!("{:>5}  {:<12} {:<12} {:>7} {:>7}", "round", result.player_a, result.player_b, "pay A", "pay B");

    for (i, round) in result.rounds.iter().enumerate() {
        let flip_a = if round.intended_a != round.actual_a { "*" } else { "" };
        let flip_b = if round.intended_b != round.actual_b { "*" } else { "" };
        println!(
            "{:>5}  {:<12} {:<12} {:>7} {:>7}",
            i + 1,
            format!("{}{}", game.label(round.actual_a)?, flip_a),
            format!("{}{}", game.label(round.actual_b)?, flip_b),
            round.payoff_a,
            round.payoff_b
        );
    }

    println!();
    println!("Totals: {} {} - {} {}", result.player_a, result.total_a, result.total_b, result.player_b);
    println!(
        "Cooperation: {:.1}% / {:.1}%",
        result.cooperation_rate_a() * 100.0,
        result.cooperation_rate_b() * 100.0
    );
    if result.noise_flips() > 0 {
        println!("Noise flips: {} (marked *)", result.noise_flips());
    }
    Ok(())
}

fn print_json_results(result: &MatchResult, game: &GameDefinition) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonRound<'a> {
        intended_a: &'a str,
        intended_b: &'a str,
        actual_a: &'a str,
        actual_b: &'a str,
        payoff_a: f64,
        payoff_b: f64,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        game: &'a str,
        player_a: &'a str,
        player_b: &'a str,
        total_a: f64,
        total_b: f64,
        noise_flips: usize,
        rounds: Vec<JsonRound<'a>>,
    }

    let rounds = result
        .rounds
        .iter()
        .map(|r| {
            Ok(JsonRound {
                intended_a: game.label(r.intended_a)?,
                intended_b: game.label(r.intended_b)?,
                actual_a: game.label(r.actual_a)?,
                actual_b: game.label(r.actual_b)?,
                payoff_a: r.payoff_a,
                payoff_b: r.payoff_b,
            })
        })
        .collect::<evoarena_core::Result<Vec<_>>>()?;

    let output = JsonOutput {
        game: game.name(),
        player_a: &result.player_a,
        player_b: &result.player_b,
        total_a: result.total_a,
        total_b: result.total_b,
        noise_flips: result.noise_flips(),
        rounds,
    };

    let json = serde_json::to_string_pretty(&output)?;
    println!("{}", json);

    Ok(())
}
