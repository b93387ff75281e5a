//! Evolution command - evolve a population of strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_evolution_config(), run_evolution(), save_results()
//! - Level 3: progress bar, CSV rows
//! - Level 4: file I/O, formatting utilities
//!
//! The engine lives in `evoarena-evolve`, which is behind the `evolve`
//! cargo feature. Without it the command reports a missing dependency.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::settings::Settings;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SelectionArg {
    Tournament,
    Roulette,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScopeArg {
    /// Strategies currently in the population
    Population,
    /// Every strategy in the roster
    Pool,
}

#[derive(Args)]
pub struct EvolveArgs {
    /// Game name or abbreviation (pd, hd, sh, ...)
    #[arg(long, default_value = "PD")]
    pub game: String,

    /// Comma-separated strategy pool (defaults to the configured roster)
    #[arg(long, value_delimiter = ',')]
    pub strategies: Vec<String>,

    /// Population size
    #[arg(long, default_value = "100")]
    pub population: usize,

    /// Number of generations to run
    #[arg(long, default_value = "30")]
    pub generations: usize,

    /// Rounds per fitness match
    #[arg(long, default_value = "50")]
    pub rounds: u32,

    /// Matches per fitness pairing
    #[arg(long, default_value = "1")]
    pub repeats: u32,

    /// Probability of flipping each intended action (0.0-0.2)
    #[arg(long, default_value = "0.0")]
    pub noise: f64,

    /// Mutation rate (0.0-1.0)
    #[arg(long, default_value = "0.1")]
    pub mutation_rate: f64,

    /// Crossover rate (0.0-1.0)
    #[arg(long, default_value = "0.7")]
    pub crossover_rate: f64,

    /// Number of elite individuals to preserve (0 disables elitism)
    #[arg(long, default_value = "2")]
    pub elitism: usize,

    /// Parent selection mechanism
    #[arg(long, value_enum, default_value = "tournament")]
    pub selection: SelectionArg,

    /// Individuals per selection tournament
    #[arg(long, default_value = "3")]
    pub tournament_size: usize,

    /// Opponents in the fitness tournament
    #[arg(long, value_enum, default_value = "population")]
    pub scope: ScopeArg,

    /// Run fitness pairings in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output directory for results
    #[arg(long, default_value = "evolution_output")]
    pub output: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// 1. Build the engine from settings and arguments
/// 2. Run the generation loop with a progress bar
/// 3. Save generation statistics
/// 4. Print a summary
#[cfg(feature = "evolve")]
pub fn run(args: EvolveArgs, settings: &Settings, seed: Option<u64>) -> Result<()> {
    use anyhow::Context;
    use evoarena_evolve::EvolutionEngine;

    use crate::settings::{check_noise, create_rng};

    check_noise(args.noise)?;
    let game = settings.game(&args.game)?;
    let pool = settings.roster(&args.strategies)?;
    let config = enabled::build_evolution_config(&args);

    let engine = EvolutionEngine::new(pool, config, game.clone())
        .context("Invalid evolution configuration")?;
    let mut rng = create_rng(seed);

    let result = enabled::run_evolution(&engine, &args, &mut rng)?;

    enabled::save_results(&result, &engine, &args)?;
    enabled::print_summary(&result, game.name(), &args)
}

#[cfg(not(feature = "evolve"))]
pub fn run(args: EvolveArgs, _settings: &Settings, _seed: Option<u64>) -> Result<()> {
    tracing::error!("Evolution requested for {} but this build has no evolution engine", args.game);
    Err(evoarena_core::ArenaError::MissingDependency(
        "evoarena-evolve (rebuild evoarena-cli with `--features evolve`)".to_string(),
    )
    .into())
}

#[cfg(feature = "evolve")]
mod enabled {
    use std::path::Path;

    use anyhow::{Context, Result};
    use indicatif::{ProgressBar, ProgressStyle};
    use rand_chacha::ChaCha8Rng;

    use evoarena_evolve::{
        EvolutionConfig, EvolutionEngine, EvolutionResult, FitnessScope, GenerationStats, Selection,
    };
    use evoarena_tournament::TournamentConfig;

    use super::{EvolveArgs, ScopeArg, SelectionArg};

    // ========================================================================
    // LEVEL 2 - PHASES
    // ========================================================================

    pub(super) fn build_evolution_config(args: &EvolveArgs) -> EvolutionConfig {
        let selection = match args.selection {
            SelectionArg::Tournament => Selection::Tournament {
                size: args.tournament_size,
            },
            SelectionArg::Roulette => Selection::Roulette,
        };
        let scope = match args.scope {
            ScopeArg::Population => FitnessScope::Population,
            ScopeArg::Pool => FitnessScope::Pool,
        };

        EvolutionConfig {
            population_size: args.population,
            generations: args.generations,
            mutation_rate: args.mutation_rate,
            crossover_rate: args.crossover_rate,
            elitism: args.elitism,
            selection,
            fitness: TournamentConfig::new(args.rounds)
                .with_repeats(args.repeats)
                .with_noise(args.noise)
                .with_parallel(args.parallel),
            scope,
        }
    }

    /// Run the evolution loop, advancing a progress bar each generation
    pub(super) fn run_evolution(
        engine: &EvolutionEngine,
        args: &EvolveArgs,
        rng: &mut ChaCha8Rng,
    ) -> Result<EvolutionResult> {
        let bar = create_progress_bar(args.generations as u64, args.json)?;

        let mut progress = |stats: &GenerationStats| {
            let leader = stats
                .dominant()
                .map(|(name, count)| format!("{} x{}", name, count))
                .unwrap_or_default();
            bar.set_message(format!("best={:.1} mean={:.1} {}", stats.best_fitness, stats.mean_fitness, leader));
            bar.inc(1);
        };

        let result = engine.run(rng, &mut progress).context("Evolution failed")?;
        bar.finish_with_message("done");

        Ok(result)
    }

    /// Save generation statistics to the output directory
    pub(super) fn save_results(
        result: &EvolutionResult,
        engine: &EvolutionEngine,
        args: &EvolveArgs,
    ) -> Result<()> {
        std::fs::create_dir_all(&args.output).context("Failed to create output directory")?;

        let names: Vec<&str> = engine.pool().iter().map(|t| t.name()).collect();
        save_generation_csv(&result.stats, &names, &args.output)?;
        save_summary(result, engine, &args.output)?;

        Ok(())
    }

    pub(super) fn print_summary(result: &EvolutionResult, game: &str, args: &EvolveArgs) -> Result<()> {
        if args.json {
            return print_json_results(result, game);
        }

        println!("\n=== Evolution Complete ({}) ===", game);
        println!("Generations: {}", result.generations_run());
        if let Some(last) = result.stats.last() {
            println!("Final best fitness: {:.2}", last.best_fitness);
            println!("Final mean fitness: {:.2}", last.mean_fitness);
        }
        println!("\nFinal population:");
        for (i, ranked) in result.ranking.iter().enumerate() {
            println!(
                "{:>4}  {:<22} fitness {:>10.2}  x{}",
                i + 1,
                ranked.name,
                ranked.fitness,
                ranked.count
            );
        }
        println!("\nOutput directory: {}", args.output.display());

        Ok(())
    }

    // ========================================================================
    // LEVEL 3 - STEPS
    // ========================================================================

    fn create_progress_bar(generations: u64, hidden: bool) -> Result<ProgressBar> {
        if hidden {
            return Ok(ProgressBar::hidden());
        }
        let bar = ProgressBar::new(generations);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} gen {pos}/{len} {msg}")
                .context("Invalid progress bar template")?,
        );
        Ok(bar)
    }

    /// One row per generation: counts for every pool strategy, 0 when absent
    pub(crate) fn generation_csv(stats: &[GenerationStats], names: &[&str]) -> String {
        let mut content = String::from("generation,best_fitness,mean_fitness");
        for name in names {
            content.push(',');
            content.push_str(name);
        }
        content.push('\n');

        for record in stats {
            content.push_str(&format!(
                "{},{:.4},{:.4}",
                record.generation + 1,
                record.best_fitness,
                record.mean_fitness
            ));
            for name in names {
                content.push_str(&format!(",{}", record.frequency(name)));
            }
            content.push('\n');
        }
        content
    }

    // ========================================================================
    // LEVEL 4 - FILE I/O
    // ========================================================================

    fn save_generation_csv(stats: &[GenerationStats], names: &[&str], output: &Path) -> Result<()> {
        let path = output.join("generations.csv");
        std::fs::write(&path, generation_csv(stats, names))
            .context("Failed to write generation statistics")?;
        tracing::info!("Saved generation statistics to {}", path.display());
        Ok(())
    }

    fn save_summary(result: &EvolutionResult, engine: &EvolutionEngine, output: &Path) -> Result<()> {
        #[derive(serde::Serialize)]
        struct Summary<'a> {
            finished_at: chrono::DateTime<chrono::Utc>,
            config: &'a EvolutionConfig,
            pool: Vec<&'a str>,
            ranking: &'a [evoarena_evolve::RankedStrategy],
        }

        let summary = Summary {
            finished_at: chrono::Utc::now(),
            config: engine.config(),
            pool: engine.pool().iter().map(|t| t.name()).collect(),
            ranking: &result.ranking,
        };

        let path = output.join("summary.json");
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(&path, json).context("Failed to write evolution summary")?;
        tracing::info!("Saved summary to {}", path.display());
        Ok(())
    }

    fn print_json_results(result: &EvolutionResult, game: &str) -> Result<()> {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            game: &'a str,
            generations_run: usize,
            best_fitness_history: Vec<f64>,
            mean_fitness_history: Vec<f64>,
            final_frequencies: Option<&'a std::collections::BTreeMap<String, usize>>,
            ranking: &'a [evoarena_evolve::RankedStrategy],
        }

        let output = JsonOutput {
            game,
            generations_run: result.generations_run(),
            best_fitness_history: result.best_fitness_history(),
            mean_fitness_history: result.mean_fitness_history(),
            final_frequencies: result.stats.last().map(|s| &s.frequencies),
            ranking: &result.ranking,
        };

        let json = serde_json::to_string_pretty(&output)?;
        println!("{}", json);

        Ok(())
    }

}

#[cfg(all(test, not(feature = "evolve")))]
mod tests {
    use super::*;
    use clap::Parser;
    use evoarena_core::ArenaError;

    #[derive(clap::Parser)]
    struct Harness {
        #[command(flatten)]
        args: EvolveArgs,
    }

    #[test]
    fn test_evolve_without_engine_is_missing_dependency() {
        let output = std::env::temp_dir().join(format!("evoarena-no-engine-{}", std::process::id()));
        let output_arg = output.to_string_lossy().into_owned();
        let harness = Harness::parse_from(["evoarena", "--generations", "2", "--output", &output_arg]);

        let err = run(harness.args, &Settings::default(), Some(42)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ArenaError>(),
            Some(ArenaError::MissingDependency(_))
        ));
        assert!(!output.exists(), "no results should be written");
    }
}
