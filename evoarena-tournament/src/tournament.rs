//! Tournament execution - round-robin with self-play
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::BTreeMap;

use evoarena_core::{ArenaError, GameDefinition, Result, StrategyTemplate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::TournamentConfig;
use crate::match_play::{play_pairing, PairingResult};

/// Aggregate of one strategy across every pairing it took part in
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TournamentEntry {
    pub name: String,
    /// Sum of averaged pairing totals
    pub total_score: f64,
    /// Matches played, counting every repeat
    pub matches_played: u32,
    /// Averaged score against each opponent (self included)
    pub opponents: BTreeMap<String, f64>,
}

impl TournamentEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_score: 0.0,
            matches_played: 0,
            opponents: BTreeMap::new(),
        }
    }

    /// Score against a specific opponent
    pub fn score_against(&self, opponent: &str) -> Option<f64> {
        self.opponents.get(opponent).copied()
    }

    /// Mean score per distinct opponent
    pub fn average_per_opponent(&self) -> f64 {
        if self.opponents.is_empty() {
            0.0
        } else {
            self.total_score / self.opponents.len() as f64
        }
    }
}

/// Result of a tournament
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TournamentResult {
    /// Ranking by total score (descending), ties broken by name (ascending)
    pub entries: Vec<TournamentEntry>,
    /// Every pairing in pairing order
    pub pairings: Vec<PairingResult>,
    /// Configuration the tournament ran with
    pub config: TournamentConfig,
}

impl TournamentResult {
    /// Get winner (top entry)
    pub fn winner(&self) -> Option<&TournamentEntry> {
        self.entries.first()
    }

    /// Get top N performers
    pub fn top_n(&self, n: usize) -> &[TournamentEntry] {
        let n = n.min(self.entries.len());
        &self.entries[..n]
    }

    /// Get entry for a strategy
    pub fn entry_for(&self, name: &str) -> Option<&TournamentEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// 1-based rank of a strategy
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    pub fn pairing_count(&self) -> usize {
        self.pairings.len()
    }

    /// Pairing between two strategies, in either order
    pub fn pairing(&self, a: &str, b: &str) -> Option<&PairingResult> {
        self.pairings.iter().find(|p| {
            (p.player_a == a && p.player_b == b) || (p.player_a == b && p.player_b == a)
        })
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a round-robin tournament (Level 1 orchestration)
///
/// Every unordered pair of strategies plays, including each strategy
/// against itself, for `n(n+1)/2` pairings. One seed per pairing is drawn
/// from `rng` in pairing order, so sequential and parallel runs agree.
///
/// # Arguments
/// * `strategies` - Participants in the tournament (names must be unique)
/// * `game` - Game every match is played under
/// * `config` - Tournament configuration
/// * `rng` - Random source for noise
pub fn run_tournament<R: Rng + ?Sized>(
    strategies: &[StrategyTemplate],
    game: &GameDefinition,
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<TournamentResult> {
    config.validate()?;
    validate_participants(strategies)?;

    let pairings = generate_round_robin_pairings(strategies.len());
    let seeds: Vec<u64> = pairings.iter().map(|_| rng.gen()).collect();

    tracing::info!(
        "Starting tournament: {} strategies, {} pairings, game={}, rounds={}, repeats={}, noise={}",
        strategies.len(),
        pairings.len(),
        game.name(),
        config.rounds_per_match,
        config.repeats,
        config.noise
    );

    let results = execute_all_pairings(strategies, game, &pairings, &seeds, config)?;
    let entries = compute_standings(strategies, &pairings, &results);

    if let Some(winner) = entries.first() {
        tracing::info!("Tournament winner: {} ({:.2})", winner.name, winner.total_score);
    }

    Ok(TournamentResult {
        entries,
        pairings: results,
        config: config.clone(),
    })
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Execute every pairing, each on its own seeded rng
fn execute_all_pairings(
    strategies: &[StrategyTemplate],
    game: &GameDefinition,
    pairings: &[(usize, usize)],
    seeds: &[u64],
    config: &TournamentConfig,
) -> Result<Vec<PairingResult>> {
    let run = |(&(i, j), &seed): (&(usize, usize), &u64)| -> Result<PairingResult> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = play_pairing(
            &strategies[i],
            &strategies[j],
            game,
            config.rounds_per_match,
            config.repeats,
            config.noise,
            &mut rng,
        )?;
        tracing::debug!(
            "Pairing {} vs {}: {:.2}-{:.2}",
            result.player_a,
            result.player_b,
            result.avg_total_a,
            result.avg_total_b
        );
        Ok(result)
    };

    if config.parallel {
        pairings.par_iter().zip(seeds.par_iter()).map(run).collect()
    } else {
        pairings.iter().zip(seeds.iter()).map(run).collect()
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Generate all pairings for round-robin, self-pairings included
fn generate_round_robin_pairings(n: usize) -> Vec<(usize, usize)> {
    let mut pairings = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            pairings.push((i, j));
        }
    }
    pairings
}

fn validate_participants(strategies: &[StrategyTemplate]) -> Result<()> {
    if strategies.is_empty() {
        return Err(ArenaError::config("tournament needs at least one strategy"));
    }

    let mut seen = FxHashSet::default();
    for strategy in strategies {
        if !seen.insert(strategy.name()) {
            return Err(ArenaError::config(format!(
                "strategy '{}' entered twice",
                strategy.name()
            )));
        }
    }
    Ok(())
}

/// Compute final ranking from pairing results
fn compute_standings(
    strategies: &[StrategyTemplate],
    pairings: &[(usize, usize)],
    results: &[PairingResult],
) -> Vec<TournamentEntry> {
    let mut entries: Vec<TournamentEntry> = strategies
        .iter()
        .map(|s| TournamentEntry::new(s.name()))
        .collect();

    for (&(i, j), result) in pairings.iter().zip(results) {
        let repeats = result.repeats();

        if i == j {
            // Both roles belong to the same strategy: counted once, summed
            let combined = result.avg_total_a + result.avg_total_b;
            let entry = &mut entries[i];
            entry.total_score += combined;
            entry.matches_played += repeats;
            entry.opponents.insert(result.player_a.clone(), combined);
        } else {
            entries[i].total_score += result.avg_total_a;
            entries[i].matches_played += repeats;
            entries[i]
                .opponents
                .insert(result.player_b.clone(), result.avg_total_a);

            entries[j].total_score += result.avg_total_b;
            entries[j].matches_played += repeats;
            entries[j]
                .opponents
                .insert(result.player_a.clone(), result.avg_total_b);
        }
    }

    rank_entries(&mut entries);
    entries
}

/// Sort by total score (descending), then name (ascending)
pub(crate) fn rank_entries(entries: &mut [TournamentEntry]) {
    entries.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoarena_core::{Action, BuiltIn};

    fn templates(kinds: &[BuiltIn]) -> Vec<StrategyTemplate> {
        kinds.iter().map(|k| k.template()).collect()
    }

    #[test]
    fn test_generate_round_robin_pairings() {
        let pairings = generate_round_robin_pairings(3);
        assert_eq!(pairings.len(), 6); // 3 * 4 / 2
        assert_eq!(pairings, vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_generate_round_robin_pairings_small() {
        assert!(generate_round_robin_pairings(0).is_empty());
        assert_eq!(generate_round_robin_pairings(1), vec![(0, 0)]);
    }

    #[test]
    fn test_tournament_completeness() {
        let strategies = templates(&BuiltIn::ALL);
        let n = strategies.len();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = run_tournament(
            &strategies,
            &GameDefinition::prisoners_dilemma(),
            &TournamentConfig::new(10),
            &mut rng,
        )
        .unwrap();

        assert_eq!(result.pairing_count(), n * (n + 1) / 2);
        for s in &strategies {
            assert!(result.pairing(s.name(), s.name()).is_some(), "{} missing self-play", s.name());
        }
        for entry in &result.entries {
            // One pairing per opponent including itself
            assert_eq!(entry.opponents.len(), n);
            assert_eq!(entry.matches_played, n as u32);
        }
    }

    #[test]
    fn test_tournament_scores() {
        // 5 rounds of PD:
        // AC-AC: 15/15 -> AC self = 30
        // AC-AD: 0/25
        // AD-AD: 5/5  -> AD self = 10
        let strategies = templates(&[BuiltIn::AlwaysCooperate, BuiltIn::AlwaysDefect]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = run_tournament(
            &strategies,
            &GameDefinition::prisoners_dilemma(),
            &TournamentConfig::new(5),
            &mut rng,
        )
        .unwrap();

        let ad = result.entry_for("AlwaysDefect").unwrap();
        let ac = result.entry_for("AlwaysCooperate").unwrap();
        assert_eq!(ad.total_score, 35.0);
        assert_eq!(ac.total_score, 30.0);
        assert_eq!(ad.score_against("AlwaysCooperate"), Some(25.0));
        assert_eq!(ac.score_against("AlwaysCooperate"), Some(30.0));
        assert_eq!(result.winner().unwrap().name, "AlwaysDefect");
        assert_eq!(result.rank_of("AlwaysCooperate"), Some(2));
    }

    #[test]
    fn test_repeats_average_without_noise() {
        let strategies = templates(&[BuiltIn::TitForTat, BuiltIn::AlwaysDefect, BuiltIn::Pavlov]);
        let game = GameDefinition::prisoners_dilemma();

        let once = run_tournament(
            &strategies,
            &game,
            &TournamentConfig::new(20),
            &mut ChaCha8Rng::seed_from_u64(1),
        )
        .unwrap();
        let thrice = run_tournament(
            &strategies,
            &game,
            &TournamentConfig::new(20).with_repeats(3),
            &mut ChaCha8Rng::seed_from_u64(2),
        )
        .unwrap();

        for entry in &once.entries {
            let other = thrice.entry_for(&entry.name).unwrap();
            assert_eq!(entry.total_score, other.total_score);
            assert_eq!(other.matches_played, entry.matches_played * 3);
        }
    }

    #[test]
    fn test_ties_broken_by_name() {
        let zeta = StrategyTemplate::from_fn("Zeta", |_: &[Action], _: &[Action]| Action::COOPERATE);
        let alpha = StrategyTemplate::from_fn("Alpha", |_: &[Action], _: &[Action]| Action::COOPERATE);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = run_tournament(
            &[zeta, alpha],
            &GameDefinition::prisoners_dilemma(),
            &TournamentConfig::new(4),
            &mut rng,
        )
        .unwrap();

        assert_eq!(result.entries[0].total_score, result.entries[1].total_score);
        assert_eq!(result.entries[0].name, "Alpha");
        assert_eq!(result.entries[1].name, "Zeta");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let strategies = templates(&BuiltIn::ALL);
        let game = GameDefinition::prisoners_dilemma();
        let config = TournamentConfig::new(30).with_noise(0.1).with_repeats(2);

        let sequential = run_tournament(
            &strategies,
            &game,
            &config,
            &mut ChaCha8Rng::seed_from_u64(99),
        )
        .unwrap();
        let parallel = run_tournament(
            &strategies,
            &game,
            &config.clone().with_parallel(true),
            &mut ChaCha8Rng::seed_from_u64(99),
        )
        .unwrap();

        assert_eq!(sequential.entries, parallel.entries);
        assert_eq!(sequential.pairings, parallel.pairings);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        let game = GameDefinition::prisoners_dilemma();
        let config = TournamentConfig::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        assert!(run_tournament(&[], &game, &config, &mut rng).is_err());

        let twice = templates(&[BuiltIn::TitForTat, BuiltIn::TitForTat]);
        assert!(matches!(
            run_tournament(&twice, &game, &config, &mut rng),
            Err(ArenaError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_action_fails_tournament() {
        let broken = StrategyTemplate::from_fn("Broken", |_: &[Action], _: &[Action]| Action(9));
        let strategies = vec![BuiltIn::TitForTat.template(), broken];
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let err = run_tournament(
            &strategies,
            &GameDefinition::prisoners_dilemma(),
            &TournamentConfig::new(5),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, ArenaError::InvalidAction { .. }));
    }

    #[test]
    fn test_rank_entries() {
        let mut entries = vec![
            TournamentEntry { total_score: 5.0, ..TournamentEntry::new("b") },
            TournamentEntry { total_score: 9.0, ..TournamentEntry::new("c") },
            TournamentEntry { total_score: 5.0, ..TournamentEntry::new("a") },
        ];
        rank_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
