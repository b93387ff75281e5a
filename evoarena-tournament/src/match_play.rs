//! Match play - repeated matches between two strategies
//!
//! Level 2 - Phase-level implementation

use evoarena_core::{GameDefinition, Result, StrategyTemplate};
use rand::Rng;
use serde::Serialize;

use crate::match_runner::{run_match, MatchResult};

/// Result of a pairing (one or more matches between the same two strategies)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairingResult {
    pub player_a: String,
    pub player_b: String,
    /// Average of player A's match totals
    pub avg_total_a: f64,
    /// Average of player B's match totals
    pub avg_total_b: f64,
    /// Individual matches in the order they were played
    pub matches: Vec<MatchResult>,
}

impl PairingResult {
    /// Number of matches played
    pub fn repeats(&self) -> u32 {
        self.matches.len() as u32
    }

    /// Whether both sides expressed the same strategy
    pub fn is_self_pairing(&self) -> bool {
        self.player_a == self.player_b
    }

    pub fn averaged_totals(&self) -> (f64, f64) {
        (self.avg_total_a, self.avg_total_b)
    }
}

/// Play `repeats` matches between two strategies and average their totals.
pub fn play_pairing<R: Rng + ?Sized>(
    strategy_a: &StrategyTemplate,
    strategy_b: &StrategyTemplate,
    game: &GameDefinition,
    rounds: u32,
    repeats: u32,
    noise: f64,
    rng: &mut R,
) -> Result<PairingResult> {
    let matches = (0..repeats)
        .map(|_| run_match(strategy_a, strategy_b, game, rounds, noise, &mut *rng))
        .collect::<Result<Vec<_>>>()?;

    Ok(aggregate_matches(strategy_a.name(), strategy_b.name(), matches))
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Aggregate match results into a pairing result
fn aggregate_matches(player_a: &str, player_b: &str, matches: Vec<MatchResult>) -> PairingResult {
    let count = matches.len();
    let (sum_a, sum_b) = matches
        .iter()
        .fold((0.0, 0.0), |(a, b), m| (a + m.total_a, b + m.total_b));

    let (avg_total_a, avg_total_b) = if count > 0 {
        (sum_a / count as f64, sum_b / count as f64)
    } else {
        (0.0, 0.0)
    };

    PairingResult {
        player_a: player_a.to_string(),
        player_b: player_b.to_string(),
        avg_total_a,
        avg_total_b,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoarena_core::BuiltIn;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_noiseless_repeats_equal_single_match() {
        let game = GameDefinition::prisoners_dilemma();
        let a = BuiltIn::TitForTat.template();
        let b = BuiltIn::AlwaysDefect.template();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let single = run_match(&a, &b, &game, 10, 0.0, &mut rng).unwrap();
        let pairing = play_pairing(&a, &b, &game, 10, 4, 0.0, &mut rng).unwrap();

        assert_eq!(pairing.repeats(), 4);
        assert_eq!(pairing.averaged_totals(), single.totals());
    }

    #[test]
    fn test_average_of_noisy_matches() {
        let game = GameDefinition::prisoners_dilemma();
        let a = BuiltIn::Pavlov.template();
        let b = BuiltIn::TitForTwoTats.template();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let pairing = play_pairing(&a, &b, &game, 50, 5, 0.05, &mut rng).unwrap();

        let expected_a = pairing.matches.iter().map(|m| m.total_a).sum::<f64>() / 5.0;
        let expected_b = pairing.matches.iter().map(|m| m.total_b).sum::<f64>() / 5.0;
        assert!((pairing.avg_total_a - expected_a).abs() < 1e-9);
        assert!((pairing.avg_total_b - expected_b).abs() < 1e-9);
    }

    #[test]
    fn test_self_pairing_flag() {
        let game = GameDefinition::stag_hunt();
        let a = BuiltIn::GrimTrigger.template();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let pairing = play_pairing(&a, &a, &game, 5, 1, 0.0, &mut rng).unwrap();
        assert!(pairing.is_self_pairing());
        assert_eq!(pairing.averaged_totals(), (20.0, 20.0));
    }

    #[test]
    fn test_aggregate_empty() {
        let pairing = aggregate_matches("A", "B", vec![]);
        assert_eq!(pairing.repeats(), 0);
        assert_eq!(pairing.averaged_totals(), (0.0, 0.0));
    }
}
