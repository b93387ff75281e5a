//! Match runner - executes a single repeated match
//!
//! Level 3 - Step-level implementation

use evoarena_core::{Action, ArenaError, GameDefinition, Result, StrategyTemplate};
use rand::Rng;
use serde::Serialize;

use crate::config::{validate_noise, validate_rounds};

/// Upper bound on per-match buffer pre-reservation; longer matches grow as they go
const MAX_RESERVED_ROUNDS: u32 = 4096;

/// One round of a match
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundRecord {
    pub intended_a: Action,
    pub intended_b: Action,
    /// Actions after noise; these are what payoffs and histories use
    pub actual_a: Action,
    pub actual_b: Action,
    pub payoff_a: f64,
    pub payoff_b: f64,
}

impl RoundRecord {
    /// Whether noise flipped either player's action this round
    pub fn has_flip(&self) -> bool {
        self.intended_a != self.actual_a || self.intended_b != self.actual_b
    }
}

/// Outcome of a single match
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub player_a: String,
    pub player_b: String,
    pub rounds: Vec<RoundRecord>,
    pub total_a: f64,
    pub total_b: f64,
}

impl MatchResult {
    pub fn rounds_played(&self) -> usize {
        self.rounds.len()
    }

    pub fn totals(&self) -> (f64, f64) {
        (self.total_a, self.total_b)
    }

    /// Number of individual actions flipped by noise
    pub fn noise_flips(&self) -> usize {
        self.rounds
            .iter()
            .map(|r| (r.intended_a != r.actual_a) as usize + (r.intended_b != r.actual_b) as usize)
            .sum()
    }

    /// Fraction of rounds in which player A actually cooperated
    pub fn cooperation_rate_a(&self) -> f64 {
        cooperation_rate(self.rounds.iter().map(|r| r.actual_a))
    }

    /// Fraction of rounds in which player B actually cooperated
    pub fn cooperation_rate_b(&self) -> f64 {
        cooperation_rate(self.rounds.iter().map(|r| r.actual_b))
    }
}

/// Run one match of `rounds` rounds between fresh instances of two strategies.
///
/// Each round both players decide from the histories of actual actions,
/// then each intended action is flipped with probability `noise` before
/// payoffs are computed and histories extended. An invalid action aborts
/// the whole match.
pub fn run_match<R: Rng + ?Sized>(
    strategy_a: &StrategyTemplate,
    strategy_b: &StrategyTemplate,
    game: &GameDefinition,
    rounds: u32,
    noise: f64,
    rng: &mut R,
) -> Result<MatchResult> {
    validate_rounds(rounds)?;
    validate_noise(noise)?;

    let mut player_a = strategy_a.instantiate();
    let mut player_b = strategy_b.instantiate();

    let capacity = round_capacity(rounds);
    let mut history_a: Vec<Action> = Vec::with_capacity(capacity);
    let mut history_b: Vec<Action> = Vec::with_capacity(capacity);
    let mut records = Vec::with_capacity(capacity);
    let mut total_a = 0.0;
    let mut total_b = 0.0;

    for _ in 0..rounds {
        // Both decide before either history changes
        let intended_a = player_a.decide(&history_a, &history_b);
        let intended_b = player_b.decide(&history_b, &history_a);
        check_action(game, strategy_a, intended_a)?;
        check_action(game, strategy_b, intended_b)?;

        let actual_a = apply_noise(intended_a, noise, rng);
        let actual_b = apply_noise(intended_b, noise, rng);

        let (payoff_a, payoff_b) = game.payoff(actual_a, actual_b)?;
        total_a += payoff_a;
        total_b += payoff_b;

        history_a.push(actual_a);
        history_b.push(actual_b);
        records.push(RoundRecord {
            intended_a,
            intended_b,
            actual_a,
            actual_b,
            payoff_a,
            payoff_b,
        });
    }

    tracing::debug!(
        "Match {} vs {} ({} rounds): {:.1}-{:.1}",
        strategy_a.name(),
        strategy_b.name(),
        rounds,
        total_a,
        total_b
    );

    Ok(MatchResult {
        player_a: strategy_a.name().to_string(),
        player_b: strategy_b.name().to_string(),
        rounds: records,
        total_a,
        total_b,
    })
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// Flip an action with probability `noise`. The rng is untouched when noise is 0.
fn apply_noise<R: Rng + ?Sized>(action: Action, noise: f64, rng: &mut R) -> Action {
    if noise > 0.0 && rng.gen_bool(noise) {
        action.flipped()
    } else {
        action
    }
}

fn check_action(game: &GameDefinition, strategy: &StrategyTemplate, action: Action) -> Result<()> {
    if action.is_valid() {
        return Ok(());
    }
    Err(ArenaError::InvalidAction {
        game: game.name().to_string(),
        action: format!("{} returned by '{}'", action, strategy.name()),
    })
}

fn round_capacity(rounds: u32) -> usize {
    rounds.min(MAX_RESERVED_ROUNDS) as usize
}

fn cooperation_rate(actions: impl ExactSizeIterator<Item = Action>) -> f64 {
    let total = actions.len();
    if total == 0 {
        return 0.0;
    }
    let cooperated = actions.filter(|a| a.is_cooperate()).count();
    cooperated as f64 / total as f64
}
