//! EvoArena Tournament - Matches, pairings and round-robin scoring
//!
//! This crate provides tournament infrastructure:
//! - Noisy repeated matches between two strategies
//! - Repeat-averaged pairings
//! - Round-robin tournaments with self-play and a ranked leaderboard
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: play_pairing, execute_all_pairings (phases)
//! - Level 3: run_match, compute_standings (steps)
//! - Level 4: utilities, configuration

mod config;
mod match_play;
mod match_runner;
mod tournament;

pub use config::TournamentConfig;
pub use match_play::{play_pairing, PairingResult};
pub use match_runner::{run_match, MatchResult, RoundRecord};
pub use tournament::{run_tournament, TournamentEntry, TournamentResult};
