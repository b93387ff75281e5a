//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use evoarena_core::{ArenaError, Result};
use serde::{Deserialize, Serialize};

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Rounds in every match
    pub rounds_per_match: u32,
    /// Matches per pairing; pairing totals are averaged over them
    pub repeats: u32,
    /// Probability that an intended action is flipped
    pub noise: f64,
    /// Whether to run pairings in parallel
    pub parallel: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds_per_match: 100,
            repeats: 1,
            noise: 0.0,
            parallel: false,
        }
    }
}

impl TournamentConfig {
    /// Create config with the given match length
    pub fn new(rounds_per_match: u32) -> Self {
        Self {
            rounds_per_match,
            ..Default::default()
        }
    }

    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject values outside the accepted ranges
    pub fn validate(&self) -> Result<()> {
        validate_rounds(self.rounds_per_match)?;
        validate_noise(self.noise)?;
        if self.repeats == 0 {
            return Err(ArenaError::config("repeats must be at least 1"));
        }
        Ok(())
    }
}

pub(crate) fn validate_rounds(rounds: u32) -> Result<()> {
    if rounds == 0 {
        return Err(ArenaError::config("rounds must be at least 1"));
    }
    Ok(())
}

pub(crate) fn validate_noise(noise: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&noise) {
        return Err(ArenaError::config(format!(
            "noise must be within [0, 1], got {}",
            noise
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_config_defaults() {
        let config = TournamentConfig::default();
        assert_eq!(config.rounds_per_match, 100);
        assert_eq!(config.repeats, 1);
        assert_eq!(config.noise, 0.0);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TournamentConfig::new(50)
            .with_repeats(3)
            .with_noise(0.1)
            .with_parallel(true);
        assert_eq!(config.rounds_per_match, 50);
        assert_eq!(config.repeats, 3);
        assert_eq!(config.noise, 0.1);
        assert!(config.parallel);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(TournamentConfig::new(0).validate().is_err());
        assert!(TournamentConfig::new(10).with_repeats(0).validate().is_err());
        assert!(TournamentConfig::new(10).with_noise(1.5).validate().is_err());
        assert!(TournamentConfig::new(10).with_noise(-0.1).validate().is_err());
        assert!(TournamentConfig::new(10).with_noise(f64::NAN).validate().is_err());
        assert!(TournamentConfig::new(10).with_noise(1.0).validate().is_ok());
    }
}
