//! Settings - games, strategy roster and defaults
//!
//! Loaded from an optional JSON file. Without a file the preset games and
//! every registered strategy are available.
//!
//! ## Architecture
//!
//! - Level 2: Settings::load(), Settings::game(), Settings::roster()
//! - Level 3: parse_game(), parse_payoff_key(), normalize_game_name()
//! - Level 4: boundary checks, rng creation

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use evoarena_core::{GameDefinition, StrategyRegistry, StrategyTemplate};

/// Rounds per match when neither the command line nor the file says otherwise
pub const DEFAULT_ROUNDS: u32 = 100;

/// Largest noise level accepted on the command line
pub const MAX_CLI_NOISE: f64 = 0.2;

/// Game name abbreviations, keyed by normalized spelling
const GAME_ABBREVIATIONS: &[(&str, &str)] = &[
    ("pd", "PD"),
    ("prisoners", "PD"),
    ("prisonersdilemma", "PD"),
    ("hd", "HawkDove"),
    ("hawkdove", "HawkDove"),
    ("hawk", "HawkDove"),
    ("dove", "HawkDove"),
    ("sh", "StagHunt"),
    ("stag", "StagHunt"),
    ("staghunt", "StagHunt"),
    ("hare", "StagHunt"),
];

// ============================================================================
// FILE FORMAT
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    games: BTreeMap<String, GameEntry>,
    #[serde(default)]
    strategies: Vec<String>,
    default_rounds: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GameEntry {
    #[serde(default)]
    description: String,
    valid_actions: Vec<String>,
    payoffs: BTreeMap<String, (f64, f64)>,
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Resolved settings shared by every command
#[derive(Debug)]
pub struct Settings {
    pub games: Vec<GameDefinition>,
    pub registry: StrategyRegistry,
    /// Strategy names used when a command does not list its own
    pub strategies: Vec<String>,
    pub default_rounds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let registry = StrategyRegistry::with_builtins();
        let strategies = registry.names().into_iter().map(String::from).collect();
        Self {
            games: GameDefinition::presets(),
            registry,
            strategies,
            default_rounds: DEFAULT_ROUNDS,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                let settings = Self::from_json(&text)
                    .with_context(|| format!("Invalid config file: {}", path.display()))?;
                tracing::info!(
                    "Loaded config {}: {} games, {} strategies",
                    path.display(),
                    settings.games.len(),
                    settings.strategies.len()
                );
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: SettingsFile = serde_json::from_str(text).context("Failed to parse config JSON")?;
        let mut settings = Self::default();

        if !file.games.is_empty() {
            settings.games = file
                .games
                .iter()
                .map(|(name, entry)| parse_game(name, entry))
                .collect::<Result<_>>()?;
        }

        if !file.strategies.is_empty() {
            // Fail early on names the registry does not know
            settings.registry.resolve(&file.strategies)?;
            settings.strategies = file.strategies;
        }

        if let Some(rounds) = file.default_rounds {
            if rounds == 0 {
                bail!("default_rounds must be at least 1");
            }
            settings.default_rounds = rounds;
        }

        Ok(settings)
    }

    /// Find a game by name, abbreviation, or case-insensitive spelling
    pub fn game(&self, name: &str) -> Result<&GameDefinition> {
        let normalized = normalize_game_name(name);
        let target = GAME_ABBREVIATIONS
            .iter()
            .find(|(abbrev, _)| *abbrev == normalized)
            .map(|(_, full)| normalize_game_name(full))
            .unwrap_or(normalized);

        match self.games.iter().find(|g| normalize_game_name(g.name()) == target) {
            Some(game) => Ok(game),
            None => {
                let available: Vec<&str> = self.games.iter().map(|g| g.name()).collect();
                bail!("Unknown game '{}'. Available: {}", name, available.join(", "))
            }
        }
    }

    /// Templates for the requested names, or the configured roster when none are given
    pub fn roster(&self, requested: &[String]) -> Result<Vec<StrategyTemplate>> {
        let names = if requested.is_empty() {
            self.strategies.as_slice()
        } else {
            requested
        };
        Ok(self.registry.resolve(names)?)
    }

    pub fn rounds_or_default(&self, rounds: Option<u32>) -> u32 {
        rounds.unwrap_or(self.default_rounds)
    }
}

// ============================================================================
// LEVEL 3 - PARSING
// ============================================================================

fn parse_game(name: &str, entry: &GameEntry) -> Result<GameDefinition> {
    let actions: [&str; 2] = match entry.valid_actions.as_slice() {
        [a, b] => [a.as_str(), b.as_str()],
        other => bail!(
            "Game '{}' must list exactly two valid actions, got {}",
            name,
            other.len()
        ),
    };

    let cells = entry
        .payoffs
        .iter()
        .map(|(key, &payoff)| {
            let (row, col) = parse_payoff_key(key)
                .with_context(|| format!("Game '{}': bad payoff key {:?}", name, key))?;
            Ok((row, col, payoff))
        })
        .collect::<Result<Vec<_>>>()?;

    let game = GameDefinition::from_table(name, actions, cells)?;
    Ok(game.with_description(&entry.description))
}

/// Parse `"C,D"` or `"('C', 'D')"` into its two labels
fn parse_payoff_key(key: &str) -> Result<(String, String)> {
    let inner = key.trim();
    let inner = inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(inner);

    let parts: Vec<&str> = inner
        .split(',')
        .map(|p| p.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .collect();

    match parts.as_slice() {
        [row, col] if !row.is_empty() && !col.is_empty() => Ok((row.to_string(), col.to_string())),
        _ => bail!("expected two comma-separated action labels"),
    }
}

fn normalize_game_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '\''))
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Reject noise levels outside what the command line allows
pub fn check_noise(noise: f64) -> Result<()> {
    if !(0.0..=MAX_CLI_NOISE).contains(&noise) {
        bail!("Noise must be between 0 and {}, got {}", MAX_CLI_NOISE, noise);
    }
    Ok(())
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
