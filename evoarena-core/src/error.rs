//! Error types shared by the simulation crates

/// Errors raised by game resolution, simulation setup and evolution
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A strategy or payoff lookup produced an action outside the game's two actions
    #[error("invalid action {action} for game '{game}'")]
    InvalidAction { game: String, action: String },

    /// Simulation parameters or game tables outside their accepted ranges
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested capability was compiled out of this build
    #[error("missing dependency: {0}")]
    MissingDependency(String),
}

impl ArenaError {
    pub fn config(msg: impl Into<String>) -> Self {
        ArenaError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ArenaError>;
