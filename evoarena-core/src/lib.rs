//! EvoArena Core - Games, strategies and errors
//!
//! This crate provides the leaf types shared by every simulation layer:
//! - Two-action symmetric games with total payoff tables
//! - The strategy decision contract and the built-in strategy roster
//! - An explicit name-to-strategy registration table
//! - The error type used across the workspace

pub mod error;
pub mod game;
pub mod registry;
pub mod strategy;

// Re-exports for convenient access
pub use error::{ArenaError, Result};
pub use game::{Action, GameDefinition, Payoff};
pub use registry::StrategyRegistry;
pub use strategy::{BuiltIn, Strategy, StrategyTemplate};
