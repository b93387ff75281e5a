//! Catalog commands - list games and strategies

use anyhow::Result;

use evoarena_core::{Action, BuiltIn, GameDefinition};

use crate::settings::Settings;

/// Print every configured game with its payoff matrix
pub fn run_games(settings: &Settings) -> Result<()> {
    println!("=== Games ===");
    for game in &settings.games {
        println!();
        print_game(game)?;
    }
    Ok(())
}

/// Print every registered strategy, marking the configured roster
pub fn run_strategies(settings: &Settings) -> Result<()> {
    println!("=== Strategies ===");
    for name in settings.registry.names() {
        let marker = if settings.strategies.iter().any(|s| s == name) {
            "*"
        } else {
            " "
        };
        let description = BuiltIn::from_name(name)
            .map(BuiltIn::description)
            .unwrap_or("custom strategy");
        println!("{} {:<22} {}", marker, name, description);
    }
    println!("\n* = in the default roster");
    Ok(())
}

fn print_game(game: &GameDefinition) -> Result<()> {
    if game.description().is_empty() {
        println!("{}", game.name());
    } else {
        println!("{} - {}", game.name(), game.description());
    }

    let [first, second] = game.actions();
    println!("{:>10} | {:^12} | {:^12}", "", first, second);
    for row in Action::ALL {
        let cells = Action::ALL
            .iter()
            .map(|&col| game.payoff(row, col).map(|(a, b)| format!("({}, {})", a, b)))
            .collect::<evoarena_core::Result<Vec<_>>>()?;
        println!("{:>10} | {:^12} | {:^12}", game.label(row)?, cells[0], cells[1]);
    }
    Ok(())
}
