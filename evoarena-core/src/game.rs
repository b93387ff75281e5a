//! Game definitions - two actions and a total payoff table

use std::fmt;

use serde::Serialize;

use crate::error::{ArenaError, Result};

/// Payoff pair for (row player, column player)
pub type Payoff = (f64, f64);

/// Action index within a game.
///
/// Index 0 is the cooperative-like action and index 1 the defect-like one.
/// Any other index is invalid for every game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Action(pub u8);

impl Action {
    pub const COOPERATE: Action = Action(0);
    pub const DEFECT: Action = Action(1);

    /// Both valid actions in table order
    pub const ALL: [Action; 2] = [Action::COOPERATE, Action::DEFECT];

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self.0 < 2
    }

    pub fn is_cooperate(self) -> bool {
        self == Action::COOPERATE
    }

    pub fn is_defect(self) -> bool {
        self == Action::DEFECT
    }

    /// The other valid action. Only meaningful for valid actions.
    pub fn flipped(self) -> Action {
        Action(self.0 ^ 1)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static description of a symmetric two-player, two-action game
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameDefinition {
    name: String,
    description: String,
    actions: [String; 2],
    /// Indexed by [row action][column action]
    payoffs: [[Payoff; 2]; 2],
}

impl GameDefinition {
    /// Create a game from a complete payoff matrix
    pub fn new(name: &str, actions: [&str; 2], payoffs: [[Payoff; 2]; 2]) -> Result<Self> {
        validate_actions(name, &actions)?;

        for (a, b) in payoffs.iter().flatten() {
            if !a.is_finite() || !b.is_finite() {
                return Err(ArenaError::config(format!(
                    "game '{}' has a non-finite payoff ({}, {})",
                    name, a, b
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            description: String::new(),
            actions: [actions[0].to_string(), actions[1].to_string()],
            payoffs,
        })
    }

    /// Create a game from labelled cells.
    ///
    /// Every one of the four action pairs must appear exactly once.
    pub fn from_table<I, S>(name: &str, actions: [&str; 2], cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S, Payoff)>,
        S: AsRef<str>,
    {
        validate_actions(name, &actions)?;

        let mut table: [[Option<Payoff>; 2]; 2] = [[None; 2]; 2];
        for (row, col, payoff) in cells {
            let (row, col) = (row.as_ref(), col.as_ref());
            let r = label_index(&actions, row).ok_or_else(|| {
                ArenaError::config(format!("game '{}': unknown action '{}' in payoff table", name, row))
            })?;
            let c = label_index(&actions, col).ok_or_else(|| {
                ArenaError::config(format!("game '{}': unknown action '{}' in payoff table", name, col))
            })?;
            if table[r][c].replace(payoff).is_some() {
                return Err(ArenaError::config(format!(
                    "game '{}': duplicate payoff entry for ({}, {})",
                    name, row, col
                )));
            }
        }

        let mut payoffs = [[(0.0, 0.0); 2]; 2];
        for r in 0..2 {
            for c in 0..2 {
                payoffs[r][c] = table[r][c].ok_or_else(|| {
                    ArenaError::config(format!(
                        "game '{}': missing payoff entry for ({}, {})",
                        name, actions[r], actions[c]
                    ))
                })?;
            }
        }

        Self::new(name, actions, payoffs)
    }

    /// Attach a one-line description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn actions(&self) -> [&str; 2] {
        [&self.actions[0], &self.actions[1]]
    }

    /// Check that an action belongs to this game
    pub fn validate(&self, action: Action) -> Result<()> {
        if action.is_valid() {
            Ok(())
        } else {
            Err(ArenaError::InvalidAction {
                game: self.name.clone(),
                action: action.to_string(),
            })
        }
    }

    /// Label of an action
    pub fn label(&self, action: Action) -> Result<&str> {
        self.validate(action)?;
        Ok(&self.actions[action.index()])
    }

    /// Resolve a label to its action
    pub fn action(&self, label: &str) -> Result<Action> {
        label_index(&self.actions, label)
            .map(|i| Action(i as u8))
            .ok_or_else(|| ArenaError::InvalidAction {
                game: self.name.clone(),
                action: label.to_string(),
            })
    }

    /// Payoffs for the actual actions played this round
    pub fn payoff(&self, a: Action, b: Action) -> Result<Payoff> {
        self.validate(a)?;
        self.validate(b)?;
        Ok(self.payoffs[a.index()][b.index()])
    }

    /// All four cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Action, Action, Payoff)> + '_ {
        Action::ALL.into_iter().flat_map(move |a| {
            Action::ALL
                .into_iter()
                .map(move |b| (a, b, self.payoffs[a.index()][b.index()]))
        })
    }

    // ------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------

    /// Prisoner's Dilemma: CC=(3,3), CD=(0,5), DC=(5,0), DD=(1,1)
    pub fn prisoners_dilemma() -> Self {
        Self {
            name: "PD".to_string(),
            description: "Prisoner's Dilemma: mutual cooperation pays, but defection always tempts"
                .to_string(),
            actions: ["C".to_string(), "D".to_string()],
            payoffs: [[(3.0, 3.0), (0.0, 5.0)], [(5.0, 0.0), (1.0, 1.0)]],
        }
    }

    /// Hawk-Dove with resource 4 and fight cost 6
    pub fn hawk_dove() -> Self {
        Self {
            name: "HawkDove".to_string(),
            description: "Hawk-Dove: escalating against a hawk is costly, sharing with a dove is safe"
                .to_string(),
            actions: ["D".to_string(), "H".to_string()],
            payoffs: [[(2.0, 2.0), (0.0, 4.0)], [(4.0, 0.0), (-1.0, -1.0)]],
        }
    }

    /// Stag Hunt: the stag needs both hunters, the hare is safe alone
    pub fn stag_hunt() -> Self {
        Self {
            name: "StagHunt".to_string(),
            description: "Stag Hunt: hunting the stag pays only together, the hare is a safe bet"
                .to_string(),
            actions: ["S".to_string(), "H".to_string()],
            payoffs: [[(4.0, 4.0), (0.0, 3.0)], [(3.0, 0.0), (3.0, 3.0)]],
        }
    }

    /// All built-in games
    pub fn presets() -> Vec<Self> {
        vec![Self::prisoners_dilemma(), Self::hawk_dove(), Self::stag_hunt()]
    }
}

fn validate_actions(name: &str, actions: &[&str; 2]) -> Result<()> {
    if actions.iter().any(|a| a.trim().is_empty()) {
        return Err(ArenaError::config(format!("game '{}' has an empty action label", name)));
    }
    if actions[0] == actions[1] {
        return Err(ArenaError::config(format!(
            "game '{}' needs two distinct actions, got '{}' twice",
            name, actions[0]
        )));
    }
    Ok(())
}

fn label_index<S: AsRef<str>>(actions: &[S; 2], label: &str) -> Option<usize> {
    actions.iter().position(|a| a.as_ref() == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prisoners_dilemma_matrix() {
        let pd = GameDefinition::prisoners_dilemma();
        assert_eq!(pd.payoff(Action::COOPERATE, Action::COOPERATE).unwrap(), (3.0, 3.0));
        assert_eq!(pd.payoff(Action::COOPERATE, Action::DEFECT).unwrap(), (0.0, 5.0));
        assert_eq!(pd.payoff(Action::DEFECT, Action::COOPERATE).unwrap(), (5.0, 0.0));
        assert_eq!(pd.payoff(Action::DEFECT, Action::DEFECT).unwrap(), (1.0, 1.0));
    }

    #[test]
    fn test_from_table_matches_configured_cells() {
        let cells = vec![
            ("S", "S", (4.0, 4.0)),
            ("S", "H", (0.0, 3.0)),
            ("H", "S", (3.0, 0.0)),
            ("H", "H", (3.0, 3.0)),
        ];
        let game = GameDefinition::from_table("hunt", ["S", "H"], cells.clone()).unwrap();

        for (row, col, expected) in cells {
            let a = game.action(row).unwrap();
            let b = game.action(col).unwrap();
            assert_eq!(game.payoff(a, b).unwrap(), expected);
        }
    }

    #[test]
    fn test_presets_are_total() {
        for game in GameDefinition::presets() {
            assert_eq!(game.cells().count(), 4, "{} should have 4 cells", game.name());
            for (a, b, payoff) in game.cells() {
                assert_eq!(game.payoff(a, b).unwrap(), payoff);
            }
        }
    }

    #[test]
    fn test_invalid_action_rejected() {
        let pd = GameDefinition::prisoners_dilemma();
        let err = pd.payoff(Action(2), Action::COOPERATE).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidAction { .. }));

        assert!(pd.action("X").is_err());
        assert!(pd.label(Action(7)).is_err());
    }

    #[test]
    fn test_labels() {
        let hd = GameDefinition::hawk_dove();
        assert_eq!(hd.actions(), ["D", "H"]);
        assert_eq!(hd.label(Action::DEFECT).unwrap(), "H");
        assert_eq!(hd.action("D").unwrap(), Action::COOPERATE);
    }

    #[test]
    fn test_from_table_missing_cell() {
        let cells = vec![
            ("C", "C", (3.0, 3.0)),
            ("C", "D", (0.0, 5.0)),
            ("D", "C", (5.0, 0.0)),
        ];
        let err = GameDefinition::from_table("pd", ["C", "D"], cells).unwrap_err();
        assert!(matches!(err, ArenaError::Config(_)));
    }

    #[test]
    fn test_from_table_duplicate_and_unknown_cells() {
        let duplicate = vec![
            ("C", "C", (3.0, 3.0)),
            ("C", "C", (3.0, 3.0)),
            ("D", "C", (5.0, 0.0)),
            ("D", "D", (1.0, 1.0)),
        ];
        assert!(GameDefinition::from_table("pd", ["C", "D"], duplicate).is_err());

        let unknown = vec![("C", "X", (3.0, 3.0))];
        assert!(GameDefinition::from_table("pd", ["C", "D"], unknown).is_err());
    }

    #[test]
    fn test_actions_must_be_distinct() {
        let payoffs = [[(1.0, 1.0); 2]; 2];
        assert!(GameDefinition::new("bad", ["C", "C"], payoffs).is_err());
        assert!(GameDefinition::new("bad", ["C", " "], payoffs).is_err());
        assert!(GameDefinition::new("bad", ["C", "D"], [[(f64::NAN, 1.0); 2]; 2]).is_err());
    }

    #[test]
    fn test_action_flip() {
        assert_eq!(Action::COOPERATE.flipped(), Action::DEFECT);
        assert_eq!(Action::DEFECT.flipped(), Action::COOPERATE);
        assert!(!Action(2).is_valid());
    }
}
