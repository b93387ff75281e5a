//! Strategy contract and the built-in strategy roster

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::Action;

/// A decision unit for one side of a match.
///
/// `own` and `opponent` hold the actions actually played so far in the
/// current match (after noise). An instance only lives for one match, so
/// any state it keeps is match-scoped.
pub trait Strategy {
    fn decide(&mut self, own: &[Action], opponent: &[Action]) -> Action;
}

impl<F> Strategy for F
where
    F: FnMut(&[Action], &[Action]) -> Action,
{
    fn decide(&mut self, own: &[Action], opponent: &[Action]) -> Action {
        self(own, opponent)
    }
}

type Factory = dyn Fn() -> Box<dyn Strategy> + Send + Sync;

/// Named factory for fresh strategy instances.
///
/// Matches never share a strategy instance: each side of every match,
/// including both sides of a self-pairing, gets its own from `instantiate`.
#[derive(Clone)]
pub struct StrategyTemplate {
    name: String,
    factory: Arc<Factory>,
}

impl StrategyTemplate {
    /// Create a template from a factory closure
    pub fn new<F, S>(name: &str, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Strategy + 'static,
    {
        Self {
            name: name.to_string(),
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Strategy>),
        }
    }

    /// Create a template from a decision closure.
    ///
    /// The closure is cloned for every match, so captured state starts
    /// fresh each time.
    pub fn from_fn<F>(name: &str, decide: F) -> Self
    where
        F: FnMut(&[Action], &[Action]) -> Action + Clone + Send + Sync + 'static,
    {
        Self::new(name, move || decide.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A fresh player with empty match state
    pub fn instantiate(&self) -> Box<dyn Strategy> {
        (self.factory)()
    }
}

impl fmt::Debug for StrategyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyTemplate").field("name", &self.name).finish()
    }
}

/// Built-in strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltIn {
    /// Always cooperates, regardless of history.
    AlwaysCooperate,
    /// Always defects, regardless of history.
    AlwaysDefect,
    /// Cooperates first, then copies the opponent's last move.
    TitForTat,
    /// Cooperates until the opponent defects once, then always defects.
    GrimTrigger,
    /// Tit-for-Tat that forgives two consecutive defections.
    ForgivingTitForTat,
    /// Tit-for-Tat but opens with a defection.
    SuspiciousTitForTat,
    /// Defects only after two consecutive opponent defections.
    TitForTwoTats,
    /// Win-stay, lose-shift: cooperates when both players matched last round.
    Pavlov,
}

impl BuiltIn {
    pub const ALL: [BuiltIn; 8] = [
        BuiltIn::AlwaysCooperate,
        BuiltIn::AlwaysDefect,
        BuiltIn::TitForTat,
        BuiltIn::GrimTrigger,
        BuiltIn::ForgivingTitForTat,
        BuiltIn::SuspiciousTitForTat,
        BuiltIn::TitForTwoTats,
        BuiltIn::Pavlov,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::AlwaysCooperate => "AlwaysCooperate",
            BuiltIn::AlwaysDefect => "AlwaysDefect",
            BuiltIn::TitForTat => "TitForTat",
            BuiltIn::GrimTrigger => "GrimTrigger",
            BuiltIn::ForgivingTitForTat => "ForgivingTitForTat",
            BuiltIn::SuspiciousTitForTat => "SuspiciousTitForTat",
            BuiltIn::TitForTwoTats => "TitForTwoTats",
            BuiltIn::Pavlov => "Pavlov",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BuiltIn::AlwaysCooperate => "always cooperates",
            BuiltIn::AlwaysDefect => "always defects",
            BuiltIn::TitForTat => "cooperates first, then mirrors the opponent",
            BuiltIn::GrimTrigger => "cooperates until the first defection, then defects forever",
            BuiltIn::ForgivingTitForTat => "mirrors the opponent but forgives a double defection",
            BuiltIn::SuspiciousTitForTat => "defects first, then mirrors the opponent",
            BuiltIn::TitForTwoTats => "defects only after two defections in a row",
            BuiltIn::Pavlov => "repeats after matching moves, switches otherwise",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltIn> {
        BuiltIn::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn template(self) -> StrategyTemplate {
        StrategyTemplate::new(self.name(), move || BuiltInPlayer::new(self))
    }
}

/// Match-scoped player for a built-in strategy
#[derive(Clone, Debug)]
struct BuiltInPlayer {
    kind: BuiltIn,
    /// Set once the opponent has defected (GrimTrigger)
    triggered: bool,
}

impl BuiltInPlayer {
    fn new(kind: BuiltIn) -> Self {
        Self {
            kind,
            triggered: false,
        }
    }
}

impl Strategy for BuiltInPlayer {
    fn decide(&mut self, own: &[Action], opponent: &[Action]) -> Action {
        let last = opponent.last().copied();

        match self.kind {
            BuiltIn::AlwaysCooperate => Action::COOPERATE,
            BuiltIn::AlwaysDefect => Action::DEFECT,
            BuiltIn::TitForTat => last.unwrap_or(Action::COOPERATE),
            BuiltIn::GrimTrigger => {
                if last == Some(Action::DEFECT) {
                    self.triggered = true;
                }
                if self.triggered {
                    Action::DEFECT
                } else {
                    Action::COOPERATE
                }
            }
            BuiltIn::ForgivingTitForTat => {
                if last_two_defections(opponent) {
                    Action::COOPERATE
                } else {
                    last.unwrap_or(Action::COOPERATE)
                }
            }
            BuiltIn::SuspiciousTitForTat => last.unwrap_or(Action::DEFECT),
            BuiltIn::TitForTwoTats => {
                if last_two_defections(opponent) {
                    Action::DEFECT
                } else {
                    Action::COOPERATE
                }
            }
            BuiltIn::Pavlov => match (own.last(), last) {
                (Some(mine), Some(theirs)) if *mine != theirs => Action::DEFECT,
                _ => Action::COOPERATE,
            },
        }
    }
}

fn last_two_defections(history: &[Action]) -> bool {
    history.len() >= 2 && history[history.len() - 2..].iter().all(|a| a.is_defect())
}
