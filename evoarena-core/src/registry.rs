//! Explicit name-to-strategy registration table

use rustc_hash::FxHashMap;

use crate::error::{ArenaError, Result};
use crate::strategy::{BuiltIn, StrategyTemplate};

/// Registered strategy templates, in registration order
#[derive(Clone, Debug, Default)]
pub struct StrategyRegistry {
    templates: Vec<StrategyTemplate>,
    index: FxHashMap<String, usize>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in BuiltIn::ALL {
            registry.register(kind.template());
        }
        registry
    }

    /// Register a template. Duplicate names are skipped with a warning.
    pub fn register(&mut self, template: StrategyTemplate) -> bool {
        if self.index.contains_key(template.name()) {
            tracing::warn!("Duplicate strategy '{}' (skipping)", template.name());
            return false;
        }

        tracing::debug!("Registered strategy: {}", template.name());
        self.index.insert(template.name().to_string(), self.templates.len());
        self.templates.push(template);
        true
    }

    pub fn get(&self, name: &str) -> Option<&StrategyTemplate> {
        self.index.get(name).map(|&i| &self.templates[i])
    }

    /// Look up several names, failing on the first unknown one
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<StrategyTemplate>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).cloned().ok_or_else(|| {
                    ArenaError::config(format!(
                        "unknown strategy '{}'. Available: {}",
                        name,
                        self.names().join(", ")
                    ))
                })
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name()).collect()
    }

    pub fn templates(&self) -> &[StrategyTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Action;

    #[test]
    fn test_builtins_registered_in_order() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(registry.len(), BuiltIn::ALL.len());
        assert_eq!(registry.names()[0], "AlwaysCooperate");
        assert!(registry.get("TitForTat").is_some());
    }

    #[test]
    fn test_duplicate_is_skipped() {
        let mut registry = StrategyRegistry::with_builtins();
        let before = registry.len();

        let added = registry.register(StrategyTemplate::from_fn(
            "TitForTat",
            |_: &[Action], _: &[Action]| Action::DEFECT,
        ));

        assert!(!added);
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = StrategyRegistry::with_builtins();
        let resolved = registry.resolve(&["TitForTat", "AlwaysDefect"]).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].name(), "AlwaysDefect");

        let err = registry.resolve(&["TitForTat", "Mystery"]).unwrap_err();
        assert!(err.to_string().contains("Mystery"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(StrategyTemplate::from_fn(
            "Contrarian",
            |_: &[Action], opponent: &[Action]| {
                opponent.last().map(|a| a.flipped()).unwrap_or(Action::COOPERATE)
            },
        )));
        assert_eq!(registry.names(), vec!["Contrarian"]);
    }
}
