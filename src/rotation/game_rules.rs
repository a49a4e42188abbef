//! Game rules name resolution.

use bevy::prelude::*;

use crate::core::GameRulesDef;

/// Resolves a game rules name or alias to its canonical name.
pub trait GameRulesResolver {
    fn canonical_name(&self, name: &str) -> Option<String>;
}

/// Resource holding the known game rules and their aliases.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameRulesRegistry {
    rules: Vec<GameRulesDef>,
}

impl GameRulesRegistry {
    pub fn from_defs(defs: &[GameRulesDef]) -> Self {
        let mut registry = Self::default();
        for def in defs {
            registry.register(&def.name);
            for alias in &def.aliases {
                registry.add_alias(&def.name, alias);
            }
        }
        registry
    }

    /// Register a game rules name. Registering an existing name is a no-op.
    pub fn register(&mut self, name: &str) {
        if self.find(name).is_none() {
            self.rules.push(GameRulesDef {
                name: name.to_string(),
                aliases: Vec::new(),
            });
        }
    }

    pub fn add_alias(&mut self, name: &str, alias: &str) {
        if let Some(def) = self
            .rules
            .iter_mut()
            .find(|def| def.name.eq_ignore_ascii_case(name))
        {
            def.aliases.push(alias.to_string());
        } else {
            warn!("Alias '{}' refers to unknown game rules '{}'", alias, name);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|def| def.name.as_str())
    }

    fn find(&self, name: &str) -> Option<&GameRulesDef> {
        self.rules.iter().find(|def| {
            def.name.eq_ignore_ascii_case(name)
                || def.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }
}

impl GameRulesResolver for GameRulesRegistry {
    fn canonical_name(&self, name: &str) -> Option<String> {
        self.find(name).map(|def| def.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_names_and_aliases() {
        let registry = GameRulesRegistry::from_defs(&[GameRulesDef {
            name: "TeamDeathmatch".to_string(),
            aliases: vec!["tdm".to_string()],
        }]);

        assert_eq!(registry.canonical_name("teamdeathmatch").as_deref(), Some("TeamDeathmatch"));
        assert_eq!(registry.canonical_name("TDM").as_deref(), Some("TeamDeathmatch"));
        assert_eq!(registry.canonical_name("Capture"), None);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = GameRulesRegistry::default();
        registry.register("Deathmatch");
        registry.register("deathmatch");
        assert_eq!(registry.names().count(), 1);
    }
}
