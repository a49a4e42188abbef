//! Console command parsing and auto-completion.

use thiserror::Error;

use crate::catalog::LevelCatalog;

/// A parsed level system console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `map <level> [args..]`
    Map { level: String, args: Vec<String> },
    /// `sv_gamerules [rules]`; without an argument prints the current rules.
    SvGameRules(Option<String>),
    /// `unload`
    Unload,
    /// `changelevel [args..]`
    ChangeLevel { args: Vec<String> },
    /// `levels`
    Levels,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl ConsoleCommand {
    /// Parse a console line. Command names are case-insensitive.
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ConsoleError::Empty);
        };
        let rest: Vec<String> = words.map(str::to_string).collect();

        match name.to_ascii_lowercase().as_str() {
            "map" => {
                let mut rest = rest.into_iter();
                let level = rest.next().ok_or(ConsoleError::MissingArgument("map"))?;
                Ok(Self::Map {
                    level,
                    args: rest.collect(),
                })
            }
            "sv_gamerules" => Ok(Self::SvGameRules(rest.into_iter().next())),
            "unload" => Ok(Self::Unload),
            "changelevel" => Ok(Self::ChangeLevel { args: rest }),
            "levels" => Ok(Self::Levels),
            _ => Err(ConsoleError::UnknownCommand(name.to_string())),
        }
    }
}

/// Complete the level argument of a `map` line from the catalog.
///
/// Returns full replacement lines, e.g. `map arena` for `map ar`.
pub fn complete_map(line: &str, catalog: &LevelCatalog) -> Vec<String> {
    let trimmed = line.trim_start();
    let Some((command, prefix)) = trimmed.split_once(char::is_whitespace) else {
        return Vec::new();
    };
    if !command.eq_ignore_ascii_case("map") || prefix.trim().contains(char::is_whitespace) {
        return Vec::new();
    }

    catalog
        .complete(prefix.trim())
        .into_iter()
        .map(|name| format!("{} {}", command, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LevelInfo, LevelTag};

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleCommand::parse("map arena s"),
            Ok(ConsoleCommand::Map {
                level: "arena".to_string(),
                args: vec!["s".to_string()],
            })
        );
        assert_eq!(
            ConsoleCommand::parse("  SV_GAMERULES  Deathmatch"),
            Ok(ConsoleCommand::SvGameRules(Some("Deathmatch".to_string())))
        );
        assert_eq!(ConsoleCommand::parse("unload"), Ok(ConsoleCommand::Unload));
        assert_eq!(
            ConsoleCommand::parse("changelevel x"),
            Ok(ConsoleCommand::ChangeLevel {
                args: vec!["x".to_string()]
            })
        );
        assert_eq!(ConsoleCommand::parse("levels"), Ok(ConsoleCommand::Levels));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ConsoleCommand::parse("   "), Err(ConsoleError::Empty));
        assert_eq!(
            ConsoleCommand::parse("map"),
            Err(ConsoleError::MissingArgument("map"))
        );
        assert_eq!(
            ConsoleCommand::parse("quit"),
            Err(ConsoleError::UnknownCommand("quit".to_string()))
        );
    }

    #[test]
    fn test_complete_map() {
        let mut catalog = LevelCatalog::default();
        for name in ["multiplayer/arena", "multiplayer/armory", "harbor"] {
            catalog.insert(LevelInfo::new(name, name, LevelTag::MAIN));
        }

        let mut completions = complete_map("map ar", &catalog);
        completions.sort();
        assert_eq!(completions, vec!["map arena", "map armory"]);
        assert!(complete_map("unload ar", &catalog).is_empty());
        assert!(complete_map("map", &catalog).is_empty());
    }
}
