//! Console plugin - turns console lines into level system requests.

use bevy::prelude::*;

use crate::catalog::LevelCatalog;
use crate::core::{
    ChangeLevelEvent, ConsoleCommandEvent, CurrentGameRules, LoadLevelRequest, UnloadLevelRequest,
};
use crate::rotation::{GameRulesRegistry, GameRulesResolver};

use super::command::ConsoleCommand;

/// Console plugin.
pub struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, execute_console_commands);
    }
}

/// Execute every queued console line.
pub fn execute_console_commands(
    mut lines: EventReader<ConsoleCommandEvent>,
    catalog: Res<LevelCatalog>,
    rules: Res<GameRulesRegistry>,
    mut game_rules: ResMut<CurrentGameRules>,
    mut load: EventWriter<LoadLevelRequest>,
    mut unload: EventWriter<UnloadLevelRequest>,
    mut change: EventWriter<ChangeLevelEvent>,
) {
    for line in lines.read() {
        let command = match ConsoleCommand::parse(&line.0) {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        match command {
            ConsoleCommand::Map { level, args } => {
                if !args.is_empty() {
                    debug!("map {}: extra arguments {:?}", level, args);
                }
                load.send(LoadLevelRequest {
                    level,
                    game_rules: game_rules.0.clone(),
                });
            }
            ConsoleCommand::SvGameRules(None) => {
                info!("sv_gamerules = {:?}", game_rules.0);
            }
            ConsoleCommand::SvGameRules(Some(name)) => match rules.canonical_name(&name) {
                Some(canonical) => {
                    info!("sv_gamerules set to '{}'", canonical);
                    game_rules.0 = Some(canonical);
                }
                None => warn!("Unknown game rules '{}'", name),
            },
            ConsoleCommand::Unload => {
                unload.send(UnloadLevelRequest);
            }
            ConsoleCommand::ChangeLevel { args } => {
                change.send(ChangeLevelEvent { args });
            }
            ConsoleCommand::Levels => {
                for name in catalog.level_names() {
                    info!("  {}", name);
                }
                info!("{} level(s)", catalog.len());
            }
        }
    }
}
