//! Rotation plugin - loads the session rotation and answers `changelevel`.

use bevy::prelude::*;

use crate::catalog::LevelCatalog;
use crate::core::{
    ChangeLevelEvent, ConsoleCommandEvent, CurrentGameRules, LevelPhase, LevelSystemConfig,
    LoadLevelRequest,
};

use super::game_rules::GameRulesRegistry;
use super::registry::RotationRegistry;
use super::rotation::ChangeLevelAction;

/// Rotation plugin - owns `RotationRegistry` and `GameRulesRegistry`.
pub struct RotationPlugin;

impl Plugin for RotationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameRulesRegistry>()
            .init_resource::<RotationRegistry>()
            .add_systems(Startup, (register_game_rules, load_session_rotation).chain())
            .add_systems(PostStartup, autoload_rotation)
            .add_systems(Update, handle_change_level);
    }
}

/// Fill the game rules registry from the config.
pub fn register_game_rules(config: Res<LevelSystemConfig>, mut rules: ResMut<GameRulesRegistry>) {
    *rules = GameRulesRegistry::from_defs(&config.game_rules);
    info!("Registered {} game rules", rules.names().count());
}

/// Load the configured rotation file into the main rotation and initialise it.
pub fn load_session_rotation(
    config: Res<LevelSystemConfig>,
    catalog: Res<LevelCatalog>,
    rules: Res<GameRulesRegistry>,
    mut rotations: ResMut<RotationRegistry>,
) {
    let Some(path) = &config.rotation_file else {
        debug!("No rotation file configured");
        return;
    };

    match rotations.main.load_from_file(path, None, &catalog, &*rules) {
        Ok(()) => {
            rotations.main.initialise(config.rotation_seed);
            info!(
                "Loaded level rotation from {:?}: {} entries",
                path,
                rotations.main.len()
            );
        }
        Err(e) => error!("Failed to load level rotation {:?}: {}", path, e),
    }
}

fn autoload_rotation(config: Res<LevelSystemConfig>, mut change: EventWriter<ChangeLevelEvent>) {
    if config.autoload_rotation {
        change.send(ChangeLevelEvent::default());
    }
}

/// Resolve the next rotation entry for every `ChangeLevelEvent`.
///
/// A loaded level is switched in place; otherwise the rotation issues
/// `sv_gamerules` and `map` console commands.
pub fn handle_change_level(
    mut events: EventReader<ChangeLevelEvent>,
    mut rotations: ResMut<RotationRegistry>,
    catalog: Res<LevelCatalog>,
    phase: Res<State<LevelPhase>>,
    mut game_rules: ResMut<CurrentGameRules>,
    mut load_requests: EventWriter<LoadLevelRequest>,
    mut console: EventWriter<ConsoleCommandEvent>,
) {
    for event in events.read() {
        let context_started = *phase.get() == LevelPhase::Loaded;
        let action = rotations.main.change_level(
            &event.args,
            context_started,
            game_rules.0.as_deref(),
            &catalog,
        );

        match action {
            Some(ChangeLevelAction::ChangeContext { level, game_rules: rules }) => {
                info!("Changing level to '{}' ({:?})", level, rules);
                game_rules.0 = rules.clone();
                load_requests.send(LoadLevelRequest {
                    level,
                    game_rules: rules,
                });
            }
            Some(ChangeLevelAction::ConsoleCommands(commands)) => {
                for command in commands {
                    debug!("changelevel issues '{}'", command);
                    console.send(ConsoleCommandEvent(command));
                }
            }
            None => warn!("changelevel: the level rotation is empty"),
        }
    }
}
