//! Core plugin that sets up configuration, level phase state and events.

use bevy::prelude::*;

use super::config::LevelSystemConfig;
use super::events::*;
use super::states::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Configuration (`LevelSystemConfig`, loaded unless already inserted)
/// - The `LevelPhase` state
/// - Global events (level requests, console commands, lifecycle notifications)
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<LevelSystemConfig>() {
            app.insert_resource(LevelSystemConfig::load());
        }

        app
            // Level lifecycle state
            .init_state::<LevelPhase>()
            .init_resource::<CurrentGameRules>()

            // Register global events
            .add_event::<ChangeLevelEvent>()
            .add_event::<LoadLevelRequest>()
            .add_event::<UnloadLevelRequest>()
            .add_event::<ConsoleCommandEvent>()
            .add_event::<LevelLifecycleEvent>()
            .add_event::<LevelLoadedEvent>()

            .add_systems(OnEnter(LevelPhase::Loaded), log_level_ready)
            .add_systems(OnEnter(LevelPhase::Idle), log_level_idle);
    }
}

fn log_level_ready() {
    debug!("Level phase: Loaded");
}

fn log_level_idle() {
    debug!("Level phase: Idle");
}
