//! Global events used for cross-system communication.
//!
//! Console commands and gameplay code request level changes through these
//! events; the loading plugin answers with lifecycle events so UI and game
//! systems never touch the orchestrator directly.

use bevy::prelude::*;

/// Advance the session rotation and switch to its next entry.
#[derive(Event, Debug, Clone, Default)]
pub struct ChangeLevelEvent {
    /// Extra arguments appended to the generated `map` command.
    pub args: Vec<String>,
}

/// Load a level by name, unloading the current one first.
#[derive(Event, Debug, Clone)]
pub struct LoadLevelRequest {
    pub level: String,
    /// Game rules to create once the level is loaded.
    pub game_rules: Option<String>,
}

/// Unload the current level.
#[derive(Event, Debug, Clone, Default)]
pub struct UnloadLevelRequest;

/// A raw console line, e.g. `map arena` or `sv_gamerules TeamDeathmatch`.
#[derive(Event, Debug, Clone)]
pub struct ConsoleCommandEvent(pub String);

/// Listener notifications re-published as Bevy events.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum LevelLifecycleEvent {
    LevelNotFound { level: String },
    LoadingStart { level: String },
    LoadingError { level: String, reason: String },
    LoadingProgress { level: String, percent: u32 },
    LoadingComplete { level: String },
    UnloadComplete { level: String },
}

/// Broadcast after a level finished loading and its default layers are enabled.
#[derive(Event, Debug, Clone)]
pub struct LevelLoadedEvent {
    pub level: String,
    pub load_seconds: f32,
}
