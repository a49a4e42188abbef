//! Level lifecycle state.
//!
//! The orchestrator owns the authoritative phase; the plugin mirrors it into
//! this Bevy state after every load or unload request so other systems can
//! gate on `in_state(LevelPhase::Loaded)`.

use bevy::prelude::*;

/// Phase of the active level session.
///
/// - `Idle`: nothing loaded (also the result of a failed load)
/// - `Loading`: the load sequence is running
/// - `Loaded`: a session is active
/// - `Unloading`: the unload sequence is running
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum LevelPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Unloading,
}

/// Game rules requested for the next level, set by `sv_gamerules` or the rotation.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentGameRules(pub Option<String>);
