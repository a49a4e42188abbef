//! Rotation module - the level rotation engine and its registry.
//!
//! A rotation is an ordered playlist of levels, each with a deck of game
//! modes. It can be shuffled (optionally keeping adjacent pairs together)
//! and loops when exhausted.

mod config;
mod entry;
mod game_rules;
mod plugin;
mod registry;
#[allow(clippy::module_inception)]
mod rotation;

pub use config::{
    RotationConfigError, RotationDocument, RotationLevelDef, ROTATION_ROOT_TAG,
};
pub use entry::LevelRotationEntry;
pub use game_rules::{GameRulesRegistry, GameRulesResolver};
pub use plugin::{handle_change_level, load_session_rotation, register_game_rules, RotationPlugin};
pub use registry::RotationRegistry;
pub use rotation::{ChangeLevelAction, ExtInfoId, LevelRotation, RandomisationFlags};
