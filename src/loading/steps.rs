//! The load and unload step sequences and the subsystem interface they call.

use std::fmt;

use crate::catalog::{GameTypeInfo, LevelInfo};

use super::error::StepError;

/// A step of the level load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStep {
    AddPhysicsGlobalArea,
    OpenLevelPackage,
    LoadGameTokens,
    LoadEntityLayers,
    LoadWorld,
    LoadEntitySystem,
    ResetAi,
    ResetTimeOfDay,
    ResetDialog,
    ParseAudioConfig,
    CreateGameRules,
    LoadMissionScript,
    SpawnEntities,
    LoadMovieData,
    PrecacheMaterials,
}

impl LoadStep {
    pub fn name(self) -> &'static str {
        match self {
            LoadStep::AddPhysicsGlobalArea => "AddPhysicsGlobalArea",
            LoadStep::OpenLevelPackage => "OpenLevelPackage",
            LoadStep::LoadGameTokens => "LoadGameTokens",
            LoadStep::LoadEntityLayers => "LoadEntityLayers",
            LoadStep::LoadWorld => "LoadWorld",
            LoadStep::LoadEntitySystem => "LoadEntitySystem",
            LoadStep::ResetAi => "ResetAi",
            LoadStep::ResetTimeOfDay => "ResetTimeOfDay",
            LoadStep::ResetDialog => "ResetDialog",
            LoadStep::ParseAudioConfig => "ParseAudioConfig",
            LoadStep::CreateGameRules => "CreateGameRules",
            LoadStep::LoadMissionScript => "LoadMissionScript",
            LoadStep::SpawnEntities => "SpawnEntities",
            LoadStep::LoadMovieData => "LoadMovieData",
            LoadStep::PrecacheMaterials => "PrecacheMaterials",
        }
    }
}

impl fmt::Display for LoadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A step of the level unload sequence. Unload steps cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnloadStep {
    FlushDeferredWork,
    FlushRenderer,
    DisableOpticalMedia,
    ResetItems,
    ResetActions,
    ResetCustomEvents,
    UnloadEntities,
    ResetAi,
    ResetDialog,
    ResetMovie,
    ResetTimeOfDay,
    UnloadAudio,
    UnloadWorld,
    ResetGameTokens,
    ResetFlow,
    PurgeEntityHeaps,
    /// Runs after the session is released, outside `UNLOAD_SEQUENCE`.
    FreeRendererResources,
}

/// Order in which a level is brought up.
pub const LOAD_SEQUENCE: [LoadStep; 15] = [
    LoadStep::AddPhysicsGlobalArea,
    LoadStep::OpenLevelPackage,
    LoadStep::LoadGameTokens,
    LoadStep::LoadEntityLayers,
    LoadStep::LoadWorld,
    LoadStep::LoadEntitySystem,
    LoadStep::ResetAi,
    LoadStep::ResetTimeOfDay,
    LoadStep::ResetDialog,
    LoadStep::ParseAudioConfig,
    LoadStep::CreateGameRules,
    LoadStep::LoadMissionScript,
    LoadStep::SpawnEntities,
    LoadStep::LoadMovieData,
    LoadStep::PrecacheMaterials,
];

/// Order in which a level is torn down, before the session is released.
pub const UNLOAD_SEQUENCE: [UnloadStep; 16] = [
    UnloadStep::FlushDeferredWork,
    UnloadStep::FlushRenderer,
    UnloadStep::DisableOpticalMedia,
    UnloadStep::ResetItems,
    UnloadStep::ResetActions,
    UnloadStep::ResetCustomEvents,
    UnloadStep::UnloadEntities,
    UnloadStep::ResetAi,
    UnloadStep::ResetDialog,
    UnloadStep::ResetMovie,
    UnloadStep::ResetTimeOfDay,
    UnloadStep::UnloadAudio,
    UnloadStep::UnloadWorld,
    UnloadStep::ResetGameTokens,
    UnloadStep::ResetFlow,
    UnloadStep::PurgeEntityHeaps,
];

/// What a load step gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub info: &'a LevelInfo,
    /// Mission used for world, mission script and movie data.
    pub game_type: Option<&'a GameTypeInfo>,
    /// Game rules to create, as requested by the caller.
    pub game_rules: Option<&'a str>,
}

/// The engine subsystems a level is loaded into.
///
/// The orchestrator only sequences these calls; everything a step actually
/// does lives behind this trait.
pub trait LevelSubsystems: Send + Sync {
    /// Run one load step. An error aborts the load.
    fn run_load_step(&mut self, step: LoadStep, ctx: &LoadContext) -> Result<(), StepError>;

    /// Run one unload step. Best effort.
    fn run_unload_step(&mut self, step: UnloadStep);

    /// Open the level package and bring up the loading screen ahead of a load.
    fn prepare_level(&mut self, _info: &LevelInfo) -> Result<(), StepError> {
        Ok(())
    }

    fn close_level_pak(&mut self, _info: &LevelInfo) {}

    fn enable_default_layers(&mut self) {}
}
