//! Headless subsystems: file-backed checks and logging, no rendering.

use bevy::log::{debug, info, warn};
use std::path::PathBuf;

use crate::catalog::{read_xml_file, LevelInfo, MissionFile};

use super::error::StepError;
use super::steps::{LevelSubsystems, LoadContext, LoadStep, UnloadStep};

/// Subsystems for a dedicated server or tool build.
///
/// Opens packages by recording them, reads the mission file of the level's
/// default game type and "spawns" the objects it lists.
#[derive(Debug, Default)]
pub struct HeadlessSubsystems {
    open_packages: Vec<PathBuf>,
    mission: Option<MissionFile>,
    spawned_objects: Vec<String>,
    game_rules: Option<String>,
}

impl HeadlessSubsystems {
    pub fn open_packages(&self) -> &[PathBuf] {
        &self.open_packages
    }

    pub fn spawned_objects(&self) -> &[String] {
        &self.spawned_objects
    }

    pub fn game_rules(&self) -> Option<&str> {
        self.game_rules.as_deref()
    }

    fn open_package(&mut self, info: &LevelInfo) {
        for package in &info.package_paths {
            if self.open_packages.contains(package) {
                continue;
            }
            if package.exists() {
                debug!("Opened level package {:?}", package);
            } else {
                debug!("No package at {:?}, reading loose files", package);
            }
            self.open_packages.push(package.clone());
        }
    }
}

impl LevelSubsystems for HeadlessSubsystems {
    fn run_load_step(&mut self, step: LoadStep, ctx: &LoadContext) -> Result<(), StepError> {
        match step {
            LoadStep::OpenLevelPackage => self.open_package(ctx.info),
            LoadStep::LoadWorld => {
                if !ctx.info.path.is_dir() {
                    return Err(StepError::failed(format!(
                        "level folder {:?} is missing",
                        ctx.info.path
                    )));
                }
            }
            LoadStep::CreateGameRules => {
                self.game_rules = ctx.game_rules.map(str::to_string);
                match ctx.game_rules {
                    Some(rules) => info!("Created game rules '{}'", rules),
                    None => debug!("No game rules requested"),
                }
            }
            LoadStep::LoadMissionScript => {
                self.mission = None;
                if let Some(game_type) = ctx.game_type {
                    if !game_type.mission_file.is_empty() {
                        let path = ctx.info.path.join(&game_type.mission_file);
                        let mission = MissionFile::from_element(&read_xml_file(&path)?);
                        if let Some(script) = &mission.script {
                            info!("Executing script '{}'", script);
                        }
                        self.mission = Some(mission);
                    }
                }
            }
            LoadStep::SpawnEntities => {
                if let Some(mission) = &self.mission {
                    self.spawned_objects.extend(mission.objects.iter().cloned());
                    debug!("Spawned {} object(s)", mission.objects.len());
                }
            }
            other => debug!("{} (headless no-op)", other),
        }
        Ok(())
    }

    fn run_unload_step(&mut self, step: UnloadStep) {
        match step {
            UnloadStep::UnloadEntities | UnloadStep::PurgeEntityHeaps => {
                self.spawned_objects.clear();
            }
            UnloadStep::ResetFlow => self.mission = None,
            _ => {}
        }
    }

    fn prepare_level(&mut self, info: &LevelInfo) -> Result<(), StepError> {
        self.open_package(info);
        Ok(())
    }

    fn close_level_pak(&mut self, info: &LevelInfo) {
        let before = self.open_packages.len();
        self.open_packages
            .retain(|package| !info.package_paths.contains(package));
        if before == self.open_packages.len() {
            warn!("No open package for level '{}'", info.name);
        }
    }

    fn enable_default_layers(&mut self) {
        debug!("Default entity layers enabled");
    }
}
