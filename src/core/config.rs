//! Level system configuration loaded from external RON file.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Default location of the configuration file.
pub const CONFIG_PATH: &str = "assets/data/level_system.ron";

/// A canonical game rules name and the aliases that resolve to it.
#[derive(Debug, Clone, Deserialize)]
pub struct GameRulesDef {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Level system configuration loaded from assets/data/level_system.ron.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LevelSystemConfig {
    /// Root folder scanned for level folders.
    pub levels_folder: PathBuf,
    /// Root folder holding mods; `<mods_folder>/<mod_name>/<levels_folder>` is scanned first.
    pub mods_folder: PathBuf,
    pub mod_name: Option<String>,
    /// XML document listing user defined level types.
    pub level_types_file: Option<PathBuf>,
    /// Session level rotation document.
    pub rotation_file: Option<PathBuf>,
    /// Seed for the rotation shuffle; negative keeps the current generator state.
    pub rotation_seed: i64,
    /// Known game rules. Rotation entries naming anything else are dropped.
    pub game_rules: Vec<GameRulesDef>,
    /// Load the first rotation entry once startup is complete.
    pub autoload_rotation: bool,
}

impl Default for LevelSystemConfig {
    fn default() -> Self {
        Self {
            levels_folder: PathBuf::from("assets/levels"),
            mods_folder: PathBuf::from("assets/mods"),
            mod_name: None,
            level_types_file: None,
            rotation_file: None,
            rotation_seed: -1,
            game_rules: Vec::new(),
            autoload_rotation: false,
        }
    }
}

impl LevelSystemConfig {
    /// Load config from the default RON file.
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded level system config from {}", path);
                    config
                }
                Err(e) => {
                    error!("Failed to parse {}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read {}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Mod levels folder, if a mod is configured.
    pub fn mod_levels_folder(&self) -> Option<PathBuf> {
        self.mod_name
            .as_ref()
            .map(|name| self.mods_folder.join(name).join(&self.levels_folder))
    }
}
