//! Catalog plugin - discovers levels on startup.

use bevy::prelude::*;

use crate::core::LevelSystemConfig;

use super::info::LevelTag;
use super::registry::LevelCatalog;

/// Catalog plugin - scans the configured levels folder into `LevelCatalog`.
pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelCatalog>()
            .add_systems(PreStartup, scan_levels);
    }
}

/// Load level types and scan the mod and main levels folders.
pub fn scan_levels(config: Res<LevelSystemConfig>, mut catalog: ResMut<LevelCatalog>) {
    if let Some(path) = &config.level_types_file {
        catalog.load_level_types(path);
    }

    match config.mod_levels_folder() {
        Some(mod_folder) => {
            catalog.rescan_with_mod(&mod_folder, &config.levels_folder, LevelTag::MAIN);
        }
        None => catalog.rescan(Some(&config.levels_folder), LevelTag::MAIN),
    }

    info!("Level catalog holds {} level(s)", catalog.len());
}
