//! Level System - level discovery, rotation and load orchestration in Bevy.
//!
//! A headless port of a game engine's level system: it finds level folders
//! on disk, plays them back through a (possibly shuffled) rotation and
//! drives the load/unload sequence of the active level.
//!
//! # Architecture
//!
//! The system is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Configuration, level phase state, global events
//! - **Catalog**: Level folder scan, metadata records, name lookup
//! - **Rotation**: Level rotation engine and the rotation registry
//! - **Loading**: Load/unload orchestrator, listeners, subsystem steps
//! - **Console**: `map`, `sv_gamerules`, `unload`, `changelevel`, `levels`

pub mod catalog;
pub mod console;
pub mod core;
pub mod loading;
pub mod rotation;

use bevy::prelude::*;

/// Main plugin that adds all sub-plugins.
///
/// Expects `StatesPlugin` (part of `DefaultPlugins`) to be present.
pub struct LevelSystemPlugin;

impl Plugin for LevelSystemPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Level discovery
            .add_plugins(catalog::CatalogPlugin)

            // Rotation engine
            .add_plugins(rotation::RotationPlugin)

            // Load/unload orchestration
            .add_plugins(loading::LoadingPlugin)

            // Console commands
            .add_plugins(console::ConsolePlugin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConsoleCommandEvent, LevelPhase, LevelSystemConfig};
    use bevy::state::app::StatesPlugin;
    use std::fs;

    fn write_level(root: &std::path::Path, name: &str) {
        let path = root.join(name);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join(format!("{}.xml", name)),
            r#"<MetaData><Display Name="Arena"/></MetaData>"#,
        )
        .unwrap();
        fs::write(path.join("LevelInfo.xml"), r#"<LevelInfo HeightmapSize="256"/>"#).unwrap();
    }

    #[test]
    fn test_rotation_drives_level_loads() {
        let dir = tempfile::tempdir().unwrap();
        let levels = dir.path().join("levels");
        write_level(&levels, "arena");
        write_level(&levels, "harbor");
        let rotation_file = dir.path().join("rotation.xml");
        fs::write(
            &rotation_file,
            r#"<levelrotation>
                <level name="arena" gamerules="tdm"/>
                <level name="harbor" gamerules="Deathmatch"/>
                <level name="missing"/>
            </levelrotation>"#,
        )
        .unwrap();

        let config: LevelSystemConfig = ron::from_str(&format!(
            r#"(
                levels_folder: "{}",
                rotation_file: Some("{}"),
                rotation_seed: 3,
                game_rules: [(name: "TeamDeathmatch", aliases: ["tdm"]), (name: "Deathmatch")],
            )"#,
            levels.display(),
            rotation_file.display()
        ))
        .unwrap();

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(config)
            .add_plugins(LevelSystemPlugin);
        app.update();

        let catalog = app.world().resource::<catalog::LevelCatalog>();
        assert_eq!(catalog.len(), 2);
        let rotations = app.world().resource::<rotation::RotationRegistry>();
        assert_eq!(rotations.main.len(), 2);
        assert_eq!(rotations.main.next_game_rules(), Some("TeamDeathmatch"));

        app.world_mut()
            .send_event(ConsoleCommandEvent("changelevel".to_string()));
        for _ in 0..8 {
            app.update();
        }

        let loader = app.world().resource::<loading::LevelLoader>();
        assert!(loader.is_level_loaded());
        assert_eq!(loader.session().map(|s| s.name()), Some("arena"));
        assert_eq!(
            loader.session().and_then(|s| s.game_rules.as_deref()),
            Some("TeamDeathmatch")
        );
        assert_eq!(*app.world().resource::<State<LevelPhase>>().get(), LevelPhase::Loaded);

        // A second changelevel switches the running level in place.
        app.world_mut()
            .send_event(ConsoleCommandEvent("changelevel".to_string()));
        for _ in 0..8 {
            app.update();
        }
        let loader = app.world().resource::<loading::LevelLoader>();
        assert_eq!(loader.session().map(|s| s.name()), Some("harbor"));
        assert_eq!(loader.stats().loaded_levels, 2);
    }
}
