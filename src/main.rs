//! Level System - Entry Point
//!
//! Headless runner: scans the configured levels folder, loads the session
//! rotation and, with `autoload_rotation` set, loads its first level.
//!
//! Configuration is read from `assets/data/level_system.ron`.

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

fn main() {
    App::new()
        // Headless frame loop
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 30.0,
        ))))
        .add_plugins((StatesPlugin, LogPlugin::default()))

        // Our level system plugin
        .add_plugins(level_system::LevelSystemPlugin)

        .run();
}
