//! Loading plugin - runs load/unload requests and republishes listener
//! notifications as Bevy events.

use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use crate::catalog::{LevelCatalog, LevelInfo};
use crate::core::{
    CurrentGameRules, LevelLifecycleEvent, LevelLoadedEvent, LevelPhase, LoadLevelRequest,
    UnloadLevelRequest,
};

use super::listener::LevelSystemListener;
use super::orchestrator::LevelLoader;
use super::session::LevelSession;
use super::subsystems::HeadlessSubsystems;

/// Loading plugin.
///
/// Inserts a `LevelLoader` backed by `HeadlessSubsystems` unless the app
/// already provides one.
pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        let bridge = Arc::new(EventBridge::default());

        if !app.world().contains_resource::<LevelLoader>() {
            app.insert_resource(LevelLoader::new(Box::new(HeadlessSubsystems::default())));
        }
        app.world_mut()
            .resource_mut::<LevelLoader>()
            .add_listener(bridge.clone());

        app.insert_resource(LifecycleBridge(bridge)).add_systems(
            Update,
            (
                handle_unload_requests,
                handle_load_requests,
                flush_lifecycle_events,
                sync_level_phase,
            )
                .chain(),
        );
    }
}

/// Listener that queues notifications until the next flush.
#[derive(Default)]
pub struct EventBridge {
    queue: Mutex<Vec<LevelLifecycleEvent>>,
}

impl EventBridge {
    fn push(&self, event: LevelLifecycleEvent) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push(event),
            Err(e) => error!("Lifecycle queue poisoned: {}", e),
        }
    }

    pub fn drain(&self) -> Vec<LevelLifecycleEvent> {
        match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

impl LevelSystemListener for EventBridge {
    fn on_level_not_found(&self, level: &str) {
        self.push(LevelLifecycleEvent::LevelNotFound {
            level: level.to_string(),
        });
    }

    fn on_loading_start(&self, info: &LevelInfo) {
        self.push(LevelLifecycleEvent::LoadingStart {
            level: info.name.clone(),
        });
    }

    fn on_loading_error(&self, info: &LevelInfo, reason: &str) {
        self.push(LevelLifecycleEvent::LoadingError {
            level: info.name.clone(),
            reason: reason.to_string(),
        });
    }

    fn on_loading_progress(&self, info: &LevelInfo, percent: u32) {
        self.push(LevelLifecycleEvent::LoadingProgress {
            level: info.name.clone(),
            percent,
        });
    }

    fn on_loading_complete(&self, session: &LevelSession) {
        self.push(LevelLifecycleEvent::LoadingComplete {
            level: session.name().to_string(),
        });
    }

    fn on_unload_complete(&self, session: &LevelSession) {
        self.push(LevelLifecycleEvent::UnloadComplete {
            level: session.name().to_string(),
        });
    }
}

/// Handle to the bridge registered with the loader.
#[derive(Resource, Clone)]
pub struct LifecycleBridge(pub Arc<EventBridge>);

fn handle_unload_requests(
    mut requests: EventReader<UnloadLevelRequest>,
    mut loader: ResMut<LevelLoader>,
) {
    for _ in requests.read() {
        if loader.unload().is_none() {
            debug!("Unload requested with no level loaded");
        }
    }
}

/// Unload the current level and load the requested one.
pub fn handle_load_requests(
    mut requests: EventReader<LoadLevelRequest>,
    mut loader: ResMut<LevelLoader>,
    mut catalog: ResMut<LevelCatalog>,
    mut game_rules: ResMut<CurrentGameRules>,
    mut loaded: EventWriter<LevelLoadedEvent>,
) {
    for request in requests.read() {
        if let Some(rules) = &request.game_rules {
            game_rules.0 = Some(rules.clone());
        }

        loader.unload();
        loader.prepare_next_level(&request.level, &catalog);

        match loader.load(&request.level, game_rules.0.as_deref(), &mut catalog) {
            Ok(()) => {
                let level = loader
                    .session()
                    .map(|session| session.name().to_string())
                    .unwrap_or_else(|| request.level.clone());
                loaded.send(LevelLoadedEvent {
                    level,
                    load_seconds: loader.stats().last_load_seconds,
                });
            }
            Err(e) => error!("{}", e),
        }
    }
}

fn flush_lifecycle_events(bridge: Res<LifecycleBridge>, mut events: EventWriter<LevelLifecycleEvent>) {
    for event in bridge.0.drain() {
        events.send(event);
    }
}

/// Mirror the loader's phase into `LevelPhase`.
fn sync_level_phase(
    loader: Res<LevelLoader>,
    phase: Res<State<LevelPhase>>,
    mut next: ResMut<NextState<LevelPhase>>,
) {
    if *phase.get() != loader.phase() {
        next.set(loader.phase());
    }
}
