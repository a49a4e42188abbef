//! Level load/unload orchestration.

use bevy::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{LevelCatalog, LevelInfo};
use crate::core::LevelPhase;

use super::error::LevelLoadError;
use super::listener::{LevelSystemListener, ListenerRegistry};
use super::session::LevelSession;
use super::steps::{LevelSubsystems, LoadContext, UnloadStep, LOAD_SEQUENCE, UNLOAD_SEQUENCE};

const READ_INFO_FAILED: &str = "Failed to read level info (level.pak might be corrupted)!";

/// Low-pass filter over the raw loading percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressFilter {
    filtered: f32,
}

impl ProgressFilter {
    pub fn reset(&mut self) {
        self.filtered = 0.0;
    }

    /// Feed a raw percentage observed `dt` seconds after the previous one.
    pub fn update(&mut self, raw: f32, dt: f32) -> f32 {
        self.filtered = self.filtered.min(raw);
        let t = (dt * 0.25).clamp(0.0001, 1.0);
        self.filtered = raw * t + self.filtered * (1.0 - t);
        self.filtered
    }

    pub fn value(&self) -> f32 {
        self.filtered
    }
}

/// Bookkeeping across loads.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub loaded_levels: u32,
    pub last_load_seconds: f32,
    pub last_level_name: String,
}

/// Drives the load and unload sequences of the single active level.
#[derive(Resource)]
pub struct LevelLoader {
    subsystems: Box<dyn LevelSubsystems>,
    listeners: ListenerRegistry,
    session: Option<LevelSession>,
    /// Level whose data may be in memory. Survives a failed load so
    /// `unload` can still clean up after it.
    loading_level: Option<LevelInfo>,
    phase: LevelPhase,
    progress: ProgressFilter,
    last_progress_at: Option<Instant>,
    load_started: Option<Instant>,
    stats: LoadStats,
}

impl LevelLoader {
    pub fn new(subsystems: Box<dyn LevelSubsystems>) -> Self {
        Self {
            subsystems,
            listeners: ListenerRegistry::default(),
            session: None,
            loading_level: None,
            phase: LevelPhase::Idle,
            progress: ProgressFilter::default(),
            last_progress_at: None,
            load_started: None,
            stats: LoadStats::default(),
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn LevelSystemListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn LevelSystemListener>) {
        self.listeners.remove(listener);
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&LevelSession> {
        self.session.as_ref()
    }

    /// Whether a session finished loading and has not been unloaded.
    pub fn is_level_loaded(&self) -> bool {
        self.session.as_ref().is_some_and(LevelSession::is_loaded)
    }

    pub fn loading_level(&self) -> Option<&LevelInfo> {
        self.loading_level.as_ref()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Start the load timer and let the subsystems get ready for `name`.
    pub fn prepare_next_level(&mut self, name: &str, catalog: &LevelCatalog) {
        self.load_started = Some(Instant::now());

        let Some(info) = catalog.lookup(name) else {
            debug!("prepare_next_level: '{}' not in catalog", name);
            return;
        };

        if let Err(e) = self.subsystems.prepare_level(info) {
            warn!("Preparing level '{}' failed: {}", info.name, e);
        }
    }

    /// Load `name` through the fixed step sequence.
    ///
    /// A level that is still loaded is unloaded first. The catalog record
    /// is refreshed by `read_info` and copied into the new session. Any
    /// failing step aborts the load, reports a loading error and leaves the
    /// loader `Idle`.
    pub fn load(
        &mut self,
        name: &str,
        game_rules: Option<&str>,
        catalog: &mut LevelCatalog,
    ) -> Result<(), LevelLoadError> {
        info!("Level system is loading \"{}\"", name);

        let Some(catalog_info) = catalog.lookup_mut(name) else {
            warn!("Level '{}' not found", name);
            for listener in self.listeners.iter() {
                listener.on_level_not_found(name);
            }
            return Err(LevelLoadError::LevelNotFound(name.to_string()));
        };

        if self.loading_level.is_some() {
            debug!("Unloading the current level before loading '{}'", name);
            self.unload();
        }

        if self.stats.last_level_name.eq_ignore_ascii_case(name) {
            debug!("Loading the same level again: '{}'", name);
        }
        self.stats.last_level_name = name.to_string();

        self.session = None;
        self.session = Some(LevelSession::new(
            catalog_info.clone(),
            game_rules.map(str::to_string),
        ));

        if let Err(e) = catalog_info.read_info() {
            let info = catalog_info.clone();
            self.report_loading_error(&info, READ_INFO_FAILED);
            self.phase = LevelPhase::Idle;
            return Err(LevelLoadError::ReadInfo {
                level: info.name,
                source: e,
            });
        }
        let info = catalog_info.clone();
        if let Some(session) = &mut self.session {
            session.info = info.clone();
        }

        self.loading_level = Some(info.clone());
        self.phase = LevelPhase::Loading;
        self.progress.reset();
        self.last_progress_at = Some(Instant::now());
        let started = *self.load_started.get_or_insert_with(Instant::now);

        for listener in self.listeners.iter() {
            listener.on_loading_start(&info);
        }

        let ctx = LoadContext {
            info: &info,
            game_type: info.default_game_type(),
            game_rules,
        };
        for (index, step) in LOAD_SEQUENCE.iter().enumerate() {
            debug!("Load step {}", step);
            if let Err(e) = self.subsystems.run_load_step(*step, &ctx) {
                let reason = format!("{} failed: {}", step, e);
                self.report_loading_error(&info, &reason);
                self.phase = LevelPhase::Idle;
                self.load_started = None;
                return Err(LevelLoadError::StepFailed {
                    level: info.name.clone(),
                    step: *step,
                    reason: e.to_string(),
                });
            }

            let raw = (index + 1) as f32 * 100.0 / LOAD_SEQUENCE.len() as f32;
            self.emit_progress(&info, raw);
        }

        let seconds = started.elapsed().as_secs_f32();
        self.load_started = None;
        self.stats.last_load_seconds = seconds;
        self.stats.loaded_levels += 1;

        if let Some(session) = &mut self.session {
            session.mark_loaded();
            for listener in self.listeners.iter() {
                listener.on_loading_complete(session);
            }
        }

        info!("Level {} loading time: {:.2} seconds", info.name, seconds);

        self.subsystems.enable_default_layers();
        self.phase = LevelPhase::Loaded;
        Ok(())
    }

    /// Adopt a level the editor already has in memory, without running the
    /// load sequence.
    pub fn set_editor_loaded_level(
        &mut self,
        name: &str,
        read_metadata: bool,
        catalog: &mut LevelCatalog,
    ) -> Result<(), LevelLoadError> {
        let Some(info) = catalog.lookup_mut(name) else {
            error!("Failed to get level info for level {}!", name);
            return Err(LevelLoadError::LevelNotFound(name.to_string()));
        };

        if read_metadata {
            if let Err(e) = info.read_metadata() {
                warn!("{}", e);
            }
        }

        self.stats.last_level_name = name.to_string();
        let mut session = LevelSession::new(info.clone(), None);
        session.mark_loaded();
        self.session = Some(session);
        self.phase = LevelPhase::Loaded;
        Ok(())
    }

    /// Tear down the current level. No-op when nothing was loaded.
    ///
    /// Returns the released session.
    pub fn unload(&mut self) -> Option<LevelSession> {
        let info = self.loading_level.take()?;

        info!("UnLoadLevel Start");
        let started = Instant::now();
        self.phase = LevelPhase::Unloading;

        for step in UNLOAD_SEQUENCE {
            debug!("Unload step {:?}", step);
            self.subsystems.run_unload_step(step);
        }

        self.subsystems.close_level_pak(&info);
        let session = self.session.take();
        self.subsystems.run_unload_step(UnloadStep::FreeRendererResources);

        if let Some(session) = &session {
            for listener in self.listeners.iter() {
                listener.on_unload_complete(session);
            }
        }

        self.phase = LevelPhase::Idle;
        info!(
            "UnLoadLevel End: {:.1} sec",
            started.elapsed().as_secs_f32()
        );
        session
    }

    fn report_loading_error(&mut self, info: &LevelInfo, reason: &str) {
        error!("Loading level '{}' failed: {}", info.name, reason);
        for listener in self.listeners.iter() {
            listener.on_loading_error(info, reason);
        }
        self.subsystems.close_level_pak(info);
    }

    fn emit_progress(&mut self, info: &LevelInfo, raw: f32) {
        let now = Instant::now();
        let dt = self
            .last_progress_at
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_progress_at = Some(now);

        let percent = self.progress.update(raw, dt).clamp(0.0, 100.0) as u32;
        for listener in self.listeners.iter() {
            listener.on_loading_progress(info, percent);
        }
    }
}
