//! Loading module - the level load/unload orchestrator.
//!
//! `LevelLoader` sequences a fixed list of subsystem steps to bring a level
//! up or tear it down, and reports progress to registered listeners.

mod error;
mod listener;
mod orchestrator;
mod plugin;
mod session;
mod steps;
mod subsystems;

pub use error::{LevelLoadError, StepError};
pub use listener::{LevelSystemListener, ListenerRegistry};
pub use orchestrator::{LevelLoader, LoadStats, ProgressFilter};
pub use plugin::{handle_load_requests, EventBridge, LifecycleBridge, LoadingPlugin};
pub use session::LevelSession;
pub use steps::{
    LevelSubsystems, LoadContext, LoadStep, UnloadStep, LOAD_SEQUENCE, UNLOAD_SEQUENCE,
};
pub use subsystems::HeadlessSubsystems;
