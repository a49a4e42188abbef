//! Core module - configuration, level phase state and global events.
//!
//! This module provides the foundation that all other level system plugins build upon.

mod config;
mod events;
mod plugin;
mod states;

pub use config::*;
pub use events::*;
pub use plugin::CorePlugin;
pub use states::*;
