//! Console module - `map`, `sv_gamerules`, `unload`, `changelevel` and `levels`.

mod command;
mod plugin;

pub use command::{complete_map, ConsoleCommand, ConsoleError};
pub use plugin::{execute_console_commands, ConsolePlugin};
