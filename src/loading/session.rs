//! The active level session.

use crate::catalog::LevelInfo;

/// The single level currently loading or loaded.
///
/// Holds its own copy of the catalog record so a rescan cannot change a
/// running level underneath it.
#[derive(Debug, Clone)]
pub struct LevelSession {
    pub info: LevelInfo,
    pub game_rules: Option<String>,
    loaded: bool,
}

impl LevelSession {
    pub fn new(info: LevelInfo, game_rules: Option<String>) -> Self {
        Self {
            info,
            game_rules,
            loaded: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }
}
