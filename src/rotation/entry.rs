//! A single (level, game mode deck) entry of a rotation.

/// One level of a rotation together with the game modes played on it.
///
/// `game_rules_shuffle` is always a permutation of `0..game_rules_names.len()`
/// (identity until the modes are shuffled) and `current_mode_index` indexes
/// into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelRotationEntry {
    pub level_name: String,
    pub game_rules_names: Vec<String>,
    pub game_rules_shuffle: Vec<usize>,
    pub current_mode_index: usize,
}

impl LevelRotationEntry {
    pub fn new(level_name: &str) -> Self {
        Self {
            level_name: level_name.to_string(),
            ..Default::default()
        }
    }

    /// Append a mode. Returns true if the entry now holds a deck (>1 mode).
    pub fn push_game_mode(&mut self, name: String) -> bool {
        let index = self.game_rules_names.len();
        self.game_rules_names.push(name);
        self.game_rules_shuffle.push(index);
        self.game_rules_names.len() > 1
    }

    pub fn mode_count(&self) -> usize {
        self.game_rules_names.len()
    }

    /// Game mode currently selected for this entry.
    pub fn game_mode_name(&self) -> Option<&str> {
        let mode = *self.game_rules_shuffle.get(self.current_mode_index)?;
        self.game_rules_names.get(mode).map(String::as_str)
    }

    /// Step the mode cursor, wrapping at the deck size. Single-mode entries stay put.
    pub fn advance_mode(&mut self) {
        let modes = self.mode_count();
        if modes > 1 {
            self.current_mode_index += 1;
            if self.current_mode_index >= modes {
                self.current_mode_index = 0;
            }
        }
    }
}
